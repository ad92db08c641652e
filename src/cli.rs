//! Command implementations: load decoded units, run the pipeline, write the
//! graph JSON.

use crate::graph::GraphSink;
use crate::producer::{AggregateSource, UnitSource, analyze_all};
use crate::transform::build_pipeline;
use crate::unit::ClassUnit;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Unit source backed by a JSON file of decoded units, as emitted by the
/// external class-file decoder.
pub struct JsonUnitSource {
    path: PathBuf,
}

impl JsonUnitSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl UnitSource for JsonUnitSource {
    fn units(&self) -> Result<Vec<ClassUnit>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read units file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("malformed units file: {}", self.path.display()))
    }
}

/// Analyze every input file through the full pipeline and write the resulting
/// graph JSON to `output`.
pub fn run(
    inputs: &[PathBuf],
    output: &Path,
    whitelist: &[String],
    blacklist: &[String],
) -> Result<()> {
    let source = AggregateSource::new(
        inputs
            .iter()
            .map(|path| Box::new(JsonUnitSource::new(path)) as Box<dyn UnitSource>)
            .collect(),
    );

    let (terminal, graph) = GraphSink::new();
    let mut pipeline = build_pipeline(whitelist, blacklist, Box::new(terminal))?;
    analyze_all(&source, pipeline.as_mut())?;

    let graph = graph.borrow();
    info!(
        objects = graph.graph.node_count(),
        edges = graph.graph.edge_count(),
        "analysis complete"
    );

    let json = serde_json::to_string_pretty(&graph.to_json())?;
    std::fs::write(output, json)
        .with_context(|| format!("failed to write output: {}", output.display()))?;
    Ok(())
}
