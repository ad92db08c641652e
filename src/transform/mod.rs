//! The transformation pipeline: seven sink-to-sink stages composed in a fixed
//! order, each rewriting the stream while preserving graph semantics.

pub mod accessor;
pub mod anonymous;
pub mod existence;
pub mod filter;
pub mod overrides;
pub mod private;
pub mod unique;

pub use accessor::AccessorMerge;
pub use anonymous::AnonymousMerge;
pub use existence::ExistenceFilter;
pub use filter::PatternFilter;
pub use overrides::OverrideSimulation;
pub use private::PrivateMethodMerge;
pub use unique::UniqueEdges;

use crate::sink::DependencySink;
use anyhow::Result;

/// Compose the full pipeline in front of `terminal`, producer side out:
/// whitelist/blacklist filter → override simulation → existence filter →
/// anonymous-scope merge → private-method merge → synthetic-accessor merge →
/// deduplication → terminal. Fails only on invalid filter patterns.
pub fn build_pipeline(
    whitelist: &[String],
    blacklist: &[String],
    terminal: Box<dyn DependencySink>,
) -> Result<Box<dyn DependencySink>> {
    let sink = UniqueEdges::new(terminal);
    let sink = AccessorMerge::new(Box::new(sink));
    let sink = PrivateMethodMerge::new(Box::new(sink));
    let sink = AnonymousMerge::new(Box::new(sink));
    let sink = ExistenceFilter::new(Box::new(sink));
    let sink = OverrideSimulation::new(Box::new(sink));
    let sink = PatternFilter::new(whitelist, blacklist, Box::new(sink))?;
    Ok(Box::new(sink))
}
