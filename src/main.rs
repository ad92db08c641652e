use anyhow::Result;
use clap::Parser;
use classdep::cli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build a dependency graph from decoded JVM class files.
#[derive(Parser)]
#[command(name = "classdep", version, about)]
struct Args {
    /// Input JSON files of decoded units.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file to write the resulting graph JSON into.
    #[arg(short, long, default_value = "graph.json")]
    output: PathBuf,

    /// Whitelist regex over object FQNs; repeatable.
    #[arg(short, long = "whitelist", default_value = ".*")]
    whitelist: Vec<String>,

    /// Blacklist regex over object FQNs; repeatable.
    #[arg(short, long = "blacklist")]
    blacklist: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    cli::run(&args.inputs, &args.output, &args.whitelist, &args.blacklist)
}
