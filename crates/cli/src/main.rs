//! Code Atlas CLI
//!
//! Builds a fact graph over a project and answers structural questions
//! against it: who calls a function, what a change would impact, which
//! files travel together.
//!
//! ## Commands
//!
//! - `index` - build (or rebuild) the graph for a project
//! - `status` - validate the published graph against the working tree
//! - `facts` - typed fact query with pagination
//! - `query` - raw pass-through query against the store
//! - `calls` - caller/callee hierarchy for an entity
//! - `impact` - blast radius and risk for changing an entity
//! - `related` - files related to a target file
//! - `define` - ranked definition lookup for a symbol
//! - `refs` - grouped references to a symbol
//!
//! Results go to stdout as JSON; logs go to stderr.

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_operational() => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
