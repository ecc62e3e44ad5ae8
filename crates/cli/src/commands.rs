use atlas_indexer::{BuildConfig, FingerprintGate, GraphBuilder, IndexLayout};
use atlas_protocol::{FactFilter, NodeKind, Predicate, Result};
use atlas_query::{
    DefinitionQuery, Direction, MatchMode, Page, QueryConfig, QueryEngine,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "codeatlas", version, about = "Ask structural questions about a codebase")]
pub struct Cli {
    /// Directory holding published graph indexes
    #[arg(long, global = true, default_value = ".codeatlas")]
    pub db_root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build (or rebuild) the graph for a project
    Index {
        project: PathBuf,
    },
    /// Validate the published graph against the working tree
    Status {
        project: PathBuf,
    },
    /// Typed fact query with pagination
    Facts {
        project: PathBuf,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        predicate: Option<String>,
        #[arg(long)]
        object: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Raw pass-through query against the store (read-only)
    Query {
        project: PathBuf,
        query: String,
    },
    /// Caller/callee hierarchy for an entity
    Calls {
        project: PathBuf,
        /// Entity id, e.g. `function:src/auth.ts#login`
        entity: String,
        #[arg(long, value_enum, default_value_t = DirectionArg::Callers)]
        direction: DirectionArg,
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },
    /// Blast radius and risk for changing an entity
    Impact {
        project: PathBuf,
        entity: String,
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },
    /// Files related to a target file
    Related {
        project: PathBuf,
        /// Project-relative file path
        file: String,
    },
    /// Ranked definition lookup for a symbol
    Define {
        project: PathBuf,
        name: String,
        #[arg(long, value_enum, default_value_t = MatchModeArg::Exact)]
        mode: MatchModeArg,
        #[arg(long)]
        case_insensitive: bool,
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        file_hint: Option<String>,
    },
    /// Grouped references to a symbol
    Refs {
        project: PathBuf,
        name: String,
        #[arg(long)]
        entity_type: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Callers,
    Callees,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Callers => Self::Callers,
            DirectionArg::Callees => Self::Callees,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MatchModeArg {
    Exact,
    Prefix,
    Contains,
    Fuzzy,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Exact => Self::Exact,
            MatchModeArg::Prefix => Self::Prefix,
            MatchModeArg::Contains => Self::Contains,
            MatchModeArg::Fuzzy => Self::Fuzzy,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let layout = IndexLayout::new(&cli.db_root);
    let builder = Arc::new(GraphBuilder::new(BuildConfig::new(&cli.db_root)));
    // Queries rebuild a stale graph once instead of refusing outright.
    let gate = FingerprintGate::new(layout.clone()).with_auto_rebuild(builder.clone());
    let engine = QueryEngine::with_gate(layout, gate, QueryConfig::default());

    match cli.command {
        Command::Index { project } => {
            let outcome = builder.build(&project).await?;
            print_json(&outcome.metadata)?;
        }
        Command::Status { project } => {
            let gate = FingerprintGate::new(IndexLayout::new(&cli.db_root));
            let metadata = gate.validate(&project).await?;
            print_json(&metadata)?;
        }
        Command::Facts {
            project,
            subject,
            predicate,
            object,
            offset,
            limit,
        } => {
            let filter = FactFilter {
                subject,
                predicate: predicate.as_deref().map(str::parse::<Predicate>).transpose()?,
                object,
            };
            let page = engine
                .find_facts(&project, &filter, Page { offset, limit })
                .await?;
            print_json(&page)?;
        }
        Command::Query { project, query } => {
            let result = engine.raw_query(&project, &query).await?;
            print_json(&result)?;
        }
        Command::Calls {
            project,
            entity,
            direction,
            depth,
        } => {
            let tree = engine
                .call_hierarchy(&project, &entity, direction.into(), depth)
                .await?;
            print_json(&tree)?;
        }
        Command::Impact {
            project,
            entity,
            depth,
        } => {
            let report = engine.impact(&project, &entity, depth).await?;
            print_json(&report)?;
        }
        Command::Related { project, file } => {
            let related = engine.related_files(&project, &file).await?;
            print_json(&related)?;
        }
        Command::Define {
            project,
            name,
            mode,
            case_insensitive,
            entity_type,
            file_hint,
        } => {
            let query = DefinitionQuery {
                name,
                mode: mode.into(),
                case_sensitive: !case_insensitive,
                entity_type: parse_kind(entity_type.as_deref())?,
                file_hint,
            };
            let results = engine.definitions(&project, &query).await?;
            print_json(&results)?;
        }
        Command::Refs {
            project,
            name,
            entity_type,
        } => {
            let report = engine
                .references(&project, &name, parse_kind(entity_type.as_deref())?)
                .await?;
            print_json(&report)?;
        }
    }
    Ok(())
}

fn parse_kind(raw: Option<&str>) -> Result<Option<NodeKind>> {
    raw.map(str::parse::<NodeKind>).transpose()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
