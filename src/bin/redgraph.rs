//! Command-line client for RedisGraph servers.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use redgraph::{ClientConfig, Graph, QueryStats, Record};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "redgraph",
    version,
    about = "Query and inspect RedisGraph graphs",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "REDGRAPH_URL",
        help = "Server URL (overrides the config file)"
    )]
    url: Option<String>,

    #[arg(
        long,
        global = true,
        env = "REDGRAPH_CONFIG",
        value_name = "FILE",
        help = "Config file path"
    )]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        env = "REDGRAPH_GRAPH",
        help = "Graph name (defaults to default_graph from the config file)"
    )]
    graph: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Run a Cypher query and print its result set")]
    Query {
        #[arg(value_name = "CYPHER")]
        cypher: String,
    },

    #[command(about = "List node labels")]
    Labels,

    #[command(about = "List property keys")]
    Properties,

    #[command(about = "List relationship types")]
    RelationshipTypes,

    #[command(about = "List graphs stored on the server")]
    List,

    #[command(about = "Delete the graph")]
    Delete,

    #[command(about = "Show the resolved configuration")]
    Config {
        #[arg(long, help = "Write the resolved configuration back to the config file")]
        write: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct QueryReport<'a> {
    columns: &'a [String],
    records: &'a [Record],
    stats: &'a QueryStats,
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    url: &'a str,
    default_graph: Option<&'a str>,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
    path: Option<String>,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut config = ClientConfig::load(cli.config.clone())?;
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }

    match cli.command {
        Command::Config { write } => {
            if write {
                let path = config.persist()?;
                eprintln!("wrote {}", path.display());
            }
            let report = ConfigReport {
                url: &config.url,
                default_graph: config.default_graph.as_deref(),
                connect_timeout_ms: config.connect_timeout_ms,
                read_timeout_ms: config.read_timeout_ms,
                path: config.path().map(|p| p.display().to_string()),
            };
            emit(&cli.format, &report, |_| print_config_text(&report))?;
        }
        Command::List => {
            let name = cli.graph.or(config.default_graph.clone()).unwrap_or_default();
            let names = Graph::open(name, &config)?.list()?;
            emit(&cli.format, &names, |_| print_lines(&names))?;
        }
        Command::Labels => {
            let names = open(&cli.graph, &config)?.labels()?;
            emit(&cli.format, &names, |_| print_lines(&names))?;
        }
        Command::Properties => {
            let names = open(&cli.graph, &config)?.properties()?;
            emit(&cli.format, &names, |_| print_lines(&names))?;
        }
        Command::RelationshipTypes => {
            let names = open(&cli.graph, &config)?.relationship_types()?;
            emit(&cli.format, &names, |_| print_lines(&names))?;
        }
        Command::Delete => {
            let graph = open(&cli.graph, &config)?;
            graph.delete()?;
            emit(&cli.format, &graph.name(), |_| {
                println!("deleted {}", graph.name())
            })?;
        }
        Command::Query { cypher } => {
            let graph = open(&cli.graph, &config)?;
            let response = graph.execute(&cypher)?;
            let report = QueryReport {
                columns: response.columns(),
                records: response.result_set()?,
                stats: response.stats(),
            };
            emit(&cli.format, &report, |_| print_query_text(&report))?;
        }
    }
    Ok(())
}

fn open(graph: &Option<String>, config: &ClientConfig) -> Result<Graph, Box<dyn Error>> {
    let name = graph
        .clone()
        .or_else(|| config.default_graph.clone())
        .ok_or("no graph given; pass --graph or set default_graph in the config file")?;
    Ok(Graph::open(name, config)?)
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize + ?Sized,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_lines(names: &[String]) {
    for name in names {
        println!("{name}");
    }
}

fn print_query_text(report: &QueryReport<'_>) {
    if !report.columns.is_empty() {
        println!("{}", report.columns.join("\t"));
        for record in report.records {
            let cells: Vec<String> = record.iter().map(|(_, value)| value.to_string()).collect();
            println!("{}", cells.join("\t"));
        }
        println!();
    }
    let stats = report.stats;
    let counters = [
        ("Nodes created", stats.nodes_created),
        ("Nodes deleted", stats.nodes_deleted),
        ("Relationships created", stats.relationships_created),
        ("Relationships deleted", stats.relationships_deleted),
        ("Properties set", stats.properties_set),
    ];
    for (label, value) in counters {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    if let Some(time) = &stats.internal_execution_time {
        println!("Query internal execution time: {time}");
    }
}

fn print_config_text(report: &ConfigReport<'_>) {
    println!("url={}", report.url);
    println!("default_graph={}", report.default_graph.unwrap_or("-"));
    if let Some(ms) = report.connect_timeout_ms {
        println!("connect_timeout_ms={ms}");
    }
    if let Some(ms) = report.read_timeout_ms {
        println!("read_timeout_ms={ms}");
    }
    println!("path={}", report.path.as_deref().unwrap_or("-"));
}
