use crate::{
    env::EnvManager,
    error::CliError,
    output::CompiledQuery,
    settings::{Settings, SettingsArgs},
};
use clap::Parser;
use commands::Commands;
use model::condition::spec::ConditionSpec;
use planner::QueryGenerator;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod settings;

#[derive(Parser)]
#[command(
    name = "condspec",
    version = "0.1.0",
    about = "Compile condition specs into parameterized SQL"
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let mut env = EnvManager::from_process();
    if let Some(path) = &cli.settings.env_file {
        env.load_from_file(path)?;
    }
    let settings = Settings::resolve(&cli.settings, &env)?;

    // Logs go to stderr so stdout carries only the query output
    init_logging(&settings.log_level);

    match cli.command {
        Commands::Compile { spec, json } => {
            info!("Compiling condition spec: {}", spec);

            let spec = load_spec(&spec).await?;
            let query = compile_query(&settings, &spec)?;
            output::print_query(&query, json)?;
        }
        Commands::Ast { spec } => {
            let spec = load_spec(&spec).await?;
            println!("{}", spec.to_json_pretty()?);
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_spec<P: AsRef<Path>>(path: P) -> Result<ConditionSpec, CliError> {
    let source = tokio::fs::read_to_string(path).await?;
    let spec = ConditionSpec::from_json(&source)?;
    debug!(
        sorts = spec.sorts().len(),
        limit = ?spec.limit(),
        offset = ?spec.offset(),
        "Loaded condition spec"
    );
    Ok(spec)
}

fn compile_query(settings: &Settings, spec: &ConditionSpec) -> Result<CompiledQuery, CliError> {
    let table = settings.require_table()?;
    let generator = QueryGenerator::new(settings.dialect.dialect());
    let (sql, params) = generator.select(table, &settings.columns, Some(spec));

    Ok(CompiledQuery {
        dialect: settings.dialect,
        sql,
        params,
    })
}
