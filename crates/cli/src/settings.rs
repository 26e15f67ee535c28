//! Settings resolution: command-line flags win over environment variables,
//! which win over built-in defaults.

use crate::{env::EnvManager, error::CliError};
use clap::Args;
use query_builder::dialect::DialectKind;

pub const ENV_DIALECT: &str = "CONDSPEC_DIALECT";
pub const ENV_TABLE: &str = "CONDSPEC_TABLE";
pub const ENV_COLUMNS: &str = "CONDSPEC_COLUMNS";
pub const ENV_LOG: &str = "CONDSPEC_LOG";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Default, Clone, Args)]
pub struct SettingsArgs {
    #[arg(
        long,
        global = true,
        help = "Load settings from a .env-style file before reading the environment"
    )]
    pub env_file: Option<String>,

    #[arg(long, global = true, help = "SQL dialect: postgres or mysql")]
    pub dialect: Option<String>,

    #[arg(long, global = true, help = "Table to select from (schema.table allowed)")]
    pub table: Option<String>,

    #[arg(long, global = true, help = "Comma-separated column list, `*` for all")]
    pub columns: Option<String>,

    #[arg(long, global = true, help = "Log filter, e.g. debug or planner=trace")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub dialect: DialectKind,
    pub table: Option<String>,
    pub columns: Vec<String>,
    pub log_level: String,
}

impl Settings {
    pub fn resolve(args: &SettingsArgs, env: &EnvManager) -> Result<Self, CliError> {
        let pick = |flag: &Option<String>, var: &str| -> Option<String> {
            flag.clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env.get(var).map(str::to_string))
        };

        let dialect = match pick(&args.dialect, ENV_DIALECT) {
            Some(name) => name.parse()?,
            None => DialectKind::default(),
        };

        let columns = pick(&args.columns, ENV_COLUMNS)
            .map(|raw| parse_columns(&raw))
            .filter(|cols| !cols.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            dialect,
            table: pick(&args.table, ENV_TABLE).map(|t| t.trim().to_string()),
            columns,
            log_level: pick(&args.log_level, ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
        })
    }

    pub fn require_table(&self) -> Result<&str, CliError> {
        self.table.as_deref().ok_or(CliError::MissingSetting {
            name: "table",
            env_var: ENV_TABLE,
        })
    }
}

fn parse_columns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
