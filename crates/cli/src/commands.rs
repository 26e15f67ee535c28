use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a JSON condition spec into a parameterized SELECT
    Compile {
        #[arg(long, help = "Condition spec file path (JSON)")]
        spec: String,

        #[arg(long, help = "Print the query and its parameters as JSON")]
        json: bool,
    },
    /// Print the normalized condition spec
    Ast {
        #[arg(long, help = "Condition spec file path (JSON)")]
        spec: String,
    },
}
