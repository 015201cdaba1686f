mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "recval", version, about = "Validate JSON records against declared models")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and build every declared model
    Doctor,

    /// List the builtin predicate names
    Predicates,

    /// Validate records from a JSON file
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Declared model to validate against
    #[arg(long)]
    pub model: String,

    /// JSON file holding one object or an array of objects
    pub record: PathBuf,

    /// Fields and record-level validators to leave out
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Only validate these fields
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Do not run lifecycle hooks
    #[arg(long)]
    pub no_hooks: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref()),
        Commands::Predicates => cmd::predicates::run(),
        Commands::Validate(args) => cmd::validate::run(cli.config.as_deref(), &args).await,
    }
    Ok(())
}
