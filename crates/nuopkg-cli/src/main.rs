mod build;
mod opts;
mod plan;
mod version;

use clap::{Parser, Subcommand};
use nuopkg::cli::Output;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "nuopkg")]
#[command(about = "Stage NuoDB client artifacts out of the CE database distribution")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download, unpack and stage all client products
    Build(build::BuildArgs),

    /// Show the staging plan without copying anything
    Plan(plan::PlanArgs),

    /// Print the latest supported upstream version
    Version(version::VersionArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Build(args) => build::execute(args).await,
        Commands::Plan(args) => plan::execute(args),
        Commands::Version(args) => version::execute(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            Output::new().error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
