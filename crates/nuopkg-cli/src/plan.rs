//! Plan command - print the staging plan without copying anything.

use anyhow::Result;
use clap::Args;
use console::style;

use nuopkg::{ClientPackage, SourceSpec};

use crate::opts::ConfigArgs;

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Version to plan for (also prints archive and directory names)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,
}

pub fn execute(args: PlanArgs) -> Result<i32> {
    let config = args.config.to_config()?;

    let mut package = ClientPackage::new(config.target);

    if let Some(version) = &args.version {
        package.resolve(version, &config)?;
        println!(
            "{} {} ({})",
            style(package.name()).bold(),
            version,
            config.target
        );
        println!("  archive: {}", config.target.archive_name(version));
        println!("  tree:    {}", config.target.dir_name(version));
    } else {
        println!("{} ({})", style(package.name()).bold(), config.target);
    }

    package.install(&config)?;

    for stage in package.stages() {
        println!();
        println!(
            "{} - {} [{}]",
            style(stage.name()).green().bold(),
            stage.title(),
            stage.requirements()
        );

        for op in stage.ops() {
            for source in &op.sources {
                println!("  {} <- {}", op.dest, describe(source));
            }
        }
    }

    Ok(0)
}

fn describe(source: &SourceSpec) -> String {
    match source {
        SourceSpec::Categorized { category, pattern } => {
            if source.is_glob() {
                format!("{}/{} (glob)", category, pattern)
            } else {
                format!("{}/{}", category, pattern)
            }
        }
        SourceSpec::Direct(path) => path.display().to_string(),
    }
}
