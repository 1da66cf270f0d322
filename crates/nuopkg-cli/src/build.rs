//! Build command - the full packaging lifecycle.

use anyhow::Result;
use clap::Args;
use console::Term;

use nuopkg::cli::{format_bytes, Output, ProgressManager, Verbosity};
use nuopkg::{ClientPackage, HttpClient, PackageRegistry, StageCopier};

use crate::opts::ConfigArgs;

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

pub async fn execute(args: BuildArgs) -> Result<i32> {
    let config = args.config.to_config()?;

    let mut output = Output::new();
    if args.verbose {
        output.set_verbosity(Verbosity::Verbose);
    }

    if config.output_root.exists() {
        output.warning(&format!(
            "{} already exists; staged files will be overwritten",
            config.output_root.display()
        ));
    }

    let progress = ProgressManager::new(!args.no_progress && Term::stderr().is_term());
    let http = HttpClient::new()?;

    let mut registry = PackageRegistry::new();
    registry.register(ClientPackage::new(config.target))?;

    for package in registry.iter_mut() {
        let name = package.name().to_string();

        output.info(&format!("Resolving latest {} version...", name));
        let bar = progress.create_download_bar(&name, 0);
        let progress_bar = bar.clone();
        let version = package
            .download(
                &http,
                &config,
                Some(move |downloaded, total| {
                    if total > 0 {
                        progress_bar.set_length(total);
                    }
                    progress_bar.set_position(downloaded);
                }),
            )
            .await?;
        bar.finish_and_clear();

        let size = package
            .archive()
            .and_then(|a| std::fs::metadata(a.path()).ok())
            .map(|m| m.len())
            .unwrap_or(0);
        output.success(&format!("{} {} ready ({})", name, version, format_bytes(size)));

        let spinner = progress.create_spinner("Unpacking distribution");
        let tree = package.unpack(&config.pkg_root)?;
        spinner.finish_and_clear();
        output.verbose(&format!("Extracted into {}", tree.display()));

        package.install(&config)?;

        let copier = StageCopier::new(&config.output_root);
        for stage in package.stages() {
            let copied = copier.run(stage)?;
            output.list_item("+", &format!("{} ({} files)", stage.name(), copied));
        }
    }

    output.success(&format!(
        "Staged products written to {}",
        config.output_root.display()
    ));
    Ok(0)
}
