//! Version command - resolve and print the latest supported version.

use anyhow::Result;
use clap::Args;

use nuopkg::{ClientPackage, HttpClient};

use crate::opts::ConfigArgs;

#[derive(Args, Debug)]
pub struct VersionArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub async fn execute(args: VersionArgs) -> Result<i32> {
    let config = args.config.to_config()?;
    let http = HttpClient::new()?;

    let version = ClientPackage::latest_version(&http, &config).await?;
    println!("{}", version);

    Ok(0)
}
