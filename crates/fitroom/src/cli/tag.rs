//! The `fitroom tag` command.

use clap::Args;
use fitroom_core::Fitroom;
use std::path::PathBuf;

/// Arguments for the `tag` command.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Image file to tag
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(fitroom: &Fitroom, args: TagArgs) -> anyhow::Result<()> {
    let blob = super::read_image(&args.input)?;
    tracing::info!(path = %args.input.display(), bytes = blob.bytes.len(), "tagging image");

    let result = fitroom.tag(&blob).await?;
    let json = serde_json::to_string_pretty(&result)?;

    match args.output {
        Some(path) => std::fs::write(&path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
