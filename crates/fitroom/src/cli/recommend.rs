//! The `fitroom recommend` command.

use anyhow::Context;
use clap::Args;
use fitroom_core::Fitroom;
use std::io::Read;
use std::path::PathBuf;

/// Arguments for the `recommend` command.
#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// JSON file with weather, gender and closet_items (defaults to stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(fitroom: &Fitroom, args: RecommendArgs) -> anyhow::Result<()> {
    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read input from stdin")?;
            buffer
        }
    };
    let input: serde_json::Value =
        serde_json::from_str(&raw).context("recommendation input is not valid JSON")?;

    let result = fitroom.recommend(&input).await?;
    let json = serde_json::to_string_pretty(&result)?;

    match args.output {
        Some(path) => std::fs::write(&path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
