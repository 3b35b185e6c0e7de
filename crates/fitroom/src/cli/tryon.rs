//! The `fitroom tryon` command.

use clap::Args;
use fitroom_core::Fitroom;
use std::path::PathBuf;

/// Arguments for the `tryon` command.
#[derive(Args, Debug)]
pub struct TryonArgs {
    /// Person (model) image file
    #[arg(required = true)]
    pub person: PathBuf,

    /// Garment image file
    #[arg(required = true)]
    pub garment: PathBuf,

    /// Where to write the try-on JPEG
    #[arg(short, long, default_value = "tryon.jpg")]
    pub output: PathBuf,
}

pub async fn execute(fitroom: &Fitroom, args: TryonArgs) -> anyhow::Result<()> {
    let person = super::read_image(&args.person)?;
    let garment = super::read_image(&args.garment)?;
    tracing::info!(
        provider = ?fitroom.config().provider,
        person = %args.person.display(),
        garment = %args.garment.display(),
        "starting try-on"
    );

    let result = fitroom.try_on(&person, &garment).await?;
    std::fs::write(&args.output, &result.bytes)?;
    tracing::info!(
        output = %args.output.display(),
        bytes = result.bytes.len(),
        "try-on image written"
    );
    Ok(())
}
