use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::panic::Location;
use tracing_subscriber::fmt::SubscriberBuilder;

mod config;
mod corners;
mod grid;
mod provenance;
mod wcs;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Image footprint extraction")]
struct Cmd {
    /// Optional run tag; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compute the four footprint corners of an image grid
    Corners(corners::CornersArgs),
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Corners(args) => {
            let report = corners::run(&args, cmd.tag.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report.corners)?);
            Ok(())
        }
        Action::Report => report(cmd.tag.as_deref()),
    }
}

fn report(tag: Option<&str>) -> Result<()> {
    let payload = provenance::Payload::new(json!({})).with_tag(tag);
    let doc = provenance::document(&payload, &[], Location::caller());
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
