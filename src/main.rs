use anyhow::Result;
use clap::Parser;

use track_planner::commands::track::{self, CommonOpts, TrackCommand};

#[derive(Parser, Debug)]
#[command(name = "track_planner", version, about = "Route and network planning for hex rail boards")]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: TrackCommand,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    track::cmd_track(cli.common, cli.command)
}
