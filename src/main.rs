//! Command-line entry point: `mcapshrink <input.mcap> <output.mcap>`.

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;

use mcapshrink::{container, transcode};

/// Losslessly compress ROS1 sensor_msgs/Image messages in an MCAP file.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input MCAP file.
    input: PathBuf,
    /// Output MCAP file (created or truncated).
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let input = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let profile = container::read_profile(&input)?;

    let file = fs::File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let writer = mcap::WriteOptions::new()
        .profile(profile)
        .create(BufWriter::new(file))?;
    let mut sink = container::McapSink::new(writer);

    transcode(&input, &mut sink)?;
    sink.finish()?;
    Ok(())
}
