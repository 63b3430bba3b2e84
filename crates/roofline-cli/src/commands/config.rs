//! Default configuration command.

use anyhow::Result;
use cluster_roofline::RooflineConfig;

pub fn run() -> Result<()> {
    print!("{}", RooflineConfig::default().to_toml()?);
    Ok(())
}
