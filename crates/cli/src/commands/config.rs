//! groundwork config command

use clap::Args;
use shared::Settings;

#[derive(Debug, Args)]
pub struct ConfigCommand {}

impl ConfigCommand {
    /// Print the effective settings as YAML
    pub fn run(&self, settings: &Settings) -> anyhow::Result<()> {
        print!("{}", serde_yaml::to_string(settings)?);
        Ok(())
    }
}
