use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::ProbeBucket;

/// netinventory - network device inventory from hardware probe data
#[derive(Parser)]
#[command(name = "netinventory")]
#[command(about = "Classify hardware probe records into an ordered network device inventory")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the inventory for a probe snapshot and print it as JSON
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Broken module names, space separated
        #[arg(long)]
        broken_modules: Option<String>,

        /// install.inf file with a BrokenModules line
        #[arg(long)]
        install_inf: Option<PathBuf>,

        /// Append bus ids to device names (s390 naming)
        #[arg(long)]
        distinguished_names: bool,
    },
    /// Print the classification of every record in a snapshot
    Classify {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        config: PathBuf,
    },
}

/// Where probe data comes from
#[derive(clap::Args)]
pub struct SourceArgs {
    /// Configuration file (flags below override its values)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Probe snapshot JSON file
    #[arg(short, long)]
    pub probe: Option<PathBuf>,

    /// Probe bucket: netcard, modem, isdn, dsl or all
    #[arg(short, long)]
    pub bucket: Option<ProbeBucket>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from([
            "netinventory",
            "scan",
            "--probe",
            "probe.json",
            "--bucket",
            "netcard",
            "--broken-modules",
            "b43 ath5k",
            "--distinguished-names",
        ])
        .unwrap();

        match cli.command {
            Commands::Scan {
                source,
                broken_modules,
                distinguished_names,
                ..
            } => {
                assert_eq!(source.probe, Some(PathBuf::from("probe.json")));
                assert_eq!(source.bucket, Some(ProbeBucket::Netcard));
                assert_eq!(broken_modules.as_deref(), Some("b43 ath5k"));
                assert!(distinguished_names);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_bucket() {
        let result = Cli::try_parse_from(["netinventory", "scan", "--bucket", "floppy"]);
        assert!(result.is_err());
    }
}
