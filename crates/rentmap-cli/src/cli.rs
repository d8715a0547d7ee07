//! Command-line arguments.

use clap::{Parser, Subcommand};
use rentmap_core::Year;

/// Contract rents by census tract
#[derive(Parser, Debug)]
#[command(name = "rentmap", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory or http(s) URL holding the yearly files (overrides data.root)
    #[arg(long, env = "RENTMAP_DATA_ROOT", global = true)]
    pub data_root: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the data and serve the JSON API
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Query the index and print JSON
    #[command(flatten)]
    Query(QueryCommand),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// One-shot queries against a freshly built index.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum QueryCommand {
    /// List places with their available years
    Places,
    /// Years with data for a place
    Years {
        /// Place name
        place: String,
    },
    /// Tracts with a measured median for a place and year
    Tracts {
        /// Place name
        place: String,
        /// Survey year
        year: Year,
    },
    /// Records for a place and year
    Records {
        /// Place name
        place: String,
        /// Survey year
        year: Year,
    },
    /// Trend of one tract across years
    Series {
        /// Place name
        place: String,
        /// Tract name, e.g. "Census Tract 5701"
        tract: String,
    },
    /// Map view model for a place and year
    Map {
        /// Place name
        place: String,
        /// Survey year
        year: Year,
        /// Tract to highlight
        #[arg(long)]
        tract: Option<String>,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` for docker run
        #[arg(long)]
        docker_env: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_map_with_tract() {
        let cli = Cli::try_parse_from([
            "rentmap",
            "--data-root",
            "/data",
            "map",
            "Long Beach",
            "2015",
            "--tract",
            "Census Tract 5701",
        ])
        .unwrap();

        assert_eq!(cli.data_root.as_deref(), Some("/data"));
        match cli.command {
            Command::Query(QueryCommand::Map { place, year, tract }) => {
                assert_eq!(place, "Long Beach");
                assert_eq!(year, 2015);
                assert_eq!(tract.as_deref(), Some("Census Tract 5701"));
            }
            other => unreachable!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from(["rentmap", "config", "set", "server.port", "9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Set { .. }
            }
        ));
    }

    #[test]
    fn test_parse_rejects_bad_year() {
        assert!(Cli::try_parse_from(["rentmap", "records", "Pasadena", "latest"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
