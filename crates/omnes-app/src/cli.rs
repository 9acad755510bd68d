//! CLI argument definitions for the Omnes binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable naming the configuration file.
pub const ENV_CONFIG: &str = "OMNES_CONFIG";

/// Omnes: site assistant relay and terminal chat client.
#[derive(Parser, Debug)]
#[command(name = "omnes", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the relay gateway (default).
    Serve {
        /// Relay port.
        #[arg(short = 'p', long = "port")]
        port: Option<u16>,
    },
    /// Chat with a running relay from the terminal.
    Chat {
        /// Relay chat endpoint, e.g. http://127.0.0.1:8788/api/chat.
        #[arg(short = 'u', long = "relay-url")]
        relay_url: Option<String>,
    },
}

impl CliArgs {
    /// The selected subcommand, `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { port: None })
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > OMNES_CONFIG env var > ~/.omnes/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var(ENV_CONFIG) {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".omnes").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".omnes").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let args = CliArgs::try_parse_from(["omnes"]).unwrap();
        assert_eq!(args.command(), Command::Serve { port: None });
        assert!(args.resolve_log_level().is_none());
    }

    #[test]
    fn test_serve_port_and_global_flags() {
        let args =
            CliArgs::try_parse_from(["omnes", "serve", "--port", "9000", "-l", "debug"]).unwrap();
        assert_eq!(args.command(), Command::Serve { port: Some(9000) });
        assert_eq!(args.resolve_log_level().as_deref(), Some("debug"));
    }

    #[test]
    fn test_chat_relay_url() {
        let args = CliArgs::try_parse_from([
            "omnes",
            "chat",
            "--relay-url",
            "http://localhost:9000/api/chat",
        ])
        .unwrap();
        assert_eq!(
            args.command(),
            Command::Chat {
                relay_url: Some("http://localhost:9000/api/chat".to_string())
            }
        );
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let args = CliArgs::try_parse_from(["omnes", "-c", "/tmp/omnes.toml"]).unwrap();
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/omnes.toml"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(CliArgs::try_parse_from(["omnes", "serve", "--port", "99999"]).is_err());
    }
}
