use crate::config::toml_config::{TomlConfig, DEFAULT_CONFIG_FILE};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "postal-etl")]
#[command(about = "Enrich a postal code database from the CTT lookup API")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch municipality and district for every postal code in the input file
    Enrich(EnrichArgs),
    /// Look up a single postal code in the database
    Lookup(LookupArgs),
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    /// Input CSV with a postal code column
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Name of the postal code column
    #[arg(long)]
    pub column: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds to wait after each API request
    #[arg(long)]
    pub delay: Option<f64>,

    /// Do not call the API for codes already in the database
    #[arg(long)]
    pub skip_known: bool,

    /// Prompt for a postal code to look up once the pass is done
    #[arg(long)]
    pub interactive: bool,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Postal code (DDDD-DDD or 7 digits); prompted for when omitted
    pub code: Option<String>,
}

impl Cli {
    /// Loads the config file, if any, then applies command-line overrides.
    ///
    /// A missing default file is fine; a missing file named with `--config` is not.
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                TomlConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(db) = &self.db {
            config.store.db_path = db.clone();
        }

        if let Command::Enrich(args) = &self.command {
            if let Some(input) = &args.input {
                config.input.path = input.clone();
            }
            if let Some(column) = &args.column {
                config.input.column = column.clone();
            }
            if let Some(api_key) = &args.api_key {
                config.api.api_key = api_key.clone();
            }
            if let Some(base_url) = &args.base_url {
                config.api.base_url = base_url.clone();
            }
            if let Some(delay) = args.delay {
                config.throttle.request_delay_seconds = delay;
            }
            if args.skip_known {
                config.pipeline.skip_known = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use std::time::Duration;

    #[test]
    fn test_enrich_flags_override_config() {
        let cli = Cli::try_parse_from([
            "postal-etl",
            "--db",
            "out.db",
            "enrich",
            "--input",
            "in.csv",
            "--api-key",
            "secret",
            "--delay",
            "0",
            "--skip-known",
        ])
        .unwrap();

        let mut config = TomlConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.db_path(), Path::new("out.db"));
        assert_eq!(config.input_path(), Path::new("in.csv"));
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.request_delay(), Duration::ZERO);
        assert!(config.skip_known());
    }

    #[test]
    fn test_lookup_code_is_optional() {
        let cli = Cli::try_parse_from(["postal-etl", "lookup", "1000-000", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Lookup(args) => assert_eq!(args.code.as_deref(), Some("1000-000")),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["postal-etl", "lookup"]).unwrap();
        assert!(matches!(cli.command, Command::Lookup(LookupArgs { code: None })));
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from([
            "postal-etl",
            "--config",
            "/definitely/not/here.toml",
            "lookup",
        ])
        .unwrap();
        assert!(cli.load_config().is_err());
    }
}
