use clap::{Parser, Subcommand, ValueEnum};

use std::path::PathBuf;

use super::constants::{ENV_ADMIN_PASSWORD, ENV_CONFIG, ENV_DATABASE, ENV_HOST, ENV_PORT};

#[derive(Parser)]
#[command(name = "campus-insider")]
#[command(version, about = "Campus facilities reviews: ingestion, search and ratings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Disable authentication (for development)
    #[arg(long, global = true)]
    pub no_auth: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database file (defaults to the data directory)
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<PathBuf>,

    /// Maximum rows returned by location search
    #[arg(long, global = true, value_parser = parse_positive_limit)]
    pub search_limit: Option<i64>,
}

/// Parse a strictly positive row limit from CLI/env string
fn parse_positive_limit(s: &str) -> Result<i64, String> {
    match s.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!(
            "Invalid limit '{}'. Expected a positive integer",
            s
        )),
    }
}

/// Output format of the `clean` command
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanFormat {
    Json,
    Csv,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Clean a raw scraped rooms document into normalized room records
    Clean {
        /// Raw JSON document produced by the room scraper
        input: PathBuf,
        /// Where to write the cleaned records (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Institution name stamped on every record
        #[arg(long, default_value = "University of Southern Maine")]
        institution: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = CleanFormat::Json)]
        format: CleanFormat,
    },
    /// Load JSON documents into the database
    Load {
        #[command(subcommand)]
        command: LoadCommands,
    },
    /// User administration
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum LoadCommands {
    /// Load universities (`[{ "name", "state", "wiki_url" }]`)
    Universities {
        file: PathBuf,
    },
    /// Load cleaned classroom records for one university
    Rooms {
        file: PathBuf,
        #[arg(long)]
        university: String,
        #[arg(long)]
        state: String,
    },
    /// Load study rooms, mapping each library onto a building and campus
    StudyRooms {
        file: PathBuf,
        /// JSON object: library name -> { "building", "campus" }
        #[arg(long)]
        library_map: PathBuf,
        #[arg(long)]
        university: String,
        #[arg(long)]
        state: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum UserCommands {
    /// Create an admin account, or promote an existing one
    CreateAdmin {
        username: String,
        #[arg(long, env = ENV_ADMIN_PASSWORD, hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database and secrets). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub search_limit: Option<i64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        no_auth: cli.no_auth,
        config: cli.config,
        database: cli.database,
        search_limit: cli.search_limit,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_limit() {
        assert_eq!(parse_positive_limit("25"), Ok(25));
        assert!(parse_positive_limit("0").is_err());
        assert!(parse_positive_limit("-3").is_err());
        assert!(parse_positive_limit("many").is_err());
    }

    #[test]
    fn test_cli_load_rooms() {
        let cli = Cli::try_parse_from([
            "campus-insider",
            "load",
            "rooms",
            "usm_rooms.json",
            "--university",
            "University of Southern Maine",
            "--state",
            "ME",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Load {
                command:
                    LoadCommands::Rooms {
                        file,
                        university,
                        state,
                    },
            }) => {
                assert_eq!(file, PathBuf::from("usm_rooms.json"));
                assert_eq!(university, "University of Southern Maine");
                assert_eq!(state, "ME");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["campus-insider", "start", "--no-auth", "-p", "8080"]).unwrap();
        assert!(cli.no_auth);
        assert_eq!(cli.port, Some(8080));
        assert!(matches!(cli.command, Some(Commands::Start)));
    }

    #[test]
    fn test_cli_clean_csv_format() {
        let cli = Cli::try_parse_from([
            "campus-insider",
            "clean",
            "raw.json",
            "--format",
            "csv",
            "-o",
            "rooms.csv",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Clean { output, format, .. }) => {
                assert_eq!(output, Some(PathBuf::from("rooms.csv")));
                assert_eq!(format, CleanFormat::Csv);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["campus-insider", "clean", "raw.json", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_clean_default_institution() {
        let cli = Cli::try_parse_from(["campus-insider", "clean", "raw.json"]).unwrap();
        match cli.command {
            Some(Commands::Clean {
                input,
                output,
                institution,
                format,
            }) => {
                assert_eq!(input, PathBuf::from("raw.json"));
                assert!(output.is_none());
                assert_eq!(institution, "University of Southern Maine");
                assert_eq!(format, CleanFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
