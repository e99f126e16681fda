//! Core application

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::api::{ApiServer, AuthManager};
use crate::core::cli::{
    self, CleanFormat, CliConfig, Commands, LoadCommands, SystemCommands, UserCommands,
};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, MIN_PASSWORD_LENGTH};
use crate::core::secret::SecretManager;
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::TransactionalService;
use crate::data::types::UniversityRow;
use crate::domain::ingest::{
    self, CleanRoom, LibraryMap, LoadReport, RawBuilding, StudyRoomRecord, UniversityRecord,
};
use crate::utils::file::{read_json, write_file};
use crate::utils::password::hash_password;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub secrets: SecretManager,
    pub database: Arc<TransactionalService>,
    pub auth: Arc<AuthManager>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System { command }) => Self::handle_system_command(command),
            Some(Commands::Clean {
                input,
                output,
                institution,
                format,
            }) => Self::clean(&input, output.as_deref(), &institution, format).await,
            Some(Commands::Load { command }) => {
                let app = Self::init(&cli_config).await?;
                let result = app.load(command).await;
                app.database.close().await;
                result
            }
            Some(Commands::User { command }) => {
                let app = Self::init(&cli_config).await?;
                let result = app.handle_user_command(command).await;
                app.database.close().await;
                result
            }
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;
        let secrets = SecretManager::init(&storage).await?;
        secrets.ensure_secrets().await?;

        let database = Arc::new(
            TransactionalService::init(&storage, &config.database)
                .await
                .context("Failed to open database")?,
        );
        let auth = Arc::new(AuthManager::init(&secrets, &config.auth).await?);
        let shutdown = ShutdownService::new(database.clone());

        tracing::debug!(data_dir = %storage.data_dir().display(), "Application initialized");

        Ok(Self {
            shutdown,
            config,
            storage,
            secrets,
            database,
            auth,
        })
    }

    /// `clean`: raw scraper document in, cleaned room records out
    async fn clean(
        input: &Path,
        output: Option<&Path>,
        institution: &str,
        format: CleanFormat,
    ) -> Result<()> {
        let raw: Vec<RawBuilding> = read_json(input).await?;
        let rooms = ingest::clean_buildings(&raw, institution);
        tracing::info!(
            buildings = raw.len(),
            rooms = rooms.len(),
            ?format,
            "Cleaned room document"
        );

        let bytes = match format {
            CleanFormat::Json => {
                let mut json = serde_json::to_vec_pretty(&rooms)?;
                json.push(b'\n');
                json
            }
            CleanFormat::Csv => ingest::rooms_to_csv(&rooms).context("Failed to render CSV")?,
        };

        match output {
            Some(path) => write_file(path, bytes).await,
            None => {
                std::io::Write::write_all(&mut std::io::stdout(), &bytes)?;
                Ok(())
            }
        }
    }

    async fn load(&self, command: LoadCommands) -> Result<()> {
        let pool = self.database.pool();
        let report = match command {
            LoadCommands::Universities { file } => {
                let records: Vec<UniversityRecord> = read_json(&file).await?;
                ingest::load_universities(pool, &records).await?
            }
            LoadCommands::Rooms {
                file,
                university,
                state,
            } => {
                let university = self.require_university(&university, &state).await?;
                let rooms: Vec<CleanRoom> = read_json(&file).await?;
                ingest::load_rooms(pool, university.id, &rooms).await?
            }
            LoadCommands::StudyRooms {
                file,
                library_map,
                university,
                state,
            } => {
                let university = self.require_university(&university, &state).await?;
                let library_map: LibraryMap = read_json(&library_map).await?;
                let rooms: Vec<StudyRoomRecord> = read_json(&file).await?;
                ingest::load_study_rooms(pool, university.id, &library_map, &rooms).await?
            }
        };
        Self::print_report(&report);
        Ok(())
    }

    async fn require_university(&self, name: &str, state: &str) -> Result<UniversityRow> {
        match self
            .database
            .repository()
            .find_university(name.trim(), state.trim())
            .await?
        {
            Some(university) => Ok(university),
            None => bail!(
                "University '{}' ({}) not found; load universities first",
                name,
                state
            ),
        }
    }

    fn print_report(report: &LoadReport) {
        tracing::info!(
            inserted = report.inserted,
            skipped = report.skipped,
            campuses_created = report.campuses_created,
            buildings_created = report.buildings_created,
            "Load finished"
        );
        println!(
            "Inserted {}, skipped {} (new campuses: {}, new buildings: {})",
            report.inserted, report.skipped, report.campuses_created, report.buildings_created
        );
    }

    async fn handle_user_command(&self, command: UserCommands) -> Result<()> {
        match command {
            UserCommands::CreateAdmin { username, password } => {
                let username = username.trim();
                if username.is_empty() {
                    bail!("Username cannot be empty");
                }
                if (password.chars().count() as u64) < MIN_PASSWORD_LENGTH {
                    bail!(
                        "Password must be at least {} characters",
                        MIN_PASSWORD_LENGTH
                    );
                }

                let password_hash =
                    tokio::task::spawn_blocking(move || hash_password(&password)).await??;
                let user = self
                    .database
                    .repository()
                    .upsert_admin(username, &password_hash)
                    .await?;

                let verb = if user.was_created() {
                    "Created"
                } else {
                    "Updated"
                };
                println!("{} admin '{}'", verb, user.into_inner().username);
                Ok(())
            }
        }
    }

    fn handle_system_command(cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();
        if !data_dir.exists() {
            println!("Nothing to prune: {} does not exist", data_dir.display());
            return Ok(());
        }
        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!(
            "This deletes the database and secrets in {}",
            data_dir.display()
        );
        println!("Stop the server before continuing.");

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_level(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Signal handlers first so Ctrl+C during startup still shuts down cleanly
        app.shutdown.install_signal_handlers();

        app.shutdown
            .register(
                app.database
                    .start_checkpoint_task(app.shutdown.subscribe()),
            )
            .await;

        if !app.auth.is_enabled() {
            tracing::warn!("Authentication disabled; writes are attributed by request username");
        }
        tracing::info!(
            secrets = app.secrets.backend().name(),
            data_dir = %app.storage.data_dir().display(),
            "Starting Campus Insider"
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
