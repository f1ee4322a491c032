use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use listkit::{InMemoryRepository, Paginator, Repository};
use listkit_db::SeaOrmRepository;
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod app;
mod posts;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const SEED_POSTS: i64 = 100;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Adds `mode=rwc` when no query is given so the file gets created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, q),
        None => (db_path, "mode=rwc"),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    Ok(format!(
        "sqlite://{}?{}",
        p.to_string_lossy().replace('\\', "/"),
        query
    ))
}

/// Listing Server - filterable, paginated `/posts` endpoint
#[derive(Parser)]
#[command(name = "listing-server")]
#[command(about = "Listing Server - filterable, paginated /posts endpoint")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Serve generated posts from memory instead of the database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("Listing Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

async fn connect(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let raw = db_config.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let dsn = if raw.starts_with("sqlite:") {
        absolutize_sqlite_dsn(raw, base_dir, true)?
    } else {
        raw.to_string()
    };

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if dsn == "sqlite::memory:" {
        // every pooled connection would get its own empty database
        opts.max_connections(1).min_connections(1);
    }

    tracing::info!(dsn = %dsn, "Connecting to database");
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("cannot connect to {dsn}"))?;

    let backend = db.get_database_backend();
    let mut create = Schema::new(backend).create_table_from_entity(posts::Entity);
    create.if_not_exists();
    db.execute(backend.build(&create))
        .await
        .context("cannot create the posts table")?;

    let seeded = posts::seed_table(&db, SEED_POSTS)
        .await
        .context("cannot seed the posts table")?;
    if seeded > 0 {
        tracing::info!(rows = seeded, "Seeded empty posts table");
    }
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let repo: Arc<dyn Repository<posts::Model>> = match (&config.database, args.mock) {
        (Some(db_config), false) => {
            let db = connect(db_config, &config.home_dir()).await?;
            Arc::new(SeaOrmRepository::new(db, posts::field_map()))
        }
        (db_config, mock) => {
            if !mock && db_config.is_none() {
                tracing::warn!("No database configuration found, serving generated posts");
            }
            let repo = InMemoryRepository::new(posts::seed(SEED_POSTS));
            tracing::info!(rows = repo.len(), "Serving posts from memory");
            Arc::new(repo)
        }
    };

    let links = config.link_config();
    tracing::info!(base = %links.base_url("")?, "Next-page links");
    let state = app::AppState::new(Paginator::new(links), repo);
    let router = app::build_router(state, config.server.timeout_sec);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .map_err(|e| anyhow!(e))
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = tokio::signal::ctrl_c() => {},
            }
            tracing::info!("HTTP server shutting down gracefully");
            return;
        }
    }
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("HTTP server shutting down gracefully");
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        if db.url.starts_with("sqlite:") {
            absolutize_sqlite_dsn(db.url.trim(), &config.home_dir(), false)?;
        }
    }
    config.link_config().base_url("")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
