//! Petclinic server and migration CLI.

use clap::{Parser, Subcommand};
use config::ConfigError;
use petclinic::config::{AppConfig, Backend, DEFAULT_CONFIG_FILE};
use petclinic::migration::{MigrationStatus, Migrator};
use petclinic::pool::PgPool;
use petclinic::{build_clinic, web, ClinicError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "petclinic")]
#[command(about = "Veterinary clinic web application")]
#[command(version)]
struct Cli {
    /// Configuration file (optional; env vars prefixed PETCLINIC__ override it)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web application (default)
    Serve {
        /// Address to bind, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,

        /// Use the seeded in-memory store instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },

    /// Apply pending migrations and exit
    Migrate,

    /// Show migration status (applied vs pending)
    Status,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    #[cfg(feature = "tracing")]
    {
        let spans = if cli.verbose { "petclinic=info" } else { "off" };
        if let Err(e) = petclinic::metrics::tracing_helpers::init_subscriber(spans) {
            log::warn!("{e}");
        }
    }

    let mut config = match AppConfig::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve { bind: None, memory: false }) {
        Commands::Serve { bind, memory } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if memory {
                config.database.backend = Backend::Memory;
            }
            run_server(&config)
        }
        Commands::Migrate => handle_migrate(&config),
        Commands::Status => handle_status(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_server(config: &AppConfig) -> Result<(), ClinicError> {
    if let Some(workers) = config.server.workers {
        may::config().set_workers(workers);
    }

    let clinic = build_clinic(config)?;
    let handle = web::server::serve(clinic, &config.server.bind)
        .map_err(|e| ClinicError::Internal(format!("cannot bind {}: {e}", config.server.bind)))?;
    handle
        .join()
        .map_err(|_| ClinicError::Internal("server coroutine panicked".to_string()))
}

fn open_pool(config: &AppConfig) -> Result<PgPool, ClinicError> {
    if config.database.backend != Backend::Postgres {
        return Err(ConfigError::Message("migrations need database.backend = \"postgres\"".to_string()).into());
    }
    Ok(PgPool::from_config(&config.database)?)
}

fn handle_migrate(config: &AppConfig) -> Result<(), ClinicError> {
    let pool = open_pool(config)?;
    let conn = pool.acquire()?;
    let migrator = Migrator::new(&config.database.migrations_dir);

    println!("Applying migrations...");
    let applied = migrator.up(&conn)?;
    if applied > 0 {
        println!("Applied {applied} migration(s)");
    } else {
        println!("No migrations to apply");
    }
    Ok(())
}

fn handle_status(config: &AppConfig) -> Result<(), ClinicError> {
    let pool = open_pool(config)?;
    let conn = pool.acquire()?;
    let migrator = Migrator::new(&config.database.migrations_dir);
    let status = migrator.status(&*conn)?;
    print_status(&status);
    Ok(())
}

fn print_status(status: &MigrationStatus) {
    println!("\nMigration Status\n");

    if status.applied.is_empty() {
        println!("Applied Migrations: None");
    } else {
        println!("Applied Migrations ({}):", status.applied.len());
        for record in &status.applied {
            let time = record
                .execution_time_ms
                .map_or_else(|| "N/A".to_string(), |ms| format!("{ms}ms"));
            println!(
                "  m{}_{} ({}, {})",
                record.version,
                record.name,
                record.applied_at.format("%Y-%m-%d %H:%M:%S"),
                time
            );
        }
    }

    println!();

    if status.pending.is_empty() {
        println!("Pending Migrations: None");
    } else {
        println!("Pending Migrations ({}):", status.pending.len());
        for pending in &status.pending {
            println!("  m{}_{} (pending)", pending.version, pending.name);
        }
    }

    println!(
        "\nSummary: {} applied, {} pending",
        status.applied.len(),
        status.pending.len()
    );
}
