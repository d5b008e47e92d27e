// Main entry point
use clap::Parser;
use colored::Colorize;
use insight_cache::application::query::{cached_insight, similar_insights};
use insight_cache::domain::model::{CacheEntry, CacheKind};
use insight_cache::infrastructure::config::{self, Config};
use insight_cache::infrastructure::storage::cache::MemoryStore;
use insight_cache::infrastructure::storage::db::{init_database, SqliteStore};
use insight_cache::interfaces::cli::{Cli, Command};
use insight_cache::state::{AppState, StoreHandle};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load_config()?;

    // Initialize logging
    if config.logging.enable {
        init_logging(&config.logging)?;
    }

    if cli.generate_config {
        config::generate_config_sample()?;
        return Ok(());
    }
    if cli.edit_config {
        if let Some(config_path) = config::get_config_path() {
            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
            // Run editor in blocking task
            tokio::task::spawn_blocking(move || {
                std::process::Command::new(editor)
                    .arg(&config_path)
                    .status()
            })
            .await??;
        } else {
            eprintln!("{}", "Config file not found".red());
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        eprintln!("{}", "Please provide a command (see --help)".red());
        std::process::exit(1);
    };

    let state = open_state(&config, cli.memory).await?;
    let kind = if cli.search {
        CacheKind::Search
    } else {
        CacheKind::Question
    };

    tokio::select! {
        result = run(&state, kind, command, cli.json) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            Ok(())
        }
    }
}

async fn open_state(config: &Config, memory: bool) -> anyhow::Result<AppState> {
    if memory {
        let store = StoreHandle::Memory(Arc::new(MemoryStore::new()));
        return Ok(AppState::new(store, config.clone()));
    }

    let db_path = config::get_database_path(config);
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let conn = init_database(&db_path).await?;
    let store = StoreHandle::Sqlite(Arc::new(SqliteStore::new(conn)));
    Ok(AppState::new(store, config.clone()))
}

async fn run(state: &AppState, kind: CacheKind, command: Command, json: bool) -> anyhow::Result<()> {
    let resolver = state.resolver(kind);

    match command {
        Command::Key(target) => {
            println!(
                "{}",
                resolver.build_key(&target.brand, &target.model, &target.question())
            );
        }
        Command::Lookup(target) => {
            let found =
                cached_insight(&resolver, &target.brand, &target.model, &target.question()).await?;
            match found {
                Some(entry) if json => println!("{}", serde_json::to_string_pretty(&entry)?),
                Some(entry) => print!("{}", format_entry(&entry)),
                None => {
                    eprintln!("{}", "Not cached".yellow());
                    std::process::exit(2);
                }
            }
        }
        Command::Store {
            target,
            prompt,
            payload,
        } => {
            let payload = read_payload(payload).await?;
            let entry = resolver
                .store(&target.brand, &target.model, &target.question(), &prompt, payload)
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!(
                    "{} {} (expires {})",
                    "Stored".green(),
                    entry.key,
                    entry.expires_at.to_rfc3339()
                );
            }
        }
        Command::Similar { target, limit } => {
            let limit = limit.unwrap_or(state.config.cache.similar_limit);
            let entries = similar_insights(
                &resolver,
                &target.brand,
                &target.model,
                &target.question(),
                limit,
            )
            .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                eprintln!("{}", "No similar cached results".yellow());
            } else {
                for entry in &entries {
                    print!("{}", format_entry(entry));
                }
            }
        }
        Command::Status => print_status(state).await?,
    }

    Ok(())
}

/// Read the payload JSON from a file, or stdin for `-`
async fn read_payload(path: PathBuf) -> anyhow::Result<serde_json::Value> {
    let content = if path.as_os_str() == "-" {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??
    } else {
        tokio::fs::read_to_string(&path).await?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Initialize logging with path and level configuration
fn init_logging(logging: &config::Logging) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let level = match logging.level.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.path {
        if !path.is_empty() {
            // Log to file
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .init();
            return Ok(());
        }
    }

    // Log to stderr (default)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn format_entry(entry: &CacheEntry) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    writeln!(
        output,
        "{} {} {}",
        entry.brand.bright_magenta().bold(),
        entry.model.bright_magenta().bold(),
        format!("[{}]", entry.key).cyan()
    )
    .ok();
    writeln!(output, "  {}", entry.question.white()).ok();
    writeln!(
        output,
        "  {}",
        format!(
            "used {}x, last {}, expires {}",
            entry.usage_count,
            entry.last_used_at.to_rfc3339(),
            entry.expires_at.to_rfc3339()
        )
        .bright_black()
    )
    .ok();

    let payload = serde_json::to_string_pretty(&entry.payload).unwrap_or_default();
    for line in payload.lines() {
        writeln!(output, "    {}", line).ok();
    }
    writeln!(output).ok();
    output
}

async fn print_status(state: &AppState) -> anyhow::Result<()> {
    println!("{}", "icache Status".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match &state.store {
        StoreHandle::Sqlite(store) => {
            let stats = store.stats(chrono::Utc::now()).await?;
            println!(
                "Database: {} ({} entries, {} fresh, {} expired, {} total uses)",
                config::get_database_path(&state.config).display(),
                stats.total_entries,
                stats.fresh_entries,
                stats.expired_entries,
                stats.total_usage
            );
        }
        StoreHandle::Memory(store) => {
            println!("Memory store: {} entries", store.len());
        }
    }

    println!(
        "Config: {}",
        config::get_config_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not found (using defaults)".to_string())
    );
    println!(
        "TTL: question {}d, search {}d; similar limit {}",
        state.config.cache.question_ttl_days,
        state.config.cache.search_ttl_days,
        state.config.cache.similar_limit
    );

    Ok(())
}
