use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use talknest_core::{ensure_skeleton_config, load_config, RoleplayClient};
use talknest_memory::HistoryStore;
use talknest_provider::create_provider;
use talknest_schema::catalog;

#[derive(Parser)]
#[command(
    name = "talknest",
    version,
    about = "Terminal role-play trainer for parent-child communication"
)]
struct Cli {
    #[arg(
        long,
        default_value = "~/.talknest",
        help = "Config root directory (contains config.yaml and history.json)"
    )]
    config_root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start the interactive practice TUI")]
    Practice,
    #[command(subcommand, about = "Manage saved practice records")]
    History(HistoryCommands),
    #[command(about = "List built-in practice scenarios")]
    Scenarios,
    #[command(about = "Validate the config file")]
    Validate,
}

#[derive(Subcommand)]
enum HistoryCommands {
    #[command(about = "List saved practice records")]
    List,
    #[command(about = "Show one record in full, including the transcript")]
    Show {
        #[arg(help = "Record ID")]
        record_id: String,
    },
    #[command(about = "Delete a record by ID")]
    Delete {
        #[arg(help = "Record ID")]
        record_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Expand ~ to home directory
    if cli.config_root.starts_with("~") {
        if let Some(home) = std::env::var_os("HOME") {
            cli.config_root = PathBuf::from(home).join(
                cli.config_root
                    .strip_prefix("~")
                    .unwrap_or(&cli.config_root),
            );
        }
    }

    let log_dir = cli.config_root.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "talknest.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // The practice TUI owns the terminal; logs go to file only while it runs.
    let stderr_layer = match cli.command {
        Some(Commands::Practice) => None,
        _ => Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Practice => {
            let config_path = ensure_skeleton_config(&cli.config_root)?;
            let config = load_config(&cli.config_root)
                .with_context(|| format!("config error in {}", config_path.display()))?;
            let provider = create_provider(&config.provider_settings())?;
            let client = RoleplayClient::new(
                provider,
                config.provider.model.clone(),
                config.provider.temperature,
            );
            let store = HistoryStore::new(config.history_path(&cli.config_root));
            tracing::info!(
                "Starting practice session (model: {}, history: {})",
                config.provider.model,
                store.path().display()
            );
            talknest_tui::run_tui(client, store).await?;
        }
        Commands::Validate => {
            let config = load_config(&cli.config_root)?;
            println!(
                "Config valid. provider={:?}, model={}, history={}",
                config.provider.kind,
                config.provider.model,
                config.history_path(&cli.config_root).display()
            );
        }
        Commands::Scenarios => {
            println!("{:<10} {:<12} {}", "ID", "CATEGORY", "TITLE");
            println!("{}", "-".repeat(48));
            for scenario in catalog::builtin_scenarios() {
                println!(
                    "{:<10} {:<12} {}",
                    scenario.id, scenario.category, scenario.title
                );
            }
        }
        Commands::History(cmd) => {
            let config = load_config(&cli.config_root)?;
            let store = HistoryStore::new(config.history_path(&cli.config_root));
            match cmd {
                HistoryCommands::List => {
                    let records = store.load().await?;
                    if records.is_empty() {
                        println!("No practice records yet.");
                    } else {
                        println!("{:<38} {:<18} {}", "ID", "DATE", "SCENARIO");
                        println!("{}", "-".repeat(76));
                        for record in &records {
                            println!(
                                "{:<38} {:<18} {}",
                                record.id,
                                record
                                    .timestamp
                                    .with_timezone(&chrono::Local)
                                    .format("%Y-%m-%d %H:%M"),
                                record.scenario_title,
                            );
                        }
                    }
                }
                HistoryCommands::Show { record_id } => {
                    let records = store.load().await?;
                    let record = records
                        .iter()
                        .find(|record| record.id == record_id)
                        .ok_or_else(|| anyhow::anyhow!("record not found: {record_id}"))?;
                    println!("Scenario: {}", record.scenario_title);
                    println!(
                        "Date: {}",
                        record
                            .timestamp
                            .with_timezone(&chrono::Local)
                            .format("%Y-%m-%d %H:%M")
                    );
                    println!();
                    for (title, dimension) in record.report.dimensions() {
                        println!("{} [{}]", title, dimension.level.label());
                        println!("  {}", dimension.reason);
                    }
                    println!();
                    for message in &record.chat_history {
                        println!("[{}] {}", message.role.transcript_label(), message.text);
                    }
                }
                HistoryCommands::Delete { record_id } => {
                    if store.delete_record(&record_id).await? {
                        println!("Record '{record_id}' deleted.");
                    } else {
                        println!("Record '{record_id}' not found.");
                    }
                }
            }
        }
    }

    Ok(())
}
