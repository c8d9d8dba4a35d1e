use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use patch_board::display::{print_board, write_board_to_file};
use patch_board::{web, PcoClient, RefreshCoordinator, SettingsStore};

#[derive(Parser)]
#[command(name = "patch-board", about = "Live mic and in-ear pack assignments from Planning Center")]
struct Cli {
    /// Settings file shared by both modes
    #[arg(long, env = "PATCH_BOARD_SETTINGS", default_value = "patch-board.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Refresh once and print the board
    Show {
        /// Also write the board to this file
        #[arg(long)]
        output: Option<String>,
    },
    /// Serve the dashboard and keep it refreshed
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = SettingsStore::new(&cli.settings);
    let settings = store.load();
    info!(path = %store.path().display(), service_type = %settings.service_type_name, "settings loaded");

    let client = PcoClient::new().context("building HTTP client")?;
    let coordinator = RefreshCoordinator::new(Arc::new(client), settings);

    match cli.command.unwrap_or(Command::Show { output: None }) {
        Command::Show { output } => {
            coordinator.refresh().await;
            let board = coordinator.board();
            let settings = coordinator.settings();
            print_board(&board, &settings)?;
            if let Some(path) = output {
                write_board_to_file(&path, &board, &settings).with_context(|| format!("writing {}", path))?;
                println!("Board saved to {}", path);
            }
        }
        Command::Serve { port } => {
            coordinator.start_timer();
            println!("Access the dashboard at http://localhost:{}", port);
            web::start_server(port, coordinator, store).await?;
        }
    }

    Ok(())
}
