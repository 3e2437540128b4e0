use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hotfolder::config::{Config, ConfigOverrides, DEFAULT_CONFIG_FILE};
use hotfolder::ocr::OcrProvider;
use hotfolder::watcher::{FolderWatcher, HotFolderHandler};

#[derive(Parser)]
#[command(name = "hotfolder")]
#[command(about = "Monitor a folder and OCR new images and PDFs")]
struct Args {
    /// Directory to watch for new images
    #[arg(long)]
    watch_folder: Option<PathBuf>,

    /// Directory where OCR text output will be saved
    #[arg(long)]
    output_path: Option<PathBuf>,

    /// Directory where Joplin markdown notes will be saved
    #[arg(long)]
    joplin_path: Option<PathBuf>,

    /// Path to config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Process the given files once, as if they had just been dropped, and exit
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hotfolder=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing(args.log_json);

    let overrides = ConfigOverrides {
        watch_folder: args.watch_folder,
        output_path: args.output_path,
        joplin_path: args.joplin_path,
    };
    let config = Config::load(&args.config, &overrides)?;
    config.ensure_directories()?;

    tracing::info!("Watch folder: {}", config.watch_folder.display());
    tracing::info!("Output directory: {}", config.output_path.display());
    if let Some(joplin_path) = &config.joplin_path {
        tracing::info!("Joplin notes directory: {}", joplin_path.display());
    }

    tracing::info!("Initializing OCR backend: {}...", config.ocr.backend);
    let ocr = OcrProvider::new(&config.ocr);
    if !ocr.is_available() {
        tracing::warn!("OCR unavailable - files will be written with empty text");
    }

    let handler = HotFolderHandler::from_config(&config, ocr);

    if let Some(Command::Process { files }) = args.command {
        handler.process_files(files).await;
        return Ok(());
    }

    let watcher = FolderWatcher::new(&config.watch_folder)?;
    tracing::info!("Monitoring hot folder: {}", config.watch_folder.display());
    tracing::info!("Press Ctrl+C to stop");

    let cancel_token = CancellationToken::new();
    let watch_task = tokio::spawn(watcher.run(handler, cancel_token.child_token()));

    shutdown_signal(cancel_token).await;
    watch_task.await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping watcher...");
    cancel_token.cancel();
}
