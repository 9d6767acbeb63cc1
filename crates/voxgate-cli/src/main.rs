mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::{AudioBackend, VoxgateConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use voxgate_agent::Assistant;
use voxgate_gateway::{spawn_session_sweeper, GatewayOptions, GatewayServer, IvrController};
use voxgate_session::InMemorySessionStore;
use voxgate_speech::{AudioStore, FileAudioStore, InMemoryAudioStore, Synthesizer};

#[derive(Parser)]
#[command(name = "voxgate", about = "voxgate: phone call assistant over telephony webhooks")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "voxgate.toml")]
    config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate the config and print the resolved settings
    Check,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = VoxgateConfig::load(&cli.config).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load config file '{}': {e}",
            cli.config.display()
        )
    })?;
    for warning in config.warnings() {
        warn!("{warning}");
    }

    match cli.command {
        Commands::Check => {
            println!("server:   {}:{}", config.server.host, config.server.port);
            println!(
                "public:   {}",
                config.server.public_url.as_deref().unwrap_or("(from Host header)")
            );
            println!("model:    {:?} {}", config.model.provider, config.model.model_id);
            println!(
                "voice:    {} ({})",
                config.voice.voice.voice_id, config.voice.voice.model_id
            );
            println!("audio:    {:?}", config.audio.backend);
            println!(
                "session:  ttl {}s, sweep every {}s",
                config.session.ttl_secs,
                config.session.sweep_interval().as_secs()
            );
            println!("escalate: {} attempts", config.call.max_escalations);
            Ok(())
        }
        Commands::Serve { host, port } => serve(config, host, port).await,
    }
}

async fn serve(
    config: VoxgateConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);

    info!("Starting voxgate on {host}:{port}");

    let audio: Arc<dyn AudioStore> = match config.audio.backend {
        AudioBackend::Memory => Arc::new(InMemoryAudioStore::new()),
        AudioBackend::File => {
            info!(dir = %config.audio.dir.display(), "Storing audio on disk");
            let store =
                FileAudioStore::new(config.audio.dir.clone(), config.voice.content_type.clone())
                    .await?;
            Arc::new(store)
        }
    };

    let sessions = Arc::new(InMemorySessionStore::new());
    let assistant = Arc::new(Assistant::new(config.model));
    let synthesizer = Arc::new(Synthesizer::new(config.voice, audio));
    let controller = Arc::new(IvrController::new(
        sessions,
        assistant,
        synthesizer,
        config.call,
    ));

    let ttl = config.session.ttl();
    let sweeper =
        spawn_session_sweeper(controller.clone(), ttl, config.session.sweep_interval());

    let app = GatewayServer::build(
        controller,
        GatewayOptions {
            public_url: config.server.public_url,
            session_ttl: ttl,
        },
    );

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("voxgate listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("voxgate shut down");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
