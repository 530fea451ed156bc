use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use relaybot::app::{
    chat_loop::ChatLoop, dispatcher::CommandDispatcher, ingest::Ingestor,
    rate_limiter::RateLimiter,
};
use relaybot::domain::detection::DetectionSchema;
use relaybot::infra::{
    config::ConfigLoader,
    discord::DiscordClient,
    host_commands::HostCommands,
    logging::{init_logging, BootError},
    reqwest_hardware::ReqwestHardware,
    system_clock::SystemClock,
};
use relaybot::ports::{clock::Clock, notifier::Notifier};
use relaybot::server::{self, AppState};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about = "Relay between a local detector and a Discord channel")]
struct Args {
    /// Path to config.toml (defaults to res/config.toml or /etc/relaybot/config.toml).
    #[arg(long, env = "RELAYBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), BootError> {
    let args = Args::parse();
    let cfg_path = pick_config_path(args.config);
    let cfg = ConfigLoader::load(&cfg_path)
        .await
        .map_err(|e| BootError::Fatal(format!("{}: {e}", cfg_path.display())))?;
    let _log_guard = init_logging(&cfg.logging)?;

    info!(
        config = %cfg_path.display(),
        listen = %cfg.listen_addr,
        channel_id = %cfg.chat.channel_id,
        capacity = cfg.cooldown.capacity,
        window_minutes = cfg.cooldown.window_minutes,
        timezone = %cfg.timezone,
        "Loaded config"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let limiter = Arc::new(RateLimiter::new(&cfg.cooldown, clock.clone()));

    let discord = Arc::new(
        DiscordClient::new(&cfg.chat, &cfg.requests).map_err(|e| BootError::Fatal(e.to_string()))?,
    );
    let hardware = Arc::new(
        ReqwestHardware::new(&cfg.hardware, &cfg.requests)
            .map_err(|e| BootError::Fatal(e.to_string()))?,
    );
    let host = Arc::new(HostCommands::new(&cfg.host, cfg.requests.timeout));
    let schema = DetectionSchema::bundled().map_err(|e| BootError::Fatal(e.to_string()))?;

    let session = discord
        .open()
        .await
        .map_err(|e| BootError::Fatal(format!("opening chat session: {e}")))?;

    let notifier: Arc<dyn Notifier> = discord.clone();
    let dispatcher = Arc::new(CommandDispatcher::new(
        hardware,
        host,
        limiter.clone(),
        schema,
        session.user_id,
    ));
    let chat_loop = ChatLoop::new(discord.clone(), notifier.clone(), dispatcher);

    let ingestor = Arc::new(Ingestor::new(limiter, notifier.clone(), clock, cfg.timezone));
    let app = server::router(AppState { ingestor });
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .map_err(|e| BootError::Fatal(format!("bind {}: {e}", cfg.listen_addr)))?;
    info!(addr = %cfg.listen_addr, "Ingestion endpoint listening");

    let mut http_task = tokio::spawn(async move { axum::serve(listener, app).await });
    let mut chat_task = tokio::spawn(chat_loop.run_forever(cfg.chat.poll_interval));

    let outcome = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            Ok(())
        }
        res = &mut http_task => {
            error!(result = ?res, "HTTP server stopped");
            Err(BootError::Fatal("http server stopped".to_string()))
        }
        res = &mut chat_task => {
            error!(result = ?res, "Chat loop stopped");
            Err(BootError::Fatal("chat loop stopped".to_string()))
        }
    };

    http_task.abort();
    chat_task.abort();
    if let Err(e) = notifier.close().await {
        warn!(error = %e, "Closing chat session failed");
    }
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn pick_config_path(arg: Option<PathBuf>) -> PathBuf {
    if let Some(p) = arg {
        return p;
    }

    let candidates = [
        PathBuf::from("res/config.toml"),
        PathBuf::from("/etc/relaybot/config.toml"),
    ];
    for p in &candidates {
        if p.exists() {
            return p.clone();
        }
    }
    candidates[0].clone()
}
