use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wager_controller::config::Config;
use wager_controller::controller::{self, ControllerEvent, WagerController};
use wager_controller::host::{EnvHost, HostPlatform};
use wager_controller::presenter::TracingPresenter;
use wager_controller::settlement_client::HttpSettlementClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging with JSON formatting (configurable via env)
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "json".to_string())
        .eq_ignore_ascii_case("json");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wager_controller=info".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        service = "wager-controller",
        version = env!("CARGO_PKG_VERSION"),
        log_format = if use_json { "json" } else { "text" },
        "Starting wager controller"
    );

    let config = Config::load()?;
    tracing::info!(
        api_base_url = %config.api.base_url,
        min_animation_ms = config.controller.min_animation_ms,
        settlement_timeout_ms = config.controller.settlement_timeout_ms,
        "Configuration loaded"
    );

    let metrics_handle = config
        .metrics_port
        .map(|port| tokio::spawn(start_metrics_server(port)));

    let host = EnvHost::new(&config.host);
    host.expand_viewport();
    host.enable_closing_confirmation();

    let api = Arc::new(HttpSettlementClient::new(
        config.api.base_url.clone(),
        config.api.http_timeout(),
    )?);

    let (events_tx, events_rx) = controller::channel();
    let mut controller = WagerController::new(
        api,
        TracingPresenter,
        host.init_data(),
        config.controller.clone(),
        events_tx.clone(),
    );

    if let Err(e) = controller.bootstrap().await {
        warn!(error = %e, "Starting without a session; use `refresh` to retry");
    }

    let shutdown = CancellationToken::new();
    let controller_handle = tokio::spawn(controller.run(events_rx, shutdown.clone()));

    info!("Commands: spin | bet <amount> | game <slots|roulette> | refresh | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(Command::Event(event)) => {
                        if events_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    None => warn!(input = %line.trim(), "Unknown command"),
                }
            }
        }
    }

    shutdown.cancel();
    let _ = controller_handle.await;
    if let Some(handle) = metrics_handle {
        handle.abort();
    }

    tracing::info!("Wager controller stopped");

    Ok(())
}

enum Command {
    Event(ControllerEvent),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match (parts.next()?, parts.next()) {
        ("spin", None) => Command::Event(ControllerEvent::Spin),
        ("refresh", None) => Command::Event(ControllerEvent::Refresh),
        ("quit" | "exit", None) => Command::Quit,
        ("bet", Some(amount)) => Command::Event(ControllerEvent::SelectBet(amount.parse().ok()?)),
        ("game", Some(game)) => Command::Event(ControllerEvent::SelectGame(game.parse().ok()?)),
        _ => return None,
    };
    Some(command)
}

async fn start_metrics_server(port: u16) -> Result<()> {
    use axum::{routing::get, Router};
    use std::net::SocketAddr;

    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;

    let app = Router::new().route(
        "/metrics",
        get(|| async move { handle.render() }),
    );

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Controller metrics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
