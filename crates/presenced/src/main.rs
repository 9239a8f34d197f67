use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod config;
mod dbus_interface;
mod engine;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("presenced starting");

    let config = config::Config::from_env();
    let thresholds = config.load_thresholds()?;
    tracing::info!(
        frame_width = config.frame_width,
        frame_height = config.frame_height,
        default_task_count = config.default_task_count,
        "configuration loaded"
    );

    let (signal_tx, signal_rx) = tokio::sync::mpsc::unbounded_channel();
    let engine = engine::spawn_engine(&config, thresholds, signal_tx);
    let service = dbus_interface::LivenessService { engine };

    let builder = if config.session_bus {
        zbus::connection::Builder::session()?
    } else {
        zbus::connection::Builder::system()?
    };
    let conn = builder
        .name(dbus_interface::BUS_NAME)?
        .serve_at(dbus_interface::OBJECT_PATH, service)?
        .build()
        .await?;

    tokio::spawn(dbus_interface::forward_signals(conn.clone(), signal_rx));

    tracing::info!(
        bus = dbus_interface::BUS_NAME,
        session_bus = config.session_bus,
        "presenced ready"
    );

    // Keep running until signaled
    tokio::signal::ctrl_c().await?;
    tracing::info!("presenced shutting down");

    Ok(())
}
