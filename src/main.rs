use std::process::ExitCode;
use std::sync::Arc;

use piggychef::api::start_api_server;
use piggychef::config::{ServerConfig, APP_VERSION};
use piggychef::core_state::CoreState;

fn main() -> ExitCode {
    piggychef::init_tracing();
    tracing::info!("PiggyChef starting v{APP_VERSION}");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let bind = config.bind;

    // Blocking HTTP clients must be built and dropped outside the runtime.
    let core = match CoreState::from_config(config) {
        Ok(core) => Arc::new(core),
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Cannot start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(serve(core.clone(), bind));
    drop(runtime);
    drop(core);
    code
}

async fn serve(core: Arc<CoreState>, bind: std::net::SocketAddr) -> ExitCode {
    let server = match start_api_server(core, bind).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.stop().await;
    ExitCode::SUCCESS
}
