use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_server::cache::ResponseCache;
use transit_server::config::Settings;
use transit_server::siri::SiriClient;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let cache = ResponseCache::new(&settings.cache);
    let siri = match SiriClient::new(settings.siri, cache) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to create SIRI client");
            return ExitCode::FAILURE;
        }
    };
    info!(rt_system_id = %siri, object_id_tag = siri.object_id_tag(), "SIRI source configured");

    let app = create_router(AppState::new(siri));

    let listener = match tokio::net::TcpListener::bind(settings.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %settings.bind_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %settings.bind_addr, "listening");
    info!("  GET /health         - Health check");
    info!("  GET /status         - Real-time source status");
    info!("  GET /next_passages  - Next passages at a route point");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
