use std::net::SocketAddr;
use std::process;

use bayberry::config::Settings;
use bayberry::logging::init_tracing;
use bayberry::routes::configure_routes;
use bayberry::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            process::exit(1);
        }
    };

    let address = SocketAddr::new(settings.api_host, settings.api_port);
    let state = AppState::new(settings);
    let routes = configure_routes(state);

    tracing::info!(%address, "Starting server");
    warp::serve(routes).run(address).await;
}
