//! Development account API server
//! Keeps every account in memory; restart to start from scratch

use account_portal::config::{get_bind_address, load_mock_server_config};
use account_portal::mock_handlers::{configure_mock_routes, MockAccountState};
use actix_web::{web, App, HttpServer};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = load_mock_server_config()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let bind_address = get_bind_address(&config);
    let state = web::Data::new(MockAccountState::from_config(&config));

    log::info!("Mock account API listening on http://{}/api/v1", bind_address);
    log::info!("Recovery codes are written to this log");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure_mock_routes))
        .bind(bind_address)?
        .run()
        .await
}
