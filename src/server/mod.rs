use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::service::AddressService;

pub mod routes;

/// Server state
pub struct AppState {
    pub service: AddressService,
}

/// Build the HTTP router over a service
pub fn router(service: AddressService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(routes::health))
        .route("/address/", post(routes::create_address))
        .route(
            "/address/{id}",
            get(routes::get_address)
                .put(routes::update_address)
                .delete(routes::delete_address),
        )
        .route("/addresses/", get(routes::list_addresses))
        .route("/addresses_within_distance/", get(routes::addresses_within_distance))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until the process stops
pub async fn serve(listener: tokio::net::TcpListener, service: AddressService) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Address book listening on http://{}", addr);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

pub async fn start_server(addr: SocketAddr, service: AddressService) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, service).await
}
