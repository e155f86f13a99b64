mod airtable;
mod config;
mod documents;
mod error;
mod handlers;
mod portfolio;
mod repository;
mod response;
mod schemas;
mod services;
mod transform;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use http_body_util::BodyExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::airtable::AirtableClient;
use crate::config::AppConfig;
use crate::documents::ListingClient;
use crate::repository::{FileListing, RecordStore};
use crate::services::{AdminService, DocumentService, PortfolioService};

async fn print_request_body(
    request: Request,
    next: Next,
) -> Result<Response, axum::http::StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = buffer_and_print("request", body).await?;
    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}

async fn buffer_and_print<B>(
    direction: &str,
    body: B,
) -> Result<bytes::Bytes, axum::http::StatusCode>
where
    B: axum::body::HttpBody<Data = bytes::Bytes>,
    B::Error: std::fmt::Display,
{
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            tracing::warn!("failed to read {} body: {}", direction, err);
            return Err(axum::http::StatusCode::BAD_REQUEST);
        }
    };

    if let Ok(body_str) = std::str::from_utf8(&bytes) {
        if !body_str.is_empty() {
            tracing::debug!("{} body = {:?}", direction, body_str);
        }
    }

    Ok(bytes)
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
    pub listing: Arc<dyn FileListing>,
}

impl AppState {
    pub fn portfolio_service(&self) -> PortfolioService {
        PortfolioService::new(self.store.clone())
    }

    pub fn admin_service(&self) -> AdminService {
        AdminService::new(self.store.clone(), self.config.site_url.clone())
    }

    pub fn document_service(&self) -> DocumentService {
        DocumentService::new(self.listing.clone(), self.config.site_url.clone())
    }
}

fn cors_layer(site_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match site_url.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!("SITE_URL is not a valid origin, CORS disabled: {}", site_url);
            layer
        }
    }
}

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/investors", get(handlers::list_investors))
        .route("/portfolio/{investor}", get(handlers::get_portfolio))
        .route(
            "/admin/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/admin/records/{id}",
            put(handlers::update_record).delete(handlers::delete_record),
        )
        .route("/admin/embed/{investor}", get(handlers::get_embed_code))
        .route("/doc-center", post(handlers::create_doc_center))
        .route("/docs/{name}", get(handlers::list_documents));

    Router::new()
        .route("/", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(print_request_body))
        .layer(cors_layer(&state.config.site_url))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "investor_portal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    if config.airtable.credentials().is_err() {
        tracing::warn!("Airtable credentials are not set; portfolio requests will fail");
    }
    if config.listing_url.is_none() {
        tracing::warn!("DOC_LISTING_URL is not set; document listings will fail");
    }

    let store = AirtableClient::new(config.airtable.clone(), config.http_timeout)
        .expect("Failed to build Airtable client");
    let listing = ListingClient::new(config.listing_url.clone(), config.http_timeout)
        .expect("Failed to build document listing client");

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        listing: Arc::new(listing),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind address");
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app(state))
        .await
        .expect("Server error");
}

async fn health_check() -> &'static str {
    "Investor Portal Backend is Online!"
}
