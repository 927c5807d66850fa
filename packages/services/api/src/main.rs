//! Roster API
//!
//! `student`, `employee` 테이블에 대한 CRUD를 HTTP로 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod entities;
mod error;
mod handlers;
mod middleware;
mod schema;
mod state;

use config::Config;
use entities::{Employee, Resource, Student};
use handlers::resource;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        database = %config.redacted_database_url(),
        max_connections = config.db_max_connections,
        bootstrap_schema = config.bootstrap_schema,
        "Starting roster API"
    );

    // 앱 상태 초기화
    let state = Arc::new(AppState::new(&config).await?);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Roster API listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(handlers::health::heartbeat))
        .route("/health", get(handlers::health::health_check))
        // Entities
        .merge(resource_routes::<Student>("/students"))
        .merge(resource_routes::<Employee>("/employees"))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}

/// 엔터티 하나의 CRUD 라우트
fn resource_routes<R: Resource>(base: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(base, get(resource::list::<R>).post(resource::create::<R>))
        .route(
            &format!("{}/{{id}}", base),
            get(resource::get::<R>)
                .put(resource::update::<R>)
                .delete(resource::delete::<R>),
        )
}
