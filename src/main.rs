use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use redis::Client as RedisClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kantin_api::config::Config;
use kantin_api::middleware::auth::JwtSecret;
use kantin_api::services::email::EmailService;
use kantin_api::services::notify::NotificationService;
use kantin_api::services::metrics;
use kantin_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_client = RedisClient::open(config.redis_url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_async_connection().await?;
    info!("Redis connected");

    let notifications = Arc::new(NotificationService::new(config.ops_webhook_url.clone()));

    let email = EmailService::new(&config).map(Arc::new);
    if email.is_some() {
        info!("SMTP email service configured");
    } else {
        info!("SMTP not configured — email features disabled");
    }

    metrics::start(pool.clone(), config.utc_offset_minutes);

    let state = AppState {
        db: pool,
        redis: redis_conn,
        config: config.clone(),
        notifications,
        email,
    };

    // CORS: the portal base URL plus localhost for local development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Session
        .route("/auth/me", get(routes::auth::me))
        // Menus
        .route("/menus", get(routes::menu::get_menu))
        // Orders
        .route(
            "/orders",
            get(routes::orders::get_own_order).put(routes::orders::submit_order),
        )
        // Kiosk
        .route("/kiosk/redeem", post(routes::kiosk::redeem))
        // Admin
        .route("/admin/menus", post(routes::admin::publish_menu))
        .route("/admin/window", put(routes::admin::set_window))
        .route("/admin/window/close", post(routes::admin::close_window))
        .route("/admin/orders/count", get(routes::admin::count_orders))
        .route("/admin/orders/summary", get(routes::admin::order_summary))
        .route(
            "/admin/users/{id}/nfc-token",
            put(routes::admin::assign_nfc_token),
        )
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("kantin API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
