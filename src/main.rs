use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_server::config::Config;
use lms_server::db::{self, LogOnError};
use lms_server::routes::build_router;
use lms_server::services::{DisabledAnswerProvider, HmacGateway, JsonCertificateRenderer, LocalMediaStore};
use lms_server::state::AppState;

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lms_server=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::load();

  let pool = db::init_db(&config.database_path, config.db_busy_timeout)
    .expect("Failed to initialize database");

  {
    let conn = db::try_lock(&pool).expect("Database lock failed during startup");
    db::seed_faqs(&conn).log_warn("Failed to seed FAQs");
  }

  let media = Arc::new(LocalMediaStore::new(config.uploads_dir.clone()));
  let payments = Arc::new(HmacGateway::new(&config.payment));
  let bind_addr = config.bind_addr();

  let state = AppState::new(
    pool,
    config,
    media,
    payments,
    Arc::new(JsonCertificateRenderer),
    Arc::new(DisabledAnswerProvider),
  );
  let app = build_router(state);

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
