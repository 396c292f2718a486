use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use pos_core::{
    auth::bootstrap::init_auth,
    clock::{Clock, SystemClock},
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    middleware::{catch_panic_layer, json_error_middleware},
    routes::router,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        eprintln!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .clone()
        .context("database config is required (APP_DATABASE__URL)")?;
    let auth_cfg = cfg
        .auth
        .clone()
        .context("auth config is required (APP_AUTH__JWT_SECRET)")?;

    let db = connection::connect(&db_cfg).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth = init_auth(&auth_cfg, &db, Arc::clone(&clock)).await?;

    let state = AppState::new(cfg, db, auth, clock);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
