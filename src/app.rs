/*
 * Responsibility
 * - Config読み込み → gate / versioning 生成 → Router 組み立て
 * - Middleware の適用 (PASETO gate / versioning / CORS / HTTP)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::{health::health, notes::Notes};
use crate::config::Config;
use crate::middleware::{
    cors,
    http::{self, HttpLimits},
    paseto::{ConfigurationError, PasetoConfig, PasetoGate},
    versioning::Versioning,
};
use crate::services::paseto::validate;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,paseto_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process. Production: default behavior, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    // Bad key / token lookup: refuse to start.
    let app = build_router(&config)?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the gate from the PASETO part of the configuration.
pub fn build_gate(config: &Config) -> Result<PasetoGate, ConfigurationError> {
    let skip_paths: Arc<[String]> = config.paseto_skip_paths.clone().into();

    let mut gate_config = PasetoConfig::new(config.paseto_signing_key.clone())
        .token_lookup(config.paseto_token_lookup.clone())
        .auth_scheme(config.paseto_auth_scheme.clone())
        .context_key(config.paseto_context_key.clone())
        .skipper(move |req| skip_paths.iter().any(|path| path == req.uri().path()));

    if let Some(audience) = &config.paseto_audience {
        gate_config = gate_config.validator(validate::for_audience(audience.clone()));
    }
    if let Some(issuer) = &config.paseto_issuer {
        gate_config = gate_config.validator(validate::issued_by(issuer.clone()));
    }

    let gate = PasetoGate::new(gate_config)?;
    tracing::info!(
        lookup = %gate.lookup(),
        context_key = gate.context_key(),
        "paseto gate ready"
    );
    Ok(gate)
}

/// Full application: routes -> gate -> versioning -> CORS -> HTTP layers.
pub fn build_router(config: &Config) -> Result<Router, ConfigurationError> {
    let gate = build_gate(config)?;

    let state = AppState::new(gate.context_key());
    let notes = Arc::new(Notes::new(gate.context_key()));

    let router = Router::new()
        .route("/health", get(health))
        .nest("/v1", api::v1::routes(notes))
        .nest("/v2", api::v2::routes());
    let router = gate.apply(router).with_state(state);

    let versioning = Versioning::new(&config.api_stable_version, &config.api_supported_versions);
    let router = versioning.wrap(router);

    let router = cors::apply(router, config);
    Ok(http::apply(router, HttpLimits::from(config)))
}
