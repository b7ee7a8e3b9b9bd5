use localoco::{
    args::Args,
    errors::{AppError, AppResult},
    http_server, AppState, Config, DbPersistence, VoucherExpiryService,
};

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = Args::parse();

    // Load configuration from --config path (defaults to config/default.toml)
    let mut config = Config::load(&args.config).map_err(AppError::Config)?;

    // Apply CLI overrides
    if let Some(database_url) = args.database_url {
        config.data.database_url = database_url;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config.logging.level)?;

    info!("Starting Localoco v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", args.config);

    let db = Arc::new(DbPersistence::with_max_connections(config.get_database_url(), config.data.max_connections).await?);

    info!("Running database migrations...");
    db.migrate().await?;

    if args.migrate_only {
        info!("Migrations applied, exiting");
        return Ok(());
    }

    let user_count = db.users.count().await?;
    info!("Database ready with {} users", user_count);

    let config = Arc::new(config);
    let state = AppState::new(db.clone(), config.clone());
    info!(
        "Referral policy: {} per voucher, valid for {} month(s)",
        state.redeemer.policy().voucher_amount,
        state.redeemer.policy().validity_months
    );

    let server_address = config.get_server_address();
    let server_task = tokio::spawn(async move {
        http_server::start_server(state, &server_address)
            .await
            .map_err(|e| AppError::Server(e.to_string()))
    });

    info!("HTTP API available at: {}", config.get_base_api_url());

    let voucher_expiry = VoucherExpiryService::new(db.clone(), config.get_voucher_expiry_check_duration());

    // Both tasks run forever unless one of them fails
    tokio::select! {
        result = server_task => {
            error!("HTTP server exited: {:?}", result);
            result.map_err(|e| AppError::Server(e.to_string()))??;
        }
        result = voucher_expiry.spawn() => {
            error!("Voucher expiry service exited: {:?}", result);
            result
                .map_err(|e| AppError::Server(e.to_string()))?
                .map_err(|e| AppError::Server(e.to_string()))?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) -> AppResult<()> {
    let log_level = match level.to_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!("Invalid log level: {}, defaulting to info", level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("localoco={},tower_http={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    Ok(())
}
