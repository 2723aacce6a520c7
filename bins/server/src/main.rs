//! Faktura API Server
//!
//! Main entry point for the Faktura billing service. Serves the HTTP API
//! and runs the billing scheduler that marks invoices past due and
//! generates invoices from due recurring templates.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faktura_api::{AppState, create_router, rates::HttpRateSource};
use faktura_db::repositories::RecurringRepoError;
use faktura_db::{InvoiceRepository, RecurringRepository};
use faktura_shared::types::{OwnerId, RecurringInvoiceId};
use faktura_shared::{AppConfig, Clock, JwtConfig, JwtService, SystemClock};

/// How often the scheduler sweeps for past-due invoices and due templates.
const SCHEDULER_PERIOD: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faktura=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let mut opts = ConnectOptions::new(config.database.url.clone());
    opts.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections);
    let db = Database::connect(opts).await?;
    info!("Connected to database");

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_secs: config.jwt.access_token_expiry_secs as i64,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create exchange-rate client
    let rates = HttpRateSource::new(&config.rates)?;

    // Create application state
    let db = Arc::new(db);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState {
        db: Arc::clone(&db),
        jwt_service: Arc::new(jwt_service),
        clock: Arc::clone(&clock),
        rates: Arc::new(rates),
    };

    // Start the billing scheduler
    tokio::spawn(run_scheduler(Arc::clone(&db), clock));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodic sweep: flips overdue open invoices to past due and generates
/// invoices for due recurring templates.
///
/// Generation races with manual API calls are expected; a lost race is a
/// skip, not a failure, because the period was already claimed.
async fn run_scheduler(db: Arc<DatabaseConnection>, clock: Arc<dyn Clock>) {
    let invoices = InvoiceRepository::new((*db).clone());
    let recurring = RecurringRepository::new((*db).clone());
    let mut ticker = tokio::time::interval(SCHEDULER_PERIOD);

    loop {
        ticker.tick().await;
        let today = clock.today();

        match invoices.refresh_past_due(today).await {
            Ok(0) => {}
            Ok(count) => info!(count, "marked invoices past due"),
            Err(e) => error!(error = %e, "past-due sweep failed"),
        }

        let due = match recurring.list_due(today).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "listing due recurring templates failed");
                continue;
            }
        };
        for template in due {
            let result = recurring
                .generate(
                    OwnerId::from_uuid(template.owner_id),
                    RecurringInvoiceId::from_uuid(template.id),
                    today,
                    false,
                )
                .await;
            match result {
                Ok(generated) => info!(
                    template = %template.id,
                    invoice = %generated.invoice.id,
                    "generated recurring invoice"
                ),
                Err(RecurringRepoError::AlreadyGenerated(_)) => {}
                Err(e) => error!(template = %template.id, error = %e, "recurring generation failed"),
            }
        }
    }
}
