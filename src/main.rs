use std::net::TcpListener;
use std::time::Duration;

use auth_api::auth::TokenIssuer;
use auth_api::configuration::get_configuration;
use auth_api::startup::run;
use auth_api::store::{RevocationLedger, Stores};
use auth_api::telemetry::init_telemetry;

/// How often the revocation ledger is swept for entries whose token has
/// expired on its own.
const PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let stores = Stores::open(&configuration.storage.data_dir).map_err(|e| {
        tracing::error!("Failed to open data stores: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Storage error")
    })?;
    tracing::info!(data_dir = %configuration.storage.data_dir, "Data stores opened");

    let issuer = TokenIssuer::new(&configuration.jwt);

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    // Storage hygiene only; correctness never depends on this sweep.
    spawn_revocation_pruner(stores.revoked_tokens.clone());

    let server = run(listener, stores.clone(), issuer)?;
    let result = server.await;

    if let Err(e) = stores.flush() {
        tracing::warn!(error = %e, "Final store flush failed");
    }
    result
}

fn spawn_revocation_pruner(revoked_tokens: RevocationLedger) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            match revoked_tokens.prune_expired(chrono::Utc::now().timestamp()) {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!(removed, "Pruned expired revocation ledger entries");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Revocation ledger pruning failed");
                }
            }
        }
    });
}
