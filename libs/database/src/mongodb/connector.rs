use mongodb::{Client, options::ClientOptions};
use std::time::Duration;
use tracing::info;

use super::MongoConfig;
use crate::common::{RetryConfig, retry, retry_with_backoff};

#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Connect to MongoDB with default pool and timeout tuning.
///
/// # Example
/// ```ignore
/// use database::mongodb::connect;
///
/// let client = connect("mongodb://localhost:27017").await?;
/// let db = client.database("campus");
/// ```
pub async fn connect(url: &str) -> Result<Client, MongoError> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Connect to MongoDB using the pool sizes and timeouts from a [`MongoConfig`].
///
/// The returned client has already served a round trip (a `listDatabases`
/// call), so a successful return means the server is actually reachable, not
/// just that the URL parsed.
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Attempting to connect to MongoDB at {}", config.url);

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    options.app_name = config.app_name.clone();

    let client = Client::with_options(options)?;
    verify(&client).await?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

/// The driver connects lazily; force a round trip so failures surface here
/// rather than on the first query.
async fn verify(client: &Client) -> Result<(), MongoError> {
    client
        .list_database_names()
        .await
        .map(|_| ())
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))
}

/// Connect from config, retrying with exponential backoff.
///
/// Pass `None` for the default schedule (3 retries, 100ms doubling). Meant
/// for startup in orchestrated deployments where the database container may
/// not be accepting connections yet.
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config_with_retry};
/// use database::common::RetryConfig;
///
/// let config = MongoConfig::from_env()?;
/// let retry_config = RetryConfig::new().with_max_retries(5);
/// let client = connect_from_config_with_retry(&config, Some(retry_config)).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> Result<Client, MongoError> {
    match retry_config {
        Some(schedule) => retry_with_backoff(|| connect_from_config(config), schedule).await,
        None => retry(|| connect_from_config(config)).await,
    }
}
