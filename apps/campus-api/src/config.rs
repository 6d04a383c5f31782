use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_required, server::ServerConfig};

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Razorpay gateway credentials.
///
/// The key secret doubles as the HMAC key for callback signatures, which
/// is how the gateway signs them.
#[derive(Clone, Debug)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    /// Override for sandboxes and tests; the production API otherwise
    pub base_url: Option<String>,
}

impl RazorpayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: env_required("RAZORPAY_KEY_ID")?,
            key_secret: env_required("RAZORPAY_KEY_SECRET")?,
            base_url: std::env::var("RAZORPAY_BASE_URL").ok(),
        })
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub razorpay: RazorpayConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let razorpay = RazorpayConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            razorpay,
            environment,
        })
    }
}
