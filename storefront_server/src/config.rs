use std::{env, io::Write};

use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use sfs_common::Secret;
use storefront_engine::{pricing::TaxRate, CheckoutConfig};
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_SFS_HOST: &str = "127.0.0.1";
const DEFAULT_SFS_PORT: u16 = 8460;
const DEFAULT_TOKEN_EXPIRY: Duration = Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// The tax rate applied at checkout and on every cart view.
    pub tax_rate: TaxRate,
    /// When true, fulfilment status changes must follow the legal transition table. Set
    /// `SFS_STRICT_STATUS_TRANSITIONS=0` to restore the legacy anything-goes behaviour.
    pub strict_transitions: bool,
    /// When true, checkout decrements product stock by the purchased quantities. Off by default.
    pub decrement_stock: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFS_HOST.to_string(),
            port: DEFAULT_SFS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            tax_rate: TaxRate::default(),
            strict_transitions: true,
            decrement_stock: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFS_HOST").ok().unwrap_or_else(|| DEFAULT_SFS_HOST.into());
        let port = env::var("SFS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFS_PORT. {e} Using the default, {DEFAULT_SFS_PORT}, instead."
                    );
                    DEFAULT_SFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFS_PORT);
        // The engine owns the database URL logic (including the default path)
        let database_url = storefront_engine::sqlite::db_url();
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let tax_rate = env::var("SFS_TAX_RATE_BPS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SFS_TAX_RATE_BPS. {e}"))
                    .ok()
            })
            .map(TaxRate::from_basis_points)
            .unwrap_or_default();
        info!("🪛️ Tax rate is {tax_rate}");
        let strict_transitions =
            env::var("SFS_STRICT_STATUS_TRANSITIONS").map(|s| &s != "0" && &s != "false").unwrap_or(true);
        let decrement_stock = env::var("SFS_DECREMENT_STOCK").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self { host, port, database_url, auth, tax_rate, strict_transitions, decrement_stock }
    }

    /// The slice of this configuration the order flow API needs.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            tax_rate: self.tax_rate,
            decrement_stock: self.decrement_stock,
            strict_transitions: self.strict_transitions,
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens. Anyone holding it can mint tokens for any user, so it
    /// belongs in the environment, not in code or logs.
    pub hmac_secret: Secret<String>,
    /// How long issued tokens stay valid.
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The access token signing secret has not been set. I'm using a random value for this session. DO \
             NOT operate on production like this since every issued token dies with the process. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "auth_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The signing secret for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the SFS_AUTH_SECRET environment variable instead. \
                         🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the signing secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the signing secret.");
            },
        }
        Self { hmac_secret: Secret::new(secret), token_expiry: DEFAULT_TOKEN_EXPIRY }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SFS_AUTH_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SFS_AUTH_SECRET]")))?;
        if secret.len() < 16 {
            return Err(ServerError::ConfigurationError(
                "SFS_AUTH_SECRET must be at least 16 characters long.".to_string(),
            ));
        }
        let token_expiry = env::var("SFS_TOKEN_EXPIRY_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ SFS_TOKEN_EXPIRY_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_TOKEN_EXPIRY.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SFS_TOKEN_EXPIRY_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);
        Ok(Self { hmac_secret: Secret::new(secret), token_expiry })
    }
}
