use std::env;

use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, Rng};
use sq_common::{helpers::parse_boolean_flag, Secret};

const DEFAULT_SQ_HOST: &str = "127.0.0.1";
const DEFAULT_SQ_PORT: u16 = 8360;
const DEFAULT_JWT_EXPIRY: Duration = Duration::days(7);
const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 8;
const DEFAULT_ADVANCE_PROBABILITY: f64 = 0.5;
const DEFAULT_PAYMENT_FAILURE_RATE: f64 = 0.05;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// When true, pickup verification calls must carry the QR token. Leave this on anywhere real; it only
    /// exists so a dev setup without a scanner can drive the flow by order id alone.
    pub require_verification_token: bool,
    /// How often the kitchen progression worker sweeps in-flight orders.
    pub progress_interval_secs: u64,
    /// Probability that the simulated kitchen advances an order on each sweep.
    pub advance_probability: f64,
    /// Payment gateway configuration
    pub payment: PaymentConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SQ_HOST.to_string(),
            port: DEFAULT_SQ_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            require_verification_token: true,
            progress_interval_secs: DEFAULT_PROGRESS_INTERVAL_SECS,
            advance_probability: DEFAULT_ADVANCE_PROBABILITY,
            payment: PaymentConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SQ_HOST").ok().unwrap_or_else(|| DEFAULT_SQ_HOST.into());
        let port = env::var("SQ_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SQ_PORT. {e} Using the default, {DEFAULT_SQ_PORT}, instead.");
                    DEFAULT_SQ_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SQ_PORT);
        let database_url = env::var("SQ_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SQ_DATABASE_URL is not set. Please set it to the URL for the SmartQ database.");
            String::default()
        });
        let auth = AuthConfig::from_env_or_default();
        let payment = PaymentConfig::from_env_or_default();
        let require_verification_token = parse_boolean_flag(env::var("SQ_REQUIRE_VERIFICATION_TOKEN").ok(), true);
        if !require_verification_token {
            warn!(
                "🚨️ Pickup verification token checks are DISABLED (SQ_REQUIRE_VERIFICATION_TOKEN). Anyone who knows \
                 an order id can confirm it. Do not run production like this."
            );
        }
        let progress_interval_secs = env::var("SQ_PROGRESS_INTERVAL_SECS")
            .map_err(|_| {
                info!(
                    "🪛️ SQ_PROGRESS_INTERVAL_SECS is not set. Using the default of {DEFAULT_PROGRESS_INTERVAL_SECS}s."
                )
            })
            .and_then(|s| {
                s.parse::<u64>().map_err(|e| warn!("🪛️ Invalid value for SQ_PROGRESS_INTERVAL_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_PROGRESS_INTERVAL_SECS);
        let advance_probability = parse_probability("SQ_ADVANCE_PROBABILITY", DEFAULT_ADVANCE_PROBABILITY);
        Self {
            host,
            port,
            database_url,
            auth,
            require_verification_token,
            progress_interval_secs,
            advance_probability,
            payment,
        }
    }
}

fn parse_probability(var: &str, default: f64) -> f64 {
    match env::var(var) {
        Ok(s) => match s.parse::<f64>() {
            Ok(p) if (0.0..=1.0).contains(&p) => p,
            Ok(p) => {
                warn!("🪛️ {var} must lie in [0, 1], got {p}. Using the default of {default}.");
                default
            },
            Err(e) => {
                warn!("🪛️ Invalid value for {var}. {e}. Using the default of {default}.");
                default
            },
        },
        Err(_) => default,
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify JWT access tokens (HMAC-SHA256).
    pub jwt_signing_key: Secret<String>,
    /// How long issued access tokens stay valid.
    pub jwt_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing key has not been set. I'm using a random value for this session. DO NOT operate \
             on production like this, since every restart logs all users out and tokens cannot be verified across \
             instances. Set SQ_JWT_SIGNING_KEY instead. 🚨️🚨️🚨️"
        );
        let key: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { jwt_signing_key: Secret::new(key), jwt_expiry: DEFAULT_JWT_EXPIRY }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let jwt_expiry = env::var("SQ_JWT_EXPIRY_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ SQ_JWT_EXPIRY_HOURS is not set. Using the default of {} hrs.",
                    DEFAULT_JWT_EXPIRY.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid value for SQ_JWT_EXPIRY_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_JWT_EXPIRY);
        match env::var("SQ_JWT_SIGNING_KEY") {
            Ok(key) if !key.is_empty() => Self { jwt_signing_key: Secret::new(key), jwt_expiry },
            _ => Self { jwt_expiry, ..Self::default() },
        }
    }
}

//-------------------------------------------------  PaymentConfig  ----------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct PaymentConfig {
    /// Secret key for the Stripe-compatible gateway API. Empty means no gateway is configured and
    /// checkout-session endpoints return 503.
    pub api_secret: Secret<String>,
    /// Base URL of the gateway REST API.
    pub api_url: String,
    /// Shared secret for webhook signature verification.
    pub webhook_secret: Secret<String>,
    /// If false, webhook signatures are not checked and the payload is trusted as-is. Development only.
    pub signature_checks: bool,
    /// Failure rate of the direct payment simulation, in [0, 1].
    pub simulated_failure_rate: f64,
}

const DEFAULT_PAYMENT_API_URL: &str = "https://api.stripe.com/v1";

impl PaymentConfig {
    pub fn from_env_or_default() -> Self {
        let api_secret = env::var("SQ_PAYMENT_API_SECRET").ok().unwrap_or_else(|| {
            info!("🪛️ SQ_PAYMENT_API_SECRET is not set. Checkout-session endpoints will be unavailable.");
            String::default()
        });
        let api_url = env::var("SQ_PAYMENT_API_URL").ok().unwrap_or_else(|| DEFAULT_PAYMENT_API_URL.into());
        let webhook_secret = env::var("SQ_PAYMENT_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ SQ_PAYMENT_WEBHOOK_SECRET is not set. Please set it to the signing secret of your webhook \
                 endpoint."
            );
            String::default()
        });
        let signature_checks = parse_boolean_flag(env::var("SQ_PAYMENT_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!("🚨️ Webhook signature checks are DISABLED. Incoming webhook payloads are trusted as-is.");
        }
        let simulated_failure_rate = parse_probability("SQ_PAYMENT_FAILURE_RATE", DEFAULT_PAYMENT_FAILURE_RATE);
        Self {
            api_secret: Secret::new(api_secret),
            api_url,
            webhook_secret: Secret::new(webhook_secret),
            signature_checks,
            simulated_failure_rate,
        }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the server configuration that request handlers consult. Kept small and secret-free so it
/// can be cloned into app data without passing sensitive information around the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub require_verification_token: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { require_verification_token: config.require_verification_token }
    }
}
