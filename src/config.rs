// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use crate::{core::guard::GuardPolicy, error::Error};
use std::{fmt, io, path::Path};
use tracing::{error, info};

pub const REQUIRED_VARS: [&str; 11] = [
    "CACHE_DOMAIN",
    "SRC_BUCKET_NAME",
    "SRC_ENDPOINT",
    "SRC_ACCESS_KEY",
    "SRC_SECRET_KEY",
    "DST_BUCKET_NAME",
    "DST_ENDPOINT",
    "DST_ACCESS_KEY",
    "DST_SECRET_KEY",
    "QUEUE_SIZE",
    "PART_SIZE",
];

pub const DEFAULT_REGION: &str = "us-east-1";

/// Variable naming the deployment environment
pub const ENVIRONMENT_VAR: &str = "NODE_ENV";

/// Environment in which no `.env` file is read
pub const PRODUCTION: &str = "production";

/// Connection settings for one bucket
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub bucket_name: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("bucket_name", &self.bucket_name)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Everything a move needs, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL the source objects are read from
    pub cache_domain: String,
    pub source: StoreConfig,
    pub destination: StoreConfig,
    pub queue_size: usize,
    pub part_size: usize,
    pub guard_policy: GuardPolicy,
}

impl Config {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which returns the
    /// value of a variable by name
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let vars: HashMap<String, String> = ...;
    ///
    /// let config = Config::from_lookup(|name| vars.get(name).cloned())?;
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        for name in REQUIRED_VARS {
            info!("checking: {}", name);

            if lookup(name).map_or(true, |value| value.trim().is_empty()) {
                error!("Environment variable not set: {}", name);

                return Err(Error::Configuration(format!(
                    "environment variable not set: {}",
                    name
                )));
            }
        }

        let var = |name: &str| -> Result<String, Error> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    Error::Configuration(format!("environment variable not set: {}", name))
                })
        };

        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let store = |prefix: &str| -> Result<StoreConfig, Error> {
            Ok(StoreConfig {
                bucket_name: var(&format!("{}_BUCKET_NAME", prefix))?,
                endpoint: with_scheme(&var(&format!("{}_ENDPOINT", prefix))?),
                access_key: var(&format!("{}_ACCESS_KEY", prefix))?,
                secret_key: var(&format!("{}_SECRET_KEY", prefix))?,
                region: optional(&format!("{}_REGION", prefix))
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            })
        };

        let guard_policy = match optional("EXISTENCE_CHECK") {
            Some(policy) => policy.parse()?,
            None => GuardPolicy::default(),
        };

        Ok(Self {
            cache_domain: with_scheme(&var("CACHE_DOMAIN")?),
            source: store("SRC")?,
            destination: store("DST")?,
            queue_size: positive(&var("QUEUE_SIZE")?, "QUEUE_SIZE")?,
            part_size: positive(&var("PART_SIZE")?, "PART_SIZE")?,
            guard_policy,
        })
    }
}

/// Prepends `https://` to an address given without a scheme
pub fn with_scheme(address: &str) -> String {
    let address = address.trim_end_matches('/');

    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("https://{}", address)
    }
}

fn positive(value: &str, name: &str) -> Result<usize, Error> {
    match value.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(Error::Configuration(format!(
            "{} must be a positive integer, got {:?}",
            name, value
        ))),
    }
}

/// Loads the variables of the `.env` file at `path` into the process
/// environment, unless `environment` is `production`. Variables already
/// set are kept. A missing file is not an error.
///
/// Returns true if a file was loaded
///
/// ---
/// Example Usage:
/// ```
///
/// let environment = std::env::var(ENVIRONMENT_VAR).ok();
///
/// load_env_file(Path::new(".env"), environment.as_deref())?;
///
/// let config = Config::from_env()?;
/// ```
pub fn load_env_file(path: &Path, environment: Option<&str>) -> Result<bool, Error> {
    if environment.map(str::trim) == Some(PRODUCTION) {
        return Ok(false);
    }

    match dotenv::from_path(path) {
        Ok(()) => {
            info!("Loaded {}", path.display());

            Ok(true)
        }
        Err(dotenv::Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(Error::Configuration(format!(
            "failed to load {}: {}",
            path.display(),
            err
        ))),
    }
}
