//! Runtime configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quoteboard_core::metrics::AggregationStrategy;
use quoteboard_provider_freterapido::wire::parse_zipcode;
use quoteboard_provider_freterapido::{DEFAULT_API_URL, FreteRapidoConfig};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_LOG_FILE: &str = "quoteboard.log";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Everything the dashboard needs to wire the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub provider: FreteRapidoConfig,
    pub request_timeout: Duration,
    pub metrics_last_quotes: usize,
    pub aggregation: AggregationStrategy,
    pub log_file: PathBuf,
}

impl AppConfig {
    /// Load `.env` when present, then read the process environment.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        // a missing .env file is fine, the variables may come from the shell
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(ConfigError::Invalid {
                key: ".env",
                message: err.to_string(),
            });
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let required = |key: &'static str| read(key).ok_or(ConfigError::Missing(key));

        let dispatcher_zipcode =
            parse_zipcode(&required("ZIPCODE")?).map_err(|err| ConfigError::Invalid {
                key: "ZIPCODE",
                message: err.to_string(),
            })?;

        let provider = FreteRapidoConfig::new(
            required("CNPJ")?,
            required("FRETE_RAPIDO_TOKEN")?,
            required("PLATFORM_CODE")?,
            dispatcher_zipcode,
        )
        .with_api_url(read("FRETE_RAPIDO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()));

        let timeout_ms = read("FRETE_RAPIDO_TIMEOUT_MS")
            .map_or(Ok(DEFAULT_TIMEOUT_MS), |raw| {
                parse("FRETE_RAPIDO_TIMEOUT_MS", &raw)
            })?;
        let metrics_last_quotes = read("METRICS_LAST_QUOTES")
            .map_or(Ok(0), |raw| parse("METRICS_LAST_QUOTES", &raw))?;
        let chunk_size = read("METRICS_PARALLEL_CHUNK")
            .map_or(Ok(0), |raw| parse("METRICS_PARALLEL_CHUNK", &raw))?;

        Ok(Self {
            provider,
            request_timeout: Duration::from_millis(timeout_ms),
            metrics_last_quotes,
            aggregation: AggregationStrategy::parallel_or_sequential(chunk_size),
            log_file: read("QUOTEBOARD_LOG_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
        })
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::num::NonZeroUsize;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("CNPJ", "25438296000158"),
        ("FRETE_RAPIDO_TOKEN", "token"),
        ("PLATFORM_CODE", "5AKVkHqCn"),
        ("ZIPCODE", "29161-376"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).expect("valid config");

        assert_eq!(config.provider.api_url, DEFAULT_API_URL);
        assert_eq!(config.provider.dispatcher_zipcode, 29_161_376);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.metrics_last_quotes, 0);
        assert_eq!(config.aggregation, AggregationStrategy::Sequential);
        assert_eq!(config.log_file, PathBuf::from("quoteboard.log"));
    }

    #[test]
    fn optional_values_override_defaults() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("FRETE_RAPIDO_API_URL", "http://localhost:8081/simulate"),
            ("FRETE_RAPIDO_TIMEOUT_MS", "2500"),
            ("METRICS_LAST_QUOTES", "25"),
            ("METRICS_PARALLEL_CHUNK", "64"),
            ("QUOTEBOARD_LOG_FILE", "/tmp/qb.log"),
        ]);

        let config = AppConfig::from_lookup(lookup(&pairs)).expect("valid config");

        assert_eq!(config.provider.api_url, "http://localhost:8081/simulate");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.metrics_last_quotes, 25);
        assert_eq!(
            config.aggregation,
            AggregationStrategy::Parallel {
                chunk_size: NonZeroUsize::new(64).expect("non-zero"),
            }
        );
        assert_eq!(config.log_file, PathBuf::from("/tmp/qb.log"));
    }

    #[test]
    fn missing_credential_is_reported() {
        let pairs: Vec<_> = REQUIRED
            .into_iter()
            .filter(|(key, _)| *key != "FRETE_RAPIDO_TOKEN")
            .collect();

        assert_eq!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Missing("FRETE_RAPIDO_TOKEN"))
        );
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CNPJ", "   "));
        // later entries win in the lookup map
        assert_eq!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Missing("CNPJ"))
        );
    }

    #[test]
    fn dispatcher_zipcode_accepts_cep_punctuation() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ZIPCODE", "29.161-376"));

        let config = AppConfig::from_lookup(lookup(&pairs)).expect("valid config");
        assert_eq!(config.provider.dispatcher_zipcode, 29_161_376);
    }

    #[test]
    fn non_numeric_dispatcher_zipcode_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ZIPCODE", "ES-29161"));

        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { key: "ZIPCODE", .. })
        ));
    }

    #[test]
    fn malformed_number_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("METRICS_LAST_QUOTES", "-3"));

        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid {
                key: "METRICS_LAST_QUOTES",
                ..
            })
        ));
    }
}
