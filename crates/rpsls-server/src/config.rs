//! Environment configuration.

use rpsls_core::rules::timeout::{DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS};
use rpsls_core::PartyId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Service settings read from the environment
#[derive(Clone, Debug)]
pub struct Config {
    /// `PORT`
    pub port: u16,
    /// `RPSLS_TIMEOUT_SECS`
    pub timeout_secs: i64,
    /// `RPSLS_SIMULATED_CLOCK`: time only moves via `/api/system/tick`
    pub simulated_clock: bool,
    /// `RPSLS_SEED_ACCOUNTS`: `name=amount,name=amount`
    pub seed_accounts: Vec<(PartyId, u64)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            simulated_clock: false,
            seed_accounts: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup("PORT") {
            config.port = value.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                value: value.clone(),
                reason: format!("{}", e),
            })?;
        }

        if let Some(value) = lookup("RPSLS_TIMEOUT_SECS") {
            let secs: i64 = value.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "RPSLS_TIMEOUT_SECS",
                value: value.clone(),
                reason: format!("{}", e),
            })?;
            if secs <= 0 || secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::Invalid {
                    var: "RPSLS_TIMEOUT_SECS",
                    value,
                    reason: format!("must be between 1 and {}", MAX_TIMEOUT_SECS),
                });
            }
            config.timeout_secs = secs;
        }

        if let Some(value) = lookup("RPSLS_SIMULATED_CLOCK") {
            let flag = value.trim().to_ascii_lowercase();
            config.simulated_clock = match flag.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "RPSLS_SIMULATED_CLOCK",
                        value,
                        reason: "expected true or false".to_string(),
                    })
                }
            };
        }

        if let Some(value) = lookup("RPSLS_SEED_ACCOUNTS") {
            config.seed_accounts = parse_seed_accounts(&value)?;
        }

        Ok(config)
    }
}

fn parse_seed_accounts(value: &str) -> Result<Vec<(PartyId, u64)>, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: "RPSLS_SEED_ACCOUNTS",
        value: value.to_string(),
        reason,
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, amount) = entry
                .split_once('=')
                .ok_or_else(|| invalid(format!("entry {:?} is not name=amount", entry)))?;
            let party = PartyId::new(name).map_err(|e| invalid(e.to_string()))?;
            let amount: u64 = amount
                .trim()
                .parse()
                .map_err(|e| invalid(format!("amount for {}: {}", name, e)))?;
            Ok((party, amount))
        })
        .collect()
}
