use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub preauth: PreAuthConfig,
    #[serde(default)]
    pub fx: FxConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Pre-authorization gate configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PreAuthConfig {
    /// OTP challenge lifetime in seconds (expiry is checked lazily at verify)
    pub otp_ttl_secs: u64,
    /// Wrong-code attempts allowed before a challenge is dead
    pub otp_max_attempts: u32,
    /// Transfer-code types a user must have verified before a transfer is
    /// admitted to the approval queue (subset of COT/IMF/TAX)
    pub required_transfer_codes: Vec<String>,
}

impl Default for PreAuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: 300,
            otp_max_attempts: 5,
            required_transfer_codes: Vec::new(),
        }
    }
}

/// Exchange-rate collaborator configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FxConfig {
    /// TTL of the injected rate cache; stale values up to this age are served
    pub cache_ttl_secs: u64,
    /// Static rate table for the built-in fixed source
    #[serde(default)]
    pub rates: Vec<RateEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateEntry {
    pub from: String,
    pub to: String,
    pub rate: String,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 120,
            rates: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let preauth = PreAuthConfig::default();
        assert_eq!(preauth.otp_ttl_secs, 300);
        assert_eq!(preauth.otp_max_attempts, 5);
        assert!(preauth.required_transfer_codes.is_empty());

        let fx = FxConfig::default();
        assert_eq!(fx.cache_ttl_secs, 120);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: aegis_bank.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
preauth:
  otp_ttl_secs: 120
  otp_max_attempts: 3
  required_transfer_codes: [COT, IMF]
fx:
  cache_ttl_secs: 60
  rates:
    - { from: USD, to: EUR, rate: "0.92" }
"#;
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.gateway.port, 8080);
        assert_eq!(cfg.preauth.otp_max_attempts, 3);
        assert_eq!(cfg.preauth.required_transfer_codes, vec!["COT", "IMF"]);
        assert_eq!(cfg.fx.rates.len(), 1);
    }
}
