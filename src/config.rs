use anyhow::Context;

use crate::seed;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Initial stock per product id.
    pub catalog: Vec<(String, i64)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process env.
    fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog = match var("INVENTORY_SEED") {
            Some(raw) => seed::parse_catalog(&raw).context("INVENTORY_SEED is invalid")?,
            None => seed::default_catalog(),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            catalog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.catalog, seed::default_catalog());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("INVENTORY_SEED", "A1=7"),
        ])
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.catalog, vec![("A1".to_string(), 7)]);
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a valid number");
    }

    #[test]
    fn invalid_seed_is_reported_with_cause() {
        let err = config_from(&[("INVENTORY_SEED", "P001=-1")]).unwrap_err();
        assert_eq!(err.to_string(), "INVENTORY_SEED is invalid");
        assert!(err.root_cause().to_string().contains("P001"));
    }
}
