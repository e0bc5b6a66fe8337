use houston_core::{naming::DEFAULT_RELEASE_NAMESPACE, NamespaceStrategy};
use std::{fmt, time::Duration};

const DEFAULT_ENDPOINT: &str = "0.0.0.0:8871";
const DEFAULT_COMMANDER_URL: &str = "http://localhost:8880";
const DEFAULT_COMMANDER_TIMEOUT_SECS: u64 = 30;

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct HoustonConfig {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub endpoint: String,

    pub commander_url: String,
    pub commander_timeout: Duration,

    pub namespace_strategy: NamespaceStrategy,
    pub billing_enabled: bool,

    pub analytics_write_key: Option<String>,
    pub jaeger_enabled: bool,
}

impl HoustonConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let commander_timeout = match non_empty("COMMANDER_TIMEOUT_SECS") {
            Some(seconds) => seconds.trim().parse::<u64>().map_err(|err| {
                anyhow::anyhow!("COMMANDER_TIMEOUT_SECS must be a whole number of seconds: {err}")
            })?,
            None => DEFAULT_COMMANDER_TIMEOUT_SECS,
        };

        let release_namespace = non_empty("HELM_RELEASE_NAMESPACE")
            .unwrap_or_else(|| DEFAULT_RELEASE_NAMESPACE.to_string());
        let single_namespace = parse_flag(non_empty("HELM_SINGLE_NAMESPACE"));

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            endpoint: non_empty("ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),

            commander_url: non_empty("COMMANDER_URL")
                .unwrap_or_else(|| DEFAULT_COMMANDER_URL.to_string()),
            commander_timeout: Duration::from_secs(commander_timeout),

            namespace_strategy: NamespaceStrategy::from_settings(
                &release_namespace,
                single_namespace,
            ),
            billing_enabled: parse_flag(non_empty("STRIPE_ENABLED")),

            analytics_write_key: non_empty("ANALYTICS_WRITE_KEY"),
            jaeger_enabled: parse_flag(non_empty("JAEGER_ENABLED")),
        })
    }
}

fn parse_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(|value| value.trim().to_ascii_lowercase()),
        Some(value) if value == "true" || value == "1" || value == "yes"
    )
}

impl fmt::Debug for HoustonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoustonConfig")
            .field("database", &self.database_url.is_some())
            .field("endpoint", &self.endpoint)
            .field("commander_url", &self.commander_url)
            .field("commander_timeout", &self.commander_timeout)
            .field("namespace_strategy", &self.namespace_strategy)
            .field("billing_enabled", &self.billing_enabled)
            .field("analytics", &self.analytics_write_key.is_some())
            .field("jaeger_enabled", &self.jaeger_enabled)
            .finish()
    }
}
