use houston_core::{naming::DEFAULT_RELEASE_NAMESPACE, NamespaceStrategy};

const DEFAULT_ENDPOINT: &str = "http://localhost:8871";
const DEFAULT_USER: &str = "houston-cli";

#[derive(Debug)]
pub struct Context {
    pub endpoint: String,
    pub user: String,
    pub namespace_strategy: NamespaceStrategy,
}

impl Context {
    pub fn from_env() -> Self {
        let release_namespace = dotenvy::var("HELM_RELEASE_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_RELEASE_NAMESPACE.to_string());
        let single_namespace = dotenvy::var("HELM_SINGLE_NAMESPACE")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            endpoint: dotenvy::var("HOUSTON_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            user: dotenvy::var("HOUSTON_USER").unwrap_or_else(|_| DEFAULT_USER.to_string()),
            namespace_strategy: NamespaceStrategy::from_settings(
                &release_namespace,
                single_namespace,
            ),
        }
    }
}
