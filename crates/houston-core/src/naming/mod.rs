//! Release names and every resource identifier derived from them.
//!
//! A release name such as `cosmic-dust-1234` is generated once per deployment.
//! Namespaces, secrets, database names, database users and the registry
//! repository are pure functions of it and are never stored independently.

mod words;

use rand::{seq::SliceRandom, Rng};
use std::fmt;

pub const DEFAULT_TOKEN_LENGTH: usize = 4;
pub const DEFAULT_RELEASE_NAMESPACE: &str = "houston";

/// Name of the templated workload. Used for the chart, the registry
/// repository suffix and the primary database role.
pub const WORKLOAD: &str = "airflow";

const DELIMITER: &str = "-";
const SECRET_SUFFIX: &str = "env";

pub fn generate_release_name(token_length: usize) -> String {
    generate_release_name_with(&mut rand::thread_rng(), token_length)
}

/// Generates `{adjective}-{noun}-{token}` using the supplied rng. The caller
/// is responsible for checking the result against existing release names.
pub fn generate_release_name_with<R: Rng>(rng: &mut R, token_length: usize) -> String {
    let adjective = words::ADJECTIVES.choose(rng).copied().unwrap_or("cosmic");
    let noun = words::NOUNS.choose(rng).copied().unwrap_or("dust");

    let mut parts = vec![adjective.to_string(), noun.to_string()];

    if token_length > 0 {
        let token: String = (0..token_length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        parts.push(token);
    }

    parts.join(DELIMITER).replace('_', DELIMITER)
}

/// Where the cluster resources of a release live.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NamespaceStrategy {
    /// Every release shares one namespace.
    Single { namespace: String },
    /// Every release gets `{base}-{release_name}`.
    PerRelease { base: String },
}

impl NamespaceStrategy {
    pub fn from_settings(release_namespace: &str, single_namespace: bool) -> Self {
        if single_namespace {
            NamespaceStrategy::Single {
                namespace: release_namespace.to_string(),
            }
        } else {
            NamespaceStrategy::PerRelease {
                base: release_namespace.to_string(),
            }
        }
    }

    pub fn namespace_for(&self, release_name: &str) -> String {
        match self {
            NamespaceStrategy::Single { namespace } => namespace.clone(),
            NamespaceStrategy::PerRelease { base } => format!("{base}{DELIMITER}{release_name}"),
        }
    }
}

impl Default for NamespaceStrategy {
    fn default() -> Self {
        NamespaceStrategy::PerRelease {
            base: DEFAULT_RELEASE_NAMESPACE.to_string(),
        }
    }
}

/// Services that get their own database role.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Service {
    Airflow,
    Celery,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Airflow => WORKLOAD,
            Service::Celery => "celery",
        }
    }
}

pub fn derive_namespace(strategy: &NamespaceStrategy, release_name: &str) -> String {
    strategy.namespace_for(release_name)
}

pub fn derive_secret_name(release_name: &str) -> String {
    format!("{release_name}{DELIMITER}{SECRET_SUFFIX}")
}

pub fn derive_service_username(release_name: &str, service: Service) -> String {
    format!("{}_{}", release_name.replace('-', "_"), service.as_str())
}

// The metadata database and the airflow role intentionally share one name.
pub fn derive_database_name(release_name: &str) -> String {
    derive_service_username(release_name, Service::Airflow)
}

pub fn derive_image_repository(release_name: &str) -> String {
    format!("{release_name}/{WORKLOAD}")
}

/// Inverse of [`derive_image_repository`]. Returns `None` unless the
/// repository is exactly `{release_name}/airflow`.
pub fn release_name_from_repository(repository: &str) -> Option<&str> {
    let (release_name, workload) = repository.split_once('/')?;

    if release_name.is_empty() || workload != WORKLOAD {
        return None;
    }

    Some(release_name)
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ReleaseName(String);

impl ReleaseName {
    pub fn new(release_name: &str) -> Self {
        Self(release_name.to_string())
    }

    pub fn generate() -> Self {
        Self(generate_release_name(DEFAULT_TOKEN_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self, strategy: &NamespaceStrategy) -> String {
        derive_namespace(strategy, &self.0)
    }

    pub fn secret_name(&self) -> String {
        derive_secret_name(&self.0)
    }

    pub fn database_name(&self) -> String {
        derive_database_name(&self.0)
    }

    pub fn username(&self, service: Service) -> String {
        derive_service_username(&self.0, service)
    }

    pub fn image_repository(&self) -> String {
        derive_image_repository(&self.0)
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReleaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_generate_release_name_shape() {
        for _ in 0..200 {
            let release_name = generate_release_name(DEFAULT_TOKEN_LENGTH);

            assert!(!release_name.contains('_'), "{release_name}");

            let token = release_name.rsplit('-').next().unwrap();
            assert_eq!(token.len(), 4);
            assert!(token.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_release_name_without_token() {
        let mut rng = StdRng::seed_from_u64(7);
        let release_name = generate_release_name_with(&mut rng, 0);

        assert!(!release_name.chars().any(|c| c.is_ascii_digit()));
        assert!(release_name.contains('-'));
    }

    #[test]
    fn test_generate_release_name_is_seedable() {
        let first = generate_release_name_with(&mut StdRng::seed_from_u64(42), 6);
        let second = generate_release_name_with(&mut StdRng::seed_from_u64(42), 6);

        assert_eq!(first, second);
    }

    #[test]
    fn test_multi_word_vocabulary_is_normalized() {
        assert!(words::NOUNS.iter().any(|noun| noun.contains('_')));

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert!(!generate_release_name_with(&mut rng, 2).contains('_'));
        }
    }

    #[test]
    fn test_derivations() {
        let release = ReleaseName::new("cosmic-dust-1234");

        assert_eq!(release.secret_name(), "cosmic-dust-1234-env");
        assert_eq!(release.database_name(), "cosmic_dust_1234_airflow");
        assert_eq!(
            release.username(Service::Airflow),
            "cosmic_dust_1234_airflow"
        );
        assert_eq!(release.username(Service::Celery), "cosmic_dust_1234_celery");
        assert_eq!(release.image_repository(), "cosmic-dust-1234/airflow");
    }

    #[test]
    fn test_derivations_are_deterministic() {
        let strategy = NamespaceStrategy::default();

        for _ in 0..20 {
            let release_name = generate_release_name(DEFAULT_TOKEN_LENGTH);

            assert_eq!(
                derive_namespace(&strategy, &release_name),
                derive_namespace(&strategy, &release_name)
            );
            assert_eq!(
                derive_secret_name(&release_name),
                derive_secret_name(&release_name)
            );
            assert_eq!(
                derive_database_name(&release_name),
                derive_service_username(&release_name, Service::Airflow)
            );

            for derived in [
                derive_database_name(&release_name),
                derive_service_username(&release_name, Service::Airflow),
                derive_service_username(&release_name, Service::Celery),
            ] {
                assert!(!derived.contains('-'), "{derived}");
            }
        }
    }

    #[test]
    fn test_namespace_strategies() {
        let single = NamespaceStrategy::from_settings("astronomer", true);
        assert_eq!(single.namespace_for("cosmic-dust-1234"), "astronomer");
        assert_eq!(single.namespace_for("lunar-orbit-0001"), "astronomer");

        let per_release = NamespaceStrategy::from_settings("astronomer", false);
        assert_eq!(
            per_release.namespace_for("cosmic-dust-1234"),
            "astronomer-cosmic-dust-1234"
        );
    }

    #[test]
    fn test_release_name_from_repository() {
        assert_eq!(
            release_name_from_repository("cosmic-dust-1234/airflow"),
            Some("cosmic-dust-1234")
        );
        assert_eq!(release_name_from_repository("cosmic-dust-1234/web"), None);
        assert_eq!(release_name_from_repository("/airflow"), None);
        assert_eq!(release_name_from_repository("airflow"), None);
        assert_eq!(
            release_name_from_repository("org/cosmic-dust-1234/airflow"),
            None
        );
    }
}
