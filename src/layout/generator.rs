//! Base path generation
//!
//! Maps a [`Strategy`] plus its optional prefix/namespace onto the base path
//! under which a backup set lives in the store.
//!
//! | Strategy       | Base path                          |
//! |----------------|------------------------------------|
//! | `universal`    | `shared` or `shared/{namespace}`   |
//! | `user`         | `users/{username}`                 |
//! | `machine-user` | `users/{hostname}-{username}`      |
//! | `custom`       | `{prefix}`                         |

use serde::{Deserialize, Serialize};

use super::identity::IdentityProvider;
use super::sanitize::sanitize_component;
use super::strategy::Strategy;
use crate::error::{KeystashError, KeystashResult};

/// Root segment for the universal strategy
pub const SHARED_ROOT: &str = "shared";

/// Root segment for the per-user strategies
pub const USERS_ROOT: &str = "users";

/// Derives base paths for one layout configuration
///
/// Holds no identity state; the same generator can be shared between threads
/// and asked for paths under different identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathGenerator {
    strategy: Strategy,
    #[serde(default)]
    custom_prefix: String,
    #[serde(default)]
    namespace: String,
}

impl PathGenerator {
    /// Create a generator with no prefix or namespace
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            custom_prefix: String::new(),
            namespace: String::new(),
        }
    }

    /// Create a generator from its string configuration
    pub fn from_config(
        strategy: &str,
        custom_prefix: Option<&str>,
        namespace: Option<&str>,
    ) -> KeystashResult<Self> {
        let strategy: Strategy = strategy.parse()?;
        Ok(Self::new(strategy)
            .with_custom_prefix(custom_prefix.unwrap_or_default())
            .with_namespace(namespace.unwrap_or_default()))
    }

    /// Set the prefix used by the custom strategy
    pub fn with_custom_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.custom_prefix = prefix.into();
        self
    }

    /// Set the namespace used by the universal strategy
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn custom_prefix(&self) -> &str {
        &self.custom_prefix
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Compute the base path for the given identity
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the strategy parameters are invalid
    /// (see [`PathGenerator::validate_strategy`]).
    pub fn generate_base_path(&self, identity: &dyn IdentityProvider) -> KeystashResult<String> {
        self.validate_strategy()?;

        let path = match self.strategy {
            Strategy::Universal => {
                if self.namespace.is_empty() {
                    SHARED_ROOT.to_string()
                } else {
                    format!("{}/{}", SHARED_ROOT, sanitize_component(&self.namespace))
                }
            }
            Strategy::User => {
                format!("{}/{}", USERS_ROOT, sanitize_component(&identity.username()))
            }
            Strategy::MachineUser => format!(
                "{}/{}-{}",
                USERS_ROOT,
                sanitize_component(&identity.hostname()),
                sanitize_component(&identity.username())
            ),
            Strategy::Custom => sanitize_component(&self.custom_prefix),
        };

        Ok(path)
    }

    /// Check the strategy configuration without producing a path
    pub fn validate_strategy(&self) -> KeystashResult<()> {
        if self.strategy != Strategy::Custom {
            return Ok(());
        }

        if self.custom_prefix.trim().is_empty() {
            return Err(KeystashError::Config(
                "custom strategy requires a non-empty prefix".into(),
            ));
        }

        // A separator would add hierarchy levels rather than just unsafe characters
        if self.custom_prefix.contains('/') {
            return Err(KeystashError::Config(format!(
                "custom prefix '{}' must not contain the path separator '/'",
                self.custom_prefix
            )));
        }

        Ok(())
    }

    /// Human-readable description of this layout
    pub fn strategy_description(&self) -> String {
        match self.strategy {
            Strategy::Universal => {
                if self.namespace.is_empty() {
                    "Universal: backups are shared across all machines and users".to_string()
                } else {
                    format!(
                        "Universal: backups are shared across all machines and users (namespace: {})",
                        self.namespace
                    )
                }
            }
            Strategy::User => {
                "User: backups belong to the current user and are reachable from any of their machines"
                    .to_string()
            }
            Strategy::MachineUser => {
                "Machine-user: backups are tied to this machine and user (legacy layout)".to_string()
            }
            Strategy::Custom => {
                format!("Custom: backups live under the prefix '{}'", self.custom_prefix)
            }
        }
    }
}

/// Describe a strategy given by name, without failing
pub fn describe_strategy_name(name: &str) -> String {
    match name.parse::<Strategy>() {
        Ok(strategy) => PathGenerator::new(strategy).strategy_description(),
        Err(_) => "Unknown strategy".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::identity::StaticIdentity;

    fn alice() -> StaticIdentity {
        StaticIdentity::new("alice", "alice-laptop")
    }

    #[test]
    fn test_universal_paths() {
        let generator = PathGenerator::new(Strategy::Universal);
        assert_eq!(generator.generate_base_path(&alice()).unwrap(), "shared");

        let generator = generator.with_namespace("personal");
        assert_eq!(
            generator.generate_base_path(&alice()).unwrap(),
            "shared/personal"
        );
    }

    #[test]
    fn test_universal_namespace_is_sanitized() {
        let generator = PathGenerator::new(Strategy::Universal).with_namespace("team a/b");
        assert_eq!(
            generator.generate_base_path(&alice()).unwrap(),
            "shared/team_a_b"
        );
    }

    #[test]
    fn test_user_path() {
        let generator = PathGenerator::new(Strategy::User);
        assert_eq!(generator.generate_base_path(&alice()).unwrap(), "users/alice");
    }

    #[test]
    fn test_machine_user_path() {
        let generator = PathGenerator::new(Strategy::MachineUser);
        assert_eq!(
            generator.generate_base_path(&alice()).unwrap(),
            "users/alice-laptop-alice"
        );

        let spaced = StaticIdentity::new("alice", "my hostname");
        assert_eq!(
            generator.generate_base_path(&spaced).unwrap(),
            "users/my_hostname-alice"
        );
    }

    #[test]
    fn test_hostname_dependence() {
        let laptop = StaticIdentity::new("alice", "alice-laptop");
        let desktop = StaticIdentity::new("alice", "alice-desktop");

        let machine_user = PathGenerator::new(Strategy::MachineUser);
        assert_ne!(
            machine_user.generate_base_path(&laptop).unwrap(),
            machine_user.generate_base_path(&desktop).unwrap()
        );

        for strategy in [Strategy::User, Strategy::Universal] {
            let generator = PathGenerator::new(strategy);
            assert_eq!(
                generator.generate_base_path(&laptop).unwrap(),
                generator.generate_base_path(&desktop).unwrap()
            );
        }
    }

    #[test]
    fn test_custom_path() {
        let generator = PathGenerator::new(Strategy::Custom).with_custom_prefix("team-devops");
        assert_eq!(generator.generate_base_path(&alice()).unwrap(), "team-devops");
    }

    #[test]
    fn test_custom_empty_prefix_rejected() {
        let generator = PathGenerator::new(Strategy::Custom);
        let err = generator.validate_strategy().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("prefix"));
        assert!(generator.generate_base_path(&alice()).is_err());
    }

    #[test]
    fn test_custom_separator_rejected() {
        let generator = PathGenerator::new(Strategy::Custom).with_custom_prefix("team/devops");
        let err = generator.validate_strategy().unwrap_err();
        assert!(err.to_string().contains("separator"));
        assert!(generator.generate_base_path(&alice()).is_err());
    }

    #[test]
    fn test_deterministic() {
        for strategy in Strategy::ALL {
            let generator = PathGenerator::new(strategy)
                .with_custom_prefix("prefix")
                .with_namespace("ns");
            let first = generator.generate_base_path(&alice()).unwrap();
            let second = generator.generate_base_path(&alice()).unwrap();
            assert_eq!(first, second);
            assert!(!first.is_empty());
        }
    }

    #[test]
    fn test_from_config_unknown_strategy() {
        let err = PathGenerator::from_config("by-team", None, None).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("by-team"));
    }

    #[test]
    fn test_from_config_with_prefix() {
        let generator = PathGenerator::from_config("custom", Some("ops"), None).unwrap();
        assert_eq!(generator.strategy(), Strategy::Custom);
        assert_eq!(generator.custom_prefix(), "ops");
    }

    #[test]
    fn test_descriptions() {
        assert!(PathGenerator::new(Strategy::MachineUser)
            .strategy_description()
            .contains("legacy"));
        assert!(PathGenerator::new(Strategy::Custom)
            .with_custom_prefix("ops")
            .strategy_description()
            .contains("ops"));
        assert_eq!(describe_strategy_name("nope"), "Unknown strategy");
        assert!(describe_strategy_name("shared").starts_with("Universal"));
    }

    #[test]
    fn test_generator_is_shareable_across_threads() {
        let generator = std::sync::Arc::new(PathGenerator::new(Strategy::MachineUser));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || generator.generate_base_path(&alice()).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "users/alice-laptop-alice");
        }
    }
}
