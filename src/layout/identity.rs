//! Identity lookup for path generation
//!
//! The path generator never reads the environment itself; it asks an
//! [`IdentityProvider`] for the username and hostname instead.

/// Username used when no environment variable yields one
pub const UNKNOWN_USER: &str = "unknown-user";

/// Hostname used when the host name cannot be resolved
pub const UNKNOWN_HOST: &str = "unknown-host";

/// Primary username variable
const USER_VAR: &str = "USER";

/// Platform-specific fallback username variable
#[cfg(windows)]
const USER_FALLBACK_VAR: &str = "USERNAME";
#[cfg(not(windows))]
const USER_FALLBACK_VAR: &str = "LOGNAME";

/// Source of the identity values a layout may depend on
pub trait IdentityProvider: Send + Sync {
    /// Name of the current user
    fn username(&self) -> String;

    /// Name of the current machine
    fn hostname(&self) -> String;
}

/// Identity resolved from the running process, with optional overrides
#[derive(Debug, Clone, Default)]
pub struct SystemIdentity {
    username: Option<String>,
    hostname: Option<String>,
}

impl SystemIdentity {
    /// Resolve everything from the environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given values where present, the environment otherwise
    ///
    /// This lets a caller address a layout created by another user or on
    /// another machine.
    pub fn with_overrides(username: Option<String>, hostname: Option<String>) -> Self {
        Self {
            username: username.filter(|u| !u.trim().is_empty()),
            hostname: hostname.filter(|h| !h.trim().is_empty()),
        }
    }
}

impl IdentityProvider for SystemIdentity {
    fn username(&self) -> String {
        match &self.username {
            Some(username) => username.clone(),
            None => current_username(),
        }
    }

    fn hostname(&self) -> String {
        match &self.hostname {
            Some(hostname) => hostname.clone(),
            None => current_hostname(),
        }
    }
}

/// Identity with fixed values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    pub username: String,
    pub hostname: String,
}

impl StaticIdentity {
    pub fn new(username: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hostname: hostname.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }
}

/// Resolve the current username from the environment
pub fn current_username() -> String {
    [USER_VAR, USER_FALLBACK_VAR]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

/// Resolve the current hostname
pub fn current_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
