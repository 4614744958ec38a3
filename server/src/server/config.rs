//! Application configuration loaded via OrthoConfig.
//!
//! Values merge from CLI arguments, `SNAGTRACK_*` environment variables,
//! and configuration files. Absent collaborators degrade gracefully: no
//! database URL means fixture repositories, no Redis URL or a disabled
//! cache means the no-op cache, no SMTP URL means console mail delivery.

use std::collections::HashSet;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SYSTEM_URL: &str = "http://localhost:8080";
const DEFAULT_MAIL_FROM: &str = "snagtrack <no-reply@snagtrack.example>";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Runtime settings for the snagtrack server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SNAGTRACK")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; fixtures are used when absent.
    pub database_url: Option<String>,
    /// Redis URL backing the page cache.
    pub redis_url: Option<String>,
    /// Master switch for the page cache.
    #[ortho_config(default = true)]
    pub cache_enabled: bool,
    /// Debug mode; also mounts the API docs.
    #[ortho_config(default = false)]
    pub debug: bool,
    /// Canonical external base URL used to build absolute links in feeds.
    pub system_url: Option<String>,
    /// Space-delimited identities granted the admin capability.
    pub admin_users: Option<String>,
    /// SMTP URL for fixed-notification delivery.
    pub smtp_url: Option<String>,
    /// Sender mailbox for notifications.
    pub mail_from: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<String>,
}

impl AppSettings {
    /// Bind address, falling back to the loopback default.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Canonical base URL with any trailing slash trimmed.
    #[must_use]
    pub fn system_url(&self) -> String {
        self.system_url
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_URL)
            .trim_end_matches('/')
            .to_owned()
    }

    /// The configured admin identities.
    #[must_use]
    pub fn admin_users(&self) -> HashSet<String> {
        self.admin_users
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    /// Sender mailbox, falling back to the project default.
    #[must_use]
    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Session key file path.
    #[must_use]
    pub fn session_key_file(&self) -> &str {
        self.session_key_file
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_KEY_FILE)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("snagtrack")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("SNAGTRACK_BIND_ADDR", None::<String>),
            ("SNAGTRACK_DATABASE_URL", None::<String>),
            ("SNAGTRACK_REDIS_URL", None::<String>),
            ("SNAGTRACK_CACHE_ENABLED", None::<String>),
            ("SNAGTRACK_DEBUG", None::<String>),
            ("SNAGTRACK_SYSTEM_URL", None::<String>),
            ("SNAGTRACK_ADMIN_USERS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.system_url(), DEFAULT_SYSTEM_URL);
        assert!(settings.cache_enabled);
        assert!(!settings.debug);
        assert!(settings.admin_users().is_empty());
        assert!(settings.database_url.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SNAGTRACK_CACHE_ENABLED", Some("false".to_owned())),
            (
                "SNAGTRACK_SYSTEM_URL",
                Some("https://snagtrack.example/".to_owned()),
            ),
            (
                "SNAGTRACK_ADMIN_USERS",
                Some("root@example.org ops@example.org".to_owned()),
            ),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.cache_enabled);
        assert_eq!(settings.system_url(), "https://snagtrack.example");
        let admins = settings.admin_users();
        assert!(admins.contains("root@example.org"));
        assert!(admins.contains("ops@example.org"));
    }
}
