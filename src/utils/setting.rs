// Connection settings
use url::Url;

use crate::config::{Credentials, DatabaseConfig};
use crate::errors::{Result, SyncError};

/// Builds the `postgres://` URL for the pool. User and password are
/// percent-encoded by `Url`, so any characters are allowed in either.
pub fn database_url(database: &DatabaseConfig, credentials: &Credentials) -> Result<Url> {
    let invalid = |what: &str| SyncError::connection(format!("Invalid {} for database URL", what));

    let mut url = Url::parse(&format!("postgres://{}:{}", database.host, database.port))
        .map_err(|e| SyncError::connection(format!("Invalid database host '{}': {}", database.host, e)))?;
    url.set_username(&credentials.user)
        .map_err(|_| invalid("user name"))?;
    url.set_password(Some(&credentials.password))
        .map_err(|_| invalid("password"))?;
    url.set_path(&database.name);
    Ok(url)
}

/// `user@host:port/database`, safe to log.
pub fn display_target(database: &DatabaseConfig, credentials: &Credentials) -> String {
    format!(
        "{}@{}:{}/{}",
        credentials.user, database.host, database.port, database.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn credentials(user: &str, password: &str) -> Credentials {
        Credentials {
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_database_url_encodes_credentials() -> anyhow::Result<()> {
        let database = AppConfig::default().database;
        let url = database_url(&database, &credentials("store clerk", "p@ss/word"))?;

        assert_eq!(url.scheme(), "postgres");
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(5432));
        assert_eq!(url.path(), "/IronHat");
        assert_eq!(url.username(), "store%20clerk");
        assert_eq!(url.password(), Some("p%40ss%2Fword"));
        Ok(())
    }

    #[test]
    fn test_display_target_has_no_password() {
        let database = AppConfig::default().database;
        let shown = display_target(&database, &credentials("clerk", "secret"));
        assert_eq!(shown, "clerk@localhost:5432/IronHat");
    }

    #[test]
    fn test_invalid_host_is_connection_error() {
        let mut database = AppConfig::default().database;
        database.host = "bad host".to_string();
        let err = database_url(&database, &credentials("clerk", "secret")).unwrap_err();
        assert!(matches!(err, SyncError::Connection(_)));
    }
}
