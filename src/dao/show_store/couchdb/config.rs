use super::error::{CouchDaoError, CouchResult};

/// Where the CouchDB server lives and which database holds the show documents.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    pub base_url: String,
    pub database: String,
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            credentials: None,
        }
    }

    /// Attach basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Read `COUCH_BASE_URL` and `COUCH_DB`, plus optional `COUCH_USERNAME`/`COUCH_PASSWORD`.
    pub fn from_env() -> CouchResult<Self> {
        let read = |var: &'static str| {
            std::env::var(var).map_err(|_| CouchDaoError::MissingEnvVar { var })
        };
        let config = Self::new(read("COUCH_BASE_URL")?, read("COUCH_DB")?);

        Ok(match (read("COUCH_USERNAME"), read("COUCH_PASSWORD")) {
            (Ok(username), Ok(password)) => config.with_credentials(username, password),
            _ => config,
        })
    }
}
