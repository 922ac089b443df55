use super::error::{FirebaseDaoError, FirebaseResult};

/// Runtime configuration describing how to reach the Realtime Database REST API.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Database root, e.g. `https://my-project-default-rtdb.firebaseio.com`.
    pub base_url: String,
    /// Optional database secret or ID token appended as the `auth` query parameter.
    pub auth_token: Option<String>,
}

impl FirebaseConfig {
    /// Construct a configuration from an explicit database URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Attach an auth token to the configuration.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> FirebaseResult<Self> {
        let base_url =
            std::env::var("FIREBASE_DATABASE_URL").map_err(|_| FirebaseDaoError::MissingEnvVar {
                var: "FIREBASE_DATABASE_URL",
            })?;

        let mut config = Self::new(base_url);

        if let Ok(token) = std::env::var("FIREBASE_AUTH_TOKEN") {
            config = config.with_auth_token(token);
        }

        Ok(config)
    }
}
