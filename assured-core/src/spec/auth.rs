//! Authentication descriptor.

use base64::Engine;
use std::fmt;

/// How a request authenticates. The engine only carries this; the transport
/// renders it with [`AuthScheme::header`].
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// HTTP basic authentication, sent preemptively.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// Bearer token (OAuth2 style).
    Bearer(String),
    /// A key sent in a custom header.
    ApiKey {
        /// Header name.
        header: String,
        /// Key value.
        key: String,
    },
}

impl AuthScheme {
    /// Create basic authentication.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create bearer authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Create API key authentication.
    pub fn api_key(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ApiKey {
            header: header.into(),
            key: key.into(),
        }
    }

    /// Header name and value carrying the credentials.
    pub fn header(&self) -> (String, String) {
        match self {
            AuthScheme::Basic { username, password } => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                (
                    http::header::AUTHORIZATION.to_string(),
                    format!("Basic {}", credentials),
                )
            }
            AuthScheme::Bearer(token) => (
                http::header::AUTHORIZATION.to_string(),
                format!("Bearer {}", token),
            ),
            AuthScheme::ApiKey { header, key } => (header.clone(), key.clone()),
        }
    }
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            AuthScheme::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
            AuthScheme::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &"***")
                .finish(),
        }
    }
}
