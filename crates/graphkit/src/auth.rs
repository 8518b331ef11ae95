//! App-only authentication - OAuth2 client credentials against Entra ID.

use crate::error::{Error, Result};
use crate::types::Token;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Mutex;

const DEFAULT_LOGIN_BASE: &str = "https://login.microsoftonline.com";
const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Credential holder and token cache for one Graph tenant.
///
/// `connect` is idempotent-safe: a cached, unexpired token is reused
/// instead of re-authenticating, so sources and actions can each ask for a
/// connection without hammering the token endpoint.
pub struct GraphAuth {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    login_base: String,
    graph_base: String,
    agent: ureq::Agent,
    cached: Mutex<Option<Token>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl GraphAuth {
    /// Create an authenticator for a tenant with an app registration's
    /// client credentials.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            login_base: DEFAULT_LOGIN_BASE.to_string(),
            graph_base: DEFAULT_GRAPH_BASE.to_string(),
            agent: ureq::Agent::new_with_defaults(),
            cached: Mutex::new(None),
        }
    }

    /// Override the login and Graph endpoints (for testing).
    pub fn with_endpoints(
        mut self,
        login_base: impl Into<String>,
        graph_base: impl Into<String>,
    ) -> Self {
        self.login_base = login_base.into();
        self.graph_base = graph_base.into();
        self
    }

    /// Get a connection, reusing the cached token when it is still valid.
    pub fn connect(&self) -> Result<Connection> {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(token) = cached.as_ref()
            && token.is_valid()
        {
            log::debug!("reusing cached Graph token");
            return Ok(Connection {
                agent: self.agent.clone(),
                base: self.graph_base.clone(),
                token: token.clone(),
            });
        }

        let token = self.request_token()?;
        *cached = Some(token.clone());

        Ok(Connection {
            agent: self.agent.clone(),
            base: self.graph_base.clone(),
            token,
        })
    }

    fn request_token(&self) -> Result<Token> {
        let url = format!("{}/{}/oauth2/v2.0/token", self.login_base, self.tenant_id);
        log::debug!("requesting Graph token for tenant {}", self.tenant_id);

        let response: TokenResponse = self
            .agent
            .post(&url)
            .send_form([
                ("grant_type", "client_credentials"),
                ("scope", "https://graph.microsoft.com/.default"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .map_err(|e| match e {
                ureq::Error::StatusCode(401 | 400) => Error::Auth {
                    message: format!("token request rejected for tenant {}", self.tenant_id),
                },
                other => Error::from_transport(&other, "token endpoint"),
            })?
            .body_mut()
            .read_json()
            .map_err(|e| Error::Other(format!("malformed token response: {e}")))?;

        Ok(Token {
            access_token: response.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(response.expires_in),
        })
    }
}

/// One authenticated connection to Graph.
///
/// Cheap to clone: the HTTP agent is shared and the token is a string.
#[derive(Clone)]
pub struct Connection {
    pub(crate) agent: ureq::Agent,
    pub(crate) base: String,
    pub(crate) token: Token,
}

impl Connection {
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token.access_token)
    }
}
