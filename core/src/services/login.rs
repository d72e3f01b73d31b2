//! Session creation.

use tracing::info;

use crate::config::{PrismConfig, Session};
use crate::error::{PrismError, PrismResult};
use crate::http::{HttpRequest, HttpResponse};
use crate::response::{decode, scalar_string};
use crate::services::require;
use crate::transport::Transport;

const CREATE_SESSION_PATH: &str = "login/createPeoSession";

/// Exchanges credentials for a session token.
pub struct LoginService<'a, T: ?Sized> {
    transport: &'a T,
    config: &'a PrismConfig,
}

impl<'a, T: ?Sized> LoginService<'a, T> {
    pub fn new(transport: &'a T, config: &'a PrismConfig) -> Self {
        Self { transport, config }
    }

    pub fn build_login(&self, username: &str, password: &str, peo_id: &str) -> PrismResult<HttpRequest> {
        require(username, "username")?;
        require(password, "password")?;
        require(peo_id, "peo_id")?;
        self.config.build_post_form(
            CREATE_SESSION_PATH,
            &[("username", username), ("password", password), ("peoId", peo_id)],
        )
    }

    /// A 4xx here is an authentication failure and keeps the raw body.
    pub fn parse_login(&self, response: HttpResponse) -> PrismResult<Session> {
        if (400..500).contains(&response.status) {
            return Err(PrismError::Authentication {
                status: response.status,
                body: response.body,
            });
        }
        let body = decode(&response)?;
        body.get("sessionId")
            .and_then(scalar_string)
            .filter(|token| !token.is_empty())
            .map(Session::new)
            .ok_or_else(|| PrismError::Deserialization("login response has no sessionId".to_string()))
    }
}

impl<'a, T: Transport + ?Sized> LoginService<'a, T> {
    pub fn login(&self, username: &str, password: &str, peo_id: &str) -> PrismResult<Session> {
        let request = self.build_login(username, password, peo_id)?;
        let session = self.parse_login(self.transport.execute(request)?)?;
        info!(username, peo_id, "created session");
        Ok(session)
    }
}
