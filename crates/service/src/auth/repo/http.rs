//! Session provider that talks to the marketplace API over HTTP.

use reqwest::Client;
use url::Url;

use crate::auth::domain::{AuthSession, SignInInput, SignUpInput};
use crate::auth::session::AuthProvider;
use crate::errors::ServiceError;
use crate::listing::repo::http::{error_from, parse_base, read_json};

pub struct HttpAuthProvider {
    client: Client,
    base_url: Url,
}

impl HttpAuthProvider {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self { client: Client::new(), base_url: parse_base(base_url)? })
    }

    fn url(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::Network(format!("invalid path '{path}': {e}")))
    }
}

#[async_trait::async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn sign_up(&self, input: SignUpInput) -> Result<AuthSession, ServiceError> {
        let resp = self.client.post(self.url("auth/register")?).json(&input).send().await?;
        read_json(resp).await
    }

    async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, ServiceError> {
        let resp = self.client.post(self.url("auth/login")?).json(&input).send().await?;
        read_json(resp).await
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), ServiceError> {
        let resp = self.client.post(self.url("auth/logout")?).bearer_auth(&session.token).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(error_from(resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_routes_resolve_under_base_path() {
        let p = HttpAuthProvider::new("http://127.0.0.1:8080/app").unwrap();
        assert_eq!(p.url("auth/login").unwrap().as_str(), "http://127.0.0.1:8080/app/auth/login");
    }
}
