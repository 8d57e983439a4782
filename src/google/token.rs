use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use super::ApiError;
use crate::config::Credentials;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Refresh this long before the recorded expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Default)]
struct TokenState {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    fn usable(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        match self.expires_at {
            Some(expires_at) if expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now => None,
            _ => Some(token),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Keeps the OAuth access token fresh for the lifetime of the client.
#[derive(Debug)]
pub struct TokenManager {
    client: Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    refresh_token: Option<String>,
    state: RwLock<TokenState>,
}

impl TokenManager {
    pub fn new(client: Client, token_url: Url, credentials: &Credentials) -> Self {
        Self {
            client,
            token_url,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            refresh_token: credentials.refresh_token.clone(),
            state: RwLock::new(TokenState {
                access_token: credentials.access_token.clone(),
                expires_at: credentials.expires_at,
            }),
        }
    }

    /// Returns a bearer token, refreshing it first when it is missing or
    /// about to expire.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        {
            let state = self.state.read().await;
            if let Some(token) = state.usable(Utc::now()) {
                return Ok(token.to_owned());
            }
        }

        let Some(refresh_token) = self.refresh_token.as_deref() else {
            // Nothing to refresh with; hand out what we have and let the API decide.
            let state = self.state.read().await;
            return state
                .access_token
                .clone()
                .ok_or_else(|| ApiError::Auth("no access or refresh token configured".into()));
        };

        let mut state = self.state.write().await;
        if let Some(token) = state.usable(Utc::now()) {
            return Ok(token.to_owned());
        }

        tracing::info!("Refreshing Google access token");
        let refreshed = self.refresh(refresh_token).await?;
        state.expires_at = refreshed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        state.access_token = Some(refreshed.access_token.clone());

        Ok(refreshed.access_token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            tracing::error!("Token refresh failed: {err}");
            return Err(ApiError::Auth(err.to_string()));
        }

        Ok(serde_json::from_str(&body)?)
    }
}
