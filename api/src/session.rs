use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::{fs::File, path::PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::ApiError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Bearer tokens of the logged-in operator, persisted to disk.
pub struct Session {
    tokens: RwLock<Option<Tokens>>,
    // Held for the whole refresh exchange so only one runs at a time
    refreshing: Mutex<()>,
    filename: Option<PathBuf>,
    http: reqwest::Client,
    refresh_url: String,
    login_url: String,
}

impl Session {
    /// Restores the tokens saved in `filename`, if any. Without a filename the session lives in
    /// memory only.
    pub fn new(
        http: reqwest::Client,
        refresh_url: String,
        login_url: String,
        filename: Option<PathBuf>,
    ) -> Self {
        let tokens = filename.as_ref().and_then(|f| match Self::from_file(f) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                info!("No stored session in {}: {}", f.display(), e);
                None
            }
        });

        Self {
            tokens: RwLock::new(tokens),
            refreshing: Mutex::new(()),
            filename,
            http,
            refresh_url,
            login_url,
        }
    }

    fn from_file(filename: &PathBuf) -> Result<Tokens, std::io::Error> {
        let contents = {
            let mut file = File::open(filename)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            contents
        };

        Ok(serde_json::from_str(&contents)?)
    }

    fn persist(&self, tokens: Option<&Tokens>) -> Result<(), std::io::Error> {
        let filename = match &self.filename {
            Some(filename) => filename,
            None => return Ok(()),
        };

        match tokens {
            Some(tokens) => {
                let mut output = File::create(filename)?;
                write!(output, "{}", serde_json::to_string(tokens)?)?;
            }
            None => {
                if filename.exists() {
                    std::fs::remove_file(filename)?;
                }
            }
        }

        Ok(())
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn login_required(&self) -> ApiError {
        ApiError::LoginRequired {
            login_url: self.login_url.clone(),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub async fn store(&self, tokens: Tokens) -> Result<(), ApiError> {
        let mut current = self.tokens.write().await;
        self.persist(Some(&tokens))?;
        *current = Some(tokens);
        Ok(())
    }

    pub async fn clear(&self) {
        let mut current = self.tokens.write().await;
        *current = None;

        if let Err(e) = self.persist(None) {
            error!("Could not remove stored session: {}", e);
        }
    }

    /// Obtains a fresh access token after `rejected` got a 401.
    ///
    /// Callers queue on the refresh lock. When the token changed while a caller was waiting, some
    /// other request already refreshed it and the new token is returned without another exchange.
    /// When there is nothing to refresh with, or the exchange fails, the session is cleared and
    /// [`ApiError::LoginRequired`] is returned.
    pub async fn refresh(&self, rejected: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refreshing.lock().await;

        let refresh_token = {
            let tokens = self.tokens.read().await;

            match tokens.as_ref() {
                Some(t) if Some(t.access_token.as_str()) != rejected => {
                    return Ok(t.access_token.clone());
                }
                Some(t) => t.refresh_token.clone(),
                None => None,
            }
        };

        let refresh_token = match refresh_token {
            Some(refresh_token) => refresh_token,
            None => {
                warn!("Access token rejected and no refresh token stored");
                self.clear().await;
                return Err(self.login_required());
            }
        };

        match self.exchange(&refresh_token).await {
            Ok(refreshed) => {
                let tokens = Tokens {
                    access_token: refreshed.access_token,
                    refresh_token: refreshed.refresh_token.or(Some(refresh_token)),
                };
                let access_token = tokens.access_token.clone();
                self.store(tokens).await?;
                info!("Access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.clear().await;
                Err(self.login_required())
            }
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let response = self
            .http
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::from_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn session(server: &MockServer, filename: Option<PathBuf>) -> Session {
        Session::new(
            reqwest::Client::new(),
            server.url("/auth/refresh"),
            "https://login.example/".to_string(),
            filename,
        )
    }

    fn tokens(access: &str, refresh: Option<&str>) -> Tokens {
        Tokens {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn refresh_exchanges_refresh_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/refresh")
                    .json_body(serde_json::json!({ "refresh_token": "r1" }));
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"access_token":"a2"}"#);
            })
            .await;

        let session = session(&server, None);
        session.store(tokens("a1", Some("r1"))).await.unwrap();

        let token = session.refresh(Some("a1")).await.unwrap();
        assert_eq!(token, "a2");
        // The refresh token is kept when the backend does not rotate it
        assert_eq!(
            *session.tokens.read().await,
            Some(tokens("a2", Some("r1")))
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_changed_while_waiting_is_reused() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/refresh");
                then.status(200).body(r#"{"access_token":"never"}"#);
            })
            .await;

        let session = session(&server, None);
        session.store(tokens("a2", Some("r1"))).await.unwrap();

        let token = session.refresh(Some("a1")).await.unwrap();
        assert_eq!(token, "a2");
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn missing_refresh_token_requires_login() {
        let server = MockServer::start_async().await;
        let session = session(&server, None);
        session.store(tokens("a1", None)).await.unwrap();

        let err = session.refresh(Some("a1")).await.unwrap_err();
        match err {
            ApiError::LoginRequired { login_url } => {
                assert_eq!(login_url, "https://login.example/")
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_refresh_clears_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/refresh");
                then.status(401).body(r#"{"detail":"Refresh token expirado"}"#);
            })
            .await;

        let session = session(&server, None);
        session.store(tokens("a1", Some("r1"))).await.unwrap();

        assert!(matches!(
            session.refresh(Some("a1")).await,
            Err(ApiError::LoginRequired { .. })
        ));
        assert!(session.access_token().await.is_none());
    }

    #[tokio::test]
    async fn tokens_survive_restart() {
        let server = MockServer::start_async().await;
        let filename = std::env::temp_dir().join(format!(
            "campus-session-{}-{}.json",
            std::process::id(),
            server.port()
        ));

        let first = session(&server, Some(filename.clone()));
        first.store(tokens("a1", Some("r1"))).await.unwrap();

        let second = session(&server, Some(filename.clone()));
        assert_eq!(second.access_token().await.as_deref(), Some("a1"));

        second.clear().await;
        assert!(!filename.exists());
    }
}
