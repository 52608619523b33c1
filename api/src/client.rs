use log::{debug, error};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::{path::PathBuf, time::Duration};

use crate::models::{
    AvailabilityQuery, AvailableTeacher, BlockAssignment, Class, Decision, Enrollment, Id,
    Proposal, Resource,
};
use crate::{ApiError, Session};

pub const CORE_API_BASE_URL: &str = "https://campus-core.execute-api.example.com/prod";
pub const DEFAULT_AVAILABILITY_URL: &str = "https://disponibilidad-docentes.example.com";
pub const DEFAULT_LOGIN_URL: &str = "https://login.campus-connect.example.com/";

pub struct BackendConfig {
    pub core_url: String,
    pub availability_url: String,
    pub login_url: String,
    /// Where tokens are saved between runs; `None` keeps them in memory.
    pub token_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            core_url: CORE_API_BASE_URL.to_string(),
            availability_url: DEFAULT_AVAILABILITY_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            token_file: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the core academic API and the teacher-availability service.
///
/// Every request carries the session's bearer token. A 401 triggers one token refresh, after
/// which the request is replayed once.
pub struct Backend {
    http: reqwest::Client,
    core_url: String,
    availability_url: String,
    session: Session,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let core_url = config.core_url.trim_end_matches('/').to_string();

        let session = Session::new(
            http.clone(),
            format!("{}/auth/refresh", core_url),
            config.login_url,
            config.token_file,
        );

        Ok(Self {
            http,
            core_url,
            availability_url: config.availability_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn list<T: Resource>(&self) -> Result<Vec<T>, ApiError> {
        let url = format!("{}/{}", self.core_url, T::PATH);
        self.fetch(&url, || self.http.get(&url)).await
    }

    pub async fn get<T: Resource>(&self, id: Id) -> Result<T, ApiError> {
        let url = format!("{}/{}/{}", self.core_url, T::PATH, id);
        self.fetch(&url, || self.http.get(&url)).await
    }

    pub async fn create<T: Resource>(&self, payload: &T::Payload) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.core_url, T::PATH);
        self.fetch(&url, || self.http.post(&url).json(payload)).await
    }

    pub async fn update<T: Resource>(&self, id: Id, payload: &T::Payload) -> Result<T, ApiError> {
        let url = format!("{}/{}/{}", self.core_url, T::PATH, id);
        self.fetch(&url, || self.http.put(&url).json(payload)).await
    }

    pub async fn delete<T: Resource>(&self, id: Id) -> Result<(), ApiError> {
        let url = format!("{}/{}/{}", self.core_url, T::PATH, id);
        self.call(&url, || self.http.delete(&url)).await.map(|_| ())
    }

    pub async fn course_classes(&self, course_id: Id) -> Result<Vec<Class>, ApiError> {
        let url = format!("{}/cursos/{}/clases", self.core_url, course_id);
        self.fetch(&url, || self.http.get(&url)).await
    }

    pub async fn course_enrollments(&self, course_id: Id) -> Result<Vec<Enrollment>, ApiError> {
        let url = format!("{}/cursos/{}/inscripciones", self.core_url, course_id);
        self.fetch(&url, || self.http.get(&url)).await
    }

    pub async fn available_teachers(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<AvailableTeacher>, ApiError> {
        let url = format!("{}/docentes/disponibles", self.availability_url);
        self.fetch(&url, || self.http.get(&url).query(query)).await
    }

    pub async fn assign_block(&self, assignment: &BlockAssignment) -> Result<(), ApiError> {
        let url = format!("{}/disponibilidad/asignar", self.availability_url);
        self.call(&url, || self.http.post(&url).json(assignment))
            .await
            .map(|_| ())
    }

    pub async fn proposals(&self) -> Result<Vec<Proposal>, ApiError> {
        let url = format!("{}/propuestas", self.availability_url);
        self.fetch(&url, || self.http.get(&url)).await
    }

    pub async fn decide_proposal(&self, id: Id, decision: Decision) -> Result<Proposal, ApiError> {
        let url = format!(
            "{}/propuestas/{}/{}",
            self.availability_url,
            id,
            decision.action()
        );
        self.fetch(&url, || self.http.post(&url)).await
    }

    async fn fetch<T, F>(&self, url: &str, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let response = self.call(url, build).await?;

        let body = response.text().await.map_err(|e| {
            error!("{}: could not read response: {}", url, e);
            ApiError::from(e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            error!("{}: unexpected response: {}", url, e);
            ApiError::Decode(e.to_string())
        })
    }

    /// Sends the request built by `build`, refreshing the token and replaying it once on 401.
    async fn call<F>(&self, url: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let result = self.authorized(build).await;

        if let Err(e) = &result {
            error!("{}: {}", url, e);
        }

        result
    }

    async fn authorized<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.session.access_token().await;
        let response = with_token(build(), token.as_deref()).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return checked(response).await;
        }

        debug!("Got 401, refreshing the access token");
        let token = self.session.refresh(token.as_deref()).await?;
        let response = build().bearer_auth(&token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.clear().await;
            return Err(self.session.login_required());
        }

        checked(response).await
    }
}

fn with_token(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn checked(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_body(status.as_u16(), &body))
    }
}
