//! HTTP client over the Vitrine REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::RwLock;
use vitrine_shared::{
    landing::{
        config::{CreateLandingPageRequest, LandingPageConfig, LandingPagePayload},
        editor::{BackendError, ConfigBackend},
        templates::Template,
        Objective,
    },
    models::{
        landing_page::LandingPageRecord,
        lead::Lead,
        order::Order,
        product::{Product, ProductType},
        training::{TrainingCategory, TrainingSummary},
        user::PublicUser,
    },
};

use crate::error::ClientError;
use crate::session::{Session, SessionStore};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Body of a successful register or login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Published page as served to visitors
#[derive(Debug, Clone, Deserialize)]
pub struct PublicPage {
    pub url: String,
    pub config: LandingPageConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct AccessBody {
    has_access: bool,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
    session: Option<SessionStore>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an empty base URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::Config("URL base vazia".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("vitrine-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            http,
            token: RwLock::new(None),
            session: None,
        })
    }

    /// Persists logins to `store`
    pub fn with_session(mut self, store: SessionStore) -> Self {
        self.session = Some(store);
        self
    }

    /// Picks up the token of a previous run, returning its user
    pub async fn restore(&self) -> Result<Option<PublicUser>, ClientError> {
        let Some(store) = &self.session else {
            return Ok(None);
        };

        let session = store.load().await?;
        *self.token.write().await = session.as_ref().map(|s| s.token.clone());
        Ok(session.map(|s| s.user))
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let auth: AuthSession = self
            .json(self.request(Method::POST, "/auth/register").await.json(&body))
            .await?;

        self.start_session(&auth).await?;
        Ok(auth)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let auth: AuthSession = self
            .json(self.request(Method::POST, "/auth/login").await.json(&body))
            .await?;

        self.start_session(&auth).await?;
        tracing::info!(user_id = auth.user.id, "Logged in");
        Ok(auth)
    }

    /// Forgets the token and the stored session
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.end_session().await
    }

    pub async fn profile(&self) -> Result<PublicUser, ClientError> {
        self.json(self.request(Method::GET, "/user/profile").await).await
    }

    pub async fn has_access(&self, product_type: ProductType) -> Result<bool, ClientError> {
        let path = format!("/user/access/{}", product_type.as_str());
        let body: AccessBody = self.json(self.request(Method::GET, &path).await).await?;
        Ok(body.has_access)
    }

    pub async fn landing_pages(&self) -> Result<Vec<LandingPageRecord>, ClientError> {
        self.json(self.request(Method::GET, "/landpages").await).await
    }

    pub async fn templates(&self, objective: Objective) -> Result<Vec<Template>, ClientError> {
        let path = format!("/landpages/templates/{}", objective.as_str());
        self.json(self.request(Method::GET, &path).await).await
    }

    pub async fn public_page(&self, digital_name: &str) -> Result<PublicPage, ClientError> {
        let path = format!("/public/landpages/{digital_name}");
        self.json(self.request(Method::GET, &path).await).await
    }

    pub async fn leads(&self, objective: Option<Objective>) -> Result<Vec<Lead>, ClientError> {
        let request = self.request(Method::GET, "/landpage/leads").await;
        self.json(with_lead_type(request, objective)).await
    }

    /// Lead CSV as served by the export endpoint
    pub async fn export_leads(&self, objective: Option<Objective>) -> Result<String, ClientError> {
        let request = self.request(Method::GET, "/landpage/leads/export").await;
        let response = self.send(with_lead_type(request, objective)).await?;
        Ok(response.text().await?)
    }

    pub async fn landpage_products(&self) -> Result<Vec<Product>, ClientError> {
        self.json(self.request(Method::GET, "/landpage/products").await).await
    }

    pub async fn order_landpage(
        &self,
        product_id: i64,
        landing_page_id: Option<i64>,
    ) -> Result<Order, ClientError> {
        let body = serde_json::json!({ "product_id": product_id, "landing_page_id": landing_page_id });
        self.json(self.request(Method::POST, "/landpage/orders").await.json(&body))
            .await
    }

    pub async fn trainings(
        &self,
        category: TrainingCategory,
    ) -> Result<Vec<TrainingSummary>, ClientError> {
        let segment = match category {
            TrainingCategory::InProgress => "in-progress",
            TrainingCategory::Available => "available",
            TrainingCategory::Locked => "locked",
        };
        let path = format!("/user/trainings/{segment}");
        self.json(self.request(Method::GET, &path).await).await
    }

    pub async fn complete_lesson(&self, lesson_id: i64) -> Result<(), ClientError> {
        let path = format!("/user/lessons/{lesson_id}/complete");
        self.send(self.request(Method::POST, &path).await).await?;
        Ok(())
    }

    async fn start_session(&self, auth: &AuthSession) -> Result<(), ClientError> {
        *self.token.write().await = Some(auth.access_token.clone());

        if let Some(store) = &self.session {
            store
                .save(&Session {
                    token: auth.access_token.clone(),
                    user: auth.user.clone(),
                })
                .await?;
        }
        Ok(())
    }

    async fn end_session(&self) -> Result<(), ClientError> {
        *self.token.write().await = None;

        if let Some(store) = &self.session {
            store.clear().await?;
        }
        Ok(())
    }

    /// Builder for `path` with the bearer token attached when logged in
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));

        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request, turning error statuses into [`ClientError`]
    ///
    /// A 401 ends the session: the token is no longer usable.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        tracing::debug!(status = status.as_u16(), message = %message, "Request rejected");

        if status == StatusCode::UNAUTHORIZED {
            self.end_session().await?;
            return Err(ClientError::Unauthorized(message));
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let bytes = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn with_lead_type(request: RequestBuilder, objective: Option<Objective>) -> RequestBuilder {
    let lead_type = objective.map_or("all", |o| o.as_str());
    request.query(&[("type", lead_type)])
}

#[async_trait]
impl ConfigBackend for ApiClient {
    async fn fetch_config(&self, id: i64) -> Result<LandingPageRecord, BackendError> {
        let path = format!("/landpages/{id}/config");
        Ok(self.json(self.request(Method::GET, &path).await).await?)
    }

    async fn create_page(
        &self,
        request: &CreateLandingPageRequest,
    ) -> Result<LandingPageRecord, BackendError> {
        Ok(self
            .json(self.request(Method::POST, "/landpages").await.json(request))
            .await?)
    }

    async fn save_config(
        &self,
        id: i64,
        payload: &LandingPagePayload,
    ) -> Result<LandingPageRecord, BackendError> {
        let path = format!("/landpages/{id}/config");
        Ok(self
            .json(self.request(Method::PUT, &path).await.json(payload))
            .await?)
    }
}
