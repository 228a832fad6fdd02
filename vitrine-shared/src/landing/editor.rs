//! Stateful landing page editing session
//!
//! [`ConfigEditor`] holds the canonical configuration of one page and talks
//! to the server through a [`ConfigBackend`]. Loads and saves are tagged
//! with sequencer tickets; a response that arrives after a newer one has
//! been applied is discarded. Local edits take a ticket too, so a save that
//! was in flight while the user kept typing never overwrites their changes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use super::config::{
    ConfigError, CreateLandingPageRequest, FieldProblem, LandingPageConfig, LandingPagePayload,
    Section,
};
use super::sequence::{RequestSequencer, Ticket};
use super::Objective;
use crate::models::landing_page::LandingPageRecord;

/// Failure reported by a backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The server answered with an error status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The server could not be reached or answered garbage
    #[error("Falha de comunicação com o servidor: {0}")]
    Unavailable(String),
}

/// Remote operations the editor needs
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    async fn fetch_config(&self, id: i64) -> Result<LandingPageRecord, BackendError>;

    async fn create_page(
        &self,
        request: &CreateLandingPageRequest,
    ) -> Result<LandingPageRecord, BackendError>;

    async fn save_config(
        &self,
        id: i64,
        payload: &LandingPagePayload,
    ) -> Result<LandingPageRecord, BackendError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Nenhuma página carregada")]
    NotLoaded,

    #[error("A página ainda não pode ser publicada")]
    Incomplete(Vec<FieldProblem>),
}

/// What happened to a server response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    /// A newer response was already applied
    Discarded,
}

pub struct ConfigEditor<B> {
    backend: Arc<B>,
    sequencer: RequestSequencer,
    state: RwLock<Option<LandingPageConfig>>,
}

impl<B: ConfigBackend> ConfigEditor<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            sequencer: RequestSequencer::new(),
            state: RwLock::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current canonical state
    pub async fn snapshot(&self) -> Option<LandingPageConfig> {
        self.state.read().await.clone()
    }

    /// Replaces the state with a fresh draft; in-flight loads become stale
    pub async fn start_draft(&self, objective: Objective, digital_name: &str, template_id: Option<&str>) {
        let ticket = self.sequencer.issue();
        let mut state = self.state.write().await;
        if self.sequencer.try_apply(ticket) {
            *state = Some(LandingPageConfig::draft(objective, digital_name, template_id));
        }
    }

    pub async fn load(&self, id: i64) -> Result<ResponseOutcome, EditorError> {
        let ticket = self.sequencer.issue();
        let record = self.backend.fetch_config(id).await?;
        Ok(self.apply(ticket, &record).await)
    }

    /// Persists the current state, creating the page first if it is a draft
    ///
    /// Once the page exists its id is kept even if the following save
    /// fails, so a retry updates that page instead of creating another.
    pub async fn save(&self) -> Result<ResponseOutcome, EditorError> {
        let (ticket, config) = {
            let state = self.state.read().await;
            let config = state.clone().ok_or(EditorError::NotLoaded)?;
            (self.sequencer.issue(), config)
        };

        if config.published {
            let problems = config.publish_problems();
            if !problems.is_empty() {
                return Err(EditorError::Incomplete(problems));
            }
        }

        let payload = config.to_payload();

        let id = match config.id {
            Some(id) => id,
            None => {
                let request = CreateLandingPageRequest {
                    digital_name: config.digital_name.clone(),
                    objective: config.objective,
                    template_id: Some(config.template_id.clone()),
                };
                let created = self.backend.create_page(&request).await?;
                self.adopt_id(created.id).await;
                created.id
            }
        };

        let record = self.backend.save_config(id, &payload).await?;
        Ok(self.apply(ticket, &record).await)
    }

    /// Publishes or unpublishes, then saves
    ///
    /// Publishing an incomplete page fails without changing the state.
    pub async fn set_published(&self, published: bool) -> Result<ResponseOutcome, EditorError> {
        if published {
            let problems = self
                .snapshot()
                .await
                .ok_or(EditorError::NotLoaded)?
                .publish_problems();
            if !problems.is_empty() {
                return Err(EditorError::Incomplete(problems));
            }
        }

        let previous = self.snapshot().await.map(|config| config.published);
        self.set_top_level_field("published", Value::Bool(published))
            .await?;

        match self.save().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Some(previous) = previous {
                    self.restore_published(published, previous).await;
                }
                Err(err)
            }
        }
    }

    pub async fn set_section_field(
        &self,
        section: Section,
        field: &str,
        value: Value,
    ) -> Result<(), EditorError> {
        self.edit(|config| config.set_section_field(section, field, value))
            .await
    }

    pub async fn set_top_level_field(&self, field: &str, value: Value) -> Result<(), EditorError> {
        self.edit(|config| config.set_top_level_field(field, value))
            .await
    }

    pub async fn set_whatsapp_link(&self, raw: &str) -> Result<(), EditorError> {
        self.edit(|config| config.set_whatsapp_link(raw)).await
    }

    pub async fn set_email_link(&self, raw: &str) -> Result<(), EditorError> {
        self.edit(|config| config.set_email_link(raw)).await
    }

    async fn edit<F>(&self, change: F) -> Result<(), EditorError>
    where
        F: FnOnce(&mut LandingPageConfig) -> Result<(), ConfigError>,
    {
        let mut state = self.state.write().await;
        let config = state.as_mut().ok_or(EditorError::NotLoaded)?;
        change(config)?;

        // responses to requests issued before this edit are now stale
        let ticket = self.sequencer.issue();
        self.sequencer.try_apply(ticket);
        Ok(())
    }

    /// Records the id of a freshly created page on the draft it came from
    async fn adopt_id(&self, id: i64) {
        let mut state = self.state.write().await;
        if let Some(config) = state.as_mut().filter(|config| config.id.is_none()) {
            config.id = Some(id);
        }
    }

    async fn restore_published(&self, attempted: bool, previous: bool) {
        let mut state = self.state.write().await;
        if let Some(config) = state.as_mut().filter(|config| config.published == attempted) {
            config.published = previous;
        }
    }

    async fn apply(&self, ticket: Ticket, record: &LandingPageRecord) -> ResponseOutcome {
        let mut state = self.state.write().await;
        if self.sequencer.try_apply(ticket) {
            *state = Some(LandingPageConfig::from_record(record));
            ResponseOutcome::Applied
        } else {
            tracing::debug!(
                ticket = ticket.value(),
                page_id = record.id,
                "Discarding stale landing page response"
            );
            ResponseOutcome::Discarded
        }
    }
}
