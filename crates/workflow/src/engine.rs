//! The workflow engine — query → context → response → store.
//!
//! [`Workflow`] owns the session state and drives the three remote stages.
//! The session lock is only held between awaits, never across a remote call:
//! each stage validates and marks itself busy under the lock, releases it for
//! the call, then re-takes it to apply the result if its generation is still
//! current.

use ait_config::AppConfig;
use ait_core::error::{Error, Result, Stage, StoreError, ValidationError};
use ait_core::event::{EventBus, WorkflowEvent};
use ait_core::experience::{EmbeddedQuery, Experience, ExperienceId, exchange_text};
use ait_core::message::Turn;
use ait_core::provider::{Completer, Embedder};
use ait_core::store::ExperienceStore;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::alert::{AlertChannel, DEFAULT_ALERT_DURATION};
use crate::curator::DEFAULT_WINDOW;
use crate::session::{DraftResponse, SessionState, WorkflowState};
use crate::settings::{HistoryAction, SessionSettings};

/// Maximum number of candidate ids requested per query.
pub const DEFAULT_RELATED_LIMIT: usize = 128;

/// Host visibility, as reported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Initial curator window
    pub context_window: usize,
    /// Candidate ids requested from the store per query
    pub related_limit: usize,
    pub alert_duration: Duration,
}

impl WorkflowOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            context_window: config.workflow.context_window,
            related_limit: config.memory.related_limit,
            alert_duration: Duration::from_secs(config.workflow.alert_secs),
        }
    }
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_WINDOW,
            related_limit: DEFAULT_RELATED_LIMIT,
            alert_duration: DEFAULT_ALERT_DURATION,
        }
    }
}

/// One workflow session over a shared experience store.
pub struct Workflow {
    store: Arc<dyn ExperienceStore>,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    settings: SessionSettings,
    session: Mutex<SessionState>,
    alerts: AlertChannel,
    events: EventBus,
    related_limit: usize,
}

impl Workflow {
    pub fn new(
        store: Arc<dyn ExperienceStore>,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        settings: SessionSettings,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            store,
            embedder,
            completer,
            settings,
            session: Mutex::new(SessionState::new(options.context_window)),
            alerts: AlertChannel::new(options.alert_duration),
            events: EventBus::default(),
            related_limit: options.related_limit,
        }
    }

    fn session(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn require_credential(&self) -> std::result::Result<String, ValidationError> {
        self.settings
            .credential()
            .ok_or(ValidationError::MissingCredential)
    }

    /// Surface a stage failure to the user.
    fn alert(&self, stage: Stage, err: &Error) {
        let message = err.to_string();
        warn!(%stage, error = %message, "Workflow stage failed");
        self.alerts.raise(message.clone());
        self.events.publish(WorkflowEvent::AlertRaised {
            message,
            timestamp: Utc::now(),
        });
    }

    // --- Stage 1: query ---

    /// Embed `text` and rank related experiences as candidate context.
    ///
    /// Supersedes whatever cycle was in progress. Returns the full candidate
    /// list; the curator decides how much of it is shown.
    pub async fn submit_query(&self, text: &str) -> Result<Vec<ExperienceId>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        let credential = self.require_credential()?;

        let generation = {
            let mut session = self.session();
            if session.is_busy(Stage::Query) {
                return Err(ValidationError::Busy(Stage::Query).into());
            }
            session.restart();
            session.begin(Stage::Query)?
        };

        debug!(generation, chars = text.len(), "Embedding query");
        let outcome = self.embed_and_rank(&credential, text).await;

        let mut session = self.session();
        if !session.finish(Stage::Query, generation) {
            debug!(generation, "Discarding stale query result");
            return Err(Error::Superseded);
        }

        match outcome {
            Ok((embedding, candidates)) => {
                session.set_context(
                    EmbeddedQuery {
                        text: text.to_string(),
                        embedding,
                    },
                    candidates.clone(),
                );
                drop(session);

                info!(candidates = candidates.len(), "Context ready");
                self.events.publish(WorkflowEvent::ContextReady {
                    query: text.to_string(),
                    candidates: candidates.len(),
                    timestamp: Utc::now(),
                });
                Ok(candidates)
            }
            Err(e) => {
                drop(session);
                self.alert(Stage::Query, &e);
                Err(e)
            }
        }
    }

    async fn embed_and_rank(
        &self,
        credential: &str,
        text: &str,
    ) -> Result<(Vec<f32>, Vec<ExperienceId>)> {
        let embedding = self.embedder.embed(credential, text).await?;
        let candidates = self
            .store
            .related_ids(&embedding, self.related_limit)
            .await?;
        Ok((embedding, candidates))
    }

    // --- Stage 2: context → response ---

    /// Generate a response from `context_ids`, oldest first, followed by the
    /// live query.
    ///
    /// Ids the store no longer has are skipped and dropped from the curator.
    pub async fn submit_context(&self, context_ids: &[ExperienceId]) -> Result<String> {
        let credential = self.require_credential()?;

        let (generation, query) = {
            let mut session = self.session();
            let query = session
                .query()
                .map(|q| q.text.clone())
                .ok_or(ValidationError::NoQuery)?;
            if !session.curator().can_build_context() {
                return Err(ValidationError::ContextNotBuilt.into());
            }
            (session.begin(Stage::Context)?, query)
        };

        let outcome = self.generate(&credential, &query, context_ids).await;

        let mut session = self.session();
        if !session.finish(Stage::Context, generation) {
            debug!(generation, "Discarding stale completion");
            return Err(Error::Superseded);
        }

        match outcome {
            Ok((text, used, missing)) => {
                for id in &missing {
                    session.curator_mut().drop_id(id);
                }
                session.set_response(DraftResponse {
                    text: text.clone(),
                    context_ids: used.clone(),
                });
                drop(session);

                info!(
                    context = used.len(),
                    skipped = missing.len(),
                    chars = text.len(),
                    "Response generated"
                );
                self.events.publish(WorkflowEvent::ResponseGenerated {
                    context_len: used.len(),
                    response_chars: text.len(),
                    timestamp: Utc::now(),
                });
                Ok(text)
            }
            Err(e) => {
                drop(session);
                self.alert(Stage::Context, &e);
                Err(e)
            }
        }
    }

    /// Generate from the curator's current effective context.
    pub async fn submit_curated_context(&self) -> Result<String> {
        let ids = self
            .effective_context()
            .ok_or(ValidationError::ContextNotBuilt)?;
        self.submit_context(&ids).await
    }

    async fn generate(
        &self,
        credential: &str,
        query: &str,
        context_ids: &[ExperienceId],
    ) -> Result<(String, Vec<ExperienceId>, Vec<ExperienceId>)> {
        let mut turns = Vec::with_capacity(context_ids.len() + 1);
        let mut used = Vec::with_capacity(context_ids.len());
        let mut missing = Vec::new();

        for id in context_ids {
            match self.store.get(id).await {
                Ok(exp) => {
                    turns.push(Turn::new(exp.query, exp.response));
                    used.push(id.clone());
                }
                Err(StoreError::NotFound(_)) => {
                    warn!(id = %id.short(), "Context experience no longer stored, skipping");
                    missing.push(id.clone());
                }
                Err(e) => return Err(e.into()),
            }
        }
        turns.push(Turn::pending(query));

        debug!(turns = turns.len(), provider = self.completer.name(), "Requesting completion");
        let text = self.completer.complete(credential, &turns).await?;
        Ok((text.trim().to_string(), used, missing))
    }

    // --- Stage 3: store ---

    /// Embed the completed exchange and push it with the draft's context ids.
    ///
    /// On success the session returns to idle. If the push fails the draft
    /// is kept so the user can retry.
    pub async fn store_response(&self, final_text: &str) -> Result<ExperienceId> {
        let credential = self.require_credential()?;

        let (generation, query, context_ids) = {
            let mut session = self.session();
            let query = session
                .query()
                .map(|q| q.text.clone())
                .ok_or(ValidationError::NoQuery)?;
            let context_ids = session
                .response()
                .map(|r| r.context_ids.clone())
                .ok_or(ValidationError::NoResponse)?;
            if final_text.trim().is_empty() {
                return Err(ValidationError::EmptyResponse.into());
            }
            (session.begin(Stage::Store)?, query, context_ids)
        };

        let embedding = match self
            .embedder
            .embed(&credential, &exchange_text(&query, final_text))
            .await
        {
            Ok(embedding) => embedding,
            Err(e) => {
                if !self.session().finish(Stage::Store, generation) {
                    return Err(Error::Superseded);
                }
                let err = Error::from(e);
                self.alert(Stage::Store, &err);
                return Err(err);
            }
        };

        if !self.session().is_current(generation) {
            debug!(generation, "Session changed before push, discarding");
            return Err(Error::Superseded);
        }

        let pushed = self
            .store
            .push(&query, final_text, embedding, context_ids)
            .await;

        match pushed {
            Ok(id) => {
                {
                    let mut session = self.session();
                    if session.is_current(generation) {
                        session.restart();
                    }
                }
                info!(id = %id.short(), "Experience stored");
                self.events.publish(WorkflowEvent::ExperienceStored {
                    id: id.clone(),
                    timestamp: Utc::now(),
                });
                Ok(id)
            }
            Err(e) => {
                if !self.session().finish(Stage::Store, generation) {
                    return Err(Error::Superseded);
                }
                let err = Error::from(e);
                self.alert(Stage::Store, &err);
                Err(err)
            }
        }
    }

    // --- Session control ---

    /// Abandon the current cycle. The store is untouched.
    pub fn restart(&self) {
        self.session().restart();
        info!("Session restarted");
        self.events.publish(WorkflowEvent::SessionRestarted {
            timestamp: Utc::now(),
        });
    }

    pub async fn clear_history(&self) -> Result<usize> {
        self.apply_history_action(HistoryAction::Clear).await
    }

    pub async fn reset_history(&self) -> Result<usize> {
        self.apply_history_action(HistoryAction::Reset).await
    }

    /// Clear or reseed the store, then return the session to idle.
    ///
    /// Returns the number of experiences left in the store.
    pub async fn apply_history_action(&self, action: HistoryAction) -> Result<usize> {
        match action {
            HistoryAction::Clear => self.store.clear().await?,
            HistoryAction::Reset => self.store.reset().await?,
        }
        if let Err(e) = self.store.flush().await {
            warn!(error = %e, ?action, "Failed to persist history");
        }
        self.session().restart();

        let remaining = self.store.len().await?;
        info!(?action, remaining, "History replaced");
        self.events.publish(WorkflowEvent::HistoryReplaced {
            remaining,
            timestamp: Utc::now(),
        });
        Ok(remaining)
    }

    /// Flush the store when the host is about to be hidden.
    pub async fn on_visibility_change(&self, visibility: Visibility) {
        if visibility != Visibility::Hidden {
            return;
        }
        match self.store.flush().await {
            Ok(()) => debug!(store = self.store.name(), "Store flushed"),
            Err(e) => warn!(error = %e, store = self.store.name(), "Failed to flush store"),
        }
    }

    // --- Curation ---

    /// Drop `id` from the effective context.
    pub fn drop_context(&self, id: &ExperienceId) -> bool {
        self.session().curator_mut().drop_id(id)
    }

    pub fn expand_context(&self) -> bool {
        self.session().curator_mut().expand_window()
    }

    pub fn can_expand_context(&self) -> bool {
        self.session().curator().can_expand()
    }

    pub fn can_build_context(&self) -> bool {
        self.session().curator().can_build_context()
    }

    pub fn candidates(&self) -> Option<Vec<ExperienceId>> {
        self.session().curator().candidates().map(<[_]>::to_vec)
    }

    pub fn effective_context(&self) -> Option<Vec<ExperienceId>> {
        self.session().curator().effective()
    }

    /// Resolve the effective context for display.
    ///
    /// `None` when context has not been built. Ids the store no longer has
    /// are dropped from the curator.
    pub async fn context_view(&self) -> Result<Option<Vec<Experience>>> {
        let Some(ids) = self.effective_context() else {
            return Ok(None);
        };

        let mut entries = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.store.get(id).await {
                Ok(exp) => entries.push(exp),
                Err(StoreError::NotFound(_)) => {
                    debug!(id = %id.short(), "Dropping missing experience from view");
                    self.drop_context(id);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(entries))
    }

    // --- History ---

    pub async fn recent(&self, n: usize) -> Result<Vec<Experience>> {
        Ok(self.store.recent(n).await?)
    }

    /// Remove one experience from the store and from the current view.
    pub async fn forget(&self, id: &ExperienceId) -> Result<()> {
        self.store.remove(id).await?;
        let mut session = self.session();
        if session.curator().candidates().is_some() {
            session.curator_mut().drop_id(id);
        }
        info!(id = %id.short(), "Experience forgotten");
        Ok(())
    }

    // --- Accessors ---

    pub fn state(&self) -> WorkflowState {
        self.session().state()
    }

    pub fn query(&self) -> Option<String> {
        self.session().query().map(|q| q.text.clone())
    }

    pub fn response(&self) -> Option<DraftResponse> {
        self.session().response().cloned()
    }

    pub fn is_busy(&self, stage: Stage) -> bool {
        self.session().is_busy(stage)
    }

    /// Whether "store" is currently allowed.
    pub fn can_store(&self) -> bool {
        let session = self.session();
        session.response().is_some() && !session.is_busy(Stage::Store)
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Replace the credential; empty input removes it.
    pub fn set_credential(&self, value: &str) -> Result<()> {
        Ok(self.settings.set_credential(value)?)
    }

    pub fn alerts(&self) -> &AlertChannel {
        &self.alerts
    }

    pub fn events(&self) -> broadcast::Receiver<Arc<WorkflowEvent>> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &Arc<dyn ExperienceStore> {
        &self.store
    }
}
