//! Transient session state and the dependency chain it enforces.
//!
//! A response only exists on top of built context, and context only exists
//! on top of an embedded query. Clearing an earlier link clears every later
//! one. Each async stage takes a generation number when it starts; a result
//! that comes back under an older generation is stale and must be discarded.

use ait_core::error::{Stage, ValidationError};
use ait_core::experience::{EmbeddedQuery, ExperienceId};

use crate::curator::ContextCurator;

/// The generated response awaiting the user's edits.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftResponse {
    pub text: String,
    /// The effective context it was generated from, in turn order
    pub context_ids: Vec<ExperienceId>,
}

/// Where the session stands, derived from the chain and the busy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    QueryPending,
    ContextReady,
    ResponsePending,
    ResponseReady,
    Storing,
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::QueryPending => "query pending",
            WorkflowState::ContextReady => "context ready",
            WorkflowState::ResponsePending => "response pending",
            WorkflowState::ResponseReady => "response ready",
            WorkflowState::Storing => "storing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    query: Option<EmbeddedQuery>,
    curator: ContextCurator,
    response: Option<DraftResponse>,
    query_in_flight: bool,
    context_in_flight: bool,
    store_in_flight: bool,
    generation: u64,
}

impl SessionState {
    pub fn new(context_window: usize) -> Self {
        Self {
            query: None,
            curator: ContextCurator::new(context_window),
            response: None,
            query_in_flight: false,
            context_in_flight: false,
            store_in_flight: false,
            generation: 0,
        }
    }

    pub fn state(&self) -> WorkflowState {
        if self.store_in_flight {
            WorkflowState::Storing
        } else if self.query_in_flight {
            WorkflowState::QueryPending
        } else if self.context_in_flight {
            WorkflowState::ResponsePending
        } else if self.response.is_some() {
            WorkflowState::ResponseReady
        } else if self.query.is_some() {
            WorkflowState::ContextReady
        } else {
            WorkflowState::Idle
        }
    }

    pub fn query(&self) -> Option<&EmbeddedQuery> {
        self.query.as_ref()
    }

    pub fn curator(&self) -> &ContextCurator {
        &self.curator
    }

    pub fn curator_mut(&mut self) -> &mut ContextCurator {
        &mut self.curator
    }

    pub fn response(&self) -> Option<&DraftResponse> {
        self.response.as_ref()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn is_busy(&self, stage: Stage) -> bool {
        *self.flag(stage)
    }

    /// Mark `stage` in flight and return the generation it runs under.
    pub fn begin(&mut self, stage: Stage) -> Result<u64, ValidationError> {
        let flag = self.flag_mut(stage);
        if *flag {
            return Err(ValidationError::Busy(stage));
        }
        *flag = true;
        Ok(self.generation)
    }

    /// Clear the busy flag of `stage` if `generation` is still current.
    ///
    /// Returns `false` for a stale generation, in which case nothing changes.
    pub fn finish(&mut self, stage: Stage, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        *self.flag_mut(stage) = false;
        true
    }

    /// Install an embedded query and its candidates; drops any response.
    pub fn set_context(&mut self, query: EmbeddedQuery, candidates: Vec<ExperienceId>) {
        self.query = Some(query);
        self.curator.reset(candidates);
        self.response = None;
    }

    /// Install a response draft. Ignored when no context is built.
    pub fn set_response(&mut self, draft: DraftResponse) -> bool {
        if self.query.is_none() || !self.curator.can_build_context() {
            return false;
        }
        self.response = Some(draft);
        true
    }

    /// Back to idle: chain and busy flags cleared, in-flight results
    /// invalidated. Calling it again changes nothing but the generation.
    pub fn restart(&mut self) {
        self.query = None;
        self.curator.clear();
        self.response = None;
        self.query_in_flight = false;
        self.context_in_flight = false;
        self.store_in_flight = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether the chain is empty and nothing is in flight.
    pub fn is_idle(&self) -> bool {
        self.state() == WorkflowState::Idle && self.curator.candidates().is_none()
    }

    fn flag(&self, stage: Stage) -> &bool {
        match stage {
            Stage::Query => &self.query_in_flight,
            Stage::Context => &self.context_in_flight,
            Stage::Store => &self.store_in_flight,
        }
    }

    fn flag_mut(&mut self, stage: Stage) -> &mut bool {
        match stage {
            Stage::Query => &mut self.query_in_flight,
            Stage::Context => &mut self.context_in_flight,
            Stage::Store => &mut self.store_in_flight,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(crate::curator::DEFAULT_WINDOW)
    }
}
