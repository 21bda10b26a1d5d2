//! Context curation — the human's view over the candidate context.
//!
//! The store proposes a ranked list of candidate ids. The curator shows the
//! first `n` of them that the user has not dropped, and lets the user widen
//! the window one step at a time. It never talks to the store and never
//! re-ranks.

use ait_core::experience::ExperienceId;
use std::collections::HashSet;

/// Initial number of candidates shown as context.
pub const DEFAULT_WINDOW: usize = 3;

/// Candidate context plus the user's prune state.
#[derive(Debug, Clone)]
pub struct ContextCurator {
    candidates: Option<Vec<ExperienceId>>,
    dropped: HashSet<ExperienceId>,
    window: usize,
    initial_window: usize,
}

impl ContextCurator {
    pub fn new(initial_window: usize) -> Self {
        let initial_window = initial_window.max(1);
        Self {
            candidates: None,
            dropped: HashSet::new(),
            window: initial_window,
            initial_window,
        }
    }

    /// Start a new cycle with freshly ranked candidates.
    pub fn reset(&mut self, candidates: Vec<ExperienceId>) {
        self.candidates = Some(candidates);
        self.dropped.clear();
        self.window = self.initial_window;
    }

    /// Forget the candidates: context is no longer built.
    pub fn clear(&mut self) {
        self.candidates = None;
        self.dropped.clear();
        self.window = self.initial_window;
    }

    /// The ranked candidates, or `None` when context has not been built.
    pub fn candidates(&self) -> Option<&[ExperienceId]> {
        self.candidates.as_deref()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Exclude `id` from the effective context. Returns `false` if it was
    /// already dropped.
    pub fn drop_id(&mut self, id: &ExperienceId) -> bool {
        self.dropped.insert(id.clone())
    }

    pub fn is_dropped(&self, id: &ExperienceId) -> bool {
        self.dropped.contains(id)
    }

    /// Show one more candidate. Returns `false` when the window already
    /// covers every candidate.
    pub fn expand_window(&mut self) -> bool {
        if !self.can_expand() {
            return false;
        }
        self.window += 1;
        true
    }

    pub fn can_expand(&self) -> bool {
        self.candidates
            .as_ref()
            .is_some_and(|c| self.window < c.len())
    }

    /// Whether a response may be built. True for an empty candidate list.
    pub fn can_build_context(&self) -> bool {
        self.candidates.is_some()
    }

    /// Candidates minus dropped ids, limited to the window.
    ///
    /// `Some(vec![])` means no related experiences; `None` means the context
    /// has not been built.
    pub fn effective(&self) -> Option<Vec<ExperienceId>> {
        self.candidates.as_ref().map(|candidates| {
            candidates
                .iter()
                .filter(|id| !self.dropped.contains(*id))
                .take(self.window)
                .cloned()
                .collect()
        })
    }
}

impl Default for ContextCurator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<ExperienceId> {
        (0..n)
            .map(|i| ExperienceId::for_content(&format!("q{i}"), "r"))
            .collect()
    }

    #[test]
    fn not_built_is_distinct_from_empty() {
        let mut curator = ContextCurator::default();
        assert_eq!(curator.effective(), None);
        assert!(!curator.can_build_context());

        curator.reset(vec![]);
        assert_eq!(curator.effective(), Some(vec![]));
        assert!(curator.can_build_context());
        assert!(!curator.can_expand());
    }

    #[test]
    fn window_limits_effective_context() {
        let candidates = ids(5);
        let mut curator = ContextCurator::default();
        curator.reset(candidates.clone());
        assert_eq!(curator.effective().unwrap(), candidates[..3].to_vec());
    }

    #[test]
    fn short_candidate_list_is_shown_whole() {
        let candidates = ids(1);
        let mut curator = ContextCurator::default();
        curator.reset(candidates.clone());
        assert_eq!(curator.effective().unwrap(), candidates);
        assert!(!curator.can_expand());
    }

    #[test]
    fn drop_keeps_window_and_order() {
        let c = ids(5);
        let mut curator = ContextCurator::default();
        curator.reset(c.clone());

        assert!(curator.drop_id(&c[1]));
        assert!(!curator.drop_id(&c[1]));
        assert_eq!(curator.window(), 3);
        assert_eq!(curator.effective().unwrap(), vec![c[0].clone(), c[2].clone(), c[3].clone()]);
    }

    #[test]
    fn dropped_set_matches_by_value() {
        let c = ids(3);
        let mut curator = ContextCurator::default();
        curator.reset(c.clone());

        // A separately constructed id naming the same content
        let same = ExperienceId::parse(&c[0].as_str().to_ascii_uppercase()).unwrap();
        curator.drop_id(&same);
        assert!(curator.is_dropped(&c[0]));
        assert_eq!(curator.effective().unwrap(), vec![c[1].clone(), c[2].clone()]);
    }

    #[test]
    fn effective_length_with_drops_inside_window() {
        let c = ids(6);
        let mut curator = ContextCurator::default();
        curator.reset(c.clone());
        curator.drop_id(&c[0]);
        curator.drop_id(&c[2]);

        let n = curator.window();
        let dropped_in_window = c[..n].iter().filter(|id| curator.is_dropped(id)).count();
        let expected = n.min(c.len() - dropped_in_window);
        assert_eq!(curator.effective().unwrap().len(), expected);
    }

    #[test]
    fn expand_is_capped_at_candidate_length() {
        let c = ids(4);
        let mut curator = ContextCurator::default();
        curator.reset(c.clone());

        assert!(curator.can_expand());
        assert!(curator.expand_window());
        assert_eq!(curator.window(), 4);
        assert_eq!(curator.effective().unwrap(), c);

        assert!(!curator.can_expand());
        assert!(!curator.expand_window());
        assert_eq!(curator.window(), 4);
    }

    #[test]
    fn reset_clears_prune_state() {
        let c = ids(5);
        let mut curator = ContextCurator::default();
        curator.reset(c.clone());
        curator.drop_id(&c[0]);
        curator.expand_window();

        curator.reset(c.clone());
        assert_eq!(curator.window(), DEFAULT_WINDOW);
        assert!(!curator.is_dropped(&c[0]));

        curator.clear();
        assert_eq!(curator.candidates(), None);
    }

    #[test]
    fn configured_window() {
        let c = ids(5);
        let mut curator = ContextCurator::new(1);
        curator.reset(c.clone());
        assert_eq!(curator.effective().unwrap(), vec![c[0].clone()]);
    }
}
