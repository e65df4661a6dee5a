use thiserror::Error;
use tracing::{info, warn};

use crate::ideas::store::FeedbackStore;
use crate::models::idea::IdeaWithFeedback;
use crate::models::profile::UserProfile;

/// Identifies the generation run a request was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("A newer generation started while this request was in flight")]
pub struct Superseded;

/// Everything the user currently sees: the idea cards, the profile they were
/// generated from and the generator's summary of that profile.
///
/// Each full generation bumps the epoch. A response is applied only if no
/// newer generation began after its request was sent, so a slow stale
/// response can never overwrite fresher results.
#[derive(Debug, Default)]
pub struct IdeaSession {
    store: FeedbackStore,
    profile: Option<UserProfile>,
    profile_summary: Option<String>,
    epoch: u64,
}

impl IdeaSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a session from persisted state.
    ///
    /// A saved profile that no longer passes validation is dropped, so it can
    /// never reach the generator through a regeneration.
    pub fn restore(ideas: Option<Vec<IdeaWithFeedback>>, profile: Option<UserProfile>) -> Self {
        let mut session = Self::new();
        if let Some(ideas) = ideas {
            session.store.replace_all(ideas);
        }
        session.profile = profile.and_then(|p| match p.validated() {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Discarding saved profile that fails validation: {e}");
                None
            }
        });
        if session.store.is_empty() {
            info!("No saved ideas to restore");
        } else {
            info!(
                "Session restored with {} ideas (profile: {})",
                session.store.len(),
                session.profile.is_some()
            );
        }
        session
    }

    pub fn store(&self) -> &FeedbackStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FeedbackStore {
        &mut self.store
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn profile_summary(&self) -> Option<&str> {
        self.profile_summary.as_deref()
    }

    /// Starts a full generation run. Any ticket handed out earlier is now stale.
    pub fn begin_generation(&mut self) -> Ticket {
        self.epoch += 1;
        Ticket(self.epoch)
    }

    /// Ticket for a single-idea regeneration within the current run.
    pub fn regeneration_ticket(&self) -> Ticket {
        Ticket(self.epoch)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.epoch
    }

    /// Installs the results of a full generation run.
    pub fn apply_generation(
        &mut self,
        ticket: Ticket,
        ideas: Vec<IdeaWithFeedback>,
        profile_summary: String,
        profile: UserProfile,
    ) -> Result<(), Superseded> {
        if !self.is_current(ticket) {
            return Err(Superseded);
        }
        self.store.replace_all(ideas);
        self.profile_summary = Some(profile_summary).filter(|s| !s.trim().is_empty());
        self.profile = Some(profile);
        Ok(())
    }

    /// Swaps one idea for its regenerated replacement.
    /// Returns `Ok(false)` when `id` is no longer in the store.
    pub fn apply_regeneration(
        &mut self,
        ticket: Ticket,
        id: &str,
        replacement: IdeaWithFeedback,
    ) -> Result<bool, Superseded> {
        if !self.is_current(ticket) {
            return Err(Superseded);
        }
        Ok(self.store.replace_one(id, replacement))
    }
}
