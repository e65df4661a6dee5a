use std::collections::HashSet;

use tracing::warn;

use crate::models::idea::{Feedback, FeedbackReason, IdeaWithFeedback, Rating};

/// Ordered idea cards for the active session.
///
/// Order is generation order (card #1, #2, …). Ids are unique at all times.
/// Mutations on an unknown id are no-ops that return `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackStore {
    ideas: Vec<IdeaWithFeedback>,
}

impl FeedbackStore {
    pub fn ideas(&self) -> &[IdeaWithFeedback] {
        &self.ideas
    }

    pub fn get(&self, id: &str) -> Option<&IdeaWithFeedback> {
        self.ideas.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    /// Discards every record and installs `ideas` in order.
    /// A record whose id is already present is dropped.
    pub fn replace_all(&mut self, ideas: Vec<IdeaWithFeedback>) {
        let mut seen = HashSet::new();
        self.ideas = ideas
            .into_iter()
            .filter(|idea| {
                let fresh = seen.insert(idea.id.clone());
                if !fresh {
                    warn!("Dropping idea with duplicate id {}", idea.id);
                }
                fresh
            })
            .collect();
    }

    /// Sets the rating on `id`. Only `Rating::Down` keeps a reason.
    pub fn set_feedback(
        &mut self,
        id: &str,
        rating: Option<Rating>,
        reason: Option<FeedbackReason>,
    ) -> bool {
        let Some(idea) = self.ideas.iter_mut().find(|i| i.id == id) else {
            warn!("Feedback for unknown idea {id} ignored");
            return false;
        };

        let reason = match rating {
            Some(Rating::Down) => reason,
            _ => None,
        };
        idea.feedback = Some(Feedback { rating, reason });
        true
    }

    /// Swaps the record `id` for `replacement`, keeping its position.
    pub fn replace_one(&mut self, id: &str, replacement: IdeaWithFeedback) -> bool {
        if replacement.id != id && self.get(&replacement.id).is_some() {
            warn!(
                "Replacement id {} already present; keeping idea {id}",
                replacement.id
            );
            return false;
        }

        match self.ideas.iter_mut().find(|i| i.id == id) {
            Some(slot) => {
                *slot = replacement;
                true
            }
            None => {
                warn!("Regenerated idea for unknown id {id} discarded");
                false
            }
        }
    }
}
