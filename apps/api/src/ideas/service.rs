//! Idea session actions: generate, regenerate, rate and copy.
//!
//! Flow for a generation run: validate profile → bump session epoch →
//! generator call (session unlocked) → enhance each idea → install in the
//! store if still current → persist.
//!
//! Persistence is best-effort: snapshots are written while the session lock
//! is held so they land in mutation order, and failures are only logged.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{MAX_IDEAS, MIN_IDEAS};
use crate::errors::AppError;
use crate::ideas::enhancer::enhance_idea;
use crate::ideas::export::{copy_text, format_idea_for_copy};
use crate::ideas::session::IdeaSession;
use crate::models::idea::{FeedbackReason, IdeaWithFeedback, Rating};
use crate::models::profile::UserProfile;
use crate::state::AppState;

/// What the idea list screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct IdeasView {
    pub ideas: Vec<IdeaWithFeedback>,
    pub profile_summary: Option<String>,
}

impl IdeasView {
    fn of(session: &IdeaSession) -> Self {
        Self {
            ideas: session.store().ideas().to_vec(),
            profile_summary: session.profile_summary().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyResult {
    pub text: String,
    pub copied: bool,
}

pub async fn current_view(state: &AppState) -> IdeasView {
    IdeasView::of(&*state.session.lock().await)
}

pub async fn current_profile(state: &AppState) -> Option<UserProfile> {
    state.session.lock().await.profile().cloned()
}

/// Runs a full generation and replaces the idea list with its results.
///
/// On failure the previous ideas stay in place.
pub async fn generate_ideas(
    state: &AppState,
    profile: UserProfile,
    num_ideas: Option<u32>,
) -> Result<IdeasView, AppError> {
    let num_ideas = num_ideas.unwrap_or(state.config.num_ideas);
    if !(MIN_IDEAS..=MAX_IDEAS).contains(&num_ideas) {
        return Err(AppError::Validation(format!(
            "num_ideas must be between {MIN_IDEAS} and {MAX_IDEAS}, got {num_ideas}"
        )));
    }
    let profile = profile.validated()?;

    let ticket = state.session.lock().await.begin_generation();
    info!(
        "Generating {num_ideas} ideas ({} technical skills, level {:?})",
        profile.technical_skills.len(),
        profile.experience_level
    );

    let response = state.generator.generate(&profile, num_ideas).await?;

    let ideas: Vec<IdeaWithFeedback> = response
        .ideas
        .iter()
        .map(|idea| enhance_idea(idea, &profile, state.ids.as_ref()))
        .collect();

    let mut session = state.session.lock().await;
    session.apply_generation(ticket, ideas, response.profile_summary, profile)?;

    state.persistence.save_ideas(session.store().ideas()).await;
    if let Some(profile) = session.profile() {
        state.persistence.save_profile(profile).await;
    }

    info!("Installed {} generated ideas", session.store().len());
    Ok(IdeasView::of(&session))
}

/// Requests one replacement for idea `id` using the last submitted profile and
/// swaps it in at the same position.
pub async fn regenerate_idea(state: &AppState, id: &str) -> Result<IdeaWithFeedback, AppError> {
    let (profile, ticket) = {
        let session = state.session.lock().await;
        if session.store().get(id).is_none() {
            return Err(AppError::NotFound(format!("Idea {id} not found")));
        }
        let profile = session.profile().cloned().ok_or_else(|| {
            AppError::Validation("No profile on record; generate ideas first".to_string())
        })?;
        (profile, session.regeneration_ticket())
    };

    info!("Regenerating idea {id}");
    let response = state.generator.generate(&profile, 1).await?;
    if response.ideas.len() > 1 {
        warn!(
            "Generator returned {} ideas for a single regeneration; using the first",
            response.ideas.len()
        );
    }
    let Some(generated) = response.ideas.first() else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Generator returned no ideas for regeneration"
        )));
    };
    let replacement = enhance_idea(generated, &profile, state.ids.as_ref());

    let mut session = state.session.lock().await;
    if !session.apply_regeneration(ticket, id, replacement.clone())? {
        return Err(AppError::NotFound(format!(
            "Idea {id} was removed before regeneration finished"
        )));
    }
    state.persistence.save_ideas(session.store().ideas()).await;

    Ok(replacement)
}

/// Records a rating on idea `id`. Unknown ids are ignored and reported as `false`.
pub async fn set_feedback(
    state: &AppState,
    id: &str,
    rating: Option<Rating>,
    reason: Option<FeedbackReason>,
) -> bool {
    let mut session = state.session.lock().await;
    let updated = session.store_mut().set_feedback(id, rating, reason);
    if updated {
        state.persistence.save_ideas(session.store().ideas()).await;
    }
    updated
}

/// Formats idea `id` for pasting and hands it to the clipboard, if one is configured.
pub async fn copy_idea(state: &AppState, id: &str) -> Result<CopyResult, AppError> {
    let text = {
        let session = state.session.lock().await;
        let idea = session
            .store()
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Idea {id} not found")))?;
        format_idea_for_copy(idea)
    };

    let copied = copy_text(state.clipboard.as_deref(), &text).await;
    Ok(CopyResult { text, copied })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    use crate::config::tests::test_config;
    use crate::generator::{GeneratorError, IdeaGenerator};
    use crate::ideas::enhancer::tests::{sample_idea, SequentialIds};
    use crate::ideas::export::tests::RecordingClipboard;
    use crate::models::idea::GenerationResponse;
    use crate::persistence::kv::{KeyValueStore, MemoryKvStore};
    use crate::persistence::{PersistenceAdapter, StorageKeys};

    /// Generator double: returns ideas titled `gen-<call>-<n>` or fails.
    #[derive(Default)]
    pub(crate) struct ScriptedGenerator {
        pub fail: bool,
        pub calls: AtomicUsize,
        pub requested: StdMutex<Vec<u32>>,
    }

    #[async_trait]
    impl IdeaGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _profile: &UserProfile,
            count: u32,
        ) -> Result<GenerationResponse, GeneratorError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.requested.lock().unwrap().push(count);
            if self.fail {
                return Err(GeneratorError::Api {
                    status: 502,
                    message: "AI service error. Try again later.".to_string(),
                });
            }
            Ok(GenerationResponse {
                ideas: (1..=count)
                    .map(|n| sample_idea(&format!("gen-{call}-{n}"), &["Python", "Django", "PostgreSQL"]))
                    .collect(),
                profile_summary: format!("summary {call}"),
            })
        }
    }

    pub(crate) fn state_with(
        generator: Arc<dyn IdeaGenerator>,
        store: Arc<dyn KeyValueStore>,
    ) -> AppState {
        AppState {
            session: Arc::new(Mutex::new(IdeaSession::new())),
            generator,
            persistence: PersistenceAdapter::new(store, StorageKeys::default()),
            ids: Arc::new(SequentialIds::default()),
            clipboard: None,
            config: test_config(),
        }
    }

    pub(crate) fn python_profile() -> UserProfile {
        UserProfile {
            technical_skills: vec!["python".to_string(), "react".to_string()],
            ..Default::default()
        }
    }

    fn titles(view: &IdeasView) -> Vec<&str> {
        view.ideas.iter().map(|i| i.idea.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_generate_enhances_and_persists() {
        let store = Arc::new(MemoryKvStore::new());
        let state = state_with(Arc::new(ScriptedGenerator::default()), store.clone());

        let view = generate_ideas(&state, python_profile(), None).await.unwrap();

        assert_eq!(titles(&view), vec!["gen-1-1", "gen-1-2", "gen-1-3"]);
        assert_eq!(view.profile_summary.as_deref(), Some("summary 1"));
        let skill_match = view.ideas[0].skill_match.as_ref().unwrap();
        assert_eq!(skill_match.percentage, 33);

        assert_eq!(state.persistence.load_ideas().await, Some(view.ideas.clone()));
        assert_eq!(state.persistence.load_profile().await, Some(python_profile()));
    }

    #[tokio::test]
    async fn test_generate_rejects_out_of_range_count() {
        let generator = Arc::new(ScriptedGenerator::default());
        let state = state_with(generator.clone(), Arc::new(MemoryKvStore::new()));

        for n in [0, 11] {
            let err = generate_ideas(&state, python_profile(), Some(n)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_profile_before_calling_generator() {
        let generator = Arc::new(ScriptedGenerator::default());
        let state = state_with(generator.clone(), Arc::new(MemoryKvStore::new()));
        let profile = UserProfile {
            hours_per_week: Some(500),
            ..Default::default()
        };

        let err = generate_ideas(&state, profile, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_previous_ideas() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let ok_state = state_with(Arc::new(ScriptedGenerator::default()), store.clone());
        let before = generate_ideas(&ok_state, python_profile(), Some(2)).await.unwrap();

        let failing_state = AppState {
            generator: Arc::new(ScriptedGenerator {
                fail: true,
                ..Default::default()
            }),
            ..ok_state.clone()
        };
        let err = generate_ideas(&failing_state, python_profile(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(current_view(&failing_state).await.ideas, before.ideas);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_in_place_and_requests_one() {
        let generator = Arc::new(ScriptedGenerator::default());
        let state = state_with(generator.clone(), Arc::new(MemoryKvStore::new()));
        let view = generate_ideas(&state, python_profile(), None).await.unwrap();
        let ids: Vec<String> = view.ideas.iter().map(|i| i.id.clone()).collect();

        assert!(set_feedback(&state, &ids[0], Some(Rating::Up), None).await);

        let replacement = regenerate_idea(&state, &ids[1]).await.unwrap();
        assert_eq!(replacement.idea.title, "gen-2-1");
        assert_eq!(*generator.requested.lock().unwrap(), vec![3, 1]);

        let after = current_view(&state).await;
        assert_eq!(after.ideas.len(), 3);
        assert_eq!(after.ideas[1], replacement);
        assert_eq!(after.ideas[0].id, ids[0]);
        assert_eq!(
            after.ideas[0].feedback.as_ref().and_then(|f| f.rating),
            Some(Rating::Up)
        );
        assert_eq!(after.ideas[2], view.ideas[2]);
        assert_eq!(state.persistence.load_ideas().await, Some(after.ideas));
    }

    #[tokio::test]
    async fn test_regenerate_unknown_id_is_not_found() {
        let generator = Arc::new(ScriptedGenerator::default());
        let state = state_with(generator.clone(), Arc::new(MemoryKvStore::new()));
        generate_ideas(&state, python_profile(), None).await.unwrap();

        let err = regenerate_idea(&state, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_regenerate_failure_leaves_idea_untouched() {
        let state = state_with(
            Arc::new(ScriptedGenerator::default()),
            Arc::new(MemoryKvStore::new()),
        );
        let view = generate_ideas(&state, python_profile(), None).await.unwrap();

        let failing = AppState {
            generator: Arc::new(ScriptedGenerator {
                fail: true,
                ..Default::default()
            }),
            ..state.clone()
        };
        let err = regenerate_idea(&failing, &view.ideas[0].id).await.unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(current_view(&state).await.ideas, view.ideas);
    }

    #[tokio::test]
    async fn test_regenerate_with_invalid_saved_profile_never_calls_generator() {
        let generator = Arc::new(ScriptedGenerator::default());
        let state = state_with(generator.clone(), Arc::new(MemoryKvStore::new()));
        let saved = UserProfile {
            hours_per_week: Some(0),
            ..python_profile()
        };
        let card = enhance_idea(&sample_idea("Saved", &["Python"]), &saved, state.ids.as_ref());
        let id = card.id.clone();
        *state.session.lock().await = IdeaSession::restore(Some(vec![card]), Some(saved));

        let err = regenerate_idea(&state, &id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_feedback_unknown_id_is_noop() {
        let state = state_with(
            Arc::new(ScriptedGenerator::default()),
            Arc::new(MemoryKvStore::new()),
        );
        generate_ideas(&state, python_profile(), None).await.unwrap();
        let before = current_view(&state).await.ideas;

        assert!(!set_feedback(&state, "ghost", Some(Rating::Down), None).await);
        assert_eq!(current_view(&state).await.ideas, before);
    }

    #[tokio::test]
    async fn test_feedback_is_persisted() {
        let state = state_with(
            Arc::new(ScriptedGenerator::default()),
            Arc::new(MemoryKvStore::new()),
        );
        let view = generate_ideas(&state, python_profile(), None).await.unwrap();
        let id = &view.ideas[2].id;

        set_feedback(&state, id, Some(Rating::Down), Some(FeedbackReason::TooExpensive)).await;

        let saved = state.persistence.load_ideas().await.unwrap();
        let feedback = saved[2].feedback.clone().unwrap();
        assert_eq!(feedback.rating, Some(Rating::Down));
        assert_eq!(feedback.reason, Some(FeedbackReason::TooExpensive));
    }

    #[tokio::test]
    async fn test_copy_idea_returns_text_and_flag() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let mut state = state_with(
            Arc::new(ScriptedGenerator::default()),
            Arc::new(MemoryKvStore::new()),
        );
        let view = generate_ideas(&state, python_profile(), Some(1)).await.unwrap();

        let without = copy_idea(&state, &view.ideas[0].id).await.unwrap();
        assert!(!without.copied);
        assert!(without.text.starts_with("gen-1-1\n\n"));

        state.clipboard = Some(clipboard.clone());
        let with = copy_idea(&state, &view.ideas[0].id).await.unwrap();
        assert!(with.copied);
        assert_eq!(*clipboard.copied.lock().unwrap(), vec![with.text.clone()]);

        assert!(matches!(
            copy_idea(&state, "ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    /// Generator whose first call blocks until released, to model a slow response.
    struct GatedGenerator {
        gate: Notify,
        inner: ScriptedGenerator,
    }

    #[async_trait]
    impl IdeaGenerator for GatedGenerator {
        async fn generate(
            &self,
            profile: &UserProfile,
            count: u32,
        ) -> Result<GenerationResponse, GeneratorError> {
            let first = self.inner.calls.load(Ordering::SeqCst) == 0;
            let response = self.inner.generate(profile, count).await;
            if first {
                self.gate.notified().await;
            }
            response
        }
    }

    #[tokio::test]
    async fn test_stale_generation_does_not_overwrite_newer_result() {
        let generator = Arc::new(GatedGenerator {
            gate: Notify::new(),
            inner: ScriptedGenerator::default(),
        });
        let state = state_with(generator.clone(), Arc::new(MemoryKvStore::new()));

        let slow_state = state.clone();
        let slow = tokio::spawn(async move {
            generate_ideas(&slow_state, python_profile(), Some(1)).await
        });
        while generator.inner.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let fresh = generate_ideas(&state, python_profile(), Some(1)).await.unwrap();
        assert_eq!(titles(&fresh), vec!["gen-2-1"]);

        generator.gate.notify_one();
        let stale = slow.await.unwrap();
        assert!(matches!(stale, Err(AppError::Superseded(_))));

        let view = current_view(&state).await;
        assert_eq!(titles(&view), vec!["gen-2-1"]);
        assert_eq!(view.profile_summary.as_deref(), Some("summary 2"));
    }
}
