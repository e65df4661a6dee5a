use chrono::Utc;
use uuid::Uuid;

use crate::ideas::skill_match::compute_skill_match;
use crate::models::idea::{GeneratedIdea, IdeaWithFeedback};
use crate::models::profile::UserProfile;

const RANDOM_SUFFIX_LEN: usize = 10;

/// Source of client-side idea ids. Swapped for a deterministic source in tests.
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Base-36 millisecond timestamp followed by a random suffix.
pub struct TimestampIdSource;

impl IdSource for TimestampIdSource {
    fn next_id(&self) -> String {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let random = Uuid::new_v4().simple().to_string();
        format!("{}{}", to_base36(millis), &random[..RANDOM_SUFFIX_LEN])
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Wraps a generated idea with a fresh id and its skill match against `profile`.
/// Feedback starts out empty.
pub fn enhance_idea(
    idea: &GeneratedIdea,
    profile: &UserProfile,
    ids: &dyn IdSource,
) -> IdeaWithFeedback {
    let skill_match = compute_skill_match(&idea.tech_recommendations, &profile.combined_skills());

    IdeaWithFeedback {
        id: ids.next_id(),
        idea: idea.clone(),
        feedback: None,
        skill_match: Some(skill_match),
    }
}
