use serde::{Deserialize, Serialize};

use crate::models::profile::UserProfile;

/// A project idea as returned by the remote generator. Never mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIdea {
    pub title: String,
    pub description: String,
    pub why_good_fit: String,
    pub first_steps: Vec<String>,
    pub tech_recommendations: Vec<String>,
    #[serde(default)]
    pub source_idea_ids: Vec<String>,
}

/// Overlap between a user's skills and an idea's recommended technologies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    pub matched_count: usize,
    pub total_count: usize,
    pub percentage: u8, // 0 – 100
    pub matched_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackReason {
    WrongTechStack,
    TooExpensive,
    TooDifficult,
    NotInteresting,
    Other,
}

/// User feedback on one idea card. `reason` is only ever set alongside `Rating::Down`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FeedbackReason>,
}

/// A generated idea with its client-side identity, skill match and feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaWithFeedback {
    pub id: String,
    #[serde(flatten)]
    pub idea: GeneratedIdea,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(
        rename = "skillMatch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub skill_match: Option<SkillMatch>,
}

/// Body sent to the remote generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub profile: UserProfile,
    pub num_ideas: u32,
}

/// Body returned by the remote generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub ideas: Vec<GeneratedIdea>,
    #[serde(default)]
    pub profile_summary: String,
}
