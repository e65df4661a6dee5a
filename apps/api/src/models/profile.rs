use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_SKILLS: usize = 20;
const MAX_PREFERENCES: usize = 10;
const MAX_HOURS_PER_WEEK: u32 = 168;
const MAX_INTERESTS_CHARS: usize = 500;
const MAX_BACKGROUND_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Experienced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "<$100")]
    Under100,
    #[serde(rename = "<$1000")]
    Under1000,
    #[serde(rename = ">$1000")]
    Over1000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeGoal {
    SideIncome,
    ReplaceJob,
    ScaleBig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "asap")]
    Asap,
    #[serde(rename = "3_months")]
    ThreeMonths,
    #[serde(rename = "6_months")]
    SixMonths,
    #[serde(rename = "12_months")]
    TwelveMonths,
    #[serde(rename = "1_year")]
    OneYear,
}

/// Skills, preferences and constraints submitted with a generation request.
///
/// Every field has a default so partially filled forms deserialize; call
/// [`UserProfile::validated`] before handing a profile to the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    // Skills
    pub technical_skills: Vec<String>,
    pub non_technical_skills: Vec<String>,
    pub experience_level: ExperienceLevel,

    // Preferences
    pub preferred_niches: Vec<String>,
    pub preferred_types: Vec<String>,

    // Constraints
    pub hours_per_week: Option<u32>,
    pub budget: Option<Budget>,

    // Goals
    pub income_goal: Option<IncomeGoal>,
    pub timeline: Option<Timeline>,

    // Context
    pub interests: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} accepts at most {max} items, got {actual}")]
    TooManyItems {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("hours_per_week must be between 1 and 168, got {0}")]
    HoursOutOfRange(u32),

    #[error("{field} must be at most {max} characters")]
    TextTooLong { field: &'static str, max: usize },
}

impl UserProfile {
    /// Normalizes list fields and checks the profile's bounds.
    ///
    /// List items are trimmed, blanks dropped and case-insensitive duplicates
    /// collapsed (first spelling wins). Blank free-text fields become `None`.
    /// List lengths are checked on the submitted lists, before normalizing.
    pub fn validated(self) -> Result<Self, ProfileError> {
        check_len("technical_skills", &self.technical_skills, MAX_SKILLS)?;
        check_len(
            "non_technical_skills",
            &self.non_technical_skills,
            MAX_SKILLS,
        )?;
        check_len("preferred_niches", &self.preferred_niches, MAX_PREFERENCES)?;
        check_len("preferred_types", &self.preferred_types, MAX_PREFERENCES)?;

        let profile = UserProfile {
            technical_skills: normalize_list(self.technical_skills),
            non_technical_skills: normalize_list(self.non_technical_skills),
            experience_level: self.experience_level,
            preferred_niches: normalize_list(self.preferred_niches),
            preferred_types: normalize_list(self.preferred_types),
            hours_per_week: self.hours_per_week,
            budget: self.budget,
            income_goal: self.income_goal,
            timeline: self.timeline,
            interests: normalize_text(self.interests),
            background: normalize_text(self.background),
        };

        if let Some(hours) = profile.hours_per_week {
            if hours == 0 || hours > MAX_HOURS_PER_WEEK {
                return Err(ProfileError::HoursOutOfRange(hours));
            }
        }

        check_text("interests", profile.interests.as_deref(), MAX_INTERESTS_CHARS)?;
        check_text(
            "background",
            profile.background.as_deref(),
            MAX_BACKGROUND_CHARS,
        )?;

        Ok(profile)
    }

    /// Technical and non-technical skills, lower-cased, in submission order.
    pub fn combined_skills(&self) -> Vec<String> {
        self.technical_skills
            .iter()
            .chain(self.non_technical_skills.iter())
            .map(|s| s.to_lowercase())
            .collect()
    }
}

fn normalize_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn check_len(field: &'static str, items: &[String], max: usize) -> Result<(), ProfileError> {
    if items.len() > max {
        return Err(ProfileError::TooManyItems {
            field,
            max,
            actual: items.len(),
        });
    }
    Ok(())
}

fn check_text(field: &'static str, text: Option<&str>, max: usize) -> Result<(), ProfileError> {
    match text {
        Some(t) if t.chars().count() > max => Err(ProfileError::TextTooLong { field, max }),
        _ => Ok(()),
    }
}
