//! Skill Match: heuristic overlap between a user's skills and an idea's tech stack.
//!
//! A recommended technology counts as matched when any user skill contains it,
//! or it contains the skill, after lower-casing both sides. This accepts
//! abbreviations in either direction ("js" / "javascript") and also lets
//! through false positives such as "r" inside "react".

use crate::models::idea::SkillMatch;

/// Computes match statistics for `tech_recommendations` against `user_skills`.
///
/// Both sides are only lower-cased, never trimmed: an empty skill is a
/// substring of every token. `matched_skills` holds the lower-cased tokens in
/// recommendation order; duplicates count individually.
pub fn compute_skill_match(tech_recommendations: &[String], user_skills: &[String]) -> SkillMatch {
    let skills: Vec<String> = user_skills.iter().map(|s| s.to_lowercase()).collect();

    let matched_skills: Vec<String> = tech_recommendations
        .iter()
        .map(|tech| tech.to_lowercase())
        .filter(|tech| is_match(tech, &skills))
        .collect();

    let matched_count = matched_skills.len();
    let total_count = tech_recommendations.len();

    SkillMatch {
        matched_count,
        total_count,
        percentage: percentage(matched_count, total_count),
        matched_skills,
    }
}

/// Symmetric substring test against already lower-cased skills.
fn is_match(tech_lower: &str, skills_lower: &[String]) -> bool {
    skills_lower
        .iter()
        .any(|skill| tech_lower.contains(skill.as_str()) || skill.contains(tech_lower))
}

fn percentage(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((matched as f64 / total as f64) * 100.0).round() as u8
}
