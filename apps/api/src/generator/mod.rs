//! Idea Generator: the single boundary to the remote idea-generation service.
//!
//! The service is opaque: it receives `{profile, num_ideas}` and returns
//! `{ideas, profile_summary}`. Calls are made once; a failed call is surfaced
//! to the user, who resubmits manually.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::idea::{GenerationRequest, GenerationResponse};
use crate::models::profile::UserProfile;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid generator response: {0}")]
    InvalidResponse(String),
}

/// Produces ideas for a profile. Carried in `AppState` as `Arc<dyn IdeaGenerator>`.
#[async_trait]
pub trait IdeaGenerator: Send + Sync {
    async fn generate(
        &self,
        profile: &UserProfile,
        count: u32,
    ) -> Result<GenerationResponse, GeneratorError>;
}

/// FastAPI-style error body: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Clone)]
pub struct HttpIdeaGenerator {
    client: Client,
    endpoint: String,
}

impl HttpIdeaGenerator {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, GeneratorError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IdeaGenerator for HttpIdeaGenerator {
    async fn generate(
        &self,
        profile: &UserProfile,
        count: u32,
    ) -> Result<GenerationResponse, GeneratorError> {
        let request_body = GenerationRequest {
            profile: profile.clone(),
            num_ideas: count,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generator returned {}: {}", status, body);
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let generated: GenerationResponse = serde_json::from_str(&body)
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;

        check_response(&generated)?;

        debug!(
            "Generator returned {} ideas (requested {})",
            generated.ideas.len(),
            count
        );
        Ok(generated)
    }
}

/// Rejects responses with no ideas or an untitled idea.
fn check_response(response: &GenerationResponse) -> Result<(), GeneratorError> {
    if response.ideas.is_empty() {
        return Err(GeneratorError::InvalidResponse(
            "response contained no ideas".to_string(),
        ));
    }
    if let Some(pos) = response.ideas.iter().position(|i| i.title.trim().is_empty()) {
        return Err(GeneratorError::InvalidResponse(format!(
            "idea #{} has an empty title",
            pos + 1
        )));
    }
    Ok(())
}
