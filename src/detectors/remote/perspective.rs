// Google Perspective API classifier for the toxicity detector.
//
// Perspective scores several attributes per request. The toxicity verdict
// uses the larger of TOXICITY and SEVERE_TOXICITY; the free tier is limited
// to ~1 QPS, so calls go through a shared rate limiter.
//
// API docs: https://developers.perspectiveapi.com/s/about-the-api-methods

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::RemoteClassifier;
use crate::output::truncate_chars;

/// Default Perspective endpoint.
pub const DEFAULT_API_URL: &str = "https://commentanalyzer.googleapis.com/v1alpha1";

pub struct PerspectiveClassifier {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limiter: RateLimiter,
}

impl PerspectiveClassifier {
    pub fn new(client: Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            // Perspective free tier: 1 query per second
            rate_limiter: RateLimiter::new(1.0),
        }
    }
}

#[async_trait]
impl RemoteClassifier for PerspectiveClassifier {
    async fn classify(&self, text: &str) -> Result<f64> {
        self.rate_limiter.acquire().await;

        let url = format!("{}/comments:analyze", self.base_url);

        let request = PerspectiveRequest {
            comment: Comment {
                text: text.to_string(),
            },
            requested_attributes: RequestedAttributes {
                toxicity: AttributeConfig {},
                severe_toxicity: AttributeConfig {},
                insult: AttributeConfig {},
                profanity: AttributeConfig {},
                threat: AttributeConfig {},
            },
            languages: vec!["en".to_string()],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to call Perspective API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Perspective API returned {}: {}", status, body);
        }

        let result: PerspectiveResponse = response
            .json()
            .await
            .context("Failed to parse Perspective API response")?;

        let score = toxicity_probability(&result);

        debug!(
            toxicity = ?extract_score(&result, "TOXICITY"),
            severe_toxicity = ?extract_score(&result, "SEVERE_TOXICITY"),
            text_preview = %truncate_chars(text, 50),
            "Scored text"
        );

        Ok(score)
    }
}

/// max(TOXICITY, SEVERE_TOXICITY); absent attributes count as 0.
pub fn toxicity_probability(response: &PerspectiveResponse) -> f64 {
    let toxicity = extract_score(response, "TOXICITY").unwrap_or(0.0);
    let severe = extract_score(response, "SEVERE_TOXICITY").unwrap_or(0.0);
    toxicity.max(severe)
}

/// Extract a specific attribute's summary score from the API response.
fn extract_score(response: &PerspectiveResponse, attribute: &str) -> Option<f64> {
    response
        .attribute_scores
        .get(attribute)
        .map(|score| score.summary_score.value)
}

// --- Perspective API request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PerspectiveRequest {
    comment: Comment,
    requested_attributes: RequestedAttributes,
    languages: Vec<String>,
}

#[derive(Serialize)]
struct Comment {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RequestedAttributes {
    toxicity: AttributeConfig,
    severe_toxicity: AttributeConfig,
    insult: AttributeConfig,
    profanity: AttributeConfig,
    threat: AttributeConfig,
}

#[derive(Serialize)]
struct AttributeConfig {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveResponse {
    #[serde(default)]
    attribute_scores: HashMap<String, AttributeScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Debug, Deserialize)]
struct SummaryScore {
    value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_max_of_toxicity_and_severe() {
        let json = r#"{"attributeScores": {
            "TOXICITY": {"summaryScore": {"value": 0.42}},
            "SEVERE_TOXICITY": {"summaryScore": {"value": 0.81}},
            "INSULT": {"summaryScore": {"value": 0.99}}
        }}"#;
        let resp: PerspectiveResponse = serde_json::from_str(json).unwrap();
        assert!((toxicity_probability(&resp) - 0.81).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_attributes_score_zero() {
        let resp: PerspectiveResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(toxicity_probability(&resp), 0.0);
    }

    #[test]
    fn request_uses_screaming_attribute_names() {
        let request = PerspectiveRequest {
            comment: Comment {
                text: "hi".to_string(),
            },
            requested_attributes: RequestedAttributes {
                toxicity: AttributeConfig {},
                severe_toxicity: AttributeConfig {},
                insult: AttributeConfig {},
                profanity: AttributeConfig {},
                threat: AttributeConfig {},
            },
            languages: vec!["en".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["requestedAttributes"]["SEVERE_TOXICITY"].is_object());
        assert_eq!(json["comment"]["text"], "hi");
    }
}
