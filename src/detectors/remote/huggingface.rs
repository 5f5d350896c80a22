// Hugging Face Inference API classifier.
//
// Text-classification models on the hosted inference API all share one
// request shape (`{"inputs": text}`) and one response shape: a list of
// {label, score} pairs, usually nested one level deep. Each detector picks
// a model and the label that means "positive" for its category.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RemoteClassifier;
use crate::detectors::traits::DetectorKind;
use crate::output::truncate_chars;

/// Default base URL for hosted models.
pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models";

/// Model and positive label for a category.
pub fn model_for(kind: DetectorKind) -> (&'static str, &'static str) {
    match kind {
        DetectorKind::Spam => ("mrm8488/bert-tiny-finetuned-sms-spam-detection", "LABEL_1"),
        DetectorKind::Scam => ("ealvaradob/bert-finetuned-phishing", "LABEL_1"),
        DetectorKind::Deepfake => ("openai-community/roberta-base-openai-detector", "Fake"),
        // Toxicity goes through Perspective; this pairing is only used if a
        // caller asks for it explicitly.
        DetectorKind::Toxicity => ("unitary/toxic-bert", "toxic"),
    }
}

pub struct HuggingFaceClassifier {
    client: Client,
    url: String,
    api_key: String,
    label: String,
}

impl HuggingFaceClassifier {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: String, label: &str) -> Self {
        Self {
            client,
            url: format!("{}/{}", base_url.trim_end_matches('/'), model),
            api_key,
            label: label.to_string(),
        }
    }

    /// Classifier wired to the default model for `kind`.
    pub fn for_kind(client: Client, base_url: &str, api_key: String, kind: DetectorKind) -> Self {
        let (model, label) = model_for(kind);
        Self::new(client, base_url, model, api_key, label)
    }
}

#[async_trait]
impl RemoteClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<f64> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .context("Failed to call Hugging Face inference API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Hugging Face inference API returned {}: {}", status, body);
        }

        let result: InferenceResponse = response
            .json()
            .await
            .context("Failed to parse Hugging Face inference response")?;

        let score = label_score(&result, &self.label);

        debug!(
            url = %self.url,
            label = %self.label,
            score = score,
            text_preview = %truncate_chars(text, 50),
            "Classified text"
        );

        Ok(score)
    }
}

/// Score for `label` in the first result set. A missing label scores 0.
pub fn label_score(response: &InferenceResponse, label: &str) -> f64 {
    let scores = match response {
        InferenceResponse::Nested(sets) => sets.first().map(Vec::as_slice).unwrap_or(&[]),
        InferenceResponse::Flat(scores) => scores.as_slice(),
    };
    scores
        .iter()
        .find(|s| s.label == label)
        .map(|s| s.score)
        .unwrap_or(0.0)
}

// --- Inference API request/response types ---

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}
