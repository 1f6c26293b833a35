//! Embedding generation providers.
//!
//! The store itself never calls out to the network; callers embed text first
//! and hand the finished vectors to [`crate::VectorStore`]. A provider failure
//! is therefore always the caller's to retry or abort.

use crate::error::RetrievalError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Dimensionality of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Generate embeddings for a batch of texts, one vector per input.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("no embedding returned".to_string()))
    }
}

/// OpenAI embeddings provider.
pub struct OpenAIEmbeddings {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIEmbeddings {
    /// Create a provider with the default model (`text-embedding-3-small`).
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com".to_string(),
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (proxies, compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddings {
    fn dimension(&self) -> usize {
        match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        #[derive(Serialize)]
        struct Request {
            model: String,
            input: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let request = Request {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!("API error: {}", text)));
        }

        let response: Response = response.json().await?;
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.0 rather than failing, so a
/// degenerate stored record ranks last instead of poisoning the whole query.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
