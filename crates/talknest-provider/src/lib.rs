pub mod gemini;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::{GeminiProvider, GEMINI_API_BASE};

/// One blocking request to the completion endpoint. No streaming; the
/// caller receives the complete result or an error atomically.
#[async_trait]
pub trait CompletionProvider: std::fmt::Debug + Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

/// One conversation turn as the endpoint sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: String,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(default)]
    pub system: Option<String>,
    pub turns: Vec<Turn>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Strict output schema. When set, the endpoint is asked for a
    /// schema-validated JSON response instead of free text.
    #[serde(default)]
    pub response_schema: Option<serde_json::Value>,
}

impl CompletionRequest {
    pub fn simple(model: String, system: Option<String>, user_text: String) -> Self {
        Self {
            model,
            system,
            turns: vec![Turn::user(user_text)],
            temperature: None,
            response_schema: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub finish_reason: Option<String>,
}

// ============================================================
// Provider Configuration
// ============================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    /// Deterministic offline provider for tests and dry runs.
    Stub,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Custom base URL (defaults per provider kind).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Create a provider from settings.
pub fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn CompletionProvider>> {
    let provider: Arc<dyn CompletionProvider> = match settings.kind {
        ProviderKind::Gemini => {
            let key = settings
                .api_key
                .as_ref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| anyhow!("gemini requires api_key"))?;
            let base_url = settings.base_url.as_deref().unwrap_or(GEMINI_API_BASE);
            Arc::new(GeminiProvider::new(key.clone(), base_url))
        }
        ProviderKind::Stub => Arc::new(StubProvider),
    };
    Ok(provider)
}

// ============================================================
// Stub Provider
// ============================================================

/// Fixed mid-scale assessment returned for schema requests, so the whole
/// report path works offline.
pub const STUB_REPORT_JSON: &str = r#"{
  "empathy": {"level": "一般", "reason": "离线演练模式，未进行真实分析。"},
  "listening": {"level": "一般", "reason": "离线演练模式，未进行真实分析。"},
  "emotion": {"level": "一般", "reason": "离线演练模式，未进行真实分析。"},
  "boundary": {"level": "一般", "reason": "离线演练模式，未进行真实分析。"},
  "needs": {"level": "一般", "reason": "离线演练模式，未进行真实分析。"}
}"#;

#[derive(Debug)]
pub struct StubProvider;

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let text = if request.response_schema.is_some() {
            STUB_REPORT_JSON.to_string()
        } else {
            let user_text = request
                .turns
                .last()
                .map(|turn| turn.text.clone())
                .unwrap_or_default();
            format!("[stub:{}] {}", request.model, user_text)
        };

        Ok(CompletionResponse {
            text,
            input_tokens: None,
            output_tokens: None,
            finish_reason: Some("end_turn".to_string()),
        })
    }
}
