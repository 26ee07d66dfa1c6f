//! The three completion operations behind the practice flows: in-session
//! child replies, the end-of-session assessment, and custom-scenario
//! drafting.

use std::sync::Arc;

use anyhow::{bail, Result};
use talknest_provider::{CompletionProvider, CompletionRequest, Turn};
use talknest_schema::{Message, ReportData, Scenario};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::prompts;

pub const CUSTOM_SCENARIO_CATEGORY: &str = "自定义";
pub const CUSTOM_SCENARIO_ICON: &str = "edit_note";
pub const CUSTOM_SCENARIO_IMAGE: &str =
    "https://images.unsplash.com/photo-1494887205043-c5f291293cf6?q=80&w=800&auto=format&fit=crop";

/// Child-state choices offered by the scenario builder. The last entry is
/// the free-text escape hatch.
pub const CUSTOM_CHILD_STATES: &[&str] = &["沉默", "叛逆", "焦虑", "悲伤", "愤怒", "自定义"];

/// Hard cap on the builder's scenario-description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// What the user typed into the scenario builder.
#[derive(Debug, Clone)]
pub struct CustomScenarioInput {
    pub description: String,
    pub child_state: String,
    pub goal: String,
}

impl CustomScenarioInput {
    /// The three fields folded into the single description the child persona
    /// and the history record see.
    pub fn composed_description(&self) -> String {
        prompts::custom_scenario_description(&self.description, &self.child_state, &self.goal)
    }
}

/// Client for the role-play completion operations. Cheap to clone; the
/// provider handle is shared.
#[derive(Clone)]
pub struct RoleplayClient {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
}

impl RoleplayClient {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Next child reply for the running conversation. An empty completion
    /// degrades to the "..." placeholder so the transcript always advances.
    pub async fn next_child_reply(
        &self,
        scenario_description: &str,
        transcript: &[Message],
    ) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: Some(prompts::child_system_instruction(scenario_description)),
            turns: transcript
                .iter()
                .map(|message| Turn {
                    role: message.role.wire_name().to_string(),
                    text: message.text.clone(),
                })
                .collect(),
            temperature: Some(self.temperature),
            response_schema: None,
        };

        let response = self.provider.complete(request).await?;
        debug!(
            input_tokens = ?response.input_tokens,
            output_tokens = ?response.output_tokens,
            "child reply generated"
        );

        let text = response.text.trim().to_string();
        Ok(if text.is_empty() { "...".to_string() } else { text })
    }

    /// Five-dimension assessment of a finished conversation. Returns
    /// `Ok(None)` when the reply is not a valid report shape, which is a
    /// different outcome from a failed request.
    pub async fn assess_conversation(&self, transcript: &[Message]) -> Result<Option<ReportData>> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: Some(prompts::REPORT_SYSTEM_INSTRUCTION.to_string()),
            turns: vec![Turn::user(prompts::report_request_text(transcript))],
            temperature: None,
            response_schema: Some(prompts::report_response_schema()),
        };

        let response = self.provider.complete(request).await?;
        match serde_json::from_str::<ReportData>(response.text.trim()) {
            Ok(report) => Ok(Some(report)),
            Err(error) => {
                warn!(%error, "assessment reply did not match the report shape");
                Ok(None)
            }
        }
    }

    /// Draft a custom scenario. The opening line and the title generate
    /// concurrently; either failure fails the draft and no scenario is
    /// assembled. Cancelling the token drops both in-flight requests.
    pub async fn draft_custom_scenario(
        &self,
        input: &CustomScenarioInput,
        cancel: &CancellationToken,
    ) -> Result<Scenario> {
        let composed = input.composed_description();

        let generate = async {
            tokio::try_join!(
                self.generate_opening_line(&composed),
                self.generate_title(&input.description),
            )
        };

        let (initial_message, title) = tokio::select! {
            _ = cancel.cancelled() => bail!("scenario draft cancelled"),
            result = generate => result?,
        };

        Ok(Scenario {
            id: format!("custom_{}", Uuid::new_v4()),
            title,
            category: CUSTOM_SCENARIO_CATEGORY.to_string(),
            icon: CUSTOM_SCENARIO_ICON.to_string(),
            description: composed,
            initial_message,
            image: CUSTOM_SCENARIO_IMAGE.to_string(),
        })
    }

    async fn generate_opening_line(&self, composed_description: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: Some(prompts::child_system_instruction(composed_description)),
            turns: vec![Turn::user(prompts::OPENING_LINE_REQUEST)],
            temperature: Some(self.temperature),
            response_schema: None,
        };

        let response = self.provider.complete(request).await?;
        let text = response.text.trim().to_string();
        Ok(if text.is_empty() { "...".to_string() } else { text })
    }

    async fn generate_title(&self, raw_description: &str) -> Result<String> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: Some(prompts::TITLE_SYSTEM_INSTRUCTION.to_string()),
            turns: vec![Turn::user(raw_description)],
            temperature: None,
            response_schema: None,
        };

        let response = self.provider.complete(request).await?;
        let title = response.text.trim().to_string();
        if title.is_empty() {
            bail!("title generation returned empty text");
        }
        Ok(title)
    }
}
