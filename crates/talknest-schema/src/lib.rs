use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod catalog;

/// Speaker of one transcript message. The wire names double as the
/// completion API content roles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    Parent,
    #[serde(rename = "model")]
    Child,
}

impl Role {
    /// Content role the completion API expects for this speaker.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::Parent => "user",
            Role::Child => "model",
        }
    }

    /// Transcript label shown to the assessment model.
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Role::Parent => "家长",
            Role::Child => "孩子",
        }
    }
}

/// Role-play premise. Built once at catalog definition time or synthesized
/// once per custom session, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub category: String,
    pub icon: String,
    pub description: String,
    pub initial_message: String,
    pub image: String,
}

/// One transcript entry. The transcript is append-only and its insertion
/// order is the conversation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn parent(text: impl Into<String>) -> Self {
        Self::new(Role::Parent, text)
    }

    pub fn child(text: impl Into<String>) -> Self {
        Self::new(Role::Child, text)
    }
}

/// Assessment grade for one dimension. Deserialization accepts exactly the
/// three labels the report instruction allows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Level {
    #[serde(rename = "需注意")]
    NeedsAttention,
    #[serde(rename = "一般")]
    Average,
    #[serde(rename = "较好")]
    Good,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::NeedsAttention => "需注意",
            Level::Average => "一般",
            Level::Good => "较好",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DimensionReport {
    pub level: Level,
    pub reason: String,
}

/// Five-dimension assessment of one completed session. All dimensions are
/// required; a response missing any of them, or carrying extra fields,
/// fails to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportData {
    pub empathy: DimensionReport,
    pub listening: DimensionReport,
    pub emotion: DimensionReport,
    pub boundary: DimensionReport,
    pub needs: DimensionReport,
}

impl ReportData {
    /// Dimensions in display order with their display titles.
    pub fn dimensions(&self) -> [(&'static str, &DimensionReport); 5] {
        [
            ("共情匹配度", &self.empathy),
            ("倾听匹配度", &self.listening),
            ("情绪稳定度", &self.emotion),
            ("边界匹配度", &self.boundary),
            ("需求捕捉匹配度", &self.needs),
        ]
    }
}

/// Durable outcome of one completed session. Scenario title/icon are
/// denormalized so the record stays viewable after the scenario itself is
/// gone from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub id: String,
    pub scenario_id: String,
    pub scenario_title: String,
    pub scenario_icon: String,
    pub timestamp: DateTime<Utc>,
    pub report: ReportData,
    pub chat_history: Vec<Message>,
}

impl PracticeRecord {
    pub fn new(scenario: &Scenario, report: ReportData, chat_history: Vec<Message>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scenario_id: scenario.id.clone(),
            scenario_title: scenario.title.clone(),
            scenario_icon: scenario.icon.clone(),
            timestamp: Utc::now(),
            report,
            chat_history,
        }
    }
}
