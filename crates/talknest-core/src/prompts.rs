//! Instruction templates for the three completion operations.
//!
//! Every template is Chinese-first because the practice content is Chinese;
//! the texts double as the contract with the model, so changing a wording
//! here changes what the child persona and the assessor are allowed to say.

use serde_json::{json, Value};
use talknest_schema::Message;

/// System instruction that puts the model into the teenage-child persona for
/// the given scenario. Used both for in-session replies and for drafting a
/// custom scenario's opening line.
pub fn child_system_instruction(scenario_description: &str) -> String {
    format!(
        "你现在扮演一个青春期的孩子。场景是：{scenario_description}。你的家长正在尝试和你沟通。请根据你的年龄和场景设定，给出真实、简短的回复（每次不超过50字）。如果家长的话让你反感，你会表现出抵触；如果家长共情、倾听、情绪稳定，你会逐渐敞开心扉。请直接输出孩子说的话，不要包含任何其他动作描写或解释。"
    )
}

/// System instruction for the five-dimension assessment.
pub const REPORT_SYSTEM_INSTRUCTION: &str = r#"你是一个专业的亲子沟通分析专家。请根据以下家长和孩子的对话记录，评估家长在5个维度上的表现。
5个维度：
1. 共情匹配度 (empathy)
2. 倾听匹配度 (listening)
3. 情绪稳定度 (emotion)
4. 边界匹配度 (boundary)
5. 需求捕捉匹配度 (needs)

每个维度的评价只能是以下三个之一："需注意", "一般", "较好"。"#;

/// User-turn content for the assessment: the labelled transcript followed by
/// the generation request.
pub fn report_request_text(transcript: &[Message]) -> String {
    let conversation: Vec<String> = transcript
        .iter()
        .map(|message| format!("{}: {}", message.role.transcript_label(), message.text))
        .collect();
    format!("对话记录如下：\n{}\n\n请生成评估报告。", conversation.join("\n"))
}

/// Structured-output schema the assessment request pins the model to.
/// Level strings are still free-form at the wire level; the strict label
/// check happens when the reply is deserialized.
pub fn report_response_schema() -> Value {
    let dimension = json!({
        "type": "OBJECT",
        "properties": {
            "level": { "type": "STRING" },
            "reason": { "type": "STRING" }
        },
        "required": ["level", "reason"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "empathy": {
                "type": "OBJECT",
                "properties": {
                    "level": { "type": "STRING", "description": "需注意, 一般, 或 较好" },
                    "reason": { "type": "STRING", "description": "简短的分析说明，50字以内" }
                },
                "required": ["level", "reason"]
            },
            "listening": dimension,
            "emotion": dimension,
            "boundary": dimension,
            "needs": dimension,
        },
        "required": ["empathy", "listening", "emotion", "boundary", "needs"]
    })
}

/// User-turn content asking the child persona for the scenario's first line.
pub const OPENING_LINE_REQUEST: &str =
    "对话刚刚开始。请以孩子的身份，说出你在这个场景开始时对家长说的第一句话。";

/// System instruction for turning a raw scenario description into a short
/// display title.
pub const TITLE_SYSTEM_INSTRUCTION: &str =
    "你是一个文案助手。请根据家长描述的亲子沟通场景，生成一个简短的场景标题。要求：不超过8个字，不包含任何标点符号，直接输出标题本身。";

/// Composed description for a custom scenario. An empty goal reads as
/// "no particular goal" rather than an empty line.
pub fn custom_scenario_description(description: &str, child_state: &str, goal: &str) -> String {
    let goal = if goal.is_empty() { "无特定目标" } else { goal };
    format!("场景描述：{description}\n孩子当前状态：{child_state}\n沟通目标：{goal}")
}
