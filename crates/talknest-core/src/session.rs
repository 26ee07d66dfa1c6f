//! One practice run: the scenario, the growing transcript, the turn budget
//! and the end-of-session rules.
//!
//! The session is plain owned state with synchronous transitions; request
//! scheduling and rendering live elsewhere. Transitions that would violate
//! an invariant (empty input, exhausted budget) are rejected instead of
//! trusting callers to check first.

use talknest_schema::{Message, PracticeRecord, ReportData, Scenario};

/// Hard cap of parent messages per session.
pub const MAX_PARENT_MESSAGES: usize = 10;
/// First parent-message count at which the running-out warning shows.
pub const TURN_WARNING_FROM: usize = 8;
/// Below this many parent messages the assessment is considered unreliable.
pub const RELIABLE_PARENT_MESSAGES: usize = 3;

/// What asking to end the session is allowed to do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndGuard {
    /// The parent has said nothing. Ending is blocked and no assessment
    /// request may be made.
    EmptyTranscript,
    /// One or two parent messages. The user may still end, past an
    /// unreliable-assessment warning.
    LowConfidence,
    /// Enough material for a meaningful assessment.
    Ready,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    scenario: Scenario,
    transcript: Vec<Message>,
}

impl PracticeSession {
    /// Start a session. The scenario's opening line is seeded as the child's
    /// first message so the transcript is never empty.
    pub fn begin(scenario: Scenario) -> Self {
        let opening = Message::child(scenario.initial_message.clone());
        Self {
            scenario,
            transcript: vec![opening],
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn parent_message_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|message| message.role == talknest_schema::Role::Parent)
            .count()
    }

    pub fn remaining_turns(&self) -> usize {
        MAX_PARENT_MESSAGES.saturating_sub(self.parent_message_count())
    }

    pub fn budget_exhausted(&self) -> bool {
        self.parent_message_count() >= MAX_PARENT_MESSAGES
    }

    /// `Some(remaining)` exactly while the parent is on their 8th or 9th
    /// message, so the UI can show how many turns are left.
    pub fn turn_warning(&self) -> Option<usize> {
        let count = self.parent_message_count();
        if (TURN_WARNING_FROM..MAX_PARENT_MESSAGES).contains(&count) {
            Some(MAX_PARENT_MESSAGES - count)
        } else {
            None
        }
    }

    /// Append a parent message. Whitespace-only input and input past the
    /// budget are rejected without touching the transcript.
    pub fn push_parent(&mut self, text: &str) -> bool {
        if text.trim().is_empty() || self.budget_exhausted() {
            return false;
        }
        self.transcript.push(Message::parent(text));
        true
    }

    /// Append the child's reply. The caller has already degraded an empty
    /// completion to the "..." placeholder, so this always records.
    pub fn push_child(&mut self, text: impl Into<String>) {
        self.transcript.push(Message::child(text));
    }

    pub fn end_guard(&self) -> EndGuard {
        match self.parent_message_count() {
            0 => EndGuard::EmptyTranscript,
            n if n < RELIABLE_PARENT_MESSAGES => EndGuard::LowConfidence,
            _ => EndGuard::Ready,
        }
    }

    /// Snapshot the finished session into a durable record.
    pub fn into_record(self, report: ReportData) -> PracticeRecord {
        PracticeRecord::new(&self.scenario, report, self.transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talknest_schema::{catalog, DimensionReport, Level, Role};

    fn session() -> PracticeSession {
        PracticeSession::begin(catalog::builtin_scenarios().remove(0))
    }

    fn report() -> ReportData {
        let dim = |level| DimensionReport {
            level,
            reason: "测试".to_string(),
        };
        ReportData {
            empathy: dim(Level::Good),
            listening: dim(Level::Average),
            emotion: dim(Level::Good),
            boundary: dim(Level::NeedsAttention),
            needs: dim(Level::Average),
        }
    }

    #[test]
    fn begin_seeds_the_opening_line_as_child() {
        let session = session();
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Child);
        assert_eq!(
            session.transcript()[0].text,
            session.scenario().initial_message
        );
        assert_eq!(session.parent_message_count(), 0);
    }

    #[test]
    fn push_parent_rejects_whitespace_only_input() {
        let mut session = session();
        assert!(!session.push_parent(""));
        assert!(!session.push_parent("   \n"));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn push_parent_stops_at_the_budget() {
        let mut session = session();
        for i in 0..MAX_PARENT_MESSAGES {
            assert!(session.push_parent(&format!("第{i}句")));
            session.push_child("嗯。");
        }
        assert!(session.budget_exhausted());
        assert_eq!(session.remaining_turns(), 0);
        assert!(!session.push_parent("多余的一句"));
        assert_eq!(session.parent_message_count(), MAX_PARENT_MESSAGES);
    }

    #[test]
    fn turn_warning_covers_exactly_the_last_window() {
        let mut session = session();
        for i in 1..=MAX_PARENT_MESSAGES {
            session.push_parent(&format!("第{i}句"));
            match i {
                8 => assert_eq!(session.turn_warning(), Some(2)),
                9 => assert_eq!(session.turn_warning(), Some(1)),
                _ => assert_eq!(session.turn_warning(), None),
            }
        }
    }

    #[test]
    fn end_guard_tracks_parent_message_count() {
        let mut session = session();
        assert_eq!(session.end_guard(), EndGuard::EmptyTranscript);

        session.push_parent("第一句");
        assert_eq!(session.end_guard(), EndGuard::LowConfidence);
        session.push_parent("第二句");
        assert_eq!(session.end_guard(), EndGuard::LowConfidence);

        session.push_parent("第三句");
        assert_eq!(session.end_guard(), EndGuard::Ready);
    }

    #[test]
    fn into_record_snapshots_scenario_and_transcript() {
        let mut session = session();
        let scenario_id = session.scenario().id.clone();
        session.push_parent("你今天回来得有点晚。");
        session.push_child("嗯。");

        let record = session.into_record(report());
        assert_eq!(record.scenario_id, scenario_id);
        assert_eq!(record.chat_history.len(), 3);
        assert_eq!(record.chat_history[1].role, Role::Parent);
    }
}
