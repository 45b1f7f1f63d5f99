//! Bounded conversation transcript.
//!
//! The agent keeps the most recent user/agent turn pairs as context for the
//! reasoning loop. Older pairs are evicted oldest-first; that loss is an
//! accepted approximation of long-term memory, not a bug.

use serde::{Deserialize, Serialize};

/// Maximum number of retained user/agent turn pairs.
pub const MAX_TURN_PAIRS: usize = 10;

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One utterance in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            text: text.into(),
        }
    }
}

/// Ordered transcript capped at [`MAX_TURN_PAIRS`] pairs (FIFO eviction).
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    max_pairs: usize,
}

impl Transcript {
    /// Create a transcript with the default cap.
    pub fn new() -> Self {
        Self::with_max_pairs(MAX_TURN_PAIRS)
    }

    /// Create a transcript with a custom pair cap.
    pub fn with_max_pairs(max_pairs: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_pairs,
        }
    }

    /// Append one completed user/agent exchange, evicting the oldest pairs
    /// once the cap is exceeded.
    pub fn push_pair(&mut self, user_text: &str, agent_text: &str) {
        self.turns.push(ConversationTurn::user(user_text));
        self.turns.push(ConversationTurn::agent(agent_text));

        let max_turns = self.max_pairs * 2;
        if self.turns.len() > max_turns {
            let excess = self.turns.len() - max_turns;
            self.turns.drain(..excess);
        }
    }

    /// The retained turns, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pair_appends_in_order() {
        let mut transcript = Transcript::new();
        transcript.push_pair("how many users?", "There are 42 users.");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].role, Role::User);
        assert_eq!(transcript.turns()[1].role, Role::Agent);
        assert_eq!(transcript.turns()[1].text, "There are 42 users.");
    }

    #[test]
    fn test_truncation_keeps_most_recent_pairs() {
        let mut transcript = Transcript::new();
        for i in 0..11 {
            transcript.push_pair(&format!("q{}", i), &format!("a{}", i));
        }

        // Exactly the 10 most recent pairs survive, oldest-first.
        assert_eq!(transcript.len(), MAX_TURN_PAIRS * 2);
        assert_eq!(transcript.turns()[0].text, "q1");
        assert_eq!(transcript.turns()[1].text, "a1");
        assert_eq!(transcript.turns()[18].text, "q10");
        assert_eq!(transcript.turns()[19].text, "a10");
    }

    #[test]
    fn test_eviction_removes_whole_pairs() {
        let mut transcript = Transcript::with_max_pairs(2);
        transcript.push_pair("q0", "a0");
        transcript.push_pair("q1", "a1");
        transcript.push_pair("q2", "a2");

        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.turns()[0].text, "q1");
        assert_eq!(transcript.turns()[0].role, Role::User);
    }

    #[test]
    fn test_role_serialization() {
        let turn = ConversationTurn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
