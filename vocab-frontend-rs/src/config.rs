use serde::{Deserialize, Serialize};

/// Tunables for the trainer. Every field has a default, so the JS side can pass a partial object (or nothing).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainerConfig {
    pub practice: PracticePolicy,
    pub session: SessionConfig,
}

/// When a word counts as needing practice. See [`crate::practice`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticePolicy {
    /// A failure younger than this keeps the word in rotation.
    pub recent_failure_window_days: u32,
    /// Fewer attempts than this are too noisy to judge an error rate.
    pub min_attempts: u32,
    /// Error rates strictly above this need practice.
    pub max_error_rate: f64,
}

impl Default for PracticePolicy {
    fn default() -> Self {
        Self {
            recent_failure_window_days: 7,
            min_attempts: 3,
            max_error_rate: 0.30,
        }
    }
}

impl PracticePolicy {
    pub fn recent_failure_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.recent_failure_window_days))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Share of a session reserved for words needing practice.
    pub practice_share: f64,
    /// How long the feedback of a correct answer stays up before the next question.
    pub feedback_delay_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            practice_share: 0.7,
            feedback_delay_ms: 1500,
        }
    }
}
