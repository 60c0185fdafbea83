use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// A question is up and waiting for an answer
    Active,
    /// A wrong or skipped answer is shown until the user continues
    Paused,
    /// No more questions, or the session was ended early
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Active => "active",
            SessionState::Paused => "paused",
            SessionState::Finished => "finished",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    SubmitAnswer,
    Skip,
    ContinueAfterPause,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::SubmitAnswer => "submit an answer",
            Transition::Skip => "skip a question",
            Transition::ContinueAfterPause => "continue",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("list {0} has no words to quiz")]
    EmptyList(String),

    #[error("cannot {transition} while the session is {state}")]
    InvalidTransition {
        transition: Transition,
        state: SessionState,
    },

    #[error("cannot {0} while the previous answer is still shown")]
    AutoAdvancePending(Transition),

    #[error("no list with id {0}")]
    ListNotFound(String),

    #[error("no quiz is running")]
    NoSession,
}
