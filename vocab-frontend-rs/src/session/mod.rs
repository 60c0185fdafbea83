//! Quiz sessions: building a question set from a list, then walking through it.
//!
//! # Components
//! - `builder.rs`: picks and orders the words of a session and assigns directions
//! - `quiz.rs`: the `QuizSession` state machine and the data it exposes for rendering
//! - `errors.rs`: what can go wrong when building or driving a session

pub mod builder;
pub mod errors;
pub mod quiz;

pub use builder::build;
pub use errors::{SessionError, SessionState, Transition};
pub use quiz::{
    AdvanceToken, AnswerOutcome, AutoAdvance, Direction, Feedback, Progress, Question,
    QuestionView, QuizSession, SessionSummary, SessionView,
};
