use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answer::is_correct;
use crate::performance::PerformanceStore;
use crate::session::errors::{SessionError, SessionState, Transition};
use crate::vocabulary::{TargetLanguage, VocabularyList, WordPair};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Show the source term, ask for the translation
    ToTarget,
    /// Show the translation, ask for the source term
    ToSource,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub word: WordPair,
    pub direction: Direction,
    pub expected_answer: String,
}

impl Question {
    pub fn new(word: WordPair, direction: Direction) -> Self {
        let expected_answer = match direction {
            Direction::ToTarget => word.translation.clone(),
            Direction::ToSource => word.source_term.clone(),
        };
        Self {
            id: eyedee::get_uuid(),
            word,
            direction,
            expected_answer,
        }
    }

    /// The text shown to the user.
    pub fn prompt_word(&self) -> &str {
        match self.direction {
            Direction::ToTarget => &self.word.source_term,
            Direction::ToSource => &self.word.translation,
        }
    }
}

/// Identifies one scheduled auto-advance. Firing a token that is no longer pending does nothing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(transparent)]
pub struct AdvanceToken(u64);

/// Fire `token` through [`QuizSession::auto_advance`] once `delay_ms` have passed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct AutoAdvance {
    pub token: AdvanceToken,
    pub delay_ms: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub correct: bool,
    pub expected: String,
    pub auto_advance: Option<AutoAdvance>,
}

/// The result of the last answer, shown until the session moves on.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub question_index: usize,
    pub correct: bool,
    pub expected: String,
    /// `None` when the question was skipped
    pub submitted: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub word: String,
    pub direction: Direction,
    pub prompt: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// 1-based number of the question on screen
    pub position: usize,
    pub total: usize,
    pub score: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub list_id: String,
    pub list_name: String,
    pub state: SessionState,
    pub question: Option<QuestionView>,
    pub feedback: Option<Feedback>,
    pub progress: Progress,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
}

impl SessionSummary {
    pub fn new(score: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (100.0 * score as f64 / total as f64).round() as u32
        };
        Self {
            score,
            total,
            percentage,
        }
    }
}

/// One run through a fixed set of questions.
///
/// `score <= current_index <= questions.len()` holds after every transition. A correct answer
/// moves `current_index` on immediately; the returned [`AutoAdvance`] only controls how long the
/// feedback stays on screen, and no answer is accepted until it fires.
#[derive(Clone, Debug)]
pub struct QuizSession {
    list_id: String,
    list_name: String,
    target_language: TargetLanguage,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    paused: bool,
    ended: bool,
    feedback: Option<Feedback>,
    pending_advance: Option<AdvanceToken>,
    next_token: u64,
    feedback_delay_ms: u32,
}

impl QuizSession {
    pub fn new(list: &VocabularyList, questions: Vec<Question>, feedback_delay_ms: u32) -> Self {
        Self {
            list_id: list.id.clone(),
            list_name: list.name.clone(),
            target_language: list.target_language,
            questions,
            current_index: 0,
            score: 0,
            paused: false,
            ended: false,
            feedback: None,
            pending_advance: None,
            next_token: 0,
            feedback_delay_ms,
        }
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn state(&self) -> SessionState {
        if self.ended || self.current_index >= self.questions.len() {
            SessionState::Finished
        } else if self.paused {
            SessionState::Paused
        } else {
            SessionState::Active
        }
    }

    pub fn pending_auto_advance(&self) -> Option<AdvanceToken> {
        self.pending_advance
    }

    pub fn submit_answer(
        &mut self,
        input: &str,
        store: &mut PerformanceStore,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        self.ensure_answerable(Transition::SubmitAnswer)?;

        let question_index = self.current_index;
        let question = &self.questions[question_index];
        let correct = is_correct(input, &question.expected_answer);
        let expected = question.expected_answer.clone();
        store.record(&self.list_id, &question.word.id, correct, now);

        self.feedback = Some(Feedback {
            question_index,
            correct,
            expected: expected.clone(),
            submitted: Some(input.trim().to_string()),
        });

        let auto_advance = if correct {
            self.score += 1;
            self.current_index += 1;
            let token = self.issue_token();
            Some(AutoAdvance {
                token,
                delay_ms: self.feedback_delay_ms,
            })
        } else {
            self.paused = true;
            None
        };

        log::debug!(
            "Question {} of {}: {}",
            question_index + 1,
            self.questions.len(),
            if correct { "correct" } else { "wrong" }
        );

        Ok(AnswerOutcome {
            correct,
            expected,
            auto_advance,
        })
    }

    /// Gives up on the current question. Counts as a wrong answer.
    pub fn skip(
        &mut self,
        store: &mut PerformanceStore,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        self.ensure_answerable(Transition::Skip)?;

        let question_index = self.current_index;
        let question = &self.questions[question_index];
        let expected = question.expected_answer.clone();
        store.record(&self.list_id, &question.word.id, false, now);

        self.feedback = Some(Feedback {
            question_index,
            correct: false,
            expected: expected.clone(),
            submitted: None,
        });
        self.paused = true;
        log::debug!("Question {} skipped", question_index + 1);

        Ok(AnswerOutcome {
            correct: false,
            expected,
            auto_advance: None,
        })
    }

    pub fn continue_after_pause(&mut self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Paused => {
                self.paused = false;
                self.feedback = None;
                self.current_index += 1;
                Ok(())
            }
            state => Err(SessionError::InvalidTransition {
                transition: Transition::ContinueAfterPause,
                state,
            }),
        }
    }

    /// Fires a scheduled auto-advance. Returns false (and changes nothing) if `token` was superseded, already fired, or the session ended.
    pub fn auto_advance(&mut self, token: AdvanceToken) -> bool {
        if self.pending_advance != Some(token) {
            log::debug!("Ignoring stale auto-advance {token:?}");
            return false;
        }
        self.pending_advance = None;
        self.feedback = None;
        true
    }

    /// Stops the session wherever it is. Any pending auto-advance is invalidated.
    pub fn end(&mut self) -> SessionSummary {
        self.ended = true;
        self.paused = false;
        self.pending_advance = None;
        self.feedback = None;
        let summary = self.summary();
        log::info!(
            "Quiz on list {} ended with {}/{}",
            self.list_id,
            summary.score,
            summary.total
        );
        summary
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(self.score, self.questions.len())
    }

    pub fn view(&self) -> SessionView {
        let shown_index = match (&self.feedback, self.state()) {
            (Some(feedback), _) => Some(feedback.question_index),
            (None, SessionState::Finished) => None,
            (None, _) => Some(self.current_index),
        };

        let question = shown_index
            .and_then(|index| self.questions.get(index))
            .map(|question| QuestionView {
                word: question.prompt_word().to_string(),
                direction: question.direction,
                prompt: self.prompt(question.direction),
            });

        let total = self.questions.len();
        SessionView {
            list_id: self.list_id.clone(),
            list_name: self.list_name.clone(),
            state: self.state(),
            question,
            feedback: self.feedback.clone(),
            progress: Progress {
                position: shown_index.map_or(total, |index| index + 1),
                total,
                score: self.score,
            },
        }
    }

    fn prompt(&self, direction: Direction) -> String {
        match direction {
            Direction::ToTarget => {
                format!("Traduire en {} :", self.target_language.name_in_prompt())
            }
            Direction::ToSource => "Traduire en français :".to_string(),
        }
    }

    fn ensure_answerable(&self, transition: Transition) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Active if self.pending_advance.is_some() => {
                Err(SessionError::AutoAdvancePending(transition))
            }
            SessionState::Active => Ok(()),
            state => Err(SessionError::InvalidTransition { transition, state }),
        }
    }

    fn issue_token(&mut self) -> AdvanceToken {
        self.next_token += 1;
        let token = AdvanceToken(self.next_token);
        self.pending_advance = Some(token);
        token
    }
}
