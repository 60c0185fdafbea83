use std::rc::Rc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shelf::{Backend, ListenerKey, Shelf};

use crate::config::TrainerConfig;
use crate::performance::PerformanceStore;
use crate::practice::select_needing_practice;
use crate::session::{
    self, AdvanceToken, AnswerOutcome, QuizSession, SessionError, SessionSummary, SessionView,
};
use crate::vocabulary::{ListDraft, ListError, ListStore, ListSummary, VocabularyList};

/// Everything the app knows: the lists, the per-word stats and the quiz in progress, if any.
pub struct Trainer {
    lists: ListStore,
    performance: PerformanceStore,
    session: Option<QuizSession>,
    rng: ChaCha8Rng,
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(backend: Rc<dyn Backend>, config: TrainerConfig, seed: u64) -> Self {
        Self {
            lists: ListStore::load(Shelf::from_shared(backend.clone())),
            performance: PerformanceStore::load(Shelf::from_shared(backend)),
            session: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn lists(&self) -> &[VocabularyList] {
        self.lists.all()
    }

    pub fn performance(&self) -> &PerformanceStore {
        &self.performance
    }

    pub fn list_summaries(&self, now: DateTime<Utc>) -> Vec<ListSummary> {
        self.lists
            .all()
            .iter()
            .map(|list| ListSummary {
                id: list.id.clone(),
                name: list.name.clone(),
                target_language: list.target_language,
                language_label: list.target_language.label().to_string(),
                word_count: list.words.len(),
                needs_practice: select_needing_practice(
                    &list.id,
                    &list.words,
                    now,
                    &self.performance,
                    &self.config.practice,
                )
                .len(),
            })
            .collect()
    }

    pub fn save_list(
        &mut self,
        draft: ListDraft,
        now: DateTime<Utc>,
    ) -> Result<VocabularyList, ListError> {
        self.lists.save(draft, now).cloned()
    }

    /// Deletes the list and its stats. A quiz running on it is abandoned.
    pub fn delete_list(&mut self, id: &str) -> bool {
        let Some(removed) = self.lists.delete(id) else {
            log::warn!("Tried to delete unknown list {id}");
            return false;
        };
        self.performance.cascade_delete_list(&removed.id);
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.list_id() == removed.id)
        {
            self.abandon_quiz();
        }
        log::info!("Deleted list {}", removed.id);
        true
    }

    /// Starts a quiz on the list, replacing any quiz in progress.
    pub fn start_quiz(
        &mut self,
        list_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionView, SessionError> {
        let list = self
            .lists
            .get(list_id)
            .ok_or_else(|| SessionError::ListNotFound(list_id.to_string()))?;
        let quiz = session::build(list, &self.performance, now, &mut self.rng, &self.config)?;
        if let Some(mut previous) = self.session.replace(quiz) {
            previous.end();
        }
        Ok(self.current()?.view())
    }

    pub fn submit_answer(
        &mut self,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
        session.submit_answer(input, &mut self.performance, now)
    }

    pub fn skip_question(&mut self, now: DateTime<Utc>) -> Result<AnswerOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
        session.skip(&mut self.performance, now)
    }

    pub fn continue_after_pause(&mut self) -> Result<(), SessionError> {
        self.current_mut()?.continue_after_pause()
    }

    /// See [`QuizSession::auto_advance`]. Without a quiz every token is stale.
    pub fn auto_advance(&mut self, token: AdvanceToken) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.auto_advance(token))
    }

    /// Ends the quiz but keeps it around, so its final view can still be shown.
    pub fn end_quiz(&mut self) -> Result<SessionSummary, SessionError> {
        Ok(self.current_mut()?.end())
    }

    /// Ends the quiz and forgets it.
    pub fn abandon_quiz(&mut self) -> Option<SessionSummary> {
        self.session.take().map(|mut session| session.end())
    }

    pub fn session_view(&self) -> Option<SessionView> {
        self.session.as_ref().map(QuizSession::view)
    }

    pub fn pending_auto_advance(&self) -> Option<AdvanceToken> {
        self.session
            .as_ref()
            .and_then(QuizSession::pending_auto_advance)
    }

    /// Registers `listener` for changes to either store. Returns one key per store.
    pub fn register_listener(
        &mut self,
        listener: impl Fn(String) + Clone + 'static,
    ) -> [ListenerKey; 2] {
        let on_lists = listener.clone();
        [
            self.lists
                .shelf_mut()
                .register_listener(move |_, key| on_lists(key)),
            self.performance
                .shelf_mut()
                .register_listener(move |_, key| listener(key)),
        ]
    }

    pub fn unregister_listener(&mut self, keys: [ListenerKey; 2]) {
        let [lists_key, performance_key] = keys;
        self.lists.shelf_mut().unregister_listener(lists_key);
        self.performance
            .shelf_mut()
            .unregister_listener(performance_key);
    }

    pub fn drain_due_notifications(&mut self) -> Vec<Box<dyn FnOnce()>> {
        let mut notifications = self.lists.shelf_mut().drain_due_notifications();
        notifications.extend(self.performance.shelf_mut().drain_due_notifications());
        notifications
    }

    fn current(&self) -> Result<&QuizSession, SessionError> {
        self.session.as_ref().ok_or(SessionError::NoSession)
    }

    fn current_mut(&mut self) -> Result<&mut QuizSession, SessionError> {
        self.session.as_mut().ok_or(SessionError::NoSession)
    }
}
