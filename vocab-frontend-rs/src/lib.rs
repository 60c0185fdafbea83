mod answer;
mod config;
mod performance;
mod practice;
pub mod session;
mod trainer;
mod utils;
mod vocabulary;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use shelf::{Backend, MemoryBackend};
use wasm_bindgen::prelude::*;

pub use answer::is_correct;
pub use config::{PracticePolicy, SessionConfig, TrainerConfig};
pub use performance::{PERFORMANCE_KEY, PerformanceStore, WordStat};
pub use practice::{needs_practice, select_needing_practice};
use session::AutoAdvance;
pub use session::{AnswerOutcome, SessionSummary, SessionView};
pub use trainer::Trainer;
pub use vocabulary::{
    LISTS_KEY, ListDraft, ListError, ListSummary, TargetLanguage, VocabularyList, WordDraft,
    WordPair,
};

/// Passed to the change callback when the quiz on screen changed by itself (the feedback of a correct answer timed out).
pub const SESSION_KEY: &str = "session";

#[wasm_bindgen]
pub struct VocabTrainer {
    // never hold a borrow of `trainer` while calling into JS, the callbacks call right back
    trainer: Rc<RefCell<Trainer>>,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    on_change: js_sys::Function,
    timer: RefCell<Option<PendingTimer>>,
}

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl VocabTrainer {
    /// `on_change` is called with a storage key (or [`SESSION_KEY`]) whenever something the UI shows may have changed.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(config: TrainerConfig, on_change: js_sys::Function) -> VocabTrainer {
        // used to only initialize the logger once
        #[allow(clippy::borrow_interior_mutable_const)]
        *LOGGER;

        let mut trainer = Trainer::new(default_backend(), config, eyedee::random_seed());
        let listener = on_change.clone();
        trainer.register_listener(move |key| notify(&listener, &key));

        VocabTrainer {
            trainer: Rc::new(RefCell::new(trainer)),
            on_change,
            timer: RefCell::new(None),
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn get_all_lists(&self) -> Vec<VocabularyList> {
        self.trainer.borrow().lists().to_vec()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn get_list_summaries(&self) -> Vec<ListSummary> {
        self.trainer.borrow().list_summaries(chrono::Utc::now())
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn save_list(&self, draft: ListDraft) -> Result<VocabularyList, JsValue> {
        let _flusher = FlushLater::new(self);
        self.trainer
            .borrow_mut()
            .save_list(draft, chrono::Utc::now())
            .map_err(to_js_error)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn delete_list(&self, id: String) -> bool {
        let _flusher = FlushLater::new(self);
        let deleted = self.trainer.borrow_mut().delete_list(&id);
        if self.trainer.borrow().pending_auto_advance().is_none() {
            self.clear_timer();
        }
        deleted
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn start_quiz(&self, list_id: String) -> Result<SessionView, JsValue> {
        self.clear_timer();
        self.trainer
            .borrow_mut()
            .start_quiz(&list_id, chrono::Utc::now())
            .map_err(to_js_error)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn submit_answer(&self, input: String) -> Result<AnswerOutcome, JsValue> {
        let _flusher = FlushLater::new(self);
        let outcome = self
            .trainer
            .borrow_mut()
            .submit_answer(&input, chrono::Utc::now())
            .map_err(to_js_error)?;
        if let Some(auto_advance) = outcome.auto_advance {
            self.schedule_auto_advance(auto_advance);
        }
        Ok(outcome)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn skip_question(&self) -> Result<AnswerOutcome, JsValue> {
        let _flusher = FlushLater::new(self);
        self.trainer
            .borrow_mut()
            .skip_question(chrono::Utc::now())
            .map_err(to_js_error)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn continue_after_pause(&self) -> Result<(), JsValue> {
        self.trainer
            .borrow_mut()
            .continue_after_pause()
            .map_err(to_js_error)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn end_quiz(&self) -> Result<SessionSummary, JsValue> {
        self.clear_timer();
        self.trainer.borrow_mut().end_quiz().map_err(to_js_error)
    }

    /// Leaves the quiz screen. Returns the summary of the abandoned quiz, if there was one.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn abandon_quiz(&self) -> Option<SessionSummary> {
        self.clear_timer();
        self.trainer.borrow_mut().abandon_quiz()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn get_session_view(&self) -> Option<SessionView> {
        self.trainer.borrow().session_view()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn get_config(&self) -> TrainerConfig {
        self.trainer.borrow().config().clone()
    }

    /// Flush pending store notifications without holding the trainer borrow during the callbacks.
    fn flush_notifications(&self) {
        let notifications = self.trainer.borrow_mut().drain_due_notifications();
        for notification in notifications {
            notification();
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_auto_advance(&self, auto_advance: AutoAdvance) {
        use wasm_bindgen::JsCast;

        self.clear_timer();

        let Some(window) = web_sys::window() else {
            log::error!("No window to schedule the next question on");
            return;
        };

        let trainer = self.trainer.clone();
        let on_change = self.on_change.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            let advanced = trainer.borrow_mut().auto_advance(auto_advance.token);
            if advanced {
                notify(&on_change, SESSION_KEY);
            }
        });

        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            utils::timeout_ms(auto_advance.delay_ms),
        ) {
            Ok(handle) => {
                self.timer.replace(Some(PendingTimer {
                    handle,
                    _callback: callback,
                }));
            }
            Err(e) => log::error!("Could not schedule the next question: {e:?}"),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_auto_advance(&self, auto_advance: AutoAdvance) {
        // natively the caller drives `Trainer::auto_advance` itself
        log::debug!("Not scheduling {auto_advance:?} outside the browser");
    }

    fn clear_timer(&self) {
        let Some(timer) = self.timer.take() else {
            return;
        };
        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(timer.handle);
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = timer.handle;
    }
}

/// A `setTimeout` that has not fired (or not been cleared) yet. Owns the closure JS will call.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct PendingTimer {
    handle: i32,
    #[cfg(target_arch = "wasm32")]
    _callback: Closure<dyn FnMut()>,
}

fn default_backend() -> Rc<dyn Backend> {
    #[cfg(target_arch = "wasm32")]
    {
        match shelf::local_storage::LocalStorageBackend::new() {
            Ok(backend) => return Rc::new(backend),
            Err(e) => log::warn!("localStorage unavailable, nothing will be saved: {e}"),
        }
    }
    Rc::new(MemoryBackend::new())
}

fn notify(callback: &js_sys::Function, key: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        let this = JsValue::null();
        let key_js = JsValue::from_str(key);
        if let Err(e) = callback.call1(&this, &key_js) {
            log::error!("Change callback failed: {e:?}");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (callback, key);
    }
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

struct FlushLater<'a> {
    trainer: &'a VocabTrainer,
}

impl<'a> FlushLater<'a> {
    fn new(trainer: &'a VocabTrainer) -> Self {
        Self { trainer }
    }
}

impl<'a> Drop for FlushLater<'a> {
    fn drop(&mut self) {
        self.trainer.flush_notifications();
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
