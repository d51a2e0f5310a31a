//! Edit session: the input method's view of one remote text field.
//!
//! An [`EditSession`] is owned by whoever drives the session lifetime (the
//! proxy bridge). The platform only ever sees an [`EditSessionHandle`], a weak
//! responder that turns into a no-op once the session has ended.
//!
//! Two timelines feed the session: synchronous responder calls from the input
//! method, and remote state pushes via [`EditSession::update_state`]. Local
//! edits are reported through the state-changed listener; remote pushes are
//! not echoed back.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tcproxy_foundation::{IntRect, TextInputState};

use crate::config::SessionConfig;
use crate::cursor_anchor::CursorAnchorInfo;
use crate::key_event::{KeyAction, KeyCode, KeyEvent};
use crate::platform::{
    CharSender, Clipboard, ContextMenuId, EditorInfo, ExtractedText, ExtractedTextRequest,
    KeyTranslator, PlatformInput, TextClassifier,
};

/// Where a session is in its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    /// Inside `depth` nested batch edits.
    InBatch(usize),
}

/// Everything an edit session calls out to.
#[derive(Clone)]
pub struct SessionCollaborators {
    pub platform: Rc<dyn PlatformInput>,
    pub key_translator: Rc<dyn KeyTranslator>,
    pub char_sender: Rc<dyn CharSender>,
    pub clipboard: Option<Rc<dyn Clipboard>>,
    pub classifier: Option<Rc<dyn TextClassifier>>,
}

impl fmt::Debug for SessionCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCollaborators")
            .field("clipboard", &self.clipboard.is_some())
            .field("classifier", &self.classifier.is_some())
            .finish_non_exhaustive()
    }
}

type StateListener = Box<dyn Fn(&TextInputState)>;

struct SessionInner {
    state: TextInputState,
    active: bool,
    batch_depth: usize,
    // Remote state that arrived during a batch; applied when it ends.
    deferred: Option<TextInputState>,
    extract_always: bool,
    extract_token: Option<i32>,
}

struct SessionShared {
    inner: RefCell<SessionInner>,
    collaborators: SessionCollaborators,
    config: SessionConfig,
    on_state_changed: StateListener,
}

impl SessionShared {
    fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    fn current(&self) -> TextInputState {
        self.inner.borrow().state.clone()
    }

    fn phase(&self) -> SessionPhase {
        let inner = self.inner.borrow();
        match (inner.active, inner.batch_depth) {
            (false, _) => SessionPhase::Idle,
            (true, 0) => SessionPhase::Active,
            (true, depth) => SessionPhase::InBatch(depth),
        }
    }

    /// Pushes selection and any subscribed extraction snapshots.
    fn refresh(&self, state: &TextInputState) {
        let (always, token) = {
            let inner = self.inner.borrow();
            (inner.extract_always, inner.extract_token)
        };
        let platform = &self.collaborators.platform;
        platform.update_selection(state.selection, state.composition);
        if always || token.is_some() {
            let extracted = ExtractedText::from_state(state);
            if always {
                platform.update_extracted_text(0, &extracted);
            }
            if let Some(token) = token {
                platform.update_extracted_text(token, &extracted);
            }
        }
    }

    /// Applies a local edit. Outside a batch the platform is refreshed (when
    /// `refresh` is set) and the listener sees the new state.
    fn edit(&self, refresh: bool, f: impl FnOnce(&TextInputState) -> TextInputState) {
        let (next, in_batch) = {
            let mut inner = self.inner.borrow_mut();
            let next = f(&inner.state);
            inner.state = next.clone();
            (next, inner.batch_depth > 0)
        };
        if self.config.verbose {
            log::trace!("local edit -> {next:?} (in batch: {in_batch})");
        }
        if in_batch {
            return;
        }
        if refresh {
            self.refresh(&next);
        }
        (self.on_state_changed)(&next);
    }

    fn apply_remote(&self, state: TextInputState) {
        let state = state.normalized();
        let restart = {
            let mut inner = self.inner.borrow_mut();
            if !inner.active {
                log::warn!("remote state arrived after the edit session ended");
                return;
            }
            if inner.batch_depth > 0 {
                inner.deferred = Some(state);
                return;
            }
            if inner.state == state {
                return;
            }
            let restart = inner.state.text != state.text;
            inner.state = state.clone();
            restart
        };
        if restart {
            log::debug!("remote text changed, restarting input");
            self.collaborators.platform.restart_input();
        }
        self.refresh(&state);
    }

    fn end_batch(&self) -> bool {
        let (depth, deferred) = {
            let mut inner = self.inner.borrow_mut();
            if inner.batch_depth == 0 {
                log::warn!("end_batch_edit without a matching begin_batch_edit");
                return false;
            }
            inner.batch_depth -= 1;
            let deferred = if inner.batch_depth == 0 {
                inner.deferred.take()
            } else {
                None
            };
            (inner.batch_depth, deferred)
        };
        if depth == 0 {
            match deferred {
                Some(state) => self.apply_remote(state),
                None => {
                    let state = self.current();
                    self.refresh(&state);
                    (self.on_state_changed)(&state);
                }
            }
        }
        depth > 0
    }

    fn terminate(&self) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.active {
                return false;
            }
            inner.active = false;
            inner.batch_depth = 0;
            if inner.deferred.take().is_some() {
                log::debug!("discarding state deferred by an open batch edit");
            }
        }
        self.collaborators.platform.finish_input();
        true
    }
}

/// One input session over a remote text field.
///
/// Dropping the session terminates it.
pub struct EditSession {
    shared: Rc<SessionShared>,
}

impl EditSession {
    /// Starts a session seeded with `initial` and opens platform input on it.
    ///
    /// `on_state_changed` sees every locally committed state: after each edit
    /// outside a batch, and once per outermost batch.
    pub fn start(
        initial: TextInputState,
        collaborators: SessionCollaborators,
        config: SessionConfig,
        on_state_changed: impl Fn(&TextInputState) + 'static,
    ) -> Self {
        let initial = initial.normalized();
        let editor_info = EditorInfo::from_state(&initial, config.input_type);
        let shared = Rc::new(SessionShared {
            inner: RefCell::new(SessionInner {
                state: initial.clone(),
                active: true,
                batch_depth: 0,
                deferred: None,
                extract_always: false,
                extract_token: None,
            }),
            collaborators,
            config,
            on_state_changed: Box::new(on_state_changed),
        });
        let session = Self { shared };
        log::debug!("edit session started with {initial:?}");
        session
            .shared
            .collaborators
            .platform
            .start_input(editor_info, session.handle());
        session.shared.refresh(&initial);
        session
    }

    pub fn handle(&self) -> EditSessionHandle {
        EditSessionHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Replaces the state with one pushed by the remote, after clamping its
    /// ranges into the text.
    ///
    /// Deferred until the batch ends while one is open. A changed text makes
    /// the platform rebuild its editing context.
    pub fn update_state(&self, state: TextInputState) {
        self.shared.apply_remote(state);
    }

    /// Reports the current caret and input area rectangles (device pixels).
    pub fn update_cursor_anchor(&self, caret: Option<IntRect>, area: Option<IntRect>) {
        if !self.shared.is_active() {
            return;
        }
        let info = CursorAnchorInfo::new(&self.shared.current(), caret, area);
        self.shared
            .collaborators
            .platform
            .update_cursor_anchor_info(&info);
    }

    /// Ends the session: discards any deferred state and finishes platform
    /// input. Returns false if it had already ended.
    pub fn terminate(&self) -> bool {
        let ended = self.shared.terminate();
        if ended {
            log::debug!("edit session terminated");
        }
        ended
    }

    pub fn state(&self) -> TextInputState {
        self.shared.current()
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.phase()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("phase", &self.phase())
            .field("state", &self.state())
            .finish()
    }
}

/// Responder the platform input method calls into.
///
/// Every call on a handle whose session has ended is a no-op that reports
/// "unhandled" (`false`, `None` or `0`).
#[derive(Clone)]
pub struct EditSessionHandle {
    shared: Weak<SessionShared>,
}

impl EditSessionHandle {
    fn session(&self) -> Option<Rc<SessionShared>> {
        self.shared.upgrade().filter(|shared| shared.is_active())
    }

    fn run(&self, op: &str, f: impl FnOnce(&SessionShared) -> bool) -> bool {
        match self.session() {
            Some(shared) => {
                if shared.config.verbose {
                    log::trace!("{op}");
                }
                f(&shared)
            }
            None => {
                log::warn!("{op} ignored: edit session has ended");
                false
            }
        }
    }

    fn edit(
        &self,
        op: &str,
        refresh: bool,
        f: impl FnOnce(&TextInputState) -> TextInputState,
    ) -> bool {
        self.run(op, |shared| {
            shared.edit(refresh, f);
            true
        })
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared
            .upgrade()
            .map_or(SessionPhase::Idle, |shared| shared.phase())
    }

    pub fn begin_batch_edit(&self) -> bool {
        self.run("begin_batch_edit", |shared| {
            shared.inner.borrow_mut().batch_depth += 1;
            true
        })
    }

    /// Closes one batch level. Returns whether a batch is still open.
    pub fn end_batch_edit(&self) -> bool {
        self.run("end_batch_edit", SessionShared::end_batch)
    }

    /// Commits `text`, replacing the composition or the selection.
    pub fn commit_text(&self, text: &str, cursor_hint: i32) -> bool {
        self.run("commit_text", |shared| {
            let (filtered, enters) = if shared.config.filter_newlines {
                let enters = text.matches('\n').count();
                (text.replace('\n', ""), enters)
            } else {
                (text.to_owned(), 0)
            };
            if !filtered.is_empty() {
                shared.edit(true, |state| state.commit_text(&filtered, cursor_hint));
            }
            for _ in 0..enters {
                shared.collaborators.char_sender.send_enter();
            }
            true
        })
    }

    pub fn set_composing_text(&self, text: &str, cursor_hint: i32) -> bool {
        self.edit("set_composing_text", true, |state| {
            state.set_composing_text(text, cursor_hint)
        })
    }

    /// Marks existing text as the composition. The platform is not refreshed;
    /// it asked for this region itself.
    pub fn set_composing_region(&self, start: usize, end: usize) -> bool {
        self.edit("set_composing_region", false, |state| {
            state.set_composing_region(start, end)
        })
    }

    pub fn finish_composing_text(&self) -> bool {
        self.edit("finish_composing_text", true, TextInputState::finish_composing_text)
    }

    pub fn delete_surrounding_text(&self, before: usize, after: usize) -> bool {
        self.edit("delete_surrounding_text", true, |state| {
            state.delete_surrounding_text(before, after)
        })
    }

    pub fn delete_surrounding_text_in_code_points(&self, before: usize, after: usize) -> bool {
        self.edit("delete_surrounding_text_in_code_points", true, |state| {
            state.delete_surrounding_text_in_code_points(before, after)
        })
    }

    pub fn set_selection(&self, start: usize, end: usize) -> bool {
        self.edit("set_selection", true, |state| state.set_selection(start, end))
    }

    pub fn get_text_before_cursor(&self, n: usize) -> Option<String> {
        let shared = self.session()?;
        let inner = shared.inner.borrow();
        Some(inner.state.text_before_cursor(n).to_owned())
    }

    pub fn get_text_after_cursor(&self, n: usize) -> Option<String> {
        let shared = self.session()?;
        let inner = shared.inner.borrow();
        Some(inner.state.text_after_cursor(n).to_owned())
    }

    /// Selected text, or `None` for a bare caret.
    pub fn get_selected_text(&self) -> Option<String> {
        let shared = self.session()?;
        let inner = shared.inner.borrow();
        inner.state.selected_text().map(str::to_owned)
    }

    /// Snapshot of the whole text. Also subscribes the request's token to
    /// future pushes: token `0` means every change, any other token is
    /// remembered and echoed back.
    pub fn get_extracted_text(&self, request: ExtractedTextRequest) -> Option<ExtractedText> {
        let shared = self.session()?;
        let mut inner = shared.inner.borrow_mut();
        if request.token == 0 {
            inner.extract_always = true;
        } else {
            inner.extract_token = Some(request.token);
        }
        Some(ExtractedText::from_state(&inner.state))
    }

    /// Capitalization mode at the caret edge of the selection. Zero when no
    /// classifier is available.
    pub fn get_cursor_caps_mode(&self, req_modes: u32) -> u32 {
        let Some(shared) = self.session() else {
            return 0;
        };
        let Some(classifier) = shared.collaborators.classifier.clone() else {
            return 0;
        };
        let state = shared.current();
        classifier.caps_mode(&state.text, state.caps_offset(), req_modes)
    }

    pub fn perform_context_menu_action(&self, id: ContextMenuId) -> bool {
        self.run("perform_context_menu_action", |shared| {
            let clipboard = shared.collaborators.clipboard.as_ref();
            match id {
                ContextMenuId::SELECT_ALL => shared.edit(true, TextInputState::select_all),
                ContextMenuId::CUT => {
                    let mut cut = String::new();
                    shared.edit(true, |state| {
                        let (next, removed) = state.cut_selection();
                        cut = removed;
                        next
                    });
                    if let Some(clipboard) = clipboard {
                        clipboard.write(&cut);
                    }
                }
                ContextMenuId::COPY => {
                    if let Some(clipboard) = clipboard {
                        clipboard.write(shared.current().selection_text());
                    }
                }
                ContextMenuId::PASTE => {
                    if let Some(text) = clipboard.and_then(|clipboard| clipboard.read()) {
                        shared.edit(true, |state| state.commit_text(&text, 1));
                    }
                }
                _ => {
                    log::debug!("unhandled context menu action {:#x}", id.0);
                    return false;
                }
            }
            true
        })
    }

    /// Handles a key event. The keys the session interprets itself act on
    /// key down and swallow key up; every other key goes to the key
    /// translator, which may not know it.
    pub fn send_key_event(&self, event: &KeyEvent) -> bool {
        self.run("send_key_event", |shared| {
            let code = event.key_code;
            if code.is_editing_key() {
                if event.action == KeyAction::Up {
                    return true;
                }
                let shift = event.is_shift_pressed();
                match code {
                    KeyCode::ENTER => shared.collaborators.char_sender.send_enter(),
                    KeyCode::DPAD_LEFT if shift => shared.edit(true, TextInputState::shift_left),
                    KeyCode::DPAD_LEFT => shared.edit(true, TextInputState::arrow_left),
                    KeyCode::DPAD_RIGHT if shift => shared.edit(true, TextInputState::shift_right),
                    KeyCode::DPAD_RIGHT => shared.edit(true, TextInputState::arrow_right),
                    KeyCode::DEL => shared.edit(true, TextInputState::backspace),
                    _ => shared.edit(true, TextInputState::forward_delete),
                }
                return true;
            }
            let translator = &shared.collaborators.key_translator;
            match translator.lookup(code) {
                Some(index) => translator.execute(event, index),
                None => log::trace!("no key mapping for {code}"),
            }
            true
        })
    }

    /// Clears extraction subscriptions once the platform reports it has left
    /// fullscreen mode.
    pub fn report_fullscreen_mode(&self, enabled: bool) -> bool {
        self.run("report_fullscreen_mode", |shared| {
            if !shared.collaborators.platform.is_fullscreen_mode() {
                log::trace!("fullscreen mode off (reported {enabled}), dropping extract subscriptions");
                let mut inner = shared.inner.borrow_mut();
                inner.extract_always = false;
                inner.extract_token = None;
            }
            true
        })
    }

    pub fn clear_meta_key_states(&self, _states: u32) -> bool {
        self.run("clear_meta_key_states", |_| true)
    }

    pub fn commit_completion(&self, _text: &str) -> bool {
        self.run("commit_completion", |_| true)
    }

    pub fn commit_content(&self) -> bool {
        false
    }

    pub fn commit_correction(&self) -> bool {
        false
    }

    pub fn perform_editor_action(&self, _action: i32) -> bool {
        false
    }

    pub fn perform_private_command(&self, _action: &str) -> bool {
        false
    }

    pub fn request_cursor_updates(&self, _mode: i32) -> bool {
        false
    }

    /// The platform closing its side does not end the session; only the
    /// owner does.
    pub fn close_connection(&self) {}
}

impl fmt::Debug for EditSessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSessionHandle")
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/input_connection_tests.rs"]
mod tests;
