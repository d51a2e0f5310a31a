//! Collaborators the edit session talks to.
//!
//! The session is a passive responder: the platform input framework calls
//! into an [`EditSessionHandle`], and the session reports back through
//! [`PlatformInput`]. None of these may call back into the handle
//! synchronously; the session state is borrowed while some of them run.

use crate::config::InputType;
use crate::cursor_anchor::CursorAnchorInfo;
use crate::input_connection::EditSessionHandle;
use crate::key_event::{KeyCode, KeyEvent};
use tcproxy_foundation::{TextInputState, TextRange};

/// The host's input method framework.
pub trait PlatformInput {
    /// The cached editing context is stale (the text changed underneath the
    /// input method) and must be rebuilt.
    fn restart_input(&self);

    fn update_selection(&self, selection: TextRange, composition: Option<TextRange>);

    fn update_extracted_text(&self, token: i32, text: &ExtractedText);

    fn update_cursor_anchor_info(&self, info: &CursorAnchorInfo);

    fn is_fullscreen_mode(&self) -> bool;

    /// Opens an input session. `handle` stays valid until
    /// [`PlatformInput::finish_input`]; afterwards every call on it is a no-op.
    fn start_input(&self, info: EditorInfo, handle: EditSessionHandle);

    fn finish_input(&self);
}

pub trait Clipboard {
    fn read(&self) -> Option<String>;
    fn write(&self, text: &str);
}

/// Maps platform key codes the session does not handle itself onto the
/// game's key table.
pub trait KeyTranslator {
    fn lookup(&self, code: KeyCode) -> Option<usize>;
    fn execute(&self, event: &KeyEvent, index: usize);
}

/// Sends raw characters to the game.
pub trait CharSender {
    fn send_enter(&self);
}

/// Capitalization rules of the current locale.
pub trait TextClassifier {
    fn caps_mode(&self, text: &str, offset: usize, req_modes: u32) -> u32;
}

/// Full-text snapshot pushed to (or pulled by) the input method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub selection_start: usize,
    pub selection_end: usize,
    pub start_offset: usize,
    /// `-1` marks the snapshot as complete rather than a partial update.
    pub partial_start_offset: i32,
    pub partial_end_offset: i32,
}

impl ExtractedText {
    pub fn from_state(state: &TextInputState) -> Self {
        Self {
            text: state.text.clone(),
            selection_start: state.selection.start,
            selection_end: state.selection.end(),
            start_offset: 0,
            partial_start_offset: -1,
            partial_end_offset: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ExtractedTextRequest {
    /// `0` subscribes to every future change; any other value is remembered
    /// and echoed back with later pushes.
    pub token: i32,
}

/// What the platform is told about the field when a session starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorInfo {
    pub initial_text: String,
    pub initial_selection: TextRange,
    pub input_type: InputType,
}

impl EditorInfo {
    pub fn from_state(state: &TextInputState, input_type: InputType) -> Self {
        Self {
            initial_text: state.text.clone(),
            initial_selection: state.selection,
            input_type,
        }
    }
}

/// Context menu action ids, numbered as the platform numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextMenuId(pub i32);

impl ContextMenuId {
    pub const SELECT_ALL: ContextMenuId = ContextMenuId(0x0102_001f);
    pub const CUT: ContextMenuId = ContextMenuId(0x0102_0020);
    pub const COPY: ContextMenuId = ContextMenuId(0x0102_0021);
    pub const PASTE: ContextMenuId = ContextMenuId(0x0102_0022);
}
