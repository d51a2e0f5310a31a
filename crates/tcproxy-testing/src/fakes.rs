//! Recording fakes for the edit session collaborators.

use std::cell::{Cell, RefCell};

use tcproxy_core::collections::map::HashMap;
use tcproxy_foundation::TextRange;
use tcproxy_ui::{
    CharSender, Clipboard, CursorAnchorInfo, EditSessionHandle, EditorInfo, ExtractedText,
    KeyCode, KeyEvent, KeyTranslator, PlatformInput, TextClassifier,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    StartInput(EditorInfo),
    FinishInput,
    RestartInput,
    SelectionUpdated {
        selection: TextRange,
        composition: Option<TextRange>,
    },
    ExtractedTextUpdated {
        token: i32,
        text: ExtractedText,
    },
    CursorAnchorUpdated(CursorAnchorInfo),
}

/// Platform input fake. Keeps the responder handed to `start_input` so tests
/// can play the input method.
#[derive(Default)]
pub struct RecordingPlatform {
    events: RefCell<Vec<PlatformEvent>>,
    handle: RefCell<Option<EditSessionHandle>>,
    fullscreen: Cell<bool>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlatformEvent> {
        self.events.borrow().clone()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take_events(&self) -> Vec<PlatformEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Responder from the most recent `start_input`, until `finish_input`.
    pub fn handle(&self) -> Option<EditSessionHandle> {
        self.handle.borrow().clone()
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }

    pub fn count(&self, matches: impl Fn(&PlatformEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|event| matches(event)).count()
    }

    fn record(&self, event: PlatformEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl PlatformInput for RecordingPlatform {
    fn restart_input(&self) {
        self.record(PlatformEvent::RestartInput);
    }

    fn update_selection(&self, selection: TextRange, composition: Option<TextRange>) {
        self.record(PlatformEvent::SelectionUpdated {
            selection,
            composition,
        });
    }

    fn update_extracted_text(&self, token: i32, text: &ExtractedText) {
        self.record(PlatformEvent::ExtractedTextUpdated {
            token,
            text: text.clone(),
        });
    }

    fn update_cursor_anchor_info(&self, info: &CursorAnchorInfo) {
        self.record(PlatformEvent::CursorAnchorUpdated(info.clone()));
    }

    fn is_fullscreen_mode(&self) -> bool {
        self.fullscreen.get()
    }

    fn start_input(&self, info: EditorInfo, handle: EditSessionHandle) {
        self.record(PlatformEvent::StartInput(info));
        *self.handle.borrow_mut() = Some(handle);
    }

    fn finish_input(&self) {
        self.record(PlatformEvent::FinishInput);
        self.handle.borrow_mut().take();
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    contents: RefCell<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            contents: RefCell::new(Some(text.to_owned())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Option<String> {
        self.contents()
    }

    fn write(&self, text: &str) {
        *self.contents.borrow_mut() = Some(text.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingCharSender {
    enters: Cell<usize>,
}

impl RecordingCharSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_count(&self) -> usize {
        self.enters.get()
    }
}

impl CharSender for RecordingCharSender {
    fn send_enter(&self) {
        self.enters.set(self.enters.get() + 1);
    }
}

/// Key translator backed by a fixed code-to-index table.
#[derive(Default)]
pub struct TableKeyTranslator {
    table: HashMap<KeyCode, usize>,
    executed: RefCell<Vec<(KeyEvent, usize)>>,
}

impl TableKeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, code: KeyCode, index: usize) -> Self {
        self.table.insert(code, index);
        self
    }

    pub fn executed(&self) -> Vec<(KeyEvent, usize)> {
        self.executed.borrow().clone()
    }
}

impl KeyTranslator for TableKeyTranslator {
    fn lookup(&self, code: KeyCode) -> Option<usize> {
        self.table.get(&code).copied()
    }

    fn execute(&self, event: &KeyEvent, index: usize) {
        self.executed.borrow_mut().push((event.clone(), index));
    }
}

/// Classifier answering every query with the same mode bits.
#[derive(Default)]
pub struct FixedClassifier {
    mode: u32,
    offsets: RefCell<Vec<usize>>,
}

impl FixedClassifier {
    pub fn new(mode: u32) -> Self {
        Self {
            mode,
            offsets: RefCell::new(Vec::new()),
        }
    }

    /// Offsets the classifier was asked about, in order.
    pub fn queried_offsets(&self) -> Vec<usize> {
        self.offsets.borrow().clone()
    }
}

impl TextClassifier for FixedClassifier {
    fn caps_mode(&self, _text: &str, offset: usize, req_modes: u32) -> u32 {
        self.offsets.borrow_mut().push(offset);
        self.mode & req_modes
    }
}
