use std::cell::RefCell;
use std::rc::Rc;

use tcproxy_app_shell::{ProxyBridge, ProxyConnection};
use tcproxy_core::Runtime;
use tcproxy_foundation::{FloatRect, IntRect, PointerEvent, TextInputState};
use tcproxy_ui::{EditSessionHandle, KeyCode, SessionConfig};

use crate::fakes::{
    FixedClassifier, MemoryClipboard, RecordingCharSender, RecordingPlatform, TableKeyTranslator,
};
use crate::proxy::{FixedMetrics, RecordingProxyClient};

/// Surface size every [`BridgeTestRule`] starts with.
pub const TEST_SURFACE_WIDTH: f32 = 1080.0;
pub const TEST_SURFACE_HEIGHT: f32 = 2400.0;

/// Headless harness for exercising a [`ProxyBridge`] end to end.
///
/// Owns a private [`Runtime`], a bridge attached to it, a connected
/// [`RecordingProxyClient`] and recording fakes for every collaborator. Each
/// helper that feeds input drains the runtime before returning, so tests can
/// assert on the fakes straight away.
pub struct BridgeTestRule {
    pub bridge: ProxyBridge,
    pub connection: ProxyConnection,
    pub client: Rc<RecordingProxyClient>,
    pub platform: Rc<RecordingPlatform>,
    pub keys: Rc<TableKeyTranslator>,
    pub chars: Rc<RecordingCharSender>,
    pub clipboard: Rc<MemoryClipboard>,
    pub classifier: Rc<FixedClassifier>,
    pub metrics: Rc<FixedMetrics>,
    cursor_hook_calls: Rc<RefCell<Vec<Option<IntRect>>>>,
    area_hook_calls: Rc<RefCell<Vec<Option<IntRect>>>>,
    runtime: Runtime,
}

impl BridgeTestRule {
    /// Default session config and an empty key table.
    pub fn new() -> Self {
        Self::with_setup(SessionConfig::default(), TableKeyTranslator::new())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_setup(config, TableKeyTranslator::new())
    }

    pub fn with_keys(keys: TableKeyTranslator) -> Self {
        Self::with_setup(SessionConfig::default(), keys)
    }

    /// # Panics
    ///
    /// If the bridge fails to build or attach, which means the harness itself
    /// is broken.
    pub fn with_setup(config: SessionConfig, keys: TableKeyTranslator) -> Self {
        crate::init_test_logging();
        let runtime = Runtime::new();
        let connection = ProxyConnection::new();
        let client = Rc::new(RecordingProxyClient::new());
        let platform = Rc::new(RecordingPlatform::new());
        let keys = Rc::new(keys);
        let chars = Rc::new(RecordingCharSender::new());
        let clipboard = Rc::new(MemoryClipboard::new());
        let classifier = Rc::new(FixedClassifier::new(0));
        let metrics = Rc::new(FixedMetrics::new(TEST_SURFACE_WIDTH, TEST_SURFACE_HEIGHT));
        let cursor_hook_calls = Rc::new(RefCell::new(Vec::new()));
        let area_hook_calls = Rc::new(RefCell::new(Vec::new()));

        let cursor_sink = Rc::clone(&cursor_hook_calls);
        let area_sink = Rc::clone(&area_hook_calls);
        let mut bridge = ProxyBridge::builder(connection.clone())
            .platform(platform.clone())
            .key_translator(keys.clone())
            .char_sender(chars.clone())
            .metrics(metrics.clone())
            .clipboard(clipboard.clone())
            .classifier(classifier.clone())
            .config(config)
            .on_cursor_rect(move |rect| cursor_sink.borrow_mut().push(rect))
            .on_area_rect(move |rect| area_sink.borrow_mut().push(rect))
            .build()
            .expect("harness supplies every collaborator");
        bridge
            .attach(&runtime.handle())
            .expect("fresh runtime accepts the bridge");
        connection.connect(client.clone());

        let rule = Self {
            bridge,
            connection,
            client,
            platform,
            keys,
            chars,
            clipboard,
            classifier,
            metrics,
            cursor_hook_calls,
            area_hook_calls,
            runtime,
        };
        rule.pump_until_idle();
        rule
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Drives the runtime until no task is woken.
    pub fn pump_until_idle(&self) {
        self.runtime.run_until_idle();
    }

    /// Pushes a remote state (or a terminator) and drains the runtime.
    pub fn push_state(&self, state: Option<TextInputState>) {
        self.client.push_state(state);
        self.pump_until_idle();
    }

    pub fn start_session(&self, text: &str) -> EditSessionHandle {
        self.push_state(Some(TextInputState::with_text(text)));
        match self.bridge.active_session() {
            Some(handle) => handle,
            None => panic!("remote state did not start a session"),
        }
    }

    pub fn push_cursor(&self, rect: Option<FloatRect>) {
        self.client.push_cursor(rect);
        self.pump_until_idle();
    }

    pub fn push_area(&self, rect: Option<FloatRect>) {
        self.client.push_area(rect);
        self.pump_until_idle();
    }

    /// Delivers a host pointer event to the bridge and drains the runtime.
    pub fn send_pointer(&self, event: PointerEvent) {
        if let Some(sender) = self.bridge.pointer_events() {
            if sender.send(event).is_err() {
                log::warn!("pointer loop is gone; event dropped");
            }
        }
        self.pump_until_idle();
    }

    /// Rectangles handed to the `on_cursor_rect` hook so far.
    pub fn cursor_hook_calls(&self) -> Vec<Option<IntRect>> {
        self.cursor_hook_calls.borrow().clone()
    }

    pub fn area_hook_calls(&self) -> Vec<Option<IntRect>> {
        self.area_hook_calls.borrow().clone()
    }

    /// Builds a translator table for [`BridgeTestRule::with_keys`].
    pub fn key_table(entries: &[(KeyCode, usize)]) -> TableKeyTranslator {
        entries
            .iter()
            .fold(TableKeyTranslator::new(), |table, &(code, index)| {
                table.with_key(code, index)
            })
    }
}

impl Default for BridgeTestRule {
    fn default() -> Self {
        Self::new()
    }
}
