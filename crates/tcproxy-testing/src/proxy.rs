//! Fakes for the remote proxy side of the bridge.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tcproxy_app_shell::{InputHandler, ProxyClient};
use tcproxy_foundation::{FloatRect, Size, TextInputState};
use tcproxy_ui::{ProxyPointerId, SurfaceMetrics};

#[derive(Debug, Clone, PartialEq)]
pub enum ProxyEvent {
    StateUpdated(TextInputState),
    PointerAdded { id: ProxyPointerId, x: f32, y: f32 },
    PointerRemoved(ProxyPointerId),
}

/// Remote client fake. Records outbound calls and lets tests push inbound
/// messages through whatever handler the bridge registered.
#[derive(Default)]
pub struct RecordingProxyClient {
    events: RefCell<Vec<ProxyEvent>>,
    handler: RefCell<Option<Rc<dyn InputHandler>>>,
    registrations: Cell<usize>,
}

impl RecordingProxyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProxyEvent> {
        self.events.borrow().clone()
    }

    pub fn take_events(&self) -> Vec<ProxyEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// States the bridge pushed, oldest first.
    pub fn sent_states(&self) -> Vec<TextInputState> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ProxyEvent::StateUpdated(state) => Some(state.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// How many times a handler (not `None`) was registered.
    pub fn handler_registrations(&self) -> usize {
        self.registrations.get()
    }

    /// Sends a state (or, with `None`, a terminator) as the remote would.
    /// Returns false when no handler is registered.
    pub fn push_state(&self, state: Option<TextInputState>) -> bool {
        self.with_handler(|handler| handler.update_state(state))
    }

    pub fn push_cursor(&self, rect: Option<FloatRect>) -> bool {
        self.with_handler(|handler| handler.update_cursor(rect))
    }

    pub fn push_area(&self, rect: Option<FloatRect>) -> bool {
        self.with_handler(|handler| handler.update_area(rect))
    }

    fn with_handler(&self, f: impl FnOnce(&dyn InputHandler)) -> bool {
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => {
                f(handler.as_ref());
                true
            }
            None => false,
        }
    }
}

impl ProxyClient for RecordingProxyClient {
    fn update_text_input_state(&self, state: &TextInputState) {
        self.events
            .borrow_mut()
            .push(ProxyEvent::StateUpdated(state.clone()));
    }

    fn add_pointer(&self, id: ProxyPointerId, x: f32, y: f32) {
        self.events
            .borrow_mut()
            .push(ProxyEvent::PointerAdded { id, x, y });
    }

    fn remove_pointer(&self, id: ProxyPointerId) {
        self.events.borrow_mut().push(ProxyEvent::PointerRemoved(id));
    }

    fn set_input_handler(&self, handler: Option<Rc<dyn InputHandler>>) {
        if handler.is_some() {
            self.registrations.set(self.registrations.get() + 1);
        }
        *self.handler.borrow_mut() = handler;
    }
}

/// Surface metrics with a settable size.
pub struct FixedMetrics {
    size: Cell<Size>,
}

impl FixedMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Cell::new(Size::new(width, height)),
        }
    }

    pub fn set_size(&self, width: f32, height: f32) {
        self.size.set(Size::new(width, height));
    }
}

impl SurfaceMetrics for FixedMetrics {
    fn surface_size(&self) -> Size {
        self.size.get()
    }
}
