//! The remote proxy as the bridge sees it.

use std::fmt;
use std::rc::Rc;

use tcproxy_core::{Changed, StateCell};
use tcproxy_foundation::{FloatRect, TextInputState};
use tcproxy_ui::{PointerTarget, ProxyPointerId};

/// Outbound half of the remote proxy protocol.
pub trait ProxyClient {
    fn update_text_input_state(&self, state: &TextInputState);
    fn add_pointer(&self, id: ProxyPointerId, x: f32, y: f32);
    fn remove_pointer(&self, id: ProxyPointerId);
    /// Registers (or with `None`, clears) the receiver of inbound messages.
    fn set_input_handler(&self, handler: Option<Rc<dyn InputHandler>>);
}

/// Inbound half: what the remote calls on the bridge.
///
/// Rectangles are normalised to the surface (`0.0..=1.0`).
pub trait InputHandler {
    /// A new text field state, or `None` to end the edit session.
    fn update_state(&self, state: Option<TextInputState>);
    fn update_cursor(&self, rect: Option<FloatRect>);
    fn update_area(&self, rect: Option<FloatRect>);
}

/// Shared, observable slot holding the current remote client.
///
/// Clones share the slot. Replacing the client wakes whoever observes it;
/// the bridge uses that to re-register its input handler.
#[derive(Clone, Default)]
pub struct ProxyConnection {
    current: StateCell<Option<Rc<dyn ProxyClient>>>,
}

impl ProxyConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, client: Rc<dyn ProxyClient>) {
        log::debug!("proxy client connected");
        self.current.replace(Some(client));
    }

    pub fn disconnect(&self) {
        if self.current.replace(None).is_some() {
            log::debug!("proxy client disconnected");
        }
    }

    pub fn current(&self) -> Option<Rc<dyn ProxyClient>> {
        self.current.get()
    }

    pub fn is_connected(&self) -> bool {
        self.current.with(Option::is_some)
    }

    /// Forwards a locally committed state. Dropped when nothing is connected.
    pub fn send_state(&self, state: &TextInputState) {
        match self.current() {
            Some(client) => client.update_text_input_state(state),
            None => log::trace!("no proxy client, dropping state update"),
        }
    }

    pub(crate) fn version(&self) -> u64 {
        self.current.version()
    }

    pub(crate) fn changed_since(&self, seen: u64) -> Changed<Option<Rc<dyn ProxyClient>>> {
        self.current.changed_since(seen)
    }
}

impl PointerTarget for ProxyConnection {
    fn add_pointer(&self, id: ProxyPointerId, x: f32, y: f32) {
        match self.current() {
            Some(client) => client.add_pointer(id, x, y),
            None => log::trace!("no proxy client, dropping pointer {id}"),
        }
    }

    fn remove_pointer(&self, id: ProxyPointerId) {
        match self.current() {
            Some(client) => client.remove_pointer(id),
            None => log::trace!("no proxy client, dropping release of pointer {id}"),
        }
    }
}

impl fmt::Debug for ProxyConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConnection")
            .field("connected", &self.is_connected())
            .field("version", &self.version())
            .finish()
    }
}
