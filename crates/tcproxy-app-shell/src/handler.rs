//! Inbound handler the bridge registers on the remote client.

use std::rc::Rc;

use tcproxy_core::{Sender, StateCell};
use tcproxy_foundation::{FloatRect, IntRect, TextInputState};
use tcproxy_ui::SurfaceMetrics;

use crate::client::InputHandler;

pub(crate) enum RemoteMessage {
    State(TextInputState),
    Terminate,
}

pub(crate) type RectHook = Box<dyn Fn(Option<IntRect>)>;

/// Optional observers of the caret and input area rectangles.
#[derive(Default)]
pub(crate) struct RectHooks {
    pub(crate) on_cursor_rect: Option<RectHook>,
    pub(crate) on_area_rect: Option<RectHook>,
}

/// Latest caret and input area rectangles, in device pixels.
#[derive(Clone, Default)]
pub(crate) struct RectCells {
    pub(crate) caret: StateCell<Option<IntRect>>,
    pub(crate) area: StateCell<Option<IntRect>>,
}

pub(crate) struct BridgeInputHandler {
    messages: Sender<RemoteMessage>,
    metrics: Rc<dyn SurfaceMetrics>,
    rects: RectCells,
    hooks: Rc<RectHooks>,
}

impl BridgeInputHandler {
    pub(crate) fn new(
        messages: Sender<RemoteMessage>,
        metrics: Rc<dyn SurfaceMetrics>,
        rects: RectCells,
        hooks: Rc<RectHooks>,
    ) -> Self {
        Self {
            messages,
            metrics,
            rects,
            hooks,
        }
    }

    fn to_device(&self, rect: Option<FloatRect>) -> Option<IntRect> {
        rect.map(|rect| rect.to_device(self.metrics.surface_size()))
    }
}

impl InputHandler for BridgeInputHandler {
    fn update_state(&self, state: Option<TextInputState>) {
        let message = match state {
            Some(state) => RemoteMessage::State(state),
            None => RemoteMessage::Terminate,
        };
        if self.messages.send(message).is_err() {
            log::trace!("bridge detached, dropping remote state");
        }
    }

    fn update_cursor(&self, rect: Option<FloatRect>) {
        let rect = self.to_device(rect);
        self.rects.caret.set(rect);
        if let Some(hook) = &self.hooks.on_cursor_rect {
            hook(rect);
        }
    }

    fn update_area(&self, rect: Option<FloatRect>) {
        let rect = self.to_device(rect);
        self.rects.area.set(rect);
        if let Some(hook) = &self.hooks.on_area_rect {
            hook(rect);
        }
    }
}
