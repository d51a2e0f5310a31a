//! Proxy bridge: keeps an edit session in step with the remote proxy and
//! forwards pointer input to it.
//!
//! An attached bridge runs three tasks on the host's [`Runtime`](tcproxy_core::Runtime):
//!
//! - the connection observer registers the inbound handler on every client
//!   the [`ProxyConnection`] is given;
//! - the session loop consumes remote state pushes in order, starting a
//!   session on the first state and ending it on a terminator;
//! - the pointer loop maps host pointer events to proxy pointers.
//!
//! While a session is live a fourth task reports caret geometry to the
//! platform whenever either rectangle changes.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use tcproxy_core::{channel, collect_latest2, Receiver, RuntimeHandle, Sender, TaskHandle};
use tcproxy_foundation::{IntRect, PointerEvent, TextInputState};
use tcproxy_ui::{
    run_pointer_proxy, CharSender, Clipboard, EditSession, EditSessionHandle, KeyTranslator,
    PlatformInput, PointerTarget, SessionCollaborators, SessionConfig, SurfaceMetrics,
    TextClassifier,
};

use crate::client::{InputHandler, ProxyConnection};
use crate::error::BridgeError;
use crate::handler::{BridgeInputHandler, RectCells, RectHook, RectHooks, RemoteMessage};

/// Collects the bridge's collaborators. See [`ProxyBridge::builder`].
pub struct ProxyBridgeBuilder {
    connection: ProxyConnection,
    platform: Option<Rc<dyn PlatformInput>>,
    key_translator: Option<Rc<dyn KeyTranslator>>,
    char_sender: Option<Rc<dyn CharSender>>,
    metrics: Option<Rc<dyn SurfaceMetrics>>,
    clipboard: Option<Rc<dyn Clipboard>>,
    classifier: Option<Rc<dyn TextClassifier>>,
    config: SessionConfig,
    hooks: RectHooks,
}

impl ProxyBridgeBuilder {
    pub fn platform(mut self, platform: Rc<dyn PlatformInput>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn key_translator(mut self, key_translator: Rc<dyn KeyTranslator>) -> Self {
        self.key_translator = Some(key_translator);
        self
    }

    pub fn char_sender(mut self, char_sender: Rc<dyn CharSender>) -> Self {
        self.char_sender = Some(char_sender);
        self
    }

    pub fn metrics(mut self, metrics: Rc<dyn SurfaceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn clipboard(mut self, clipboard: Rc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn classifier(mut self, classifier: Rc<dyn TextClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Called with every caret rectangle the remote reports, in device pixels.
    pub fn on_cursor_rect(mut self, hook: impl Fn(Option<IntRect>) + 'static) -> Self {
        self.hooks.on_cursor_rect = Some(Box::new(hook) as RectHook);
        self
    }

    /// Called with every input area rectangle the remote reports.
    pub fn on_area_rect(mut self, hook: impl Fn(Option<IntRect>) + 'static) -> Self {
        self.hooks.on_area_rect = Some(Box::new(hook) as RectHook);
        self
    }

    pub fn build(self) -> Result<ProxyBridge, BridgeError> {
        let platform = required(self.platform, "platform input")?;
        let key_translator = required(self.key_translator, "key translator")?;
        let char_sender = required(self.char_sender, "char sender")?;
        let metrics = required(self.metrics, "surface metrics")?;
        Ok(ProxyBridge {
            connection: self.connection,
            collaborators: SessionCollaborators {
                platform,
                key_translator,
                char_sender,
                clipboard: self.clipboard,
                classifier: self.classifier,
            },
            metrics,
            config: self.config,
            hooks: Rc::new(self.hooks),
            rects: RectCells::default(),
            current_session: Rc::new(RefCell::new(None)),
            attached: None,
        })
    }
}

fn spawn_on(
    runtime: &RuntimeHandle,
    future: impl Future<Output = ()> + 'static,
) -> Result<TaskHandle, BridgeError> {
    runtime
        .spawn(future)
        .ok_or(BridgeError::RuntimeUnavailable)
}

fn required<T>(value: Option<T>, name: &'static str) -> Result<T, BridgeError> {
    value.ok_or_else(|| {
        log::error!("proxy bridge cannot start without a {name}");
        BridgeError::MissingCollaborator(name)
    })
}

struct Attached {
    tasks: Vec<TaskHandle>,
    pointer_events: Sender<PointerEvent>,
    handler: Rc<BridgeInputHandler>,
}

/// Bridges one remote text field and the host's pointer input to the proxy.
pub struct ProxyBridge {
    connection: ProxyConnection,
    collaborators: SessionCollaborators,
    metrics: Rc<dyn SurfaceMetrics>,
    config: SessionConfig,
    hooks: Rc<RectHooks>,
    rects: RectCells,
    current_session: Rc<RefCell<Option<EditSessionHandle>>>,
    attached: Option<Attached>,
}

impl ProxyBridge {
    pub fn builder(connection: ProxyConnection) -> ProxyBridgeBuilder {
        ProxyBridgeBuilder {
            connection,
            platform: None,
            key_translator: None,
            char_sender: None,
            metrics: None,
            clipboard: None,
            classifier: None,
            config: SessionConfig::default(),
            hooks: RectHooks::default(),
        }
    }

    /// Spawns the bridge tasks on `runtime`.
    pub fn attach(&mut self, runtime: &RuntimeHandle) -> Result<(), BridgeError> {
        if self.attached.is_some() {
            return Err(BridgeError::AlreadyAttached);
        }
        if !runtime.is_alive() {
            log::error!("cannot attach proxy bridge: runtime has been dropped");
            return Err(BridgeError::RuntimeUnavailable);
        }
        let (message_tx, message_rx) = channel();
        let handler = Rc::new(BridgeInputHandler::new(
            message_tx,
            Rc::clone(&self.metrics),
            self.rects.clone(),
            Rc::clone(&self.hooks),
        ));
        let (pointer_tx, pointer_rx) = channel();

        let input_handler: Rc<dyn InputHandler> = handler.clone();
        let context = SessionContext {
            runtime: runtime.clone(),
            connection: self.connection.clone(),
            collaborators: self.collaborators.clone(),
            config: self.config.clone(),
            rects: self.rects.clone(),
            current: Rc::clone(&self.current_session),
        };
        let target: Rc<dyn PointerTarget> = Rc::new(self.connection.clone());
        let tasks = vec![
            spawn_on(
                runtime,
                observe_connection(self.connection.clone(), input_handler),
            )?,
            spawn_on(runtime, run_session_loop(message_rx, context))?,
            spawn_on(
                runtime,
                run_pointer_proxy(pointer_rx, target, Rc::clone(&self.metrics)),
            )?,
        ];

        log::debug!("proxy bridge attached");
        self.attached = Some(Attached {
            tasks,
            pointer_events: pointer_tx,
            handler,
        });
        Ok(())
    }

    /// Cancels the bridge tasks, ending any live session, and unregisters the
    /// input handler from the current client.
    pub fn detach(&mut self) {
        let Some(attached) = self.attached.take() else {
            return;
        };
        for task in attached.tasks {
            task.cancel();
        }
        if let Some(client) = self.connection.current() {
            client.set_input_handler(None);
        }
        drop(attached.handler);
        log::debug!("proxy bridge detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Where host pointer events go. `None` while detached.
    pub fn pointer_events(&self) -> Option<Sender<PointerEvent>> {
        self.attached
            .as_ref()
            .map(|attached| attached.pointer_events.clone())
    }

    /// Responder for the live edit session, if one is running.
    pub fn active_session(&self) -> Option<EditSessionHandle> {
        self.current_session.borrow().clone()
    }

    pub fn connection(&self) -> &ProxyConnection {
        &self.connection
    }

    /// Latest caret rectangle reported by the remote, in device pixels.
    pub fn cursor_rect(&self) -> Option<IntRect> {
        self.rects.caret.get()
    }

    /// Latest input area rectangle reported by the remote, in device pixels.
    pub fn area_rect(&self) -> Option<IntRect> {
        self.rects.area.get()
    }
}

impl Drop for ProxyBridge {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for ProxyBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyBridge")
            .field("connection", &self.connection)
            .field("attached", &self.is_attached())
            .field("session", &self.active_session().is_some())
            .finish()
    }
}

async fn observe_connection(connection: ProxyConnection, handler: Rc<dyn InputHandler>) {
    loop {
        let seen = connection.version();
        if let Some(client) = connection.current() {
            log::debug!("registering input handler on proxy client");
            client.set_input_handler(Some(Rc::clone(&handler)));
        }
        connection.changed_since(seen).await;
    }
}

struct SessionContext {
    runtime: RuntimeHandle,
    connection: ProxyConnection,
    collaborators: SessionCollaborators,
    config: SessionConfig,
    rects: RectCells,
    current: Rc<RefCell<Option<EditSessionHandle>>>,
}

/// A live session plus the task reporting its caret geometry. Dropping it
/// ends both.
struct ActiveSession {
    session: Rc<EditSession>,
    rect_task: Option<TaskHandle>,
    current: Rc<RefCell<Option<EditSessionHandle>>>,
}

impl ActiveSession {
    fn start(initial: TextInputState, context: &SessionContext) -> Self {
        let connection = context.connection.clone();
        let session = Rc::new(EditSession::start(
            initial,
            context.collaborators.clone(),
            context.config.clone(),
            move |state| connection.send_state(state),
        ));

        let weak: Weak<EditSession> = Rc::downgrade(&session);
        let rect_task = context.runtime.spawn(collect_latest2(
            context.rects.caret.clone(),
            context.rects.area.clone(),
            move |caret, area| {
                if let Some(session) = weak.upgrade() {
                    session.update_cursor_anchor(caret, area);
                }
            },
        ));
        *context.current.borrow_mut() = Some(session.handle());
        Self {
            session,
            rect_task,
            current: Rc::clone(&context.current),
        }
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        if let Some(task) = self.rect_task.take() {
            task.cancel();
        }
        self.current.borrow_mut().take();
        self.session.terminate();
    }
}

async fn run_session_loop(messages: Receiver<RemoteMessage>, context: SessionContext) {
    loop {
        let initial = match messages.recv().await {
            Some(RemoteMessage::State(state)) => state,
            Some(RemoteMessage::Terminate) => continue,
            None => return,
        };
        let active = ActiveSession::start(initial, &context);
        loop {
            match messages.recv().await {
                Some(RemoteMessage::State(state)) => active.session.update_state(state),
                Some(RemoteMessage::Terminate) => break,
                None => return,
            }
        }
        log::debug!("remote ended the edit session");
    }
}
