//! Edit session controller and pointer proxy mapper.
//!
//! [`EditSession`] answers the platform input method on behalf of a text
//! field that lives on the remote proxy. [`PointerProxyMapper`] turns host
//! pointer events into the proxy's add/remove pointer calls. The two share
//! nothing beyond read-only surface metrics.

pub mod config;
pub mod cursor_anchor;
mod input_connection;
pub mod key_event;
pub mod platform;
pub mod pointer_proxy;

pub use config::{InputType, SessionConfig};
pub use cursor_anchor::{CursorAnchorInfo, InsertionMarker};
pub use input_connection::{EditSession, EditSessionHandle, SessionCollaborators, SessionPhase};
pub use key_event::{KeyAction, KeyCode, KeyEvent, Modifiers};
pub use platform::{
    CharSender, Clipboard, ContextMenuId, EditorInfo, ExtractedText, ExtractedTextRequest,
    KeyTranslator, PlatformInput, TextClassifier,
};
pub use pointer_proxy::{
    run_pointer_proxy, PointerProxyMapper, PointerTarget, ProxyPointerId, SurfaceMetrics,
};
