//! Proxy bridge for the TouchController remote input proxy.
//!
//! Wires an [`EditSession`](tcproxy_ui::EditSession) and a
//! [`PointerProxyMapper`](tcproxy_ui::PointerProxyMapper) to a remote
//! [`ProxyClient`] through a [`ProxyConnection`], running everything as tasks
//! on a [`Runtime`](tcproxy_core::Runtime).

mod bridge;
mod client;
mod error;
mod handler;

pub use bridge::{ProxyBridge, ProxyBridgeBuilder};
pub use client::{InputHandler, ProxyClient, ProxyConnection};
pub use error::BridgeError;
