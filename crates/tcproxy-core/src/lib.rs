//! Runtime primitives for the TouchController proxy bridge.
//!
//! Each independent event source in the bridge gets one cooperative task on a
//! [`Runtime`]. Tasks talk to each other only through [`channel`]s and
//! observed [`StateCell`] values; nothing here is `Send`, and nothing needs a
//! lock.

mod channel;
pub mod collections;
mod runtime;
mod state;

pub use channel::{channel, Receiver, Recv, Sender};
pub use runtime::{Runtime, RuntimeHandle, TaskHandle};
pub use state::{collect_latest2, Changed, StateCell};
