//! Text buffer engine: ranges, input state and the pure edit operations the
//! edit session applies on behalf of the input method.

mod edit;
mod range;
mod state;
pub mod utf16;

pub use range::TextRange;
pub use state::TextInputState;
