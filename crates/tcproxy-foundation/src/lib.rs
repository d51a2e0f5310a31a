//! Foundation types for the TouchController proxy bridge.
//!
//! This crate has no I/O and no runtime: the text buffer engine, plus the
//! geometry and pointer types shared by the session controller and the
//! pointer mapper.

pub mod geometry;
pub mod pointer;
pub mod text;

pub use geometry::{FloatRect, IntRect, Point, Size};
pub use pointer::{PointerChange, PointerEvent, PointerEventKind, PointerId};
pub use text::{TextInputState, TextRange};
