//! Text measurement, wrapping and positioning.

pub(crate) mod builtin;
/// Outline and built-in faces bound to a run.
pub mod face;
/// Greedy wrap with shrink-to-fit sizing.
pub mod layout;

pub use face::{FaceHandle, PositionedGlyph, TextFace};
pub use layout::{LayoutConfig, LayoutLine, LayoutResult, TextLayoutEngine, VerticalAnchor};
