//! Graph layout and rendering for lockscope.
//!
//! Pure functions over snapshot data, with no I/O and no state between
//! frames:
//!
//! ```text
//! SystemSnapshot ─▶ NodeLayout::compute ─▶ GraphRenderer::render ─▶ Scene ─▶ to_svg
//!                   (circle positions)      (primitives)
//! ```

pub mod layout;
pub mod render;
pub mod scene;
pub mod svg;
pub mod theme;

pub use layout::{NodeLayout, RADIUS_FACTOR, circle_positions, layout_center, layout_radius};
pub use render::{GraphRenderer, arrow_head};
pub use scene::{ArrowHead, LabelRole, NodeShape, Primitive, Scene};
pub use theme::Theme;

pub use kurbo::{Point, Size};
