//! Drawable output of the renderer.
//!
//! A [`Scene`] is a flat, back-to-front list of primitives. It carries no
//! behavior beyond inspection helpers; backends (SVG, a GPU canvas, tests)
//! walk the list and draw.

use kurbo::{Circle, Line, Point, Rect, Size};
use lockscope_types::NodeKind;
use palette::Srgb;

/// Three points of a filled arrowhead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeShape {
    Circle(Circle),
    Square(Rect),
}

impl NodeShape {
    pub fn center(&self) -> Point {
        match self {
            NodeShape::Circle(c) => c.center,
            NodeShape::Square(r) => r.center(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelRole {
    /// The node's identifier, centered on the node.
    NodeId,
    /// `available/total` under a resource node.
    Availability,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Edge {
        source: String,
        target: String,
        line: Line,
        head: ArrowHead,
        color: Srgb<u8>,
        width: f64,
    },
    Node {
        id: String,
        kind: NodeKind,
        shape: NodeShape,
        fill: Srgb<u8>,
        stroke: Srgb<u8>,
        stroke_width: f64,
        deadlocked: bool,
    },
    Label {
        text: String,
        role: LabelRole,
        position: Point,
        font_size: f64,
        color: Srgb<u8>,
    },
    Placeholder {
        text: String,
        position: Point,
        font_size: f64,
        color: Srgb<u8>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub background: Srgb<u8>,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(size: Size, background: Srgb<u8>) -> Self {
        Self {
            size,
            background,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn edges(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(|p| matches!(p, Primitive::Edge { .. }))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(|p| matches!(p, Primitive::Node { .. }))
    }

    pub fn labels(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(|p| matches!(p, Primitive::Label { .. }))
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.primitives.iter().find_map(|p| match p {
            Primitive::Placeholder { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn count_circles(&self) -> usize {
        self.nodes()
            .filter(|p| {
                matches!(
                    p,
                    Primitive::Node {
                        shape: NodeShape::Circle(_),
                        ..
                    }
                )
            })
            .count()
    }

    pub fn count_squares(&self) -> usize {
        self.nodes()
            .filter(|p| {
                matches!(
                    p,
                    Primitive::Node {
                        shape: NodeShape::Square(_),
                        ..
                    }
                )
            })
            .count()
    }

    /// Ids of nodes drawn with the deadlock highlight.
    pub fn deadlocked_ids(&self) -> Vec<&str> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Node {
                    id,
                    deadlocked: true,
                    ..
                } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}
