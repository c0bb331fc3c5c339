//! Circle layout.
//!
//! Nodes sit on one circle around the canvas center, evenly spaced, in input
//! order. The result depends only on node count and canvas size, so the same
//! graph lands in the same place every frame.

use std::f64::consts::TAU;

use indexmap::IndexMap;
use kurbo::{Point, Size};
use lockscope_types::GraphNode;

/// Layout radius as a fraction of the half-extent of the shorter canvas side.
pub const RADIUS_FACTOR: f64 = 0.7;

/// Canvas with non-finite or negative dimensions clamped to zero.
fn sanitize(canvas: Size) -> Size {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    Size::new(clean(canvas.width), clean(canvas.height))
}

pub fn layout_center(canvas: Size) -> Point {
    let canvas = sanitize(canvas);
    Point::new(canvas.width / 2.0, canvas.height / 2.0)
}

pub fn layout_radius(canvas: Size) -> f64 {
    let canvas = sanitize(canvas);
    RADIUS_FACTOR * (canvas.width / 2.0).min(canvas.height / 2.0)
}

/// Positions for `count` nodes, starting at angle 0 (3 o'clock) and stepping
/// by `2π / count` in screen orientation.
pub fn circle_positions(count: usize, canvas: Size) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let center = layout_center(canvas);
    let radius = layout_radius(canvas);
    let step = TAU / count as f64;

    (0..count)
        .map(|i| {
            let angle = i as f64 * step;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Positions for a concrete node list plus an id lookup.
///
/// Every node gets its own slot, duplicates included. Lookups by id resolve
/// to the first node carrying that id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeLayout {
    positions: Vec<Point>,
    index: IndexMap<String, usize>,
}

impl NodeLayout {
    pub fn compute(nodes: &[GraphNode], canvas: Size) -> Self {
        let positions = circle_positions(nodes.len(), canvas);
        let mut index = IndexMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(i);
        }
        Self { positions, index }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of the node at `slot` in input order.
    pub fn at(&self, slot: usize) -> Option<Point> {
        self.positions.get(slot).copied()
    }

    /// Position of the first node with `id`.
    pub fn position(&self, id: &str) -> Option<Point> {
        self.index.get(id).and_then(|&slot| self.at(slot))
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }
}
