//! Graph → scene projection.
//!
//! Rendering is total. Edges whose endpoints don't resolve are skipped,
//! unknown node kinds get the resource visual, and an empty node list yields
//! only the placeholder. Every call redraws from scratch.
//!
//! Edges normally sit under the nodes. When two nodes are close enough to
//! overlap, the edge between them is painted on top instead so its arrowhead
//! stays visible.

use kurbo::{Circle, Line, Point, Rect, Size, Vec2};
use lockscope_types::{GraphData, GraphEdge, GraphNode, NodeKind, SystemSnapshot};
use tracing::debug;

use crate::layout::{NodeLayout, layout_center};
use crate::scene::{ArrowHead, LabelRole, NodeShape, Primitive, Scene};
use crate::theme::Theme;

#[derive(Clone, Debug, Default)]
pub struct GraphRenderer {
    theme: Theme,
}

impl GraphRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Render a full snapshot: graph plus deadlock highlight and resource
    /// availability labels.
    pub fn render(&self, snapshot: &SystemSnapshot, canvas: Size) -> Scene {
        self.draw(&snapshot.graph, canvas, Some(snapshot))
    }

    /// Render just the graph projection.
    pub fn render_graph(&self, graph: &GraphData, canvas: Size) -> Scene {
        self.draw(graph, canvas, None)
    }

    fn draw(
        &self,
        graph: &GraphData,
        canvas: Size,
        snapshot: Option<&SystemSnapshot>,
    ) -> Scene {
        let mut scene = Scene::new(canvas, self.theme.background);

        if graph.nodes.is_empty() {
            scene.push(Primitive::Placeholder {
                text: self.theme.placeholder_text.clone(),
                position: layout_center(canvas),
                font_size: self.theme.font_size,
                color: self.theme.placeholder,
            });
            return scene;
        }

        let layout = NodeLayout::compute(&graph.nodes, canvas);

        let mut on_top = Vec::new();
        for edge in &graph.edges {
            match (layout.position(&edge.source), layout.position(&edge.target)) {
                (Some(from), Some(to)) if from.distance(to) > 2.0 * self.theme.node_radius => {
                    scene.push(self.edge(edge, from, to));
                }
                (Some(from), Some(to)) => on_top.push(self.edge(edge, from, to)),
                _ => debug!(source = %edge.source, target = %edge.target, "skipping unresolved edge"),
            }
        }

        for (slot, node) in graph.nodes.iter().enumerate() {
            let Some(center) = layout.at(slot) else { continue };
            let deadlocked = snapshot.is_some_and(|s| s.is_deadlocked(&node.id));
            scene.push(self.node(node, center, deadlocked));
            scene.push(Primitive::Label {
                text: node.id.clone(),
                role: LabelRole::NodeId,
                position: center,
                font_size: self.theme.font_size,
                color: self.theme.label,
            });

            if let Some(resource) = snapshot.and_then(|s| s.resource_for_node(&node.id)) {
                let below = center.y + self.theme.node_radius + self.theme.font_size;
                scene.push(Primitive::Label {
                    text: format!("{}/{}", resource.available_clamped(), resource.total),
                    role: LabelRole::Availability,
                    position: Point::new(center.x, below),
                    font_size: self.theme.font_size * 0.85,
                    color: self.theme.sublabel,
                });
            }
        }

        for edge in on_top {
            scene.push(edge);
        }
        scene
    }

    fn node(&self, node: &GraphNode, center: Point, deadlocked: bool) -> Primitive {
        let r = self.theme.node_radius;
        let (shape, fill) = match node.kind {
            NodeKind::Process => (NodeShape::Circle(Circle::new(center, r)), self.theme.process_fill),
            NodeKind::Resource | NodeKind::Unknown => (
                NodeShape::Square(Rect::from_center_size(center, (2.0 * r, 2.0 * r))),
                self.theme.resource_fill,
            ),
        };
        let (stroke, stroke_width) = if deadlocked {
            (self.theme.deadlock_stroke, self.theme.deadlock_stroke_width)
        } else {
            (self.theme.node_stroke, self.theme.stroke_width)
        };
        Primitive::Node {
            id: node.id.clone(),
            kind: node.kind,
            shape,
            fill,
            stroke,
            stroke_width,
            deadlocked,
        }
    }

    fn edge(&self, edge: &GraphEdge, from: Point, to: Point) -> Primitive {
        let head = arrow_head(
            from,
            to,
            self.theme.node_radius,
            self.theme.arrow_length,
            self.theme.arrow_half_angle,
        );
        Primitive::Edge {
            source: edge.source.clone(),
            target: edge.target.clone(),
            line: Line::new(from, head.tip),
            head,
            color: self.theme.edge,
            width: self.theme.edge_width,
        }
    }
}

/// Arrowhead for an edge `from → to`.
///
/// The tip is pulled back from the target center by `node_radius`, or by half
/// the edge when the nodes are closer than that, so it never lands on the
/// center. Wings trail the tip at `±half_angle` from the edge direction.
pub fn arrow_head(from: Point, to: Point, node_radius: f64, length: f64, half_angle: f64) -> ArrowHead {
    let delta = to - from;
    let angle = delta.y.atan2(delta.x);
    let distance = delta.hypot();

    let tip = to - Vec2::from_angle(angle) * node_radius.min(distance / 2.0);
    let wing = |offset: f64| tip - Vec2::from_angle(angle + offset) * length;

    ArrowHead {
        tip,
        left: wing(-half_angle),
        right: wing(half_angle),
    }
}
