//! Decoded snapshots rendered end to end.

use lockscope_types::{NodeKind, StreamMessage, SystemSnapshot};
use lockscope_view::{GraphRenderer, NodeShape, Primitive, Size, circle_positions, layout_center};

const CANVAS: Size = Size::new(800.0, 600.0);

fn decode(json: serde_json::Value) -> SystemSnapshot {
    match StreamMessage::decode(&json.to_string()).unwrap() {
        StreamMessage::Snapshot(s) => s,
        other => panic!("expected snapshot, got {other:?}"),
    }
}

fn two_cycle() -> SystemSnapshot {
    decode(serde_json::json!({
        "processes": [
            {"id": 1, "name": "P1", "state": "waiting", "allocated": [1], "requested": [2]},
            {"id": 2, "name": "P2", "state": "waiting", "allocated": [2], "requested": [1]}
        ],
        "resources": [
            {"id": 1, "name": "R1", "instances": 1, "available": 0, "allocated_to": [1]},
            {"id": 2, "name": "R2", "instances": 1, "available": 0, "allocated_to": [2]}
        ],
        "graph": {
            "nodes": [
                {"id": "P1", "type": "process"}, {"id": "R1", "type": "resource"},
                {"id": "P2", "type": "process"}, {"id": "R2", "type": "resource"}
            ],
            "edges": [{"source": "P1", "target": "R2"}, {"source": "P2", "target": "R1"}]
        },
        "deadlock_detected": true,
        "deadlocked_processes": ["P1", "P2"],
        "prediction": {"deadlock_probability": 0.9, "risk_level": "HIGH"}
    }))
}

#[test]
fn test_two_cycle_scene() {
    let snapshot = two_cycle();
    let scene = GraphRenderer::default().render(&snapshot, CANVAS);

    assert_eq!(scene.count_circles(), 2);
    assert_eq!(scene.count_squares(), 2);
    assert_eq!(scene.edges().count(), 2);
    assert_eq!(scene.deadlocked_ids(), vec!["P1", "P2"]);

    // Nodes sit at the four evenly spaced layout slots.
    let expected = circle_positions(4, CANVAS);
    let centers: Vec<_> = scene
        .nodes()
        .filter_map(|p| match p {
            Primitive::Node { shape, .. } => Some(shape.center()),
            _ => None,
        })
        .collect();
    assert_eq!(centers, expected);

    // Every edge ends in an arrowhead near its target.
    for edge in scene.edges() {
        let Primitive::Edge { target, head, .. } = edge else { unreachable!() };
        let slot = snapshot.graph.nodes.iter().position(|n| &n.id == target).unwrap();
        let d = head.tip.distance(expected[slot]);
        assert!((d - 20.0).abs() < 1e-9, "tip {d} from target center");
    }
}

#[test]
fn test_resource_kinds_map_to_squares() {
    let snapshot = two_cycle();
    let scene = GraphRenderer::default().render(&snapshot, CANVAS);
    for node in scene.nodes() {
        let Primitive::Node { kind, shape, .. } = node else { unreachable!() };
        match kind {
            NodeKind::Process => assert!(matches!(shape, NodeShape::Circle(_))),
            _ => assert!(matches!(shape, NodeShape::Square(_))),
        }
    }
}

#[test]
fn test_empty_snapshot_is_placeholder() {
    let snapshot = decode(serde_json::json!({
        "processes": [],
        "resources": [],
        "graph": {"nodes": [], "edges": []},
        "deadlock_detected": false,
        "deadlocked_processes": [],
        "prediction": {"deadlock_probability": 0.0, "risk_level": "LOW"}
    }));
    let scene = GraphRenderer::default().render(&snapshot, CANVAS);
    assert_eq!(scene.primitives.len(), 1);
    match &scene.primitives[0] {
        Primitive::Placeholder { position, .. } => assert_eq!(*position, layout_center(CANVAS)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_unknown_node_type_renders() {
    let snapshot = decode(serde_json::json!({
        "processes": [],
        "resources": [],
        "graph": {
            "nodes": [{"id": "Q1", "type": "queue"}, {"id": "P1", "type": "process"}],
            "edges": [{"source": "Q1", "target": "P1"}, {"source": "P1", "target": "Z9"}]
        },
        "deadlock_detected": false,
        "deadlocked_processes": [],
        "prediction": {"deadlock_probability": 0.1, "risk_level": "LOW"}
    }));
    let scene = GraphRenderer::default().render(&snapshot, CANVAS);
    assert_eq!(scene.count_squares(), 1);
    assert_eq!(scene.count_circles(), 1);
    assert_eq!(scene.edges().count(), 1);
}

#[test]
fn test_render_is_deterministic() {
    let snapshot = two_cycle();
    let renderer = GraphRenderer::default();
    assert_eq!(renderer.render(&snapshot, CANVAS), renderer.render(&snapshot, CANVAS));
    assert_eq!(
        renderer.render(&snapshot, CANVAS).to_svg(),
        renderer.render(&snapshot, CANVAS).to_svg()
    );
}
