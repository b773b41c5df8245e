use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::notes::NoteNode;

// Radii grow with how deep the branching reaches so bushy trees spread
// further apart per level.
const BASE_RADIUS_UNIT: f32 = 250.0;
const DEPTH_INCREMENT_UNIT: f32 = 50.0;
const LEAF_PULL_IN_UNIT: f32 = 80.0;
const ROOT_RING_FACTOR: f32 = 2.0;

pub const MIN_CHILD_RADIUS: f32 = 40.0;

/// A laid-out note. Parent and children are arena indices into the flat
/// list returned by [`radial_layout`]; the tree itself stays owned by the
/// notes snapshot.
#[derive(Clone, Debug)]
pub struct PositionedNode {
    pub id: String,
    pub title: String,
    pub content: String,
    pub depth: u32,
    pub importance: u8,
    pub tags: Vec<String>,
    pub pos: Vec2,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub base_radius: f32,
}

struct LayoutMetrics {
    base_radius: f32,
    depth_increment: f32,
    leaf_pull_in: f32,
}

impl LayoutMetrics {
    fn for_forest(roots: &[NoteNode]) -> Self {
        let scale_factor = 1.0 + max_branching_depth(roots) as f32;
        Self {
            base_radius: BASE_RADIUS_UNIT * scale_factor,
            depth_increment: DEPTH_INCREMENT_UNIT * scale_factor,
            leaf_pull_in: LEAF_PULL_IN_UNIT * scale_factor,
        }
    }

    fn child_radius(&self, child: &NoteNode) -> f32 {
        let depth_steps = child.depth.saturating_sub(1) as f32;
        let mut radius = self.base_radius + depth_steps * self.depth_increment;
        if child.children.is_empty() && child.depth > 1 {
            radius -= self.leaf_pull_in;
        }
        radius.max(MIN_CHILD_RADIUS)
    }
}

/// Deterministic radial placement: the same tree shape always yields the
/// same coordinates. Nodes in world space, origin at the (single) root.
pub fn radial_layout(roots: &[NoteNode]) -> Vec<PositionedNode> {
    if roots.is_empty() {
        return Vec::new();
    }

    let metrics = LayoutMetrics::for_forest(roots);
    let mut nodes = Vec::with_capacity(crate::notes::forest_node_count(roots));

    let root_ring = metrics.base_radius * ROOT_RING_FACTOR;
    for (index, root) in roots.iter().enumerate() {
        let origin = if roots.len() == 1 {
            Vec2::ZERO
        } else {
            let angle = (index as f32 / roots.len() as f32) * TAU;
            vec2(angle.cos(), angle.sin()) * root_ring
        };
        place(root, origin, None, &metrics, &mut nodes);
    }

    nodes
}

/// The deepest depth at which any node still has children.
fn max_branching_depth(roots: &[NoteNode]) -> u32 {
    fn visit(node: &NoteNode, deepest: &mut u32) {
        if !node.children.is_empty() {
            *deepest = (*deepest).max(node.depth);
        }
        for child in &node.children {
            visit(child, deepest);
        }
    }

    let mut deepest = 0;
    for root in roots {
        visit(root, &mut deepest);
    }
    deepest
}

fn node_render_radius(importance: u8, depth: u32) -> f32 {
    (8.0 + importance as f32 * 3.5 - depth as f32 * 0.4).max(6.0)
}

fn place(
    node: &NoteNode,
    pos: Vec2,
    parent: Option<usize>,
    metrics: &LayoutMetrics,
    nodes: &mut Vec<PositionedNode>,
) -> usize {
    let index = nodes.len();
    let importance = node.effective_importance();
    nodes.push(PositionedNode {
        id: node.id.clone(),
        title: node.title.clone(),
        content: node.content.clone(),
        depth: node.depth,
        importance,
        tags: node.tags.clone(),
        pos,
        parent,
        children: Vec::with_capacity(node.children.len()),
        base_radius: node_render_radius(importance, node.depth),
    });

    if node.children.is_empty() {
        return index;
    }

    let to_parent = parent.map(|parent_index| nodes[parent_index].pos - pos);
    let angles = child_angles(node.children.len(), to_parent);

    for (child, angle) in node.children.iter().zip(angles) {
        let radius = metrics.child_radius(child);
        let child_pos = pos + vec2(angle.cos(), angle.sin()) * radius;
        let child_index = place(child, child_pos, Some(index), metrics, nodes);
        nodes[index].children.push(child_index);
    }

    index
}

/// Angular slots for a node's children. A non-root parent reserves the
/// slot pointing back along the incoming edge so no child is laid on top
/// of it; the root has no incoming edge and divides the full circle.
fn child_angles(child_count: usize, to_parent: Option<Vec2>) -> Vec<f32> {
    match to_parent {
        None => {
            let step = TAU / child_count as f32;
            (0..child_count).map(|slot| slot as f32 * step).collect()
        }
        Some(back) => {
            let effective = child_count + 1;
            let step = TAU / effective as f32;
            let back_angle = back.y.atan2(back.x);
            let forbidden_slot =
                (back_angle / step).round().rem_euclid(effective as f32) as usize % effective;

            (0..effective)
                .filter(|slot| *slot != forbidden_slot)
                .take(child_count)
                .map(|slot| slot as f32 * step)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::parse_note_forest;

    fn chain() -> Vec<NoteNode> {
        parse_note_forest(
            r#"{"id": "root", "title": "Root", "content": "r", "children": [
                {"id": "child", "title": "Child", "content": "c", "children": [
                    {"id": "leaf", "title": "Leaf", "content": "l"}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    fn star(child_count: usize) -> Vec<NoteNode> {
        let children = (0..child_count)
            .map(|index| format!(r#"{{"id": "c{index}", "title": "C{index}"}}"#))
            .collect::<Vec<_>>()
            .join(",");
        parse_note_forest(&format!(
            r#"{{"id": "hub", "title": "Hub", "children": [{children}]}}"#
        ))
        .unwrap()
    }

    fn by_id<'a>(nodes: &'a [PositionedNode], id: &str) -> &'a PositionedNode {
        nodes.iter().find(|node| node.id == id).unwrap()
    }

    #[test]
    fn empty_forest_yields_empty_layout() {
        assert!(radial_layout(&[]).is_empty());
    }

    #[test]
    fn single_node_sits_at_origin() {
        let roots = parse_note_forest(r#"{"id": "only", "title": "Only"}"#).unwrap();
        let nodes = radial_layout(&roots);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].pos, Vec2::ZERO);
        assert!(nodes[0].parent.is_none());
    }

    #[test]
    fn layout_is_deterministic() {
        let roots = star(7);
        let first = radial_layout(&roots);
        let second = radial_layout(&roots);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pos, b.pos);
        }
    }

    #[test]
    fn content_changes_do_not_move_nodes() {
        let mut roots = chain();
        let before = radial_layout(&roots);
        roots[0].children[0].content = String::new();
        let after = radial_layout(&roots);
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.pos, b.pos);
        }
    }

    #[test]
    fn chain_shows_leaf_pull_in() {
        let nodes = radial_layout(&chain());
        assert_eq!(nodes.len(), 3);

        let root = by_id(&nodes, "root");
        let child = by_id(&nodes, "child");
        let leaf = by_id(&nodes, "leaf");

        let root_to_child = (child.pos - root.pos).length();
        let child_to_leaf = (leaf.pos - child.pos).length();

        // All three distinct.
        assert!(root_to_child > 1.0);
        assert!(child_to_leaf > 1.0);
        assert!((leaf.pos - root.pos).length() > 1.0);

        // The pulled-in leaf lands closer to its parent than a depth-1
        // node would.
        assert!(child_to_leaf < root_to_child);
    }

    #[test]
    fn children_keep_minimum_distance_from_parent() {
        let roots = parse_note_forest(
            r#"{"id": "r", "title": "R", "children": [
                {"id": "a", "title": "A", "children": [
                    {"id": "a1", "title": "A1"}, {"id": "a2", "title": "A2"},
                    {"id": "a3", "title": "A3"}
                ]},
                {"id": "b", "title": "B"}
            ]}"#,
        )
        .unwrap();
        let nodes = radial_layout(&roots);

        for node in &nodes {
            if let Some(parent) = node.parent {
                let distance = (node.pos - nodes[parent].pos).length();
                assert!(distance >= MIN_CHILD_RADIUS, "{} too close: {distance}", node.id);
            }
        }
    }

    #[test]
    fn siblings_get_distinct_slots() {
        let nodes = radial_layout(&star(9));
        let hub = by_id(&nodes, "hub");

        let mut angles = hub
            .children
            .iter()
            .map(|&child| {
                let delta = nodes[child].pos - hub.pos;
                delta.y.atan2(delta.x)
            })
            .collect::<Vec<_>>();
        angles.sort_by(f32::total_cmp);

        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0]).abs() > 1e-3);
        }
    }

    #[test]
    fn no_child_is_placed_on_the_back_edge() {
        let roots = parse_note_forest(
            r#"{"id": "r", "title": "R", "children": [
                {"id": "mid", "title": "Mid", "children": [
                    {"id": "m1", "title": "M1"}, {"id": "m2", "title": "M2"},
                    {"id": "m3", "title": "M3"}
                ]}
            ]}"#,
        )
        .unwrap();
        let nodes = radial_layout(&roots);

        let root = by_id(&nodes, "r");
        let mid = by_id(&nodes, "mid");
        let back = root.pos - mid.pos;
        let back_angle = back.y.atan2(back.x);

        for &child in &mid.children {
            let delta = nodes[child].pos - mid.pos;
            let angle = delta.y.atan2(delta.x);
            let mut separation = (angle - back_angle).rem_euclid(TAU);
            if separation > TAU / 2.0 {
                separation = TAU - separation;
            }
            assert!(separation > 0.3, "child {} rides the incoming edge", nodes[child].id);
        }
    }

    #[test]
    fn multiple_roots_get_distinct_origins() {
        let roots = parse_note_forest(r#"[{"title": "A"}, {"title": "B"}, {"title": "C"}]"#).unwrap();
        let nodes = radial_layout(&roots);
        assert_eq!(nodes.len(), 3);
        assert!((nodes[0].pos - nodes[1].pos).length() > 1.0);
        assert!((nodes[1].pos - nodes[2].pos).length() > 1.0);
        assert!((nodes[0].pos - nodes[2].pos).length() > 1.0);
    }

    #[test]
    fn importance_flows_into_render_radius() {
        let roots = parse_note_forest(
            r#"{"id": "r", "title": "R", "importance": 5, "children": [
                {"id": "weak", "title": "W", "importance": 1},
                {"id": "strong", "title": "S", "importance": 5}
            ]}"#,
        )
        .unwrap();
        let nodes = radial_layout(&roots);
        assert!(by_id(&nodes, "strong").base_radius > by_id(&nodes, "weak").base_radius);
    }
}
