use std::collections::HashMap;

use eframe::egui::{Rect, pos2};

use crate::layout::radial_layout;

use super::super::{GalaxyScene, ViewModel, ViewScratch};

impl ViewModel {
    /// Re-derive the positioned scene from the latest notes snapshot. The
    /// layout is deterministic, so an unchanged tree shape keeps every
    /// node exactly where it was; only reveal bookkeeping moves forward.
    pub(in crate::app) fn rebuild_scene(&mut self, now: f64) {
        self.scene_revision = self.scene_revision.wrapping_add(1);
        self.search_match_cache = None;

        let nodes = radial_layout(&self.notes);
        if nodes.is_empty() {
            self.scene = None;
            self.reveal_times.clear();
            self.scene_dirty = false;
            self.visible_node_count = 0;
            self.visible_connection_count = 0;
            return;
        }

        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }

        // Shallow nodes draw last so they sit on top; hit-testing breaks
        // distance ties the same way.
        let mut draw_order = (0..nodes.len()).collect::<Vec<_>>();
        draw_order.sort_by(|a, b| {
            nodes[*b]
                .depth
                .cmp(&nodes[*a].depth)
                .then_with(|| a.cmp(b))
        });

        let mut min = pos2(f32::MAX, f32::MAX);
        let mut max = pos2(f32::MIN, f32::MIN);
        for node in &nodes {
            min.x = min.x.min(node.pos.x);
            min.y = min.y.min(node.pos.y);
            max.x = max.x.max(node.pos.x);
            max.y = max.y.max(node.pos.y);
        }
        let world_bounds = Rect::from_min_max(min, max).expand(crate::layout::MIN_CHILD_RADIUS);

        // First frame a node shows non-empty content starts its entrance
        // animation; ids persist across rebuilds so streaming updates
        // never restart it. Ids dropped by the new snapshot are pruned so
        // the map cannot grow without bound over a long streamed session.
        self.reveal_times
            .retain(|id, _| index_by_id.contains_key(id));
        for node in &nodes {
            if !node.content.is_empty() {
                self.reveal_times.entry(node.id.clone()).or_insert(now);
            }
        }

        let node_count = nodes.len();
        self.scene = Some(GalaxyScene {
            nodes,
            index_by_id,
            draw_order,
            world_bounds,
            view_scratch: ViewScratch {
                screen_positions: Vec::with_capacity(node_count),
                screen_radii: Vec::with_capacity(node_count),
                reveal_progress: Vec::with_capacity(node_count),
            },
        });
        self.scene_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::app::{Theme, ViewModel};
    use crate::notes::parse_note_forest;

    #[test]
    fn reveal_times_drop_ids_missing_from_the_new_snapshot() {
        let first = parse_note_forest(
            r#"{"id": "root", "title": "Root", "content": "r", "children": [
                {"id": "pruned", "title": "Pruned", "content": "p"}
            ]}"#,
        )
        .unwrap();
        let mut model = ViewModel::new(first, Theme::default());
        model.rebuild_scene(1.0);
        assert!(model.reveal_times.contains_key("root"));
        assert!(model.reveal_times.contains_key("pruned"));

        let second = parse_note_forest(r#"{"id": "root", "title": "Root", "content": "r"}"#)
            .unwrap();
        model.apply_snapshot(second);
        model.rebuild_scene(2.0);
        assert!(model.reveal_times.contains_key("root"));
        assert!(!model.reveal_times.contains_key("pruned"));
    }

    #[test]
    fn reveal_timestamps_survive_rebuilds_for_kept_ids() {
        let roots = parse_note_forest(r#"{"id": "root", "title": "Root", "content": "r"}"#)
            .unwrap();
        let mut model = ViewModel::new(roots.clone(), Theme::default());
        model.rebuild_scene(1.0);

        model.apply_snapshot(roots);
        model.rebuild_scene(5.0);
        // The entrance animation must not restart on a later snapshot.
        assert_eq!(model.reveal_times["root"], 1.0);
    }
}
