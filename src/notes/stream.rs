use std::fs;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{NoteNode, forest_node_count, parse_note_forest};

const REPLAY_STEP_MILLIS: u64 = 140;

/// Load a notes file on a background thread and deliver whole-tree
/// snapshots over a channel. With `replay` set, a finished tree is
/// re-sent as a sequence of snapshots whose contents fill in one node at
/// a time, imitating a generation backend streaming notes in.
pub fn spawn_note_stream(path: String, replay: bool) -> Receiver<Result<Vec<NoteNode>, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let roots = match load_note_forest(&path) {
            Ok(roots) => roots,
            Err(error) => {
                let _ = tx.send(Err(error.to_string()));
                return;
            }
        };

        if !replay {
            let _ = tx.send(Ok(roots));
            return;
        }

        let total = forest_node_count(&roots);
        for revealed in 0..=total {
            if tx.send(Ok(reveal_prefix(&roots, revealed))).is_err() {
                return;
            }
            thread::sleep(Duration::from_millis(REPLAY_STEP_MILLIS));
        }
    });

    rx
}

fn load_note_forest(path: &str) -> Result<Vec<NoteNode>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read notes file {path}"))?;
    parse_note_forest(&raw).with_context(|| format!("failed to parse notes file {path}"))
}

/// Clone the forest with only the first `revealed` nodes (pre-order)
/// keeping their content; later nodes get empty content, so they render as
/// not-yet-generated.
fn reveal_prefix(roots: &[NoteNode], revealed: usize) -> Vec<NoteNode> {
    let mut remaining = revealed;
    roots
        .iter()
        .map(|root| reveal_node(root, &mut remaining))
        .collect()
}

fn reveal_node(node: &NoteNode, remaining: &mut usize) -> NoteNode {
    let content = if *remaining > 0 {
        *remaining -= 1;
        node.content.clone()
    } else {
        String::new()
    };

    NoteNode {
        id: node.id.clone(),
        title: node.title.clone(),
        content,
        children: node
            .children
            .iter()
            .map(|child| reveal_node(child, remaining))
            .collect(),
        depth: node.depth,
        importance: node.importance,
        tags: node.tags.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<NoteNode> {
        parse_note_forest(
            r#"{"title": "A", "content": "a", "children": [
                {"title": "B", "content": "b", "children": [
                    {"title": "C", "content": "c"}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn reveal_prefix_zero_hides_all_content() {
        let roots = chain();
        let snapshot = reveal_prefix(&roots, 0);
        assert_eq!(snapshot[0].revealed_count(), 0);
        // Shape is unchanged, only content is withheld.
        assert_eq!(forest_node_count(&snapshot), 3);
    }

    #[test]
    fn reveal_prefix_is_pre_order() {
        let roots = chain();
        let snapshot = reveal_prefix(&roots, 2);
        assert_eq!(snapshot[0].content, "a");
        assert_eq!(snapshot[0].children[0].content, "b");
        assert!(snapshot[0].children[0].children[0].content.is_empty());
    }

    #[test]
    fn reveal_prefix_full_matches_source() {
        let roots = chain();
        let snapshot = reveal_prefix(&roots, 3);
        assert_eq!(snapshot[0].revealed_count(), 3);
    }
}
