use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::NoteNode;

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawNote {
    #[serde(default)]
    pub(super) id: Option<String>,
    pub(super) title: String,
    #[serde(default)]
    pub(super) content: String,
    #[serde(default)]
    pub(super) children: Vec<RawNote>,
    #[serde(default)]
    pub(super) importance: Option<u8>,
    #[serde(default)]
    pub(super) tags: Vec<String>,
}

/// Parse a notes file into a list of root notes. Accepts either a single
/// tree object or an array of trees. Depths are assigned from tree
/// structure here, so inconsistent depths in the input cannot reach the
/// layout engine; missing ids are derived from the tree path.
pub fn parse_note_forest(raw: &str) -> Result<Vec<NoteNode>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid notes JSON")?;

    let raw_roots = match parsed {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| RawNote::deserialize(entry).context("invalid note entry in array"))
            .collect::<Result<Vec<_>>>()?,
        Value::Object(_) => vec![RawNote::deserialize(parsed).context("invalid note tree object")?],
        _ => return Err(anyhow!("notes JSON must be an object or an array of objects")),
    };

    Ok(raw_roots
        .into_iter()
        .enumerate()
        .map(|(index, raw_root)| normalize(raw_root, 0, &index.to_string()))
        .collect())
}

fn normalize(raw: RawNote, depth: u32, path: &str) -> NoteNode {
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("note-{path}"));

    let children = raw
        .children
        .into_iter()
        .enumerate()
        .map(|(index, child)| normalize(child, depth + 1, &format!("{path}.{index}")))
        .collect();

    NoteNode {
        id,
        title: raw.title,
        content: raw.content,
        children,
        depth,
        importance: raw.importance.map(|value| value.clamp(1, 5)),
        tags: raw.tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_tree_object() {
        let roots = parse_note_forest(
            r#"{"id": "root", "title": "Rust", "content": "systems language", "children": [
                {"title": "Ownership", "children": [{"title": "Borrowing"}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(roots.len(), 1);
        let root = &roots[0];
        assert_eq!(root.id, "root");
        assert_eq!(root.depth, 0);
        assert_eq!(root.children[0].depth, 1);
        assert_eq!(root.children[0].children[0].depth, 2);
    }

    #[test]
    fn parses_array_of_trees() {
        let roots =
            parse_note_forest(r#"[{"title": "A"}, {"title": "B", "children": [{"title": "C"}]}]"#)
                .unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1].children.len(), 1);
    }

    #[test]
    fn derives_missing_ids_from_tree_path() {
        let roots = parse_note_forest(r#"{"title": "A", "children": [{"title": "B"}]}"#).unwrap();
        assert_eq!(roots[0].id, "note-0");
        assert_eq!(roots[0].children[0].id, "note-0.0");
    }

    #[test]
    fn depths_are_rewritten_from_structure() {
        // An input depth field is ignored entirely; structure wins.
        let roots = parse_note_forest(
            r#"{"title": "A", "depth": 7, "children": [{"title": "B", "depth": 0}]}"#,
        )
        .unwrap();
        assert_eq!(roots[0].depth, 0);
        assert_eq!(roots[0].children[0].depth, 1);
    }

    #[test]
    fn importance_defaults_from_depth_with_floor() {
        let roots = parse_note_forest(
            r#"{"title": "A", "importance": 9, "children": [
                {"title": "B", "children": [{"title": "C", "children": [
                    {"title": "D", "children": [{"title": "E", "children": [{"title": "F"}]}]}
                ]}]}
            ]}"#,
        )
        .unwrap();

        // Explicit importance is clamped into 1..=5.
        assert_eq!(roots[0].effective_importance(), 5);

        let mut node = &roots[0];
        while !node.children.is_empty() {
            node = &node.children[0];
        }
        assert_eq!(node.depth, 5);
        assert_eq!(node.effective_importance(), 1);
    }

    #[test]
    fn rejects_scalar_json() {
        assert!(parse_note_forest("42").is_err());
    }
}
