mod parse;
mod stream;

pub use parse::parse_note_forest;
pub use stream::spawn_note_stream;

/// One entry in the note tree. Children order is meaningful: it determines
/// angular placement in the galaxy layout.
#[derive(Clone, Debug)]
pub struct NoteNode {
    pub id: String,
    pub title: String,
    pub content: String,
    pub children: Vec<NoteNode>,
    pub depth: u32,
    pub importance: Option<u8>,
    pub tags: Vec<String>,
}

impl NoteNode {
    /// Explicit importance, or the depth-derived default (floored at 1).
    pub fn effective_importance(&self) -> u8 {
        match self.importance {
            Some(value) => value.clamp(1, 5),
            None => 5u32.saturating_sub(self.depth).max(1) as u8,
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(NoteNode::node_count)
            .sum::<usize>()
    }

    pub fn revealed_count(&self) -> usize {
        let own = usize::from(!self.content.is_empty());
        own + self
            .children
            .iter()
            .map(NoteNode::revealed_count)
            .sum::<usize>()
    }
}

pub fn forest_node_count(roots: &[NoteNode]) -> usize {
    roots.iter().map(NoteNode::node_count).sum()
}
