//! Pathway identifier normalization.
//!
//! Source tables spell the same pathway several ways (`Aop:315`, `AOP:315`,
//! `315`, `aop/315`). Grouping compares the digit-only form.

use crate::model::Node;

/// Reduce a raw pathway id to its digits.
///
/// Only the last `:`-separated segment is considered. Returns an empty
/// string when that segment holds no digits; an empty key means "unknown"
/// and is excluded from pathway-scoped grouping.
#[must_use]
pub fn normalize_pathway_id(raw: &str) -> String {
    let tail = raw.rsplit(':').next().unwrap_or(raw);
    tail.chars().filter(char::is_ascii_digit).collect()
}

/// First of the node's pathway ids that normalizes to a non-empty key.
#[must_use]
pub fn pathway_key(node: &Node) -> Option<String> {
    node.pathway_ids
        .iter()
        .map(|raw| normalize_pathway_id(raw))
        .find(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    #[test]
    fn spellings_collapse_to_digits() {
        assert_eq!(normalize_pathway_id("Aop:315"), "315");
        assert_eq!(normalize_pathway_id("AOP:315"), "315");
        assert_eq!(normalize_pathway_id("315"), "315");
        assert_eq!(normalize_pathway_id(" aop 315 "), "315");
    }

    #[test]
    fn only_last_segment_counts() {
        assert_eq!(normalize_pathway_id("urn:aop:12:315"), "315");
        assert_eq!(normalize_pathway_id("12:Aop"), "");
    }

    #[test]
    fn no_digits_is_empty() {
        assert_eq!(normalize_pathway_id(""), "");
        assert_eq!(normalize_pathway_id("Aop:"), "");
        assert_eq!(normalize_pathway_id("unknown"), "");
    }

    #[test]
    fn pathway_key_skips_unusable_ids() {
        let node = Node::new("S1", "Stressor 1", NodeType::Stressor)
            .with_pathway("Aop:none")
            .with_pathway("AOP:42")
            .with_pathway("Aop:7");
        assert_eq!(pathway_key(&node).as_deref(), Some("42"));

        let bare = Node::new("S2", "Stressor 2", NodeType::Stressor);
        assert_eq!(pathway_key(&bare), None);
    }
}
