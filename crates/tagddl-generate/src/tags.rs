//! Tag lookups over model elements. Every call is a linear scan of the
//! element's tag list.

use tagddl_core::{Node, Tag, TagKind, TagReference};

/// First tag of `kind` on the element.
pub fn tag<'a>(kind: TagKind, node: impl Into<Node<'a>>) -> Option<&'a Tag> {
    node.into().tags().iter().find(|tag| tag.kind == kind)
}

/// Every tag of `kind` on the element, in declaration order.
pub fn tags_by_value<'a>(kind: TagKind, node: impl Into<Node<'a>>) -> Vec<&'a Tag> {
    node.into()
        .tags()
        .iter()
        .filter(|tag| tag.kind == kind)
        .collect()
}

/// Trimmed value of the first tag of `kind`, if non-empty.
pub fn tag_value<'a>(kind: TagKind, node: impl Into<Node<'a>>) -> Option<&'a str> {
    tag(kind, node)
        .map(|tag| tag.value.trim())
        .filter(|value| !value.is_empty())
}

/// Reference tags whose target is `marker`, paired with their reference.
pub fn references<'a>(
    node: impl Into<Node<'a>>,
    marker: &str,
) -> Vec<(&'a Tag, &'a TagReference)> {
    tags_by_value(TagKind::Reference, node)
        .into_iter()
        .filter_map(|tag| tag.reference.as_ref().map(|reference| (tag, reference)))
        .filter(|(_, reference)| reference.target.trim() == marker.trim())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagddl_core::{Column, Entity};

    #[test]
    fn finds_first_and_all_matches() {
        let column = Column::new("code", "VARCHAR")
            .with_tag(Tag::string(TagKind::Column, "  "))
            .with_tag(Tag::index("idx_a", 1, false))
            .with_tag(Tag::index("idx_b", 2, true));

        assert_eq!(tag(TagKind::Index, &column).map(|t| t.value.as_str()), Some("idx_a"));
        assert_eq!(tags_by_value(TagKind::Index, &column).len(), 2);
        assert!(tag(TagKind::Default, &column).is_none());
        assert!(tag_value(TagKind::Column, &column).is_none());
    }

    #[test]
    fn references_filter_on_marker() {
        let entity = Entity::new("orders")
            .with_tag(Tag::reference("trigger", "touch", "EXECUTE FUNCTION touch();"))
            .with_tag(Tag::reference("function", "touch", "() RETURNS trigger"))
            .with_tag(Tag::string(TagKind::Reference, "no target"));

        let triggers = references(&entity, "trigger");
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].1.name, "touch");
        assert!(references(&entity, "procedure").is_empty());
    }
}
