/// Splits a comma-separated listing into trimmed, non-empty item names.
pub fn parse_items(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Appends every item parsed from `extracted` to `existing`, in order.
///
/// No deduplication against existing names: uploading the same food twice
/// records it twice.
pub fn merge(existing: Vec<String>, extracted: &str) -> Vec<String> {
    let mut items = existing;
    items.extend(parse_items(extracted));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_filters_blank_tokens() {
        assert_eq!(merge(vec![], "apple, , banana ,"), vec!["apple", "banana"]);
    }

    #[test]
    fn merge_appends_without_dedup() {
        let merged = merge(vec!["apple".into()], "apple,pear");
        assert_eq!(merged, vec!["apple", "apple", "pear"]);
    }

    #[test]
    fn empty_or_whitespace_text_adds_nothing() {
        assert!(merge(vec![], "").is_empty());
        assert_eq!(merge(vec!["milk".into()], "  \n "), vec!["milk"]);
    }

    #[test]
    fn text_without_commas_is_one_item() {
        assert_eq!(parse_items("  a bowl of ramen\n"), vec!["a bowl of ramen"]);
    }
}
