use std::collections::HashSet;

/// Keyword paired with its stable identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedKeyword {
    pub id: usize,
    pub keyword: String,
}

/// Ordered, deduplicated keyword list with stable integer ids.
///
/// A keyword's id is its position in the list it was built from. When the
/// same keyword appears twice, the first position wins and the repeat is
/// dropped from iteration.
#[derive(Clone, Debug, Default)]
pub struct KeywordIndex {
    entries: Vec<IndexedKeyword>,
}

impl KeywordIndex {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        for (position, keyword) in keywords.into_iter().enumerate() {
            let keyword = keyword.into();
            if !seen.insert(keyword.clone()) {
                log::warn!("Duplicate keyword '{keyword}' at position {position} ignored");
                continue;
            }
            entries.push(IndexedKeyword {
                id: position,
                keyword,
            });
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedKeyword> {
        self.entries.iter()
    }

    /// The first `n` keywords, or all of them when `n` is `None`.
    pub fn top(&self, n: Option<usize>) -> &[IndexedKeyword] {
        let end = n.map_or(self.entries.len(), |n| n.min(self.entries.len()));
        &self.entries[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(index: &KeywordIndex, keyword: &str) -> Option<usize> {
        index.iter().find(|k| k.keyword == keyword).map(|k| k.id)
    }

    #[test]
    fn test_ids_follow_input_order() {
        let index = KeywordIndex::new(["chat", "chien", "oiseau"]);
        assert_eq!(id_of(&index, "chat"), Some(0));
        assert_eq!(id_of(&index, "chien"), Some(1));
        assert_eq!(id_of(&index, "oiseau"), Some(2));
        assert_eq!(id_of(&index, "poisson"), None);
    }

    #[test]
    fn test_duplicate_keeps_first_id() {
        let index = KeywordIndex::new(["chat", "chien", "chat", "loup"]);
        assert_eq!(index.len(), 3);
        assert_eq!(id_of(&index, "chat"), Some(0));
        assert_eq!(id_of(&index, "loup"), Some(3));

        let keywords: Vec<_> = index.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["chat", "chien", "loup"]);
    }

    #[test]
    fn test_top_truncates() {
        let index = KeywordIndex::new(["a", "b", "c"]);
        assert_eq!(index.top(Some(2)).len(), 2);
        assert_eq!(index.top(Some(10)).len(), 3);
        assert_eq!(index.top(None).len(), 3);
        assert_eq!(index.top(Some(0)).len(), 0);
    }

    #[test]
    fn test_empty_index() {
        let index = KeywordIndex::new(Vec::<String>::new());
        assert!(index.is_empty());
        assert!(index.top(None).is_empty());
    }
}
