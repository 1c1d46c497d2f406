use ledger_model::FieldAccess;

/// Normalize a search term for [`matches_search`].
pub fn normalize_term(term: &str) -> String {
    term.to_lowercase()
}

/// Whole-row search: true if any value's search text contains `needle`.
///
/// `needle` must already be lowercased. An empty needle matches every row.
/// A `Null` field is searched as the text `null`.
pub fn matches_search<R, A>(row: &R, needle: &str, accessor: &A) -> bool
where
    A: FieldAccess<R> + ?Sized,
{
    if needle.is_empty() {
        return true;
    }
    accessor.any_value(row, &mut |value| {
        value.search_text().to_lowercase().contains(needle)
    })
}

#[cfg(test)]
mod tests {
    use ledger_model::PropertyLookup;

    use super::*;

    #[test]
    fn matches_any_field_case_insensitively() {
        let row = serde_json::json!({"name": "Bob", "amount": 50});
        assert!(matches_search(&row, &normalize_term("BO"), &PropertyLookup));
        assert!(matches_search(&row, "50", &PropertyLookup));
        assert!(!matches_search(&row, "ann", &PropertyLookup));
        assert!(matches_search(&row, "", &PropertyLookup));
    }

    #[test]
    fn null_values_match_as_the_word_null() {
        let row = serde_json::json!({"name": "Bob", "note": null});
        assert!(matches_search(&row, "null", &PropertyLookup));
        assert!(matches_search(&row, "ul", &PropertyLookup));
        assert!(!matches_search(&serde_json::json!({"name": "ann"}), "null", &PropertyLookup));
    }
}
