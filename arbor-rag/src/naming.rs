//! Deterministic collection naming.

/// Namespace tag prefixed to every collection key.
const COLLECTION_PREFIX: &str = "pdf_";

/// Maximum length of the sanitized stem, before the prefix.
const MAX_STEM_LEN: usize = 50;

/// Derive the collection key for a document file name.
///
/// Pure and deterministic: `.pdf` occurrences are removed, every
/// non-alphanumeric character becomes `_`, the stem is truncated to 50
/// characters, prefixed with `pdf_`, and lower-cased. Distinct files that
/// sanitize to the same key collide silently; this is a documented
/// limitation, not disambiguated here.
///
/// ```
/// use arbor_rag::collection_key;
///
/// assert_eq!(collection_key("My Document (2024).pdf"), "pdf_my_document__2024_");
/// assert_eq!(collection_key("TEST.pdf"), "pdf_test");
/// ```
pub fn collection_key(file_name: &str) -> String {
    let stem = file_name.replace(".pdf", "");
    let sanitized: String =
        stem.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect();
    let truncated: String = sanitized.chars().take(MAX_STEM_LEN).collect();
    format!("{COLLECTION_PREFIX}{truncated}").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_spaces_and_punctuation() {
        assert_eq!(collection_key("My Document (2024).pdf"), "pdf_my_document__2024_");
    }

    #[test]
    fn lower_cases_the_result() {
        assert_eq!(collection_key("TEST.pdf"), "pdf_test");
    }

    #[test]
    fn caps_the_key_length() {
        let long_name = format!("{}.pdf", "A".repeat(100));
        let key = collection_key(&long_name);
        assert!(key.chars().count() <= COLLECTION_PREFIX.len() + MAX_STEM_LEN);
        assert!(key.starts_with(COLLECTION_PREFIX));
    }

    #[test]
    fn same_name_always_maps_to_same_key() {
        assert_eq!(collection_key("report v2.pdf"), collection_key("report v2.pdf"));
    }

    #[test]
    fn distinct_names_can_collide() {
        // Accepted limitation: sanitization is lossy.
        assert_eq!(collection_key("a b.pdf"), collection_key("a_b.pdf"));
    }
}
