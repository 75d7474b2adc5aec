/// Whether a write to a listing warrants a new translation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDecision {
    pub should_translate: bool,
}

impl ChangeDecision {
    /// Compare the stored source text (read before the write is applied)
    /// with the incoming one. On create, `old` is `None`.
    pub fn evaluate(old: Option<&str>, new: Option<&str>) -> Self {
        Self {
            should_translate: should_retranslate(old, new),
        }
    }
}

/// True iff `new` is present, not blank, and differs from `old`.
pub fn should_retranslate(old: Option<&str>, new: Option<&str>) -> bool {
    match new {
        Some(new) if !new.trim().is_empty() => old != Some(new),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_text_is_unchanged() {
        assert!(!should_retranslate(
            Some("Welcome to our restaurant"),
            Some("Welcome to our restaurant")
        ));
    }

    #[test]
    fn test_empty_new_text_never_translates() {
        assert!(!should_retranslate(None, Some("")));
        assert!(!should_retranslate(Some("old"), Some("")));
        assert!(!should_retranslate(Some("old"), Some("   \n\t")));
    }

    #[test]
    fn test_missing_new_text_never_translates() {
        assert!(!should_retranslate(Some("old"), None));
        assert!(!should_retranslate(None, None));
    }

    #[test]
    fn test_create_with_text_translates() {
        assert!(should_retranslate(None, Some("Fresh pasta daily")));
    }

    #[test]
    fn test_changed_text_translates() {
        assert!(should_retranslate(Some("Old menu"), Some("New menu")));
    }

    #[test]
    fn test_whitespace_only_difference_still_counts() {
        assert!(should_retranslate(Some("Menu"), Some("Menu ")));
    }

    #[test]
    fn test_decision_wraps_predicate() {
        assert!(ChangeDecision::evaluate(None, Some("text")).should_translate);
        assert!(!ChangeDecision::evaluate(Some("text"), Some("text")).should_translate);
    }

    proptest! {
        #[test]
        fn prop_same_text_never_translates(text in ".*") {
            prop_assert!(!should_retranslate(Some(&text), Some(&text)));
        }

        #[test]
        fn prop_blank_text_never_translates(
            old in proptest::option::of(".*"),
            blank in "[ \t\n]*"
        ) {
            prop_assert!(!should_retranslate(old.as_deref(), Some(&blank)));
        }

        #[test]
        fn prop_different_non_blank_text_translates(old in ".*", new in ".*[a-z].*") {
            prop_assume!(old != new);
            prop_assert!(should_retranslate(Some(&old), Some(&new)));
        }
    }
}
