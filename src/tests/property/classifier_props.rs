//! Property-based tests for query classification

use proptest::prelude::*;

use crate::core::roster::{classify, SearchMode, Strategy as Matcher};

/// Full student IDs: campus code 5421..5424 plus eight digits.
fn arb_full_id() -> impl Strategy<Value = String> {
    (1u8..=4, "[0-9]{8}").prop_map(|(campus, rest)| format!("542{campus}{rest}"))
}

proptest! {
    #[test]
    fn full_ids_are_exact(id in arb_full_id()) {
        prop_assert_eq!(classify(&id), Some(Matcher::ExactId));
    }

    #[test]
    fn other_digit_runs_are_partial(digits in "[0-9]{4,20}") {
        prop_assume!(!(digits.len() == 12 && digits.starts_with("542")
            && matches!(digits.as_bytes()[3], b'1'..=b'4')));
        prop_assert_eq!(classify(&digits), Some(Matcher::PartialId));
    }

    #[test]
    fn cjk_strings_are_names(name in "[\u{4e00}-\u{9fa5}]{1,6}") {
        prop_assert_eq!(classify(&name), Some(Matcher::Name));
    }

    #[test]
    fn latin_letters_are_initials(letters in "[a-zA-Z]{1,10}") {
        prop_assert_eq!(classify(&letters), Some(Matcher::Initials));
    }

    #[test]
    fn blank_never_classifies(blank in "[ \t\n]{0,8}") {
        prop_assert_eq!(classify(&blank), None);
        prop_assert_eq!(SearchMode::FullText.strategy_for(&blank), None);
    }

    #[test]
    fn classification_ignores_surrounding_whitespace(id in arb_full_id(), pad in "[ \t]{0,3}") {
        let padded = format!("{pad}{id}{pad}");
        prop_assert_eq!(classify(&padded), classify(&id));
    }

    #[test]
    fn auto_never_picks_full_text(query in "\\PC{1,16}") {
        prop_assert_ne!(classify(&query), Some(Matcher::FullText));
    }
}
