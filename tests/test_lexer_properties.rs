//! Property-based tests for the tokenizer.
//!
//! The state machine and clause reconstruction both lean on the lexer
//! behaving like a pure function with a few structural guarantees, so
//! those guarantees get checked over generated input rather than a
//! handful of fixtures.
#![cfg(feature = "proptest")]

use gatework::lexer::{Token, TokenizeOptions, tokenize};
use proptest::prelude::*;

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Identifier-shaped words; the character class cannot produce `-`, so
/// generated source never contains an accidental `--` comment.
fn arb_word() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,8}"
}

fn arb_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_word(),
        1 => Just("(".to_owned()),
        1 => Just(")".to_owned()),
        1 => Just(":".to_owned()),
        1 => Just(";".to_owned()),
        1 => Just(",".to_owned()),
    ]
}

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_atom(), 0..40).prop_map(|atoms| atoms.join(" "))
}

fn texts(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.text().to_owned()).collect()
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn test_tokenize_is_pure(src in arb_source()) {
        prop_assert_eq!(
            tokenize(&src, TokenizeOptions::display()),
            tokenize(&src, TokenizeOptions::display())
        );
        prop_assert_eq!(
            tokenize(&src, TokenizeOptions::structural()),
            tokenize(&src, TokenizeOptions::structural())
        );
    }

    #[test]
    fn test_display_stream_retokenizes_to_itself(src in arb_source()) {
        let tokens = tokenize(&src, TokenizeOptions::display());
        let rejoined = texts(&tokens).join(" ");
        prop_assert_eq!(tokenize(&rejoined, TokenizeOptions::display()), tokens);
    }

    #[test]
    fn test_structural_stream_is_folded_and_terminator_free(src in arb_source()) {
        for token in tokenize(&src, TokenizeOptions::structural()) {
            let text = token.text();
            prop_assert!(!matches!(text, "(" | ")" | ";"), "terminator leaked: {text}");
            prop_assert_eq!(text, text.to_ascii_lowercase());
            prop_assert!(!text.is_empty());
        }
    }

    #[test]
    fn test_trailing_comment_never_changes_tokens(src in arb_source(), junk in arb_word()) {
        let commented = format!("{src} -- {junk}");
        prop_assert_eq!(
            tokenize(&commented, TokenizeOptions::structural()),
            tokenize(&src, TokenizeOptions::structural())
        );
    }

    #[test]
    fn test_token_count_bounded_by_input_length(src in arb_source()) {
        let tokens = tokenize(&src, TokenizeOptions::display());
        prop_assert!(tokens.len() <= src.len());
    }
}
