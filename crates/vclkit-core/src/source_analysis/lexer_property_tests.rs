// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the VCL lexer.
//!
//! 1. **Lexer never panics** on arbitrary input
//! 2. **Token locations within input** and ordered
//! 3. **EOF is always last** from `lex_with_eof`
//! 4. **Nothing is dropped** - tokens plus trivia cover every input byte
//! 5. **Valid fragments produce no errors**

use proptest::prelude::*;

use super::lexer::{lex, lex_with_eof};
use super::token::Trivia;

// ============================================================================
// Generators
// ============================================================================

const VALID_FRAGMENTS: &[&str] = &[
    "42",
    "0.5",
    "3600s",
    "100ms",
    "\"hello\"",
    "{\"long\nstring\"}",
    "{EOF\"tagged \"quoted\" text\"EOF}",
    "req.http.X-Forwarded-For",
    "set x = 1;",
    "a == b && c != d || !e",
    "x ~ \"^/\" && y !~ \"z\"",
    "v += 1; v -= 1; v <<= 2; v ||= true;",
    "\"192.0.2.0\"/24;",
    "f(a, b,)",
    "req.http.Cookie:session",
    "# comment\nesi;",
    "// comment\nesi; /* block */",
];

fn valid_fragment() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_FRAGMENTS).prop_map(std::string::ToString::to_string)
}

// ============================================================================
// Property tests
// ============================================================================

/// At least 512 cases; `PROPTEST_CASES` can raise it for extended runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

fn trivia_len(trivia: &[Trivia]) -> usize {
    trivia.iter().map(|t| t.as_str().len()).sum()
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: Lexer never panics on arbitrary string input.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,500}") {
        let _tokens = lex(&input);
    }

    /// Property 2: Token locations are within input bounds and ordered.
    #[test]
    fn token_locations_within_input(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for token in &tokens {
            let loc = token.location();
            prop_assert!(
                loc.end.offset <= input_len,
                "token {:?} ends at {} beyond input length {} for input {:?}",
                token.kind(),
                loc.end.offset,
                input_len,
                input,
            );
            prop_assert!(loc.start.offset <= loc.end.offset);
        }
        for window in tokens.windows(2) {
            prop_assert!(
                window[1].location().start.offset >= window[0].location().end.offset,
                "overlapping tokens {:?} and {:?} for input {:?}",
                window[0].kind(),
                window[1].kind(),
                input,
            );
        }
    }

    /// Property 3: lex_with_eof always ends with EOF.
    #[test]
    fn eof_always_last(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        prop_assert!(tokens.last().is_some_and(|t| t.kind().is_eof()));
    }

    /// Property 4: tokens and trivia together account for every byte.
    #[test]
    fn tokens_and_trivia_cover_input(input in "[ -~\n\t]{0,300}") {
        let covered: usize = lex_with_eof(&input)
            .iter()
            .map(|token| {
                trivia_len(token.leading_trivia())
                    + token.location().len() as usize
                    + trivia_len(token.trailing_trivia())
            })
            .sum();
        prop_assert_eq!(covered, input.len(), "input {:?}", input);
    }

    /// Property 5: Known-valid fragments produce no error tokens.
    #[test]
    fn valid_fragments_no_errors(input in valid_fragment()) {
        for token in &lex(&input) {
            prop_assert!(
                !token.kind().is_error(),
                "valid input {:?} produced error token {:?}",
                input,
                token.kind(),
            );
        }
    }
}
