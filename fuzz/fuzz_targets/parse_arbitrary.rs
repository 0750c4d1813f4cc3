// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for parser crash safety and printer round trips.
//!
//! Arbitrary bytes go through the lexer and parser, which must never panic.
//! Input that parses is printed and parsed again; the second parse must
//! succeed and give back the same tree, locations aside.
//!
//! # Corpus Seeding
//!
//! Seed `fuzz/corpus/parse_arbitrary/` with real `.vcl` files for realistic
//! starting points.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vclkit_core::parse_source;
use vclkit_core::unparse::unparse_program;

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 is rejected before the lexer ever sees it
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut program) = parse_source(source) else {
        return;
    };
    // Inner comments are dropped by the printer, so the trees would differ
    if !program.unattached_comments.is_empty() {
        return;
    }

    let printed = unparse_program(&program);
    let mut reparsed = match parse_source(&printed) {
        Ok(reparsed) => reparsed,
        Err(err) => panic!("printed output does not parse: {err}\n{printed}"),
    };
    program.strip_locations();
    reparsed.strip_locations();
    assert_eq!(reparsed, program, "round trip changed the tree:\n{printed}");
});
