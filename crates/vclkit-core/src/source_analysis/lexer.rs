// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for VCL source code.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written so it can keep exact source text and comments.
//!
//! # Design Principles
//!
//! - **Never fail**: malformed input becomes a [`TokenKind::Error`] token and
//!   the parser turns it into a syntax error
//! - **Trivia preservation**: whitespace and comments ride along on tokens
//! - **Precise locations**: every token carries byte offsets plus 1-based
//!   line and column
//!
//! # Example
//!
//! ```
//! use vclkit_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("set x = 1;").collect();
//! assert_eq!(tokens.len(), 5); // set, x, =, 1, ; (EOF excluded from iterator)
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{Location, Position, Token, TokenKind, Trivia};

/// Operators recognised by maximal munch, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&&=", "||=", "==", "!=", "!~", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=",
    "%=", "|=", "&=", "^=", "~", "<", ">", "!", "+", "-", "=",
];

/// A lexer that tokenizes VCL source code.
///
/// It implements [`Iterator`]; the iterator stops before the end-of-file
/// token. Use [`lex_with_eof`] to get a stream the parser accepts.
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    line: u32,
    column: u32,
    /// Pending trivia to attach to the next token.
    pending_trivia: Vec<Trivia>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            line: 1,
            column: 1,
            pending_trivia: Vec::new(),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is the same as
    /// `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn current_position(&self) -> Position {
        Position::new(self.position as u32, self.line, self.column)
    }

    fn location_from(&self, start: Position) -> Location {
        Location::new(start, self.current_position())
    }

    fn text_for(&self, loc: Location) -> &'src str {
        &self.source[loc.start.offset as usize..loc.end.offset as usize]
    }

    /// Skips whitespace and comments, collecting them as trivia.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    let start = self.current_position();
                    self.advance_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                    let text = self.text_for(self.location_from(start));
                    self.pending_trivia
                        .push(Trivia::Whitespace(EcoString::from(text)));
                }
                Some('#') => self.lex_line_comment(),
                Some('/') if self.peek_char_n(1) == Some('/') => self.lex_line_comment(),
                Some('/') if self.peek_char_n(1) == Some('*') && self.block_comment_closes() => {
                    self.lex_block_comment();
                }
                _ => break,
            }
        }
    }

    /// Lexes a line comment: `# ...` or `// ...`
    ///
    /// Spaces and tabs before the end of the line are left as whitespace
    /// trivia, so the comment text never ends in blanks.
    fn lex_line_comment(&mut self) {
        let start = self.current_position();
        loop {
            self.advance_while(|c| !matches!(c, '\n' | '\r' | ' ' | '\t'));
            let mut blanks = 0;
            while matches!(self.peek_char_n(blanks), Some(' ' | '\t')) {
                blanks += 1;
            }
            if matches!(self.peek_char_n(blanks), None | Some('\n' | '\r')) {
                break;
            }
            for _ in 0..blanks {
                self.advance();
            }
        }
        let loc = self.location_from(start);
        self.pending_trivia
            .push(Trivia::LineComment(EcoString::from(self.text_for(loc)), loc));
    }

    /// Lexes a block comment: `/* ... */`
    fn lex_block_comment(&mut self) {
        let start = self.current_position();
        self.advance(); // /
        self.advance(); // *

        loop {
            match self.peek_char() {
                None => break,
                Some('*') if self.peek_char_n(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }

        let loc = self.location_from(start);
        self.pending_trivia
            .push(Trivia::BlockComment(EcoString::from(self.text_for(loc)), loc));
    }

    /// Whether the `/*` at the cursor has a matching `*/`. An unclosed one
    /// is lexed as an error token instead of trivia.
    fn block_comment_closes(&self) -> bool {
        self.source
            .get(self.position + 2..)
            .is_some_and(|rest| rest.contains("*/"))
    }

    fn lex_token(&mut self) -> Token {
        self.skip_trivia();
        let leading_trivia = std::mem::take(&mut self.pending_trivia);

        let start = self.current_position();
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.lex_token_kind(c, start),
        };
        let location = self.location_from(start);

        self.collect_trailing_trivia();
        let trailing_trivia = std::mem::take(&mut self.pending_trivia);

        Token::with_trivia(kind, location, leading_trivia, trailing_trivia)
    }

    /// Collects trailing trivia (same-line whitespace and a line comment).
    fn collect_trailing_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ' | '\t') => {
                    let start = self.current_position();
                    self.advance_while(|c| matches!(c, ' ' | '\t'));
                    let text = self.text_for(self.location_from(start));
                    self.pending_trivia
                        .push(Trivia::Whitespace(EcoString::from(text)));
                }
                Some('#') => {
                    self.lex_line_comment();
                    break;
                }
                Some('/') if self.peek_char_n(1) == Some('/') => {
                    self.lex_line_comment();
                    break;
                }
                _ => break,
            }
        }
    }

    fn lex_token_kind(&mut self, c: char, start: Position) -> TokenKind {
        match c {
            'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier(start),
            '0'..='9' => self.lex_number(start),
            '"' => self.lex_string(start),
            '{' => self.lex_long_string_or_brace(start),
            '}' => self.single(TokenKind::RightBrace),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),
            ':' => self.single(TokenKind::Colon),
            '/' if self.peek_char_n(1) == Some('*') => {
                self.advance_while(|_| true);
                TokenKind::Error("unterminated block comment".into())
            }
            '/' if self.peek_char_n(1) != Some('=') => self.single(TokenKind::Slash),
            _ => self.lex_operator(c),
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Lexes an identifier. Dashes are allowed inside a name when followed
    /// by an alphanumeric character, so header names like `X-Forwarded-For`
    /// stay one token while `x-=1` still splits.
    fn lex_identifier(&mut self, start: Position) -> TokenKind {
        loop {
            match self.peek_char() {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                    self.advance();
                }
                Some('-') if self.peek_char_n(1).is_some_and(|c| c.is_ascii_alphanumeric()) => {
                    self.advance();
                }
                _ => break,
            }
        }
        TokenKind::Identifier(EcoString::from(self.text_for(self.location_from(start))))
    }

    /// Lexes a number with an optional fraction and unit suffix. The parser
    /// decides whether the suffix is valid.
    fn lex_number(&mut self, start: Position) -> TokenKind {
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }
        self.advance_while(|c| c.is_ascii_alphabetic());
        TokenKind::Number(EcoString::from(self.text_for(self.location_from(start))))
    }

    /// Lexes a single-line string. VCL strings have no escapes.
    fn lex_string(&mut self, start: Position) -> TokenKind {
        self.advance(); // opening quote
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return TokenKind::Error("unterminated string literal".into());
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        TokenKind::String(EcoString::from(self.text_for(self.location_from(start))))
    }

    /// Lexes `{"..."}` or `{TAG"..."TAG}` as a long string, otherwise a
    /// plain `{`.
    fn lex_long_string_or_brace(&mut self, start: Position) -> TokenKind {
        let mut tag_len = 0;
        while self
            .peek_char_n(tag_len + 1)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            tag_len += 1;
        }
        if self.peek_char_n(tag_len + 1) != Some('"') {
            return self.single(TokenKind::LeftBrace);
        }

        for _ in 0..tag_len + 2 {
            self.advance(); // `{`, the tag, and `"`
        }
        let tag_start = start.offset as usize + 1;
        let terminator = format!("\"{}}}", &self.source[tag_start..tag_start + tag_len]);

        loop {
            if self.source[self.position..].starts_with(&terminator) {
                for _ in 0..terminator.len() {
                    self.advance();
                }
                break;
            }
            if self.advance().is_none() {
                return TokenKind::Error("unterminated long string literal".into());
            }
        }
        TokenKind::LongString(EcoString::from(self.text_for(self.location_from(start))))
    }

    fn lex_operator(&mut self, c: char) -> TokenKind {
        let rest = &self.source[self.position..];
        match OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            Some(op) => {
                for _ in 0..op.len() {
                    self.advance();
                }
                TokenKind::Operator(EcoString::from(*op))
            }
            None => {
                self.advance();
                TokenKind::Error(EcoString::from(format!("unexpected character `{c}`")))
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.lex_token();
        if token.kind().is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

/// Lexes source into tokens, excluding the end-of-file token.
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lexes source into tokens, ending with an end-of-file token that carries
/// any comments after the last real token.
pub fn lex_with_eof(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex_token();
        let is_eof = token.kind().is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(Token::into_kind).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    fn op(text: &str) -> TokenKind {
        TokenKind::Operator(text.into())
    }

    #[test]
    fn lex_empty() {
        assert!(lex_kinds("").is_empty());
        let tokens = lex_with_eof("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].kind().is_eof());
    }

    #[test]
    fn lex_set_statement() {
        assert_eq!(
            lex_kinds("set req.http.X-Host = \"a\";"),
            vec![
                ident("set"),
                ident("req"),
                TokenKind::Dot,
                ident("http"),
                TokenKind::Dot,
                ident("X-Host"),
                op("="),
                TokenKind::String("\"a\"".into()),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lex_dash_needs_following_alphanumeric() {
        assert_eq!(lex_kinds("x-=1"), vec![ident("x"), op("-="), TokenKind::Number("1".into())]);
        assert_eq!(lex_kinds("a-b"), vec![ident("a-b")]);
    }

    #[test]
    fn lex_numbers_keep_suffix() {
        assert_eq!(
            lex_kinds("0 35s 1.5 100ms 035"),
            vec![
                TokenKind::Number("0".into()),
                TokenKind::Number("35s".into()),
                TokenKind::Number("1.5".into()),
                TokenKind::Number("100ms".into()),
                TokenKind::Number("035".into()),
            ]
        );
    }

    #[test]
    fn lex_operators_maximal_munch() {
        assert_eq!(
            lex_kinds("== != !~ ~ ! && || <= < >>= +="),
            vec![
                op("=="),
                op("!="),
                op("!~"),
                op("~"),
                op("!"),
                op("&&"),
                op("||"),
                op("<="),
                op("<"),
                op(">>="),
                op("+="),
            ]
        );
    }

    #[test]
    fn lex_slash_in_acl_entry() {
        assert_eq!(
            lex_kinds("\"10.0.0.0\"/8;"),
            vec![
                TokenKind::String("\"10.0.0.0\"".into()),
                TokenKind::Slash,
                TokenKind::Number("8".into()),
                TokenKind::Semicolon,
            ]
        );
        assert_eq!(lex_kinds("/="), vec![op("/=")]);
    }

    #[test]
    fn lex_long_strings() {
        assert_eq!(
            lex_kinds("{\"line one\nline two\"}"),
            vec![TokenKind::LongString("{\"line one\nline two\"}".into())]
        );
        assert_eq!(
            lex_kinds("{EOF\"has \"} inside\"EOF}"),
            vec![TokenKind::LongString("{EOF\"has \"} inside\"EOF}".into())]
        );
        assert_eq!(
            lex_kinds("{ x }"),
            vec![TokenKind::LeftBrace, ident("x"), TokenKind::RightBrace]
        );
    }

    #[test]
    fn lex_comments_as_trivia() {
        let tokens = lex("# hash\n// slashes\n/* block */ x # trailing\ny");
        assert_eq!(tokens.len(), 2);
        let comments: Vec<_> = tokens[0]
            .leading_trivia()
            .iter()
            .filter(|t| t.is_comment())
            .map(Trivia::as_str)
            .collect();
        assert_eq!(comments, vec!["# hash", "// slashes", "/* block */"]);
        assert!(tokens[0].has_trailing_comment());
        assert!(!tokens[1].has_leading_comment());
    }

    #[test]
    fn lex_comment_locations() {
        let tokens = lex("\n\n# third line\nx");
        let loc = tokens[0].leading_trivia()[1]
            .location()
            .expect("comment has a location");
        assert_eq!(loc.start.line, 3);
        assert_eq!(loc.start.column, 1);
    }

    #[test]
    fn lex_locations_are_correct() {
        let tokens = lex("sub foo {\n  bar;\n}");
        assert_eq!(tokens[0].location().start, Position::new(0, 1, 1));
        assert_eq!(tokens[1].location().start, Position::new(4, 1, 5));
        assert_eq!(tokens[1].location().end, Position::new(7, 1, 8));
        assert_eq!(tokens[3].location().start, Position::new(12, 2, 3));
        assert_eq!(tokens[5].location().start.line, 3);
    }

    #[test]
    fn lex_trailing_eof_keeps_comments() {
        let tokens = lex_with_eof("x;\n# last");
        let eof = tokens.last().expect("eof token");
        assert!(eof.kind().is_eof());
        assert!(eof.has_leading_comment());
    }

    #[test]
    fn lex_error_recovery_unknown_char() {
        let kinds = lex_kinds("x § y");
        assert_eq!(kinds.len(), 3);
        assert!(matches!(kinds[1], TokenKind::Error(_)));
        assert_eq!(kinds[2], ident("y"));
    }

    #[test]
    fn lex_error_unterminated_strings() {
        assert!(matches!(&lex_kinds("\"open")[0], TokenKind::Error(_)));
        assert!(matches!(&lex_kinds("\"open\n\"")[0], TokenKind::Error(_)));
        assert!(matches!(&lex_kinds("{\"never closed")[0], TokenKind::Error(_)));
    }

    #[test]
    fn lex_error_unterminated_block_comment() {
        let tokens = lex_with_eof("x; /* open\ny;");
        assert_eq!(tokens.len(), 4);
        assert_eq!(
            tokens[2].kind(),
            &TokenKind::Error("unterminated block comment".into())
        );
        assert_eq!(tokens[2].location().start.column, 4);
        assert_eq!(tokens[2].location().end.offset, 13);
        assert!(tokens[3].kind().is_eof());
    }

    #[test]
    fn line_comments_drop_trailing_blanks() {
        let tokens = lex("# lead  \t\nx; // why \ny");
        let leading: Vec<_> = tokens[0]
            .leading_trivia()
            .iter()
            .filter(|t| t.is_comment())
            .map(Trivia::as_str)
            .collect();
        assert_eq!(leading, vec!["# lead"]);
        let trailing: Vec<_> = tokens[1]
            .trailing_trivia()
            .iter()
            .filter(|t| t.is_comment())
            .map(Trivia::as_str)
            .collect();
        assert_eq!(trailing, vec!["// why"]);
        assert_eq!(lex_with_eof("#  a  b ")[0].leading_trivia()[0].as_str(), "#  a  b");
    }
}
