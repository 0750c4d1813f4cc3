// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Wadler-Lindig document tree for the pretty-printer.
//!
//! Printer functions return `Document` values describing layout; a single
//! render pass turns them into text. A [`group`] is laid out flat when its
//! contents fit in the remaining width and broken otherwise, outer groups
//! first.
//!
//! # Example
//!
//! ```
//! use vclkit_core::docvec;
//! use vclkit_core::unparse::document::{group, nest, softline};
//!
//! let doc = group(docvec!["f(", nest(2, docvec![softline(), "argument"]), softline(), ")"]);
//! assert_eq!(doc.to_pretty_string(80), "f(argument)");
//! assert_eq!(doc.to_pretty_string(8), "f(\n  argument\n)");
//! ```
//!
//! Based on Gleam's Document implementation.

/// A pretty-printable document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    /// A borrowed string literal.
    Str(&'a str),
    /// An owned string.
    String(String),
    /// A mandatory newline followed by the current indentation.
    Line,
    /// Increase indentation for nested content.
    Nest(isize, Box<Document<'a>>),
    /// A sequence of documents.
    Vec(Vec<Document<'a>>),
    /// A group that is rendered flat or broken as a unit.
    Group(Box<Document<'a>>),
    /// A break point: `unbroken` when flat, `broken` then a newline when broken.
    Break { broken: &'a str, unbroken: &'a str },
    /// Picks a branch by the mode of the enclosing group.
    IfBreak {
        broken: Box<Document<'a>>,
        flat: Box<Document<'a>>,
    },
    /// Empty document.
    Nil,
}

/// Coerce a value into a `Document`.
pub trait Documentable<'a> {
    fn to_doc(self) -> Document<'a>;
}

impl<'a> Documentable<'a> for &'a str {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self)
    }
}

impl<'a> Documentable<'a> for String {
    fn to_doc(self) -> Document<'a> {
        Document::String(self)
    }
}

impl<'a> Documentable<'a> for ecow::EcoString {
    fn to_doc(self) -> Document<'a> {
        Document::String(self.into())
    }
}

impl<'a> Documentable<'a> for Document<'a> {
    fn to_doc(self) -> Document<'a> {
        self
    }
}

impl<'a> Documentable<'a> for Vec<Document<'a>> {
    fn to_doc(self) -> Document<'a> {
        Document::Vec(self)
    }
}

/// Join multiple documents together in a vector.
///
/// Each element is converted via [`Documentable`]; no separator is inserted.
///
/// ```
/// use vclkit_core::docvec;
///
/// let doc = docvec!["hello", " ", "world"];
/// assert_eq!(doc.to_pretty_string(80), "hello world");
/// ```
#[macro_export]
macro_rules! docvec {
    () => {
        $crate::unparse::document::Document::Vec(Vec::new())
    };

    ($first:expr $(,)?) => {
        $crate::unparse::document::Document::Vec(
            vec![$crate::unparse::document::Documentable::to_doc($first)]
        )
    };

    ($first:expr, $($rest:expr),+ $(,)?) => {
        match $crate::unparse::document::Documentable::to_doc($first) {
            $crate::unparse::document::Document::Vec(mut vec) => {
                $(
                    vec.push($crate::unparse::document::Documentable::to_doc($rest));
                )*
                $crate::unparse::document::Document::Vec(vec)
            },
            first => {
                $crate::unparse::document::Document::Vec(
                    vec![first, $($crate::unparse::document::Documentable::to_doc($rest)),+]
                )
            }
        }
    };
}

/// A mandatory newline.
#[must_use]
pub fn line() -> Document<'static> {
    Document::Line
}

/// Alias of [`line`] for readability next to the soft breaks.
#[must_use]
pub fn hardline() -> Document<'static> {
    Document::Line
}

/// A space when flat, a newline when broken.
#[must_use]
pub fn softbreak() -> Document<'static> {
    Document::Break {
        broken: "",
        unbroken: " ",
    }
}

/// Nothing when flat, a newline when broken.
#[must_use]
pub fn softline() -> Document<'static> {
    Document::Break {
        broken: "",
        unbroken: "",
    }
}

#[must_use]
pub fn nil() -> Document<'static> {
    Document::Nil
}

#[must_use]
pub fn nest(indent: isize, doc: Document<'_>) -> Document<'_> {
    Document::Nest(indent, Box::new(doc))
}

#[must_use]
pub fn group(doc: Document<'_>) -> Document<'_> {
    Document::Group(Box::new(doc))
}

/// `broken` when the enclosing group breaks, `flat` otherwise.
#[must_use]
pub fn if_break<'a>(broken: Document<'a>, flat: Document<'a>) -> Document<'a> {
    Document::IfBreak {
        broken: Box::new(broken),
        flat: Box::new(flat),
    }
}

/// Joins documents with a separator between each pair.
#[must_use]
pub fn join<'a>(
    docs: impl IntoIterator<Item = Document<'a>>,
    separator: &Document<'a>,
) -> Document<'a> {
    let mut result = Vec::new();
    for doc in docs {
        if !result.is_empty() {
            result.push(separator.clone());
        }
        result.push(doc);
    }
    Document::Vec(result)
}

/// Concatenates documents without any separator.
#[must_use]
pub fn concat<'a>(docs: impl IntoIterator<Item = Document<'a>>) -> Document<'a> {
    Document::Vec(docs.into_iter().collect())
}

// --- Rendering ---

/// Stack headroom kept free before `stacker` allocates a new segment, and
/// the size of that segment. Documents for long operator chains nest deeply.
const RED_ZONE: usize = 32 * 1024;
const STACK_SEGMENT: usize = 256 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Breaks render as their unbroken string.
    Flat,
    /// Breaks render as newlines.
    Break,
}

impl Document<'_> {
    /// Renders the document, fitting groups into `width` columns.
    #[must_use]
    pub fn to_pretty_string(&self, width: usize) -> String {
        let mut renderer = Renderer {
            output: String::new(),
            column: 0,
            width: isize::try_from(width).unwrap_or(isize::MAX),
        };
        renderer.render(self, 0, Mode::Break, 0);
        trim_trailing_spaces(&mut renderer.output);
        renderer.output
    }

    /// Width of the document laid out flat, or `None` if it cannot be flat.
    fn flat_width(&self) -> Option<isize> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || match self {
            Document::Str(text) => text_width(text),
            Document::String(text) => text_width(text),
            Document::Line => None,
            Document::Nil => Some(0),
            Document::Nest(_, doc) | Document::Group(doc) => doc.flat_width(),
            Document::IfBreak { flat, .. } => flat.flat_width(),
            Document::Break { unbroken, .. } => text_width(unbroken),
            Document::Vec(docs) => docs
                .iter()
                .try_fold(0, |total, doc| Some(total + doc.flat_width()?)),
        })
    }
}

/// Width of text on one line; multi-line text never fits.
fn text_width(text: &str) -> Option<isize> {
    if text.contains('\n') {
        None
    } else {
        isize::try_from(text.chars().count()).ok()
    }
}

/// How far the text after a document runs before the line can end.
#[derive(Debug, Clone, Copy)]
struct Tail {
    width: isize,
    /// A newline is certain before the end of the tail.
    ends_line: bool,
}

impl Tail {
    const EMPTY: Self = Self {
        width: 0,
        ends_line: false,
    };

    fn then(self, next: impl FnOnce() -> Self) -> Self {
        if self.ends_line {
            return self;
        }
        let next = next();
        Self {
            width: self.width + next.width,
            ends_line: next.ends_line,
        }
    }
}

/// Measures `docs` up to the first line break they would produce in `mode`.
/// Undecided groups are measured in the enclosing mode, so a later group
/// that can break ends the measurement at its first soft break.
fn tail_of(docs: &[Document<'_>], mode: Mode) -> Tail {
    docs.iter()
        .fold(Tail::EMPTY, |tail, doc| tail.then(|| tail_of_doc(doc, mode)))
}

fn tail_of_doc(doc: &Document<'_>, mode: Mode) -> Tail {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || tail_of_doc_inner(doc, mode))
}

fn tail_of_doc_inner(doc: &Document<'_>, mode: Mode) -> Tail {
    let text = |text: &str| match text.find('\n') {
        Some(newline) => Tail {
            width: isize::try_from(text[..newline].chars().count()).unwrap_or(isize::MAX),
            ends_line: true,
        },
        None => Tail {
            width: isize::try_from(text.chars().count()).unwrap_or(isize::MAX),
            ends_line: false,
        },
    };
    match doc {
        Document::Str(s) => text(s),
        Document::String(s) => text(s),
        Document::Line => Tail {
            width: 0,
            ends_line: true,
        },
        Document::Nil => Tail::EMPTY,
        Document::Nest(_, doc) | Document::Group(doc) => tail_of_doc(doc, mode),
        Document::Vec(docs) => tail_of(docs, mode),
        Document::Break { unbroken, .. } => match mode {
            Mode::Flat => text(unbroken),
            Mode::Break => Tail {
                width: 0,
                ends_line: true,
            },
        },
        Document::IfBreak { broken, flat } => match mode {
            Mode::Flat => tail_of_doc(flat, mode),
            Mode::Break => tail_of_doc(broken, mode),
        },
    }
}

struct Renderer {
    output: String,
    column: isize,
    width: isize,
}

impl Renderer {
    /// Renders `doc` at `indent` in `mode`. `trailing` is the width of the
    /// text that must follow on the same line once `doc` ends.
    fn render(&mut self, doc: &Document<'_>, indent: isize, mode: Mode, trailing: isize) {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || match doc {
            Document::Str(text) => self.text(text),
            Document::String(text) => self.text(text),
            Document::Nil => {}
            Document::Line => self.newline(indent),
            Document::Nest(extra, doc) => self.render(doc, indent + extra, mode, trailing),
            Document::Vec(docs) => {
                for (index, doc) in docs.iter().enumerate() {
                    let tail = tail_of(&docs[index + 1..], mode);
                    let trailing = if tail.ends_line {
                        tail.width
                    } else {
                        tail.width + trailing
                    };
                    self.render(doc, indent, mode, trailing);
                }
            }
            Document::Group(doc) => {
                let mode = match mode {
                    Mode::Flat => Mode::Flat,
                    Mode::Break => {
                        let remaining = self.width - self.column - trailing;
                        if doc.flat_width().is_some_and(|width| width <= remaining) {
                            Mode::Flat
                        } else {
                            Mode::Break
                        }
                    }
                };
                self.render(doc, indent, mode, trailing);
            }
            Document::Break { broken, unbroken } => match mode {
                Mode::Flat => self.text(unbroken),
                Mode::Break => {
                    self.text(broken);
                    self.newline(indent);
                }
            },
            Document::IfBreak { broken, flat } => match mode {
                Mode::Flat => self.render(flat, indent, mode, trailing),
                Mode::Break => self.render(broken, indent, mode, trailing),
            },
        });
    }

    fn text(&mut self, text: &str) {
        self.output.push_str(text);
        let last_line = match text.rfind('\n') {
            Some(newline) => {
                self.column = 0;
                &text[newline + 1..]
            }
            None => text,
        };
        self.column += isize::try_from(last_line.chars().count()).unwrap_or(isize::MAX);
    }

    fn newline(&mut self, indent: isize) {
        trim_trailing_spaces(&mut self.output);
        self.output.push('\n');
        let indent = indent.max(0);
        for _ in 0..indent {
            self.output.push(' ');
        }
        self.column = indent;
    }
}

fn trim_trailing_spaces(output: &mut String) {
    let trimmed = output.trim_end_matches([' ', '\t']).len();
    output.truncate(trimmed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_and_string_documents() {
        assert_eq!(Document::Str("hello").to_pretty_string(80), "hello");
        assert_eq!(Document::String("world".to_string()).to_pretty_string(80), "world");
        assert_eq!(nil().to_pretty_string(80), "");
    }

    #[test]
    fn nest_applies_after_line() {
        let doc = docvec!["sub a {", nest(2, docvec![line(), "esi;"]), line(), "}"];
        assert_eq!(doc.to_pretty_string(80), "sub a {\n  esi;\n}");
    }

    #[test]
    fn nested_nest() {
        let doc = nest(
            2,
            docvec![line(), "outer", nest(2, docvec![line(), "inner"])],
        );
        assert_eq!(doc.to_pretty_string(80), "\n  outer\n    inner");
    }

    #[test]
    fn docvec_flattens_leading_vec() {
        let inner = docvec!["a", "b"];
        let doc = docvec![inner, "c"];
        assert_eq!(doc.to_pretty_string(80), "abc");
        let Document::Vec(v) = doc else {
            panic!("expected Vec");
        };
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn join_documents() {
        let doc = join(
            vec![Document::Str("a"), Document::Str("b"), Document::Str("c")],
            &Document::Str(", "),
        );
        assert_eq!(doc.to_pretty_string(80), "a, b, c");
        assert_eq!(join(Vec::new(), &Document::Str(", ")).to_pretty_string(80), "");
    }

    #[test]
    fn group_stays_flat_when_it_fits() {
        let doc = group(docvec!["a", softbreak(), "b"]);
        assert_eq!(doc.to_pretty_string(80), "a b");
    }

    #[test]
    fn group_breaks_when_too_wide() {
        let doc = group(docvec!["aaaa", softbreak(), "bbbb"]);
        assert_eq!(doc.to_pretty_string(6), "aaaa\nbbbb");
    }

    #[test]
    fn group_with_hard_line_always_breaks() {
        let doc = group(docvec!["a", softbreak(), "b", line(), "c"]);
        assert_eq!(doc.to_pretty_string(80), "a\nb\nc");
    }

    #[test]
    fn text_after_group_counts_against_its_width() {
        // "(xxxx) {" is 8 wide; the group alone is 6.
        let doc = docvec![
            group(docvec!["(", nest(2, docvec![softline(), "xxxx"]), softline(), ")"]),
            " {",
        ];
        assert_eq!(doc.to_pretty_string(8), "(xxxx) {");
        assert_eq!(doc.to_pretty_string(7), "(\n  xxxx\n) {");
    }

    #[test]
    fn outer_group_breaks_first() {
        let inner = group(docvec!["b", softbreak(), "c"]);
        let doc = group(docvec!["aa", nest(2, docvec![softbreak(), inner])]);
        assert_eq!(doc.to_pretty_string(5), "aa\n  b c");
    }

    #[test]
    fn if_break_follows_group_mode() {
        let doc = |width| {
            group(docvec![
                "f(",
                nest(2, docvec![softline(), "arg", if_break(Document::Str(","), nil())]),
                softline(),
                ")",
            ])
            .to_pretty_string(width)
        };
        assert_eq!(doc(80), "f(arg)");
        assert_eq!(doc(4), "f(\n  arg,\n)");
    }

    #[test]
    fn multiline_text_never_fits_flat() {
        let doc = group(docvec!["x", softbreak(), "{\"a\nb\"}"]);
        assert_eq!(doc.to_pretty_string(80), "x\n{\"a\nb\"}");
    }

    #[test]
    fn trailing_spaces_are_trimmed() {
        let doc = docvec!["a ", line(), nest(2, docvec![line(), "b"]), "  "];
        assert_eq!(doc.to_pretty_string(80), "a\n\n  b");
    }
}
