// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for VCL.
//!
//! The AST represents the structure of a policy script after parsing.
//!
//! # Design Philosophy
//!
//! - **Optional locations** - nodes built by the parser carry a [`Location`];
//!   nodes synthesized by a rewrite carry none and print as "immediately
//!   following" their predecessor
//! - **Raw literals** - literal values keep their exact source text, quotes
//!   and unit suffixes included, so an unmodified literal round-trips
//!   byte-for-byte
//! - **Left-nested member chains** - `a.b.c` is `Member(Member(a, b), c)`
//! - **Comment preservation** - leading and trailing comments hang off
//!   statements and blocks for the formatter
//!
//! # Constructing nodes
//!
//! Every node is a plain enum variant plus a field record, so a rewrite
//! builds fragments the same way the parser does:
//!
//! ```
//! use vclkit_core::ast::{Expression, ExpressionKind, Statement, StatementKind};
//!
//! let log = Statement::new(StatementKind::Log {
//!     content: Expression::new(ExpressionKind::StringLiteral {
//!         value: "\"entered recv\"".into(),
//!     }),
//! });
//! assert!(log.loc.is_none());
//! ```
//!
//! The tree also implements `serde::Deserialize`, so the same record can
//! come from JSON.

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::source_analysis::Location;

/// A parsed policy script.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Statement>,
    /// Comments after the last statement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trailing_comments: Vec<Comment>,
    /// Comments inside a construct that no node claims. They are not
    /// printed; the formatter reports them instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unattached_comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

impl Program {
    #[must_use]
    pub fn new(body: Vec<Statement>) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }
}

/// A comment in the source code, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comment {
    /// Raw comment text: `# note`, `// note` or `/* note */`.
    pub text: EcoString,
    pub kind: CommentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// The kind of comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKind {
    /// `# text` or `// text`
    Line,
    /// `/* text */`
    Block,
}

impl Comment {
    /// Creates a line comment with no location, e.g. `Comment::line("# added")`.
    #[must_use]
    pub fn line(text: impl Into<EcoString>) -> Self {
        Self {
            text: text.into(),
            kind: CommentKind::Line,
            loc: None,
        }
    }
}

/// Comments attached to a statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentAttachment {
    /// Comments on the lines before the statement.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leading: Vec<Comment>,
    /// A comment after the statement on its last line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing: Option<Comment>,
}

impl CommentAttachment {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_none()
    }
}

/// A statement with its comments and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    #[serde(default, skip_serializing_if = "CommentAttachment::is_empty")]
    pub comments: CommentAttachment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

impl Statement {
    /// Creates a statement with no comments and no location.
    #[must_use]
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            comments: CommentAttachment::default(),
            loc: None,
        }
    }
}

impl From<StatementKind> for Statement {
    fn from(kind: StatementKind) -> Self {
        Self::new(kind)
    }
}

/// The closed set of statement forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// A bare expression: `esi;`
    Expression { body: Expression },
    /// `include "shared";`
    Include { module: Expression },
    /// `import boltsort;`
    Import { module: EcoString },
    /// `call vcl_recv_custom;`
    Call { subroutine: EcoString },
    /// `declare local var.count INTEGER;`
    Declare {
        id: Expression,
        value_type: EcoString,
    },
    /// `add req.http.X = "a";`
    Add {
        target: Expression,
        operator: AssignOperator,
        value: Expression,
    },
    /// `set req.http.X += "a";`
    Set {
        target: Expression,
        operator: AssignOperator,
        value: Expression,
    },
    /// `unset req.http.Cookie;` (`remove` parses to the same node)
    Unset { target: Expression },
    /// `return(lookup);` or `return;`
    Return { action: Option<EcoString> },
    /// `error 404 "Not Found";`
    Error {
        status: Expression,
        message: Option<Expression>,
    },
    /// `restart;`
    Restart,
    /// `synthetic {"..."};` or `synthetic.base64 "...";`
    Synthetic { response: Expression, base64: bool },
    /// `log "message";`
    Log { content: Expression },
    /// `if (...) { ... } else ...`
    If(IfStatement),
    /// `sub vcl_recv { ... }`
    Subroutine { name: EcoString, body: Block },
    /// `acl office { "192.0.2.0"/24; }`
    Acl {
        name: EcoString,
        entries: Vec<AclEntry>,
    },
    /// `backend origin { .host = "example.com"; }`
    Backend {
        name: EcoString,
        definitions: Vec<BackendDefinition>,
    },
    /// `table redirects STRING { "/a": "/b", }`
    Table {
        name: EcoString,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_type: Option<EcoString>,
        entries: Vec<TableEntry>,
    },
}

/// A conditional: test, consequent block and optional alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Block,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<Alternative>,
}

/// The `else` part of a conditional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alternative {
    /// `else if (...) { ... }`
    ElseIf(Box<IfStatement>),
    /// `else { ... }`
    Else(Block),
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    /// A comment on the same line as the opening `{`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_comment: Option<Comment>,
    /// Comments between the last statement and the closing `}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub closing_comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

impl Block {
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            ..Self::default()
        }
    }
}

/// One entry of an ACL: `"192.0.2.0"/24;` or `!"192.0.2.7";`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// An [`ExpressionKind::Ip`] literal.
    pub address: Expression,
    #[serde(default)]
    pub negated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// A `.key = ...` line inside a backend (or a nested block such as `.probe`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDefinition {
    /// Property name without the leading `.`.
    pub key: EcoString,
    pub value: BackendValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// The right-hand side of a backend definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendValue {
    /// `.host = "example.com";`
    Expression(Expression),
    /// `.probe = { .url = "/"; }`
    Nested(Vec<BackendDefinition>),
}

/// A `"key": value,` entry of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    /// The quoted key, quotes included.
    pub key: EcoString,
    pub value: Expression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

/// An expression with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Location>,
}

impl Expression {
    /// Creates an expression with no location.
    #[must_use]
    pub fn new(kind: ExpressionKind) -> Self {
        Self { kind, loc: None }
    }

    #[must_use]
    pub fn with_location(kind: ExpressionKind, loc: Location) -> Self {
        Self {
            kind,
            loc: Some(loc),
        }
    }

    #[must_use]
    pub fn identifier(name: impl Into<EcoString>) -> Self {
        Self::new(ExpressionKind::Identifier { name: name.into() })
    }

    /// A string literal from its unquoted text. VCL strings have no escape
    /// syntax, so `text` must not contain `"`.
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::new(ExpressionKind::StringLiteral {
            value: EcoString::from(format!("\"{text}\"")),
        })
    }

    /// Builds a left-nested member chain from a dotted path. A segment after
    /// `http` becomes a header reference.
    ///
    /// ```
    /// use vclkit_core::ast::{Expression, ExpressionKind};
    ///
    /// let host = Expression::path("req.http.Host");
    /// let ExpressionKind::Member { property, .. } = &host.kind else { panic!() };
    /// assert!(matches!(&property.kind, ExpressionKind::Header { name } if name == "Host"));
    /// ```
    #[must_use]
    pub fn path(dotted: &str) -> Self {
        let mut segments = dotted.split('.');
        let mut expr = Self::identifier(segments.next().unwrap_or_default());
        let mut previous = expr.segment_name().cloned();
        for segment in segments {
            let property = if previous.as_deref() == Some("http") {
                ExpressionKind::Header {
                    name: segment.into(),
                }
            } else {
                ExpressionKind::Identifier {
                    name: segment.into(),
                }
            };
            expr = Self::new(ExpressionKind::Member {
                base: Box::new(expr),
                property: Box::new(Self::new(property)),
            });
            previous = Some(segment.into());
        }
        expr
    }

    /// The name of the last segment of an identifier or member chain.
    #[must_use]
    pub fn segment_name(&self) -> Option<&EcoString> {
        match &self.kind {
            ExpressionKind::Identifier { name } | ExpressionKind::Header { name } => Some(name),
            ExpressionKind::Member { property, .. } => property.segment_name(),
            _ => None,
        }
    }
}

impl From<ExpressionKind> for Expression {
    fn from(kind: ExpressionKind) -> Self {
        Self::new(kind)
    }
}

/// The closed set of expression forms.
///
/// Literal values are raw source text: `"\"a\""`, `"{\"long\"}"`, `"3600s"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionKind {
    BooleanLiteral {
        value: EcoString,
    },
    StringLiteral {
        value: EcoString,
    },
    MultilineLiteral {
        value: EcoString,
    },
    DurationLiteral {
        value: EcoString,
    },
    NumericLiteral {
        value: EcoString,
    },
    Identifier {
        name: EcoString,
    },
    /// `base.property`, left-nested for chains.
    Member {
        base: Box<Expression>,
        property: Box<Expression>,
    },
    /// The name following `http` in a member chain: `X-Forwarded-For`.
    Header {
        name: EcoString,
    },
    /// `"192.0.2.0"/24`
    Ip {
        address: EcoString,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cidr: Option<EcoString>,
    },
    /// A parenthesized expression.
    BooleanGroup {
        body: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        argument: Box<Expression>,
    },
    FunctionCall {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Juxtaposed operands: `"a" req.url "b"`. Always two or more members.
    Concat {
        body: Vec<Expression>,
    },
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    Logical {
        left: Box<Expression>,
        operator: LogicalOperator,
        right: Box<Expression>,
    },
    /// `req.http.Cookie:session`
    ValuePair {
        base: Box<Expression>,
        name: Box<Expression>,
    },
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `-`
    Negate,
}

impl UnaryOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "!" => Some(Self::Not),
            "-" => Some(Self::Negate),
            _ => None,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    /// `~`, regex or ACL match
    Match,
    /// `!~`
    NotMatch,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl BinaryOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Match => "~",
            Self::NotMatch => "!~",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "~" => Self::Match,
            "!~" => Self::NotMatch,
            "<" => Self::Less,
            ">" => Self::Greater,
            "<=" => Self::LessEqual,
            ">=" => Self::GreaterEqual,
            _ => return None,
        })
    }
}

/// `&&` and `||`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            _ => None,
        }
    }
}

/// Operators accepted by `set` and `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    BitOrAssign,
    BitAndAssign,
    BitXorAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    AndAssign,
    OrAssign,
}

impl AssignOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::RemainderAssign => "%=",
            Self::BitOrAssign => "|=",
            Self::BitAndAssign => "&=",
            Self::BitXorAssign => "^=",
            Self::ShiftLeftAssign => "<<=",
            Self::ShiftRightAssign => ">>=",
            Self::AndAssign => "&&=",
            Self::OrAssign => "||=",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => Self::Assign,
            "+=" => Self::AddAssign,
            "-=" => Self::SubtractAssign,
            "*=" => Self::MultiplyAssign,
            "/=" => Self::DivideAssign,
            "%=" => Self::RemainderAssign,
            "|=" => Self::BitOrAssign,
            "&=" => Self::BitAndAssign,
            "^=" => Self::BitXorAssign,
            "<<=" => Self::ShiftLeftAssign,
            ">>=" => Self::ShiftRightAssign,
            "&&=" => Self::AndAssign,
            "||=" => Self::OrAssign,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_builds_left_nested_chain() {
        let expr = Expression::path("req.http.X-Forwarded-For");
        let ExpressionKind::Member { base, property } = &expr.kind else {
            panic!("expected member, got {expr:?}");
        };
        assert_eq!(
            property.kind,
            ExpressionKind::Header {
                name: "X-Forwarded-For".into()
            }
        );
        let ExpressionKind::Member { base, property } = &base.kind else {
            panic!("expected nested member");
        };
        assert_eq!(base.kind, ExpressionKind::Identifier { name: "req".into() });
        assert_eq!(property.kind, ExpressionKind::Identifier { name: "http".into() });
    }

    #[test]
    fn path_single_segment_is_identifier() {
        assert_eq!(Expression::path("esi"), Expression::identifier("esi"));
    }

    #[test]
    fn string_adds_quotes() {
        assert_eq!(
            Expression::string("hi").kind,
            ExpressionKind::StringLiteral {
                value: "\"hi\"".into()
            }
        );
    }

    #[test]
    fn operator_symbols_round_trip() {
        for symbol in ["==", "!=", "~", "!~", "<", ">", "<=", ">="] {
            let op = BinaryOperator::from_symbol(symbol).expect("comparison");
            assert_eq!(op.as_str(), symbol);
        }
        for symbol in [
            "=", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", "<<=", ">>=", "&&=", "||=",
        ] {
            let op = AssignOperator::from_symbol(symbol).expect("assignment");
            assert_eq!(op.as_str(), symbol);
        }
        assert_eq!(LogicalOperator::from_symbol("&&"), Some(LogicalOperator::And));
        assert_eq!(UnaryOperator::from_symbol("!"), Some(UnaryOperator::Not));
        assert!(BinaryOperator::from_symbol("&&").is_none());
    }

    #[test]
    fn statement_from_kind_has_no_location() {
        let stmt: Statement = StatementKind::Restart.into();
        assert!(stmt.loc.is_none());
        assert!(stmt.comments.is_empty());
    }
}
