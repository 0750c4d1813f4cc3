// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Mutable pre-order traversal of the AST.
//!
//! Every node is reachable as a [`NodeMut`], and every `NodeMut` lists its
//! immediate structural children with [`NodeMut::children`]. A child is
//! either a single node or a whole list ([`ChildSlot`]); literal and name
//! fields are not children.
//!
//! [`traverse`] calls [`Visitor::entry`] on a node before descending into
//! it, so a visitor can rewrite the node in place, including splicing
//! statements into a block it is looking at. Lists are walked by index with
//! the length re-read after every element, so an element inserted ahead of
//! the cursor is visited exactly once.
//!
//! ```
//! use vclkit_core::ast::{Expression, ExpressionKind, Statement, StatementKind};
//! use vclkit_core::ast_walker::{Ancestor, NodeMut, traverse};
//!
//! let mut program = vclkit_core::parse_source("sub vcl_recv { esi; }").unwrap();
//! traverse(NodeMut::Program(&mut program), &mut |node: NodeMut<'_>, _: &[Ancestor]| {
//!     if let NodeMut::Block(block) = node {
//!         block.statements.insert(0, Statement::new(StatementKind::Log {
//!             content: Expression::string("enter"),
//!         }));
//!     }
//! });
//! let printed = vclkit_core::unparse::unparse_program(&program);
//! assert!(printed.contains("log \"enter\";"));
//! ```

use ecow::EcoString;

use crate::ast::{
    AclEntry, Alternative, BackendDefinition, BackendValue, Block, Comment, Expression,
    ExpressionKind, IfStatement, Program, Statement, StatementKind, TableEntry,
};

/// A mutable reference to any node of the tree.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Program(&'a mut Program),
    Statement(&'a mut Statement),
    Block(&'a mut Block),
    /// The chained conditional of an `else if`. A top-level `if` is a
    /// [`NodeMut::Statement`].
    Conditional(&'a mut IfStatement),
    Expression(&'a mut Expression),
    AclEntry(&'a mut AclEntry),
    BackendDefinition(&'a mut BackendDefinition),
    TableEntry(&'a mut TableEntry),
}

/// One child position of a node.
#[derive(Debug)]
pub enum ChildSlot<'a> {
    Node(NodeMut<'a>),
    Statements(&'a mut Vec<Statement>),
    Expressions(&'a mut Vec<Expression>),
    AclEntries(&'a mut Vec<AclEntry>),
    BackendDefinitions(&'a mut Vec<BackendDefinition>),
    TableEntries(&'a mut Vec<TableEntry>),
}

/// The fine-grained kind of a node, as reported to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Block,
    // Statements
    ExpressionStatement,
    Include,
    Import,
    Call,
    Declare,
    Add,
    Set,
    Unset,
    Return,
    Error,
    Restart,
    Synthetic,
    Log,
    If,
    ElseIf,
    Subroutine,
    Acl,
    Backend,
    Table,
    // Definition entries
    AclEntry,
    BackendDefinition,
    TableEntry,
    // Expressions
    BooleanLiteral,
    StringLiteral,
    MultilineLiteral,
    DurationLiteral,
    NumericLiteral,
    Identifier,
    Member,
    Header,
    Ip,
    BooleanGroup,
    Unary,
    FunctionCall,
    Concat,
    Binary,
    Logical,
    ValuePair,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Program => "program",
            Self::Block => "block",
            Self::ExpressionStatement => "expression statement",
            Self::Include => "include",
            Self::Import => "import",
            Self::Call => "call",
            Self::Declare => "declare",
            Self::Add => "add",
            Self::Set => "set",
            Self::Unset => "unset",
            Self::Return => "return",
            Self::Error => "error",
            Self::Restart => "restart",
            Self::Synthetic => "synthetic",
            Self::Log => "log",
            Self::If => "if",
            Self::ElseIf => "else if",
            Self::Subroutine => "sub",
            Self::Acl => "acl",
            Self::Backend => "backend",
            Self::Table => "table",
            Self::AclEntry => "acl entry",
            Self::BackendDefinition => "backend definition",
            Self::TableEntry => "table entry",
            Self::BooleanLiteral => "boolean literal",
            Self::StringLiteral => "string literal",
            Self::MultilineLiteral => "multiline literal",
            Self::DurationLiteral => "duration literal",
            Self::NumericLiteral => "numeric literal",
            Self::Identifier => "identifier",
            Self::Member => "member",
            Self::Header => "header",
            Self::Ip => "ip",
            Self::BooleanGroup => "group",
            Self::Unary => "unary",
            Self::FunctionCall => "call expression",
            Self::Concat => "concatenation",
            Self::Binary => "binary",
            Self::Logical => "logical",
            Self::ValuePair => "value pair",
        };
        f.write_str(name)
    }
}

/// An enclosing node, outermost first in the ancestor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub kind: NodeKind,
    /// The declared name of a `sub`, `acl`, `backend` or `table`, the key of
    /// a definition entry, or the name of an identifier.
    pub name: Option<EcoString>,
}

/// Receives every node of a traversal.
pub trait Visitor {
    /// Called on `node` before its children are visited.
    fn entry(&mut self, node: NodeMut<'_>, ancestors: &[Ancestor]);
}

impl<F> Visitor for F
where
    F: FnMut(NodeMut<'_>, &[Ancestor]),
{
    fn entry(&mut self, node: NodeMut<'_>, ancestors: &[Ancestor]) {
        self(node, ancestors);
    }
}

/// Walks the tree under `root` in pre-order.
pub fn traverse<V: Visitor + ?Sized>(root: NodeMut<'_>, visitor: &mut V) {
    let mut ancestors = Vec::new();
    walk(root, visitor, &mut ancestors);
}

fn walk<V: Visitor + ?Sized>(
    mut node: NodeMut<'_>,
    visitor: &mut V,
    ancestors: &mut Vec<Ancestor>,
) {
    // 32 KiB red zone, 256 KiB new segment.
    stacker::maybe_grow(32 * 1024, 256 * 1024, || {
        visitor.entry(node.reborrow(), ancestors.as_slice());
        ancestors.push(node.ancestor());
        for slot in node.children() {
            match slot {
                ChildSlot::Node(child) => walk(child, visitor, ancestors),
                ChildSlot::Statements(list) => {
                    walk_list(list, visitor, ancestors, |s| NodeMut::Statement(s));
                }
                ChildSlot::Expressions(list) => {
                    walk_list(list, visitor, ancestors, |e| NodeMut::Expression(e));
                }
                ChildSlot::AclEntries(list) => {
                    walk_list(list, visitor, ancestors, |e| NodeMut::AclEntry(e));
                }
                ChildSlot::BackendDefinitions(list) => {
                    walk_list(list, visitor, ancestors, |d| NodeMut::BackendDefinition(d));
                }
                ChildSlot::TableEntries(list) => {
                    walk_list(list, visitor, ancestors, |e| NodeMut::TableEntry(e));
                }
            }
        }
        ancestors.pop();
    });
}

fn walk_list<T, V: Visitor + ?Sized>(
    list: &mut Vec<T>,
    visitor: &mut V,
    ancestors: &mut Vec<Ancestor>,
    wrap: fn(&mut T) -> NodeMut<'_>,
) {
    let mut index = 0;
    while index < list.len() {
        walk(wrap(&mut list[index]), visitor, ancestors);
        index += 1;
    }
}

impl<'a> NodeMut<'a> {
    /// Borrows this node again for a shorter lifetime.
    pub fn reborrow(&mut self) -> NodeMut<'_> {
        match self {
            Self::Program(node) => NodeMut::Program(&mut **node),
            Self::Statement(node) => NodeMut::Statement(&mut **node),
            Self::Block(node) => NodeMut::Block(&mut **node),
            Self::Conditional(node) => NodeMut::Conditional(&mut **node),
            Self::Expression(node) => NodeMut::Expression(&mut **node),
            Self::AclEntry(node) => NodeMut::AclEntry(&mut **node),
            Self::BackendDefinition(node) => NodeMut::BackendDefinition(&mut **node),
            Self::TableEntry(node) => NodeMut::TableEntry(&mut **node),
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Program(_) => NodeKind::Program,
            Self::Block(_) => NodeKind::Block,
            Self::Conditional(_) => NodeKind::ElseIf,
            Self::AclEntry(_) => NodeKind::AclEntry,
            Self::BackendDefinition(_) => NodeKind::BackendDefinition,
            Self::TableEntry(_) => NodeKind::TableEntry,
            Self::Statement(stmt) => match &stmt.kind {
                StatementKind::Expression { .. } => NodeKind::ExpressionStatement,
                StatementKind::Include { .. } => NodeKind::Include,
                StatementKind::Import { .. } => NodeKind::Import,
                StatementKind::Call { .. } => NodeKind::Call,
                StatementKind::Declare { .. } => NodeKind::Declare,
                StatementKind::Add { .. } => NodeKind::Add,
                StatementKind::Set { .. } => NodeKind::Set,
                StatementKind::Unset { .. } => NodeKind::Unset,
                StatementKind::Return { .. } => NodeKind::Return,
                StatementKind::Error { .. } => NodeKind::Error,
                StatementKind::Restart => NodeKind::Restart,
                StatementKind::Synthetic { .. } => NodeKind::Synthetic,
                StatementKind::Log { .. } => NodeKind::Log,
                StatementKind::If(_) => NodeKind::If,
                StatementKind::Subroutine { .. } => NodeKind::Subroutine,
                StatementKind::Acl { .. } => NodeKind::Acl,
                StatementKind::Backend { .. } => NodeKind::Backend,
                StatementKind::Table { .. } => NodeKind::Table,
            },
            Self::Expression(expr) => match &expr.kind {
                ExpressionKind::BooleanLiteral { .. } => NodeKind::BooleanLiteral,
                ExpressionKind::StringLiteral { .. } => NodeKind::StringLiteral,
                ExpressionKind::MultilineLiteral { .. } => NodeKind::MultilineLiteral,
                ExpressionKind::DurationLiteral { .. } => NodeKind::DurationLiteral,
                ExpressionKind::NumericLiteral { .. } => NodeKind::NumericLiteral,
                ExpressionKind::Identifier { .. } => NodeKind::Identifier,
                ExpressionKind::Member { .. } => NodeKind::Member,
                ExpressionKind::Header { .. } => NodeKind::Header,
                ExpressionKind::Ip { .. } => NodeKind::Ip,
                ExpressionKind::BooleanGroup { .. } => NodeKind::BooleanGroup,
                ExpressionKind::Unary { .. } => NodeKind::Unary,
                ExpressionKind::FunctionCall { .. } => NodeKind::FunctionCall,
                ExpressionKind::Concat { .. } => NodeKind::Concat,
                ExpressionKind::Binary { .. } => NodeKind::Binary,
                ExpressionKind::Logical { .. } => NodeKind::Logical,
                ExpressionKind::ValuePair { .. } => NodeKind::ValuePair,
            },
        }
    }

    /// The name this node declares or refers to, if it has one.
    #[must_use]
    pub fn name(&self) -> Option<EcoString> {
        match self {
            Self::Statement(stmt) => match &stmt.kind {
                StatementKind::Subroutine { name, .. }
                | StatementKind::Acl { name, .. }
                | StatementKind::Backend { name, .. }
                | StatementKind::Table { name, .. } => Some(name.clone()),
                StatementKind::Call { subroutine } => Some(subroutine.clone()),
                StatementKind::Import { module } => Some(module.clone()),
                _ => None,
            },
            Self::BackendDefinition(definition) => Some(definition.key.clone()),
            Self::TableEntry(entry) => Some(entry.key.clone()),
            Self::Expression(expr) => match &expr.kind {
                ExpressionKind::Identifier { name } | ExpressionKind::Header { name } => {
                    Some(name.clone())
                }
                _ => None,
            },
            Self::Program(_)
            | Self::Block(_)
            | Self::Conditional(_)
            | Self::AclEntry(_) => None,
        }
    }

    fn ancestor(&self) -> Ancestor {
        Ancestor {
            kind: self.kind(),
            name: self.name(),
        }
    }

    /// The immediate structural children, in source order.
    #[must_use]
    pub fn children(self) -> Vec<ChildSlot<'a>> {
        use ChildSlot::{Node, Statements};

        match self {
            Self::Program(program) => vec![Statements(&mut program.body)],
            Self::Block(block) => vec![Statements(&mut block.statements)],
            Self::Conditional(conditional) => conditional_children(conditional),
            Self::AclEntry(entry) => vec![Node(NodeMut::Expression(&mut entry.address))],
            Self::BackendDefinition(definition) => match &mut definition.value {
                BackendValue::Expression(value) => vec![Node(NodeMut::Expression(value))],
                BackendValue::Nested(definitions) => {
                    vec![ChildSlot::BackendDefinitions(definitions)]
                }
            },
            Self::TableEntry(entry) => vec![Node(NodeMut::Expression(&mut entry.value))],
            Self::Statement(stmt) => statement_children(&mut stmt.kind),
            Self::Expression(expr) => expression_children(&mut expr.kind),
        }
    }

    /// Clears the location of this node and of the comments it carries.
    fn clear_locations(self) {
        match self {
            Self::Program(program) => {
                program.loc = None;
                clear_comments(&mut program.trailing_comments);
                clear_comments(&mut program.unattached_comments);
            }
            Self::Statement(stmt) => {
                stmt.loc = None;
                clear_comments(&mut stmt.comments.leading);
                clear_comments(stmt.comments.trailing.as_mut());
            }
            Self::Block(block) => {
                block.loc = None;
                clear_comments(block.open_comment.as_mut());
                clear_comments(&mut block.closing_comments);
            }
            Self::Conditional(_) => {}
            Self::Expression(expr) => expr.loc = None,
            Self::AclEntry(entry) => entry.loc = None,
            Self::BackendDefinition(definition) => definition.loc = None,
            Self::TableEntry(entry) => entry.loc = None,
        }
    }
}

fn clear_comments<'c>(comments: impl IntoIterator<Item = &'c mut Comment>) {
    for comment in comments {
        comment.loc = None;
    }
}

fn statement_children(kind: &mut StatementKind) -> Vec<ChildSlot<'_>> {
    use ChildSlot::Node;

    match kind {
        StatementKind::Expression { body: expr }
        | StatementKind::Include { module: expr }
        | StatementKind::Declare { id: expr, .. }
        | StatementKind::Unset { target: expr }
        | StatementKind::Synthetic { response: expr, .. }
        | StatementKind::Log { content: expr } => vec![Node(NodeMut::Expression(expr))],
        StatementKind::Add { target, value, .. } | StatementKind::Set { target, value, .. } => {
            vec![Node(NodeMut::Expression(target)), Node(NodeMut::Expression(value))]
        }
        StatementKind::Error { status, message } => {
            let mut children = vec![Node(NodeMut::Expression(status))];
            if let Some(message) = message {
                children.push(Node(NodeMut::Expression(message)));
            }
            children
        }
        StatementKind::If(conditional) => conditional_children(conditional),
        StatementKind::Subroutine { body, .. } => vec![Node(NodeMut::Block(body))],
        StatementKind::Acl { entries, .. } => vec![ChildSlot::AclEntries(entries)],
        StatementKind::Backend { definitions, .. } => {
            vec![ChildSlot::BackendDefinitions(definitions)]
        }
        StatementKind::Table { entries, .. } => vec![ChildSlot::TableEntries(entries)],
        StatementKind::Import { .. }
        | StatementKind::Call { .. }
        | StatementKind::Return { .. }
        | StatementKind::Restart => Vec::new(),
    }
}

fn conditional_children(conditional: &mut IfStatement) -> Vec<ChildSlot<'_>> {
    let mut children = vec![
        ChildSlot::Node(NodeMut::Expression(&mut conditional.test)),
        ChildSlot::Node(NodeMut::Block(&mut conditional.consequent)),
    ];
    match &mut conditional.alternative {
        Some(Alternative::ElseIf(chained)) => {
            children.push(ChildSlot::Node(NodeMut::Conditional(chained)));
        }
        Some(Alternative::Else(block)) => children.push(ChildSlot::Node(NodeMut::Block(block))),
        None => {}
    }
    children
}

fn expression_children(kind: &mut ExpressionKind) -> Vec<ChildSlot<'_>> {
    use ChildSlot::Node;

    match kind {
        ExpressionKind::Member { base, property: second }
        | ExpressionKind::ValuePair { base, name: second }
        | ExpressionKind::Binary {
            left: base,
            right: second,
            ..
        }
        | ExpressionKind::Logical {
            left: base,
            right: second,
            ..
        } => vec![Node(NodeMut::Expression(base)), Node(NodeMut::Expression(second))],
        ExpressionKind::BooleanGroup { body: inner }
        | ExpressionKind::Unary { argument: inner, .. } => vec![Node(NodeMut::Expression(inner))],
        ExpressionKind::FunctionCall { callee, arguments } => vec![
            Node(NodeMut::Expression(callee)),
            ChildSlot::Expressions(arguments),
        ],
        ExpressionKind::Concat { body } => vec![ChildSlot::Expressions(body)],
        ExpressionKind::BooleanLiteral { .. }
        | ExpressionKind::StringLiteral { .. }
        | ExpressionKind::MultilineLiteral { .. }
        | ExpressionKind::DurationLiteral { .. }
        | ExpressionKind::NumericLiteral { .. }
        | ExpressionKind::Identifier { .. }
        | ExpressionKind::Header { .. }
        | ExpressionKind::Ip { .. } => Vec::new(),
    }
}

impl Program {
    /// Clears every location in the tree, comments included, so trees can
    /// be compared by structure alone.
    pub fn strip_locations(&mut self) {
        traverse(NodeMut::Program(self), &mut |node: NodeMut<'_>, _: &[Ancestor]| {
            node.clear_locations();
        });
    }
}
