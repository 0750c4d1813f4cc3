// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement and declaration parsing.
//!
//! Every statement starts with an identifier; a known keyword selects the
//! form and anything else is an expression statement.

use ecow::EcoString;

use crate::ast::{
    AclEntry, Alternative, AssignOperator, BackendDefinition, BackendValue, Block,
    CommentAttachment, Expression, ExpressionKind, IfStatement, Statement, StatementKind,
    TableEntry,
};
use crate::source_analysis::{SyntaxError, TokenKind};

use super::Parser;

impl Parser {
    /// Parses one statement and attaches its comments.
    pub(super) fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.current;
        let leading = self.claim_leading_comments();
        let kind = self.parse_statement_kind()?;
        let loc = self.location_from(start);
        let trailing = self.claim_trailing_comment();
        Ok(Statement {
            kind,
            comments: CommentAttachment { leading, trailing },
            loc: Some(loc),
        })
    }

    fn parse_statement_kind(&mut self) -> Result<StatementKind, SyntaxError> {
        let keyword = match self.current_kind() {
            TokenKind::Identifier(keyword) => keyword.clone(),
            _ => return Err(self.unexpected("a statement")),
        };
        let kind = match keyword.as_str() {
            "include" => {
                self.advance();
                let module = self.parse_string("a module name string")?;
                StatementKind::Include { module }
            }
            "import" => {
                self.advance();
                let module = self.expect_identifier("a module name")?;
                StatementKind::Import { module }
            }
            "call" => {
                self.advance();
                let subroutine = self.expect_identifier("a subroutine name")?;
                StatementKind::Call { subroutine }
            }
            "declare" => {
                self.advance();
                self.expect_keyword("local")?;
                let id = self.parse_postfix()?;
                let value_type = self.expect_identifier("a type name")?;
                StatementKind::Declare { id, value_type }
            }
            "set" | "add" => {
                let is_add = keyword == "add";
                self.advance();
                let target = self.parse_postfix()?;
                let operator = self.parse_assign_operator()?;
                let value = self.parse_expression()?;
                if is_add {
                    StatementKind::Add {
                        target,
                        operator,
                        value,
                    }
                } else {
                    StatementKind::Set {
                        target,
                        operator,
                        value,
                    }
                }
            }
            "unset" | "remove" => {
                self.advance();
                let target = self.parse_postfix()?;
                StatementKind::Unset { target }
            }
            "return" => {
                self.advance();
                let action = if self.match_token(&TokenKind::LeftParen) {
                    let action = self.expect_identifier("a return action")?;
                    self.expect(&TokenKind::RightParen, "`)`")?;
                    Some(action)
                } else {
                    None
                };
                StatementKind::Return { action }
            }
            "error" => {
                self.advance();
                // A single operand: `error 404 "Not" "Found"` must not
                // concatenate the status into the message.
                let status = self.parse_unary()?;
                let message = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                StatementKind::Error { status, message }
            }
            "restart" => {
                self.advance();
                StatementKind::Restart
            }
            "synthetic" => {
                self.advance();
                let base64 = if self.check(&TokenKind::Dot)
                    && self.peek_at(1).is_keyword("base64")
                {
                    self.advance();
                    self.advance();
                    true
                } else {
                    false
                };
                let response = self.parse_expression()?;
                StatementKind::Synthetic { response, base64 }
            }
            "log" => {
                self.advance();
                let content = self.parse_expression()?;
                StatementKind::Log { content }
            }
            "if" => return Ok(StatementKind::If(self.parse_if()?)),
            "sub" => return self.parse_subroutine(),
            "acl" => return self.parse_acl(),
            "backend" => return self.parse_backend(),
            "table" => return self.parse_table(),
            "else" | "elsif" | "elseif" => {
                return Err(SyntaxError::new(
                    format!("`{keyword}` without a matching `if`"),
                    self.current_token().location(),
                ));
            }
            _ => {
                let body = self.parse_expression()?;
                StatementKind::Expression { body }
            }
        };
        self.expect(&TokenKind::Semicolon, "`;`")?;
        Ok(kind)
    }

    fn parse_assign_operator(&mut self) -> Result<AssignOperator, SyntaxError> {
        let operator = match self.current_kind() {
            TokenKind::Operator(symbol) => AssignOperator::from_symbol(symbol),
            _ => None,
        };
        match operator {
            Some(operator) => {
                self.advance();
                Ok(operator)
            }
            None => Err(self.unexpected("an assignment operator")),
        }
    }

    fn parse_string(&mut self, expected: &str) -> Result<Expression, SyntaxError> {
        match self.current_kind() {
            TokenKind::String(value) => {
                let kind = ExpressionKind::StringLiteral {
                    value: value.clone(),
                };
                let loc = self.advance().location();
                Ok(Expression::with_location(kind, loc))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_string_literal(&mut self, expected: &str) -> Result<EcoString, SyntaxError> {
        match self.current_kind() {
            TokenKind::String(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    // ========================================================================
    // Blocks & Conditionals
    // ========================================================================

    /// Parses `{ statements }`, claiming the comment after `{` and the
    /// comments before `}`.
    pub(super) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let start = self.current;
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let open_comment = self.claim_trailing_comment();
        let mut statements = Vec::new();
        self.nested(|p| {
            while !p.check(&TokenKind::RightBrace) {
                if p.is_at_end() {
                    return Err(p.unterminated("block"));
                }
                statements.push(p.parse_statement()?);
            }
            Ok(())
        })?;
        let closing_comments = self.claim_leading_comments();
        self.advance();
        Ok(Block {
            statements,
            open_comment,
            closing_comments,
            loc: Some(self.location_from(start)),
        })
    }

    /// Parses `if (test) { ... }` with any `else if`/`elsif`/`else` chain.
    /// The current token is `if`.
    ///
    /// Chain links are siblings, so they are read in a loop and do not count
    /// toward the nesting limit.
    fn parse_if(&mut self) -> Result<IfStatement, SyntaxError> {
        let (test, consequent) = self.parse_if_link()?;
        let mut links = Vec::new();
        let mut terminal = None;
        loop {
            if self.check_keyword("else") {
                self.advance();
                if self.check_keyword("if") {
                    links.push(self.parse_if_link()?);
                } else {
                    terminal = Some(Alternative::Else(self.parse_block()?));
                    break;
                }
            } else if self.check_keyword("elsif") || self.check_keyword("elseif") {
                links.push(self.parse_if_link()?);
            } else {
                break;
            }
        }

        let alternative = links.into_iter().rev().fold(terminal, |alternative, (test, consequent)| {
            Some(Alternative::ElseIf(Box::new(IfStatement {
                test,
                consequent,
                alternative,
            })))
        });
        Ok(IfStatement {
            test,
            consequent,
            alternative,
        })
    }

    /// `if (test) { ... }` without its alternatives. The current token is
    /// `if`, `elsif` or `elseif`.
    fn parse_if_link(&mut self) -> Result<(Expression, Block), SyntaxError> {
        self.advance();
        self.expect(&TokenKind::LeftParen, "`(` after `if`")?;
        let test = self.parse_expression()?;
        self.expect(&TokenKind::RightParen, "`)` to close the condition")?;
        let consequent = self.parse_block()?;
        Ok((test, consequent))
    }

    fn unterminated(&self, construct: &str) -> SyntaxError {
        SyntaxError::new(
            format!("unterminated {construct}: expected `}}`"),
            self.current_token().location(),
        )
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// `sub name { ... }`
    fn parse_subroutine(&mut self) -> Result<StatementKind, SyntaxError> {
        self.advance();
        let name = self.expect_identifier("a subroutine name")?;
        let body = self.parse_block()?;
        Ok(StatementKind::Subroutine { name, body })
    }

    /// `acl name { [!]"address"[/cidr]; ... }`
    fn parse_acl(&mut self) -> Result<StatementKind, SyntaxError> {
        self.advance();
        let name = self.expect_identifier("an ACL name")?;
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let mut entries = Vec::new();
        while !self.match_token(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.unterminated("acl"));
            }
            entries.push(self.parse_acl_entry()?);
        }
        Ok(StatementKind::Acl { name, entries })
    }

    fn parse_acl_entry(&mut self) -> Result<AclEntry, SyntaxError> {
        let start = self.current;
        let negated = self.match_operator("!");
        let address_start = self.current;
        let address = self.expect_string_literal("a quoted address")?;
        let cidr = if self.match_token(&TokenKind::Slash) {
            match self.current_kind() {
                TokenKind::Number(bits) => {
                    let bits = bits.clone();
                    self.advance();
                    Some(bits)
                }
                _ => return Err(self.unexpected("a prefix length after `/`")),
            }
        } else {
            None
        };
        let address = Expression::with_location(
            ExpressionKind::Ip { address, cidr },
            self.location_from(address_start),
        );
        let loc = self.location_from(start);
        self.expect(&TokenKind::Semicolon, "`;`")?;
        Ok(AclEntry {
            address,
            negated,
            loc: Some(loc),
        })
    }

    /// `backend name { .key = value; .nested = { ... } }`
    fn parse_backend(&mut self) -> Result<StatementKind, SyntaxError> {
        self.advance();
        let name = self.expect_identifier("a backend name")?;
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let definitions = self.parse_backend_definitions()?;
        Ok(StatementKind::Backend { name, definitions })
    }

    /// Parses definitions up to and including the closing `}`.
    fn parse_backend_definitions(&mut self) -> Result<Vec<BackendDefinition>, SyntaxError> {
        let mut definitions = Vec::new();
        while !self.match_token(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.unterminated("backend"));
            }
            let start = self.current;
            self.expect(&TokenKind::Dot, "`.` before a backend property")?;
            let key = self.expect_identifier("a backend property name")?;
            if !self.match_operator("=") {
                return Err(self.unexpected("`=`"));
            }
            let value = if self.match_token(&TokenKind::LeftBrace) {
                let nested = self.nested(Self::parse_backend_definitions)?;
                // `.probe = { ... };` is accepted; the `;` is not kept.
                self.match_token(&TokenKind::Semicolon);
                BackendValue::Nested(nested)
            } else {
                let value = self.parse_expression()?;
                self.expect(&TokenKind::Semicolon, "`;`")?;
                BackendValue::Expression(value)
            };
            definitions.push(BackendDefinition {
                key,
                value,
                loc: Some(self.location_from(start)),
            });
        }
        Ok(definitions)
    }

    /// `table name [TYPE] { "key": value, ... }`
    fn parse_table(&mut self) -> Result<StatementKind, SyntaxError> {
        self.advance();
        let name = self.expect_identifier("a table name")?;
        let value_type = match self.current_kind() {
            TokenKind::Identifier(value_type) => {
                let value_type = value_type.clone();
                self.advance();
                Some(value_type)
            }
            _ => None,
        };
        self.expect(&TokenKind::LeftBrace, "`{`")?;
        let mut entries = Vec::new();
        while !self.match_token(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.unterminated("table"));
            }
            let start = self.current;
            let key = self.expect_string_literal("a quoted table key")?;
            self.expect(&TokenKind::Colon, "`:` after the table key")?;
            let value = self.parse_unary()?;
            entries.push(TableEntry {
                key,
                value,
                loc: Some(self.location_from(start)),
            });
            if !self.match_token(&TokenKind::Comma) && !self.check(&TokenKind::RightBrace) {
                return Err(self.unexpected("`,` or `}`"));
            }
        }
        Ok(StatementKind::Table {
            name,
            value_type,
            entries,
        })
    }
}
