// src/parser/tree.rs
use crate::lexer::{Keyword, Token, TokenKind};

/// Half-open byte range into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn of(token: &Token) -> Self {
        Self {
            start: token.start,
            end: token.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `module`, `class`, `def`, `do`, `if`, ... through the matching `end`.
    Scope(Scope),
    /// `( )`, `[ ]` or `{ }`.
    Group(Group),
    Int(Token),
    Leaf(Token),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Scope(s) => s.span,
            Node::Group(g) => g.span,
            Node::Int(t) | Node::Leaf(t) => Span::of(t),
        }
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        match self {
            Node::Int(t) | Node::Leaf(t) => Some(t.kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub keyword: Keyword,
    pub span: Span,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// `LParen`, `IndexLBracket`, `ArrayLBracket` or `LBrace`.
    pub open: TokenKind,
    pub span: Span,
    pub body: Vec<Statement>,
}

/// Nodes between two statement separators. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub body: Vec<Statement>,
}
