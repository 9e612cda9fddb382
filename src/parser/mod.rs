// src/parser/mod.rs
//! Structural parse of Ruby source: statements, bracket groups and
//! `keyword ... end` scopes. Expressions stay flat; the locator only needs
//! statement boundaries and nesting.

pub mod tree;

pub use tree::{Group, Node, Program, Scope, Span, Statement};

use crate::{
    error::{Error, Result},
    lexer::{self, Keyword, LineIndex, Token, TokenKind},
};

/// Parses `src` into a tree. Any lexing error, stray closer or unclosed
/// opener makes the whole source invalid.
pub fn parse(src: &str) -> Result<Program> {
    let tokens = lexer::lex(src)?;
    let mut p = Parser {
        src,
        tokens,
        pos: 0,
    };
    let (body, _) = p.body(None, false)?;
    Ok(Program { body })
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

// ------------------ token classes ------------------

fn closer(opener: &Token) -> TokenKind {
    match opener.kind {
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::IndexLBracket | TokenKind::ArrayLBracket => TokenKind::RBracket,
        TokenKind::LBrace => TokenKind::RBrace,
        _ => TokenKind::Kw(Keyword::End),
    }
}

/// A line ending in one of these carries on to the next line.
fn continues(cur: &[Node]) -> bool {
    use TokenKind::*;
    matches!(
        cur.last().and_then(Node::token_kind),
        Some(
            Op | Assign
                | Comma
                | Dot
                | ColonColon
                | Kw(Keyword::And)
                | Kw(Keyword::Or)
                | Kw(Keyword::Not)
        )
    )
}

/// After these, `if`/`unless`/`while`/`until` start an expression instead of
/// acting as a modifier.
fn takes_value(node: &Node) -> bool {
    use Keyword::*;
    use TokenKind::*;
    matches!(
        node.token_kind(),
        Some(
            Assign
                | Op
                | Comma
                | Pipe
                | Kw(Then | Else | Elsif | Do | And | Or | Not | When | In | Ensure | Rescue)
        )
    )
}

fn flush(body: &mut Vec<Statement>, cur: &mut Vec<Node>) {
    if !cur.is_empty() {
        body.push(Statement {
            nodes: std::mem::take(cur),
        });
    }
}

impl<'a> Parser<'a> {
    fn error_at(&self, offset: usize, message: String) -> Error {
        let (line, col) = LineIndex::new(self.src).line_col(offset);
        Error::InvalidSource {
            line,
            column: col + 1,
            message,
        }
    }

    /// Parses statements up to the closer matching `opener` (or EOF for the
    /// top level). Returns them with the end offset of the closer.
    fn body(&mut self, opener: Option<Token>, loop_header: bool) -> Result<(Vec<Statement>, usize)> {
        let close = opener.as_ref().map(closer);
        // elements of an array literal may wrap freely
        let newline_splits = close != Some(TokenKind::RBracket);
        let mut loop_header = loop_header;
        let mut body = Vec::new();
        let mut cur: Vec<Node> = Vec::new();

        while let Some(&tok) = self.tokens.get(self.pos) {
            self.pos += 1;
            match tok.kind {
                TokenKind::Newline => {
                    if newline_splits && !continues(&cur) && !self.dot_follows() {
                        flush(&mut body, &mut cur);
                        loop_header = false;
                    }
                }
                TokenKind::Semi => {
                    flush(&mut body, &mut cur);
                    loop_header = false;
                }
                k if Some(k) == close => {
                    flush(&mut body, &mut cur);
                    return Ok((body, tok.end()));
                }
                TokenKind::Kw(Keyword::End)
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace => {
                    return Err(
                        self.error_at(tok.start, format!("unexpected `{}`", tok.text(self.src)))
                    );
                }
                TokenKind::LParen
                | TokenKind::IndexLBracket
                | TokenKind::ArrayLBracket
                | TokenKind::LBrace => {
                    let (inner, end) = self.body(Some(tok), false)?;
                    cur.push(Node::Group(Group {
                        open: tok.kind,
                        span: Span {
                            start: tok.start,
                            end,
                        },
                        body: inner,
                    }));
                }
                // `while cond do`: the `do` belongs to the loop
                TokenKind::Kw(Keyword::Do) if loop_header => {
                    cur.push(Node::Leaf(tok));
                    loop_header = false;
                }
                TokenKind::Kw(kw) if self.opens_scope(kw, &cur) => {
                    let header = matches!(kw, Keyword::While | Keyword::Until | Keyword::For);
                    let (inner, end) = self.body(Some(tok), header)?;
                    cur.push(Node::Scope(Scope {
                        keyword: kw,
                        span: Span {
                            start: tok.start,
                            end,
                        },
                        body: inner,
                    }));
                }
                TokenKind::Int => cur.push(Node::Int(tok)),
                _ => cur.push(Node::Leaf(tok)),
            }
        }

        match opener {
            None => {
                flush(&mut body, &mut cur);
                Ok((body, self.src.len()))
            }
            Some(open) => Err(self.error_at(
                open.start,
                format!("unclosed `{}`", open.text(self.src)),
            )),
        }
    }

    fn opens_scope(&self, kw: Keyword, cur: &[Node]) -> bool {
        use Keyword::*;
        match kw {
            Module | Class | Begin | Case | For | Do => true,
            Def => !self.endless_def(),
            If | Unless | While | Until => cur.last().is_none_or(takes_value),
            _ => false,
        }
    }

    /// Leading-dot method chains continue the statement across newlines.
    fn dot_follows(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .find(|t| t.kind != TokenKind::Newline)
            .is_some_and(|t| t.kind == TokenKind::Dot)
    }

    /// `def name(args) = expr` has no `end`. Called with `pos` just past `def`.
    fn endless_def(&self) -> bool {
        use TokenKind::*;
        let mut i = self.pos;
        while self
            .tokens
            .get(i)
            .is_some_and(|t| matches!(t.kind, Ident | Const | Var | Dot))
        {
            i += 1;
        }
        if self.tokens.get(i).is_some_and(|t| t.kind == LParen) {
            let mut depth = 0usize;
            while let Some(t) = self.tokens.get(i) {
                i += 1;
                match t.kind {
                    LParen => depth += 1,
                    RParen => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        self.tokens.get(i).is_some_and(|t| t.kind == Assign)
    }
}
