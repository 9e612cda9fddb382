// src/lexer/mod.rs
pub mod lines;
pub mod scan;
pub mod tokens;

pub use lines::LineIndex;
pub use tokens::{Keyword, Token, TokenKind, int_value};

use crate::error::Result;

fn ends_primary(k: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        k,
        Ident | Const | Var | Int | Float | String | Symbol | Regex | RParen | RBracket | RBrace
    ) || k == Kw(Keyword::End)
}

/// `a[0]` indexes, `[0]` and `foo [0]` build arrays.
pub fn retag_brackets_in_place(tokens: &mut [Token]) {
    let mut prev: Option<Token> = None;
    for t in tokens.iter_mut() {
        if t.kind == TokenKind::LBracket {
            let hugs_primary = prev.is_some_and(|p| ends_primary(p.kind) && p.end() == t.start);
            t.kind = if hugs_primary {
                TokenKind::IndexLBracket
            } else {
                TokenKind::ArrayLBracket
            };
        }
        prev = Some(*t);
    }
}

#[inline]
fn keep_kind(k: TokenKind) -> bool {
    k != TokenKind::Comment
}

/// Tokenizes Ruby source. Returns kept tokens (comments filtered out) with
/// brackets retagged.
pub fn lex(src: &str) -> Result<Vec<Token>> {
    let mut tokens = scan::Lexer::new(src).run()?;
    tokens.retain(|t| keep_kind(t.kind));
    retag_brackets_in_place(&mut tokens);
    Ok(tokens)
}
