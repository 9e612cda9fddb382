// src/lexer/scan.rs
// Byte-level Ruby scanner. It does not build values; it only needs token
// boundaries good enough to balance scopes and find integer literals.
//
// Literal openers that Ruby disambiguates by parser state (`/`, `%`, `?`,
// `<<`) are decided from the previous significant token: a literal is read
// where a value is expected, or after `ident ` when the opener hugs its
// content (`puts /x/`, `foo <<~EOS`) and `ident` is not a local variable.
// Locals are collected file-wide from assignment targets, `def` and block
// parameters, `for` variables and `rescue => e`.

use hashbrown::HashSet;

use super::{
    lines::LineIndex,
    tokens::{Keyword, Token, TokenKind},
};
use crate::error::{Error, Result};

const OPERATORS: &[(&str, TokenKind)] = &[
    ("**=", TokenKind::Op),
    ("<=>", TokenKind::Op),
    ("===", TokenKind::Op),
    ("...", TokenKind::Op),
    ("<<=", TokenKind::Op),
    (">>=", TokenKind::Op),
    ("&&=", TokenKind::Op),
    ("||=", TokenKind::Op),
    ("&.", TokenKind::Dot),
    ("::", TokenKind::ColonColon),
    ("**", TokenKind::Op),
    ("==", TokenKind::Op),
    ("!=", TokenKind::Op),
    (">=", TokenKind::Op),
    ("<=", TokenKind::Op),
    ("&&", TokenKind::Op),
    ("||", TokenKind::Op),
    ("<<", TokenKind::Op),
    (">>", TokenKind::Op),
    ("=~", TokenKind::Op),
    ("!~", TokenKind::Op),
    ("..", TokenKind::Op),
    ("+=", TokenKind::Op),
    ("-=", TokenKind::Op),
    ("*=", TokenKind::Op),
    ("/=", TokenKind::Op),
    ("%=", TokenKind::Op),
    ("|=", TokenKind::Op),
    ("&=", TokenKind::Op),
    ("^=", TokenKind::Op),
    ("=>", TokenKind::Op),
    ("->", TokenKind::Op),
    ("=", TokenKind::Assign),
    ("|", TokenKind::Pipe),
    (",", TokenKind::Comma),
    (";", TokenKind::Semi),
    (".", TokenKind::Dot),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("+", TokenKind::Op),
    ("-", TokenKind::Op),
    ("*", TokenKind::Op),
    ("/", TokenKind::Op),
    ("%", TokenKind::Op),
    ("<", TokenKind::Op),
    (">", TokenKind::Op),
    ("!", TokenKind::Op),
    ("&", TokenKind::Op),
    ("^", TokenKind::Op),
    ("~", TokenKind::Op),
    ("?", TokenKind::Op),
    (":", TokenKind::Op),
];

// Operators that assign to their left-hand side, besides `=`.
const ASSIGN_OPS: &[&str] = &[
    "**=", "<<=", ">>=", "&&=", "||=", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=",
];

// Operator method names, as in `def <=>(other)` or `:[]=`.
const OP_METHODS: &[&str] = &[
    "[]=", "[]", "<=>", "===", "==", "=~", "!=", "!~", "**", "+@", "-@", "<<", ">>", "<=", ">=",
    "+", "-", "*", "/", "%", "<", ">", "!", "&", "|", "^", "~", "`",
];

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}
#[inline]
fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
#[inline]
fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

fn closing_delimiter(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    }
}

struct Heredoc {
    id: Vec<u8>,
    indented: bool,
    start: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ParamsEnd {
    /// `def name(...)`, `->(...)`
    Paren,
    /// `{ |...|`, `do |...|`
    Pipe,
    /// `def name a, b`
    Line,
}

/// An open parameter list. `expect` is set where the next identifier names
/// a parameter.
struct Params {
    end: ParamsEnd,
    depth: usize,
    expect: bool,
}

impl Params {
    fn names_at(&self, depth: usize) -> bool {
        match self.end {
            ParamsEnd::Paren => depth == 1,
            ParamsEnd::Pipe | ParamsEnd::Line => depth <= 1,
        }
    }
}

pub struct Lexer<'a> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
    out: Vec<Token>,
    heredocs: Vec<Heredoc>,
    locals: HashSet<&'a str>,
    params: Option<Params>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            src: text.as_bytes(),
            pos: 0,
            out: Vec::new(),
            heredocs: Vec::new(),
            locals: HashSet::new(),
            params: None,
        }
    }

    /// All tokens, comments included, in source order.
    pub fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            match b {
                _ if is_blank(b) => self.pos += 1,
                b'\\' => self.continuation()?,
                b'\n' => {
                    let start = self.pos;
                    self.pos += 1;
                    self.push(TokenKind::Newline, start);
                    if !self.heredocs.is_empty() {
                        self.heredoc_bodies()?;
                    }
                }
                b'#' => self.line_comment(),
                b'=' if self.at_line_start() && self.word_at(self.pos, b"=begin") => {
                    self.embedded_doc()?
                }
                b'_' if self.at_line_start() && self.line_is(b"__END__") => {
                    self.pos = self.src.len();
                }
                b'0'..=b'9' => self.number()?,
                _ if is_ident_start(b) => self.ident(),
                b'@' | b'$' => self.variable(TokenKind::Var)?,
                _ if self.in_def_name() && self.operator_method() => {}
                b'"' | b'`' => {
                    let start = self.pos;
                    self.delimited(b, b, true)?;
                    self.push(TokenKind::String, start);
                }
                b'\'' => {
                    let start = self.pos;
                    self.delimited(b, b, false)?;
                    self.push(TokenKind::String, start);
                }
                b':' => self.colon()?,
                b'?' if self.literal_allowed() && self.char_literal() => {}
                b'%' if self.literal_allowed() && self.percent_literal()? => {}
                b'/' if self.literal_allowed() => self.regex()?,
                b'<' if self.literal_allowed() && self.heredoc_opener() => {}
                _ => self.operator()?,
            }
        }

        if let Some(h) = self.heredocs.first() {
            return Err(self.error_at(h.start, "unterminated heredoc"));
        }
        Ok(self.out)
    }

    // ------------------ helpers ------------------

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.src.get(self.pos + ahead).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.out.push(Token {
            kind,
            start,
            len: self.pos - start,
        });
        let text = self.text;
        self.track_params(kind, &text[start..self.pos]);
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        let (line, col) = LineIndex::new(self.text).line_col(offset);
        Error::InvalidSource {
            line,
            column: col + 1,
            message: message.into(),
        }
    }

    fn nth_last(&self, back: usize) -> Option<&Token> {
        self.out
            .iter()
            .rev()
            .filter(|t| t.kind != TokenKind::Comment)
            .nth(back)
    }

    fn last(&self) -> Option<&Token> {
        self.nth_last(0)
    }

    fn last_kind(&self, back: usize) -> Option<TokenKind> {
        self.nth_last(back).map(|t| t.kind)
    }

    fn last_text(&self, back: usize) -> Option<&'a str> {
        let text = self.text;
        self.nth_last(back).map(|t| t.text(text))
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.src[self.pos - 1] == b'\n'
    }

    fn word_at(&self, at: usize, word: &[u8]) -> bool {
        self.src[at..].starts_with(word)
            && self
                .src
                .get(at + word.len())
                .is_none_or(|&b| b.is_ascii_whitespace())
    }

    fn line_is(&self, content: &[u8]) -> bool {
        let rest = &self.src[self.pos..];
        let eol = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        let line = &rest[..eol];
        line.strip_suffix(b"\r").unwrap_or(line) == content
    }

    fn eat_while(&mut self, f: impl Fn(u8) -> bool) {
        while self.pos < self.src.len() && f(self.src[self.pos]) {
            self.pos += 1;
        }
    }

    fn value_expected(&self) -> bool {
        use TokenKind::*;
        match self.last().map(|t| t.kind) {
            None => true,
            Some(Ident | Const | Var | Int | Float | String | Symbol | Regex) => false,
            Some(RParen | RBracket | RBrace | Kw(Keyword::End)) => false,
            Some(_) => true,
        }
    }

    fn command_arg(&self) -> bool {
        let Some(t) = self.last() else { return false };
        t.kind == TokenKind::Ident
            && t.end() < self.pos
            && self
                .peek(1)
                .is_some_and(|c| !c.is_ascii_whitespace() && c != b'=')
            && !self.last_is_local()
    }

    /// The previous token is a bare identifier already bound as a local.
    fn last_is_local(&self) -> bool {
        let Some(name) = self.last_text(0) else {
            return false;
        };
        !matches!(
            self.last_kind(1),
            Some(TokenKind::Dot | TokenKind::ColonColon)
        ) && self.locals.contains(name)
    }

    fn literal_allowed(&self) -> bool {
        self.value_expected() || self.command_arg()
    }

    // `def name`, `def self.name`, `def Const.name`
    fn in_def_name(&self) -> bool {
        let def = Some(TokenKind::Kw(Keyword::Def));
        self.last_kind(0) == def
            || (self.last_kind(0) == Some(TokenKind::Dot) && self.last_kind(2) == def)
    }

    // ------------------ locals ------------------

    /// Binds the targets left of an assignment operator that is about to be
    /// pushed: `a = `, `a += `, `a, (b, *c) = `. Index and attribute targets
    /// bind nothing. When the left side is not a plain target list only the
    /// nearest name is bound.
    fn bind_targets(&mut self) {
        use TokenKind::*;
        let text = self.text;
        let mut names: Vec<&'a str> = Vec::new();
        let mut want_name = true;
        let mut toks = self
            .out
            .iter()
            .rev()
            .filter(|t| t.kind != Comment)
            .peekable();

        let complete = loop {
            let Some(t) = toks.next() else {
                break !want_name;
            };
            match t.kind {
                Ident if want_name => {
                    if toks.peek().is_some_and(|p| matches!(p.kind, Dot | ColonColon)) {
                        break !names.is_empty();
                    }
                    names.push(t.text(text));
                    want_name = false;
                }
                Comma if !want_name => want_name = true,
                RParen if want_name => {}
                Op if t.text(text) == "*" => {}
                LParen => {
                    // `f(a, b = 1)` is a call, not a target list
                    if toks
                        .peek()
                        .is_some_and(|p| matches!(p.kind, Ident | Const) && p.end() == t.start)
                    {
                        break false;
                    }
                    want_name = false;
                }
                Newline | Semi | Pipe | LBrace | Kw(_) => break !want_name,
                _ => break false,
            }
        };

        if complete {
            self.locals.extend(names);
        } else if let Some(&first) = names.first() {
            self.locals.insert(first);
        }
    }

    /// `rescue Foo => e`
    fn rescue_binding(&self) -> bool {
        if self.last_text(0) != Some("=>") {
            return false;
        }
        self.out
            .iter()
            .rev()
            .filter(|t| t.kind != TokenKind::Comment)
            .skip(1)
            .take_while(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Semi))
            .any(|t| t.kind == TokenKind::Kw(Keyword::Rescue))
    }

    /// Opens a parameter list if the token just pushed starts one.
    fn open_params(&mut self) {
        use TokenKind::*;
        let end = match (self.last_kind(0), self.last_kind(1)) {
            (Some(LParen), Some(Op)) if self.last_text(1) == Some("->") => ParamsEnd::Paren,
            (Some(LParen), Some(Ident)) if self.after_def_name(1) => ParamsEnd::Paren,
            (Some(Pipe), Some(LBrace | Kw(Keyword::Do))) => ParamsEnd::Pipe,
            _ => return,
        };
        let depth = usize::from(end == ParamsEnd::Paren);
        self.params = Some(Params {
            end,
            depth,
            expect: true,
        });
    }

    /// The token `back` places from the end names the method in a `def`.
    fn after_def_name(&self, back: usize) -> bool {
        let def = Some(TokenKind::Kw(Keyword::Def));
        self.last_kind(back + 1) == def
            || (self.last_kind(back + 1) == Some(TokenKind::Dot) && self.last_kind(back + 3) == def)
    }

    fn track_params(&mut self, kind: TokenKind, text: &str) {
        use TokenKind::*;
        let Some(p) = self.params.as_mut() else {
            return;
        };
        match kind {
            Comment => {}
            Newline | Semi if p.end == ParamsEnd::Line => self.params = None,
            Newline => {}
            Semi => p.expect = p.end == ParamsEnd::Pipe,
            LParen => {
                p.depth += 1;
                p.expect = p.names_at(p.depth);
            }
            LBracket | LBrace => {
                p.depth += 1;
                p.expect = false;
            }
            RParen if p.end == ParamsEnd::Paren && p.depth == 1 => self.params = None,
            RParen | RBracket | RBrace => {
                p.depth = p.depth.saturating_sub(1);
                p.expect = false;
            }
            Pipe if p.end == ParamsEnd::Pipe && p.depth == 0 => self.params = None,
            Comma => p.expect = p.names_at(p.depth),
            Op if matches!(text, "*" | "**" | "&") => {}
            _ => p.expect = false,
        }
    }

    // ------------------ trivia ------------------

    fn continuation(&mut self) -> Result<()> {
        match (self.peek(1), self.peek(2)) {
            (Some(b'\n'), _) => self.pos += 2,
            (Some(b'\r'), Some(b'\n')) => self.pos += 3,
            _ => return Err(self.error_at(self.pos, "unexpected backslash")),
        }
        Ok(())
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        self.eat_while(|b| b != b'\n');
        self.push(TokenKind::Comment, start);
    }

    fn embedded_doc(&mut self) -> Result<()> {
        let start = self.pos;
        loop {
            self.eat_while(|b| b != b'\n');
            if self.pos >= self.src.len() {
                return Err(self.error_at(start, "embedded document meets end of file"));
            }
            self.pos += 1;
            if self.word_at(self.pos, b"=end") {
                self.eat_while(|b| b != b'\n');
                self.push(TokenKind::Comment, start);
                return Ok(());
            }
        }
    }

    fn heredoc_bodies(&mut self) -> Result<()> {
        for doc in std::mem::take(&mut self.heredocs) {
            loop {
                if self.pos >= self.src.len() {
                    return Err(self.error_at(doc.start, "unterminated heredoc"));
                }
                let rest = &self.src[self.pos..];
                let eol = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
                let line = &rest[..eol];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                let line = if doc.indented {
                    let lead = line.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
                    &line[lead..]
                } else {
                    line
                };
                let done = line == doc.id.as_slice();
                self.pos = (self.pos + eol + 1).min(self.src.len());
                if done {
                    break;
                }
            }
        }
        Ok(())
    }

    // ------------------ words ------------------

    fn number(&mut self) -> Result<()> {
        let start = self.pos;
        let mut kind = TokenKind::Int;

        let radix = match (self.peek(0), self.peek(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(16),
            (Some(b'0'), Some(b'b' | b'B')) => Some(2),
            (Some(b'0'), Some(b'o' | b'O')) => Some(8),
            (Some(b'0'), Some(b'd' | b'D')) => Some(10),
            _ => None,
        };

        if let Some(radix) = radix {
            self.pos += 2;
            let digits = self.pos;
            self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
            let body = &self.text[digits..self.pos];
            if body.is_empty() || !body.chars().all(|c| c == '_' || c.is_digit(radix)) {
                return Err(self.error_at(start, "invalid numeric literal"));
            }
        } else {
            self.eat_while(|b| b.is_ascii_digit() || b == b'_');
            if self.peek(0) == Some(b'.') && self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
                kind = TokenKind::Float;
                self.pos += 1;
                self.eat_while(|b| b.is_ascii_digit() || b == b'_');
            }
            if matches!(self.peek(0), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.peek(1), Some(b'+' | b'-')));
                if self.peek(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                    kind = TokenKind::Float;
                    self.pos += 1 + sign;
                    self.eat_while(|b| b.is_ascii_digit() || b == b'_');
                }
            }
            let body = &self.src[start..self.pos];
            if kind == TokenKind::Int
                && body.len() > 1
                && body[0] == b'0'
                && body.iter().any(|&b| b == b'8' || b == b'9')
            {
                return Err(self.error_at(start, "invalid octal digit"));
            }
        }

        // 3r, 2i, 1ri
        for suffix in [b'r', b'i'] {
            if self.peek(0) == Some(suffix) && !self.peek(1).is_some_and(is_ident_continue) {
                kind = TokenKind::Float;
                self.pos += 1;
            } else if self.peek(0) == Some(b'r')
                && self.peek(1) == Some(b'i')
                && !self.peek(2).is_some_and(is_ident_continue)
            {
                kind = TokenKind::Float;
                self.pos += 2;
                break;
            }
        }

        if self.peek(0).is_some_and(is_ident_continue) {
            return Err(self.error_at(self.pos, "unexpected character after numeric literal"));
        }
        self.push(kind, start);
        Ok(())
    }

    fn ident(&mut self) {
        let start = self.pos;
        let def_name = self.in_def_name();
        let after_dot = self.last_kind(0) == Some(TokenKind::Dot);

        self.eat_while(is_ident_continue);
        if matches!(self.peek(0), Some(b'?' | b'!')) && self.peek(1) != Some(b'=') {
            self.pos += 1;
        }

        let receiver = def_name && self.peek(0) == Some(b'.');
        // `def value=(v)`: the setter's `=` is part of its name.
        if def_name
            && !receiver
            && self.peek(0) == Some(b'=')
            && !matches!(self.peek(1), Some(b'=' | b'~' | b'>'))
        {
            self.pos += 1;
        }

        let source = self.text;
        let text = &source[start..self.pos];
        let label = self.peek(0) == Some(b':') && self.peek(1) != Some(b':');
        let kind = if text.as_bytes()[0].is_ascii_uppercase() {
            TokenKind::Const
        } else if def_name || after_dot || label {
            TokenKind::Ident
        } else {
            Keyword::from_ident(text).map_or(TokenKind::Ident, TokenKind::Kw)
        };

        let binds = kind == TokenKind::Ident
            && !def_name
            && !after_dot
            && (self.params.as_ref().is_some_and(|p| p.expect)
                || self.last_kind(0) == Some(TokenKind::Kw(Keyword::For))
                || self.rescue_binding());
        self.push(kind, start);
        if binds {
            self.locals.insert(text);
        }

        // `def name a, b`
        if def_name && !receiver {
            let rest = &self.src[self.pos..];
            let blanks = rest.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
            if blanks > 0
                && rest
                    .get(blanks)
                    .is_some_and(|&b| is_ident_start(b) || b == b'*' || b == b'&')
            {
                self.params = Some(Params {
                    end: ParamsEnd::Line,
                    depth: 0,
                    expect: true,
                });
            }
        }
    }

    fn variable(&mut self, kind: TokenKind) -> Result<()> {
        let start = self.pos;
        match (self.peek(0), self.peek(1)) {
            (Some(b'@'), Some(b'@')) => self.pos += 2,
            (Some(b'$'), Some(b'-')) => self.pos += 2,
            (Some(b'$'), Some(c)) if !is_ident_continue(c) && c.is_ascii_graphic() => {
                self.pos += 2;
                self.push(kind, start);
                return Ok(());
            }
            _ => self.pos += 1,
        }
        if !self.peek(0).is_some_and(is_ident_continue) {
            return Err(self.error_at(start, "invalid variable name"));
        }
        self.eat_while(is_ident_continue);
        self.push(kind, start);
        Ok(())
    }

    // ------------------ literals ------------------

    /// Scans from an opening delimiter through its matching close. Paired
    /// delimiters nest; `#{...}` is skipped as code when `interpolate`.
    fn delimited(&mut self, open: u8, close: u8, interpolate: bool) -> Result<()> {
        let start = self.pos;
        let mut depth = 1usize;
        self.pos += 1;
        while self.pos < self.src.len() {
            let b = self.src[self.pos];
            if b == b'\\' {
                self.pos += 2;
            } else if b == close {
                self.pos += 1;
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            } else if b == open {
                self.pos += 1;
                depth += 1;
            } else if interpolate && b == b'#' && self.peek(1) == Some(b'{') {
                self.pos += 2;
                self.interpolation(start)?;
            } else {
                self.pos += 1;
            }
        }
        Err(self.error_at(start, "unterminated literal"))
    }

    fn interpolation(&mut self, literal_start: usize) -> Result<()> {
        let mut depth = 1usize;
        while self.pos < self.src.len() {
            match self.src[self.pos] {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                q @ (b'"' | b'`') => self.delimited(q, q, true)?,
                b'\'' => self.delimited(b'\'', b'\'', false)?,
                b'\\' => self.pos += 2,
                _ => self.pos += 1,
            }
        }
        Err(self.error_at(literal_start, "unterminated interpolation"))
    }

    fn colon(&mut self) -> Result<()> {
        let start = self.pos;
        match self.peek(1) {
            Some(b':') => {
                self.pos += 2;
                self.push(TokenKind::ColonColon, start);
            }
            Some(q @ (b'"' | b'\'')) => {
                self.pos += 1;
                self.delimited(q, q, q == b'"')?;
                self.push(TokenKind::Symbol, start);
            }
            Some(b'@' | b'$') => {
                self.pos += 1;
                self.variable(TokenKind::Symbol)?;
                if let Some(t) = self.out.last_mut() {
                    t.start = start;
                    t.len += 1;
                }
            }
            Some(c) if is_ident_start(c) => {
                self.pos += 1;
                self.eat_while(is_ident_continue);
                if matches!(self.peek(0), Some(b'?' | b'!')) {
                    self.pos += 1;
                } else if self.peek(0) == Some(b'=')
                    && !matches!(self.peek(1), Some(b'=' | b'~' | b'>'))
                {
                    self.pos += 1;
                }
                self.push(TokenKind::Symbol, start);
            }
            _ => {
                let rest = &self.src[start + 1..];
                match OP_METHODS.iter().find(|m| rest.starts_with(m.as_bytes())) {
                    Some(m) if *m != "`" => {
                        self.pos += 1 + m.len();
                        self.push(TokenKind::Symbol, start);
                    }
                    _ => {
                        self.pos += 1;
                        self.push(TokenKind::Op, start);
                    }
                }
            }
        }
        Ok(())
    }

    // ?a, ?\n
    fn char_literal(&mut self) -> bool {
        let start = self.pos;
        let len = match (self.peek(1), self.peek(2)) {
            (Some(b'\\'), Some(_)) => 3,
            (Some(c), next) if !c.is_ascii_whitespace() => {
                if is_ident_continue(c) && next.is_some_and(is_ident_continue) {
                    return false;
                }
                2
            }
            _ => return false,
        };
        self.pos += len;
        // finish a multi-byte UTF-8 character
        self.eat_while(|b| b & 0xC0 == 0x80);
        self.push(TokenKind::String, start);
        true
    }

    fn percent_literal(&mut self) -> Result<bool> {
        let start = self.pos;
        let (kind, interpolate, open_at) = match (self.peek(1), self.peek(2)) {
            (Some(t @ (b'q' | b'w' | b'i' | b's')), Some(d)) if !d.is_ascii_alphanumeric() => {
                let kind = if t == b's' { TokenKind::Symbol } else { TokenKind::String };
                (kind, false, 2)
            }
            (Some(t @ (b'Q' | b'W' | b'I' | b'x' | b'r')), Some(d)) if !d.is_ascii_alphanumeric() => {
                let kind = if t == b'r' { TokenKind::Regex } else { TokenKind::String };
                (kind, true, 2)
            }
            (Some(d), _) if !d.is_ascii_alphanumeric() && d != b'=' => (TokenKind::String, true, 1),
            _ => return Ok(false),
        };

        let open = self.src[start + open_at];
        if open.is_ascii_whitespace() {
            return Ok(false);
        }
        self.pos = start + open_at;
        self.delimited(open, closing_delimiter(open), interpolate)?;
        if kind == TokenKind::Regex {
            self.eat_while(|b| b.is_ascii_lowercase());
        }
        self.push(kind, start);
        Ok(true)
    }

    fn regex(&mut self) -> Result<()> {
        let start = self.pos;
        let mut in_class = false;
        self.pos += 1;
        loop {
            let Some(b) = self.peek(0) else {
                return Err(self.error_at(start, "unterminated regexp"));
            };
            match b {
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    break;
                }
                b'#' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.interpolation(start)?;
                }
                _ => self.pos += 1,
            }
        }
        self.eat_while(|b| b.is_ascii_lowercase());
        self.push(TokenKind::Regex, start);
        Ok(())
    }

    // <<ID, <<-ID, <<~ID, <<~'ID'
    fn heredoc_opener(&mut self) -> bool {
        let start = self.pos;
        if self.peek(1) != Some(b'<') {
            return false;
        }
        let mut at = start + 2;
        let indented = matches!(self.src.get(at), Some(b'~' | b'-'));
        if indented {
            at += 1;
        }

        let id = match self.src.get(at) {
            Some(&q @ (b'\'' | b'"' | b'`')) => {
                let body = &self.src[at + 1..];
                let Some(len) = body.iter().position(|&b| b == q || b == b'\n') else {
                    return false;
                };
                if body[len] != q || len == 0 {
                    return false;
                }
                let id = body[..len].to_vec();
                at += len + 2;
                id
            }
            Some(&c) if is_ident_start(c) => {
                let len = self.src[at..]
                    .iter()
                    .take_while(|&&b| is_ident_continue(b))
                    .count();
                let id = self.src[at..at + len].to_vec();
                at += len;
                id
            }
            _ => return false,
        };

        self.pos = at;
        self.push(TokenKind::String, start);
        self.heredocs.push(Heredoc {
            id,
            indented,
            start,
        });
        true
    }

    // ------------------ punctuation ------------------

    fn operator_method(&mut self) -> bool {
        let rest = &self.src[self.pos..];
        let Some(m) = OP_METHODS.iter().find(|m| rest.starts_with(m.as_bytes())) else {
            return false;
        };
        let start = self.pos;
        self.pos += m.len();
        self.push(TokenKind::Ident, start);
        true
    }

    fn operator(&mut self) -> Result<()> {
        let rest = &self.src[self.pos..];
        let Some(&(op, kind)) = OPERATORS.iter().find(|(op, _)| rest.starts_with(op.as_bytes()))
        else {
            let c = self.text[self.pos..].chars().next().unwrap_or('\u{fffd}');
            return Err(self.error_at(self.pos, format!("unexpected character {c:?}")));
        };
        if kind == TokenKind::Assign || ASSIGN_OPS.contains(&op) {
            self.bind_targets();
        }
        let start = self.pos;
        self.pos += op.len();
        self.push(kind, start);
        self.open_params();
        Ok(())
    }
}
