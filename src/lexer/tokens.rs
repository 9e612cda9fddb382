// src/lexer/tokens.rs

/// Reserved words that shape the tree. Everything else (`self`, `nil`,
/// `yield`, ...) lexes as a plain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Module,
    Class,
    Def,
    Begin,
    Case,
    If,
    Unless,
    While,
    Until,
    For,
    Do,
    End,
    Then,
    Else,
    Elsif,
    When,
    In,
    And,
    Or,
    Not,
    Return,
    Break,
    Next,
    Rescue,
    Ensure,
}

impl Keyword {
    pub fn from_ident(s: &str) -> Option<Self> {
        use Keyword::*;
        Some(match s {
            "module" => Module,
            "class" => Class,
            "def" => Def,
            "begin" => Begin,
            "case" => Case,
            "if" => If,
            "unless" => Unless,
            "while" => While,
            "until" => Until,
            "for" => For,
            "do" => Do,
            "end" => End,
            "then" => Then,
            "else" => Else,
            "elsif" => Elsif,
            "when" => When,
            "in" => In,
            "and" => And,
            "or" => Or,
            "not" => Not,
            "return" => Return,
            "break" => Break,
            "next" => Next,
            "rescue" => Rescue,
            "ensure" => Ensure,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Const,
    Var, // @ivar, @@cvar, $global
    Kw(Keyword),

    Int,
    Float, // also rationals and imaginaries
    String,
    Symbol,
    Regex,

    Newline,
    Semi,
    Comma,
    Dot, // `.` and `&.`
    ColonColon,
    Assign, // plain `=` only
    Pipe,
    Op,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // retagged from LBracket
    IndexLBracket,
    ArrayLBracket,

    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub len: usize,
}

impl Token {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end()]
    }
}

/// Value of an integer literal as written (`1_000`, `0x1F`, `0b101`, `017`,
/// `0o17`, `0d9`). Saturates at `u128::MAX`; the lexer has already checked
/// the digits.
pub fn int_value(text: &str) -> u128 {
    let lower = text.to_ascii_lowercase();
    let (radix, digits) = match lower.as_bytes() {
        [b'0', b'x', ..] => (16, &lower[2..]),
        [b'0', b'b', ..] => (2, &lower[2..]),
        [b'0', b'o', ..] => (8, &lower[2..]),
        [b'0', b'd', ..] => (10, &lower[2..]),
        [b'0', _, ..] => (8, &lower[1..]),
        _ => (10, &lower[..]),
    };

    let mut acc: u128 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let d = c.to_digit(radix).unwrap_or(0) as u128;
        acc = acc
            .checked_mul(radix as u128)
            .and_then(|a| a.checked_add(d))
            .unwrap_or(u128::MAX);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_values_follow_ruby_prefixes() {
        assert_eq!(int_value("0"), 0);
        assert_eq!(int_value("42"), 42);
        assert_eq!(int_value("1_000_000"), 1_000_000);
        assert_eq!(int_value("0x1F"), 31);
        assert_eq!(int_value("0XfF"), 255);
        assert_eq!(int_value("0b1010"), 10);
        assert_eq!(int_value("017"), 15);
        assert_eq!(int_value("0o17"), 15);
        assert_eq!(int_value("0d99"), 99);
        assert_eq!(int_value("18446744073709551616"), 1u128 << 64);
    }

    #[test]
    fn huge_literals_saturate() {
        let text = "9".repeat(60);
        assert_eq!(int_value(&text), u128::MAX);
    }
}
