// src/locate.rs
//! Finds generated integer tables: `recv._name = [int, int, ...]`.

use crate::{
    config::Options,
    error::Result,
    lexer::{LineIndex, TokenKind, int_value},
    parser::{self, Group, Node, Statement},
};

/// One matched table assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericTable {
    pub name: String,
    /// Receiver of the setter as written, usually `self`.
    pub receiver: String,
    pub numbers: Vec<u128>,
    /// 1-based, inclusive.
    pub start_line: usize,
    pub end_line: usize,
    /// Byte column of the statement start on `start_line`.
    pub start_col: usize,
    /// Byte column one past the closing `]` on `end_line`.
    pub end_col: usize,
}

/// All table assignments in `src`, in source order.
pub fn locate(src: &str, opts: &Options) -> Result<Vec<NumericTable>> {
    let program = parser::parse(src)?;
    let cx = Cx {
        src,
        lines: LineIndex::new(src),
        prefix: opts.prefix,
    };
    let mut found = Vec::new();
    cx.visit_body(&program.body, &mut found);
    Ok(found)
}

struct Cx<'a> {
    src: &'a str,
    lines: LineIndex,
    prefix: char,
}

impl Cx<'_> {
    fn visit_body(&self, body: &[Statement], found: &mut Vec<NumericTable>) {
        for stmt in body {
            self.visit_statement(stmt, found);
        }
    }

    fn visit_statement(&self, stmt: &Statement, found: &mut Vec<NumericTable>) {
        if let Some(table) = self.match_table(stmt) {
            log::debug!(
                "found table {} ({} elements) at lines {}..={}",
                table.name,
                table.numbers.len(),
                table.start_line,
                table.end_line
            );
            found.push(table);
            return;
        }
        for node in &stmt.nodes {
            self.visit_node(node, found);
        }
    }

    fn visit_node(&self, node: &Node, found: &mut Vec<NumericTable>) {
        match node {
            Node::Scope(s) => self.visit_body(&s.body, found),
            Node::Group(g) => self.visit_body(&g.body, found),
            Node::Int(_) | Node::Leaf(_) => {}
        }
    }

    fn match_table(&self, stmt: &Statement) -> Option<NumericTable> {
        // The setter must be the whole statement; `x = self._a = [..]` and
        // setters inside a ternary branch are skipped on purpose.
        let [receiver @ .., Node::Leaf(dot), Node::Leaf(name), Node::Leaf(assign), Node::Group(array)] =
            stmt.nodes.as_slice()
        else {
            return None;
        };
        if receiver.is_empty()
            || !receiver.iter().all(is_receiver_part)
            || dot.text(self.src) != "."
            || name.kind != TokenKind::Ident
            || assign.kind != TokenKind::Assign
            || array.open != TokenKind::ArrayLBracket
        {
            return None;
        }

        let name = name.text(self.src);
        let mut chars = name.chars();
        if chars.next() != Some(self.prefix) || chars.next().is_none() {
            return None;
        }
        let numbers = self.int_elements(array)?;

        let start = receiver[0].span().start;
        let recv_end = receiver[receiver.len() - 1].span().end;
        let (start_line, start_col) = self.lines.line_col(start);
        let (end_line, end_col) = self.lines.line_col(array.span.end);
        Some(NumericTable {
            name: name.to_string(),
            receiver: self.src[start..recv_end].to_string(),
            numbers,
            start_line,
            end_line,
            start_col,
            end_col,
        })
    }

    /// `Some` only when every element is a bare integer literal.
    fn int_elements(&self, array: &Group) -> Option<Vec<u128>> {
        let nodes = match array.body.as_slice() {
            [] => return Some(Vec::new()),
            [only] => &only.nodes,
            _ => return None,
        };

        let mut numbers = Vec::with_capacity(nodes.len() / 2 + 1);
        let mut it = nodes.iter();
        loop {
            match it.next() {
                Some(Node::Int(t)) => numbers.push(int_value(t.text(self.src))),
                _ => return None,
            }
            match it.next() {
                None => return Some(numbers),
                Some(n) if n.token_kind() == Some(TokenKind::Comma) => {
                    // trailing comma
                    if it.as_slice().is_empty() {
                        return Some(numbers);
                    }
                }
                Some(_) => return None,
            }
        }
    }
}

/// Receivers are plain call chains: `self`, `Foo::Bar`, `@x`, `a.b(c)[0]`.
fn is_receiver_part(node: &Node) -> bool {
    match node {
        Node::Leaf(t) => matches!(
            t.kind,
            TokenKind::Ident | TokenKind::Const | TokenKind::Var | TokenKind::Dot | TokenKind::ColonColon
        ),
        Node::Group(g) => g.open != TokenKind::ArrayLBracket,
        Node::Int(_) | Node::Scope(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tables(src: &str) -> Vec<NumericTable> {
        locate(src, &Options::default()).unwrap()
    }

    fn names(src: &str) -> Vec<String> {
        tables(src).into_iter().map(|t| t.name).collect()
    }

    #[test]
    fn single_line_table() {
        let t = &tables("self._trans_keys = [1, 2, 3, 4, 5]\n")[0];
        assert_eq!(t.name, "_trans_keys");
        assert_eq!(t.receiver, "self");
        assert_eq!(t.numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!((t.start_line, t.end_line), (1, 1));
        assert_eq!((t.start_col, t.end_col), (0, 34));
    }

    #[test]
    fn multi_line_span_and_columns() {
        let src = "module M\n  x = 1\n  self._key_offsets = [\n    0, 0x10,\n    017\n  ] # done\nend\n";
        let t = &tables(src)[0];
        assert_eq!(t.numbers, vec![0, 16, 15]);
        assert_eq!((t.start_line, t.end_line), (3, 6));
        assert_eq!((t.start_col, t.end_col), (2, 3));
    }

    #[test]
    fn nested_tables_in_source_order() {
        let src = "\
class Lexer
  class << self
    attr_accessor :_a
  end
  self._a = [1]
  def self.init
    if ready
      self._b = [2,
        3]
    end
  end
  self._c = [4, 5,]
end
";
        assert_eq!(names(src), vec!["_a", "_b", "_c"]);
        assert_eq!(tables(src)[2].numbers, vec![4, 5]);
    }

    #[test]
    fn other_receivers_are_kept_verbatim() {
        let t = &tables("Foo::Bar._x = [1]\n@obj.cfg._y = [2]")[..];
        assert_eq!(t[0].receiver, "Foo::Bar");
        assert_eq!(t[1].receiver, "@obj.cfg");
    }

    #[test]
    fn shapes_that_do_not_match() {
        let src = "\
_a = [1, 2]
self.a = [1, 2]
self._ = [1]
self._b = [1, -2]
self._c = [1 + 2]
self._d = ['x', 1]
self._e = [[1], [2]]
self._f = [1.5]
self._g = foo([1])
self._h = [1] + [2]
self._i ||= [1]
x = self._j = [1]
self._k = [1, 2].freeze
";
        assert!(tables(src).is_empty());
    }

    #[test]
    fn empty_arrays_are_located() {
        let t = &tables("self._empty = []")[0];
        assert!(t.numbers.is_empty());
    }

    #[test]
    fn custom_prefix() {
        let opts = Options::default().with_prefix('t');
        let found = locate("self.tbl = [1]\nself._x = [2]", &opts).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "tbl");
    }

    #[test]
    fn tables_sharing_a_line() {
        let found = tables("self._a = [1]; self._b = [2]");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].start_col, 15);
    }

    #[test]
    fn strings_and_comments_are_not_tables() {
        let src = "# self._a = [1]\ns = \"self._b = [2]\"\n=begin\nself._c = [3]\n=end\n";
        assert!(tables(src).is_empty());
    }

    #[test]
    fn division_by_a_local_is_not_a_regexp() {
        let src = "p = 10\nq = p /2\nself._a = [1, 2]\nr = 6/ 3\n";
        assert_eq!(names(src), vec!["_a"]);

        let src = "n = 4\nhalf = n /2; self._b = [3]\nm = n/ 2\n";
        assert_eq!(names(src), vec!["_b"]);

        let src = "arr = []\narr <<x\nself._c = [1]\n";
        assert_eq!(names(src), vec!["_c"]);
    }

    #[test]
    fn invalid_source_is_fatal() {
        let err = locate("self._a = [1, 2\n", &Options::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidSource { line: 1, .. }));
    }
}
