// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Infix tokenizer and tree builder.
//!
//! `chumsky` combinators build the tree directly, mirroring precedence via
//! `foldl`: the grammar (`expr := term (('+'|'-') term)*`, `term := factor
//! (('*'|'/') factor)*`, `factor := '(' expr ')' | ... | atom`) is exactly
//! the shape chumsky's left-fold combinators already produce, so a
//! left-associative precedence-climbing parser is used for `+ - * /`
//! rather than a hand-rolled two-stack shunting-yard algorithm (an
//! equivalent, lower-level description of the same left-associative
//! semantics).
//!
//! Whitespace is skipped only around `factor` (mirroring the teacher's own
//! `atomic_expression.padded()` placement), never stripped from the input
//! string up front — a blanket strip would glue two whitespace-separated
//! tokens into one (`"1 2"` -> `"12"`), silently accepting input the
//! grammar must reject since nothing joins two adjacent atoms without an
//! operator between them.

use chumsky::prelude::*;

use crate::error::FormulaError;
use crate::node::{priority, Node};

/// Parses `s` into an expression tree, or a formula error carrying the
/// offending text.
pub fn parse(s: &str) -> Result<Node, FormulaError> {
    parser().parse(s).map_err(|errors| {
        let reason = errors
            .into_iter()
            .next()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unexpected end of input".to_owned());

        FormulaError::Parse {
            formula: s.to_owned(),
            reason,
        }
    })
}

/// Whether `s` is a prefix of a well-formed formula (unexpected end of
/// input, e.g. an unclosed bracket) rather than definitively malformed —
/// used by the REPL to decide whether to keep reading more lines.
pub fn is_incomplete(s: &str) -> bool {
    match parser().parse(s) {
        Ok(_) => false,
        Err(errors) => errors.iter().any(|e| e.found().is_none()),
    }
}

fn combine(operator: char, a: Node, b: Node) -> Node {
    // Operator nodes always have exactly two children; priority() never
    // rejects '+','-','*','/'.
    debug_assert!(priority(operator).is_ok());
    Node::operator(operator, a, b)
}

/// A maximal run of word characters (`[A-Za-z0-9_]+`). Shared between the
/// bare `word` atom and the three groups of a LaTeX fraction, since fraction
/// parsing treats "a run of word characters" uniformly for all three, not
/// just digits.
fn word_run() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .collect::<String>()
}

fn parser() -> impl Parser<char, Node, Error = Simple<char>> {
    recursive(|expression| {
        // `word? \frac{word}{word}`, one IMMEDIATE lexeme.
        let latex_frac = word_run()
            .or_not()
            .then_ignore(just("\\frac"))
            .then(
                word_run()
                    .delimited_by(just('{'), just('}'))
                    .then(word_run().delimited_by(just('{'), just('}'))),
            )
            .map(|(prefix, (num, den))| {
                let prefix = prefix.unwrap_or_default();
                Node::immediate(format!("{}\\frac{{{}}}{{{}}}", prefix, num, den))
            })
            .labelled("latex_frac")
            .boxed();

        // Decimal floating literal: `digits . digits`, one IMMEDIATE.
        let decimal = text::digits(10)
            .then_ignore(just('.'))
            .then(text::digits(10))
            .map(|(int_part, frac_part): (String, String)| {
                Node::immediate(format!("{}.{}", int_part, frac_part))
            })
            .labelled("decimal")
            .boxed();

        // Maximal word-character run, one IMMEDIATE (letters allowed for
        // symbolic atoms like `x`). Unlike `text::ident()`, `word :=
        // [A-Za-z0-9_]+` permits a digit-leading run, which is how a bare
        // integer literal like `42` is tokenized.
        let word = word_run()
            .map(Node::immediate)
            .labelled("word")
            .boxed();

        let atom = latex_frac.or(decimal).or(word).labelled("atom").boxed();

        let factor = atom
            .or(expression.clone().delimited_by(just('('), just(')')))
            .or(expression.clone().delimited_by(just('['), just(']')))
            .or(expression.delimited_by(just('{'), just('}')))
            .padded()
            .labelled("factor")
            .boxed();

        let term = factor
            .clone()
            .then(one_of("*/").then(factor).repeated())
            .foldl(|a, (op, b)| combine(op, a, b))
            .labelled("term")
            .boxed();

        term.clone()
            .then(one_of("+-").then(term).repeated())
            .foldl(|a, (op, b)| combine(op, a, b))
            .labelled("expr")
            .boxed()
    })
    .then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Kind;

    #[track_caller]
    fn ok(s: &str) -> Node {
        parse(s).unwrap_or_else(|e| panic!("expected {s} to parse, got {e:?}"))
    }

    #[track_caller]
    fn err(s: &str) {
        assert!(parse(s).is_err(), "expected {s} to fail to parse");
    }

    #[test]
    fn single_immediate() {
        let n = ok("42");
        assert_eq!(n.kind, Kind::Immediate);
        assert_eq!(n.character, "42");
    }

    #[test]
    fn precedence_example() {
        // 1+2*3 -> + with left IMMEDIATE 1, right * with children 2, 3.
        let n = ok("1+2*3");
        assert_eq!(n.kind, Kind::Operator);
        assert_eq!(n.character, "+");
        assert!(n.left().is_immediate());
        assert_eq!(n.left().character, "1");
        assert!(n.right().is_operator());
        assert_eq!(n.right().character, "*");
        assert_eq!(n.right().left().character, "2");
        assert_eq!(n.right().right().character, "3");
    }

    #[test]
    fn left_associativity() {
        let n = ok("1-2-3");
        assert_eq!(n.character, "-");
        assert_eq!(n.left().character, "-");
        assert_eq!(n.left().left().character, "1");
        assert_eq!(n.left().right().character, "2");
        assert_eq!(n.right().character, "3");
    }

    #[test]
    fn brackets_by_family() {
        ok("(1+2)*3");
        ok("[1+2]*3");
        ok("{1+2}*3");
    }

    #[test]
    fn latex_frac_atom() {
        let n = ok("2\\frac{1}{3}+1");
        assert_eq!(n.left().character, "2\\frac{1}{3}");
    }

    #[test]
    fn latex_frac_without_integer_prefix() {
        let n = ok("\\frac{5}{6}");
        assert_eq!(n.character, "\\frac{5}{6}");
    }

    #[test]
    fn symbolic_atom() {
        let n = ok("a+b");
        assert_eq!(n.left().character, "a");
        assert_eq!(n.right().character, "b");
    }

    #[test]
    fn whitespace_is_ignored() {
        let a = ok("1 + 2 *  3");
        let b = ok("1+2*3");
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn parser_negatives() {
        err(")");
        err("1+");
        err("1 2");
        err("(1+2");
        err("(1+2]");
    }
}
