// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

// Expression tree model: a node carries either an immediate value lexeme
// or an operator glyph, plus a content-addressed id that is recomputed
// bottom-up whenever a child changes.

use std::fmt;

use crate::error::FormulaError;

/// Whether a [`Node`] is a leaf value or an arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A literal value: an integer, a decimal, a LaTeX mixed fraction, or a symbolic atom.
    Immediate,
    /// A binary arithmetic operator (`+ - * /`).
    Operator,
}

/// A node in an arithmetic expression tree.
///
/// `id` is the content-addressed signature: `id(leaf) = character`,
/// `id(op a b) = id(a) "|" id(b) character`
/// (left id, a literal `|`, right id, operator glyph in postfix
/// position). Two structurally different trees always have different
/// ids, even when mathematically equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    pub character: String,
    pub kind: Kind,
    pub children: Vec<Node>,
    pub id: String,
}

/// Returns the binding priority of an operator glyph: `2` for `* /`, `1` for `+ -`.
/// Open brackets are treated as priority `0` by the parser (lower than any operator),
/// so they are only popped by their matching close bracket.
pub fn priority(character: char) -> Result<i32, FormulaError> {
    match character {
        '*' | '/' => Ok(2),
        '+' | '-' => Ok(1),
        _ => Err(FormulaError::IllegalOperator { character }),
    }
}

/// Toggles `+ <-> -` and `* <-> /`. Used by association rewrites to
/// preserve meaning when a negative-form operator changes sides.
pub fn toggle_polarity(character: char) -> Result<char, FormulaError> {
    match character {
        '+' => Ok('-'),
        '-' => Ok('+'),
        '*' => Ok('/'),
        '/' => Ok('*'),
        _ => Err(FormulaError::IllegalOperator { character }),
    }
}

/// Whether an operator glyph is one of the "negative" forms (subtraction or division),
/// used by §4.4 association sign flips and §4.4 reverse-distribution eligibility.
pub fn is_negative_form(character: char) -> bool {
    matches!(character, '-' | '/')
}

impl Node {
    /// Builds an IMMEDIATE leaf carrying the given lexeme.
    pub fn immediate(lexeme: impl Into<String>) -> Node {
        let character = lexeme.into();
        let id = character.clone();

        Node {
            character,
            kind: Kind::Immediate,
            children: Vec::new(),
            id,
        }
    }

    /// Builds an OPERATOR node combining `left` and `right`, recomputing `id`.
    pub fn operator(character: char, left: Node, right: Node) -> Node {
        let id = format!("{}|{}{}", left.id, right.id, character);

        Node {
            character: character.to_string(),
            kind: Kind::Operator,
            children: vec![left, right],
            id,
        }
    }

    /// Rebuilds `id` bottom-up from `character` and `children`. Every rewrite
    /// that mutates a child in place must call this afterwards; rewrites that
    /// build fresh trees via [`Node::operator`] never need to.
    pub fn recompute_id(&mut self) {
        for child in &mut self.children {
            child.recompute_id();
        }

        self.id = match self.kind {
            Kind::Immediate => self.character.clone(),
            Kind::Operator => {
                let op = self
                    .character
                    .chars()
                    .next()
                    .expect("operator node character is never empty");
                format!("{}|{}{}", self.children[0].id, self.children[1].id, op)
            }
        };
    }

    /// The single operator glyph carried by an OPERATOR node.
    pub fn operator_char(&self) -> Result<char, FormulaError> {
        if self.kind != Kind::Operator {
            return Err(FormulaError::IllegalOperator {
                character: self.character.chars().next().unwrap_or('\0'),
            });
        }

        Ok(self
            .character
            .chars()
            .next()
            .expect("operator node character is never empty"))
    }

    pub fn is_immediate(&self) -> bool {
        self.kind == Kind::Immediate
    }

    pub fn is_operator(&self) -> bool {
        self.kind == Kind::Operator
    }

    pub fn left(&self) -> &Node {
        &self.children[0]
    }

    pub fn right(&self) -> &Node {
        &self.children[1]
    }

    /// Number of occurrences of `+ - * /` in this tree's id — a proxy for tree
    /// complexity used throughout the comparator (spec glossary: "Operator count").
    pub fn operator_count(&self) -> usize {
        self.id
            .chars()
            .filter(|c| matches!(c, '+' | '-' | '*' | '/'))
            .count()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Immediate => write!(f, "{}", self.character),
            Kind::Operator => write!(f, "({} {} {})", self.left(), self.character, self.right()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn leaf(s: &str) -> Node {
        Node::immediate(s)
    }

    #[test]
    fn leaf_id_is_character() {
        let n = leaf("7");
        assert_eq!(n.id, "7");
    }

    #[test]
    fn operator_id_is_postfix_with_pipe() {
        let n = Node::operator('+', leaf("1"), leaf("2"));
        assert_eq!(n.id, "1|2+");
    }

    #[test]
    fn nested_operator_id() {
        // 1+2*3 -> 1 + (2*3)
        let n = Node::operator('+', leaf("1"), Node::operator('*', leaf("2"), leaf("3")));
        assert_eq!(n.id, "1|2|3*+");
    }

    #[test]
    fn recompute_id_after_mutation() {
        let mut n = Node::operator('+', leaf("1"), leaf("2"));
        n.children[1] = leaf("5");
        n.recompute_id();
        assert_eq!(n.id, "1|5+");
    }

    #[test]
    fn operator_count_counts_only_arithmetic_glyphs() {
        let n = Node::operator(
            '+',
            Node::operator('*', leaf("2"), leaf("3")),
            leaf("x"),
        );
        assert_eq!(n.operator_count(), 2);
    }

    #[test]
    fn priority_orders_mul_div_above_add_sub() {
        assert_eq!(priority('*').unwrap(), priority('/').unwrap());
        assert_eq!(priority('+').unwrap(), priority('-').unwrap());
        assert!(priority('*').unwrap() > priority('+').unwrap());
    }

    #[test]
    fn toggle_polarity_is_involution() {
        for c in ['+', '-', '*', '/'] {
            assert_eq!(toggle_polarity(toggle_polarity(c).unwrap()).unwrap(), c);
        }
    }
}
