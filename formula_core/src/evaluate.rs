// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Constant folding.
//!
//! `evalTree` repeatedly collapses the deepest all-IMMEDIATE operator node
//! via [`constringe`] until the whole tree is a single IMMEDIATE, returning
//! every equivalent re-expression of that final value along the way.
//! Results are memoized on tree id in [`crate::Engine::eval_cache`].

use std::collections::HashSet;

use crate::node::Node;
use crate::rational::{self, decimal_digits, PrimeCache, Rational};

/// `evalNode(a, b, op)`: parses each operand as a fraction-or-decimal and
/// performs the corresponding mixed-fraction arithmetic. Returns `None`
/// when either operand is a symbolic atom, or on division by zero.
pub fn eval_node(cache: &mut PrimeCache, a: &str, b: &str, op: char) -> Option<Rational> {
    let ra = parse_operand(cache, a)?;
    let rb = parse_operand(cache, b)?;

    match op {
        '+' => Some(rational::add(cache, ra, rb)),
        '-' => Some(rational::sub(cache, ra, rb)),
        '*' => Some(rational::mul(cache, ra, rb)),
        '/' => rational::div(cache, ra, rb),
        _ => None,
    }
}

/// Parses a lexeme as a fraction-or-decimal, used wherever an IMMEDIATE's
/// literal value is needed (evaluation, comparison under reduction).
pub fn parse_operand(cache: &mut PrimeCache, s: &str) -> Option<Rational> {
    rational::parse_frac(s).or_else(|| rational::float_to_frac(cache, s))
}

/// `deriveFracFloat(imm)`: every canonically-equivalent rewriting of an
/// IMMEDIATE literal — the original lexeme; the reduced mixed form; the
/// improper form; when a non-zero integer part exists, both the mixed form
/// and an explicit `I + N/D` operator tree; and a decimal form when the
/// denominator divides evenly within ten fractional digits. Symbolic atoms
/// (not parseable as fraction or decimal) re-express only as themselves.
pub fn derive_frac_float(cache: &mut PrimeCache, imm: &Node) -> Vec<Node> {
    debug_assert!(imm.is_immediate());

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |n: Node, seen: &mut HashSet<String>, out: &mut Vec<Node>| {
        if seen.insert(n.id.clone()) {
            out.push(n);
        }
    };

    push(imm.clone(), &mut seen, &mut out);

    let Some(value) = parse_operand(cache, &imm.character) else {
        return out;
    };

    push(Node::immediate(value.to_string()), &mut seen, &mut out);

    let improper = value.to_improper();
    push(Node::immediate(improper.to_string()), &mut seen, &mut out);

    if value.i != 0 && value.n != 0 {
        let fraction_only = Rational {
            i: 0,
            n: value.n,
            d: value.d,
        };
        let split = Node::operator(
            '+',
            Node::immediate(value.i.to_string()),
            Node::immediate(fraction_only.to_string()),
        );
        push(split, &mut seen, &mut out);
    }

    if let Some(decimal) = decimal_digits(&value) {
        push(Node::immediate(decimal), &mut seen, &mut out);
    }

    out
}

/// Rewrites the deepest operator node whose both children are IMMEDIATE
/// into a new IMMEDIATE (collapsed via [`eval_node`]), returning one parent
/// tree per admissible [`derive_frac_float`] decoration of that new value.
/// Returns `vec![t.clone()]` unchanged if no collapsible node exists.
pub fn constringe(cache: &mut PrimeCache, t: &Node) -> Vec<Node> {
    if t.is_immediate() {
        return vec![t.clone()];
    }

    let left = t.left();
    let right = t.right();

    if left.is_operator() {
        return constringe(cache, left)
            .into_iter()
            .map(|new_left| Node::operator(t.character.chars().next().unwrap(), new_left, right.clone()))
            .collect();
    }

    if right.is_operator() {
        return constringe(cache, right)
            .into_iter()
            .map(|new_right| Node::operator(t.character.chars().next().unwrap(), left.clone(), new_right))
            .collect();
    }

    // Both children are IMMEDIATE: this is the deepest collapsible node.
    let op = t.character.chars().next().unwrap();

    match eval_node(cache, &left.character, &right.character, op) {
        Some(value) => derive_frac_float(cache, &Node::immediate(value.to_string())),
        None => vec![t.clone()],
    }
}

/// `evalTree(t)`: repeatedly applies [`constringe`] (taking the first
/// resulting tree each time) until the tree is a single IMMEDIATE, then
/// returns every element of that final `constringe` call that is
/// IMMEDIATE. Memoized on `t.id` by the caller.
pub fn eval_tree(cache: &mut PrimeCache, t: &Node) -> Vec<Node> {
    let mut current = t.clone();

    loop {
        if current.is_immediate() {
            return vec![current];
        }

        let results = constringe(cache, &current);

        if results.len() == 1 && results[0].id == current.id {
            // No collapsible all-IMMEDIATE node was found (e.g. a symbolic
            // atom blocks evaluation); nothing further to do.
            return results.into_iter().filter(Node::is_immediate).collect();
        }

        if results.iter().all(|r| r.is_immediate()) {
            return results;
        }

        current = results.into_iter().next().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn eval_node_examples() {
        let mut cache = PrimeCache::new();
        let r = eval_node(&mut cache, "1", "2", '+').unwrap();
        assert_eq!(r, Rational::from_integer(3));
    }

    #[test]
    fn eval_node_symbolic_is_none() {
        let mut cache = PrimeCache::new();
        assert_eq!(eval_node(&mut cache, "a", "2", '+'), None);
    }

    #[test]
    fn eval_tree_simple_arithmetic() {
        let mut cache = PrimeCache::new();
        let t = parse("1+2*3").unwrap();
        let results = eval_tree(&mut cache, &t);
        assert!(results.iter().any(|n| n.character == "7"));
    }

    #[test]
    fn eval_tree_latex_fraction_addition() {
        let mut cache = PrimeCache::new();
        let t = parse("\\frac{1}{2}+\\frac{1}{3}").unwrap();
        let results = eval_tree(&mut cache, &t);
        assert!(results.iter().any(|n| n.character == "\\frac{5}{6}"));
    }

    #[test]
    fn derive_frac_float_includes_decimal_and_improper() {
        let mut cache = PrimeCache::new();
        let imm = Node::immediate("1\\frac{1}{2}");
        let forms = derive_frac_float(&mut cache, &imm);
        let chars: Vec<&str> = forms.iter().map(|n| n.character.as_str()).collect();
        assert!(chars.contains(&"1\\frac{1}{2}"));
        assert!(chars.contains(&"\\frac{3}{2}"));
        assert!(chars.contains(&"1.5"));
    }

    #[test]
    fn derive_frac_float_on_symbolic_atom_is_identity() {
        let mut cache = PrimeCache::new();
        let imm = Node::immediate("x");
        let forms = derive_frac_float(&mut cache, &imm);
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].character, "x");
    }
}
