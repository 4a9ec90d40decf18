// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Comparator and similarity: structural containment, evaluation-equality,
//! a signed step-count distance built on derivation search, and a fuzzy
//! structural-similarity score.

use crate::derive::{derive_distribution_forward, derive_tree, rotate_left_child, rotate_right_child};
use crate::evaluate::{constringe, parse_operand};
use crate::node::{priority, Node};
use crate::rational::{reduce_frac, PrimeCache};
use crate::Engine;

/// `judgeTree(A, B)`: structural containment via raw `id` substring search.
/// `0` equal, `1` if `A` contains `B`, `-1` if `B` contains `A`, else `None`.
pub fn judge_tree(a: &Node, b: &Node) -> Option<i32> {
    if a.id == b.id {
        Some(0)
    } else if a.id.contains(&b.id) {
        Some(1)
    } else if b.id.contains(&a.id) {
        Some(-1)
    } else {
        None
    }
}

/// `judgeTreeEvalEquals(A, B)`: compares the first IMMEDIATE of each side's
/// `evalTree` result, parsed as fraction-or-decimal and reduced.
pub fn judge_tree_eval_equals(engine: &mut Engine, a: &Node, b: &Node) -> bool {
    let results_a = engine.eval_tree(a);
    let results_b = engine.eval_tree(b);

    let (Some(fa), Some(fb)) = (results_a.first(), results_b.first()) else {
        return false;
    };
    let fa = fa.character.clone();
    let fb = fb.character.clone();

    let (Some(ra), Some(rb)) = (
        parse_operand(&mut engine.primes, &fa),
        parse_operand(&mut engine.primes, &fb),
    ) else {
        return false;
    };

    let ra = reduce_frac(&mut engine.primes, ra.i, ra.to_improper_numerator(), ra.d);
    let rb = reduce_frac(&mut engine.primes, rb.i, rb.to_improper_numerator(), rb.d);
    ra == rb
}

/// `judgeTreeDenominatorReduced(t)`: true iff reducing every leaf fraction
/// in place leaves every `id` in the tree unchanged.
pub fn judge_tree_denominator_reduced(engine: &mut Engine, t: &Node) -> bool {
    traversal_reduce_frac(&mut engine.primes, t).id == t.id
}

/// `traversalReduceFrac`: rebuilds the tree with every IMMEDIATE leaf's
/// fraction lexeme reduced to canonical (`gcd`-divided) form. Non-fraction
/// leaves (decimals, already-reduced values, symbolic atoms) pass through
/// unchanged.
fn traversal_reduce_frac(cache: &mut PrimeCache, t: &Node) -> Node {
    if t.is_immediate() {
        let lexeme = match crate::rational::parse_frac(&t.character) {
            Some(r) => reduce_frac(cache, r.i, r.to_improper_numerator(), r.d).to_string(),
            None => t.character.clone(),
        };
        Node::immediate(lexeme)
    } else {
        let op = t.operator_char().unwrap();
        Node::operator(
            op,
            traversal_reduce_frac(cache, t.left()),
            traversal_reduce_frac(cache, t.right()),
        )
    }
}

/// One step of `constringeTree`, branching to every admissible reduction
/// rather than following only the first (as [`crate::evaluate::eval_tree`]
/// does), used by `doCompare`'s bounded search.
fn constringe_branches(cache: &mut PrimeCache, t: &Node) -> Vec<Node> {
    constringe(cache, t)
}

/// `doCompare(A, B, s)`: applies `constringeTree` `s` times to `A`,
/// branching at every step, and checks whether any resulting tree has
/// `id = id(B)`.
fn do_compare(engine: &mut Engine, a: &Node, b_id: &str, steps: i32) -> bool {
    if steps < 0 {
        return false;
    }

    let mut frontier = vec![a.clone()];
    for _ in 0..steps {
        let mut next = Vec::new();
        for n in &frontier {
            next.extend(constringe_branches(&mut engine.primes, n));
        }
        frontier = next;
    }

    frontier.iter().any(|n| n.id == b_id)
}

/// Compares `a` and `b` by their full `evalTree` result-id sets rather than
/// `judgeTreeEvalEquals`'s first-element check: two wholly symbolic formulas
/// (e.g. `(a+b)*c` and `a*c+b*c`) both produce an empty `evalTree` result,
/// which must count as equal here — not as "no value to compare" — exactly
/// as `judge_similarity`'s `ids_of` comparison already treats it.
fn eval_equivalent(engine: &mut Engine, a: &Node, b: &Node) -> bool {
    let ids_of = |engine: &mut Engine, n: &Node| -> std::collections::HashSet<String> {
        engine.eval_tree(n).iter().map(|r| r.id.clone()).collect()
    };
    ids_of(engine, a) == ids_of(engine, b)
}

/// `compareTreesWithOrder(A, B)`, `A` assumed the larger side.
fn compare_trees_with_order(engine: &mut Engine, a: &Node, b: &Node) -> Option<i32> {
    if !eval_equivalent(engine, a, b) {
        return None;
    }

    let b_reduced = traversal_reduce_frac(&mut engine.primes, b);
    let s = a.operator_count() as i32 - b.operator_count() as i32;

    if do_compare(engine, a, &b_reduced.id, s) {
        return Some(s);
    }

    let candidates = derive_tree(engine, a);
    for candidate in candidates.iter() {
        if do_compare(engine, candidate, &b_reduced.id, s) {
            return Some(s);
        }
    }

    None
}

/// `compareTrees(A, B)`: signed step count, or `None` if `A` and `B` are
/// unrelated by this relation. Degrades to pure evaluation comparison once
/// either side's operator count exceeds `4`, since derivation search above
/// that bound grows explosively.
pub fn compare_trees(engine: &mut Engine, a: &Node, b: &Node) -> Option<i32> {
    if a.id == b.id {
        return Some(0);
    }

    let k_a = a.operator_count() as i32;
    let k_b = b.operator_count() as i32;

    if k_a > 4 || k_b > 4 {
        return if judge_tree_eval_equals(engine, a, b) {
            Some(k_a - k_b)
        } else {
            None
        };
    }

    let (big, small, negate) = if k_a >= k_b { (a, b, false) } else { (b, a, true) };

    compare_trees_with_order(engine, big, small).map(|v| if negate { -v } else { v })
}

/// `isRelativeByCompareTrees`.
pub fn is_relative_by_compare_trees(engine: &mut Engine, a: &Node, b: &Node) -> bool {
    compare_trees(engine, a, b).is_some()
}

/// `isRelativeByEval`.
pub fn is_relative_by_eval(engine: &mut Engine, a: &Node, b: &Node) -> bool {
    judge_tree_eval_equals(engine, a, b)
}

/// Result of [`judge_similarity`]: the score, plus the best-matching
/// rewriting of `target` found along the way (`deriveTarget`).
pub struct Similarity {
    pub similarity: f64,
    pub derive_target: Node,
}

/// `judgeSimilarity(target, template)`.
pub fn judge_similarity(engine: &mut Engine, target: &Node, template: &Node) -> Similarity {
    // Compared via eval_equivalent, not judgeTreeEvalEquals: two symbolic
    // (unevaluable) formulas both produce an empty evalTree list, which
    // must count as equal here rather than "no value to compare".
    if !eval_equivalent(engine, target, template) {
        return Similarity {
            similarity: 0.0,
            derive_target: target.clone(),
        };
    }

    if target.id.contains(&template.id) || template.id.contains(&target.id) {
        return Similarity {
            similarity: 1.0,
            derive_target: target.clone(),
        };
    }

    if target.is_immediate() || template.is_immediate() {
        return Similarity {
            similarity: 1.0,
            derive_target: target.clone(),
        };
    }

    if target.operator_count() < template.operator_count() {
        return judge_similarity(engine, template, target);
    }

    let left = judge_sub_similarity(engine, target.left(), template.left());
    let right = judge_sub_similarity(engine, target.right(), template.right());

    let mut best = (left + right) / 2.0;
    let mut best_target = target.clone();

    let op_t = target.operator_char().ok();
    let op_p = template.operator_char().ok();

    let same_priority = match (op_t, op_p) {
        (Some(a), Some(b)) => priority(a).ok() == priority(b).ok(),
        _ => false,
    };

    if same_priority {
        let mut candidates = Vec::new();
        if matches!(op_t, Some('+') | Some('*')) {
            candidates.push(Node::operator(
                op_t.unwrap(),
                target.right().clone(),
                target.left().clone(),
            ));
        }
        candidates.extend(rotate_left_child(target));
        candidates.extend(rotate_right_child(target));

        for candidate in candidates {
            let s = judge_similarity(engine, &candidate, template);
            if s.similarity > best {
                best = s.similarity;
                best_target = s.derive_target;
            }
            if best >= 1.0 {
                return Similarity {
                    similarity: 1.0,
                    derive_target: best_target,
                };
            }
        }
    } else {
        for candidate in derive_distribution_forward(target) {
            let s = judge_similarity(engine, &candidate, template);
            if s.similarity > best {
                best = s.similarity;
                best_target = s.derive_target;
            }
            if best >= 1.0 {
                return Similarity {
                    similarity: 1.0,
                    derive_target: best_target,
                };
            }
        }
    }

    Similarity {
        similarity: best,
        derive_target: best_target,
    }
}

fn judge_sub_similarity(engine: &mut Engine, a: &Node, b: &Node) -> f64 {
    judge_similarity(engine, a, b).similarity
}

/// `isRelativeBySimilarity`.
pub fn is_relative_by_similarity(engine: &mut Engine, a: &Node, b: &Node) -> bool {
    judge_similarity(engine, a, b).similarity >= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn judge_tree_equal() {
        let a = parse("1+2").unwrap();
        let b = parse("1+2").unwrap();
        assert_eq!(judge_tree(&a, &b), Some(0));
    }

    #[test]
    fn judge_tree_containment() {
        let a = parse("1+2*3").unwrap();
        let b = parse("2*3").unwrap();
        assert_eq!(judge_tree(&a, &b), Some(1));
        assert_eq!(judge_tree(&b, &a), Some(-1));
    }

    #[test]
    fn judge_tree_eval_equals_reduces() {
        let mut engine = Engine::new();
        let a = parse("\\frac{2}{4}").unwrap();
        let b = parse("\\frac{1}{2}").unwrap();
        assert!(judge_tree_eval_equals(&mut engine, &a, &b));
    }

    #[test]
    fn denominator_reduced_examples() {
        let mut engine = Engine::new();
        let unreduced = parse("\\frac{2}{4}+1").unwrap();
        assert!(!judge_tree_denominator_reduced(&mut engine, &unreduced));

        let reduced = parse("\\frac{1}{2}+1").unwrap();
        assert!(judge_tree_denominator_reduced(&mut engine, &reduced));
    }

    #[test]
    fn compare_trees_equal_is_zero() {
        let mut engine = Engine::new();
        let a = parse("1+2").unwrap();
        let b = parse("1+2").unwrap();
        assert_eq!(compare_trees(&mut engine, &a, &b), Some(0));
    }

    #[test]
    fn compare_trees_antisymmetric() {
        let mut engine = Engine::new();
        let a = parse("1+2*3").unwrap();
        let b = parse("7").unwrap();
        let forward = compare_trees(&mut engine, &a, &b);
        let backward = compare_trees(&mut engine, &b, &a);
        assert!(forward.is_some());
        assert_eq!(forward, backward.map(|v| -v));
    }

    #[test]
    fn compare_trees_relates_wholly_symbolic_distribution() {
        // Neither side has any numeric value at all (a, b, c are symbolic
        // atoms), so both evalTree results are empty; that must count as
        // "values agree", not "cannot determine", letting derivation search
        // find the forward-distribution link between the two sides.
        let mut engine = Engine::new();
        let a = parse("(a+b)*c").unwrap();
        let b = parse("a*c+b*c").unwrap();
        assert_eq!(compare_trees(&mut engine, &a, &b), Some(0));
    }

    #[test]
    fn similarity_of_commuted_sum_is_one() {
        let mut engine = Engine::new();
        let a = parse("a+b").unwrap();
        let b = parse("b+a").unwrap();
        assert!(is_relative_by_similarity(&mut engine, &a, &b));
    }

    #[test]
    fn similarity_of_unrelated_values_is_zero() {
        let mut engine = Engine::new();
        let a = parse("1+2").unwrap();
        let b = parse("5+9").unwrap();
        let s = judge_similarity(&mut engine, &a, &b);
        assert_eq!(s.similarity, 0.0);
    }
}
