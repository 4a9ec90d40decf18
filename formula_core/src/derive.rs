// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Derivation engine: enumerates trees equivalent to a given tree under
//! commutation, association, distribution (forward and reverse), doubling,
//! and fraction re-expression, memoized per-id in a persistent
//! [`crate::Engine::derive_cache`].

use std::collections::HashSet;
use std::rc::Rc;

use crate::evaluate::derive_frac_float;
use crate::node::{is_negative_form, priority, toggle_polarity, Node};
use crate::Engine;

/// `deriveCommutation`: `a op b -> b op a` for `op in {+, *}`.
pub fn derive_commutation(t: &Node) -> Vec<Node> {
    if !t.is_operator() {
        return Vec::new();
    }

    let op = t.operator_char().unwrap();
    if matches!(op, '+' | '*') {
        vec![Node::operator(op, t.right().clone(), t.left().clone())]
    } else {
        Vec::new()
    }
}

pub(crate) fn rotate_left_child(t: &Node) -> Option<Node> {
    let op_t = t.operator_char().ok()?;
    let child = t.left();
    if !child.is_operator() {
        return None;
    }
    let op_c = child.operator_char().ok()?;
    if priority(op_c).ok()? != priority(op_t).ok()? {
        return None;
    }

    let c0 = child.left().clone();
    let c1 = child.right().clone();
    let r = t.right().clone();

    let demoted_op = if is_negative_form(op_c) {
        toggle_polarity(op_t).ok()?
    } else {
        op_t
    };

    Some(Node::operator(op_c, c0, Node::operator(demoted_op, c1, r)))
}

pub(crate) fn rotate_right_child(t: &Node) -> Option<Node> {
    let op_t = t.operator_char().ok()?;
    let child = t.right();
    if !child.is_operator() {
        return None;
    }
    let op_c = child.operator_char().ok()?;
    if priority(op_c).ok()? != priority(op_t).ok()? {
        return None;
    }

    let c0 = child.left().clone();
    let c1 = child.right().clone();
    let l = t.left().clone();

    let new_root_op = if is_negative_form(op_t) {
        toggle_polarity(op_c).ok()?
    } else {
        op_c
    };

    Some(Node::operator(new_root_op, Node::operator(op_t, l, c0), c1))
}

/// `deriveDoubleSubTree`: `a + b -> a * 2` when `id(a) = id(b)`.
pub fn derive_double_sub_tree(t: &Node) -> Option<Node> {
    if !t.is_operator() || t.operator_char().ok()? != '+' {
        return None;
    }
    if t.left().id == t.right().id {
        Some(Node::operator('*', t.left().clone(), Node::immediate("2")))
    } else {
        None
    }
}

/// `deriveAssociation`: rotates each same-priority child into the root,
/// applying the sign-flip rules, then attempts doubling on each side of
/// the rotated tree and recurses `deriveTree` on the doubled results.
pub fn derive_association(engine: &mut Engine, t: &Node) -> Vec<Node> {
    let mut out = Vec::new();

    if !t.is_operator() {
        return out;
    }

    for rotated in [rotate_left_child(t), rotate_right_child(t)]
        .into_iter()
        .flatten()
    {
        out.extend(expand_with_doubling(engine, &rotated));
        out.push(rotated);
    }

    out
}

fn expand_with_doubling(engine: &mut Engine, t: &Node) -> Vec<Node> {
    let mut out = Vec::new();

    if !t.is_operator() {
        return out;
    }

    let op = t.operator_char().unwrap();

    if let Some(doubled_left) = derive_double_sub_tree(t.left()) {
        let rebuilt = Node::operator(op, doubled_left, t.right().clone());
        out.extend(derive_tree(engine, &rebuilt).iter().cloned());
    }

    if let Some(doubled_right) = derive_double_sub_tree(t.right()) {
        let rebuilt = Node::operator(op, t.left().clone(), doubled_right);
        out.extend(derive_tree(engine, &rebuilt).iter().cloned());
    }

    out
}

/// `deriveDistribution`, forward half (`*`/`/` parent): distributes a
/// `+`/`-` child across the other operand. Division forbids distributing
/// across a `+`/`-` on its right (divisor) side.
pub(crate) fn derive_distribution_forward(t: &Node) -> Vec<Node> {
    let mut out = Vec::new();

    let Ok(op2) = t.operator_char() else {
        return out;
    };
    if !matches!(op2, '*' | '/') {
        return out;
    }

    if let Ok(op1) = t.left().operator_char() {
        if matches!(op1, '+' | '-') {
            let (p, q) = (t.left().left().clone(), t.left().right().clone());
            let w = t.right().clone();
            out.push(Node::operator(
                op1,
                Node::operator(op2, p, w.clone()),
                Node::operator(op2, q, w),
            ));
        }
    }

    if op2 == '*' {
        if let Ok(op1) = t.right().operator_char() {
            if matches!(op1, '+' | '-') {
                let (p, q) = (t.right().left().clone(), t.right().right().clone());
                let w = t.left().clone();
                out.push(Node::operator(
                    op1,
                    Node::operator(op2, w.clone(), p),
                    Node::operator(op2, w, q),
                ));
            }
        }
    }

    out
}

/// `deriveDistribution`, reverse half (`+`/`-` parent): folds
/// `(a op b) +/- (a op c)` back into `a op (b +/- c)` when the shared
/// operand `a` sits at the same child index in both operators.
///
/// For `op = /` only the shared-*denominator* case is valid
/// (`b/a +/- c/a = (b +/- c)/a`); the shared-numerator case
/// (`a/b +/- a/c`) is not a valid equality in general
/// (`a/b + a/c != a/(b+c)`) and is intentionally not folded here — see
/// DESIGN.md for the derivation that ruled it out.
fn derive_distribution_reverse(t: &Node) -> Vec<Node> {
    let mut out = Vec::new();

    let Ok(op1) = t.operator_char() else {
        return out;
    };
    if !matches!(op1, '+' | '-') {
        return out;
    }

    let (a, b) = (t.left(), t.right());
    let (Ok(op_a), Ok(op_b)) = (a.operator_char(), b.operator_char()) else {
        return out;
    };
    if op_a != op_b || !matches!(op_a, '*' | '/') {
        return out;
    }
    let op = op_a;

    if a.left().id == b.left().id {
        // a*b +/- a*c -> a*(b+/-c); a/b and a/c is excluded below.
        if op == '*' {
            out.push(Node::operator(
                op,
                a.left().clone(),
                Node::operator(op1, a.right().clone(), b.right().clone()),
            ));
        }
    }

    if a.right().id == b.right().id {
        // b*a +/- c*a -> (b+/-c)*a ; b/a +/- c/a -> (b+/-c)/a.
        out.push(Node::operator(
            op,
            Node::operator(op1, a.left().clone(), b.left().clone()),
            a.right().clone(),
        ));
    }

    out
}

/// Synthesizes `(a op 1)` for a bare shared operand and retries reverse
/// distribution once; deliberately not recursive beyond this one level.
fn derive_distribution_reverse_with_bare_factor(t: &Node) -> Vec<Node> {
    let mut out = Vec::new();

    let Ok(op1) = t.operator_char() else {
        return out;
    };
    if !matches!(op1, '+' | '-') {
        return out;
    }

    let (a, b) = (t.left(), t.right());

    if a.is_immediate() {
        if let Ok(op) = b.operator_char() {
            if matches!(op, '*' | '/') && a.id == b.left().id {
                let synthetic_a = Node::operator(op, a.clone(), Node::immediate("1"));
                let synthetic_t = Node::operator(op1, synthetic_a, b.clone());
                out.extend(derive_distribution_reverse(&synthetic_t));
            }
        }
    }

    if b.is_immediate() {
        if let Ok(op) = a.operator_char() {
            if matches!(op, '*' | '/') && b.id == a.left().id {
                let synthetic_b = Node::operator(op, b.clone(), Node::immediate("1"));
                let synthetic_t = Node::operator(op1, a.clone(), synthetic_b);
                out.extend(derive_distribution_reverse(&synthetic_t));
            }
        }
    }

    out
}

fn derive_distribution(t: &Node) -> Vec<Node> {
    let mut out = derive_distribution_forward(t);
    out.extend(derive_distribution_reverse(t));
    out.extend(derive_distribution_reverse_with_bare_factor(t));
    out
}

/// Applies `derive_tree` to each child of an operator node, varying one
/// child at a time, and re-inserts each variant into a fresh parent.
fn recurse_children(engine: &mut Engine, result: &[Node]) -> Vec<Node> {
    let mut out = Vec::new();

    for u in result {
        if !u.is_operator() {
            continue;
        }
        let op = u.operator_char().unwrap();

        for variant in derive_tree(engine, u.left()).iter() {
            out.push(Node::operator(op, variant.clone(), u.right().clone()));
        }
        for variant in derive_tree(engine, u.right()).iter() {
            out.push(Node::operator(op, u.left().clone(), variant.clone()));
        }
    }

    out
}

fn dedup_union(existing: &[Node], additions: Vec<Node>) -> Vec<Node> {
    let mut seen: HashSet<String> = existing.iter().map(|n| n.id.clone()).collect();
    let mut out = existing.to_vec();

    for n in additions {
        if seen.insert(n.id.clone()) {
            out.push(n);
        }
    }

    out
}

fn apply_stage(
    result: Vec<Node>,
    rewrite: impl Fn(&Node) -> Vec<Node>,
) -> Vec<Node> {
    let mut additions = Vec::new();
    for n in &result {
        additions.extend(rewrite(n));
    }
    dedup_union(&result, additions)
}

/// `deriveTree(t)`: the top-level fixpoint-style pipeline over the ordered
/// rewrite stages above. IMMEDIATE leaves short-circuit to `deriveFracFloat`,
/// since none of commutation/association/distribution/doubling apply to a
/// leaf.
/// Memoized on `id`, with the seed installed in the cache *before*
/// recursing, breaking the cycle commutation/association would otherwise
/// create (both are self-inverse).
pub fn derive_tree(engine: &mut Engine, t: &Node) -> Rc<Vec<Node>> {
    if let Some(cached) = engine.derive_cache.get(&t.id) {
        return Rc::clone(cached);
    }

    if t.is_immediate() {
        let forms = derive_frac_float(&mut engine.primes, t);
        let forms = Rc::new(forms);
        for n in forms.iter() {
            engine.derive_cache.insert(n.id.clone(), Rc::clone(&forms));
        }
        engine.derive_cache.insert(t.id.clone(), Rc::clone(&forms));
        return forms;
    }

    let mut result = vec![t.clone()];
    engine
        .derive_cache
        .insert(t.id.clone(), Rc::new(result.clone()));

    // a. Commutation
    result = apply_stage(result, derive_commutation);
    // b. Recursive deriveTree on each child
    result = dedup_union(&result, recurse_children(engine, &result));
    // c. Distribution (forward + reverse)
    result = apply_stage(result, derive_distribution);
    // d. Distribution again
    result = apply_stage(result, derive_distribution);
    // e. Child recursion again
    result = dedup_union(&result, recurse_children(engine, &result));
    // f. Association
    {
        let mut additions = Vec::new();
        for n in &result {
            additions.extend(derive_association(engine, n));
        }
        result = dedup_union(&result, additions);
    }
    // g. Doubling
    result = apply_stage(result, |n| derive_double_sub_tree(n).into_iter().collect());
    // h. Child recursion again
    result = dedup_union(&result, recurse_children(engine, &result));
    // i. Commutation
    result = apply_stage(result, derive_commutation);
    // j. Child recursion again
    result = dedup_union(&result, recurse_children(engine, &result));

    let result = Rc::new(result);

    for n in result.iter() {
        engine.derive_cache.insert(n.id.clone(), Rc::clone(&result));
    }
    engine.derive_cache.insert(t.id.clone(), Rc::clone(&result));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn ids(nodes: &[Node]) -> HashSet<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn derive_tree_always_contains_input() {
        let mut engine = Engine::new();
        let t = parse("1+2").unwrap();
        let result = derive_tree(&mut engine, &t);
        assert!(ids(&result).contains(&t.id));
    }

    #[test]
    fn commutation_reaches_swapped_form() {
        let mut engine = Engine::new();
        let t = parse("2+3").unwrap();
        let swapped = parse("3+2").unwrap();
        let result = derive_tree(&mut engine, &t);
        assert!(ids(&result).contains(&swapped.id));
    }

    #[test]
    fn forward_distribution_reaches_expanded_form() {
        let mut engine = Engine::new();
        let t = parse("(a+b)*c").unwrap();
        let expanded = parse("a*c+b*c").unwrap();
        let result = derive_tree(&mut engine, &t);
        assert!(ids(&result).contains(&expanded.id));
    }

    #[test]
    fn doubling_reaches_product_form() {
        let mut engine = Engine::new();
        let t = parse("x+x").unwrap();
        let doubled = parse("x*2").unwrap();
        let result = derive_tree(&mut engine, &t);
        assert!(ids(&result).contains(&doubled.id));
    }

    #[test]
    fn equivalence_class_closure() {
        let mut engine = Engine::new();
        let t = parse("2+3").unwrap();
        let result_a = derive_tree(&mut engine, &t);

        let swapped = parse("3+2").unwrap();
        let result_b = derive_tree(&mut engine, &swapped);

        assert_eq!(ids(&result_a), ids(&result_b));
    }
}
