// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Equivalence and derivability checking for infix arithmetic formulas.
//!
//! An [`Engine`] owns the three process-local caches (a growable prime
//! list, an evaluation-tree cache, and a derivation cache) and exposes the
//! external generate/compare/derive operations, plus the comparator
//! primitives they are built from.

use std::collections::HashMap;
use std::rc::Rc;

pub mod compare;
pub mod derive;
pub mod error;
pub mod evaluate;
pub mod node;
pub mod parse;
pub mod rational;

pub use compare::Similarity;
pub use error::{FormulaError, Result};
pub use node::Node;
pub use rational::Rational;

/// Owner of all shared mutable state: the prime list and the two memoization
/// caches. Not `Sync`; callers sharing an engine across threads must guard
/// it with a single lock.
#[derive(Default)]
pub struct Engine {
    pub primes: rational::PrimeCache,
    eval_cache: HashMap<String, Vec<Node>>,
    pub(crate) derive_cache: HashMap<String, Rc<Vec<Node>>>,
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            primes: rational::PrimeCache::new(),
            eval_cache: HashMap::new(),
            derive_cache: HashMap::new(),
        }
    }

    /// `evalTree(t)`, memoized on `t.id` in `evalTreeCache`.
    pub fn eval_tree(&mut self, t: &Node) -> Vec<Node> {
        if let Some(cached) = self.eval_cache.get(&t.id) {
            return cached.clone();
        }

        let result = evaluate::eval_tree(&mut self.primes, t);
        self.eval_cache.insert(t.id.clone(), result.clone());
        result
    }

    /// `deriveTree(t)`, memoized on `t.id` in `deriveCache`.
    pub fn derive_tree(&mut self, t: &Node) -> Rc<Vec<Node>> {
        derive::derive_tree(self, t)
    }

    /// `generateTree(s)`: parses `s` into a tree, or a formula error.
    pub fn generate_tree(&self, s: &str) -> Result<Node> {
        parse::parse(s)
    }

    /// `generateTrees(s)`: parses `s`, then enumerates its derivation
    /// (every tree `derive_tree` reaches).
    pub fn generate_trees(&mut self, s: &str) -> Result<Rc<Vec<Node>>> {
        let tree = parse::parse(s)?;
        Ok(self.derive_tree(&tree))
    }

    /// `compareFormulas(a, b)`: parses both texts, then `compareTrees`.
    pub fn compare_formulas(&mut self, a: &str, b: &str) -> Result<Option<i32>> {
        let ta = parse::parse(a)?;
        let tb = parse::parse(b)?;
        Ok(self.compare_trees(&ta, &tb))
    }

    /// `compareTrees(a, b)`.
    pub fn compare_trees(&mut self, a: &Node, b: &Node) -> Option<i32> {
        compare::compare_trees(self, a, b)
    }

    /// `judgeTree(a, b)`.
    pub fn judge_tree(&self, a: &Node, b: &Node) -> Option<i32> {
        compare::judge_tree(a, b)
    }

    /// `judgeTreeEvalEquals(a, b)`.
    pub fn judge_tree_eval_equals(&mut self, a: &Node, b: &Node) -> bool {
        compare::judge_tree_eval_equals(self, a, b)
    }

    /// `judgeTreeDenominatorReduced(t)`.
    pub fn judge_tree_denominator_reduced(&mut self, t: &Node) -> bool {
        compare::judge_tree_denominator_reduced(self, t)
    }

    /// `judgeSimilarity(target, template)`.
    pub fn judge_similarity(&mut self, target: &Node, template: &Node) -> Similarity {
        compare::judge_similarity(self, target, template)
    }

    /// `isRelativeBySimilarity(a, b)`.
    pub fn is_relative_by_similarity(&mut self, a: &Node, b: &Node) -> bool {
        compare::is_relative_by_similarity(self, a, b)
    }

    /// `isRelativeByCompareTrees(a, b)`.
    pub fn is_relative_by_compare_trees(&mut self, a: &Node, b: &Node) -> bool {
        compare::is_relative_by_compare_trees(self, a, b)
    }

    /// `isRelativeByEval(a, b)`.
    pub fn is_relative_by_eval(&mut self, a: &Node, b: &Node) -> bool {
        compare::is_relative_by_eval(self, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_tree_parses() {
        let engine = Engine::new();
        let t = engine.generate_tree("1+2").unwrap();
        assert_eq!(t.character, "+");
    }

    #[test]
    fn generate_tree_propagates_parse_error() {
        let engine = Engine::new();
        assert!(engine.generate_tree("1+").is_err());
    }

    #[test]
    fn generate_trees_includes_commuted_form() {
        let mut engine = Engine::new();
        let forms = engine.generate_trees("1+2").unwrap();
        assert!(forms.iter().any(|n| n.character == "+" && n.left().character == "2"));
    }

    #[test]
    fn compare_formulas_equal_texts_is_zero() {
        let mut engine = Engine::new();
        assert_eq!(engine.compare_formulas("1+2", "2+1").unwrap(), Some(0));
    }

    #[test]
    fn compare_formulas_propagates_parse_error() {
        let mut engine = Engine::new();
        assert!(engine.compare_formulas("1+2", "(").is_err());
    }

    #[test]
    fn engine_is_reusable_across_calls() {
        let mut engine = Engine::new();
        let a = engine.generate_tree("1+2*3").unwrap();
        let b = engine.generate_tree("2*3+1").unwrap();
        assert!(engine.is_relative_by_eval(&a, &b));
        assert!(engine.is_relative_by_compare_trees(&a, &b));
    }
}
