// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

//! Error type shared across the crate.
//!
//! There are three error kinds in practice. The third — evaluation of an
//! atom that is neither a parseable fraction nor decimal — is modeled as
//! `None`/sentinel propagation through the evaluation and derivation
//! pipelines rather than as an error variant here; a symbolic atom is not a
//! malformed formula, just one with no numeric value to fold.

use thiserror::Error;

/// Errors raised by [`crate::parse`], [`crate::node`], and [`crate::rational`].
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum FormulaError {
    /// An ill-formed formula: bad bracket match, unknown token, operator
    /// missing an operand, or trailing operator.
    #[error("malformed formula `{formula}`: {reason}")]
    Parse { formula: String, reason: String },

    /// A non-operator character was used where an operator glyph was
    /// expected — only reachable if external code builds a malformed tree
    /// directly instead of through [`crate::parse::parse`].
    #[error("`{character}` is not an arithmetic operator")]
    IllegalOperator { character: char },
}

pub type Result<T> = std::result::Result<T, FormulaError>;
