// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

use rustyline::{
    validate::{ValidationContext, ValidationResult, Validator},
    Result,
};
use rustyline_derive::{Completer, Helper, Highlighter, Hinter};

#[derive(Completer, Helper, Highlighter, Hinter)]
pub struct InputHelper {}

impl Validator for InputHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> Result<ValidationResult> {
        // This implementation distinguishes only between "incomplete"
        // (unexpected end of input, e.g. an unclosed bracket) and "valid"
        // (everything else); actual validation happens in the regular
        // input processing step.
        let input = ctx.input();

        if input.trim().is_empty() || input.ends_with('\n') {
            return Ok(ValidationResult::Valid(None));
        }

        // Only the half of a comparison actively being typed matters for
        // continuation; a finished left half followed by `~` never blocks.
        let active = input.trim_start_matches('?');
        let active = match active.rsplit_once('~') {
            Some((_, right)) => right,
            None => active,
        };

        if formula_core::parse::is_incomplete(active) {
            return Ok(ValidationResult::Incomplete);
        }

        Ok(ValidationResult::Valid(None))
    }
}
