// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021-2022  Philipp Emanuel Weidmann <pew@worldwidemann.com>

use std::str::FromStr;

use chumsky::prelude::*;

/// A single REPL line: either a lone formula to evaluate and derive, a pair
/// of formulas separated by `~` to compare, or a help request.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Command {
    Evaluate(String),
    Compare(String, String),
    ShowHelp(Option<String>),
}

fn rest() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    filter(|_: &char| true).repeated().collect::<String>()
}

fn parser() -> impl Parser<char, Command, Error = Simple<char>> {
    let help = just('?').ignore_then(rest()).map(|topic: String| {
        let topic = topic.trim();
        Command::ShowHelp(if topic.is_empty() {
            None
        } else {
            Some(topic.to_owned())
        })
    });

    let compare = filter(|c: &char| *c != '~')
        .repeated()
        .collect::<String>()
        .then_ignore(just('~'))
        .then(rest())
        .map(|(a, b): (String, String)| Command::Compare(a.trim().to_owned(), b.trim().to_owned()));

    let evaluate = rest()
        .try_map(|s: String, span| {
            if s.trim().is_empty() {
                Err(Simple::custom(span, "empty input"))
            } else {
                Ok(Command::Evaluate(s.trim().to_owned()))
            }
        });

    help.or(compare).or(evaluate)
}

impl FromStr for Command {
    type Err = Vec<Simple<char>>;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        parser().then_ignore(end()).parse(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn t(string: &str, command: Command) {
        assert_eq!(string.parse(), Ok(command));
    }

    #[test]
    fn parse_evaluate() {
        t("1+2", Command::Evaluate("1+2".to_owned()));
        t("  1 + 2  ", Command::Evaluate("1 + 2".to_owned()));
    }

    #[test]
    fn parse_compare() {
        t(
            "1+2 ~ 2+1",
            Command::Compare("1+2".to_owned(), "2+1".to_owned()),
        );
    }

    #[test]
    fn parse_help() {
        t("?", Command::ShowHelp(None));
        t("?compare", Command::ShowHelp(Some("compare".to_owned())));
        t("? compare", Command::ShowHelp(Some("compare".to_owned())));
    }
}
