// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021-2022  Philipp Emanuel Weidmann <pew@worldwidemann.com>

use std::collections::HashMap;

use lazy_static::lazy_static;
use termimad::MadSkin;

const HEADER: &str = "\
# Formula comparison REPL

Enter a formula (`2\\frac{1}{3}*3-1`) to see its tree, value, and a sample \
of equivalent rewritings. Separate two formulas with `~` (`a+b ~ b+a`) to \
compare them. Enter `?topic` for help on a specific topic, or `?` for this \
page.
";

const FOOTER: &str = "\
Press `Ctrl+D` to quit, `Ctrl+C` to cancel the current line.
";

fn topics() -> HashMap<&'static str, &'static str> {
    let mut m = HashMap::new();

    m.insert(
        "evaluate",
        "\
**evaluate** - a lone formula (`1+2*3`) prints its parsed tree, its \
content-addressed id, and every value from `evalTree` (the original \
lexeme folded with every equivalent fraction/decimal re-expression).
",
    );

    m.insert(
        "compare",
        "\
**compare** - `a ~ b` runs `compareTrees(a, b)`: `0` if equal, a positive \
count if `a` reaches `b` by that many reductions, negative for the \
reverse, or *unrelated* if no bounded derivation search finds a path. \
Above four operators on either side this degrades to a pure evaluation \
comparison.
",
    );

    m.insert(
        "similarity",
        "\
**similarity** - a faster, fuzzier companion to *compare*: a score in \
`[0, 1]` built from commutation, association, and distribution rewrites, \
without the bounded step-count search. `1.0` means *compare* would also \
find a relation.
",
    );

    m.insert(
        "fractions",
        "\
**fractions** - write a mixed fraction as `2\\frac{1}{3}` (two and a \
third). Decimals (`1.5`) and bare integers (`7`) are also literals; \
anything else (`x`, `n`) is a symbolic atom that blocks evaluation but \
still parses and compares structurally.
",
    );

    m
}

lazy_static! {
    static ref TOPICS: HashMap<&'static str, &'static str> = topics();
}

pub fn show_help(topic: Option<&str>) {
    let skin = MadSkin::default();

    let text = match topic {
        None => {
            let mut text = String::from(HEADER);
            text.push_str("\n---\n\n");
            let mut names: Vec<&&str> = TOPICS.keys().collect();
            names.sort();
            for name in names {
                text.push_str(TOPICS[name]);
                text.push_str("\n---\n\n");
            }
            text.push_str(FOOTER);
            text
        }
        Some(name) => match TOPICS.get(name) {
            Some(body) => body.to_string(),
            None => format!(
                "No help topic `{}`. Known topics: {}.\n",
                name,
                {
                    let mut names: Vec<&&str> = TOPICS.keys().collect();
                    names.sort();
                    names
                        .iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            ),
        },
    };

    skin.print_text(&text);
}
