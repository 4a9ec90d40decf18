// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2021  Philipp Emanuel Weidmann <pew@worldwidemann.com>

mod command;
mod help;
mod input;

use std::fs;

use ansi_term::Style;
use ariadne::{Color, Label, Report, ReportKind, Source};
use directories::ProjectDirs;
use formula_core::{Engine, FormulaError, Node};
use rustyline::{error::ReadlineError, Editor};

use crate::command::Command;
use crate::input::InputHelper;

fn report_parse_error(formula: &str, reason: &str) {
    let len = formula.chars().count().max(1);

    Report::build(ReportKind::Error, (), 0)
        .with_message("malformed formula")
        .with_label(
            Label::new(0..len)
                .with_message(reason)
                .with_color(Color::Red),
        )
        .finish()
        .print(Source::from(formula))
        .ok();
}

fn show_tree(engine: &mut Engine, tree: &Node) {
    println!("{}  {}", Style::new().bold().paint("tree:"), tree);
    println!("{}    {}", Style::new().bold().paint("id:"), tree.id);

    let values = engine.eval_tree(tree);
    let rendered: Vec<String> = values.iter().map(|n| n.character.clone()).collect();
    println!(
        "{} {}",
        Style::new().bold().paint("value:"),
        rendered.join(" = ")
    );

    let forms = engine.derive_tree(tree);
    let sample: Vec<String> = forms
        .iter()
        .filter(|n| n.id != tree.id)
        .take(5)
        .map(|n| n.to_string())
        .collect();
    if !sample.is_empty() {
        println!(
            "{} {}",
            Style::new().bold().paint("also equal to:"),
            sample.join(", ")
        );
    }
}

fn show_compare(engine: &mut Engine, a: &str, b: &str) {
    let ta = match engine.generate_tree(a) {
        Ok(t) => t,
        Err(FormulaError::Parse { formula, reason }) => return report_parse_error(&formula, &reason),
        Err(e) => return println!("Error: {}", e),
    };
    let tb = match engine.generate_tree(b) {
        Ok(t) => t,
        Err(FormulaError::Parse { formula, reason }) => return report_parse_error(&formula, &reason),
        Err(e) => return println!("Error: {}", e),
    };

    match engine.compare_trees(&ta, &tb) {
        Some(0) => println!("{}", Style::new().bold().paint("equal")),
        Some(n) if n > 0 => println!(
            "{} {} reductions from `{}` to `{}`",
            Style::new().bold().paint("related:"),
            n,
            a,
            b
        ),
        Some(n) => println!(
            "{} {} reductions from `{}` to `{}`",
            Style::new().bold().paint("related:"),
            -n,
            b,
            a
        ),
        None => println!("{}", Style::new().bold().paint("unrelated")),
    }

    let similarity = engine.judge_similarity(&ta, &tb).similarity;
    println!(
        "{} {:.2}",
        Style::new().bold().paint("similarity:"),
        similarity
    );
}

fn main() {
    let history_path = ProjectDirs::from("com.worldwidemann", "", "FormulaCli")
        .expect("unable to locate data directory")
        .data_dir()
        .join("history");

    let mut editor = Editor::new();
    editor.set_helper(Some(InputHelper {}));
    editor.load_history(&history_path).ok();

    println!("Formula comparison REPL {}", env!("CARGO_PKG_VERSION"));
    println!(
        "Enter {} for help, press {} to quit, {} to cancel the current line",
        Style::new().bold().paint("?"),
        Style::new().bold().paint("Ctrl+D"),
        Style::new().bold().paint("Ctrl+C"),
    );

    let mut engine = Engine::new();

    loop {
        println!();

        match editor.readline("in: ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line);

                match line.parse::<Command>() {
                    Ok(Command::Evaluate(formula)) => match engine.generate_tree(&formula) {
                        Ok(tree) => show_tree(&mut engine, &tree),
                        Err(FormulaError::Parse { formula, reason }) => {
                            report_parse_error(&formula, &reason)
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    Ok(Command::Compare(a, b)) => show_compare(&mut engine, &a, &b),
                    Ok(Command::ShowHelp(topic)) => help::show_help(topic.as_deref()),
                    Err(_) => println!("Error: could not parse input"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                break;
            }
            Err(error) => {
                println!("Error: {:#?}", error);
                break;
            }
        }
    }

    fs::create_dir_all(
        history_path
            .parent()
            .expect("unable to determine parent directory of history file"),
    )
    .expect("unable to create data directory");

    editor
        .save_history(&history_path)
        .expect("unable to save input history");
}
