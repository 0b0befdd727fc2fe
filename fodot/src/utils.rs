use crate::{
    constants::*,
    terminal::{Style, Stylus},
};
use anyhow::{Context, Error};
use fodot_expand::model::{Consequences, Model};
use fodot_syntax::syntax::KnowledgeBase;
use std::{
    fs,
    io::{stdin, Read},
    path::PathBuf,
};

pub(crate) fn stylus(color: bool) -> Stylus {
    let mut stylus = Stylus::new();
    if color {
        stylus.insert_style(
            STYLE_LOGO,
            Style::new().foreground(59).attribute(term::Attr::Dim),
        );
        stylus.insert_style(
            STYLE_INFO,
            Style::new().foreground(59).attribute(term::Attr::Bold),
        );
        stylus.insert_style(STYLE_THEORY, Style::new().foreground(252));
        stylus.insert_style(
            STYLE_MODEL_HEADER,
            Style::new().foreground(252).attribute(term::Attr::Bold),
        );
        stylus.insert_style(STYLE_MODEL_VALUES, Style::new().foreground(252));
        stylus.insert_style(
            STYLE_ERROR,
            Style::new().foreground(term::color::RED).attribute(term::Attr::Bold),
        );
    }

    stylus
}

/// Reads the knowledge base at `input`, or from standard input when no path is given.
pub(crate) fn read_kb(input: Option<PathBuf>) -> Result<KnowledgeBase, Error> {
    let source = match &input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read the input file `{}`", path.display()))?,
        None => {
            let mut source = String::new();
            stdin()
                .read_to_string(&mut source)
                .context("failed to read the theory from standard input")?;
            source
        }
    };

    source
        .parse()
        .map_err(|e| Error::new(e).context("failed to parse the input theory"))
}

pub(crate) fn print_theory(kb: &KnowledgeBase, stylus: &Stylus) {
    stylus.set(STYLE_INFO);
    println!("Finding models for theory:");

    stylus.set(STYLE_THEORY);
    kb.theory
        .statements()
        .iter()
        .for_each(|s| println!("{}", s));

    if !kb.structure.is_empty() {
        stylus.set(STYLE_INFO);
        println!("with structure:");
        stylus.set(STYLE_THEORY);
        kb.structure
            .interpretations()
            .iter()
            .for_each(|i| println!("{}", i));
    }

    println!();
}

pub(crate) fn print_model(model: &Model, stylus: &Stylus, index: usize) {
    stylus.set(STYLE_MODEL_HEADER);
    println!("Model {}", index);
    println!("==========");

    stylus.set(STYLE_MODEL_VALUES);
    print!("{}", model);

    stylus.set(STYLE_INFO);
    println!("- - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - -");
}

pub(crate) fn print_consequences(consequences: &Consequences, stylus: &Stylus) {
    stylus.set(STYLE_INFO);
    println!("Possible values:");

    stylus.set(STYLE_MODEL_VALUES);
    print!("{}", consequences);
}
