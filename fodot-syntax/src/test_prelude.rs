use crate::{
    syntax::{self, KnowledgeBase, SymbolTable},
    transform::{self, normalize, NormalTheory},
};
use std::{fs::File, io::Read};

pub fn read_kb(filename: &str) -> KnowledgeBase {
    let mut f = File::open(filename).expect("file not found");

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect("something went wrong reading the file");

    contents.parse().unwrap()
}

pub fn parse_kb(source: &str) -> KnowledgeBase {
    source.parse().unwrap()
}

pub fn table_of(source: &str) -> SymbolTable {
    SymbolTable::new(&parse_kb(source).vocabulary).unwrap()
}

pub fn resolve_error(source: &str) -> syntax::Error {
    SymbolTable::new(&parse_kb(source).vocabulary).unwrap_err()
}

pub fn normalized(source: &str) -> (SymbolTable, NormalTheory) {
    let kb = parse_kb(source);
    let table = SymbolTable::new(&kb.vocabulary).unwrap();
    let theory = normalize(&table, &kb.theory).unwrap();
    (table, theory)
}

pub fn normalize_error(source: &str) -> transform::Error {
    let kb = parse_kb(source);
    let table = SymbolTable::new(&kb.vocabulary).unwrap();
    normalize(&table, &kb.theory).unwrap_err()
}
