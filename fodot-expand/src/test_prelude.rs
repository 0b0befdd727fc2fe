use crate::ground::{ground_theory, GroundedProblem};
use fodot_syntax::{
    syntax::{KnowledgeBase, SymbolTable},
    transform::{normalize, NormalTheory},
};
use std::{fs::File, io::Read};

pub fn read_source(filename: &str) -> String {
    let mut f = File::open(filename).expect("file not found");

    let mut contents = String::new();
    f.read_to_string(&mut contents)
        .expect("something went wrong reading the file");
    contents
}

pub fn parse_kb(source: &str) -> KnowledgeBase {
    source.parse().unwrap()
}

pub fn read_kb(filename: &str) -> KnowledgeBase {
    parse_kb(&read_source(filename))
}

pub fn normalized(source: &str) -> (SymbolTable, NormalTheory) {
    let kb = parse_kb(source);
    let table = SymbolTable::new(&kb.vocabulary).unwrap();
    let theory = normalize(&table, &kb.theory).unwrap();
    (table, theory)
}

pub fn grounded(source: &str) -> GroundedProblem {
    let (table, theory) = normalized(source);
    ground_theory(&table, &theory).unwrap()
}
