/*! Implements the model reporter: the translation of a ground [`Assignment`] back into values
of the symbols of a vocabulary.

[`Assignment`]: crate::search::Assignment
*/
use crate::{
    ground::{Cell, Domain, GroundedProblem},
    search::Assignment,
};
use fodot_syntax::{
    syntax::{Name, SymbolId, SymbolTable, Value},
    transform::Structure,
};
use itertools::Itertools;
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_derive::Serialize;
use std::{collections::HashMap, fmt};

/// Is the interpretation of a symbol in a [`Model`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Interp {
    /// Is the value of a 0-ary symbol.
    Value { value: Value },

    /// Is the table of a function: its arguments and value at every point, in the order of the
    /// cross product of its parameter types.
    Table { entries: Vec<(Vec<Value>, Value)> },
}

impl fmt::Display for Interp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Value { value } => write!(f, "{}", value),
            Self::Table { entries } => {
                let entries = entries.iter().map(|(args, value)| {
                    if args.len() == 1 {
                        format!("{} -> {}", args[0], value)
                    } else {
                        format!("({}) -> {}", args.iter().join(", "), value)
                    }
                });
                write!(f, "{{{}}}", entries.format(", "))
            }
        }
    }
}

/// Is the interpretation of a declared symbol.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Entry {
    pub symbol: Name,
    pub interp: Interp,
}

/// Is a model of a theory: the value of every symbol of its vocabulary, in declaration order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Model {
    entries: Vec<Entry>,
    cells: HashMap<Cell, Value>,
}

impl Model {
    /// Decodes `assignment`, a model of `problem`, into symbol-level values.
    pub fn new(table: &SymbolTable, problem: &GroundedProblem, assignment: &Assignment) -> Self {
        let mut cells = HashMap::new();
        let mut values: HashMap<SymbolId, Vec<(Vec<Value>, Value)>> = HashMap::new();
        for (variable, code) in problem.variables().iter().zip(assignment.values()) {
            let symbol = table.symbol(variable.cell.symbol);
            if let Some(value) = table.decode(symbol.out, *code) {
                values
                    .entry(variable.cell.symbol)
                    .or_default()
                    .push((variable.cell.args.clone(), value.clone()));
                cells.insert(variable.cell.clone(), value);
            }
        }

        let entries = table
            .symbols()
            .filter_map(|(id, symbol)| {
                let mut points = values.remove(&id)?;
                let interp = if symbol.arity() == 0 {
                    let (_, value) = points.pop()?;
                    Interp::Value { value }
                } else {
                    Interp::Table { entries: points }
                };
                Some(Entry {
                    symbol: symbol.name.clone(),
                    interp,
                })
            })
            .collect();
        Self { entries, cells }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the interpretation of the symbol named `name`.
    pub fn get(&self, name: &str) -> Option<&Interp> {
        self.entries
            .iter()
            .find(|e| e.symbol.as_str() == name)
            .map(|e| &e.interp)
    }
}

impl Structure for Model {
    fn value(&self, symbol: SymbolId, args: &[Value]) -> Option<Value> {
        self.cells.get(&Cell::new(symbol, args.to_vec())).cloned()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} := {}.", entry.symbol, entry.interp)?;
        }
        Ok(())
    }
}

// Serializes a value as a JSON boolean, number or string.
struct Json<'a>(&'a Value);

impl<'a> Serialize for Json<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Literal(l) => serializer.serialize_str(l.as_str()),
        }
    }
}

#[derive(Serialize)]
struct Row<'a> {
    args: Vec<Json<'a>>,
    value: Json<'a>,
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            match &entry.interp {
                Interp::Value { value } => map.serialize_entry(entry.symbol.as_str(), &Json(value))?,
                Interp::Table { entries } => {
                    let rows: Vec<Row> = entries
                        .iter()
                        .map(|(args, value)| Row {
                            args: args.iter().map(Json).collect(),
                            value: Json(value),
                        })
                        .collect();
                    map.serialize_entry(entry.symbol.as_str(), &rows)?
                }
            }
        }
        map.end()
    }
}

/// Is the set of values each ground variable takes in some model.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Consequences {
    entries: Vec<(String, Vec<Value>)>,
}

impl Consequences {
    /// Decodes `domains`, one per variable of `problem`.
    pub fn new(table: &SymbolTable, problem: &GroundedProblem, domains: &[Domain]) -> Self {
        let entries = problem
            .variables()
            .iter()
            .zip(domains)
            .map(|(variable, domain)| {
                let out = table.symbol(variable.cell.symbol).out;
                let values = domain
                    .iter()
                    .filter_map(|code| table.decode(out, code))
                    .collect();
                (variable.name.clone(), values)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, Vec<Value>)] {
        &self.entries
    }

    /// Returns the possible values of the variable named `name`, e.g. `a` or `f(red)`.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }
}

impl fmt::Display for Consequences {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, values) in &self.entries {
            writeln!(f, "{} ∈ {{{}}}", name, values.iter().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{search::Search, test_prelude::*};

    #[test]
    fn test_report() {
        let (table, theory) = normalized(&read_source("../theories/colors.idp"));
        let problem = crate::ground::ground_theory(&table, &theory).unwrap();
        let assignment = Search::new(&problem).next_model().unwrap();
        let model = Model::new(&table, &problem, &assignment);
        assert_eq!(
            "color := {n1 -> red, n2 -> green, n3 -> blue, n4 -> red}.\n",
            model.to_string()
        );
        for statement in theory.statements() {
            assert_eq!(Some(true), statement.constraint.evaluate(&model));
        }
    }

    #[test]
    fn test_report_values() {
        let (table, theory) = normalized(&read_source("../theories/example.idp"));
        let problem = crate::ground::ground_theory(&table, &theory).unwrap();
        let assignment = Search::new(&problem).next_model().unwrap();
        let model = Model::new(&table, &problem, &assignment);
        assert_eq!(
            Some(&Interp::Value {
                value: Value::Bool(false)
            }),
            model.get("r")
        );
        assert_eq!(9, model.entries().len());
        assert!(model.to_string().starts_with("p := true.\nq := true.\nr := false.\n"));
        for statement in theory.statements() {
            assert_eq!(Some(true), statement.constraint.evaluate(&model));
        }
    }

    #[test]
    fn test_table_format() {
        let interp = Interp::Table {
            entries: vec![
                (
                    vec![Value::Literal("red".into()), Value::Literal("green".into())],
                    Value::Int(1),
                ),
                (
                    vec![Value::Literal("green".into()), Value::Literal("red".into())],
                    Value::Int(2),
                ),
            ],
        };
        assert_eq!("{(red, green) -> 1, (green, red) -> 2}", interp.to_string());
    }

    #[test]
    fn test_serialize() {
        let (table, theory) = normalized(
            "vocabulary { type C constructed from {r, g}. p. n : Int. h : C -> Bool. } \
             theory { p. n = 3. h(r). ~h(g). }",
        );
        let problem = crate::ground::ground_theory(&table, &theory).unwrap();
        let assignment = Search::new(&problem).next_model().unwrap();
        let model = Model::new(&table, &problem, &assignment);
        assert_eq!(
            r#"{"p":true,"n":3,"h":[{"args":["r"],"value":true},{"args":["g"],"value":false}]}"#,
            serde_json::to_string(&model).unwrap()
        );
    }

    #[test]
    fn test_consequences() {
        let (table, theory) = normalized(&read_source("../theories/arith.idp"));
        let problem = crate::ground::ground_theory(&table, &theory).unwrap();
        let domains: Vec<Domain> = problem.variables().iter().map(|v| v.domain.clone()).collect();
        let consequences = Consequences::new(&table, &problem, &domains);
        assert_eq!(
            Some(&[Value::Int(12)][..]),
            consequences.get("s")
        );
        assert!(consequences.to_string().contains("s ∈ {12}"));
    }
}
