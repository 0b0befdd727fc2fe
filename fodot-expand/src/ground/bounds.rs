/*! Infers finite intervals for integer-valued ground cells by interval propagation over the
top-level conjuncts of a normalized theory.

Every comparison `l op r` between integer terms is read as `(l - r) op 0`. The difference is
a linear combination `c + Σ kᵢ·tᵢ`, and each `tᵢ` is narrowed to the values that keep the
combination within the bound that `op` imposes, given the current intervals of the other
terms. A `tᵢ` that is a product is narrowed factor by factor, dividing by the interval of the
other factors when it excludes zero. Narrowing is repeated until nothing changes or the
round cap is reached.
*/
use super::problem::Cell;
use crate::Error;
use fodot_syntax::{
    syntax::{CmpOp, SymbolTable, TypeId, TypeValues, Value},
    transform::{Constraint, NormalTheory, Term},
};
use std::{cmp::Ordering, collections::HashMap, fmt};

/// Is an integer extended with infinities.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Ext {
    NegInf,
    Fin(i64),
    PosInf,
}

impl Ext {
    // Rounds an exact bound outwards: up for an upper bound, down for a lower bound.
    fn round(value: i128, up: bool) -> Self {
        if value > i64::MAX as i128 {
            if up {
                Self::PosInf
            } else {
                Self::Fin(i64::MAX)
            }
        } else if value < i64::MIN as i128 {
            if up {
                Self::Fin(i64::MIN)
            } else {
                Self::NegInf
            }
        } else {
            Self::Fin(value as i64)
        }
    }

    fn add(self, other: Self, up: bool) -> Self {
        match (self, other) {
            (Self::Fin(a), Self::Fin(b)) => Self::round(a as i128 + b as i128, up),
            (Self::PosInf, _) | (_, Self::PosInf) if up => Self::PosInf,
            (Self::NegInf, _) | (_, Self::NegInf) => Self::NegInf,
            _ => Self::PosInf,
        }
    }

    fn neg(self, up: bool) -> Self {
        match self {
            Self::NegInf => Self::PosInf,
            Self::Fin(a) => Self::round(-(a as i128), up),
            Self::PosInf => Self::NegInf,
        }
    }

    fn signum(self) -> i64 {
        match self {
            Self::NegInf => -1,
            Self::Fin(a) => a.signum(),
            Self::PosInf => 1,
        }
    }

    fn mul(self, other: Self, up: bool) -> Self {
        match (self, other) {
            (Self::Fin(a), Self::Fin(b)) => Self::round(a as i128 * b as i128, up),
            _ => match self.signum() * other.signum() {
                0 => Self::Fin(0),
                s if s > 0 => Self::PosInf,
                _ => Self::NegInf,
            },
        }
    }
}

impl fmt::Display for Ext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NegInf => write!(f, "-∞"),
            Self::Fin(a) => write!(f, "{}", a),
            Self::PosInf => write!(f, "∞"),
        }
    }
}

// Is an exact quotient used to bound interval division.
#[derive(Clone, Copy, Debug)]
enum Quotient {
    NegInf,
    Frac(i128, i128),
    PosInf,
}

impl Quotient {
    fn of(x: Ext, d: Ext) -> Self {
        match (x, d) {
            (Ext::Fin(a), Ext::Fin(b)) => {
                let (a, b) = (a as i128, b as i128);
                if b < 0 {
                    Self::Frac(-a, -b)
                } else {
                    Self::Frac(a, b)
                }
            }
            (Ext::Fin(_), _) => Self::Frac(0, 1),
            _ => {
                if x.signum() * d.signum() > 0 {
                    Self::PosInf
                } else {
                    Self::NegInf
                }
            }
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Frac(a, b), Self::Frac(c, d)) => (a * d).cmp(&(c * b)),
            (Self::NegInf, Self::NegInf) | (Self::PosInf, Self::PosInf) => Ordering::Equal,
            (Self::NegInf, _) | (_, Self::PosInf) => Ordering::Less,
            _ => Ordering::Greater,
        }
    }

    fn ceil(self) -> Ext {
        match self {
            Self::NegInf => Ext::NegInf,
            Self::PosInf => Ext::PosInf,
            Self::Frac(a, b) => {
                let q = a.div_euclid(b) + if a.rem_euclid(b) != 0 { 1 } else { 0 };
                clamp(q)
            }
        }
    }

    fn floor(self) -> Ext {
        match self {
            Self::NegInf => Ext::NegInf,
            Self::PosInf => Ext::PosInf,
            Self::Frac(a, b) => clamp(a.div_euclid(b)),
        }
    }
}

fn clamp(value: i128) -> Ext {
    if value > i64::MAX as i128 {
        Ext::PosInf
    } else if value < i64::MIN as i128 {
        Ext::NegInf
    } else {
        Ext::Fin(value as i64)
    }
}

/// Is a closed interval of extended integers; empty if `lo > hi`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Interval {
    pub lo: Ext,
    pub hi: Ext,
}

impl Interval {
    pub fn new(lo: Ext, hi: Ext) -> Self {
        Self { lo, hi }
    }

    pub fn full() -> Self {
        Self::new(Ext::NegInf, Ext::PosInf)
    }

    pub fn point(value: i64) -> Self {
        Self::new(Ext::Fin(value), Ext::Fin(value))
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    /// Returns the finite bounds of the receiver, if any.
    pub fn finite(&self) -> Option<(i64, i64)> {
        match (self.lo, self.hi) {
            (Ext::Fin(lo), Ext::Fin(hi)) => Some((lo, hi)),
            _ => None,
        }
    }

    fn contains_zero(&self) -> bool {
        self.lo <= Ext::Fin(0) && Ext::Fin(0) <= self.hi
    }

    fn intersect(&self, other: &Self) -> Self {
        Self::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    fn add(&self, other: &Self) -> Self {
        Self::new(self.lo.add(other.lo, false), self.hi.add(other.hi, true))
    }

    fn neg(&self) -> Self {
        Self::new(self.hi.neg(false), self.lo.neg(true))
    }

    fn mul(&self, other: &Self) -> Self {
        let corners = |up| {
            [
                self.lo.mul(other.lo, up),
                self.lo.mul(other.hi, up),
                self.hi.mul(other.lo, up),
                self.hi.mul(other.hi, up),
            ]
        };
        Self::new(
            corners(false).iter().copied().min().unwrap_or(Ext::NegInf),
            corners(true).iter().copied().max().unwrap_or(Ext::PosInf),
        )
    }

    fn scale(&self, k: i64) -> Self {
        self.mul(&Self::point(k))
    }

    /// Returns the integers `x` such that `x·d` may lie in the receiver for some `d` in
    /// `divisor`. Returns `None` if the divisor contains zero or the receiver is unbounded on
    /// both sides.
    fn div(&self, divisor: &Self) -> Option<Self> {
        if divisor.contains_zero() || (self.lo == Ext::NegInf && self.hi == Ext::PosInf) {
            return None;
        }
        let corners = [
            Quotient::of(self.lo, divisor.lo),
            Quotient::of(self.lo, divisor.hi),
            Quotient::of(self.hi, divisor.lo),
            Quotient::of(self.hi, divisor.hi),
        ];
        let min = corners.iter().min_by(|a, b| a.cmp(b))?;
        let max = corners.iter().max_by(|a, b| a.cmp(b))?;
        Some(Self::new(min.ceil(), max.floor()))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Holds the intervals inferred for the integer-valued cells of a theory.
pub struct Bounds<'t> {
    table: &'t SymbolTable,
    intervals: HashMap<Cell, Interval>,
}

impl<'t> Bounds<'t> {
    /// Infers the intervals of the integer-valued cells that `theory` refers to with constant
    /// arguments, running at most `rounds` rounds of narrowing.
    pub fn infer(table: &'t SymbolTable, theory: &NormalTheory, rounds: usize) -> Result<Self, Error> {
        let mut bounds = Self {
            table,
            intervals: HashMap::new(),
        };
        let conjuncts: Vec<&Constraint> = theory.conjuncts().into_iter().map(|(c, _)| c).collect();
        for _ in 0..rounds {
            let mut changed = false;
            for conjunct in &conjuncts {
                if let Constraint::Compare { op, left, right } = conjunct {
                    changed |= bounds.narrow_comparison(*op, left, right)?;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(bounds)
    }

    /// Returns the interval of `cell`, as implied by its type and the theory.
    pub fn interval(&self, cell: &Cell) -> Interval {
        self.intervals
            .get(cell)
            .copied()
            .unwrap_or_else(|| self.declared(self.table.symbol(cell.symbol).out))
    }

    fn declared(&self, ty: TypeId) -> Interval {
        match &self.table.type_def(ty).values {
            TypeValues::Ints(values) => match (values.first(), values.last()) {
                (Some(lo), Some(hi)) => Interval::new(Ext::Fin(*lo), Ext::Fin(*hi)),
                _ => Interval::full(),
            },
            TypeValues::Range { lo, hi } => Interval::new(Ext::Fin(*lo), Ext::Fin(*hi)),
            TypeValues::Bool => Interval::new(Ext::Fin(0), Ext::Fin(1)),
            _ => Interval::full(),
        }
    }

    // Returns the cell that `term` denotes if it is an integer-valued leaf.
    fn cell(&self, term: &Term) -> Option<Cell> {
        let cell = match term {
            Term::Symbol { symbol } => Cell::new(*symbol, Vec::new()),
            Term::App { function, args } => Cell::new(
                *function,
                args.iter()
                    .map(|a| a.as_const().cloned())
                    .collect::<Option<Vec<_>>>()?,
            ),
            _ => return None,
        };
        let ty = self.table.symbol(cell.symbol).out;
        if self.table.type_def(ty).is_numeric() {
            Some(cell)
        } else {
            None
        }
    }

    // Returns the interval of an integer term, or `None` if `term` is not integer-valued.
    fn eval(&self, term: &Term) -> Option<Interval> {
        match term {
            Term::Const { value } => match value {
                Value::Int(v) => Some(Interval::point(*v)),
                _ => None,
            },
            Term::Symbol { .. } => self.cell(term).map(|c| self.interval(&c)),
            Term::App { function, .. } => match self.cell(term) {
                Some(cell) => Some(self.interval(&cell)),
                None => {
                    let ty = self.table.symbol(*function).out;
                    if self.table.type_def(ty).is_numeric() {
                        Some(self.declared(ty))
                    } else {
                        None
                    }
                }
            },
            Term::Sum { constant, terms } => {
                let mut result = Interval::point(*constant);
                for (k, t) in terms {
                    result = result.add(&self.eval(t)?.scale(*k));
                }
                Some(result)
            }
            Term::Product { factors } => {
                let mut result = Interval::point(1);
                for t in factors {
                    result = result.mul(&self.eval(t)?);
                }
                Some(result)
            }
            Term::Count { conditions } => Some(Interval::new(
                Ext::Fin(0),
                Ext::Fin(conditions.len() as i64),
            )),
        }
    }

    fn narrow_comparison(&mut self, op: CmpOp, left: &Term, right: &Term) -> Result<bool, Error> {
        let target = match op {
            CmpOp::Eq => Interval::point(0),
            CmpOp::Le => Interval::new(Ext::NegInf, Ext::Fin(0)),
            CmpOp::Lt => Interval::new(Ext::NegInf, Ext::Fin(-1)),
            CmpOp::Ge => Interval::new(Ext::Fin(0), Ext::PosInf),
            CmpOp::Gt => Interval::new(Ext::Fin(1), Ext::PosInf),
            CmpOp::Ne => return Ok(false),
        };
        if self.eval(left).is_none() || self.eval(right).is_none() {
            return Ok(false);
        }
        let (constant, terms) = match left.clone().sub(right.clone()) {
            Term::Sum { constant, terms } => (constant, terms),
            Term::Const { .. } => return Ok(false),
            term => (0, vec![(1, term)]),
        };

        let mut changed = false;
        for i in 0..terms.len() {
            let mut rest = Interval::point(constant);
            for (j, (k, t)) in terms.iter().enumerate() {
                if i != j {
                    match self.eval(t) {
                        Some(interval) => rest = rest.add(&interval.scale(*k)),
                        None => return Ok(changed),
                    }
                }
            }
            let (k, t) = &terms[i];
            if let Some(allowed) = target.add(&rest.neg()).div(&Interval::point(*k)) {
                changed |= self.narrow(t, allowed)?;
            }
        }
        Ok(changed)
    }

    // Narrows `term` to `allowed`.
    fn narrow(&mut self, term: &Term, allowed: Interval) -> Result<bool, Error> {
        if let Some(cell) = self.cell(term) {
            let current = self.interval(&cell);
            let narrowed = current.intersect(&allowed);
            if narrowed == current {
                return Ok(false);
            }
            if narrowed.is_empty() {
                return Err(Error::EmptyDomain {
                    symbol: self.name(&cell),
                });
            }
            self.intervals.insert(cell, narrowed);
            return Ok(true);
        }
        let mut changed = false;
        if let Term::Product { factors } = term {
            for i in 0..factors.len() {
                let mut others = Interval::point(1);
                for (j, t) in factors.iter().enumerate() {
                    if i != j {
                        match self.eval(t) {
                            Some(interval) => others = others.mul(&interval),
                            None => return Ok(changed),
                        }
                    }
                }
                if let Some(narrowed) = allowed.div(&others) {
                    changed |= self.narrow(&factors[i], narrowed)?;
                }
            }
        }
        Ok(changed)
    }

    /// Returns the display name of `cell`.
    pub fn name(&self, cell: &Cell) -> String {
        cell_name(self.table, cell)
    }
}

/// Returns the display name of `cell`, e.g. `a` or `f(red, green)`.
pub fn cell_name(table: &SymbolTable, cell: &Cell) -> String {
    let name = &table.symbol(cell.symbol).name;
    if cell.args.is_empty() {
        name.to_string()
    } else {
        let args: Vec<String> = cell.args.iter().map(|a| a.to_string()).collect();
        format!("{}({})", name, args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    fn inferred(source: &str) -> Vec<String> {
        let (table, theory) = normalized(source);
        let bounds = Bounds::infer(&table, &theory, 64).unwrap();
        table
            .symbols()
            .filter(|(_, s)| s.arity() == 0)
            .map(|(id, s)| format!("{}: {}", s.name, bounds.interval(&Cell::new(id, vec![]))))
            .collect()
    }

    #[test]
    fn test_interval() {
        let i = Interval::new(Ext::Fin(8), Ext::Fin(12));
        let d = Interval::new(Ext::Fin(2), Ext::PosInf);
        assert_eq!(Some(Interval::new(Ext::Fin(0), Ext::Fin(6))), i.div(&d));
        assert_eq!(None, i.div(&Interval::new(Ext::Fin(-1), Ext::Fin(1))));
        assert_eq!(
            Some(Interval::new(Ext::Fin(-2), Ext::Fin(-1))),
            Interval::new(Ext::Fin(3), Ext::Fin(7)).div(&Interval::point(-3))
        );
        assert_eq!(
            Interval::new(Ext::NegInf, Ext::Fin(6)),
            Interval::new(Ext::NegInf, Ext::Fin(2)).mul(&Interval::point(3))
        );
        assert_eq!(
            Interval::new(Ext::Fin(-12), Ext::Fin(8)),
            Interval::new(Ext::Fin(-3), Ext::Fin(2)).mul(&Interval::new(Ext::Fin(1), Ext::Fin(4)))
        );
    }

    #[test]
    fn test_interval_overflow() {
        assert_eq!(
            Interval::new(Ext::Fin(i64::MAX), Ext::PosInf),
            Interval::point(i64::MAX).add(&Interval::point(1))
        );
        assert_eq!(
            Interval::new(Ext::NegInf, Ext::Fin(i64::MIN)),
            Interval::point(i64::MIN).add(&Interval::point(-1))
        );
        assert_eq!(
            Interval::new(Ext::Fin(i64::MAX), Ext::PosInf),
            Interval::point(1 << 40).mul(&Interval::point(1 << 40))
        );
        assert_eq!(
            Interval::new(Ext::Fin(i64::MAX), Ext::PosInf),
            Interval::point(i64::MIN).neg()
        );
        assert_eq!(
            vec!["x: [1, 1]"],
            inferred(
                "vocabulary { x : Int. } \
                 theory { x >= 0. x =< 1. x + 9223372036854775807 = 9223372036854775807 + 1. }"
            )
        );
    }

    #[test]
    fn test_linear_bounds() {
        assert_eq!(
            vec!["a: [1, 5]", "b: [-∞, ∞]"],
            inferred("vocabulary { a : Int. b : Int. } theory { a > 0. a < 6. }")
        );
        assert_eq!(
            vec!["x: [0, 3]", "y: [3, 6]"],
            inferred("vocabulary { x : Int. y : Int. } theory { x >= 0. y = x + 3. y =< 6. }")
        );
        assert_eq!(
            vec!["x: [3, 5]"],
            inferred("vocabulary { x : Int. } theory { 2 * x >= 5. 3 * x < 17. }")
        );
    }

    #[test]
    fn test_product_bounds() {
        let (table, theory) = normalized(&read_source("../theories/example.idp"));
        let bounds = Bounds::infer(&table, &theory, 64).unwrap();
        let interval = |name: &str| {
            bounds
                .interval(&Cell::new(table.symbol_id(name).unwrap(), vec![]))
                .to_string()
        };
        assert_eq!("[1, 5]", interval("a"));
        assert_eq!("[2, 6]", interval("b"));
        assert_eq!("[2, 6]", interval("c"));
    }

    #[test]
    fn test_range_types() {
        assert_eq!(
            vec!["d: [3, 9]"],
            inferred("vocabulary { type Digit = {0..9}. d : Digit. } theory { d > 2. }")
        );
        assert_eq!(
            vec!["t: [0, 9223372036854775807]"],
            inferred("vocabulary { type T = {0..9223372036854775807}. t : T. } theory { }")
        );
    }

    #[test]
    fn test_cells() {
        let (table, theory) = normalized(
            "vocabulary { type C constructed from {r, g}. f : C -> Int. } \
             theory { !x in C: f(x) > 0. f(r) + f(g) = 4. }",
        );
        let bounds = Bounds::infer(&table, &theory, 64).unwrap();
        let f = table.symbol_id("f").unwrap();
        assert_eq!(
            "[1, 3]",
            bounds
                .interval(&Cell::new(f, vec![Value::Literal("r".into())]))
                .to_string()
        );
    }

    #[test]
    fn test_empty() {
        let (table, theory) = normalized("vocabulary { x : Int. } theory { x > 5. x < 3. }");
        assert!(matches!(
            Bounds::infer(&table, &theory, 64),
            Err(Error::EmptyDomain { symbol }) if symbol == "x"
        ));
    }
}
