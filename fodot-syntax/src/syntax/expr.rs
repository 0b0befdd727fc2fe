/*! Defines the expressions of a theory, the [`Statement`]s that carry them and the
[`Theory`] and [`KnowledgeBase`] that collect statements.

[`Statement`]: crate::syntax::Statement
[`Theory`]: crate::syntax::Theory
[`KnowledgeBase`]: crate::syntax::KnowledgeBase
*/
use super::{Interpretations, Name, Position, Vocabulary};
use itertools::Itertools;
use std::fmt;

/// Is a binary logical connective.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Connective {
    And,
    Or,
    /// `a => b`
    Implies,
    /// `a <= b`, read as `b => a`.
    Implied,
    Iff,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::And => "∧",
            Self::Or => "∨",
            Self::Implies => "⇒",
            Self::Implied => "⇐",
            Self::Iff => "⇔",
        };
        write!(f, "{}", s)
    }
}

/// Is a comparison operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    /// Returns the operator that holds exactly when the receiver does not.
    pub fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Ge => Self::Lt,
            Self::Gt => Self::Le,
            Self::Le => Self::Gt,
        }
    }

    /// Returns the operator obtained by swapping the operands of the receiver.
    pub fn flip(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Gt => Self::Lt,
            Self::Le => Self::Ge,
            Self::Ge => Self::Le,
        }
    }

    /// Returns true if the operator only compares for (in)equality.
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    /// Applies the operator on two values.
    pub fn holds<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Ge => left >= right,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Eq => "=",
            Self::Ne => "≠",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "≤",
            Self::Ge => "≥",
        };
        write!(f, "{}", s)
    }
}

/// Is a binary arithmetic operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Quantifier {
    Forall,
    Exists,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Forall => write!(f, "∀"),
            Self::Exists => write!(f, "∃"),
        }
    }
}

/// Is an expression of a theory as it appears in the source. Expressions are not typed: the
/// same node kinds build formulae and terms, and the normalizer sorts them out against a
/// [`SymbolTable`].
///
/// [`SymbolTable`]: crate::syntax::SymbolTable
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Is the truth value `true` or `false`.
    Bool { value: bool },

    /// Is an integer literal.
    Int { value: i64 },

    /// Is a reference to a 0-ary symbol, an enumeration literal or a bound variable.
    Ident { name: Name },

    /// Is the application of a function symbol on a list of arguments.
    App { function: Name, args: Vec<Expr> },

    Not { expr: Box<Expr> },

    /// Is the arithmetic negation `-e`.
    Neg { expr: Box<Expr> },

    Binary {
        op: Connective,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Is a quantified formula `∀ x, y in T: body` over a finite type `T`.
    Quant {
        quantifier: Quantifier,
        vars: Vec<Name>,
        sort: Name,
        body: Box<Expr>,
    },

    /// Is the number of instances of `vars` in `sort` that satisfy `body`, `#{x in T: body}`.
    Count {
        vars: Vec<Name>,
        sort: Name,
        body: Box<Expr>,
    },
}

/// Returns the negation of `expr`.
pub fn not(expr: Expr) -> Expr {
    Expr::Not {
        expr: Box::new(expr),
    }
}

impl Expr {
    pub fn ident<S: Into<Name>>(name: S) -> Self {
        Self::Ident { name: name.into() }
    }

    pub fn int(value: i64) -> Self {
        Self::Int { value }
    }

    pub fn app<S: Into<Name>>(function: S, args: Vec<Expr>) -> Self {
        Self::App {
            function: function.into(),
            args,
        }
    }

    fn binary(self, op: Connective, other: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Returns a conjunction of the receiver and `other`.
    pub fn and(self, other: Self) -> Self {
        self.binary(Connective::And, other)
    }

    /// Returns a disjunction of the receiver and `other`.
    pub fn or(self, other: Self) -> Self {
        self.binary(Connective::Or, other)
    }

    /// Returns an implication from the receiver to `other`.
    pub fn implies(self, other: Self) -> Self {
        self.binary(Connective::Implies, other)
    }

    /// Returns an implication from `other` to the receiver.
    pub fn implied_by(self, other: Self) -> Self {
        self.binary(Connective::Implied, other)
    }

    /// Returns a bi-implication between the receiver and `other`.
    pub fn iff(self, other: Self) -> Self {
        self.binary(Connective::Iff, other)
    }

    /// Returns the comparison `self op other`.
    pub fn compare(self, op: CmpOp, other: Self) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Returns the arithmetic expression `self op other`.
    pub fn arith(self, op: ArithOp, other: Self) -> Self {
        Self::Arith {
            op,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn neg(self) -> Self {
        Self::Neg {
            expr: Box::new(self),
        }
    }

    pub fn quant(quantifier: Quantifier, vars: Vec<Name>, sort: Name, body: Self) -> Self {
        Self::Quant {
            quantifier,
            vars,
            sort,
            body: Box::new(body),
        }
    }

    pub fn count(vars: Vec<Name>, sort: Name, body: Self) -> Self {
        Self::Count {
            vars,
            sort,
            body: Box::new(body),
        }
    }

    /// Desugars a chain of comparisons `e0 op1 e1 op2 e2 …` into the conjunction
    /// `e0 op1 e1 ∧ e1 op2 e2 ∧ …`.
    pub fn chain(first: Self, rest: Vec<(CmpOp, Self)>) -> Self {
        let mut left = first;
        let mut result: Option<Self> = None;
        for (op, right) in rest {
            let comparison = left.compare(op, right.clone());
            result = Some(match result {
                Some(r) => r.and(comparison),
                None => comparison,
            });
            left = right;
        }
        result.unwrap_or(left)
    }

    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Self::Bool { .. } | Self::Int { .. } | Self::Ident { .. } | Self::App { .. } | Self::Count { .. }
        )
    }
}

// Prints `expr`, wrapped in parentheses unless it is atomic.
fn operand(expr: &Expr) -> String {
    if expr.is_atomic() {
        expr.to_string()
    } else {
        format!("({})", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Bool { value } => write!(f, "{}", value),
            Self::Int { value } => write!(f, "{}", value),
            Self::Ident { name } => write!(f, "{}", name),
            Self::App { function, args } => write!(f, "{}({})", function, args.iter().join(", ")),
            Self::Not { expr } => write!(f, "¬{}", operand(expr)),
            Self::Neg { expr } => write!(f, "-{}", operand(expr)),
            Self::Binary { op, left, right } => {
                write!(f, "{} {} {}", operand(left), op, operand(right))
            }
            Self::Compare { op, left, right } => {
                write!(f, "{} {} {}", operand(left), op, operand(right))
            }
            Self::Arith { op, left, right } => {
                write!(f, "{} {} {}", operand(left), op, operand(right))
            }
            Self::Quant {
                quantifier,
                vars,
                sort,
                body,
            } => write!(f, "{} {} in {}: {}", quantifier, vars.iter().join(", "), sort, body),
            Self::Count { vars, sort, body } => {
                write!(f, "#{{{} in {}: {}}}", vars.iter().join(", "), sort, body)
            }
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

/// Is a statement of a theory: an expression and its position in the source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Statement {
    pub expr: Expr,
    pub position: Position,
}

impl Statement {
    pub fn new(expr: Expr, position: Position) -> Self {
        Self { expr, position }
    }
}

impl From<Expr> for Statement {
    fn from(expr: Expr) -> Self {
        Self::new(expr, Position::default())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Is the theory section of a knowledge base: a list of statements in source order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Theory {
    statements: Vec<Statement>,
}

impl Theory {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Returns the statements of the theory in source order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

impl From<Vec<Expr>> for Theory {
    fn from(exprs: Vec<Expr>) -> Self {
        Self::new(exprs.into_iter().map(Statement::from).collect())
    }
}

impl fmt::Display for Theory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ss: Vec<String> = self.statements.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", ss.join("\n"))
    }
}

/// Is a parsed input file: a vocabulary followed by a theory over it and an optional
/// structure block that fixes the values of some symbols.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct KnowledgeBase {
    pub vocabulary: Vocabulary,
    pub theory: Theory,
    pub structure: Interpretations,
}

impl KnowledgeBase {
    pub fn new(vocabulary: Vocabulary, theory: Theory) -> Self {
        Self {
            vocabulary,
            theory,
            structure: Interpretations::default(),
        }
    }

    pub fn with_structure(self, structure: Interpretations) -> Self {
        Self { structure, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain() {
        let a = || Expr::int(0);
        let b = || Expr::ident("a");
        let c = || Expr::int(6);
        assert_eq!(
            "(0 < a) ∧ (a < 6)",
            Expr::chain(a(), vec![(CmpOp::Lt, b()), (CmpOp::Lt, c())]).to_string()
        );
        assert_eq!("a", Expr::chain(b(), vec![]).to_string());
    }

    #[test]
    fn test_print() {
        {
            let e = Expr::ident("p").iff(Expr::ident("q").or(Expr::ident("r")));
            assert_eq!("p ⇔ (q ∨ r)", e.to_string());
        }
        {
            let e = not(Expr::ident("r"));
            assert_eq!("¬r", e.to_string());
        }
        {
            let e = Expr::app("f", vec![Expr::ident("a"), Expr::ident("b")]).compare(
                CmpOp::Ne,
                Expr::app("f", vec![Expr::ident("b"), Expr::ident("a")]),
            );
            assert_eq!("f(a, b) ≠ f(b, a)", e.to_string());
        }
        {
            let e = Expr::count(
                vec!["x".into()],
                "Color".into(),
                Expr::app("g", vec![Expr::ident("x")]),
            )
            .compare(CmpOp::Ge, Expr::int(2));
            assert_eq!("#{x in Color: g(x)} ≥ 2", e.to_string());
        }
    }

    #[test]
    fn test_cmp_op() {
        assert_eq!(CmpOp::Ge, CmpOp::Lt.negate());
        assert_eq!(CmpOp::Gt, CmpOp::Lt.flip());
        assert!(CmpOp::Le.holds(&3, &3));
        assert!(!CmpOp::Ne.holds(&3, &3));
        assert!(CmpOp::Eq.is_equality());
    }
}
