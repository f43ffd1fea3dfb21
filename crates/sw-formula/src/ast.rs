//! Expression tree produced by the parser.

use std::ops::Range;

/// A binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinOp {
    /// Apply the operator.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }
}

/// An arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Variable reference.
    Var {
        /// Dotted variable path.
        name: String,
        /// Byte range in the expression text.
        span: Range<usize>,
    },
    /// Unary negation.
    Neg(Box<Expr>),
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Helper function call (`min`, `max`, `floor`, `ceil`, `round`).
    Call {
        /// Function name.
        name: String,
        /// Arguments.
        args: Vec<Expr>,
        /// Byte range of the whole call.
        span: Range<usize>,
    },
}

impl Expr {
    /// Every variable reference, in source order.
    pub fn variables(&self) -> Vec<(&str, Range<usize>)> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'e>(&'e self, out: &mut Vec<(&'e str, Range<usize>)>) {
        match self {
            Expr::Number(_) => {}
            Expr::Var { name, span } => out.push((name.as_str(), span.clone())),
            Expr::Neg(inner) => inner.collect_variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Every function call, outermost first.
    pub fn calls(&self) -> Vec<(&str, usize, Range<usize>)> {
        let mut out = Vec::new();
        self.collect_calls(&mut out);
        out
    }

    fn collect_calls<'e>(&'e self, out: &mut Vec<(&'e str, usize, Range<usize>)>) {
        match self {
            Expr::Number(_) | Expr::Var { .. } => {}
            Expr::Neg(inner) => inner.collect_calls(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_calls(out);
                rhs.collect_calls(out);
            }
            Expr::Call { name, args, span } => {
                out.push((name.as_str(), args.len(), span.clone()));
                for arg in args {
                    arg.collect_calls(out);
                }
            }
        }
    }
}
