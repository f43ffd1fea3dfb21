//! Formula compilation and evaluation.
//!
//! Evaluation never fails from the caller's point of view: [`evaluate`]
//! logs the problem and yields 0. [`try_evaluate`] exposes the error for
//! tooling.

use std::collections::BTreeMap;

use sw_model::formula::{Formula, NumericValue};

use crate::ast::Expr;
use crate::context::FormulaContext;
use crate::error::{FormulaError, FormulaResult};
use crate::lexer;
use crate::parser;

fn check_call(name: &str, found: usize, span: std::ops::Range<usize>) -> FormulaResult<()> {
    let expected = match name {
        "min" | "max" if found == 0 => "at least 1",
        "floor" | "ceil" | "round" if found != 1 => "1",
        "min" | "max" | "floor" | "ceil" | "round" => return Ok(()),
        _ => {
            return Err(FormulaError::UnknownFunction {
                name: name.to_string(),
                span,
            });
        }
    };
    Err(FormulaError::Arity {
        name: name.to_string(),
        expected,
        found,
        span,
    })
}

/// Static checks on a parsed expression: identifiers must be declared and
/// calls must name a known helper with the right number of arguments.
fn validate(expr: &Expr, formula: &Formula) -> Vec<FormulaError> {
    let mut errors = Vec::new();
    for (name, span) in expr.variables() {
        if !formula.declares(name) {
            errors.push(FormulaError::UndeclaredVariable {
                name: name.to_string(),
                span,
            });
        }
    }
    for (name, found, span) in expr.calls() {
        if let Err(e) = check_call(name, found, span) {
            errors.push(e);
        }
    }
    errors
}

/// Collect every problem with a formula without evaluating it.
///
/// Lex errors stop the check before parsing; parse errors stop it before
/// validation.
pub fn check(formula: &Formula) -> Vec<FormulaError> {
    let (tokens, lex_errors) = lexer::lex(&formula.expression);
    if !lex_errors.is_empty() {
        return lex_errors
            .into_iter()
            .map(|e| FormulaError::Lex {
                span: e.span,
                message: e.message,
            })
            .collect();
    }
    match parser::parse(&tokens) {
        Ok(expr) => validate(&expr, formula),
        Err(parse_errors) => parse_errors
            .into_iter()
            .map(|e| FormulaError::Parse {
                span: e.span,
                message: e.message,
            })
            .collect(),
    }
}

/// Lex, parse, and validate a formula.
pub fn compile(formula: &Formula) -> FormulaResult<Expr> {
    let (tokens, lex_errors) = lexer::lex(&formula.expression);
    if let Some(e) = lex_errors.into_iter().next() {
        return Err(FormulaError::Lex {
            span: e.span,
            message: e.message,
        });
    }
    let expr = parser::parse(&tokens).map_err(|errors| {
        let first = errors.into_iter().next();
        FormulaError::Parse {
            span: first.as_ref().map_or(0..0, |e| e.span.clone()),
            message: first.map_or_else(|| "invalid expression".to_string(), |e| e.message),
        }
    })?;
    if let Some(e) = validate(&expr, formula).into_iter().next() {
        return Err(e);
    }
    Ok(expr)
}

/// Resolve each declared variable against the context.
fn bind(formula: &Formula, ctx: &FormulaContext) -> BTreeMap<String, f64> {
    formula
        .variables
        .iter()
        .map(|path| {
            let value = ctx.lookup(path).unwrap_or_else(|| {
                match ctx.suggest(path) {
                    Some(suggestion) => tracing::warn!(
                        variable = %path,
                        expression = %formula.expression,
                        "unknown formula variable, using 0 (did you mean \"{suggestion}\"?)"
                    ),
                    None => tracing::warn!(
                        variable = %path,
                        expression = %formula.expression,
                        "unknown formula variable, using 0"
                    ),
                }
                0.0
            });
            (path.clone(), value)
        })
        .collect()
}

fn eval_expr(expr: &Expr, bindings: &BTreeMap<String, f64>) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Var { name, .. } => bindings.get(name).copied().unwrap_or(0.0),
        Expr::Neg(inner) => -eval_expr(inner, bindings),
        Expr::Binary { op, lhs, rhs } => {
            op.apply(eval_expr(lhs, bindings), eval_expr(rhs, bindings))
        }
        Expr::Call { name, args, .. } => {
            let values: Vec<f64> = args.iter().map(|a| eval_expr(a, bindings)).collect();
            match (name.as_str(), values.as_slice()) {
                ("min", [first, rest @ ..]) => rest.iter().fold(*first, |acc, v| acc.min(*v)),
                ("max", [first, rest @ ..]) => rest.iter().fold(*first, |acc, v| acc.max(*v)),
                ("floor", [x]) => x.floor(),
                ("ceil", [x]) => x.ceil(),
                // Halves round toward positive infinity.
                ("round", [x]) => (x + 0.5).floor(),
                _ => f64::NAN,
            }
        }
    }
}

/// Evaluate a formula, surfacing any failure.
pub fn try_evaluate(formula: &Formula, ctx: &FormulaContext) -> FormulaResult<f64> {
    let expr = compile(formula)?;
    let bindings = bind(formula, ctx);
    let value = eval_expr(&expr, &bindings);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFinite)
    }
}

/// Evaluate a formula. Any failure is logged and yields 0.
pub fn evaluate(formula: &Formula, ctx: &FormulaContext) -> f64 {
    match try_evaluate(formula, ctx) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                expression = %formula.expression,
                error = %e,
                "formula evaluation failed, using 0"
            );
            0.0
        }
    }
}

/// Floor a formula result to an integer.
pub fn to_int(value: f64) -> i32 {
    value.floor() as i32
}

/// Resolve a numeric effect field to an integer.
pub fn resolve(value: &NumericValue, ctx: &FormulaContext) -> i32 {
    match value {
        NumericValue::Literal(n) => *n,
        NumericValue::Formula(formula) => to_int(evaluate(formula, ctx)),
    }
}
