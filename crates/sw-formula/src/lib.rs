//! Sandboxed arithmetic for formula-valued effect fields.
//!
//! Formulas are lexed with logos and parsed with chumsky into a small
//! expression tree. Only numbers, declared variables, `+ - * /`,
//! parentheses, and the helpers `min`, `max`, `floor`, `ceil`, `round` are
//! accepted; anything else fails to compile and evaluates to 0.
//!
//! ```
//! use sw_formula::{FormulaContext, resolve};
//! use sw_model::{Ability, Formula, NumericValue};
//!
//! let ctx = FormulaContext::new().with_score(Ability::Con, 16);
//! let value = NumericValue::Formula(Formula::new(
//!     "10 + abilities.con.modifier",
//!     ["abilities.con.modifier"],
//! ));
//! assert_eq!(resolve(&value, &ctx), 13);
//! ```

pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use context::FormulaContext;
pub use diagnostics::{Diagnostic, Severity, diagnose, render_diagnostics};
pub use error::{FormulaError, FormulaResult};
pub use eval::{check, compile, evaluate, resolve, to_int, try_evaluate};
