//! Formula lints and ariadne rendering for the `check` command.

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;

use sw_model::formula::Formula;

use crate::context::is_variable_path;
use crate::error::FormulaError;
use crate::{eval, lexer, parser};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The formula will evaluate to 0.
    Error,
    /// The formula evaluates, but probably not as intended.
    Warning,
}

/// A diagnostic message with a location in the expression text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Byte range in the expression.
    pub span: std::ops::Range<usize>,
    /// Headline.
    pub message: String,
    /// Text attached to the highlighted span.
    pub label: Option<String>,
}

impl Diagnostic {
    /// Create an error.
    pub fn error(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Create a warning.
    pub fn warning(span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

impl From<FormulaError> for Diagnostic {
    fn from(err: FormulaError) -> Self {
        let span = err.span().unwrap_or(0..0);
        let label = match &err {
            FormulaError::UndeclaredVariable { .. } => Some("add it to `variables`"),
            FormulaError::UnknownFunction { .. } => Some("expected min, max, floor, ceil or round"),
            _ => None,
        };
        let diag = Diagnostic::error(span, err.to_string());
        match label {
            Some(label) => diag.with_label(label),
            None => diag,
        }
    }
}

/// Paths the expression actually reads, or `None` if it does not parse.
fn referenced_paths(formula: &Formula) -> Option<Vec<String>> {
    let (tokens, lex_errors) = lexer::lex(&formula.expression);
    if !lex_errors.is_empty() {
        return None;
    }
    let expr = parser::parse(&tokens).ok()?;
    Some(
        expr.variables()
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect(),
    )
}

/// Check a formula and describe every problem found.
///
/// Besides compile errors, this warns about declared variables that are
/// not a supported path (they evaluate to 0) or that no variable reference
/// in the parsed expression reads.
pub fn diagnose(formula: &Formula) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = eval::check(formula)
        .into_iter()
        .map(Diagnostic::from)
        .collect();

    let referenced = referenced_paths(formula);
    let whole = 0..formula.expression.len();
    for variable in &formula.variables {
        if !is_variable_path(variable) {
            diagnostics.push(
                Diagnostic::warning(
                    whole.clone(),
                    format!("declared variable \"{variable}\" is not a known path"),
                )
                .with_label("evaluates to 0"),
            );
        } else if referenced
            .as_ref()
            .is_some_and(|paths| !paths.contains(variable))
        {
            diagnostics.push(Diagnostic::warning(
                whole.clone(),
                format!("declared variable \"{variable}\" is never used"),
            ));
        }
    }
    diagnostics
}

/// Render diagnostics using ariadne for pretty terminal output.
pub fn render_diagnostics(source: &str, filename: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let color = match diag.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let span = (filename, diag.span.clone());
        let mut report = Report::build(kind, span).with_message(&diag.message);

        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        report = report.with_label(
            Label::new((filename, diag.span.clone()))
                .with_message(label_text)
                .with_color(color),
        );

        report
            .finish()
            .write((filename, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(0..5, "unknown function \"sqrt\"");
        assert_eq!(d.to_string(), "error: unknown function \"sqrt\"");
    }

    #[test]
    fn clean_formula_has_no_diagnostics() {
        let f = Formula::new("10 + abilities.dex.modifier", ["abilities.dex.modifier"]);
        assert!(diagnose(&f).is_empty());
    }

    #[test]
    fn unknown_and_unused_variables_warn() {
        let f = Formula::new("level + 1", ["level", "hitPoints", "proficiencyBonus"]);
        let diags = diagnose(&f);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert!(diags[0].message.contains("hitPoints"));
        assert!(diags[1].message.contains("never used"));
    }

    #[test]
    fn substring_of_another_path_is_not_a_use() {
        let f = Formula::new("classLevels.fighter", ["level", "classLevels.fighter"]);
        let diags = diagnose(&f);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].message, "declared variable \"level\" is never used");
    }

    #[test]
    fn unparsable_formula_skips_usage_warnings() {
        let f = Formula::new("level +", ["level"]);
        let diags = diagnose(&f);
        assert!(diags.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn undeclared_variable_is_an_error_with_span() {
        let f = Formula::new("1 + level", Vec::<String>::new());
        let diags = diagnose(&f);
        assert_eq!(diags[0].severity, Severity::Error);
        assert_eq!(diags[0].span, 4..9);
    }

    #[test]
    fn render_produces_output() {
        let f = Formula::new("max(level) + sqrt(2)", ["level"]);
        let diags = diagnose(&f);
        let output = render_diagnostics(&f.expression, "formula", &diags);
        assert!(!output.is_empty());
        assert!(output.contains("unknown function"));
    }
}
