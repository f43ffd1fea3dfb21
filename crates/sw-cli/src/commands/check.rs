use std::path::PathBuf;

use sw_formula::{Severity, diagnose, render_diagnostics};
use sw_model::{Effect, EffectKind, NumericValue};

#[derive(Default)]
struct Tally {
    formulas: usize,
    errors: usize,
    warnings: usize,
}

impl Tally {
    fn check_effect(&mut self, location: &str, effect: &Effect) {
        if effect.kind == EffectKind::Unknown {
            eprintln!("warning: {location}: unknown effect kind");
            self.warnings += 1;
            return;
        }
        for value in effect.kind.numeric_values() {
            let NumericValue::Formula(formula) = value else {
                continue;
            };
            self.formulas += 1;
            let diagnostics = diagnose(formula);
            if diagnostics.is_empty() {
                continue;
            }
            eprint!(
                "{}",
                render_diagnostics(&formula.expression, location, &diagnostics)
            );
            for diag in &diagnostics {
                match diag.severity {
                    Severity::Error => self.errors += 1,
                    Severity::Warning => self.warnings += 1,
                }
            }
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub fn run(corpus: &[PathBuf]) -> Result<(), String> {
    let files = super::load_corpus(corpus)?;
    let mut tally = Tally::default();
    let mut bundles = 0;

    for file in &files {
        for bundle in &file.bundles {
            bundles += 1;
            let prefix = format!("{}:{}", file.path.display(), bundle.source_id);
            for (index, effect) in bundle.effects.iter().enumerate() {
                let id = effect.id.clone().unwrap_or_else(|| format!("#{index}"));
                tally.check_effect(&format!("{prefix}/{id}"), effect);
            }
            if let Some(choice) = &bundle.choice {
                for option in &choice.options {
                    for (index, effect) in option.effects.iter().enumerate() {
                        let id = effect.id.clone().unwrap_or_else(|| format!("#{index}"));
                        tally.check_effect(&format!("{prefix}/{}/{id}", option.id), effect);
                    }
                }
            }
        }
    }

    if tally.errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            tally.errors,
            plural(tally.errors),
            tally.warnings,
            plural(tally.warnings),
        );
        return Err("check failed with errors".into());
    }
    if tally.warnings > 0 {
        eprintln!("  {} warning{}", tally.warnings, plural(tally.warnings));
    }

    println!("  All checks passed.");
    println!(
        "  {bundles} bundles, {} formula{}",
        tally.formulas,
        plural(tally.formulas)
    );

    Ok(())
}
