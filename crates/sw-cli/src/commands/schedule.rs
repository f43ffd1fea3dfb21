use std::path::PathBuf;

use comfy_table::{ContentArrangement, Table};
use sw_model::SourcedEffect;

/// Short description of what a bundle contributes.
fn contents(bundle: &SourcedEffect) -> String {
    match &bundle.choice {
        Some(choice) => format!("choice {} ({} options)", choice.id, choice.options.len()),
        None => {
            let kinds: Vec<&str> = bundle.effects.iter().map(|e| e.kind.name()).collect();
            kinds.join(", ")
        }
    }
}

pub fn run(corpus: &[PathBuf]) -> Result<(), String> {
    let bundles = super::load_effects(corpus)?;
    if bundles.is_empty() {
        println!("  No effects found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Phase", "Source", "Name", "Effects"]);

    let scheduled = sw_engine::schedule(&bundles);
    for (index, entry) in scheduled.iter().enumerate() {
        let edition = entry
            .effect
            .edition
            .map_or_else(String::new, |e| format!(" [{e}]"));
        table.add_row(vec![
            (index + 1).to_string(),
            entry.phase.to_string(),
            entry.effect.source_id.clone(),
            format!("{}{edition}", entry.effect.name),
            contents(entry.effect),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} bundles", scheduled.len());

    Ok(())
}
