use std::path::{Path, PathBuf};

use comfy_table::{ContentArrangement, Table};
use sw_engine::EngineConfig;

pub fn run(
    config: &EngineConfig,
    character: &Path,
    corpus: &[PathBuf],
    temporary: Option<&Path>,
    skipped_only: bool,
) -> Result<(), String> {
    let state = super::evaluate_character(config, character, corpus, temporary)?;

    let applied = state.provenance.iter().filter(|e| e.applied).count();
    let skipped = state.provenance.len() - applied;

    let entries: Vec<_> = state
        .provenance
        .iter()
        .filter(|e| !skipped_only || !e.applied)
        .collect();

    if entries.is_empty() {
        println!("  No effects to show.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Source", "Effect", "Status", "Value", "Reason"]);

    for entry in entries {
        let status = if entry.applied { "applied" } else { "skipped" };
        let value = entry.value.map_or_else(String::new, |v| v.to_string());
        let reason = entry
            .reason
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        table.add_row(vec![
            entry.source_id.clone(),
            entry.effect_id.clone(),
            status.to_string(),
            value,
            reason,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {applied} applied, {skipped} skipped");

    Ok(())
}
