use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sw_engine::EngineConfig;
use sw_model::{Ability, DerivedState};

use super::signed;

pub fn run(
    config: &EngineConfig,
    character: &Path,
    corpus: &[PathBuf],
    temporary: Option<&Path>,
    json: bool,
) -> Result<(), String> {
    let state = super::evaluate_character(config, character, corpus, temporary)?;

    if json {
        let text = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    print_sheet(&state);
    Ok(())
}

fn print_sheet(state: &DerivedState) {
    let classes: Vec<String> = state
        .class_levels
        .iter()
        .map(|(class, level)| format!("{class} {level}"))
        .collect();
    println!(
        "  {} {}",
        format!("Level {}", state.level).bold(),
        format!("({})", classes.join(" / ")).dimmed()
    );
    println!("  proficiency bonus {}", signed(state.proficiency_bonus));
    println!();

    let mut abilities = Table::new();
    abilities.set_content_arrangement(ContentArrangement::Dynamic);
    abilities.set_header(vec!["Ability", "Score", "Mod", "Save"]);
    for ability in Ability::ALL {
        let record = state.abilities.get(&ability).copied().unwrap_or_default();
        let save = state
            .saving_throws
            .get(&ability)
            .map_or_else(|| "-".to_string(), |s| {
                let mark = if s.proficient { "*" } else { "" };
                format!("{}{mark}", signed(s.total))
            });
        abilities.add_row(vec![
            ability.name().to_string(),
            record.score.to_string(),
            signed(record.modifier),
            save,
        ]);
    }
    println!("{abilities}");
    println!();

    println!("  armor class  {}", state.armor_class.value.to_string().bold());
    println!("  hit points   {}", state.hit_points.max);
    println!("  initiative   {}", signed(state.initiative.total));
    if !state.speeds.is_empty() {
        let speeds: Vec<String> = state
            .speeds
            .iter()
            .map(|(movement, feet)| format!("{movement} {feet} ft."))
            .collect();
        println!("  speed        {}", speeds.join(", "));
    }
    if !state.senses.is_empty() {
        let senses: Vec<String> = state
            .senses
            .iter()
            .map(|s| format!("{} {} ft.", s.sense, s.range))
            .collect();
        println!("  senses       {}", senses.join(", "));
    }
    println!();

    let trained: Vec<_> = state
        .skills
        .iter()
        .filter(|(_, r)| r.proficient || r.expertise || r.bonus != 0)
        .collect();
    if !trained.is_empty() {
        let mut skills = Table::new();
        skills.set_content_arrangement(ContentArrangement::Dynamic);
        skills.set_header(vec!["Skill", "Ability", "Total", ""]);
        for (skill, record) in trained {
            let mark = if record.expertise {
                "expertise"
            } else if record.proficient {
                "proficient"
            } else {
                ""
            };
            skills.add_row(vec![
                skill.name().to_string(),
                record.ability.tag().to_uppercase(),
                signed(record.total),
                mark.to_string(),
            ]);
        }
        println!("{skills}");
        println!();
    }

    if let Some(casting) = &state.spellcasting {
        println!(
            "  spellcasting {} (save DC {}, attack {})",
            casting.ability.name(),
            casting.save_dc,
            signed(casting.attack_bonus)
        );
        for (level, pool) in &casting.slots {
            println!("    level {level} slots: {}", pool.max);
        }
        println!();
    }

    if !state.resources.is_empty() {
        let mut resources = Table::new();
        resources.set_content_arrangement(ContentArrangement::Dynamic);
        resources.set_header(vec!["Resource", "Uses", "Recharge"]);
        for resource in state.resources.values() {
            resources.add_row(vec![
                resource.name.clone(),
                format!("{}/{}", resource.current, resource.max),
                format!("{:?}", resource.recharge),
            ]);
        }
        println!("{resources}");
        println!();
    }

    if !state.features.is_empty() {
        println!("  {}", "Features".bold());
        for feature in &state.features {
            println!("    {} {}", feature.name, format!("[{}]", feature.source_id).dimmed());
        }
        println!();
    }

    let lists = [
        ("armor", &state.proficiencies.armor),
        ("weapons", &state.proficiencies.weapons),
        ("tools", &state.proficiencies.tools),
        ("languages", &state.proficiencies.languages),
        ("resist", &state.damage_resistances),
        ("immune", &state.condition_immunities),
        ("tags", &state.tags),
    ];
    for (label, values) in lists {
        if !values.is_empty() {
            println!("  {label:<10} {}", values.join(", "));
        }
    }

    for pending in &state.pending_choices {
        let options: Vec<&str> = pending.options.iter().map(|o| o.id.as_str()).collect();
        println!(
            "  {} {} ({}): choose {} of {}",
            "pending".yellow(),
            pending.choice_id,
            pending.source_id,
            pending.count,
            options.join(", ")
        );
    }
}
