//! `colloquy personas`: list registered personas.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

pub fn list_personas(state: &AppState, json: bool) -> Result<()> {
    let personas = state.registry.personas();
    let default = state.config.session.default_persona.as_str();

    if json {
        let values: Vec<&colloquy_types::persona::PersonaConfig> =
            personas.iter().map(|p| p.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Temp").fg(Color::White),
        Cell::new("Max Tokens").fg(Color::White),
        Cell::new("Prompt").fg(Color::White),
    ]);

    for persona in &personas {
        let name = if persona.name == default {
            format!("{} *", persona.name)
        } else {
            persona.name.clone()
        };
        let prompt: String = if persona.system_prompt.chars().count() > 50 {
            let cut: String = persona.system_prompt.chars().take(47).collect();
            format!("{cut}...")
        } else {
            persona.system_prompt.clone()
        };

        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(&persona.model.model_id),
            Cell::new(format!("{:.1}", persona.model.temperature)),
            Cell::new(persona.model.max_tokens),
            Cell::new(prompt).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} persona{} ({} = default)",
        style(personas.len()).bold(),
        if personas.len() == 1 { "" } else { "s" },
        style("*").cyan()
    );
    println!();
    Ok(())
}
