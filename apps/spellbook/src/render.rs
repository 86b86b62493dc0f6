use shared::domain::{DamageTable, Spell};

pub const DESC_WIDTH: usize = 70;
pub const RULE: &str =
    "-----------------------------------------------------------------------------";

/// Greedy word wrap; words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub fn render_spell(spell: &Spell) -> String {
    let mut lines = vec![RULE.to_string(), format!("Name: {}", spell.name)];
    if spell.is_custom() {
        lines.push("(custom spell)".to_string());
    }

    lines.push(String::new());
    lines.push("Description:".to_string());
    for paragraph in &spell.desc {
        lines.extend(wrap(paragraph, DESC_WIDTH));
    }

    if !spell.higher_level.is_empty() {
        lines.push(String::new());
        lines.push("Higher level:".to_string());
        for paragraph in &spell.higher_level {
            lines.extend(wrap(paragraph, DESC_WIDTH));
        }
    }

    lines.push(String::new());
    lines.push(format!("Range: {}", spell.range));
    lines.push(format!("Casting time: {}", spell.casting_time));
    lines.push(format!("Duration: {}", spell.duration));
    if spell.is_cantrip() {
        lines.push("Level: 0 (cantrip)".to_string());
    } else {
        lines.push(format!("Level: {}", spell.level));
    }
    if !spell.components.is_empty() {
        lines.push(format!("Components: {}", spell.components.join(", ")));
    }
    if let Some(material) = &spell.material {
        lines.push(format!("Material: {material}"));
    }
    if spell.ritual {
        lines.push("Ritual: Yes".to_string());
    }

    lines.push(String::new());
    lines.push(
        if spell.concentration {
            "Concentration: Necessary"
        } else {
            "Concentration: Not necessary"
        }
        .to_string(),
    );
    if let Some(attack_type) = &spell.attack_type {
        lines.push(format!("Attack type: {attack_type}"));
    }
    if let Some(damage) = &spell.damage {
        if let Some(damage_type) = &damage.damage_type {
            lines.push(format!("Damage type: {}", damage_type.name));
        }
        push_table(&mut lines, "slot", &damage.damage_at_slot_level);
        push_table(&mut lines, "character", &damage.damage_at_character_level);
    }

    lines.push(String::new());
    lines.push(format!("School of Magic: {}", spell.school.name));
    let classes: Vec<&str> = spell.classes.iter().map(|class| class.name.as_str()).collect();
    lines.push(format!("Class(es): {}", classes.join(", ")));
    lines.push(RULE.to_string());
    lines.join("\n")
}

fn push_table(lines: &mut Vec<String>, scaling: &str, table: &DamageTable) {
    if table.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("Damage at {scaling} level:"));
    for (level, dice) in table {
        lines.push(format!("  {scaling} level {level}: {dice}"));
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
