use shared::domain::{ApiReference, Damage, SpellOrigin};

use super::*;

fn fireball() -> Spell {
    Spell {
        index: "fireball".to_string(),
        name: "Fireball".to_string(),
        desc: vec![
            "A bright streak flashes from your pointing finger to a point you choose within range and then blossoms with a low roar into an explosion of flame.".to_string(),
        ],
        higher_level: vec!["The damage increases by 1d6 for each slot level above 3rd.".to_string()],
        range: "150 feet".to_string(),
        components: vec!["V".to_string(), "S".to_string(), "M".to_string()],
        material: Some("A tiny ball of bat guano and sulfur.".to_string()),
        ritual: false,
        duration: "Instantaneous".to_string(),
        concentration: false,
        casting_time: "1 action".to_string(),
        level: 3,
        attack_type: None,
        damage: Some(Damage {
            damage_type: Some(ApiReference::named("Fire")),
            damage_at_slot_level: [(3, "8d6".to_string()), (4, "9d6".to_string())].into(),
            damage_at_character_level: Default::default(),
        }),
        school: ApiReference::named("Evocation"),
        classes: vec![ApiReference::named("Sorcerer"), ApiReference::named("Wizard")],
        subclasses: Vec::new(),
        url: None,
        origin: SpellOrigin::Catalog,
    }
}

#[test]
fn wrap_respects_width() {
    let lines = wrap("one two three four five six", 9);
    assert_eq!(lines, vec!["one two", "three", "four five", "six"]);
    assert!(wrap("   ", 10).is_empty());
    assert_eq!(wrap("incomprehensibilities", 5), vec!["incomprehensibilities"]);
}

#[test]
fn render_includes_core_fields() {
    let text = render_spell(&fireball());

    assert!(text.starts_with(RULE));
    assert!(text.contains("Name: Fireball"));
    assert!(text.contains("Higher level:"));
    assert!(text.contains("Range: 150 feet"));
    assert!(text.contains("Level: 3"));
    assert!(text.contains("Components: V, S, M"));
    assert!(text.contains("Concentration: Not necessary"));
    assert!(text.contains("Damage type: Fire"));
    assert!(text.contains("slot level 3: 8d6"));
    assert!(!text.contains("character level"));
    assert!(text.contains("Class(es): Sorcerer, Wizard"));
    assert!(!text.contains("(custom spell)"));
    assert!(text.lines().all(|line| line.len() <= RULE.len()));
}

#[test]
fn render_marks_custom_cantrips() {
    let mut spell = fireball();
    spell.level = 0;
    spell.origin = SpellOrigin::Custom;
    spell.damage = None;

    let text = render_spell(&spell);
    assert!(text.contains("(custom spell)"));
    assert!(text.contains("Level: 0 (cantrip)"));
    assert!(!text.contains("Damage type"));
}
