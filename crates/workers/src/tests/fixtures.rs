use shared::domain::{ApiReference, Spell, SpellOrigin};

pub(crate) fn spell(slug: &str, name: &str, level: u8, classes: &[&str]) -> Spell {
    Spell {
        index: slug.to_string(),
        name: name.to_string(),
        desc: vec![format!("{name} description")],
        higher_level: Vec::new(),
        range: "60 feet".to_string(),
        components: vec!["V".to_string(), "S".to_string()],
        material: None,
        ritual: false,
        duration: "Instantaneous".to_string(),
        concentration: false,
        casting_time: "1 action".to_string(),
        level,
        attack_type: None,
        damage: None,
        school: ApiReference::named("Evocation"),
        classes: classes.iter().copied().map(ApiReference::named).collect(),
        subclasses: Vec::new(),
        url: Some(format!("/api/spells/{slug}")),
        origin: SpellOrigin::Catalog,
    }
}

pub(crate) fn slugs(spells: &[Spell]) -> Vec<&str> {
    spells.iter().map(|spell| spell.index.as_str()).collect()
}
