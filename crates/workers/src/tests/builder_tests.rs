use std::collections::BTreeMap;

use shared::codec::decode_collection;

use super::*;
use crate::fixtures::{slugs, spell};

fn frost_fields() -> SpellFields {
    SpellFields {
        name: "Frost Nova".to_string(),
        level: "2".to_string(),
        range: "Self (10-foot radius)".to_string(),
        casting_time: "1 action".to_string(),
        duration: "Instantaneous".to_string(),
        attack_type: String::new(),
        desc: "A ring of ice bursts outward.".to_string(),
        higher_level: String::new(),
        concentration: "no".to_string(),
        ritual: "NO".to_string(),
        components: "v, s ,m".to_string(),
        has_damage: "yes".to_string(),
        damage_type: Some("Cold".to_string()),
        scaling_type: Some("slot".to_string()),
        damage_values: BTreeMap::from([
            ("2".to_string(), "3d8".to_string()),
            (" 3".to_string(), "4d8 ".to_string()),
        ]),
        school: "Evocation".to_string(),
        classes: "Wizard, Sorcerer,".to_string(),
    }
}

#[test]
fn build_spell_derives_slug_and_marks_custom_origin() {
    let spell = build_spell(&frost_fields(), None).expect("build");

    assert_eq!(spell.index, "frost-nova");
    assert_eq!(spell.name, "Frost Nova");
    assert_eq!(spell.origin, SpellOrigin::Custom);
    assert_eq!(spell.url, None);
    assert_eq!(spell.level, 2);
    assert_eq!(spell.components, vec!["V", "S", "M"]);
    assert_eq!(spell.classes.len(), 2);
    assert_eq!(spell.classes[1].index, "sorcerer");
    assert!(spell.higher_level.is_empty());
    assert_eq!(spell.attack_type, None);

    let damage = spell.damage.expect("damage");
    assert_eq!(damage.damage_type.expect("type").name, "Cold");
    assert_eq!(damage.damage_at_slot_level.get(&3).map(String::as_str), Some("4d8"));
    assert!(damage.damage_at_character_level.is_empty());
}

#[test]
fn build_spell_rejects_bad_answers() {
    let mut fields = frost_fields();
    fields.level = "ten".to_string();
    assert_eq!(
        build_spell(&fields, None),
        Err(BuildError::InvalidLevel("ten".to_string()))
    );

    let mut fields = frost_fields();
    fields.level = "12".to_string();
    assert!(matches!(build_spell(&fields, None), Err(BuildError::InvalidLevel(_))));

    let mut fields = frost_fields();
    fields.classes = " , ".to_string();
    assert_eq!(
        build_spell(&fields, None),
        Err(BuildError::MissingField("classes"))
    );

    let mut fields = frost_fields();
    fields.scaling_type = Some("caster".to_string());
    assert_eq!(
        build_spell(&fields, None),
        Err(BuildError::UnknownScaling("caster".to_string()))
    );

    let mut fields = frost_fields();
    fields.ritual = "maybe".to_string();
    assert!(matches!(
        build_spell(&fields, None),
        Err(BuildError::InvalidFlag { field: "ritual", .. })
    ));
}

#[test]
fn create_appends_new_spell() {
    let bookmarks = vec![spell("light", "Light", 0, &["Cleric"])];
    let bookmarks = create(bookmarks, &frost_fields()).expect("create");

    assert_eq!(slugs(&bookmarks), vec!["light", "frost-nova"]);
}

#[test]
fn create_with_existing_slug_replaces_in_place() {
    let bookmarks = vec![
        spell("frost-nova", "Frost Nova", 1, &["Wizard"]),
        spell("light", "Light", 0, &["Cleric"]),
    ];
    let bookmarks = create(bookmarks, &frost_fields()).expect("create");

    assert_eq!(slugs(&bookmarks), vec!["frost-nova", "light"]);
    assert_eq!(bookmarks[0].level, 2);
    assert!(bookmarks[0].is_custom());
}

#[test]
fn edit_preserves_position_and_keeps_blank_fields() {
    let bookmarks = vec![
        spell("light", "Light", 0, &["Cleric"]),
        spell("fireball", "Fireball", 3, &["Wizard"]),
        spell("shield", "Shield", 1, &["Wizard"]),
    ];
    let fields = SpellFields {
        name: "Greater Fireball".to_string(),
        level: "5".to_string(),
        ..SpellFields::default()
    };

    let edited = edit(bookmarks, "fireball", &fields).expect("edit");

    assert_eq!(slugs(&edited), vec!["light", "greater-fireball", "shield"]);
    let greater = &edited[1];
    assert_eq!(greater.level, 5);
    assert_eq!(greater.range, "60 feet");
    assert_eq!(greater.classes[0].name, "Wizard");
    assert_eq!(greater.desc, vec!["Fireball description".to_string()]);
    assert!(greater.is_custom());
}

#[test]
fn edit_rejects_missing_target_and_slug_collision() {
    let bookmarks = vec![
        spell("light", "Light", 0, &["Cleric"]),
        spell("shield", "Shield", 1, &["Wizard"]),
    ];

    assert_eq!(
        edit(bookmarks.clone(), "fireball", &SpellFields::default()),
        Err(BuildError::TargetMissing("fireball".to_string()))
    );

    let rename_to_shield = SpellFields {
        name: "Shield".to_string(),
        ..SpellFields::default()
    };
    assert_eq!(
        edit(bookmarks, "light", &rename_to_shield),
        Err(BuildError::SlugCollision("shield".to_string()))
    );
}

#[test]
fn worker_replies_with_updated_collection_or_empty_frame() {
    let mut worker = SpellBuilderWorker;

    let step = worker.handle(BuildRequest::Create {
        bookmarks: Vec::new(),
        fields: frost_fields(),
    });
    let Step::Reply(reply) = step else {
        panic!("create must not stop the worker");
    };
    let spells = decode_collection(&reply).expect("decode").expect("collection");
    assert_eq!(slugs(&spells), vec!["frost-nova"]);

    let rejected = worker.handle(BuildRequest::Create {
        bookmarks: Vec::new(),
        fields: SpellFields::default(),
    });
    assert_eq!(rejected, Step::empty());

    assert_eq!(
        worker.handle(BuildRequest::Shutdown),
        Step::Shutdown(Vec::new())
    );
}

#[test]
fn malformed_edit_target_gets_empty_reply() {
    let mut worker = SpellBuilderWorker;
    let bookmarks = vec![spell("fireball", "Fireball", 3, &["Wizard"])];
    let target = spell("fireball", "Fireball", 3, &[]);

    let step = worker.handle(BuildRequest::Edit {
        bookmarks,
        target,
        fields: SpellFields {
            level: "4".to_string(),
            ..SpellFields::default()
        },
    });

    assert_eq!(step, Step::empty());
}
