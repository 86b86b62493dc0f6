use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct CatalogState {
    queries: Arc<Mutex<Vec<String>>>,
}

async fn spell_by_slug(Path(slug): Path<String>) -> Result<Json<Value>, StatusCode> {
    match slug.as_str() {
        "acid-splash" => Ok(Json(json!({
            "index": "acid-splash",
            "name": "Acid Splash",
            "desc": ["You hurl a bubble of acid."],
            "range": "60 feet",
            "components": ["V", "S"],
            "ritual": false,
            "duration": "Instantaneous",
            "concentration": false,
            "casting_time": "1 action",
            "level": 0,
            "damage": {
                "damage_type": {"index": "acid", "name": "Acid", "url": "/api/damage-types/acid"},
                "damage_at_character_level": {"1": "1d6", "5": "2d6", "11": "3d6", "17": "4d6"}
            },
            "school": {"index": "conjuration", "name": "Conjuration", "url": "/api/magic-schools/conjuration"},
            "classes": [{"index": "sorcerer", "name": "Sorcerer", "url": "/api/classes/sorcerer"}],
            "subclasses": [],
            "url": "/api/spells/acid-splash"
        }))),
        "overcharged" => Ok(Json(json!({
            "index": "overcharged",
            "name": "Overcharged",
            "desc": ["Too much power for any caster."],
            "range": "Self",
            "components": ["V"],
            "ritual": false,
            "duration": "Instantaneous",
            "concentration": false,
            "casting_time": "1 action",
            "level": 12,
            "school": {"index": "evocation", "name": "Evocation", "url": "/api/magic-schools/evocation"},
            "classes": [],
            "subclasses": [],
            "url": "/api/spells/overcharged"
        }))),
        "broken" => Ok(Json(json!({"index": "broken"}))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn search_spells(
    State(state): State<CatalogState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let name = params.get("name").cloned().unwrap_or_default();
    state.queries.lock().await.push(name.clone());
    let results = if name.contains("acid") {
        json!([
            {"index": "acid-arrow", "name": "Acid Arrow", "url": "/api/spells/acid-arrow"},
            {"index": "acid-splash", "name": "Acid Splash", "level": 0, "url": "/api/spells/acid-splash"},
            {"index": "acid-arrow", "name": "Acid Arrow", "url": "/api/spells/acid-arrow"}
        ])
    } else {
        json!([])
    };
    Json(json!({"count": results.as_array().map_or(0, Vec::len), "results": results}))
}

async fn spawn_catalog() -> (String, CatalogState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind catalog");
    let addr = listener.local_addr().expect("catalog addr");
    let state = CatalogState::default();
    let app = Router::new()
        .route("/api/spells", get(search_spells))
        .route("/api/spells/:slug", get(spell_by_slug))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api/"), state)
}

#[tokio::test]
async fn lookup_slugifies_the_display_name() {
    let (base, _) = spawn_catalog().await;
    let catalog = CatalogClient::new(&base).expect("client");

    let spell = catalog.lookup_by_slug("  Acid   Splash ").await.expect("found");

    assert_eq!(spell.index, "acid-splash");
    assert_eq!(spell.origin, shared::domain::SpellOrigin::Catalog);
    let damage = spell.damage.expect("damage");
    let levels: Vec<u8> = damage.damage_at_character_level.keys().copied().collect();
    assert_eq!(levels, vec![1, 5, 11, 17]);
}

#[tokio::test]
async fn unknown_spell_is_not_found() {
    let (base, _) = spawn_catalog().await;
    let catalog = CatalogClient::new(&base).expect("client");

    let error = catalog.fetch_spell("wish-upon-a-star").await.expect_err("missing");
    assert!(matches!(error, CatalogError::NotFound { status: 404 }));
    assert!(catalog.lookup_by_slug("Wish Upon A Star").await.is_none());
}

#[tokio::test]
async fn incomplete_spell_body_is_a_decode_error() {
    let (base, _) = spawn_catalog().await;
    let catalog = CatalogClient::new(&base).expect("client");

    let error = catalog.fetch_spell("broken").await.expect_err("missing fields");
    assert!(matches!(error, CatalogError::Decode(_)));
}

#[tokio::test]
async fn out_of_range_spell_is_rejected_at_the_boundary() {
    let (base, _) = spawn_catalog().await;
    let catalog = CatalogClient::new(&base).expect("client");

    let error = catalog.fetch_spell("overcharged").await.expect_err("invalid spell");
    assert!(matches!(error, CatalogError::Invalid(_)));
    assert!(catalog.lookup_by_slug("Overcharged").await.is_none());
}

#[tokio::test]
async fn keyword_search_dedupes_in_first_seen_order() {
    let (base, state) = spawn_catalog().await;
    let catalog = CatalogClient::new(&base).expect("client");

    let matches = catalog.search_by_keyword("ACID").await;

    let slugs: Vec<&str> = matches.iter().map(|summary| summary.index.as_str()).collect();
    assert_eq!(slugs, vec!["acid-arrow", "acid-splash"]);
    assert_eq!(matches[1].level, Some(0));
    assert_eq!(state.queries.lock().await.as_slice(), ["acid"]);
}

#[tokio::test]
async fn multi_word_keyword_is_sent_as_plus_joined_terms() {
    let (base, state) = spawn_catalog().await;
    let catalog = CatalogClient::new(&base).expect("client");

    assert!(catalog.search("Cure  Wounds").await.expect("search").is_empty());
    assert_eq!(state.queries.lock().await.as_slice(), ["cure wounds"]);
}

#[tokio::test]
async fn unreachable_catalog_yields_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let catalog = CatalogClient::new(&format!("http://{addr}/api")).expect("client");

    assert!(matches!(
        catalog.search("acid").await,
        Err(CatalogError::Transport(_))
    ));
    assert!(catalog.search_by_keyword("acid").await.is_empty());
    assert!(catalog.lookup_by_slug("acid splash").await.is_none());
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(matches!(
        CatalogClient::new("ftp://example.com/api"),
        Err(CatalogError::Invalid(_))
    ));
    assert!(matches!(
        CatalogClient::new("not a url"),
        Err(CatalogError::Invalid(_))
    ));
    let catalog = CatalogClient::new("https://www.dnd5eapi.co/api/").expect("client");
    assert_eq!(catalog.base_url(), "https://www.dnd5eapi.co/api");
}

#[tokio::test]
async fn empty_inputs_are_invalid() {
    let catalog = CatalogClient::new(DEFAULT_CATALOG_URL).expect("client");
    assert!(matches!(
        catalog.fetch_spell("").await,
        Err(CatalogError::Invalid(_))
    ));
    assert!(matches!(
        catalog.search("   ").await,
        Err(CatalogError::Invalid(_))
    ));
}
