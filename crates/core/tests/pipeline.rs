//! End-to-end planning over small ESI-shaped descriptions.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use esi_typegen_core::{ApiSpec, NamespaceSettings, Overrides, TypeKind, TypePlan};
use serde_json::{Value, json};

fn spec(value: Value) -> ApiSpec {
    serde_json::from_value(value).unwrap()
}

fn route(id: &str, tag: &str, schema: &Value) -> Value {
    json!({
        "id": id,
        "method": "get",
        "path": format!("/{}/", id.replace('_', "/")),
        "tag": tag,
        "responses": { "200": { "description": "ok", "schema": schema } }
    })
}

fn object(keys: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = keys
        .iter()
        .map(|key| ((*key).to_string(), json!({ "type": "string" })))
        .collect();
    json!({ "type": "object", "properties": properties })
}

fn plan(spec: &ApiSpec, overrides: &Overrides) -> TypePlan {
    TypePlan::build(spec, overrides, &NamespaceSettings::default()).unwrap()
}

fn namespace_of(plan: &TypePlan, title: &str) -> String {
    let node = plan.find_by_title(title).unwrap();
    plan.tree.full_name(plan.tree.namespace_of(node.id).unwrap())
}

#[test]
fn shared_response_shape_becomes_one_named_type() {
    let body = json!({
        "type": "object",
        "properties": { "id": { "type": "number" }, "name": { "type": "string" } }
    });
    let spec = spec(json!({
        "operations": [route("get_foo_id", "Foo", &body), route("get_bar_id", "Bar", &body)]
    }));
    let plan = plan(&spec, &Overrides::empty());

    let interfaces: Vec<_> = plan
        .graph
        .declarations()
        .filter(|node| node.kind == TypeKind::Interface)
        .collect();
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].titles, vec!["get_foo_id_ok", "get_bar_id_ok"]);
    assert_eq!(interfaces[0].name(), Some("Foo"));
    plan.graph.check_invariants().unwrap();
}

#[test]
fn alliance_icons_route_lands_in_tag_namespace() {
    let spec = spec(json!({
        "operations": [
            route("get_alliances_alliance_id_icons", "Alliance", &object(&["px128x128", "px64x64"])),
            route("get_alliances_alliance_id", "Alliance", &object(&["name", "ticker", "date_founded"])),
            route("get_alliances_alliance_id_corporations", "Alliance", &object(&["corporation_id"])),
            route("get_wars", "Wars", &object(&["war_id"])),
            route("get_wars_war_id", "Wars", &object(&["aggressor", "defender", "declared"])),
            route("get_wars_war_id_killmails", "Wars", &object(&["killmail_id", "killmail_hash"]))
        ]
    }));
    let plan = plan(&spec, &Overrides::empty());

    for title in [
        "get_alliances_alliance_id_icons_ok",
        "get_alliances_alliance_id_ok",
        "get_alliances_alliance_id_corporations_ok",
    ] {
        assert_eq!(namespace_of(&plan, title), "esi.alliance");
    }
    assert_eq!(namespace_of(&plan, "get_wars_war_id_ok"), "esi.war");
    let icons = plan.find_by_title("get_alliances_alliance_id_icons_ok").unwrap();
    assert_eq!(icons.name(), Some("Icons"));
    assert_eq!(plan.qualified_name(icons.id).unwrap(), "esi.alliance.Icons");
}

#[test]
fn route_override_forces_namespace() {
    let spec = spec(json!({
        "operations": [
            route("get_foo", "Foo", &object(&["a"])),
            route("get_foo_bars", "Foo", &object(&["b"])),
            route("get_foo_bazs", "Foo", &object(&["c"]))
        ]
    }));
    let overrides = Overrides::empty()
        .with_route_namespace("get_foo", "esi.custom.path")
        .with_route_namespace("get_foo_bars", "esi.custom.path")
        .with_route_namespace("get_foo_bazs", "esi.custom.path");
    // Keep sparse parents from folding their only child so the path stays visible.
    let settings = NamespaceSettings {
        min_siblings: 0,
        ..NamespaceSettings::default()
    };
    let plan = TypePlan::build(&spec, &overrides, &settings).unwrap();

    for title in ["get_foo_ok", "get_foo_bars_ok", "get_foo_bazs_ok"] {
        assert_eq!(namespace_of(&plan, title), "esi.custom.path");
    }
}

#[test]
fn rare_namespace_collapses_into_grandparent() {
    // esi.rare holds one type and esi has no other children.
    let spec = spec(json!({
        "operations": [
            route("get_rare", "Rare", &object(&["a"])),
            route("get_top", "Top", &object(&["b"]))
        ]
    }));
    let overrides = Overrides::empty()
        .with_route_namespace("get_rare", "esi.rare")
        .with_route_namespace("get_top", "esi");
    let plan = plan(&spec, &overrides);

    assert_eq!(namespace_of(&plan, "get_rare_ok"), "");
    assert_eq!(namespace_of(&plan, "get_top_ok"), "");
    let root = plan.tree.get(plan.tree.root());
    assert!(root.log.iter().any(|l| l.starts_with("collapsed esi.rare")));
    assert!(root.log.iter().any(|l| l.starts_with("collapsed esi (")));
}

#[test]
fn type_override_and_name_override_apply() {
    let spec = spec(json!({
        "operations": [route("get_characters_character_id_planets_planet_id", "Planetary Interaction", &json!({
            "type": "object",
            "properties": {
                "pins": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "title": "get_characters_character_id_planets_planet_id_pin",
                        "properties": { "pin_id": { "type": "integer", "format": "int64" } }
                    }
                }
            }
        }))]
    }));
    let overrides = Overrides::from_json(
        r#"{ "explicit": { "types": { "get_characters_character_id_planets_planet_id_pin": "esi.planet" } } }"#,
        r#"{ "get_characters_character_id_planets_planet_id_pin": "PlanetaryPin" }"#,
    )
    .unwrap();
    let plan = plan(&spec, &overrides);

    let pin = plan
        .find_by_title("get_characters_character_id_planets_planet_id_pin")
        .unwrap();
    assert_eq!(pin.name(), Some("PlanetaryPin"));
    assert!(pin.resolved_name.as_ref().unwrap().explicit);
    assert_eq!(plan.qualified_name(pin.id).unwrap(), "PlanetaryPin");
}

#[test]
fn recursive_schema_plans_and_reports() {
    let spec = spec(json!({
        "operations": [route("get_tree", "Tree", &json!({ "$ref": "#/definitions/tree_node" }))],
        "definitions": {
            "tree_node": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "children": { "type": "array", "items": { "$ref": "#/definitions/tree_node" } }
                }
            }
        }
    }));
    let plan = plan(&spec, &Overrides::empty());
    let report = plan.report();
    let node = report
        .namespaces
        .iter()
        .flat_map(|ns| ns.declarations.iter())
        .find(|decl| decl.name == "TreeNode")
        .unwrap();
    let children = node.members.iter().find(|m| m.key == "children").unwrap();
    let array = report
        .namespaces
        .iter()
        .flat_map(|ns| ns.declarations.iter())
        .find(|decl| decl.kind == "array")
        .unwrap();
    assert_eq!(children.ty, array.name);
    assert_eq!(array.members[0].ty, "TreeNode");
}

#[test]
fn planning_is_deterministic() {
    let value = json!({
        "operations": [
            route("get_characters_character_id_assets", "Assets", &json!({
                "type": "array",
                "items": { "type": "object", "properties": {
                    "item_id": { "type": "integer", "format": "int64" },
                    "location_flag": { "type": "string", "enum": ["Hangar", "Cargo"] }
                } }
            })),
            route("get_characters_character_id_blueprints", "Character", &json!({
                "type": "array",
                "items": { "type": "object", "properties": {
                    "item_id": { "type": "integer", "format": "int64" },
                    "location_flag": { "type": "string", "enum": ["Hangar", "Cargo"] }
                } }
            })),
            route("get_markets_prices", "Market", &object(&["type_id", "average_price"]))
        ]
    });
    let render = || {
        let plan = plan(&spec(value.clone()), Overrides::builtin().unwrap());
        serde_json::to_string_pretty(&plan.report()).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn builtin_overrides_load() {
    let overrides = Overrides::load(None, None).unwrap();
    assert_eq!(&overrides, Overrides::builtin().unwrap());
}

#[test]
fn nested_arrays_inside_elements_get_distinct_names() {
    let squad = json!({
        "type": "object",
        "properties": { "id": { "type": "integer", "format": "int64" }, "name": { "type": "string" } }
    });
    let wing = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "squads": { "type": "array", "items": squad }
        }
    });
    let spec = spec(json!({
        "operations": [route("get_fleets_fleet_id_wings", "Fleets", &json!({ "type": "array", "items": wing }))]
    }));
    let plan = plan(&spec, &Overrides::empty());

    let name_of = |title: &str| plan.find_by_title(title).unwrap().name().unwrap().to_string();
    assert_eq!(name_of("get_fleets_fleet_id_wings_ok"), "Wings");
    assert_eq!(name_of("get_fleets_fleet_id_wings_ok_element"), "Wing");
    assert_eq!(name_of("get_fleets_fleet_id_wings_ok_element_squads"), "Squads");
    assert_eq!(name_of("get_fleets_fleet_id_wings_ok_element_squads_element"), "Squad");
    assert!(
        plan.tree
            .iter()
            .flat_map(|ns| ns.log.iter())
            .all(|line| !line.starts_with("duplicate name"))
    );
}
