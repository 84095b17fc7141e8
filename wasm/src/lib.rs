use family_tree_layout::{
    Dataset, Direction, LayoutConfig, Member, Relationship, Theme, compute_layout, layout_to_json,
    render_svg,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyLayoutOptions {
    direction: Option<String>,
    theme: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    member_width: Option<f32>,
    member_height: Option<f32>,
}

fn build_options(options: FamilyLayoutOptions) -> Result<(Theme, LayoutConfig), String> {
    let theme = match options.theme.as_deref() {
        None | Some("modern") | Some("dark") => Theme::modern(),
        Some("light") => Theme::light(),
        Some(other) => return Err(format!("unknown theme: {other}")),
    };

    let mut config = LayoutConfig::default();
    if let Some(token) = options.direction {
        config.direction =
            Direction::from_token(&token).ok_or_else(|| format!("unknown direction: {token}"))?;
    }
    if let Some(spacing) = options.node_spacing {
        config.node_spacing = spacing;
    }
    if let Some(spacing) = options.rank_spacing {
        config.rank_spacing = spacing;
    }
    if let Some(width) = options.member_width {
        config.member_width = width;
    }
    if let Some(height) = options.member_height {
        config.member_height = height;
    }
    Ok((theme, config))
}

fn parse_inputs(
    members_json: &str,
    relationships_json: &str,
    options_json: Option<String>,
) -> Result<(Dataset, Theme, LayoutConfig), String> {
    let members: Vec<Member> =
        serde_json::from_str(members_json).map_err(|error| format!("members: {error}"))?;
    let relationships: Vec<Relationship> = serde_json::from_str(relationships_json)
        .map_err(|error| format!("relationships: {error}"))?;
    let options = match options_json {
        Some(raw) => serde_json::from_str::<FamilyLayoutOptions>(&raw)
            .map_err(|error| format!("options: {error}"))?,
        None => FamilyLayoutOptions::default(),
    };
    let (theme, config) = build_options(options)?;
    Ok((Dataset::new(members, relationships), theme, config))
}

fn layout_nodes_and_edges(
    members_json: &str,
    relationships_json: &str,
    options_json: Option<String>,
) -> Result<String, String> {
    let (dataset, theme, config) = parse_inputs(members_json, relationships_json, options_json)?;
    let layout = compute_layout(&dataset, &theme, &config).map_err(|error| error.to_string())?;
    layout_to_json(&layout).map_err(|error| error.to_string())
}

fn render_family_svg(
    members_json: &str,
    relationships_json: &str,
    options_json: Option<String>,
) -> Result<String, String> {
    let (dataset, theme, config) = parse_inputs(members_json, relationships_json, options_json)?;
    let layout = compute_layout(&dataset, &theme, &config).map_err(|error| error.to_string())?;
    Ok(render_svg(&layout, &theme, &config))
}

/// Returns the positioned nodes and styled edges as JSON.
#[wasm_bindgen]
pub fn layout_family_tree(
    members_json: &str,
    relationships_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    layout_nodes_and_edges(members_json, relationships_json, options_json)
        .map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_family_tree_svg(
    members_json: &str,
    relationships_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    render_family_svg(members_json, relationships_json, options_json)
        .map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::{FamilyLayoutOptions, build_options, layout_nodes_and_edges, render_family_svg};

    const MEMBERS: &str = r#"[
        {"id": 1, "name": "Grace"},
        {"id": 2, "name": "Henry"},
        {"id": 3, "name": "Iris", "birthDate": "1990-04-02"}
    ]"#;
    const RELATIONSHIPS: &str = r#"[
        {"member1Id": 1, "member2Id": 2, "relationshipType": "partner"},
        {"member1Id": 1, "member2Id": 3, "relationshipType": "parent-child"},
        {"member1Id": 2, "member2Id": 3, "relationshipType": "parent-child"}
    ]"#;

    #[test]
    fn lays_out_a_small_family() {
        let json = layout_nodes_and_edges(MEMBERS, RELATIONSHIPS, None).expect("layout");
        let value: Value = serde_json::from_str(&json).expect("json");
        let nodes = value["nodes"].as_array().expect("nodes");
        assert_eq!(nodes.len(), 4);
        let edges = value["edges"].as_array().expect("edges");
        assert!(
            edges
                .iter()
                .any(|edge| edge["id"] == "parent-child:union-1-2->3")
        );
    }

    #[test]
    fn options_pick_direction_and_theme() {
        let options: FamilyLayoutOptions =
            serde_json::from_str(r#"{"direction": "LR", "theme": "light", "nodeSpacing": 40}"#)
                .expect("options");
        let (_, config) = build_options(options).expect("valid options");
        assert!(config.direction.is_horizontal());
        assert_eq!(config.node_spacing, 40.0);

        let bad: FamilyLayoutOptions =
            serde_json::from_str(r#"{"direction": "RL"}"#).expect("options");
        assert!(build_options(bad).is_err());
    }

    #[test]
    fn renders_svg_and_reports_cycles() {
        let svg = render_family_svg(MEMBERS, RELATIONSHIPS, None).expect("svg");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Iris"));

        let cyclic = r#"[
            {"member1Id": 1, "member2Id": 3, "relationshipType": "parent-child"},
            {"member1Id": 3, "member2Id": 1, "relationshipType": "parent-child"}
        ]"#;
        let err = layout_nodes_and_edges(MEMBERS, cyclic, None).expect_err("cycle");
        assert!(err.starts_with("cyclic ancestry"));
    }
}
