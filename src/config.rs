use crate::ir::Direction;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub direction: Direction,
    /// Gap between neighbouring nodes of one rank.
    pub node_spacing: f32,
    /// Gap between consecutive ranks.
    pub rank_spacing: f32,
    pub member_width: f32,
    pub member_height: f32,
    /// Edge length of the invisible union/virtual anchors.
    pub anchor_size: f32,
    /// Gap left between the two cards of a partner pair.
    pub partner_spacing: f32,
    pub margin: f32,
    pub max_name_chars: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopBottom,
            node_spacing: 100.0,
            rank_spacing: 200.0,
            member_width: 256.0,
            member_height: 140.0,
            anchor_size: 1.0,
            partner_spacing: 48.0,
            margin: 24.0,
            max_name_chars: 28,
        }
    }
}

impl LayoutConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: Theme::modern().background,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    card_fill: Option<String>,
    card_border: Option<String>,
    card_text: Option<String>,
    card_muted_text: Option<String>,
    portrait_ring: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    accent_color: Option<String>,
    partner_dasharray: Option<String>,
    partner_width: Option<f32>,
    virtual_dasharray: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    direction: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    member_width: Option<f32>,
    member_height: Option<f32>,
    anchor_size: Option<f32>,
    partner_spacing: Option<f32>,
    margin: Option<f32>,
    max_name_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

/// Loads a JSON5 config file over the defaults. Without a path the defaults
/// are returned unchanged.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" | "dark" => config.theme = Theme::modern(),
            "light" | "default" => config.theme = Theme::light(),
            other => anyhow::bail!("unknown theme {other:?}"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.card_fill {
            config.theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            config.theme.card_border = v;
        }
        if let Some(v) = vars.card_text {
            config.theme.card_text = v;
        }
        if let Some(v) = vars.card_muted_text {
            config.theme.card_muted_text = v;
        }
        if let Some(v) = vars.portrait_ring {
            config.theme.portrait_ring = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.accent_color {
            config.theme.accent_color = v;
        }
        if let Some(v) = vars.partner_dasharray {
            config.theme.partner_dasharray = v;
        }
        if let Some(v) = vars.partner_width {
            config.theme.partner_width = v;
        }
        if let Some(v) = vars.virtual_dasharray {
            config.theme.virtual_dasharray = Some(v);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(token) = layout.direction.as_deref() {
            config.layout.direction = Direction::from_token(token)
                .ok_or_else(|| anyhow::anyhow!("unknown layout direction {token:?}"))?;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v;
        }
        if let Some(v) = layout.member_width {
            config.layout.member_width = v;
        }
        if let Some(v) = layout.member_height {
            config.layout.member_height = v;
        }
        if let Some(v) = layout.anchor_size {
            config.layout.anchor_size = v;
        }
        if let Some(v) = layout.partner_spacing {
            config.layout.partner_spacing = v;
        }
        if let Some(v) = layout.margin {
            config.layout.margin = v;
        }
        if let Some(v) = layout.max_name_chars {
            config.layout.max_name_chars = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.layout.member_width, 256.0);
        assert_eq!(config.layout.direction, Direction::TopBottom);
    }

    #[test]
    fn json5_overrides_apply() {
        let config = parse_config(
            r##"{
                // comments are allowed
                theme: "light",
                themeVariables: { accentColor: "#FF0000", virtualDasharray: "2 2" },
                layout: { direction: "LR", rankSpacing: 90.0, partnerSpacing: 10.0 },
            }"##,
        )
        .expect("parse");
        assert_eq!(config.theme.accent_color, "#FF0000");
        assert_eq!(config.theme.virtual_dasharray.as_deref(), Some("2 2"));
        assert_eq!(config.layout.direction, Direction::LeftRight);
        assert_eq!(config.layout.rank_spacing, 90.0);
        assert_eq!(config.layout.partner_spacing, 10.0);
        assert_eq!(config.render.background, Theme::light().background);
    }

    #[test]
    fn rejects_unknown_direction() {
        assert!(parse_config(r#"{ layout: { direction: "RL" } }"#).is_err());
    }
}
