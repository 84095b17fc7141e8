use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub card_fill: String,
    pub card_border: String,
    pub card_text: String,
    pub card_muted_text: String,
    pub portrait_ring: String,
    pub line_color: String,
    pub line_width: f32,
    pub accent_color: String,
    pub partner_dasharray: String,
    pub partner_width: f32,
    /// Dash pattern for edges through virtual nodes. `None` draws them exactly
    /// like direct parent-child edges.
    pub virtual_dasharray: Option<String>,
}

impl Theme {
    /// Dark card palette of the family tree viewer.
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, sans-serif".to_string(),
            font_size: 14.0,
            background: "#111827".to_string(),
            card_fill: "#374151".to_string(),
            card_border: "#4B5563".to_string(),
            card_text: "#E5E7EB".to_string(),
            card_muted_text: "#9CA3AF".to_string(),
            portrait_ring: "#8B5CF6".to_string(),
            line_color: "#9CA3AF".to_string(),
            line_width: 1.5,
            accent_color: "#8B5CF6".to_string(),
            partner_dasharray: "6 4".to_string(),
            partner_width: 2.0,
            virtual_dasharray: None,
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            card_fill: "#F9FAFB".to_string(),
            card_border: "#D1D5DB".to_string(),
            card_text: "#1F2937".to_string(),
            card_muted_text: "#6B7280".to_string(),
            portrait_ring: "#0EA5E9".to_string(),
            line_color: "#6B7280".to_string(),
            line_width: 1.4,
            accent_color: "#EC4899".to_string(),
            partner_dasharray: "6 4".to_string(),
            partner_width: 1.8,
            virtual_dasharray: None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}
