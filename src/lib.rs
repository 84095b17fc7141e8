#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod label;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use ir::{Dataset, Direction, Member, RecordId, Relationship, RelationshipKind};
pub use layout::{
    EdgeKind, EdgeLayout, LayoutError, LayoutWarning, NodeId, NodeKind, NodeLayout, TreeLayout,
    compute_layout, compute_layout_from_json,
};
pub use layout_dump::{LayoutDump, layout_to_json};
pub use render::render_svg;
pub use theme::Theme;

/// Lays out a dataset JSON document and returns the renderer-facing JSON.
pub fn layout_json(input: &str, theme: &Theme, config: &LayoutConfig) -> anyhow::Result<String> {
    let layout = compute_layout_from_json(input, theme, config)?;
    Ok(layout_to_json(&layout)?)
}

/// Lays out a dataset JSON document and renders it to SVG.
pub fn render(input: &str, theme: &Theme, config: &LayoutConfig) -> anyhow::Result<String> {
    let layout = compute_layout_from_json(input, theme, config)?;
    Ok(render_svg(&layout, theme, config))
}
