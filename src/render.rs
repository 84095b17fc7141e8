use crate::config::{LayoutConfig, RenderConfig};
use crate::label::card_label;
use crate::layout::{EdgeLayout, NodeLayout, TreeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Static SVG of a family layout: member cards, partner and generation
/// edges. Union and virtual anchors are not drawn.
pub fn render_svg(layout: &TreeLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge));
    }

    for node in &layout.nodes {
        if node.member.is_some() {
            svg.push_str(&card_svg(node, theme, config));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn edge_svg(edge: &EdgeLayout) -> String {
    let dash = edge
        .style
        .dasharray
        .as_deref()
        .map(|dash| format!(" stroke-dasharray=\"{dash}\""))
        .unwrap_or_default();
    format!(
        "<path id=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"{} />",
        escape_xml(&edge.id),
        points_to_path(&edge.points),
        edge.style.stroke,
        edge.style.stroke_width,
        dash
    )
}

fn card_svg(node: &NodeLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let Some(member) = node.member.as_ref() else {
        return String::new();
    };
    let label = card_label(member, config.max_name_chars);
    let left = node.left();
    let top = node.top();
    let radius = (node.height * 0.23).min(node.width / 4.0);
    let portrait_y = top + node.height * 0.38;
    let name_y = portrait_y + radius + theme.font_size * 1.4;
    let id = escape_xml(&node.id.to_string());

    let mut out = String::new();
    out.push_str(&format!("<g data-member=\"{id}\">"));
    out.push_str(&format!(
        "<rect x=\"{left:.2}\" y=\"{top:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        node.width, node.height, theme.card_fill, theme.card_border
    ));

    match member.image_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            out.push_str(&format!(
                "<clipPath id=\"clip-{id}\"><circle cx=\"{:.2}\" cy=\"{portrait_y:.2}\" r=\"{radius:.2}\"/></clipPath>",
                node.x
            ));
            out.push_str(&format!(
                "<image href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" clip-path=\"url(#clip-{id})\" preserveAspectRatio=\"xMidYMid slice\"/>",
                escape_xml(url),
                node.x - radius,
                portrait_y - radius,
                radius * 2.0,
                radius * 2.0
            ));
        }
        None => {
            out.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>",
                node.x,
                portrait_y,
                theme.font_family,
                theme.font_size * 1.2,
                theme.card_muted_text,
                escape_xml(&label.initials)
            ));
        }
    }
    out.push_str(&format!(
        "<circle cx=\"{:.2}\" cy=\"{portrait_y:.2}\" r=\"{radius:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
        node.x, theme.portrait_ring
    ));

    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        node.x,
        theme.font_family,
        theme.font_size,
        theme.card_text,
        escape_xml(&label.name)
    ));
    if let Some(subtitle) = label.subtitle {
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>",
            node.x,
            name_y + theme.font_size * 1.3,
            theme.font_family,
            theme.font_size * 0.85,
            theme.card_muted_text,
            escape_xml(&subtitle)
        ));
    }
    out.push_str("</g>");
    out
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(color) = parse_hex_color(&render_cfg.background) {
        pixmap.fill(color);
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(feature = "png")]
fn parse_hex_color(value: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?,
        255,
    ))
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
