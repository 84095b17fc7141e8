//! Renderer-facing JSON shape of a [`TreeLayout`].
//!
//! Field names follow what a node/edge canvas expects: `position` is the
//! top-left corner of the node box, `center` the layout cell center,
//! `targetPosition`/`sourcePosition` the default incoming and outgoing faces.

use crate::ir::Member;
use crate::layout::{LayoutWarning, TreeLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub direction: &'static str,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump<'a>>,
    pub edges: Vec<EdgeDump>,
    pub warnings: &'a [LayoutWarning],
}

#[derive(Debug, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump<'a> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Option<&'a Member>,
    pub position: Point,
    pub center: Point,
    pub width: f32,
    pub height: f32,
    pub rank: usize,
    pub target_position: &'static str,
    pub source_position: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyleDump {
    pub stroke: String,
    pub stroke_width: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub shape: &'static str,
    pub source_handle: String,
    pub target_handle: String,
    pub animated: bool,
    pub style: EdgeStyleDump,
    pub points: Vec<[f32; 2]>,
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a TreeLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.to_string(),
                kind: node.kind().as_str(),
                data: node.member.as_ref(),
                position: Point {
                    x: node.left(),
                    y: node.top(),
                },
                center: Point {
                    x: node.x,
                    y: node.y,
                },
                width: node.width,
                height: node.height,
                rank: node.rank,
                target_position: node.target_face.as_str(),
                source_position: node.source_face.as_str(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                kind: edge.kind.as_str(),
                shape: edge.shape.as_str(),
                source_handle: edge.source_handle.clone(),
                target_handle: edge.target_handle.clone(),
                animated: edge.style.animated,
                style: EdgeStyleDump {
                    stroke: edge.style.stroke.clone(),
                    stroke_width: edge.style.stroke_width,
                    stroke_dasharray: edge.style.dasharray.clone(),
                },
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            direction: layout.direction.as_token(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
            warnings: &layout.warnings,
        }
    }
}

pub fn layout_to_json(layout: &TreeLayout) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LayoutDump::from_layout(layout))
}

pub fn write_layout_dump(path: Option<&Path>, layout: &TreeLayout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}
