use crate::ir::{EdgeType, VertexType, state_class};
use crate::layout::DagLayout;
use crate::metrics::{HeatBand, MetricKind, Metrics};
use crate::view::{DagView, Viewport};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub metric_type: Option<MetricKind>,
    pub viewport: Option<Viewport>,
    pub min_metrics: Metrics,
    pub max_metrics: Metrics,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VertexType,
    pub operations: Vec<String>,
    pub state: Option<String>,
    pub state_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_plan: Option<serde_json::Value>,
    pub depth: usize,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub effective_width: f32,
    pub incoming_x: f32,
    pub incoming_y: f32,
    pub outgoing_x: f32,
    pub outgoing_y: f32,
    pub metrics: Metrics,
    pub metric_title: Option<&'static str>,
    pub metric_display: String,
    pub metric_percent: i32,
    pub heat_class: &'static str,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDump {
    pub source: String,
    pub target: String,
    pub edge_type: EdgeType,
}

impl LayoutDump {
    pub fn from_layout(layout: &DagLayout) -> Self {
        let id_of = |idx: &usize| layout.nodes[*idx].id.clone();
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                operations: node.operations.clone(),
                state: node.state.clone(),
                state_class: node.state.as_deref().map(state_class),
                operation_plan: node.operation_plan.clone(),
                depth: node.depth,
                parents: node.parents.iter().map(id_of).collect(),
                children: node.children.iter().map(id_of).collect(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                effective_width: node.effective_width,
                incoming_x: node.incoming_x,
                incoming_y: node.incoming_y,
                outgoing_x: node.outgoing_x,
                outgoing_y: node.outgoing_y,
                metrics: node.metrics,
                metric_title: node.metric_type.map(MetricKind::label),
                metric_display: node.metric_display.clone(),
                metric_percent: node.metric_percent,
                heat_class: HeatBand::from_percent(node.metric_percent).css_class(),
                selected: node.selected,
            })
            .collect();

        let links = layout
            .links
            .iter()
            .map(|link| LinkDump {
                source: id_of(&link.source),
                target: id_of(&link.target),
                edge_type: link.edge_type,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            metric_type: layout.metric_type,
            viewport: None,
            min_metrics: layout.min_metrics,
            max_metrics: layout.max_metrics,
            nodes,
            links,
        }
    }

    pub fn from_view(view: &DagView) -> Self {
        let mut dump = Self::from_layout(view.layout());
        dump.viewport = Some(*view.viewport());
        dump
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when absent.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::parser::parse_topology;

    #[test]
    fn dump_references_vertices_by_id() {
        let dag = parse_topology(
            r#"{
                "vertices": [
                    { "id": "Map1", "type": "MAP", "hdfsReadBytes": 2048, "state": "JOBFAILED" },
                    { "id": "Reducer2", "type": "REDUCE", "hdfsReadBytes": 0 }
                ],
                "edges": [{ "fromVertex": "Map1", "toVertex": "Reducer2", "edgeType": "BROADCAST" }]
            }"#,
        )
        .unwrap();
        let mut layout = compute_layout(&dag, &LayoutConfig::default()).unwrap();
        layout.apply_metric_type(Some(MetricKind::Input));
        let dump = LayoutDump::from_layout(&layout);
        assert_eq!(dump.links[0].source, "Map1");
        assert_eq!(dump.nodes[1].parents, vec!["Map1".to_string()]);
        assert_eq!(dump.nodes[0].metric_display, "2 KB");
        assert_eq!(dump.nodes[0].heat_class, "heat-80-100");
        assert_eq!(dump.nodes[1].heat_class, "heat-0-20");

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["nodes"][0]["type"], "MAP");
        assert_eq!(json["nodes"][0]["stateClass"], "failed");
        assert!(json["nodes"][1]["stateClass"].is_null());
        assert!(json["nodes"][0].get("operationPlan").is_none());
        assert_eq!(json["links"][0]["edgeType"], "BROADCAST");
        assert_eq!(json["metricType"], "input");
        assert_eq!(json["maxMetrics"]["input"], 2048);
        assert_eq!(json["minMetrics"]["recordsRead"], -1);
    }
}
