use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::ir::{EdgeType, VertexType, operator_properties};
use crate::metrics::{MetricKind, Metrics};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexLayout {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VertexType,
    pub operations: Vec<String>,
    pub state: Option<String>,
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_plan: Option<Value>,
    pub depth: usize,
    /// Arena indices into [`DagLayout::nodes`].
    pub parents: Vec<usize>,
    pub children: Vec<usize>,
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
    pub metric_type: Option<MetricKind>,
    pub metric_percent: i32,
    pub metric_display: String,
    pub selected: bool,
}

impl VertexLayout {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Hover-table rows for the `occurrence`-th operator named `op`.
    pub fn operation_plan(&self, op: &str, occurrence: usize) -> Vec<(String, String)> {
        self.operation_plan
            .as_ref()
            .map(|plan| operator_properties(plan, op, occurrence))
            .unwrap_or_default()
    }

    /// Moves the box and keeps both edge anchors attached to it.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.incoming_x = x + self.width / 2.0;
        self.incoming_y = y;
        self.outgoing_x = self.incoming_x;
        self.outgoing_y = y + self.height;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkLayout {
    pub source: usize,
    pub target: usize,
    pub edge_type: EdgeType,
}

/// The visual model of one topology: vertices in input order, links in edge
/// order, and the per-metric ranges used for heat colouring.
#[derive(Debug, Clone, Default)]
pub struct DagLayout {
    pub nodes: Vec<VertexLayout>,
    pub links: Vec<LinkLayout>,
    /// Arena indices per depth, in left-to-right order.
    pub rows: Vec<Vec<usize>>,
    pub min_metrics: Metrics,
    pub max_metrics: Metrics,
    pub metric_type: Option<MetricKind>,
    pub width: f32,
    pub height: f32,
    pub(crate) index: HashMap<String, usize>,
}

impl DagLayout {
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&VertexLayout> {
        self.node_index(id).map(|idx| &self.nodes[idx])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut VertexLayout> {
        self.node_index(id).map(|idx| &mut self.nodes[idx])
    }

    pub fn selected(&self) -> Option<&VertexLayout> {
        self.nodes.iter().find(|node| node.selected)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
