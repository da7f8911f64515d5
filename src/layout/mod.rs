mod error;
mod normalize;
mod packing;
mod position;
mod ranking;
mod types;

pub use error::LayoutError;
pub use types::*;

use std::collections::HashMap;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::Dag;
use crate::metrics::{Metrics, UNKNOWN};

use packing::{effective_widths, vertex_size};
use position::assign_positions;
use ranking::{assign_depths, ensure_acyclic, order_rows};

/// Lays out `dag` from scratch.
///
/// Terminology: vertices and edges belong to the topology, nodes and links to
/// the visual model. The result has no selection and no active metric; both
/// are applied afterwards without re-running layout.
pub fn compute_layout(dag: &Dag, config: &LayoutConfig) -> Result<DagLayout, LayoutError> {
    if dag.is_empty() {
        return Ok(DagLayout::default());
    }

    let outgoing = dag.outgoing();
    ensure_acyclic(dag, &outgoing)?;
    let mut ranking = assign_depths(dag, &outgoing)?;
    order_rows(dag, &mut ranking);

    let sizes: Vec<(f32, f32)> = dag
        .vertices
        .iter()
        .map(|vertex| vertex_size(vertex.operations.len(), config))
        .collect();
    let widths: Vec<f32> = sizes.iter().map(|(w, _)| *w).collect();
    let effective = effective_widths(&ranking, &widths, config);
    let positions = assign_positions(&ranking, &sizes, &effective, config);

    let mut index = HashMap::with_capacity(dag.len());
    let mut nodes = Vec::with_capacity(dag.len());
    for (idx, vertex) in dag.vertices.iter().enumerate() {
        index.insert(vertex.id.clone(), idx);
        let (width, height) = sizes[idx];
        let mut node = VertexLayout {
            id: vertex.id.clone(),
            name: vertex.name.clone(),
            kind: vertex.kind,
            operations: vertex.operations.clone(),
            state: vertex.state.clone(),
            duration: vertex.duration,
            operation_plan: vertex.operation_plan.clone(),
            depth: ranking.depth[idx],
            parents: ranking.parents[idx].clone(),
            children: ranking.children[idx].clone(),
            x: 0.0,
            y: 0.0,
            width,
            height,
            effective_width: effective[idx],
            incoming_x: 0.0,
            incoming_y: 0.0,
            outgoing_x: 0.0,
            outgoing_y: 0.0,
            metrics: Metrics::from_counters(&vertex.counters),
            metric_type: None,
            metric_percent: UNKNOWN as i32,
            metric_display: String::new(),
            selected: false,
        };
        let placement = positions.placements[idx];
        node.move_to(placement.x, placement.y);
        nodes.push(node);
    }

    let links = dag
        .edges
        .iter()
        .filter_map(|edge| {
            Some(LinkLayout {
                source: dag.index_of(&edge.from)?,
                target: dag.index_of(&edge.to)?,
                edge_type: edge.edge_type,
            })
        })
        .collect();

    let mut layout = DagLayout {
        nodes,
        links,
        rows: ranking.rows,
        min_metrics: Metrics::unknown(),
        max_metrics: Metrics::unknown(),
        metric_type: None,
        width: positions.width,
        height: positions.height,
        index,
    };
    layout.refresh_metric_ranges();
    debug!(
        nodes = layout.nodes.len(),
        links = layout.links.len(),
        width = layout.width,
        height = layout.height,
        "computed dag layout"
    );
    Ok(layout)
}

impl DagLayout {
    /// Marks `id` as the only selected vertex, or clears the selection for
    /// `None`. Returns whether the selection changed.
    pub fn select(&mut self, id: Option<&str>) -> Result<bool, LayoutError> {
        let target = match id {
            Some(id) => Some(
                self.node_index(id)
                    .ok_or_else(|| LayoutError::UnknownVertex(id.to_string()))?,
            ),
            None => None,
        };
        let mut changed = false;
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            let selected = Some(idx) == target;
            if node.selected != selected {
                node.selected = selected;
                changed = true;
            }
        }
        Ok(changed)
    }
}
