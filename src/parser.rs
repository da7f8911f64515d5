use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ir::{Dag, EdgeType, Vertex, VertexCounters, VertexType};
use crate::layout::LayoutError;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology document: {0}")]
    Syntax(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopologyFile {
    #[serde(default)]
    vertices: Vec<VertexRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VertexRecord {
    id: String,
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: VertexType,
    #[serde(default)]
    operations: Vec<String>,
    #[serde(default)]
    incoming_edges: Vec<String>,
    #[serde(default)]
    outgoing_edges: Vec<String>,
    state: Option<String>,
    duration: Option<u64>,
    operation_plan: Option<serde_json::Value>,
    #[serde(flatten)]
    counters: VertexCounters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeRecord {
    id: Option<String>,
    from_vertex: String,
    to_vertex: String,
    #[serde(default)]
    edge_type: EdgeType,
}

/// Parses a topology document into a validated [`Dag`].
///
/// Strict JSON is tried first; anything else gets a second chance as JSON5.
/// Vertex-level `incomingEdges`/`outgoingEdges` are cross-checked against the
/// edge list, which stays authoritative for adjacency.
pub fn parse_topology(input: &str) -> Result<Dag, TopologyError> {
    let file: TopologyFile = match serde_json::from_str(input) {
        Ok(file) => file,
        Err(json_err) => json5::from_str(input)
            .map_err(|_| TopologyError::Syntax(json_err.to_string()))?,
    };
    build_dag(file)
}

fn build_dag(file: TopologyFile) -> Result<Dag, TopologyError> {
    let mut edges_by_id: HashMap<&str, &EdgeRecord> = HashMap::new();
    for edge in &file.edges {
        if let Some(id) = edge.id.as_deref() {
            edges_by_id.insert(id, edge);
        }
    }

    for record in &file.vertices {
        for edge_id in &record.incoming_edges {
            check_edge_ref(&edges_by_id, edge_id, &record.id, |edge| edge.to_vertex.as_str())?;
        }
        for edge_id in &record.outgoing_edges {
            check_edge_ref(&edges_by_id, edge_id, &record.id, |edge| edge.from_vertex.as_str())?;
        }
    }

    let mut dag = Dag::new();
    for record in file.vertices {
        let name = record.name.unwrap_or_else(|| record.id.clone());
        let mut vertex = Vertex::new(&record.id, record.kind)
            .with_name(&name)
            .with_operations(record.operations)
            .with_counters(record.counters);
        vertex.state = record.state;
        vertex.duration = record.duration;
        vertex.operation_plan = record
            .operation_plan
            .and_then(|plan| decode_operation_plan(&record.id, plan));
        dag.add_vertex(vertex)?;
    }
    for edge in &file.edges {
        dag.add_edge(&edge.from_vertex, &edge.to_vertex, edge.edge_type)?;
    }
    debug!(
        vertices = dag.vertices.len(),
        edges = dag.edges.len(),
        "parsed topology"
    );
    Ok(dag)
}

/// Plans arrive either inline or as the JSON text Hive stores in the job
/// history; an unreadable plan is dropped rather than failing the topology.
fn decode_operation_plan(vertex_id: &str, plan: serde_json::Value) -> Option<serde_json::Value> {
    let serde_json::Value::String(text) = plan else {
        return Some(plan);
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(json_err) => match json5::from_str(&text) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(vertex = vertex_id, error = %json_err, "ignoring unreadable operation plan");
                None
            }
        },
    }
}

fn check_edge_ref(
    edges_by_id: &HashMap<&str, &EdgeRecord>,
    edge_id: &str,
    vertex_id: &str,
    endpoint: fn(&EdgeRecord) -> &str,
) -> Result<(), LayoutError> {
    let Some(&edge) = edges_by_id.get(edge_id) else {
        return Err(LayoutError::GraphIntegrity {
            reference: edge_id.to_string(),
            detail: format!("vertex {vertex_id} lists an edge that does not exist"),
        });
    };
    if endpoint(edge) != vertex_id {
        return Err(LayoutError::GraphIntegrity {
            reference: edge_id.to_string(),
            detail: format!(
                "edge {} -> {} is listed on vertex {vertex_id}",
                edge.from_vertex, edge.to_vertex
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HIVE_QUERY: &str = r#"{
        "vertices": [
            { "id": "Map1", "name": "Map 1", "type": "MAP",
              "operations": ["TableScan", "Select Operator", "Reduce Output Operator"],
              "outgoingEdges": ["e1"], "state": "SUCCEEDED", "duration": 1200,
              "fileReadBytes": 10, "hdfsReadBytes": 4086, "recordReadCount": 500 },
            { "id": "Reducer2", "name": "Reducer 2", "type": "REDUCE",
              "incomingEdges": ["e1"], "tasksCount": 4 }
        ],
        "edges": [
            { "id": "e1", "fromVertex": "Map1", "toVertex": "Reducer2", "edgeType": "SCATTER_GATHER" }
        ]
    }"#;

    #[test]
    fn parses_vertices_and_edges() {
        let dag = parse_topology(HIVE_QUERY).unwrap();
        assert_eq!(dag.len(), 2);
        let map = dag.vertex("Map1").unwrap();
        assert_eq!(map.name, "Map 1");
        assert_eq!(map.kind, VertexType::Map);
        assert_eq!(map.operations.len(), 3);
        assert_eq!(map.state.as_deref(), Some("SUCCEEDED"));
        assert_eq!(map.counters.hdfs_read_bytes, Some(4086));
        let reducer = dag.vertex("Reducer2").unwrap();
        assert_eq!(reducer.counters.tasks_count, Some(4));
        assert_eq!(dag.edges[0].edge_type, EdgeType::ScatterGather);
    }

    #[test]
    fn decodes_operation_plans() {
        let input = r#"{
            "vertices": [
                { "id": "Map1", "operationPlan": "{\"TableScan\": {\"alias:\": \"t\"}}" },
                { "id": "Map2", "operationPlan": { "TableScan": { "alias:": "u" } } },
                { "id": "Map3", "operationPlan": "not a plan" }
            ]
        }"#;
        let dag = parse_topology(input).unwrap();
        let alias = |id: &str| dag.vertex(id).unwrap().operation_plan("TableScan", 0);
        assert_eq!(alias("Map1"), vec![("alias:".to_string(), "t".to_string())]);
        assert_eq!(alias("Map2"), vec![("alias:".to_string(), "u".to_string())]);
        assert!(dag.vertex("Map3").unwrap().operation_plan.is_none());
    }

    #[test]
    fn name_defaults_to_id() {
        let dag = parse_topology(r#"{ "vertices": [{ "id": "Union 3" }] }"#).unwrap();
        let vertex = dag.vertex("Union 3").unwrap();
        assert_eq!(vertex.name, "Union 3");
        assert_eq!(vertex.kind, VertexType::Unknown);
    }

    #[test]
    fn rejects_dangling_edge_endpoint() {
        let input = r#"{
            "vertices": [{ "id": "Map1" }],
            "edges": [{ "fromVertex": "Map1", "toVertex": "Reducer9" }]
        }"#;
        match parse_topology(input) {
            Err(TopologyError::Layout(LayoutError::GraphIntegrity { reference, .. })) => {
                assert_eq!(reference, "Reducer9")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_mismatched_vertex_edge_lists() {
        let input = r#"{
            "vertices": [
                { "id": "Map1", "incomingEdges": ["e1"] },
                { "id": "Reducer2" }
            ],
            "edges": [{ "id": "e1", "fromVertex": "Map1", "toVertex": "Reducer2" }]
        }"#;
        assert!(matches!(
            parse_topology(input),
            Err(TopologyError::Layout(LayoutError::GraphIntegrity { .. }))
        ));

        let missing = r#"{ "vertices": [{ "id": "Map1", "outgoingEdges": ["e7"] }] }"#;
        assert!(matches!(
            parse_topology(missing),
            Err(TopologyError::Layout(LayoutError::GraphIntegrity { reference, .. })) if reference == "e7"
        ));
    }

    #[test]
    fn accepts_json5_fixtures() {
        let input = "{\n  // hand written\n  vertices: [{ id: 'Map1', type: 'MAP', },],\n}";
        let dag = parse_topology(input).unwrap();
        assert_eq!(dag.vertex("Map1").map(|v| v.kind), Some(VertexType::Map));
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(matches!(
            parse_topology("{ vertices: "),
            Err(TopologyError::Syntax(_))
        ));
    }
}
