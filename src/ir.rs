use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::layout::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VertexType {
    Map,
    Reduce,
    Union,
    Join,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    Broadcast,
    ScatterGather,
    Custom,
    OneToOne,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Raw per-vertex counters as reported by the job history payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexCounters {
    #[serde(default)]
    pub file_read_bytes: Option<u64>,
    #[serde(default)]
    pub hdfs_read_bytes: Option<u64>,
    #[serde(default)]
    pub file_write_bytes: Option<u64>,
    #[serde(default)]
    pub hdfs_write_bytes: Option<u64>,
    #[serde(default)]
    pub record_read_count: Option<u64>,
    #[serde(default)]
    pub record_write_count: Option<u64>,
    #[serde(default)]
    pub tasks_count: Option<u64>,
    #[serde(default)]
    pub spilled_records: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: String,
    pub name: String,
    pub kind: VertexType,
    pub operations: Vec<String>,
    pub state: Option<String>,
    pub duration: Option<u64>,
    pub counters: VertexCounters,
    /// Operator tree of the vertex (Hive explain output), if reported.
    pub operation_plan: Option<Value>,
}

impl Vertex {
    pub fn new(id: &str, kind: VertexType) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            operations: Vec::new(),
            state: None,
            duration: None,
            counters: VertexCounters::default(),
            operation_plan: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations = operations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_counters(mut self, counters: VertexCounters) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_operation_plan(mut self, plan: Value) -> Self {
        self.operation_plan = Some(plan);
        self
    }

    /// String properties of the `occurrence`-th (0-based) operator named `op`
    /// in this vertex's operation plan.
    pub fn operation_plan(&self, op: &str, occurrence: usize) -> Vec<(String, String)> {
        self.operation_plan
            .as_ref()
            .map(|plan| operator_properties(plan, op, occurrence))
            .unwrap_or_default()
    }
}

/// Depth-first search of `plan` for the `occurrence`-th object stored under
/// key `op`; returns its string-valued entries in document order.
pub fn operator_properties(plan: &Value, op: &str, occurrence: usize) -> Vec<(String, String)> {
    let mut remaining = occurrence;
    let Some(operator) = find_operator(plan, op, &mut remaining) else {
        return Vec::new();
    };
    operator
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|text| (key.clone(), text.to_string())))
        .collect()
}

fn find_operator<'a>(value: &'a Value, op: &str, remaining: &mut usize) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == op {
                    if let Value::Object(found) = child {
                        if *remaining == 0 {
                            return Some(found);
                        }
                        *remaining -= 1;
                    }
                }
                if let Some(found) = find_operator(child, op, remaining) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| find_operator(item, op, remaining)),
        _ => None,
    }
}

/// CSS status class for a vertex state; a failed job marks the vertex `failed`.
pub fn state_class(state: &str) -> String {
    if state.eq_ignore_ascii_case("JOBFAILED") {
        "failed".to_string()
    } else {
        state.to_ascii_lowercase()
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub edge_type: EdgeType,
}

/// Vertex arena plus the flat edge list. Vertices are addressed by their
/// insertion index; the id map only resolves external references.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<usize, LayoutError> {
        if self.index.contains_key(&vertex.id) {
            return Err(LayoutError::DuplicateVertex(vertex.id));
        }
        let idx = self.vertices.len();
        self.index.insert(vertex.id.clone(), idx);
        self.vertices.push(vertex);
        Ok(idx)
    }

    pub fn add_edge(&mut self, from: &str, to: &str, edge_type: EdgeType) -> Result<(), LayoutError> {
        for endpoint in [from, to] {
            if !self.index.contains_key(endpoint) {
                return Err(LayoutError::GraphIntegrity {
                    reference: endpoint.to_string(),
                    detail: format!("edge {from} -> {to} references an unknown vertex"),
                });
            }
        }
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            edge_type,
        });
        Ok(())
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.index_of(id).map(|idx| &self.vertices[idx])
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Outgoing adjacency by arena index, one entry per edge in edge order.
    pub fn outgoing(&self) -> Vec<Vec<usize>> {
        let mut outgoing = vec![Vec::new(); self.vertices.len()];
        for edge in &self.edges {
            if let (Some(from), Some(to)) = (self.index_of(&edge.from), self.index_of(&edge.to)) {
                outgoing[from].push(to);
            }
        }
        outgoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_vertices() {
        let mut dag = Dag::new();
        dag.add_vertex(Vertex::new("Map 1", VertexType::Map)).unwrap();
        let err = dag.add_vertex(Vertex::new("Map 1", VertexType::Reduce)).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateVertex(id) if id == "Map 1"));
    }

    #[test]
    fn rejects_dangling_edges() {
        let mut dag = Dag::new();
        dag.add_vertex(Vertex::new("Map 1", VertexType::Map)).unwrap();
        let err = dag
            .add_edge("Map 1", "Reducer 2", EdgeType::ScatterGather)
            .unwrap_err();
        match err {
            LayoutError::GraphIntegrity { reference, .. } => assert_eq!(reference, "Reducer 2"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(dag.edges.is_empty());
    }

    #[test]
    fn finds_operator_properties_by_occurrence() {
        let plan = serde_json::json!({
            "Map Operator Tree:": [{
                "TableScan": {
                    "alias:": "orders",
                    "children": {
                        "Select Operator": {
                            "expressions:": "o_id, o_total",
                            "outputColumnNames:": "_col0, _col1",
                            "children": {
                                "Select Operator": { "expressions:": "_col0" }
                            }
                        }
                    }
                }
            }]
        });
        let vertex = Vertex::new("Map 1", VertexType::Map).with_operation_plan(plan);
        assert_eq!(
            vertex.operation_plan("TableScan", 0),
            vec![("alias:".to_string(), "orders".to_string())]
        );
        assert_eq!(
            vertex.operation_plan("Select Operator", 0),
            vec![
                ("expressions:".to_string(), "o_id, o_total".to_string()),
                ("outputColumnNames:".to_string(), "_col0, _col1".to_string()),
            ]
        );
        assert_eq!(
            vertex.operation_plan("Select Operator", 1),
            vec![("expressions:".to_string(), "_col0".to_string())]
        );
        assert!(vertex.operation_plan("Select Operator", 2).is_empty());
        assert!(Vertex::new("Map 2", VertexType::Map).operation_plan("TableScan", 0).is_empty());
    }

    #[test]
    fn state_classes_are_lowercase() {
        assert_eq!(state_class("JOBFAILED"), "failed");
        assert_eq!(state_class("SUCCEEDED"), "succeeded");
        assert_eq!(state_class("RUNNING"), "running");
    }

    #[test]
    fn unknown_type_tokens_fall_back() {
        let kind: VertexType = serde_json::from_str("\"MAP\"").unwrap();
        assert_eq!(kind, VertexType::Map);
        let kind: VertexType = serde_json::from_str("\"PROCESSOR\"").unwrap();
        assert_eq!(kind, VertexType::Unknown);
        let edge: EdgeType = serde_json::from_str("\"SCATTER_GATHER\"").unwrap();
        assert_eq!(edge, EdgeType::ScatterGather);
        let edge: EdgeType = serde_json::from_str("\"ONE_TO_ONE\"").unwrap();
        assert_eq!(edge, EdgeType::OneToOne);
    }
}
