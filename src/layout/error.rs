use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("dangling reference '{reference}': {detail}")]
    GraphIntegrity { reference: String, detail: String },
    #[error("duplicate vertex id '{0}'")]
    DuplicateVertex(String),
    #[error("topology is not acyclic: vertex '{vertex}' is part of a cycle")]
    CyclicGraph { vertex: String },
    #[error("unknown vertex '{0}'")]
    UnknownVertex(String),
}
