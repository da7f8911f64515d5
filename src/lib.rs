#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod metrics;
pub mod parser;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewConfig, load_config};
pub use ir::{Dag, Edge, EdgeType, Vertex, VertexCounters, VertexType};
pub use layout::{DagLayout, LayoutError, LinkLayout, VertexLayout, compute_layout};
pub use layout_dump::{LayoutDump, write_layout_dump};
pub use metrics::{HeatBand, MetricKind, Metrics};
pub use parser::{TopologyError, parse_topology};
pub use view::{DagView, ViewEvent, Viewport};
