use tracing::{debug, warn};

use crate::ir::VertexType;
use crate::metrics::{MetricKind, Metrics, UNKNOWN, metric_display, metric_percent};

use super::DagLayout;

impl DagLayout {
    /// Recomputes `min_metrics`/`max_metrics` over the known values of every
    /// vertex. A metric nobody reports keeps `-1` on both ends.
    pub fn refresh_metric_ranges(&mut self) {
        let mut min = Metrics::unknown();
        let mut max = Metrics::unknown();
        for node in &self.nodes {
            for kind in MetricKind::ALL {
                let value = node.metrics.get(kind);
                if value < 0 {
                    continue;
                }
                let lo = min.get(kind);
                if lo == UNKNOWN || value < lo {
                    min.set(kind, value);
                }
                if value > max.get(kind) {
                    max.set(kind, value);
                }
            }
        }
        self.min_metrics = min;
        self.max_metrics = max;
    }

    /// Recolours every vertex for `kind` without touching the layout.
    pub fn apply_metric_type(&mut self, kind: Option<MetricKind>) {
        self.metric_type = kind;
        for node in &mut self.nodes {
            node.metric_type = kind;
            match kind {
                Some(kind) => {
                    let value = node.metrics.get(kind);
                    node.metric_percent = metric_percent(
                        value,
                        self.min_metrics.get(kind),
                        self.max_metrics.get(kind),
                    );
                    // Union vertices only merge inputs; their figures are not shown.
                    node.metric_display = if node.kind == VertexType::Union {
                        String::new()
                    } else {
                        metric_display(kind, value)
                    };
                }
                None => {
                    node.metric_percent = UNKNOWN as i32;
                    node.metric_display.clear();
                }
            }
        }
    }

    /// Replaces the metrics of the listed vertices, then refreshes ranges and
    /// percentages. Returns how many vertices were updated.
    pub fn update_metrics<I, S>(&mut self, snapshot: I) -> usize
    where
        I: IntoIterator<Item = (S, Metrics)>,
        S: AsRef<str>,
    {
        let mut updated = 0;
        for (id, metrics) in snapshot {
            let id = id.as_ref();
            match self.node_index(id) {
                Some(idx) => {
                    self.nodes[idx].metrics = metrics;
                    updated += 1;
                }
                None => warn!(vertex = id, "skipping metrics for unknown vertex"),
            }
        }
        self.refresh_metric_ranges();
        self.apply_metric_type(self.metric_type);
        debug!(updated, "refreshed vertex metrics");
        updated
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LayoutConfig;
    use crate::ir::{Dag, Vertex, VertexType};
    use crate::layout::compute_layout;
    use crate::metrics::{MetricKind, Metrics};

    fn three_vertices() -> crate::layout::DagLayout {
        let mut dag = Dag::new();
        for id in ["Map 1", "Map 2", "Map 3"] {
            dag.add_vertex(Vertex::new(id, VertexType::Map)).unwrap();
        }
        compute_layout(&dag, &LayoutConfig::default()).unwrap()
    }

    fn with_input(value: i64) -> Metrics {
        Metrics {
            input: value,
            ..Metrics::unknown()
        }
    }

    #[test]
    fn middle_value_is_fifty_percent() {
        let mut layout = three_vertices();
        layout.apply_metric_type(Some(MetricKind::Input));
        layout.update_metrics([
            ("Map 1", with_input(10)),
            ("Map 2", with_input(50)),
            ("Map 3", with_input(90)),
        ]);
        assert_eq!(layout.min_metrics.input, 10);
        assert_eq!(layout.max_metrics.input, 90);
        let percents: Vec<i32> = layout.nodes.iter().map(|n| n.metric_percent).collect();
        assert_eq!(percents, vec![0, 50, 100]);
        assert_eq!(layout.nodes[1].metric_display, "50 Bytes");
    }

    #[test]
    fn equal_values_have_no_heat() {
        let mut layout = three_vertices();
        layout.update_metrics([
            ("Map 1", with_input(7)),
            ("Map 2", with_input(7)),
            ("Map 3", with_input(7)),
        ]);
        layout.apply_metric_type(Some(MetricKind::Input));
        assert!(layout.nodes.iter().all(|n| n.metric_percent == -1));
    }

    #[test]
    fn unknown_values_are_excluded_from_ranges() {
        let mut layout = three_vertices();
        let updated = layout.update_metrics([
            ("Map 1", with_input(20)),
            ("Map 3", with_input(40)),
            ("Map 9", with_input(1)),
        ]);
        assert_eq!(updated, 2);
        layout.apply_metric_type(Some(MetricKind::Input));
        assert_eq!(layout.min_metrics.input, 20);
        assert_eq!(layout.nodes[1].metric_percent, -1);
        assert_eq!(layout.nodes[1].metric_display, "");
        assert_eq!(layout.min_metrics.tez_tasks, -1);
        assert_eq!(layout.max_metrics.tez_tasks, -1);
    }

    #[test]
    fn union_vertices_hide_their_figures() {
        let mut dag = Dag::new();
        dag.add_vertex(Vertex::new("Map 1", VertexType::Map)).unwrap();
        dag.add_vertex(Vertex::new("Union 2", VertexType::Union)).unwrap();
        let mut layout = compute_layout(&dag, &LayoutConfig::default()).unwrap();
        layout.update_metrics([("Map 1", with_input(10)), ("Union 2", with_input(30))]);
        layout.apply_metric_type(Some(MetricKind::Input));
        assert_eq!(layout.nodes[0].metric_display, "10 Bytes");
        assert_eq!(layout.nodes[1].metric_display, "");
        assert_eq!(layout.nodes[1].metric_percent, 100);
    }
}
