use crate::metrics::MetricKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub x_gap: f32,
    pub y_gap: f32,
    pub top_margin: f32,
    pub vertex_width: f32,
    pub vertex_height: f32,
    pub vertex_scale: f32,
    pub operations_per_row: usize,
    pub operation_row_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_gap: 20.0,
            y_gap: 70.0,
            top_margin: 40.0,
            vertex_width: 180.0,
            vertex_height: 40.0,
            vertex_scale: 1.0,
            operations_per_row: 3,
            operation_row_height: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub max_zoom: f32,
    /// Screen point a focused vertex is centred on.
    pub focus_x: f32,
    pub focus_y: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1200.0,
            viewport_height: 800.0,
            max_zoom: 2.0,
            focus_x: 225.0,
            focus_y: 250.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub view: ViewConfig,
    pub metric: Option<MetricKind>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    x_gap: Option<f32>,
    y_gap: Option<f32>,
    top_margin: Option<f32>,
    vertex_width: Option<f32>,
    vertex_height: Option<f32>,
    vertex_scale: Option<f32>,
    operations_per_row: Option<usize>,
    operation_row_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewConfigFile {
    viewport_width: Option<f32>,
    viewport_height: Option<f32>,
    max_zoom: Option<f32>,
    focus_x: Option<f32>,
    focus_y: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    view: Option<ViewConfigFile>,
    metric_type: Option<MetricKind>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = Config::default();
    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.x_gap {
            config.layout.x_gap = v;
        }
        if let Some(v) = layout.y_gap {
            config.layout.y_gap = v;
        }
        if let Some(v) = layout.top_margin {
            config.layout.top_margin = v;
        }
        if let Some(v) = layout.vertex_width {
            config.layout.vertex_width = v;
        }
        if let Some(v) = layout.vertex_height {
            config.layout.vertex_height = v;
        }
        if let Some(v) = layout.vertex_scale {
            config.layout.vertex_scale = v;
        }
        if let Some(v) = layout.operations_per_row {
            config.layout.operations_per_row = v.max(1);
        }
        if let Some(v) = layout.operation_row_height {
            config.layout.operation_row_height = v;
        }
    }
    if let Some(view) = parsed.view {
        if let Some(v) = view.viewport_width {
            config.view.viewport_width = v;
        }
        if let Some(v) = view.viewport_height {
            config.view.viewport_height = v;
        }
        if let Some(v) = view.max_zoom {
            config.view.max_zoom = v;
        }
        if let Some(v) = view.focus_x {
            config.view.focus_x = v;
        }
        if let Some(v) = view.focus_y {
            config.view.focus_y = v;
        }
    }
    config.metric = parsed.metric_type;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.x_gap, 20.0);
        assert_eq!(config.layout.y_gap, 70.0);
        assert_eq!(config.view.max_zoom, 2.0);
        assert!(config.metric.is_none());
    }

    #[test]
    fn overrides_only_listed_fields() {
        let config = parse_config(
            r#"{ "layout": { "xGap": 30, "operationsPerRow": 0 }, "metricType": "recordsRead" }"#,
        )
        .unwrap();
        assert_eq!(config.layout.x_gap, 30.0);
        assert_eq!(config.layout.y_gap, 70.0);
        assert_eq!(config.layout.operations_per_row, 1);
        assert_eq!(config.metric, Some(MetricKind::RecordsRead));
    }

    #[test]
    fn accepts_json5() {
        let config = parse_config(
            "{\n  // wider rows\n  view: { viewportWidth: 640, },\n}",
        )
        .unwrap();
        assert_eq!(config.view.viewport_width, 640.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_config("not a config").is_err());
    }
}
