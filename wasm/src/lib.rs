use serde::Deserialize;
use tez_dag_layout::{
    DagView, LayoutConfig, LayoutDump, MetricKind, ViewConfig, parse_topology,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TezLayoutOptions {
    metric_type: Option<MetricKind>,
    selected_vertex: Option<String>,
    x_gap: Option<f32>,
    y_gap: Option<f32>,
    viewport_width: Option<f32>,
    viewport_height: Option<f32>,
}

fn build_configs(options: &TezLayoutOptions) -> (LayoutConfig, ViewConfig) {
    let mut layout = LayoutConfig::default();
    if let Some(x_gap) = options.x_gap {
        layout.x_gap = x_gap;
    }
    if let Some(y_gap) = options.y_gap {
        layout.y_gap = y_gap;
    }
    let mut view = ViewConfig::default();
    if let Some(width) = options.viewport_width {
        view.viewport_width = width;
    }
    if let Some(height) = options.viewport_height {
        view.viewport_height = height;
    }
    (layout, view)
}

fn layout_json(topology: &str, options: TezLayoutOptions) -> Result<String, String> {
    let dag = parse_topology(topology).map_err(|error| error.to_string())?;
    let (layout_config, view_config) = build_configs(&options);
    let mut view =
        DagView::new(&dag, layout_config, view_config).map_err(|error| error.to_string())?;
    if let Some(kind) = options.metric_type {
        view.set_metric_type(kind);
    }
    if let Some(id) = options.selected_vertex.as_deref() {
        view.select_vertex(Some(id), true)
            .map_err(|error| error.to_string())?;
    }
    serde_json::to_string(&LayoutDump::from_view(&view)).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn layout_tez_dag(topology_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TezLayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TezLayoutOptions::default()
    };

    layout_json(topology_json, options).map_err(|error| JsValue::from_str(&error))
}
