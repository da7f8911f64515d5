use serde::Serialize;
use tracing::debug;

use crate::config::{LayoutConfig, ViewConfig};
use crate::ir::Dag;
use crate::layout::{DagLayout, LayoutError, compute_layout};
use crate::metrics::{MetricKind, Metrics};

/// Signals a renderer listens to so it can recolour without a relayout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SelectionChanged(Option<String>),
    MetricTypeChanged(MetricKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub translate: (f32, f32),
}

impl Viewport {
    /// Scale range that lets the whole canvas fit, never zooming in past 1:1
    /// on the initial view.
    pub fn fit(width: f32, height: f32, canvas: (f32, f32), max_scale: f32) -> Self {
        let (canvas_width, canvas_height) = canvas;
        let mut min_scale = 1.0f32;
        if canvas_width > 0.0 && canvas_height > 0.0 {
            min_scale = (height / canvas_height).min(width / canvas_width).min(1.0);
        }
        Self {
            width,
            height,
            scale: min_scale,
            min_scale,
            max_scale: max_scale.max(min_scale),
            translate: (0.0, 0.0),
        }
    }
}

type Listener = Box<dyn FnMut(&ViewEvent)>;

/// Presentation state around a [`DagLayout`]: selection, active metric,
/// viewport, and the listeners notified when either signal fires.
pub struct DagView {
    layout: DagLayout,
    layout_config: LayoutConfig,
    view_config: ViewConfig,
    viewport: Viewport,
    listeners: Vec<Listener>,
}

impl DagView {
    pub fn new(dag: &Dag, layout_config: LayoutConfig, view_config: ViewConfig) -> Result<Self, LayoutError> {
        let layout = compute_layout(dag, &layout_config)?;
        let viewport = Viewport::fit(
            view_config.viewport_width,
            view_config.viewport_height,
            (layout.width, layout.height),
            view_config.max_zoom,
        );
        Ok(Self {
            layout,
            layout_config,
            view_config,
            viewport,
            listeners: Vec::new(),
        })
    }

    pub fn layout(&self) -> &DagLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn metric_type(&self) -> Option<MetricKind> {
        self.layout.metric_type
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ViewEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: ViewEvent) {
        debug!(?event, "view event");
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    /// Rebuilds the layout wholesale for a new topology. The selection
    /// survives when its vertex still exists; the metric type is reapplied.
    pub fn reload(&mut self, dag: &Dag) -> Result<(), LayoutError> {
        let selected = self.layout.selected().map(|node| node.id.clone());
        let metric_type = self.layout.metric_type;
        let mut layout = compute_layout(dag, &self.layout_config)?;
        layout.apply_metric_type(metric_type);

        let kept = selected
            .as_ref()
            .filter(|id| layout.node_index(id).is_some())
            .cloned();
        if let Some(id) = kept.as_deref() {
            layout.select(Some(id))?;
        }
        self.layout = layout;
        self.viewport = Viewport::fit(
            self.view_config.viewport_width,
            self.view_config.viewport_height,
            (self.layout.width, self.layout.height),
            self.view_config.max_zoom,
        );
        if selected.is_some() && kept.is_none() {
            self.emit(ViewEvent::SelectionChanged(None));
        }
        Ok(())
    }

    /// Selects `id` (or clears the selection). With `focus`, the viewport is
    /// translated so the vertex centre lands on the configured focus point.
    /// Screen coordinates are `canvas * scale + translate`.
    pub fn select_vertex(&mut self, id: Option<&str>, focus: bool) -> Result<(), LayoutError> {
        let changed = self.layout.select(id)?;
        if focus {
            if let Some(node) = self.layout.selected() {
                let (cx, cy) = node.center();
                let scale = self.viewport.scale;
                self.viewport.translate = (
                    self.view_config.focus_x - cx * scale,
                    self.view_config.focus_y - cy * scale,
                );
            }
        }
        if changed {
            self.emit(ViewEvent::SelectionChanged(id.map(str::to_string)));
        }
        Ok(())
    }

    pub fn set_metric_type(&mut self, kind: MetricKind) {
        let changed = self.layout.metric_type != Some(kind);
        self.layout.apply_metric_type(Some(kind));
        if changed {
            self.emit(ViewEvent::MetricTypeChanged(kind));
        }
    }

    pub fn update_metrics<I, S>(&mut self, snapshot: I) -> usize
    where
        I: IntoIterator<Item = (S, Metrics)>,
        S: AsRef<str>,
    {
        self.layout.update_metrics(snapshot)
    }

    /// Changes the zoom level, clamped to the viewport range. A selected
    /// vertex keeps its on-screen position.
    pub fn zoom(&mut self, scale: f32) {
        let new_scale = scale.clamp(self.viewport.min_scale, self.viewport.max_scale);
        let old_scale = self.viewport.scale;
        if let Some(node) = self.layout.selected() {
            let (cx, cy) = node.center();
            self.viewport.translate.0 += cx * (old_scale - new_scale);
            self.viewport.translate.1 += cy * (old_scale - new_scale);
        }
        self.viewport.scale = new_scale;
    }

    /// Drags a vertex to a new position; links follow its anchors.
    pub fn move_vertex(&mut self, id: &str, x: f32, y: f32) -> Result<(), LayoutError> {
        let node = self
            .layout
            .node_mut(id)
            .ok_or_else(|| LayoutError::UnknownVertex(id.to_string()))?;
        node.move_to(x, y);
        Ok(())
    }
}
