use crate::config::LayoutConfig;

use super::ranking::Ranking;

/// Box size for a vertex: fixed width, one extra band of height for every
/// row of operations.
pub(super) fn vertex_size(operation_count: usize, config: &LayoutConfig) -> (f32, f32) {
    let per_row = config.operations_per_row.max(1);
    let op_rows = operation_count.div_ceil(per_row);
    let draw_height = config.vertex_height + op_rows as f32 * config.operation_row_height;
    (
        config.vertex_width * config.vertex_scale,
        draw_height * config.vertex_scale,
    )
}

/// Effective width of every vertex.
///
/// Each vertex starts at `width + x_gap`. Rows are visited top-down; a vertex
/// reserves at least its children's widths, with a shared child split evenly
/// between its parents. Whenever a vertex grows, the same increase is added to
/// every parent, recursively, so ancestors always cover the subtree below.
pub(super) fn effective_widths(ranking: &Ranking, widths: &[f32], config: &LayoutConfig) -> Vec<f32> {
    let gap = config.x_gap;
    let mut effective: Vec<f32> = widths.iter().map(|w| w + gap).collect();

    for row in &ranking.rows {
        for &idx in row {
            let children = &ranking.children[idx];
            let mut target = widths[idx] + gap;
            if !children.is_empty() {
                let shared: f32 = children
                    .iter()
                    .map(|&child| {
                        let fan_in = ranking.parents[child].len().max(1) as f32;
                        (widths[child] + gap) / fan_in
                    })
                    .sum();
                target = target.max(shared);
            }
            grow(idx, target, &mut effective, &ranking.parents);
        }
    }

    effective
}

fn grow(vertex: usize, target: f32, effective: &mut [f32], parents: &[Vec<usize>]) {
    let mut pending = vec![(vertex, target)];
    while let Some((idx, new_width)) = pending.pop() {
        let diff = new_width - effective[idx];
        if diff <= 0.0 {
            continue;
        }
        effective[idx] = new_width;
        for &parent in &parents[idx] {
            pending.push((parent, effective[parent] + diff));
        }
    }
}
