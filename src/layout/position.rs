use std::collections::HashMap;

use crate::config::LayoutConfig;

use super::ranking::Ranking;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct Placement {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub(super) struct Positions {
    pub placements: Vec<Placement>,
    pub width: f32,
    pub height: f32,
}

pub(super) fn assign_positions(
    ranking: &Ranking,
    sizes: &[(f32, f32)],
    effective: &[f32],
    config: &LayoutConfig,
) -> Positions {
    let mut placements = vec![Placement::default(); sizes.len()];

    let mut current_y = config.top_margin;
    let mut last_row_y = current_y;
    let mut last_row_height = 0.0f32;
    for row in &ranking.rows {
        let row_height = row
            .iter()
            .map(|&idx| sizes[idx].1)
            .fold(0.0f32, f32::max);
        for &idx in row {
            placements[idx].y = current_y;
        }
        last_row_y = current_y;
        last_row_height = row_height;
        current_y += row_height + config.y_gap;
    }

    let mut max_x = 0.0f32;
    for row in &ranking.rows {
        let mut root_cursor = 0.0f32;
        // Full siblings share one cursor, keyed by their ordered parent list;
        // unrelated groups in the same row keep independent ones.
        let mut group_cursor: HashMap<&[usize], f32> = HashMap::new();
        for &idx in row {
            let parents = &ranking.parents[idx];
            let start = if parents.is_empty() {
                let start = root_cursor;
                root_cursor += effective[idx];
                start
            } else {
                let parent_mid = parents
                    .iter()
                    .map(|&parent| placements[parent].x + sizes[parent].0 / 2.0)
                    .sum::<f32>()
                    / parents.len() as f32;
                let group_width: f32 = ranking.children[parents[0]]
                    .iter()
                    .map(|&child| effective[child])
                    .sum();
                let cursor = group_cursor
                    .entry(parents.as_slice())
                    .or_insert(parent_mid - group_width / 2.0);
                let start = *cursor;
                *cursor += effective[idx];
                start
            };
            let x = start + (effective[idx] - sizes[idx].0) / 2.0;
            placements[idx].x = x;
            max_x = max_x.max(x + sizes[idx].0);
        }
    }

    if ranking.rows.is_empty() {
        return Positions {
            placements,
            width: 0.0,
            height: 0.0,
        };
    }
    Positions {
        placements,
        width: max_x + config.x_gap * 2.0,
        height: last_row_y + last_row_height,
    }
}
