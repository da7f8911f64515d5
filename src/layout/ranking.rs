use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::ir::Dag;

use super::LayoutError;

/// Depth assignment result, all relations addressed by arena index.
#[derive(Debug, Clone, Default)]
pub(super) struct Ranking {
    pub depth: Vec<usize>,
    pub parents: Vec<Vec<usize>>,
    pub children: Vec<Vec<usize>>,
    pub rows: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Copy)]
struct Visit {
    depth: usize,
    parent: Option<usize>,
    vertex: usize,
}

/// Fails with the id of a vertex that lies on a cycle. Kahn's sweep finds the
/// unresolved set; walking predecessors inside it must revisit a vertex.
pub(super) fn ensure_acyclic(dag: &Dag, outgoing: &[Vec<usize>]) -> Result<(), LayoutError> {
    let n = outgoing.len();
    let mut indeg = vec![0usize; n];
    for targets in outgoing {
        for &to in targets {
            indeg[to] += 1;
        }
    }
    let mut ready: VecDeque<usize> = (0..n).filter(|&idx| indeg[idx] == 0).collect();
    let mut resolved = vec![false; n];
    let mut count = 0;
    while let Some(idx) = ready.pop_front() {
        resolved[idx] = true;
        count += 1;
        for &to in &outgoing[idx] {
            indeg[to] -= 1;
            if indeg[to] == 0 {
                ready.push_back(to);
            }
        }
    }
    if count == n {
        return Ok(());
    }

    let Some(start) = (0..n).find(|&idx| !resolved[idx]) else {
        return Ok(());
    };
    let mut seen: HashSet<usize> = HashSet::new();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            break;
        }
        // Every unresolved vertex keeps an unresolved predecessor.
        let next = (0..n).find(|&from| !resolved[from] && outgoing[from].contains(&current));
        match next {
            Some(from) => current = from,
            None => break,
        }
    }
    Err(LayoutError::CyclicGraph {
        vertex: dag.vertices[current].id.clone(),
    })
}

/// Breadth-first depth assignment where the deepest incoming path wins.
///
/// A vertex is expanded once, but its depth can still be relaxed later. A
/// relaxation marks the vertex dirty and pushes every already-linked
/// descendant through the same work list, so depths only ever grow and each
/// one stays below the vertex count.
pub(super) fn assign_depths(dag: &Dag, outgoing: &[Vec<usize>]) -> Result<Ranking, LayoutError> {
    let n = outgoing.len();
    let mut has_incoming = vec![false; n];
    for targets in outgoing {
        for &to in targets {
            has_incoming[to] = true;
        }
    }

    let mut depth: Vec<Option<usize>> = vec![None; n];
    let mut expanded = vec![false; n];
    let mut ranking = Ranking {
        depth: Vec::new(),
        parents: vec![Vec::new(); n],
        children: vec![Vec::new(); n],
        rows: Vec::new(),
    };

    let mut queue: VecDeque<Visit> = (0..n)
        .filter(|&idx| !has_incoming[idx])
        .map(|vertex| Visit {
            depth: 0,
            parent: None,
            vertex,
        })
        .collect();

    while let Some(visit) = queue.pop_front() {
        let mut target = visit.depth;
        if let Some(parent) = visit.parent {
            // The parent may have been pushed deeper since this visit was queued.
            let parent_depth = depth[parent].unwrap_or(0);
            target = target.max(parent_depth + 1);
        }

        match depth[visit.vertex] {
            None => {
                ensure_row(&mut ranking.rows, target);
                ranking.rows[target].push(visit.vertex);
                depth[visit.vertex] = Some(target);
            }
            Some(current) if target > current => {
                relax(dag, &mut ranking, &mut depth, visit.vertex, target)?;
            }
            Some(_) => {}
        }

        if let Some(parent) = visit.parent {
            if !ranking.children[parent].contains(&visit.vertex) {
                ranking.children[parent].push(visit.vertex);
                ranking.parents[visit.vertex].push(parent);
            }
        }

        if !expanded[visit.vertex] {
            expanded[visit.vertex] = true;
            let vertex_depth = depth[visit.vertex].unwrap_or(target);
            for &child in &outgoing[visit.vertex] {
                queue.push_back(Visit {
                    depth: vertex_depth + 1,
                    parent: Some(visit.vertex),
                    vertex: child,
                });
            }
        }
    }

    let mut resolved = Vec::with_capacity(n);
    for (idx, value) in depth.iter().enumerate() {
        match value {
            Some(d) => resolved.push(*d),
            None => {
                return Err(LayoutError::CyclicGraph {
                    vertex: dag.vertices[idx].id.clone(),
                });
            }
        }
    }
    ranking.depth = resolved;
    debug!(
        vertices = n,
        rows = ranking.rows.len(),
        "assigned vertex depths"
    );
    Ok(ranking)
}

fn ensure_row(rows: &mut Vec<Vec<usize>>, depth: usize) {
    while rows.len() <= depth {
        rows.push(Vec::new());
    }
}

fn relax(
    dag: &Dag,
    ranking: &mut Ranking,
    depth: &mut [Option<usize>],
    vertex: usize,
    target: usize,
) -> Result<(), LayoutError> {
    let limit = depth.len();
    let mut dirty = vec![(vertex, target)];
    while let Some((idx, new_depth)) = dirty.pop() {
        let Some(current) = depth[idx] else {
            continue;
        };
        if new_depth <= current {
            continue;
        }
        if new_depth >= limit {
            return Err(LayoutError::CyclicGraph {
                vertex: dag.vertices[idx].id.clone(),
            });
        }
        if let Some(pos) = ranking.rows[current].iter().position(|&v| v == idx) {
            ranking.rows[current].remove(pos);
        }
        ensure_row(&mut ranking.rows, new_depth);
        ranking.rows[new_depth].push(idx);
        depth[idx] = Some(new_depth);
        for &child in &ranking.children[idx] {
            dirty.push((child, new_depth + 1));
        }
    }
    Ok(())
}

/// Stable-sorts every row by the concatenated names of each vertex's children
/// so vertices feeding the same consumers sit next to each other.
pub(super) fn order_rows(dag: &Dag, ranking: &mut Ranking) {
    for row in ranking.rows.iter_mut() {
        if row.len() <= 1 {
            continue;
        }
        row.sort_by_cached_key(|&idx| {
            ranking.children[idx]
                .iter()
                .map(|&child| dag.vertices[child].name.as_str())
                .collect::<String>()
        });
    }
}
