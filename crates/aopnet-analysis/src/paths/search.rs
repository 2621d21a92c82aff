//! Path search over neighbor lists.
//!
//! Both searches follow the neighbor order of the [`Adjacency`] they are
//! given, so results are reproducible for a fixed edge order. Ids missing
//! from the adjacency are treated as nodes without neighbors.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use aopnet_core::{Adjacency, ValidationError};
use serde::{Deserialize, Serialize};

use super::SearchBounds;

/// Output of [`k_shortest_paths`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSearch {
    /// Simple paths from start to end, shortest first.
    pub paths: Vec<Vec<String>>,
    /// Whether candidates were dropped because the frontier was full.
    pub frontier_truncated: bool,
}

/// Breadth-first shortest path.
///
/// Returns `[start]` when `start == end`, otherwise the first path found
/// that reaches `end`, or `None` when `end` is unreachable.
#[must_use]
pub fn shortest_path(adjacency: &Adjacency, start: &str, end: &str) -> Option<Vec<String>> {
    if start == end {
        return Some(vec![start.to_string()]);
    }

    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    parents.insert(start, start);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        for neighbor in adjacency.get(node).into_iter().flatten() {
            let neighbor = neighbor.as_str();
            if neighbor == end {
                let mut path = vec![end.to_string()];
                let mut cursor = node;
                while cursor != start {
                    path.push(cursor.to_string());
                    cursor = parents.get(cursor).copied().unwrap_or(start);
                }
                path.push(start.to_string());
                path.reverse();
                return Some(path);
            }
            if !parents.contains_key(neighbor) {
                parents.insert(neighbor, node);
                queue.push_back(neighbor);
            }
        }
    }
    None
}

/// Up to `k` simple paths from `start` to `end`, shortest first.
///
/// Candidates wait in a frontier ordered by length and then by insertion,
/// so equal-length paths come out in discovery order. A candidate is only
/// extended to nodes not already on it, and a candidate that reaches `end`
/// is emitted rather than extended. When the frontier holds
/// `bounds.max_frontier` candidates, further pushes are dropped and the
/// result is marked truncated.
///
/// # Errors
///
/// [`ValidationError::ZeroK`] when `k` is 0.
pub fn k_shortest_paths(
    adjacency: &Adjacency,
    start: &str,
    end: &str,
    k: usize,
    bounds: &SearchBounds,
) -> Result<PathSearch, ValidationError> {
    if k == 0 {
        return Err(ValidationError::ZeroK);
    }
    if start == end {
        return Ok(PathSearch {
            paths: vec![vec![start.to_string()]],
            frontier_truncated: false,
        });
    }

    let mut out = PathSearch::default();
    let mut frontier: BinaryHeap<Reverse<(usize, u64, Vec<String>)>> = BinaryHeap::new();
    let mut seq = 0_u64;
    frontier.push(Reverse((1, seq, vec![start.to_string()])));

    while out.paths.len() < k {
        let Some(Reverse((_, _, path))) = frontier.pop() else {
            break;
        };
        let Some(current) = path.last() else {
            continue;
        };
        if current == end {
            out.paths.push(path);
            continue;
        }
        for neighbor in adjacency.get(current.as_str()).into_iter().flatten() {
            if path.contains(neighbor) {
                continue;
            }
            if frontier.len() >= bounds.max_frontier {
                out.frontier_truncated = true;
                continue;
            }
            let mut next = path.clone();
            next.push(neighbor.clone());
            seq += 1;
            frontier.push(Reverse((next.len(), seq, next)));
        }
    }

    Ok(out)
}
