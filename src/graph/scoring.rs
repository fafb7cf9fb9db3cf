//! Path rendering, depth and average-frequency scoring.

use super::{RawPath, ScoredPath};
use crate::error::{KgpathError, Result};

const SEPARATOR: &str = "--";

/// Render a path as `(node)--[relation]--(node)...` from source to target.
pub fn render_path(path: &RawPath) -> String {
    let mut tokens = Vec::with_capacity(path.nodes.len() + path.edges.len());
    for (i, node) in path.nodes.iter().enumerate() {
        if i > 0 {
            if let Some(edge) = path.edges.get(i - 1) {
                tokens.push(format!("[{}]", edge.relation_type));
            }
        }
        tokens.push(format!("({})", node.name));
    }
    tokens.join(SEPARATOR)
}

/// Score one raw path: depth is its edge count, score the mean edge frequency.
///
/// Fails with [`KgpathError::InvalidPath`] for a path with no edges or whose
/// node count is not edge count + 1.
pub fn score_path(path: &RawPath) -> Result<ScoredPath> {
    let depth = path.edges.len();
    if depth == 0 {
        return Err(KgpathError::InvalidPath(format!(
            "path with {} node(s) has no edges",
            path.nodes.len()
        )));
    }
    if path.nodes.len() != depth + 1 {
        return Err(KgpathError::InvalidPath(format!(
            "{} nodes for {} edges",
            path.nodes.len(),
            depth
        )));
    }

    let total: u64 = path.edges.iter().map(|e| e.frequency).sum();
    Ok(ScoredPath {
        rendering: render_path(path),
        depth,
        score: total as f64 / depth as f64,
    })
}

/// Score every path, dropping the ones that cannot be scored.
pub fn score_paths(paths: &[RawPath]) -> Vec<ScoredPath> {
    paths
        .iter()
        .filter_map(|p| match score_path(p) {
            Ok(scored) => Some(scored),
            Err(e) => {
                log::warn!("Dropping path {}: {}", render_path(p), e);
                None
            }
        })
        .collect()
}

/// Sort by score, highest first. Equal scores keep no particular order.
pub fn rank_paths(paths: &mut [ScoredPath]) {
    paths.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PathEdge, PathNode};

    fn path(names: &[&str], edges: &[(&str, u64)]) -> RawPath {
        RawPath {
            nodes: names
                .iter()
                .map(|n| PathNode { name: n.to_string(), tag: "T".to_string() })
                .collect(),
            edges: edges
                .iter()
                .map(|(r, f)| PathEdge { relation_type: r.to_string(), frequency: *f })
                .collect(),
        }
    }

    #[test]
    fn test_single_edge_path() {
        let scored = score_path(&path(&["A", "B"], &[("treats", 2)])).unwrap();
        assert_eq!(scored.rendering, "(A)--[treats]--(B)");
        assert_eq!(scored.depth, 1);
        assert!((scored.score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_mean_within_bounds() {
        let freqs = [3u64, 1, 8, 5];
        let raw = path(
            &["A", "B", "C", "D", "E"],
            &[("r1", freqs[0]), ("r2", freqs[1]), ("r3", freqs[2]), ("r4", freqs[3])],
        );
        let scored = score_path(&raw).unwrap();
        let expected = freqs.iter().sum::<u64>() as f64 / freqs.len() as f64;
        assert!((scored.score - expected).abs() < 1e-9);
        assert!(scored.score >= *freqs.iter().min().unwrap() as f64);
        assert!(scored.score <= *freqs.iter().max().unwrap() as f64);
        assert_eq!(scored.depth, 4);
        assert_eq!(scored.rendering, "(A)--[r1]--(B)--[r2]--(C)--[r3]--(D)--[r4]--(E)");
    }

    #[test]
    fn test_fractional_score() {
        let scored = score_path(&path(&["A", "B", "C"], &[("x", 1), ("y", 2)])).unwrap();
        assert!((scored.score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_edge_path_is_invalid() {
        let err = score_path(&path(&["A"], &[])).unwrap_err();
        assert!(matches!(err, KgpathError::InvalidPath(_)));
    }

    #[test]
    fn test_misaligned_path_is_invalid() {
        let err = score_path(&path(&["A", "B", "C"], &[("x", 1)])).unwrap_err();
        assert!(matches!(err, KgpathError::InvalidPath(_)));
    }

    #[test]
    fn test_score_paths_drops_only_invalid() {
        let paths = vec![
            path(&["A", "B"], &[("x", 4)]),
            path(&["A"], &[]),
            path(&["A", "C", "B"], &[("y", 1), ("z", 1)]),
        ];
        let scored = score_paths(&paths);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].rendering, "(A)--[x]--(B)");
        assert_eq!(scored[1].depth, 2);
    }

    #[test]
    fn test_rank_descending() {
        let mut scored = score_paths(&[
            path(&["A", "B"], &[("x", 1)]),
            path(&["A", "C", "B"], &[("y", 9), ("z", 3)]),
            path(&["A", "D", "B"], &[("y", 2), ("z", 2)]),
        ]);
        rank_paths(&mut scored);
        let scores: Vec<f64> = scored.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![6.0, 2.0, 1.0]);
    }

    #[test]
    fn test_rank_empty() {
        let mut scored: Vec<ScoredPath> = Vec::new();
        rank_paths(&mut scored);
        assert!(scored.is_empty());
    }
}
