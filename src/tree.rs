//! Location Tree Utilities
//!
//! Builds the location forest from a flat list and renders it for display.

use std::collections::{HashMap, HashSet};

use crate::models::Location;

pub use hms_backend::domain::compute_path;

/// A location with its direct children
#[derive(Debug, Clone, PartialEq)]
pub struct LocationNode {
    pub location: Location,
    pub children: Vec<LocationNode>,
}

impl LocationNode {
    /// Number of locations in this subtree, self included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(LocationNode::size).sum::<usize>()
    }
}

/// Build a forest from `locations`.
///
/// Locations whose parent is absent from the input become roots. Children
/// keep their relative input order. Every input location appears exactly
/// once; a cycle (never written by the services) is broken at its first
/// member in input order, which becomes a root.
pub fn build_tree(locations: &[Location]) -> Vec<LocationNode> {
    let index: HashMap<&str, usize> = locations
        .iter()
        .enumerate()
        .map(|(i, l)| (l.id.as_str(), i))
        .collect();

    let mut children_map: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (i, location) in locations.iter().enumerate() {
        match location.parent_id.as_deref().and_then(|p| index.get(p)) {
            Some(&parent) if parent != i => children_map.entry(parent).or_default().push(i),
            _ => roots.push(i),
        }
    }

    fn collect(
        i: usize,
        locations: &[Location],
        children_map: &HashMap<usize, Vec<usize>>,
        placed: &mut HashSet<usize>,
    ) -> LocationNode {
        placed.insert(i);
        let children = children_map
            .get(&i)
            .map(|kids| {
                kids.iter()
                    .filter(|k| !placed.contains(*k))
                    .copied()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
            .into_iter()
            .map(|k| collect(k, locations, children_map, placed))
            .collect();
        LocationNode {
            location: locations[i].clone(),
            children,
        }
    }

    let mut placed = HashSet::new();
    let mut forest: Vec<(usize, LocationNode)> = roots
        .into_iter()
        .map(|r| (r, collect(r, locations, &children_map, &mut placed)))
        .collect();

    // Whatever is left hangs off a cycle
    for i in 0..locations.len() {
        if !placed.contains(&i) {
            tracing::warn!("location {} is part of a parent cycle", locations[i].id);
            forest.push((i, collect(i, locations, &children_map, &mut placed)));
        }
    }

    forest.sort_by_key(|(i, _)| *i);
    forest.into_iter().map(|(_, node)| node).collect()
}

/// Render the forest depth-first, returning (location, depth) pairs in
/// display order
pub fn flatten_tree(forest: &[LocationNode]) -> Vec<(Location, usize)> {
    fn collect(nodes: &[LocationNode], depth: usize, result: &mut Vec<(Location, usize)>) {
        for node in nodes {
            result.push((node.location.clone(), depth));
            collect(&node.children, depth + 1, result);
        }
    }

    let mut result = Vec::new();
    collect(forest, 0, &mut result);
    result
}

/// Ids of locations whose stored path differs from the one implied by the
/// current parent chain. Moving a location does not rewrite the paths of
/// its descendants, so these show up after reparenting a subtree.
pub fn find_stale_paths(locations: &[Location]) -> Vec<String> {
    let by_id: HashMap<&str, &Location> = locations.iter().map(|l| (l.id.as_str(), l)).collect();

    locations
        .iter()
        .filter(|location| {
            let mut expected = vec![location.id.clone()];
            let mut seen = HashSet::from([location.id.as_str()]);
            let mut current = location.parent_id.as_deref();
            while let Some(parent) = current.and_then(|id| by_id.get(id)) {
                if !seen.insert(parent.id.as_str()) {
                    break;
                }
                expected.push(parent.id.clone());
                current = parent.parent_id.as_deref();
            }
            expected.reverse();
            expected != location.path
        })
        .map(|l| l.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_location(id: &str, parent_id: Option<&str>, path: &[&str]) -> Location {
        Location {
            id: id.to_string(),
            household_id: "h1".to_string(),
            name: format!("Location {}", id),
            description: None,
            parent_id: parent_id.map(String::from),
            icon: None,
            color: None,
            qr_code: None,
            item_count: 0,
            path: path.iter().map(|s| s.to_string()).collect(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn ids(nodes: &[LocationNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.location.id.as_str()).collect()
    }

    #[test]
    fn test_build_tree() {
        let locations = vec![
            make_location("garage", None, &["garage"]),
            make_location("shelf", Some("garage"), &["garage", "shelf"]),
            make_location("kitchen", None, &["kitchen"]),
            make_location("bin", Some("shelf"), &["garage", "shelf", "bin"]),
            make_location("drawer", Some("garage"), &["garage", "drawer"]),
        ];

        let forest = build_tree(&locations);
        assert_eq!(ids(&forest), vec!["garage", "kitchen"]);
        assert_eq!(ids(&forest[0].children), vec!["shelf", "drawer"]);
        assert_eq!(ids(&forest[0].children[0].children), vec!["bin"]);
        assert_eq!(forest.iter().map(LocationNode::size).sum::<usize>(), 5);
    }

    #[test]
    fn test_orphans_become_roots() {
        let locations = vec![
            make_location("a", Some("deleted"), &["deleted", "a"]),
            make_location("b", Some("a"), &["deleted", "a", "b"]),
        ];
        let forest = build_tree(&locations);
        assert_eq!(ids(&forest), vec!["a"]);
        assert_eq!(ids(&forest[0].children), vec!["b"]);
    }

    #[test]
    fn test_cycle_members_appear_once() {
        let locations = vec![
            make_location("root", None, &["root"]),
            make_location("x", Some("y"), &["y", "x"]),
            make_location("y", Some("x"), &["x", "y"]),
            make_location("self", Some("self"), &["self"]),
        ];
        let forest = build_tree(&locations);
        let flat = flatten_tree(&forest);

        let mut seen: Vec<&str> = flat.iter().map(|(l, _)| l.id.as_str()).collect();
        seen.sort();
        assert_eq!(seen, vec!["root", "self", "x", "y"]);
        assert_eq!(ids(&forest), vec!["root", "x", "self"]);
        assert_eq!(ids(&forest[1].children), vec!["y"]);
    }

    #[test]
    fn test_build_tree_empty() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_flatten_tree() {
        let locations = vec![
            make_location("1", None, &["1"]),
            make_location("2", None, &["2"]),
            make_location("3", Some("1"), &["1", "3"]),
            make_location("4", Some("1"), &["1", "4"]),
            make_location("5", Some("3"), &["1", "3", "5"]),
        ];

        let flat = flatten_tree(&build_tree(&locations));
        let order: Vec<(&str, usize)> = flat.iter().map(|(l, d)| (l.id.as_str(), *d)).collect();
        assert_eq!(
            order,
            vec![("1", 0), ("3", 1), ("5", 2), ("4", 1), ("2", 0)]
        );
    }

    #[test]
    fn test_find_stale_paths_after_subtree_move() {
        // "shelf" moved from garage to kitchen; "bin" kept its old path
        let locations = vec![
            make_location("garage", None, &["garage"]),
            make_location("kitchen", None, &["kitchen"]),
            make_location("shelf", Some("kitchen"), &["kitchen", "shelf"]),
            make_location("bin", Some("shelf"), &["garage", "shelf", "bin"]),
        ];
        assert_eq!(find_stale_paths(&locations), vec!["bin"]);
    }

    #[test]
    fn test_compute_path_reexport() {
        let parent = make_location("garage", None, &["garage"]);
        assert_eq!(
            compute_path("shelf", Some("garage"), |_| Some(parent)),
            vec!["garage", "shelf"]
        );
    }
}
