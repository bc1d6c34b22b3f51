//! Defines `Paths`: an insertion-ordered collection of paths keyed by node
//! sequence, with an observation count per path.

use super::path::{retain_longest, Path};
use crate::config::{DuplicatePolicy, PathsConfig, SharedPolicy};
use crate::error::{NetworkError, Result};
use crate::graph::{AttrValue, Attributes};
use crate::store::{EdgeId, NodeId, PathKey};
use std::collections::{HashMap, HashSet};
use std::ops::Index;

/// A stored path and how often it was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    pub path: Path,
    pub frequency: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Paths {
    entries: Vec<PathEntry>,
    index: HashMap<PathKey, usize>,
    attributes: Attributes,
    config: PathsConfig,
}

impl Paths {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: &PathsConfig) -> Self {
        Self { config: config.clone(), ..Self::default() }
    }

    pub fn config(&self) -> &PathsConfig { &self.config }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(AttrValue::as_str)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.attributes.set("name", name.into());
    }

    pub fn attributes(&self) -> &Attributes { &self.attributes }

    pub fn get_attr(&self, key: &str) -> Option<&AttrValue> { self.attributes.get(key) }

    pub fn update_attributes(&mut self, attrs: &Attributes) {
        self.attributes.update(attrs);
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, i: usize) -> Option<&Path> { self.entries.get(i).map(|e| &e.path) }

    pub fn iter(&self) -> impl Iterator<Item = &Path> + '_ { self.entries.iter().map(|e| &e.path) }

    pub fn entries(&self) -> &[PathEntry] { &self.entries }

    pub fn contains(&self, path: &Path) -> bool { self.index.contains_key(&path.key()) }

    /// How often `path` was added; 0 if it is not stored.
    pub fn frequency_of(&self, path: &Path) -> u64 {
        self.index.get(&path.key()).map_or(0, |&i| self.entries[i].frequency)
    }

    /// Adds one observation of `path` and returns its frequency.
    pub fn add_path(&mut self, path: Path) -> Result<u64> {
        self.add_path_with_frequency(path, 1)
    }

    /// Adds `frequency` observations of `path` and returns its new frequency.
    ///
    /// A path whose node sequence is already stored is merged according to
    /// the duplicate policy; its attributes are not touched.
    pub fn add_path_with_frequency(&mut self, path: Path, frequency: u64) -> Result<u64> {
        if frequency == 0 {
            return Err(NetworkError::domain("frequency", 0.0, "must be at least 1"));
        }
        let key = path.key();
        if let Some(&i) = self.index.get(&key) {
            if self.config.duplicate_policy == DuplicatePolicy::Reject {
                return Err(NetworkError::DuplicateId(key.joined(&self.config.separator)));
            }
            let entry = &mut self.entries[i];
            entry.frequency += frequency;
            return Ok(entry.frequency);
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(PathEntry { path, frequency });
        Ok(frequency)
    }

    /// Adds several paths. Under `DuplicatePolicy::Reject` the batch is
    /// checked first, so a rejected batch adds nothing.
    pub fn add_paths_from<I: IntoIterator<Item = Path>>(&mut self, paths: I) -> Result<()> {
        let paths: Vec<Path> = paths.into_iter().collect();
        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            let mut seen = HashSet::new();
            for path in &paths {
                let key = path.key();
                if self.index.contains_key(&key) || !seen.insert(key.clone()) {
                    return Err(NetworkError::DuplicateId(key.joined(&self.config.separator)));
                }
            }
        }
        let count = paths.len();
        for path in paths {
            self.add_path(path)?;
        }
        log::debug!("Added {} paths; collection holds {}", count, self.len());
        Ok(())
    }

    /// Merges `other` into this collection, summing the frequencies of paths
    /// present in both regardless of the duplicate policy.
    pub fn update(&mut self, other: &Paths) {
        for entry in &other.entries {
            let key = entry.path.key();
            match self.index.get(&key) {
                Some(&i) => self.entries[i].frequency += entry.frequency,
                None => {
                    self.index.insert(key, self.entries.len());
                    self.entries.push(entry.clone());
                }
            }
        }
        self.attributes.update(&other.attributes);
    }

    // --- Queries ---

    /// Sub-paths shared by every stored path, per the configured policy.
    pub fn shared_paths(&self) -> Vec<Path> {
        let all: Vec<&Path> = self.iter().collect();
        self.shared_among(&all)
    }

    /// Sub-paths shared by the stored paths at `positions`.
    pub fn shared_paths_of(&self, positions: &[usize]) -> Result<Vec<Path>> {
        let selected = positions
            .iter()
            .map(|&i| self.get(i).ok_or(NetworkError::Range { start: i, end: i, len: self.len() }))
            .collect::<Result<Vec<&Path>>>()?;
        Ok(self.shared_among(&selected))
    }

    /// Pairwise reduction: the common runs of the first two paths are matched
    /// against the third, and so on. Each step is quadratic in path length.
    fn shared_among(&self, paths: &[&Path]) -> Vec<Path> {
        let min_nodes = self.config.min_shared_nodes.max(1);
        let Some((first, rest)) = paths.split_first() else {
            return Vec::new();
        };
        let mut candidates: Vec<Path> = if first.node_count() >= min_nodes {
            vec![(*first).clone()]
        } else {
            Vec::new()
        };
        for other in rest {
            let mut next: Vec<Path> = Vec::new();
            for candidate in &candidates {
                for shared in candidate.shared_paths_with(other, SharedPolicy::AllMaximal, min_nodes) {
                    if !next.iter().any(|p| p.nodes() == shared.nodes()) {
                        next.push(shared);
                    }
                }
            }
            candidates = drop_contained(next);
            if candidates.is_empty() {
                break;
            }
        }
        if self.config.shared_policy == SharedPolicy::LongestOnly {
            retain_longest(&mut candidates);
        }
        candidates
    }

    /// Paths stored in both collections, with the smaller of the two
    /// frequencies.
    pub fn intersection(&self, other: &Paths) -> Paths {
        let mut paths = Paths::with_config(&self.config);
        paths.set_name(format!(
            "intersection of {} and {}",
            self.name().unwrap_or("paths"),
            other.name().unwrap_or("paths")
        ));
        for entry in &self.entries {
            let theirs = other.frequency_of(&entry.path);
            if theirs > 0 {
                paths.push_entry(entry.path.clone(), entry.frequency.min(theirs));
            }
        }
        paths
    }

    /// Paths starting at `source` and ending at `target`.
    pub fn st_paths(&self, source: &NodeId, target: &NodeId) -> Paths {
        self.filtered(format!("st-paths between {} and {}", source, target), |p| {
            p.source() == Some(source) && p.terminal() == Some(target)
        })
    }

    /// Paths whose first edge is `source` and whose last edge is `target`.
    pub fn st_paths_by_edges(&self, source: &EdgeId, target: &EdgeId) -> Paths {
        self.filtered(format!("st-paths between {} and {}", source, target), |p| {
            p.edges().first() == Some(source) && p.edges().last() == Some(target)
        })
    }

    fn filtered<F: Fn(&Path) -> bool>(&self, name: String, keep: F) -> Paths {
        let mut paths = Paths::with_config(&self.config);
        paths.set_name(name);
        for entry in self.entries.iter().filter(|e| keep(&e.path)) {
            paths.push_entry(entry.path.clone(), entry.frequency);
        }
        paths
    }

    /// Inserts a path known not to be stored yet.
    fn push_entry(&mut self, path: Path, frequency: u64) {
        self.index.insert(path.key(), self.entries.len());
        self.entries.push(PathEntry { path, frequency });
    }

    // --- Ordering ---

    /// Sorts by edge count. The sort is stable.
    pub fn sort_by_length(&mut self, descending: bool) {
        self.sort_entries(|a, b| a.path.len().cmp(&b.path.len()), descending);
    }

    pub fn sort_by_frequency(&mut self, descending: bool) {
        self.sort_entries(|a, b| a.frequency.cmp(&b.frequency), descending);
    }

    /// Sorts by a numeric path attribute; paths without it sort first.
    pub fn sort_by_attribute(&mut self, key: &str, descending: bool) {
        self.sort_entries(
            |a, b| {
                let x = a.path.attributes().get_f64(key);
                let y = b.path.attributes().get_f64(key);
                match (x, y) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    _ => x.is_some().cmp(&y.is_some()),
                }
            },
            descending,
        );
    }

    fn sort_entries<F>(&mut self, cmp: F, descending: bool)
    where
        F: Fn(&PathEntry, &PathEntry) -> std::cmp::Ordering,
    {
        if descending {
            self.entries.sort_by(|a, b| cmp(b, a));
        } else {
            self.entries.sort_by(|a, b| cmp(a, b));
        }
        self.index = self.entries.iter().enumerate().map(|(i, e)| (e.path.key(), i)).collect();
    }
}

/// Drops every path whose node sequence is a window of a longer one.
fn drop_contained(paths: Vec<Path>) -> Vec<Path> {
    let keep: Vec<bool> = paths
        .iter()
        .map(|p| !paths.iter().any(|q| q.node_count() > p.node_count() && q.has_subpath(p)))
        .collect();
    paths.into_iter().zip(keep).filter(|(_, k)| *k).map(|(p, _)| p).collect()
}

impl Index<usize> for Paths {
    type Output = Path;

    fn index(&self, i: usize) -> &Path {
        &self.entries[i].path
    }
}

impl<'a> IntoIterator for &'a Paths {
    type Item = &'a Path;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, PathEntry>, fn(&'a PathEntry) -> &'a Path>;

    fn into_iter(self) -> Self::IntoIter {
        fn path_of(entry: &PathEntry) -> &Path {
            &entry.path
        }
        self.entries.iter().map(path_of as fn(&'a PathEntry) -> &'a Path)
    }
}

impl FromIterator<Path> for Paths {
    fn from_iter<I: IntoIterator<Item = Path>>(iter: I) -> Self {
        let mut paths = Paths::new();
        for path in iter {
            // The default policy increments duplicates and never fails.
            let _ = paths.add_path(path);
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Network;
    use crate::testing::{complete_network, ids};
    use rstest::rstest;

    fn path(net: &Network, nodes: &[&str]) -> Path {
        Path::from_nodes(net, nodes.iter().copied()).unwrap()
    }

    fn names(paths: &Paths) -> Vec<String> {
        paths.iter().map(Path::name).collect()
    }

    #[test]
    fn test_add_twice_increments_frequency() {
        let net = complete_network(&["a", "b", "c"]);
        let mut paths = Paths::new();
        assert_eq!(paths.add_path(path(&net, &["a", "b"])).unwrap(), 1);
        assert_eq!(paths.add_path(path(&net, &["a", "b"])).unwrap(), 2);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.frequency_of(&path(&net, &["a", "b"])), 2);
        assert_eq!(paths.frequency_of(&path(&net, &["b", "a"])), 0);
        assert!(matches!(paths.add_path_with_frequency(Path::new(), 0), Err(NetworkError::Domain { .. })));
    }

    #[test]
    fn test_reject_policy() {
        let net = complete_network(&["a", "b", "c"]);
        let config = PathsConfig { duplicate_policy: DuplicatePolicy::Reject, ..PathsConfig::default() };
        let mut paths = Paths::with_config(&config);
        paths.add_path(path(&net, &["a", "b"])).unwrap();
        assert_eq!(
            paths.add_path(path(&net, &["a", "b"])).unwrap_err(),
            NetworkError::DuplicateId("a-b".into())
        );

        let batch = vec![path(&net, &["b", "c"]), path(&net, &["b", "c"])];
        assert!(paths.add_paths_from(batch).is_err());
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_update_combines_frequencies() {
        let net = complete_network(&["a", "b", "c"]);
        let mut left = Paths::new();
        left.add_paths_from([path(&net, &["a", "b"]), path(&net, &["a", "b", "c"])]).unwrap();
        let mut right = Paths::new();
        right.add_path_with_frequency(path(&net, &["a", "b"]), 3).unwrap();
        right.add_path(path(&net, &["c", "a"])).unwrap();
        right.update_attributes(&Attributes::from([("location", "Switzerland")]));

        left.update(&right);
        assert_eq!(names(&left), vec!["a-b", "a-b-c", "c-a"]);
        assert_eq!(left.frequency_of(&left[0]), 4);
        assert_eq!(left.get_attr("location").and_then(AttrValue::as_str), Some("Switzerland"));
    }

    #[test]
    fn test_indexed_and_iterable_access() {
        let net = complete_network(&["a", "b", "c"]);
        let paths: Paths = vec![path(&net, &["a", "b"]), path(&net, &["b", "c"])].into_iter().collect();
        assert_eq!(paths[1].name(), "b-c");
        assert!(paths.get(2).is_none());
        let mut count = 0;
        for p in &paths {
            assert!(paths.contains(p));
            count += 1;
        }
        assert_eq!(count, paths.len());
    }

    #[test]
    fn test_shared_paths_across_all() {
        let net = complete_network(&["a", "b", "c", "d", "e", "f"]);
        let mut paths = Paths::new();
        paths
            .add_paths_from([
                path(&net, &["a", "b", "c", "d", "e"]),
                path(&net, &["f", "b", "c", "d", "a"]),
                path(&net, &["c", "d", "e", "b", "c"]),
            ])
            .unwrap();
        // `b-c-d` is common to the first two; the third only has its halves.
        let shared = paths.shared_paths();
        assert_eq!(shared.iter().map(Path::name).collect::<Vec<_>>(), vec!["b-c", "c-d"]);
        assert_eq!(shared[0].nodes(), &ids(&["b", "c"])[..]);
        assert_eq!(shared[0].edges(), &[EdgeId::from("b-c")]);

        let first_two = paths.shared_paths_of(&[0, 1]).unwrap();
        assert_eq!(first_two.iter().map(Path::name).collect::<Vec<_>>(), vec!["b-c-d"]);
        assert_eq!(
            paths.shared_paths_of(&[0, 7]).unwrap_err(),
            NetworkError::Range { start: 7, end: 7, len: 3 }
        );
        assert!(Paths::new().shared_paths().is_empty());
    }

    #[test]
    fn test_shared_paths_longest_only() {
        let net = complete_network(&["a", "b", "c", "x", "y"]);
        let config = PathsConfig { shared_policy: SharedPolicy::LongestOnly, ..PathsConfig::default() };
        let mut paths = Paths::with_config(&config);
        paths
            .add_paths_from([path(&net, &["a", "b", "c", "x", "y"]), path(&net, &["x", "y", "a", "b", "c"])])
            .unwrap();
        assert_eq!(paths.shared_paths().iter().map(Path::name).collect::<Vec<_>>(), vec!["a-b-c"]);
    }

    #[test]
    fn test_intersection() {
        let net = complete_network(&["a", "b", "c"]);
        let mut left = Paths::new();
        left.add_path_with_frequency(path(&net, &["a", "b"]), 3).unwrap();
        left.add_path(path(&net, &["b", "c"])).unwrap();
        let mut right = Paths::new();
        right.add_paths_from([path(&net, &["a", "b"]), path(&net, &["a", "b", "c"])]).unwrap();

        let both = left.intersection(&right);
        assert_eq!(names(&both), vec!["a-b"]);
        assert_eq!(both.entries()[0].frequency, 1);
    }

    #[test]
    fn test_st_paths() {
        let net = complete_network(&["a", "b", "c"]);
        let mut paths = Paths::new();
        paths
            .add_paths_from([path(&net, &["a", "b"]), path(&net, &["a", "b", "c"]), path(&net, &["a", "c", "b"])])
            .unwrap();
        let ab = paths.st_paths(&NodeId::from("a"), &NodeId::from("b"));
        assert_eq!(names(&ab), vec!["a-b", "a-c-b"]);
        assert_eq!(ab.name(), Some("st-paths between a and b"));

        let by_edges = paths.st_paths_by_edges(&EdgeId::from("a-b"), &EdgeId::from("b-c"));
        assert_eq!(names(&by_edges), vec!["a-b-c"]);
    }

    #[rstest]
    #[case(false, vec!["a-b", "c-a", "a-b-c"])]
    #[case(true, vec!["a-b-c", "a-b", "c-a"])]
    fn test_sort_by_length(#[case] descending: bool, #[case] expected: Vec<&str>) {
        let net = complete_network(&["a", "b", "c"]);
        let mut paths = Paths::new();
        paths
            .add_paths_from([path(&net, &["a", "b", "c"]), path(&net, &["a", "b"]), path(&net, &["c", "a"])])
            .unwrap();
        paths.sort_by_length(descending);
        assert_eq!(names(&paths), expected);
        // The key index follows the new order.
        paths.add_path(path(&net, &["a", "b"])).unwrap();
        assert_eq!(paths.frequency_of(&path(&net, &["a", "b"])), 2);
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_sort_by_frequency_and_attribute() {
        let net = complete_network(&["a", "b", "c"]);
        let mut cheap = path(&net, &["a", "b"]);
        cheap.set("cost", 2);
        let mut pricey = path(&net, &["b", "c"]);
        pricey.set("cost", 10);
        let plain = path(&net, &["c", "a"]);

        let mut paths = Paths::new();
        paths.add_path(pricey).unwrap();
        paths.add_path_with_frequency(plain, 5).unwrap();
        paths.add_path_with_frequency(cheap, 2).unwrap();

        paths.sort_by_frequency(true);
        assert_eq!(names(&paths), vec!["c-a", "a-b", "b-c"]);

        paths.sort_by_attribute("cost", false);
        assert_eq!(names(&paths), vec!["c-a", "a-b", "b-c"]);
        paths.sort_by_attribute("cost", true);
        assert_eq!(names(&paths), vec!["b-c", "a-b", "c-a"]);
    }
}
