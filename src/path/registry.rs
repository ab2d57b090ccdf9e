//! Named collection of configured paths

use super::Path;
use crate::error::{RelayerError, RelayerResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Connection paths between chains, keyed by unique name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Paths {
    paths: BTreeMap<String, Path>,
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path registered under `name`
    pub fn get(&self, name: &str) -> RelayerResult<&Path> {
        self.paths.get(name).ok_or_else(|| RelayerError::PathNotFound {
            name: name.to_string(),
        })
    }

    /// Adds a path by its name. Fails if the path is invalid or the name is taken.
    pub fn add(&mut self, name: &str, path: Path) -> RelayerResult<()> {
        path.validate()?;
        if self.paths.contains_key(name) {
            return Err(RelayerError::DuplicateName {
                name: name.to_string(),
            });
        }
        debug!("Adding path {}", name);
        self.paths.insert(name.to_string(), path);
        Ok(())
    }

    /// Adds a path, overwriting any existing path with that name
    pub fn add_force(&mut self, name: &str, path: Path) -> RelayerResult<()> {
        path.validate()?;
        if self.paths.insert(name.to_string(), path).is_some() {
            warn!("overwriting path {} with new path", name);
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> RelayerResult<Path> {
        self.paths.remove(name).ok_or_else(|| RelayerError::PathNotFound {
            name: name.to_string(),
        })
    }

    /// Returns every path linking `src` and `dst` in either direction
    pub fn paths_from_chains(&self, src: &str, dst: &str) -> RelayerResult<Paths> {
        let paths: BTreeMap<_, _> = self
            .paths
            .iter()
            .filter(|(_, path)| path.connects(src, dst))
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();

        if paths.is_empty() {
            return Err(RelayerError::NoMatchingPath {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        Ok(Paths { paths })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.paths.iter().map(|(name, path)| (name.as_str(), path))
    }

    pub fn to_yaml(&self) -> RelayerResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> RelayerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use crate::path::{gen_path, Order};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn path_between(rng: &mut StdRng, src: &str, dst: &str) -> Path {
        gen_path(rng, src, dst, "transfer", "transfer", Order::Unordered, "ics20-1")
    }

    fn registry() -> Paths {
        let mut rng = StdRng::seed_from_u64(21);
        let mut paths = Paths::new();
        paths.add("a-b", path_between(&mut rng, "chain-a", "chain-b")).unwrap();
        paths.add("b-a", path_between(&mut rng, "chain-b", "chain-a")).unwrap();
        paths.add("a-c", path_between(&mut rng, "chain-a", "chain-c")).unwrap();
        paths
    }

    #[test]
    fn test_get() {
        let paths = registry();
        assert_eq!(paths.get("a-c").unwrap().dst.chain_id, "chain-c");
        assert!(matches!(
            paths.get("missing"),
            Err(RelayerError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_add_duplicate_keeps_existing() {
        let mut paths = registry();
        let original = paths.get("a-b").unwrap().clone();

        let replacement = path_between(&mut StdRng::seed_from_u64(8), "chain-x", "chain-y");
        let err = paths.add("a-b", replacement).unwrap_err();
        assert!(matches!(err, RelayerError::DuplicateName { ref name } if name == "a-b"));
        assert_eq!(paths.get("a-b").unwrap(), &original);
    }

    #[test]
    fn test_add_force_overwrites() {
        let mut paths = registry();
        let replacement = path_between(&mut StdRng::seed_from_u64(8), "chain-x", "chain-y");

        paths.add_force("a-b", replacement.clone()).unwrap();
        assert_eq!(paths.get("a-b").unwrap(), &replacement);
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_add_rejects_invalid_path() {
        let mut paths = Paths::new();
        let mut path = path_between(&mut StdRng::seed_from_u64(2), "chain-a", "chain-b");
        path.dst.order = Order::Ordered;

        let err = paths.add("bad", path.clone()).unwrap_err();
        assert!(matches!(
            err,
            RelayerError::Validation(PathError::OrderMismatch { .. })
        ));
        assert!(paths.add_force("bad", path).is_err());
        assert!(paths.is_empty());
    }

    #[test]
    fn test_paths_from_chains_is_order_insensitive() {
        let paths = registry();
        let forward = paths.paths_from_chains("chain-a", "chain-b").unwrap();
        let backward = paths.paths_from_chains("chain-b", "chain-a").unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.names().collect::<Vec<_>>(), vec!["a-b", "b-a"]);
    }

    #[test]
    fn test_paths_from_chains_requires_both_chains() {
        let paths = registry();
        // chain-a appears in every path, but never paired with itself
        let err = paths.paths_from_chains("chain-a", "chain-a").unwrap_err();
        assert!(matches!(err, RelayerError::NoMatchingPath { .. }));
        assert!(paths.paths_from_chains("chain-b", "chain-c").is_err());
    }

    #[test]
    fn test_remove() {
        let mut paths = registry();
        assert!(paths.remove("a-c").is_ok());
        assert!(!paths.contains("a-c"));
        assert!(paths.remove("a-c").is_err());
    }

    #[test]
    fn test_yaml_keys_are_names() {
        let paths = registry();
        let yaml = paths.to_yaml().unwrap();
        assert!(yaml.starts_with("a-b:"));
        let decoded: Paths = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded, paths);
    }
}
