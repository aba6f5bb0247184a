//! Atomically replaceable layer map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use disaster_map_models::MapLayerHandle;

/// Cache of rendered layer handles, keyed by layer name.
///
/// Readers clone the current `Arc` and never observe a partially built
/// map: regeneration builds the complete replacement first and
/// publishes it with a single assignment under the write lock. Maps are
/// always replaced whole, never merged.
#[derive(Default)]
pub struct LayerCache {
    layers: RwLock<Arc<HashMap<String, MapLayerHandle>>>,
}

impl LayerCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the handle for a layer in the current map.
    #[must_use]
    pub fn get(&self, layer_name: &str) -> Option<MapLayerHandle> {
        self.snapshot().get(layer_name).cloned()
    }

    /// The current map, as a cheaply clonable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HashMap<String, MapLayerHandle>> {
        Arc::clone(
            &self
                .layers
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Publishes a fully built replacement map.
    pub fn publish(&self, layers: HashMap<String, MapLayerHandle>) {
        *self
            .layers
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(layers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(layer_name: &str) -> MapLayerHandle {
        MapLayerHandle {
            layer_name: layer_name.to_string(),
            map_id: format!("map-{layer_name}"),
            access_token: Some("token".to_string()),
            tile_url_template: None,
            name: layer_name.to_string(),
            description: String::new(),
            source: String::new(),
        }
    }

    #[test]
    fn publish_replaces_the_whole_map() {
        let cache = LayerCache::new();
        cache.publish(HashMap::from([("a".to_string(), handle("a"))]));
        cache.publish(HashMap::from([("b".to_string(), handle("b"))]));

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn concurrent_publishes_never_expose_a_partial_map() {
        fn full_map() -> HashMap<String, MapLayerHandle> {
            ["elevation", "landcover", "precipitation"]
                .into_iter()
                .map(|name| (name.to_string(), handle(name)))
                .collect()
        }

        let cache = Arc::new(LayerCache::new());

        // Two writers racing whole-map publishes, as two simultaneous
        // tile-proxy misses would.
        let writers: Vec<_> = (0..2)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        cache.publish(full_map());
                    }
                })
            })
            .collect();

        // A reader must only ever observe the empty initial map or a
        // complete replacement, never a partially filled one.
        for _ in 0..1000 {
            let snapshot = cache.snapshot();
            assert!(snapshot.is_empty() || snapshot.len() == 3);
        }

        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(cache.snapshot().len(), 3);
    }

    #[test]
    fn snapshot_is_stable_across_publish() {
        let cache = LayerCache::new();
        cache.publish(HashMap::from([("a".to_string(), handle("a"))]));

        let snapshot = cache.snapshot();
        cache.publish(HashMap::new());

        // The old snapshot keeps the old map alive.
        assert!(snapshot.contains_key("a"));
        assert!(cache.get("a").is_none());
    }
}
