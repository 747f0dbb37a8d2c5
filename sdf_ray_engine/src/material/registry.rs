//! Material registry - stable handles for scene-referenced materials
//!
//! Scenes refer to materials by `MaterialKey`, a slotmap key that stays
//! valid across insertions and removals of other materials. Removal tears
//! the material down through `Material::destroy`.

use crate::material::Material;
use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! {
    /// Stable handle to a registered material
    pub struct MaterialKey;
}

/// Registry of live materials
#[derive(Default)]
pub struct MaterialRegistry {
    materials: RwLock<SlotMap<MaterialKey, Arc<Material>>>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self {
            materials: RwLock::new(SlotMap::with_key()),
        }
    }

    /// Register a material and return its stable key
    pub fn insert(&self, material: Arc<Material>) -> MaterialKey {
        self.materials.write().insert(material)
    }

    /// Look up a material by key
    pub fn get(&self, key: MaterialKey) -> Option<Arc<Material>> {
        self.materials.read().get(key).cloned()
    }

    /// Remove a material and release everything it owns
    ///
    /// The caller must ensure the device is idle; removal drains the
    /// material unconditionally.
    pub fn remove(&self, key: MaterialKey) -> bool {
        let Some(material) = self.materials.write().remove(key) else {
            return false;
        };
        material.destroy();
        true
    }

    /// Number of registered materials
    pub fn len(&self) -> usize {
        self.materials.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.read().is_empty()
    }

    /// Snapshot of all registered materials
    pub fn materials(&self) -> Vec<Arc<Material>> {
        self.materials.read().values().cloned().collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
