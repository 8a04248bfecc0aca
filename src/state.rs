//! The mutable charge list the host edits between frames.
//!
//! Queries only ever borrow `scene.charges()`; nothing in the crate mutates a
//! scene behind the host's back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::charge::{Charge, ChargeId, ChargeShape};
use crate::config::FieldConfig;
use crate::error::SceneError;
use crate::picking;

/// Shape and size used for the next click-to-place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brush {
    pub shape: ChargeShape,
    pub q: f32,
    pub extent: f32,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            shape: ChargeShape::Point,
            q: 5.0,
            extent: 30.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    charges: Vec<Charge>,
    next_id: u64,
    version: u64,
    brush: Brush,
}

#[derive(Serialize, Deserialize)]
struct SceneDoc {
    #[serde(default)]
    brush: Brush,
    #[serde(default)]
    charges: Vec<Charge>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brush(brush: Brush) -> Self {
        Self {
            brush,
            ..Self::default()
        }
    }

    /// Charges in insertion order.
    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn len(&self) -> usize {
        self.charges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Charge> {
        self.charges.get(index)
    }

    pub fn index_of(&self, id: ChargeId) -> Option<usize> {
        self.charges.iter().position(|c| c.id == id)
    }

    /// Bumped on every mutation; lets caches tell snapshots apart.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = Brush {
            extent: brush.extent.max(0.0),
            ..brush
        };
    }

    #[inline]
    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn alloc_id(&mut self) -> ChargeId {
        self.next_id += 1;
        ChargeId(self.next_id)
    }

    /// Appends without a placement check and assigns a fresh id.
    pub fn add(&mut self, charge: Charge) -> ChargeId {
        let id = self.alloc_id();
        self.charges.push(Charge { id, ..charge.sanitized() });
        self.bump();
        log::debug!("added {} {} at {}", id, charge.label(), charge.pos);
        id
    }

    /// Like [`Scene::add`] but rejects malformed input instead of clamping.
    pub fn try_add(
        &mut self,
        shape: ChargeShape,
        pos: Vec2,
        q: f32,
        extent: f32,
    ) -> Result<ChargeId, SceneError> {
        let charge = Charge::try_new(shape, pos, q, extent)?;
        Ok(self.add(charge))
    }

    /// Click-to-place with the current brush, subject to the minimum
    /// distance rule.
    pub fn place(&mut self, point: Vec2, cfg: &FieldConfig) -> Result<ChargeId, SceneError> {
        if !picking::validate_placement(&self.charges, point, cfg.min_placement_distance) {
            log::info!("placement at {point} rejected: too close to an existing charge");
            return Err(SceneError::TooClose {
                x: point.x,
                y: point.y,
                min_distance: cfg.min_placement_distance,
            });
        }
        let b = self.brush;
        let charge = Charge::try_new(b.shape, point, b.q, b.extent)?;
        Ok(self.add(charge))
    }

    pub fn remove(&mut self, index: usize) -> Result<Charge, SceneError> {
        if index >= self.charges.len() {
            return Err(SceneError::IndexOutOfRange {
                index,
                len: self.charges.len(),
            });
        }
        let c = self.charges.remove(index);
        self.bump();
        log::debug!("removed {} at index {}", c.id, index);
        Ok(c)
    }

    pub fn remove_id(&mut self, id: ChargeId) -> Result<Charge, SceneError> {
        let index = self.index_of(id).ok_or(SceneError::UnknownId(id))?;
        self.remove(index)
    }

    /// Drops every charge. Ids keep counting up.
    pub fn clear(&mut self) {
        self.charges.clear();
        self.bump();
        log::debug!("scene cleared");
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&SceneDoc {
            brush: self.brush,
            charges: self.charges.clone(),
        })
    }

    /// Loads charges and brush; ids are reassigned in file order.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        let doc: SceneDoc = serde_json::from_str(s)?;
        let mut scene = Self::with_brush(doc.brush);
        for c in doc.charges {
            scene.add(c);
        }
        Ok(scene)
    }
}
