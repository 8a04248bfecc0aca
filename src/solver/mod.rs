//! Coulomb superposition over discretized charges.
//!
//! [`ElementField`] is the per-frame snapshot: discretize once, then query as
//! many points as needed. [`Solver`] keeps one around across frames and
//! refills an interleaved `[Ex, Ey, Ex, Ey, ...]` grid buffer for the host.

use glam::Vec2;

use crate::charge::{Charge, ChargeElement, discretize_scene};
use crate::config::FieldConfig;
use crate::perf::Scope;
use crate::state::Scene;

/// Field of a single element at `p`, or zero inside its cutoff.
#[inline]
fn element_field(e: &ChargeElement, p: Vec2, scale: f32) -> Vec2 {
    let d = p - e.pos;
    let r2 = d.length_squared();
    let r = r2.sqrt();
    if r <= e.cutoff {
        return Vec2::ZERO;
    }
    let mag = e.q / (r2 * scale);
    (mag / r) * d
}

/// Sum of all element contributions at `p`.
pub fn field_at(elements: &[ChargeElement], p: Vec2, scale: f32) -> Vec2 {
    let mut e = Vec2::ZERO;
    for el in elements {
        e += element_field(el, p, scale);
    }
    e
}

/// One-shot evaluation for a scene snapshot. Discretizes on every call; use
/// [`ElementField`] when sampling many points.
pub fn evaluate_field(charges: &[Charge], p: Vec2, cfg: &FieldConfig) -> Vec2 {
    ElementField::new(charges, cfg).at(p)
}

/// Discretized snapshot of a charge set.
#[derive(Clone, Debug, Default)]
pub struct ElementField {
    elements: Vec<ChargeElement>,
    scale: f32,
}

impl ElementField {
    pub fn new(charges: &[Charge], cfg: &FieldConfig) -> Self {
        Self {
            elements: discretize_scene(charges, cfg),
            scale: cfg.scale,
        }
    }

    #[inline]
    pub fn at(&self, p: Vec2) -> Vec2 {
        field_at(&self.elements, p, self.scale)
    }

    pub fn elements(&self) -> &[ChargeElement] {
        &self.elements
    }
}

/// Grid-backed evaluator that only re-discretizes when the scene changes.
pub struct Solver {
    pub w: usize,
    pub h: usize,
    pub cell: f32,
    pub field: Vec<f32>, // [Ex,Ey,Ex,Ey,...], row-major, cell origins
    cfg: FieldConfig,
    elements: ElementField,
    version: Option<u64>,
}

impl Solver {
    /// `w` x `h` cells of size `cell`, origins at `(ix * cell, iy * cell)`.
    pub fn new(w: usize, h: usize, cell: f32, cfg: FieldConfig) -> Self {
        Self {
            w,
            h,
            cell,
            field: vec![0.0; w * h * 2],
            cfg,
            elements: ElementField::default(),
            version: None,
        }
    }

    /// Grid covering a `width` x `height` viewport with the configured
    /// heatmap cell size.
    pub fn for_viewport(width: f32, height: f32, cfg: FieldConfig) -> Self {
        let cell = cfg.heatmap_cell.max(f32::EPSILON);
        let w = cells_below(width, cell);
        let h = cells_below(height, cell);
        Self::new(w, h, cell, cfg)
    }

    pub fn set_config(&mut self, cfg: FieldConfig) {
        self.cfg = cfg;
        self.version = None;
    }

    /// Re-discretizes if the scene changed since the last sync.
    /// Returns whether it did.
    pub fn sync(&mut self, scene: &Scene) -> bool {
        if self.version == Some(scene.version()) {
            return false;
        }
        self.elements = ElementField::new(scene.charges(), &self.cfg);
        self.version = Some(scene.version());
        log::debug!(
            "solver resynced: v{} -> {} elements",
            scene.version(),
            self.elements.elements().len()
        );
        true
    }

    #[inline]
    pub fn field_at(&self, p: Vec2) -> Vec2 {
        self.elements.at(p)
    }

    /// Elements from the last [`Solver::sync`].
    pub fn elements(&self) -> &ElementField {
        &self.elements
    }

    pub fn step(&mut self) {
        let _t = Scope::new("solver.step");
        for jy in 0..self.h {
            let y = jy as f32 * self.cell;
            for ix in 0..self.w {
                let x = ix as f32 * self.cell;
                let e = self.elements.at(Vec2::new(x, y));
                let base = (jy * self.w + ix) * 2;
                self.field[base] = e.x;
                self.field[base + 1] = e.y;
            }
        }
    }

    /// Field stored for cell `(ix, iy)` by the last [`Solver::step`].
    pub fn sample(&self, ix: usize, iy: usize) -> Option<Vec2> {
        if ix >= self.w || iy >= self.h {
            return None;
        }
        let base = (iy * self.w + ix) * 2;
        Some(Vec2::new(self.field[base], self.field[base + 1]))
    }
}

/// Number of `cell` steps from 0 that stay strictly below `extent`.
pub(crate) fn cells_below(extent: f32, cell: f32) -> usize {
    if !(extent > 0.0) || !(cell > 0.0) {
        return 0;
    }
    (extent / cell).ceil() as usize
}
