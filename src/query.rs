//! What the drawing layer asks for each frame.
//!
//! [`SceneQuery`] discretizes a charge snapshot once and answers every
//! per-frame query from it. The free functions are one-shot conveniences
//! over the same code.

use std::borrow::Cow;
use std::f32::consts::PI;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::charge::{Charge, ChargeShape};
use crate::config::FieldConfig;
use crate::perf::Scope;
use crate::picking;
use crate::seed;
use crate::solver::{ElementField, cells_below};
use crate::stream::{Bounds, Euler, Integrator, Streamline, trace_with};

/// Field samples at grid-cell origins, row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid {
    pub origin: Vec2,
    pub cell: f32,
    pub cols: usize,
    pub rows: usize,
    pub samples: Vec<Vec2>,
}

impl FieldGrid {
    pub fn cell_origin(&self, ix: usize, iy: usize) -> Vec2 {
        self.origin + self.cell * Vec2::new(ix as f32, iy as f32)
    }

    pub fn get(&self, ix: usize, iy: usize) -> Option<Vec2> {
        if ix >= self.cols || iy >= self.rows {
            return None;
        }
        self.samples.get(iy * self.cols + ix).copied()
    }

    /// `(cell origin, field)` pairs, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.samples.iter().enumerate().map(|(i, e)| {
            let (ix, iy) = (i % self.cols, i / self.cols);
            (self.cell_origin(ix, iy), *e)
        })
    }

    pub fn max_magnitude(&self) -> f32 {
        self.samples.iter().map(|e| e.length()).fold(0.0, f32::max)
    }
}

/// Cursor readout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldProbe {
    pub point: Vec2,
    pub e: Vec2,
    pub magnitude: f32,
    /// Direction of E, `atan2(Ey, Ex)` in degrees.
    pub angle_deg: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub origin: Vec2,
    pub magnitude: f32,
    /// `min(|E| * 5, 255)`
    pub intensity: f32,
    /// `intensity / 500`
    pub alpha: f32,
}

impl HeatCell {
    pub fn new(origin: Vec2, e: Vec2) -> Self {
        let magnitude = e.length();
        let intensity = (magnitude * 5.0).min(255.0);
        Self {
            origin,
            magnitude,
            intensity,
            alpha: intensity / 500.0,
        }
    }
}

/// Field arrow anchored at `at`, already scaled for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub at: Vec2,
    pub vector: Vec2,
    pub magnitude: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityKind {
    /// λ, charge per length.
    Linear,
    /// σ, charge per area.
    Areal,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityDescriptor {
    pub kind: DensityKind,
    pub value: f32,
}

impl fmt::Display for DensityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DensityKind::Linear => write!(f, "λ = {:.2} μC/px", self.value),
            DensityKind::Areal => write!(f, "σ = {:.4} μC/px²", self.value),
        }
    }
}

/// Display-only charge density. `None` for points and for zero extent.
pub fn density_descriptor(charge: &Charge) -> Option<DensityDescriptor> {
    let r = charge.extent;
    if charge.shape == ChargeShape::Point || !(r > 0.0) {
        return None;
    }
    let (kind, value) = match charge.shape {
        ChargeShape::Line => (DensityKind::Linear, charge.q / (2.0 * r)),
        ChargeShape::Ring => (DensityKind::Linear, charge.q / (2.0 * PI * r)),
        ChargeShape::Disk => (DensityKind::Areal, charge.q / (PI * r * r)),
        ChargeShape::Point => return None,
    };
    Some(DensityDescriptor { kind, value })
}

pub fn validate_placement(charges: &[Charge], point: Vec2, min_distance: f32) -> bool {
    picking::validate_placement(charges, point, min_distance)
}

/// A discretized snapshot plus the config it was built with.
pub struct SceneQuery<'a> {
    charges: &'a [Charge],
    field: Cow<'a, ElementField>,
    cfg: FieldConfig,
}

impl<'a> SceneQuery<'a> {
    pub fn new(charges: &'a [Charge], cfg: &FieldConfig) -> Self {
        Self {
            charges,
            field: Cow::Owned(ElementField::new(charges, cfg)),
            cfg: *cfg,
        }
    }

    /// Queries over elements discretized elsewhere, e.g. by a synced
    /// [`crate::Solver`]. `field` must come from `charges` and `cfg`.
    pub fn with_field(charges: &'a [Charge], field: &'a ElementField, cfg: &FieldConfig) -> Self {
        Self {
            charges,
            field: Cow::Borrowed(field),
            cfg: *cfg,
        }
    }

    pub fn field(&self) -> &ElementField {
        &self.field
    }

    #[inline]
    pub fn evaluate(&self, p: Vec2) -> Vec2 {
        self.field.at(p)
    }

    pub fn probe(&self, p: Vec2) -> FieldProbe {
        let e = self.field.at(p);
        FieldProbe {
            point: p,
            e,
            magnitude: e.length(),
            angle_deg: e.y.atan2(e.x).to_degrees(),
        }
    }

    /// Samples at `bounds.min + (ix, iy) * cell` for every origin strictly
    /// below `bounds.max`.
    pub fn sample_grid(&self, bounds: Bounds, cell: f32) -> FieldGrid {
        let _t = Scope::new("query.sample_grid");
        let size = bounds.size();
        let cols = cells_below(size.x, cell);
        let rows = cells_below(size.y, cell);
        let mut samples = Vec::with_capacity(cols * rows);
        for iy in 0..rows {
            for ix in 0..cols {
                let p = bounds.min + cell * Vec2::new(ix as f32, iy as f32);
                samples.push(self.field.at(p));
            }
        }
        FieldGrid {
            origin: bounds.min,
            cell,
            cols,
            rows,
            samples,
        }
    }

    pub fn heatmap(&self, bounds: Bounds, cell: f32) -> Vec<HeatCell> {
        self.sample_grid(bounds, cell)
            .iter()
            .map(|(origin, e)| HeatCell::new(origin, e))
            .collect()
    }

    /// Arrows at `bounds.min + (i, j) * cell` for `i, j >= 1`, strictly
    /// inside `bounds`. Weak samples are dropped; the rest are scaled by
    /// `min(max_len / |E|, max_len)`.
    pub fn arrow_grid(&self, bounds: Bounds, cell: f32) -> Vec<Arrow> {
        let _t = Scope::new("query.arrow_grid");
        let size = bounds.size();
        let cols = cells_below(size.x, cell).saturating_sub(1);
        let rows = cells_below(size.y, cell).saturating_sub(1);
        let mut out = Vec::new();
        for i in 1..=cols {
            for j in 1..=rows {
                let at = bounds.min + cell * Vec2::new(i as f32, j as f32);
                let e = self.field.at(at);
                let magnitude = e.length();
                if !(magnitude > self.cfg.arrow_min_field) {
                    continue;
                }
                let scale = (self.cfg.arrow_max_len / magnitude).min(self.cfg.arrow_max_len);
                let vector = e * scale;
                if vector.length() < 0.1 {
                    continue;
                }
                out.push(Arrow {
                    at,
                    vector,
                    magnitude,
                });
            }
        }
        out
    }

    pub fn trace_field_line(
        &self,
        origin: Vec2,
        angle: f32,
        positive: bool,
        bounds: Bounds,
    ) -> Streamline {
        trace_with(&self.field, Euler, origin, angle, positive, bounds, &self.cfg)
    }

    /// `floor(|q| * lines_per_unit_charge)` lines evenly spaced in angle
    /// around the anchor, following E for positive charges and running
    /// against it otherwise.
    pub fn field_lines_for(&self, charge: &Charge, bounds: Bounds) -> Vec<Streamline> {
        self.field_lines_for_with(charge, bounds, Euler)
    }

    pub fn field_lines_for_with<I: Integrator + Copy>(
        &self,
        charge: &Charge,
        bounds: Bounds,
        integrator: I,
    ) -> Vec<Streamline> {
        let n = seed::line_count(charge.q, self.cfg.lines_per_unit_charge);
        let positive = charge.is_positive();
        seed::ring_angles(n)
            .map(|angle| {
                let mut line = trace_with(
                    &self.field,
                    integrator,
                    charge.pos,
                    angle,
                    positive,
                    bounds,
                    &self.cfg,
                );
                line.source = Some(charge.id);
                line
            })
            .collect()
    }

    /// Field lines for every charge in scene order.
    pub fn field_lines(&self, bounds: Bounds) -> Vec<Streamline> {
        let _t = Scope::new("query.field_lines");
        let lines: Vec<Streamline> = self
            .charges
            .iter()
            .flat_map(|c| self.field_lines_for(c, bounds))
            .collect();
        log::debug!(
            "traced {} field lines for {} charges",
            lines.len(),
            self.charges.len()
        );
        lines
    }
}

pub fn evaluate_field(charges: &[Charge], p: Vec2, cfg: &FieldConfig) -> Vec2 {
    crate::solver::evaluate_field(charges, p, cfg)
}

pub fn sample_grid(charges: &[Charge], bounds: Bounds, cell: f32, cfg: &FieldConfig) -> FieldGrid {
    SceneQuery::new(charges, cfg).sample_grid(bounds, cell)
}

pub fn field_lines_for(
    charges: &[Charge],
    charge: &Charge,
    bounds: Bounds,
    cfg: &FieldConfig,
) -> Vec<Streamline> {
    SceneQuery::new(charges, cfg).field_lines_for(charge, bounds)
}

pub fn trace_field_line(
    charges: &[Charge],
    origin: Vec2,
    angle: f32,
    positive: bool,
    bounds: Bounds,
    cfg: &FieldConfig,
) -> Streamline {
    SceneQuery::new(charges, cfg).trace_field_line(origin, angle, positive, bounds)
}

pub fn probe(charges: &[Charge], p: Vec2, cfg: &FieldConfig) -> FieldProbe {
    SceneQuery::new(charges, cfg).probe(p)
}
