//! Charges and their split into point elements.
//!
//! Every shape is reduced to a list of [`ChargeElement`]s carrying an equal
//! share of the charge. The field code only ever sees elements, so all four
//! shapes go through the same superposition loop.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::error::ChargeError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChargeId(pub u64);

impl fmt::Display for ChargeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeShape {
    #[default]
    Point,
    /// Vertical segment of length `2 * extent`.
    Line,
    Ring,
    Disk,
}

impl ChargeShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Ring => "ring",
            Self::Disk => "disk",
        }
    }

    /// Elements produced per charge of this shape.
    pub fn element_count(self, cfg: &FieldConfig) -> usize {
        match self {
            Self::Point => 1,
            Self::Line => cfg.line_segments,
            Self::Ring => cfg.ring_segments,
            Self::Disk => cfg.disk_elements(),
        }
    }
}

impl fmt::Display for ChargeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeShape {
    type Err = ChargeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            "ring" => Ok(Self::Ring),
            "disk" => Ok(Self::Disk),
            other => Err(ChargeError::UnknownShape(other.to_owned())),
        }
    }
}

/// Point-mass stand-in for a slice of a charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeElement {
    pub pos: Vec2,
    pub q: f32,
    /// Contributions are skipped at distances `<= cutoff`.
    pub cutoff: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    #[serde(skip)]
    pub id: ChargeId,
    pub shape: ChargeShape,
    /// Center for point/ring/disk, midpoint for line.
    pub pos: Vec2,
    pub q: f32,
    /// Half-length for a line, radius for ring/disk. Unused for points.
    #[serde(default)]
    pub extent: f32,
}

impl Charge {
    /// Lenient constructor: a negative or NaN extent becomes 0.
    ///
    /// The id stays unassigned until the charge is added to a scene.
    pub fn new(shape: ChargeShape, pos: Vec2, q: f32, extent: f32) -> Self {
        Self {
            id: ChargeId::default(),
            shape,
            pos,
            q,
            extent: extent.max(0.0),
        }
    }

    pub fn point(pos: Vec2, q: f32) -> Self {
        Self::new(ChargeShape::Point, pos, q, 0.0)
    }

    /// Strict constructor for untrusted input.
    pub fn try_new(
        shape: ChargeShape,
        pos: Vec2,
        q: f32,
        extent: f32,
    ) -> Result<Self, ChargeError> {
        if !pos.is_finite() {
            return Err(ChargeError::NonFinite { field: "position" });
        }
        if !q.is_finite() {
            return Err(ChargeError::NonFinite { field: "magnitude" });
        }
        if !extent.is_finite() {
            return Err(ChargeError::NonFinite { field: "extent" });
        }
        if extent < 0.0 {
            return Err(ChargeError::NegativeExtent { extent });
        }
        Ok(Self::new(shape, pos, q, extent))
    }

    /// Re-applies the lenient rules to a charge that came in through serde.
    pub(crate) fn sanitized(mut self) -> Self {
        self.extent = self.extent.max(0.0);
        self
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.q > 0.0
    }

    /// Shape tag and signed magnitude, e.g. `ring (+5.0 μC)`.
    pub fn label(&self) -> String {
        let sign = if self.q > 0.0 { "+" } else { "" };
        format!("{} ({}{:.1} μC)", self.shape, sign, self.q)
    }

    pub fn discretize(&self, cfg: &FieldConfig) -> Vec<ChargeElement> {
        let mut out = Vec::with_capacity(self.shape.element_count(cfg));
        self.discretize_into(cfg, &mut out);
        out
    }

    /// Appends this charge's elements to `out`.
    pub fn discretize_into(&self, cfg: &FieldConfig, out: &mut Vec<ChargeElement>) {
        let extent = self.extent.max(0.0);
        match self.shape {
            ChargeShape::Point => out.push(ChargeElement {
                pos: self.pos,
                q: self.q,
                cutoff: cfg.point_cutoff,
            }),
            ChargeShape::Line => line_elements(self.pos, extent, self.q, cfg, out),
            ChargeShape::Ring => ring_elements(self.pos, extent, self.q, cfg, out),
            ChargeShape::Disk => disk_elements(self.pos, extent, self.q, cfg, out),
        }
    }
}

// Samples start at the bottom end (pos.y - extent) and stop one spacing
// short of the top end.
fn line_elements(c: Vec2, half: f32, q: f32, cfg: &FieldConfig, out: &mut Vec<ChargeElement>) {
    let n = cfg.line_segments;
    if n == 0 {
        return;
    }
    let len = 2.0 * half;
    let dq = q / n as f32;
    for i in 0..n {
        let y = c.y - half + len * i as f32 / n as f32;
        out.push(ChargeElement {
            pos: Vec2::new(c.x, y),
            q: dq,
            cutoff: cfg.element_cutoff,
        });
    }
}

fn ring_elements(c: Vec2, radius: f32, q: f32, cfg: &FieldConfig, out: &mut Vec<ChargeElement>) {
    let n = cfg.ring_segments;
    if n == 0 {
        return;
    }
    let dq = q / n as f32;
    push_circle(c, radius, n, dq, cfg.element_cutoff, out);
}

// Equal share per element on every ring; not weighted by ring area.
fn disk_elements(c: Vec2, radius: f32, q: f32, cfg: &FieldConfig, out: &mut Vec<ChargeElement>) {
    let rings = cfg.disk_rings;
    let per_ring = cfg.disk_segments_per_ring;
    if rings == 0 || per_ring == 0 {
        return;
    }
    let dq = q / (rings * per_ring) as f32;
    for ring in 1..=rings {
        let r = radius * ring as f32 / rings as f32;
        push_circle(c, r, per_ring, dq, cfg.element_cutoff, out);
    }
}

fn push_circle(c: Vec2, r: f32, n: usize, dq: f32, cutoff: f32, out: &mut Vec<ChargeElement>) {
    for i in 0..n {
        let angle = TAU * i as f32 / n as f32;
        out.push(ChargeElement {
            pos: c + r * Vec2::new(angle.cos(), angle.sin()),
            q: dq,
            cutoff,
        });
    }
}

/// Discretizes every charge of a scene snapshot into one flat element list.
pub fn discretize_scene(charges: &[Charge], cfg: &FieldConfig) -> Vec<ChargeElement> {
    let n = charges.iter().map(|c| c.shape.element_count(cfg)).sum();
    let mut out = Vec::with_capacity(n);
    for c in charges {
        c.discretize_into(cfg, &mut out);
    }
    log::trace!("discretized {} charges into {} elements", charges.len(), out.len());
    out
}
