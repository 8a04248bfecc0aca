//! Field-line tracing.
//!
//! A line starts a fixed offset out from its source and walks along the unit
//! field direction (against it for negative sources) in fixed steps. It ends
//! on a weak field, on leaving the bounds, or at the point cap. Only the last
//! point of a line may lie outside the bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::charge::ChargeId;
use crate::config::FieldConfig;
use crate::seed;
use crate::solver::ElementField;

/// Axis-aligned region a trace may walk in. Edges count as inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Viewport anchored at the origin.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn size(&self) -> Vec2 {
        (self.max - self.min).max(Vec2::ZERO)
    }
}

fn norm_dir(e: Vec2) -> Vec2 {
    let m = e.length();
    if m < 1e-6 { Vec2::ZERO } else { e / m }
}

/// One fixed-length step along the normalized field.
pub trait Integrator {
    /// `e` is the field already sampled at `p`; it is never below the
    /// trace's weak-field cutoff. `sign` is +1 to follow E, -1 to go against it.
    fn advance(&self, field: &ElementField, p: Vec2, e: Vec2, h: f32, sign: f32) -> Vec2;
}

/// Forward Euler. Reproduces the reference field lines exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euler;

impl Integrator for Euler {
    #[inline]
    fn advance(&self, _field: &ElementField, p: Vec2, e: Vec2, h: f32, sign: f32) -> Vec2 {
        p + (sign * h) * norm_dir(e)
    }
}

/// Classic RK4 on the unit direction field. Smoother around tight bends,
/// four field evaluations per step.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rk4;

impl Integrator for Rk4 {
    fn advance(&self, field: &ElementField, p: Vec2, e: Vec2, h: f32, sign: f32) -> Vec2 {
        let f = |x: Vec2| norm_dir(field.at(x)) * sign;
        let k1 = norm_dir(e) * sign;
        let k2 = f(p + 0.5 * h * k1);
        let k3 = f(p + 0.5 * h * k2);
        let k4 = f(p + h * k3);
        p + h * (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    WeakField,
    LeftBounds,
    StepCap,
    NonFinite,
}

/// Lazy field line. Yields the start point first, then one point per step.
pub struct FieldLine<'a, I = Euler> {
    field: &'a ElementField,
    integrator: I,
    bounds: Bounds,
    h: f32,
    sign: f32,
    min_field: f32,
    max_points: usize,
    p: Vec2,
    emitted: usize,
    end: Option<Termination>,
}

impl<'a> FieldLine<'a, Euler> {
    pub fn new(
        field: &'a ElementField,
        origin: Vec2,
        angle: f32,
        positive: bool,
        bounds: Bounds,
        cfg: &FieldConfig,
    ) -> Self {
        Self::with_integrator(field, Euler, origin, angle, positive, bounds, cfg)
    }
}

impl<'a, I: Integrator> FieldLine<'a, I> {
    pub fn with_integrator(
        field: &'a ElementField,
        integrator: I,
        origin: Vec2,
        angle: f32,
        positive: bool,
        bounds: Bounds,
        cfg: &FieldConfig,
    ) -> Self {
        Self {
            field,
            integrator,
            bounds,
            h: cfg.step,
            sign: if positive { 1.0 } else { -1.0 },
            min_field: cfg.min_field,
            max_points: cfg.max_points,
            p: seed::offset(origin, angle, cfg.start_offset),
            emitted: 0,
            end: None,
        }
    }

    /// Why the line stopped, once the iterator is exhausted.
    pub fn termination(&self) -> Option<Termination> {
        self.end
    }

    fn stop(&mut self, why: Termination) -> Option<Vec2> {
        self.end = Some(why);
        None
    }
}

impl<I: Integrator> Iterator for FieldLine<'_, I> {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.end.is_some() {
            return None;
        }
        if self.emitted == 0 {
            self.emitted = 1;
            return Some(self.p);
        }
        if self.emitted >= self.max_points {
            return self.stop(Termination::StepCap);
        }
        if !self.bounds.contains(self.p) {
            return self.stop(Termination::LeftBounds);
        }
        let e = self.field.at(self.p);
        // NaN magnitudes count as weak
        if !(e.length() >= self.min_field) {
            return self.stop(Termination::WeakField);
        }
        let next = self.integrator.advance(self.field, self.p, e, self.h, self.sign);
        if !next.is_finite() {
            return self.stop(Termination::NonFinite);
        }
        self.p = next;
        self.emitted += 1;
        Some(next)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Streamline {
    pub source: Option<ChargeId>,
    pub positive: bool,
    pub points: Vec<Vec2>,
    pub end: Termination,
}

impl Streamline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Runs a line to completion with the given integrator.
pub fn trace_with<I: Integrator>(
    field: &ElementField,
    integrator: I,
    origin: Vec2,
    angle: f32,
    positive: bool,
    bounds: Bounds,
    cfg: &FieldConfig,
) -> Streamline {
    let mut line =
        FieldLine::with_integrator(field, integrator, origin, angle, positive, bounds, cfg);
    let points: Vec<Vec2> = line.by_ref().collect();
    let end = line.termination().unwrap_or(Termination::StepCap);
    log::trace!("field line from {origin} at {angle:.3} rad: {} pts, {end:?}", points.len());
    Streamline {
        source: None,
        positive,
        points,
        end,
    }
}

/// Euler trace matching the reference renderer.
pub fn trace_field_line(
    field: &ElementField,
    origin: Vec2,
    angle: f32,
    positive: bool,
    bounds: Bounds,
    cfg: &FieldConfig,
) -> Streamline {
    trace_with(field, Euler, origin, angle, positive, bounds, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::{Charge, ChargeShape};
    use approx::assert_relative_eq;

    fn field(charges: &[Charge]) -> ElementField {
        ElementField::new(charges, &FieldConfig::default())
    }

    #[test]
    fn radial_line_from_lone_positive_charge() {
        let cfg = FieldConfig::default();
        let f = field(&[Charge::point(Vec2::new(100.0, 100.0), 5.0)]);
        let bounds = Bounds::from_size(400.0, 400.0);
        let line = trace_field_line(&f, Vec2::new(100.0, 100.0), 0.0, true, bounds, &cfg);

        assert_relative_eq!(line.points[0].x, 120.0);
        assert_relative_eq!(line.points[1].x, 123.0, epsilon = 1e-4);
        for p in &line.points {
            assert_relative_eq!(p.y, 100.0, epsilon = 1e-3);
        }
        // |E| = 5 / (r² * 0.01) drops under 0.1 past r ≈ 70.7
        assert_eq!(line.end, Termination::WeakField);
        let last = line.points.last().unwrap();
        assert!(last.x - 100.0 > 70.0 && last.x - 100.0 < 75.0, "{last}");
    }

    #[test]
    fn negative_source_lines_walk_against_the_field() {
        let cfg = FieldConfig::default();
        let f = field(&[Charge::point(Vec2::ZERO, -50.0)]);
        let bounds = Bounds::new(Vec2::splat(-500.0), Vec2::splat(500.0));
        let line = trace_field_line(&f, Vec2::ZERO, 0.0, false, bounds, &cfg);
        // E points into the sink, the trace heads away from it
        assert!(f.at(line.points[0]).x < 0.0);
        assert!(line.points[1].x > line.points[0].x);
        assert_eq!(line.end, Termination::WeakField);
        let last = line.points.last().unwrap();
        assert!(last.x > 223.0 && last.x < 230.0, "{last}");
    }

    #[test]
    fn point_cap_holds_in_a_strong_uniformish_field() {
        let cfg = FieldConfig::default();
        let f = field(&[Charge::point(Vec2::ZERO, 1.0e6)]);
        let bounds = Bounds::new(Vec2::splat(-1.0e5), Vec2::splat(1.0e5));
        let line = trace_field_line(&f, Vec2::ZERO, 1.0, true, bounds, &cfg);
        assert_eq!(line.len(), cfg.max_points);
        assert_eq!(line.end, Termination::StepCap);
    }

    #[test]
    fn only_last_point_may_leave_bounds() {
        let cfg = FieldConfig::default();
        let f = field(&[
            Charge::point(Vec2::new(60.0, 60.0), 40.0),
            Charge::new(ChargeShape::Ring, Vec2::new(140.0, 90.0), -10.0, 20.0),
        ]);
        let bounds = Bounds::from_size(200.0, 150.0);
        for i in 0..12 {
            let angle = i as f32 * 0.5;
            let line = trace_field_line(&f, Vec2::new(60.0, 60.0), angle, true, bounds, &cfg);
            assert!(line.len() <= 200);
            let (_, head) = line.points.split_last().unwrap();
            assert!(head.iter().all(|p| bounds.contains(*p)));
            if line.end == Termination::LeftBounds {
                assert!(!bounds.contains(*line.points.last().unwrap()));
            }
        }
    }

    #[test]
    fn start_outside_bounds_yields_only_the_start() {
        let cfg = FieldConfig::default();
        let f = field(&[Charge::point(Vec2::ZERO, 5.0)]);
        let bounds = Bounds::from_size(100.0, 100.0);
        let line = trace_field_line(&f, Vec2::ZERO, std::f32::consts::PI, true, bounds, &cfg);
        assert_eq!(line.len(), 1);
        assert_relative_eq!(line.points[0].x, -20.0, epsilon = 1e-4);
        assert_eq!(line.end, Termination::LeftBounds);
    }

    #[test]
    fn empty_field_ends_immediately() {
        let cfg = FieldConfig::default();
        let f = ElementField::default();
        let bounds = Bounds::from_size(100.0, 100.0);
        let line = trace_field_line(&f, Vec2::splat(50.0), 0.0, true, bounds, &cfg);
        assert_eq!(line.len(), 1);
        assert_eq!(line.end, Termination::WeakField);
    }

    #[test]
    fn iterator_is_restartable() {
        let cfg = FieldConfig::default();
        let f = field(&[Charge::point(Vec2::new(50.0, 50.0), 5.0)]);
        let b = Bounds::from_size(300.0, 300.0);
        let a: Vec<Vec2> = FieldLine::new(&f, Vec2::new(50.0, 50.0), 0.7, true, b, &cfg).collect();
        let c: Vec<Vec2> = FieldLine::new(&f, Vec2::new(50.0, 50.0), 0.7, true, b, &cfg).collect();
        assert_eq!(a, c);
    }

    #[test]
    fn rk4_agrees_with_euler_on_a_straight_line() {
        let cfg = FieldConfig::default();
        let f = field(&[Charge::point(Vec2::ZERO, 5.0)]);
        let b = Bounds::new(Vec2::splat(-200.0), Vec2::splat(200.0));
        let eu = trace_with(&f, Euler, Vec2::ZERO, 0.0, true, b, &cfg);
        let rk = trace_with(&f, Rk4, Vec2::ZERO, 0.0, true, b, &cfg);
        assert_eq!(eu.len(), rk.len());
        for (a, c) in eu.points.iter().zip(&rk.points) {
            assert_relative_eq!(a.x, c.x, epsilon = 1e-3);
        }
    }
}
