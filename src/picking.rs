use glam::Vec2;

use crate::charge::{Charge, ChargeShape};

/// Screen radius of a drawn point charge; also its pick radius.
pub const POINT_PICK_RADIUS: f32 = 15.0;

/// Placement is allowed when the scene is empty or every existing anchor is
/// at least `min_distance` away. Extents are not considered, so two large
/// disks may overlap while two points cannot sit closer than `min_distance`.
pub fn validate_placement(charges: &[Charge], point: Vec2, min_distance: f32) -> bool {
    charges.is_empty() || charges.iter().all(|c| c.pos.distance(point) >= min_distance)
}

/// Distance from `p` to the drawn outline of `c`.
fn outline_distance(c: &Charge, p: Vec2) -> f32 {
    let d = p - c.pos;
    match c.shape {
        ChargeShape::Point => (d.length() - POINT_PICK_RADIUS).max(0.0),
        ChargeShape::Line => {
            let dy = (d.y.abs() - c.extent).max(0.0);
            Vec2::new(d.x, dy).length()
        }
        ChargeShape::Ring => (d.length() - c.extent).abs(),
        ChargeShape::Disk => (d.length() - c.extent).max(0.0),
    }
}

/// Index of the charge whose outline is closest to `p`, if within `tolerance`.
pub fn pick(charges: &[Charge], p: Vec2, tolerance: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in charges.iter().enumerate() {
        let d = outline_distance(c, p);
        if d <= tolerance && best.is_none_or(|(_, b)| d < b) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_accepts_anything() {
        assert!(validate_placement(&[], Vec2::ZERO, 50.0));
        assert!(validate_placement(&[], Vec2::splat(f32::MAX), 50.0));
    }

    #[test]
    fn distance_rule_uses_anchors_only() {
        let charges = [Charge::new(ChargeShape::Disk, Vec2::ZERO, 1.0, 200.0)];
        assert!(!validate_placement(&charges, Vec2::new(49.9, 0.0), 50.0));
        assert!(validate_placement(&charges, Vec2::new(50.0, 0.0), 50.0));
        // inside the disk, but far enough from its center
        assert!(validate_placement(&charges, Vec2::new(0.0, 120.0), 50.0));
    }

    #[test]
    fn pick_prefers_the_closest_outline() {
        let charges = [
            Charge::point(Vec2::ZERO, 1.0),
            Charge::new(ChargeShape::Ring, Vec2::new(100.0, 0.0), 1.0, 40.0),
            Charge::new(ChargeShape::Line, Vec2::new(0.0, 200.0), 1.0, 30.0),
        ];
        assert_eq!(pick(&charges, Vec2::new(10.0, 0.0), 2.0), Some(0));
        assert_eq!(pick(&charges, Vec2::new(61.0, 0.0), 2.0), Some(1));
        assert_eq!(pick(&charges, Vec2::new(100.0, 0.0), 2.0), None);
        assert_eq!(pick(&charges, Vec2::new(1.0, 225.0), 2.0), Some(2));
    }
}
