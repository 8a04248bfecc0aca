use std::f32::consts::TAU;

use glam::Vec2;

/// `n` start angles evenly spaced around a full turn, the first at 0
/// (pointing +x). Start points come from [`offset`].
pub fn ring_angles(n: usize) -> impl Iterator<Item = f32> {
    (0..n).map(move |i| TAU * i as f32 / n as f32)
}

#[inline]
pub fn offset(center: Vec2, angle: f32, radius: f32) -> Vec2 {
    center + radius * Vec2::new(angle.cos(), angle.sin())
}

/// Field lines emitted by a charge of magnitude `q`: `floor(|q| * per_unit)`.
pub fn line_count(q: f32, per_unit: f32) -> usize {
    let n = (q.abs() * per_unit).floor();
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seeds_are_evenly_spaced() {
        let angles: Vec<f32> = ring_angles(4).collect();
        assert_eq!(angles.len(), 4);
        assert_eq!(angles[0], 0.0);
        assert_relative_eq!(angles[1], TAU / 4.0);
        let center = Vec2::new(1.0, 2.0);
        assert_relative_eq!(offset(center, angles[0], 20.0).x, 21.0);
        assert_relative_eq!(offset(center, angles[1], 20.0).y, 22.0, epsilon = 1e-4);
        assert_eq!(ring_angles(0).count(), 0);
    }

    #[test]
    fn line_count_rounds_down() {
        assert_eq!(line_count(5.0, 3.0), 15);
        assert_eq!(line_count(-2.5, 3.0), 7);
        assert_eq!(line_count(0.2, 3.0), 0);
        assert_eq!(line_count(f32::NAN, 3.0), 0);
    }
}
