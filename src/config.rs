//! Tunables shared by discretization, field evaluation and tracing.
//!
//! Every value here is load-bearing for output compatibility with the
//! reference renderer: changing a default changes the pictures.

use serde::{Deserialize, Serialize};

/// Elements along a line charge.
pub const LINE_SEGMENTS: usize = 30;
/// Elements around a ring charge.
pub const RING_SEGMENTS: usize = 32;
/// Concentric rings used for a disk charge.
pub const DISK_RINGS: usize = 6;
/// Elements on each disk ring.
pub const DISK_SEGMENTS_PER_RING: usize = 20;

/// Distance under which a point element contributes nothing.
pub const POINT_CUTOFF: f32 = 5.0;
/// Distance under which a line/ring/disk element contributes nothing.
pub const ELEMENT_CUTOFF: f32 = 2.0;
/// Visualization stand-in for 1/(4πε₀); divides into r².
pub const FIELD_SCALE: f32 = 0.01;

/// Field lines start this far out from the charge anchor.
pub const TRACE_START_OFFSET: f32 = 20.0;
pub const TRACE_STEP: f32 = 3.0;
/// Hard cap on points per field line, start point included.
pub const TRACE_MAX_POINTS: usize = 200;
/// |E| below which a field line stops.
pub const TRACE_MIN_FIELD: f32 = 0.1;

pub const MIN_PLACEMENT_DISTANCE: f32 = 50.0;
pub const LINES_PER_UNIT_CHARGE: f32 = 3.0;

pub const HEATMAP_CELL: f32 = 20.0;
pub const ARROW_CELL: f32 = 40.0;
/// Arrow samples with |E| at or below this are not drawn.
pub const ARROW_MIN_FIELD: f32 = 0.5;
pub const ARROW_MAX_LEN: f32 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub line_segments: usize,
    pub ring_segments: usize,
    pub disk_rings: usize,
    pub disk_segments_per_ring: usize,

    pub point_cutoff: f32,
    pub element_cutoff: f32,
    pub scale: f32,

    pub start_offset: f32,
    pub step: f32,
    pub max_points: usize,
    pub min_field: f32,

    pub min_placement_distance: f32,
    pub lines_per_unit_charge: f32,

    pub heatmap_cell: f32,
    pub arrow_cell: f32,
    pub arrow_min_field: f32,
    pub arrow_max_len: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            line_segments: LINE_SEGMENTS,
            ring_segments: RING_SEGMENTS,
            disk_rings: DISK_RINGS,
            disk_segments_per_ring: DISK_SEGMENTS_PER_RING,
            point_cutoff: POINT_CUTOFF,
            element_cutoff: ELEMENT_CUTOFF,
            scale: FIELD_SCALE,
            start_offset: TRACE_START_OFFSET,
            step: TRACE_STEP,
            max_points: TRACE_MAX_POINTS,
            min_field: TRACE_MIN_FIELD,
            min_placement_distance: MIN_PLACEMENT_DISTANCE,
            lines_per_unit_charge: LINES_PER_UNIT_CHARGE,
            heatmap_cell: HEATMAP_CELL,
            arrow_cell: ARROW_CELL,
            arrow_min_field: ARROW_MIN_FIELD,
            arrow_max_len: ARROW_MAX_LEN,
        }
    }
}

impl FieldConfig {
    /// Number of elements a disk charge is split into.
    #[inline]
    pub fn disk_elements(&self) -> usize {
        self.disk_rings * self.disk_segments_per_ring
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
