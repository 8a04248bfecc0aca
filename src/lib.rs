//! Electrostatic field of 2D charge scenes, for on-screen visualization.
//!
//! Point, line, ring and disk charges are split into point elements whose
//! Coulomb fields are superposed at query points. On top of that sit
//! field-line tracing, grid sampling for heatmaps and arrow plots, and the
//! click-to-place rules of the editor. Drawing is left to the host.

pub mod charge;
pub mod config;
pub mod error;
pub mod logging;
pub mod perf;
pub mod picking;
pub mod query;
pub mod seed;
pub mod solver;
pub mod state;
pub mod stream;

pub use charge::{Charge, ChargeElement, ChargeId, ChargeShape, discretize_scene};
pub use config::FieldConfig;
pub use error::{ChargeError, SceneError};
pub use query::{
    Arrow, DensityDescriptor, DensityKind, FieldGrid, FieldProbe, HeatCell, SceneQuery,
    density_descriptor, evaluate_field, field_lines_for, sample_grid, trace_field_line,
    validate_placement,
};
pub use solver::{ElementField, Solver};
pub use state::{Brush, Scene};
pub use stream::{Bounds, Euler, FieldLine, Integrator, Rk4, Streamline, Termination};
