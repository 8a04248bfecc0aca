use es_viz::solver::Solver as GridSolver;
use es_viz::{
    Bounds, Brush, Charge, ChargeId, ChargeShape, FieldConfig, HeatCell, Scene, SceneError,
    SceneQuery,
    density_descriptor, picking,
};
use glam::Vec2;
use wasm_bindgen::prelude::*;

/// Canvas-facing handle: owns the scene, the cached field grid and the last
/// traced field lines. Everything crosses the boundary as flat `f32` arrays.
#[wasm_bindgen]
pub struct Solver {
    width: f32,
    height: f32,
    cfg: FieldConfig,
    scene: Scene,
    grid: GridSolver,
    // field lines, flattened: [x,y,x,y,...] with per-line point counts
    lines: Vec<f32>,
    line_counts: Vec<u32>,
    line_signs: Vec<i8>,
}

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

#[wasm_bindgen]
impl Solver {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Solver {
        console_error_panic_hook::set_once();
        let cfg = FieldConfig::default();
        Solver {
            width,
            height,
            cfg,
            scene: Scene::new(),
            grid: GridSolver::for_viewport(width, height, cfg),
            lines: Vec::new(),
            line_counts: Vec::new(),
            line_signs: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.grid = GridSolver::for_viewport(width, height, self.cfg);
    }

    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsError> {
        let cfg = FieldConfig::from_json(json).map_err(js_err)?;
        self.set_config(cfg);
        Ok(())
    }

    pub fn set_brush(&mut self, shape: &str, q: f32, extent: f32) -> Result<(), JsError> {
        let shape: ChargeShape = shape.parse().map_err(js_err)?;
        self.scene.set_brush(Brush { shape, q, extent });
        Ok(())
    }

    pub fn can_place(&self, x: f32, y: f32) -> bool {
        picking::validate_placement(
            self.scene.charges(),
            Vec2::new(x, y),
            self.cfg.min_placement_distance,
        )
    }

    /// Click-to-place with the current brush. Throws when too close.
    pub fn place(&mut self, x: f32, y: f32) -> Result<u64, JsError> {
        self.try_place(x, y).map(|id| id.0).map_err(js_err)
    }

    pub fn add_charge(
        &mut self,
        shape: &str,
        x: f32,
        y: f32,
        q: f32,
        extent: f32,
    ) -> Result<u64, JsError> {
        let shape: ChargeShape = shape.parse().map_err(js_err)?;
        self.scene
            .try_add(shape, Vec2::new(x, y), q, extent)
            .map(|id| id.0)
            .map_err(js_err)
    }

    pub fn remove_charge(&mut self, index: usize) -> Result<(), JsError> {
        self.scene.remove(index).map(|_| ()).map_err(js_err)
    }

    pub fn clear_charges(&mut self) {
        self.scene.clear();
    }

    pub fn charge_count(&self) -> usize {
        self.scene.len()
    }

    /// `[x, y, q, extent]`, empty when out of range.
    pub fn charge_info(&self, index: usize) -> Vec<f32> {
        self.scene
            .get(index)
            .map(|c| vec![c.pos.x, c.pos.y, c.q, c.extent])
            .unwrap_or_default()
    }

    pub fn charge_label(&self, index: usize) -> Option<String> {
        self.scene.get(index).map(Charge::label)
    }

    pub fn density_label(&self, index: usize) -> Option<String> {
        self.scene
            .get(index)
            .and_then(density_descriptor)
            .map(|d| d.to_string())
    }

    pub fn pick(&self, x: f32, y: f32, tolerance: f32) -> Option<usize> {
        picking::pick(self.scene.charges(), Vec2::new(x, y), tolerance)
    }

    /// `[Ex, Ey]`
    pub fn field_at(&mut self, x: f32, y: f32) -> Vec<f32> {
        self.grid.sync(&self.scene);
        let e = self.grid.field_at(Vec2::new(x, y));
        vec![e.x, e.y]
    }

    /// `[Ex, Ey, |E|, angle in degrees]`
    pub fn probe(&mut self, x: f32, y: f32) -> Vec<f32> {
        let p = self.query().probe(Vec2::new(x, y));
        vec![p.e.x, p.e.y, p.magnitude, p.angle_deg]
    }

    /// Refreshes the heatmap grid behind [`Solver::field_ptr`].
    pub fn step(&mut self) {
        self.grid.sync(&self.scene);
        self.grid.step();
    }

    pub fn grid_cols(&self) -> usize {
        self.grid.w
    }
    pub fn grid_rows(&self) -> usize {
        self.grid.h
    }
    pub fn grid_cell(&self) -> f32 {
        self.grid.cell
    }

    pub fn field_ptr(&self) -> *const f32 {
        self.grid.field.as_ptr()
    }

    /// Heatmap alpha per grid cell from the last [`Solver::step`].
    pub fn heat_alpha(&self) -> Vec<f32> {
        self.grid
            .field
            .chunks_exact(2)
            .enumerate()
            .map(|(i, e)| {
                let (ix, iy) = (i % self.grid.w, i / self.grid.w);
                let origin = self.grid.cell * Vec2::new(ix as f32, iy as f32);
                HeatCell::new(origin, Vec2::new(e[0], e[1])).alpha
            })
            .collect()
    }

    /// `[x, y, dx, dy, ...]`, already scaled for drawing.
    pub fn arrows(&mut self) -> Vec<f32> {
        let (bounds, cell) = (self.bounds(), self.cfg.arrow_cell);
        self.query()
            .arrow_grid(bounds, cell)
            .into_iter()
            .flat_map(|a| [a.at.x, a.at.y, a.vector.x, a.vector.y])
            .collect()
    }

    /// Retraces every field line. Read the result through
    /// [`Solver::lines`], [`Solver::line_counts`] and [`Solver::line_signs`].
    pub fn trace_lines(&mut self) -> usize {
        let bounds = self.bounds();
        let traced = self.query().field_lines(bounds);
        self.lines.clear();
        self.line_counts.clear();
        self.line_signs.clear();
        for line in &traced {
            self.lines.extend(line.points.iter().flat_map(|p| [p.x, p.y]));
            self.line_counts.push(line.points.len() as u32);
            self.line_signs.push(if line.positive { 1 } else { -1 });
        }
        traced.len()
    }

    pub fn lines(&self) -> Vec<f32> {
        self.lines.clone()
    }
    pub fn line_counts(&self) -> Vec<u32> {
        self.line_counts.clone()
    }
    pub fn line_signs(&self) -> Vec<i8> {
        self.line_signs.clone()
    }

    pub fn load_scene(&mut self, json: &str) -> Result<(), JsError> {
        let scene = Scene::from_json(json).map_err(js_err)?;
        self.replace_scene(scene);
        Ok(())
    }

    pub fn scene_json(&self) -> Result<String, JsError> {
        self.scene.to_json().map_err(js_err)
    }
}

impl Solver {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn set_config(&mut self, cfg: FieldConfig) {
        self.cfg = cfg;
        self.grid = GridSolver::for_viewport(self.width, self.height, cfg);
    }

    pub fn try_place(&mut self, x: f32, y: f32) -> Result<ChargeId, SceneError> {
        self.scene.place(Vec2::new(x, y), &self.cfg)
    }

    pub fn replace_scene(&mut self, scene: Scene) {
        log::debug!("scene replaced: {} charges", scene.len());
        self.scene = scene;
        // versions of the new scene are unrelated to the old one
        self.grid.set_config(self.cfg);
    }

    /// Queries against the grid's elements, re-discretizing only when the
    /// scene changed since the last sync.
    fn query(&mut self) -> SceneQuery<'_> {
        self.grid.sync(&self.scene);
        SceneQuery::with_field(self.scene.charges(), self.grid.elements(), &self.cfg)
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_then_sample_through_the_grid() {
        let mut s = Solver::new(200.0, 200.0);
        s.try_place(100.0, 100.0).unwrap();
        assert!(s.try_place(110.0, 100.0).is_err());
        assert_eq!(s.charge_count(), 1);

        s.step();
        assert_eq!((s.grid_cols(), s.grid_rows()), (10, 10));
        let e = s.field_at(150.0, 100.0);
        assert!((e[0] - 0.2).abs() < 1e-6);
        assert_eq!(e[1], 0.0);
        assert_eq!(s.heat_alpha().len(), 100);
    }

    #[test]
    fn grid_follows_scene_edits() {
        let mut s = Solver::new(100.0, 100.0);
        s.step();
        assert!(s.heat_alpha().iter().all(|a| *a == 0.0));
        s.try_place(50.0, 50.0).unwrap();
        s.step();
        assert!(s.heat_alpha().iter().any(|a| *a > 0.0));
        s.clear_charges();
        s.step();
        assert!(s.heat_alpha().iter().all(|a| *a == 0.0));
    }

    #[test]
    fn traced_lines_flatten_consistently() {
        let mut s = Solver::new(800.0, 600.0);
        s.try_place(300.0, 300.0).unwrap();
        assert_eq!(s.scene().len(), 1);
        let n = s.trace_lines();
        assert_eq!(n, 15);
        let total: u32 = s.line_counts().iter().sum();
        assert_eq!(s.lines().len(), total as usize * 2);
        assert!(s.line_signs().iter().all(|&sg| sg == 1));
    }

    #[test]
    fn labels_and_info() {
        let mut s = Solver::new(400.0, 400.0);
        s.replace_scene(Scene::new());
        s.scene
            .try_add(ChargeShape::Line, Vec2::new(50.0, 50.0), 5.0, 30.0)
            .unwrap();
        assert_eq!(s.charge_label(0).as_deref(), Some("line (+5.0 μC)"));
        assert_eq!(s.density_label(0).as_deref(), Some("λ = 0.08 μC/px"));
        assert_eq!(s.charge_info(0), vec![50.0, 50.0, 5.0, 30.0]);
        assert!(s.charge_info(1).is_empty());
        assert_eq!(s.pick(51.0, 60.0, 2.0), Some(0));
    }

    #[test]
    fn per_frame_queries_share_the_synced_elements() {
        let mut s = Solver::new(400.0, 400.0);
        s.try_place(100.0, 200.0).unwrap();
        let p = s.probe(150.0, 200.0);
        let synced = s.grid.elements().elements().as_ptr();

        s.arrows();
        s.trace_lines();
        assert_eq!(s.grid.elements().elements().as_ptr(), synced);
        assert!((p[0] - 0.2).abs() < 1e-6);

        s.try_place(300.0, 200.0).unwrap();
        s.probe(0.0, 0.0);
        assert_eq!(s.grid.elements().elements().len(), 2);
    }

    #[test]
    fn heat_alpha_matches_heat_cells() {
        let mut s = Solver::new(100.0, 60.0);
        s.try_place(30.0, 30.0).unwrap();
        s.step();
        let q = SceneQuery::new(s.scene().charges(), &s.cfg);
        let cells = q.heatmap(Bounds::from_size(100.0, 60.0), s.grid_cell());
        let alpha: Vec<f32> = cells.iter().map(|c| c.alpha).collect();
        assert_eq!(s.heat_alpha(), alpha);
    }

    #[test]
    fn loaded_scene_invalidates_the_grid() {
        let mut s = Solver::new(100.0, 100.0);
        s.try_place(50.0, 50.0).unwrap();
        s.step();
        let mut other = Scene::new();
        other.add(Charge::point(Vec2::new(0.0, 0.0), -5.0));
        s.replace_scene(other);
        let e = s.field_at(50.0, 0.0);
        // only the new sink at the origin contributes: E points back at it
        assert!((e[0] + 0.2).abs() < 1e-6, "{e:?}");
        assert_eq!(e[1], 0.0);
    }
}
