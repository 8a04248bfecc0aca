use approx::assert_relative_eq;
use es_viz::{
    Bounds, Charge, ChargeShape, FieldConfig, Scene, SceneError, SceneQuery, Termination,
    evaluate_field, sample_grid, trace_field_line, validate_placement,
};
use glam::Vec2;
use rstest::rstest;

fn cfg() -> FieldConfig {
    FieldConfig::default()
}

fn mixed_scene() -> Scene {
    let mut scene = Scene::new();
    scene.add(Charge::point(Vec2::new(150.0, 300.0), 5.0));
    scene.add(Charge::new(ChargeShape::Line, Vec2::new(350.0, 300.0), -4.0, 60.0));
    scene.add(Charge::new(ChargeShape::Ring, Vec2::new(550.0, 200.0), 3.0, 40.0));
    scene.add(Charge::new(ChargeShape::Disk, Vec2::new(600.0, 450.0), -2.0, 50.0));
    scene
}

#[test]
fn reference_point_charge_value() {
    let mut scene = Scene::new();
    scene.add(Charge::point(Vec2::new(100.0, 100.0), 5.0));
    let e = evaluate_field(scene.charges(), Vec2::new(150.0, 100.0), &cfg());
    assert_relative_eq!(e.x, 0.2, epsilon = 1e-6);
    assert_eq!(e.y, 0.0);
}

#[rstest]
#[case::near_point(Vec2::new(190.0, 310.0))]
#[case::beside_line(Vec2::new(320.0, 280.0))]
#[case::inside_ring(Vec2::new(560.0, 190.0))]
#[case::far_away(Vec2::new(790.0, 10.0))]
fn negated_scene_negates_field(#[case] p: Vec2) {
    let scene = mixed_scene();
    let flipped: Vec<Charge> = scene
        .charges()
        .iter()
        .map(|c| Charge { q: -c.q, ..*c })
        .collect();
    let a = evaluate_field(scene.charges(), p, &cfg());
    let b = evaluate_field(&flipped, p, &cfg());
    assert_eq!(a, -b);
}

#[test]
fn cached_query_matches_one_shot_evaluation() {
    let scene = mixed_scene();
    let q = SceneQuery::new(scene.charges(), &cfg());
    let grid = sample_grid(scene.charges(), Bounds::from_size(800.0, 600.0), 40.0, &cfg());
    for (origin, e) in grid.iter().step_by(7) {
        assert_eq!(q.evaluate(origin), e);
        assert_eq!(evaluate_field(scene.charges(), origin, &cfg()), e);
    }
}

#[test]
fn every_field_line_respects_caps_and_bounds() {
    let scene = mixed_scene();
    let bounds = Bounds::from_size(800.0, 600.0);
    let q = SceneQuery::new(scene.charges(), &cfg());
    let lines = q.field_lines(bounds);
    // 15 + 12 + 9 + 6
    assert_eq!(lines.len(), 42);
    for line in &lines {
        assert!(!line.is_empty());
        assert!(line.len() <= 200);
        let (_, head) = line.points.split_last().unwrap();
        assert!(head.iter().all(|p| bounds.contains(*p)));
        if line.len() == 200 {
            assert_eq!(line.end, Termination::StepCap);
        }
    }
}

#[test]
fn free_trace_matches_scene_query_trace() {
    let scene = mixed_scene();
    let bounds = Bounds::from_size(800.0, 600.0);
    let origin = Vec2::new(150.0, 300.0);
    let a = trace_field_line(scene.charges(), origin, 0.4, true, bounds, &cfg());
    let b = SceneQuery::new(scene.charges(), &cfg()).trace_field_line(origin, 0.4, true, bounds);
    assert_eq!(a, b);
}

#[test]
fn editor_session() {
    let cfg = cfg();
    let mut scene = Scene::new();
    assert!(validate_placement(scene.charges(), Vec2::new(100.0, 100.0), 50.0));

    let first = scene.place(Vec2::new(100.0, 100.0), &cfg).unwrap();
    assert!(matches!(
        scene.place(Vec2::new(140.0, 100.0), &cfg),
        Err(SceneError::TooClose { .. })
    ));
    let second = scene.place(Vec2::new(150.0, 100.0), &cfg).unwrap();
    assert_eq!(scene.len(), 2);

    scene.remove(0).unwrap();
    assert_eq!(scene.charges()[0].id, second);
    assert_eq!(scene.index_of(first), None);

    scene.clear();
    assert!(scene.is_empty());
    let third = scene.place(Vec2::new(100.0, 100.0), &cfg).unwrap();
    assert!(third > second);
}

#[test]
fn custom_config_changes_discretization() {
    let cfg = FieldConfig::from_json(r#"{ "ring_segments": 4 }"#).unwrap();
    let ring = Charge::new(ChargeShape::Ring, Vec2::ZERO, 4.0, 10.0);
    let els = ring.discretize(&cfg);
    assert_eq!(els.len(), 4);
    assert!(els.iter().all(|e| e.q == 1.0));
}
