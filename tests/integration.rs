use facemap_engine::Planner;
use facemap_engine::config::{PlannerConfig, UnknownMusclePolicy};
use facemap_engine::geom::{Point2, Rect, Tolerance};
use facemap_engine::mapping::PlacementMethod;
use facemap_engine::model::{
    AnatomicalZone, Depth, Detection, FaceAnchors, InjectionPoint, Muscle,
};
use facemap_engine::safety::SafetyLevel;

fn anchors() -> FaceAnchors {
    FaceAnchors {
        forehead: Point2::new(0.50, 0.20),
        left_eye_outer: Point2::new(0.36, 0.38),
        left_eye_inner: Point2::new(0.45, 0.385),
        right_eye_outer: Point2::new(0.64, 0.38),
        right_eye_inner: Point2::new(0.55, 0.385),
        nose_top: Point2::new(0.50, 0.39),
        nose_tip: Point2::new(0.50, 0.53),
        upper_lip: Point2::new(0.50, 0.60),
        left_lip_corner: Point2::new(0.43, 0.64),
        right_lip_corner: Point2::new(0.57, 0.64),
        chin: Point2::new(0.50, 0.78),
        left_cheek: Point2::new(0.32, 0.50),
        right_cheek: Point2::new(0.68, 0.50),
    }
}

fn detection() -> Detection {
    Detection {
        face_box: Rect::new(0.28, 0.10, 0.44, 0.75),
        anchors: Some(anchors()),
    }
}

fn proposal() -> Vec<InjectionPoint> {
    Muscle::ALL
        .iter()
        .enumerate()
        .map(|(index, muscle)| {
            let (x, y) = muscle.template_center();
            InjectionPoint::new(format!("p{index}"), muscle.id(), x, y, 2)
        })
        .collect()
}

#[test]
fn proposal_flows_through_every_engine() {
    let mut planner = Planner::new();
    let token = planner.detection_mut().begin_photo();
    assert!(planner.detection_mut().resolve(token, Some(detection())));

    planner.plan_mut().load(proposal()).expect("unique ids");
    let points = planner.plan().points().to_vec();
    let display = Rect::new(0.0, 0.0, 640.0, 480.0);

    let photo = planner.photo_placements(&points, display);
    assert_eq!(photo.len(), points.len());
    for placement in &photo {
        assert_eq!(placement.method, PlacementMethod::Anchored, "{}", placement.id);
        assert!(display.contains(placement.pixel, Tolerance::DEFAULT));
    }

    let surface = planner.surface_placements(&points);
    for (placement, point) in surface.iter().zip(&points) {
        let manual = planner.manual_placement(placement.position.into());
        assert_eq!(manual.zone, placement.zone, "{}", point.muscle);
    }

    let validations = planner.validations(&points);
    assert!(validations.iter().all(|v| v.valid));

    // 2U everywhere stays below every warning threshold.
    assert!(planner.evaluate_safety(&points).is_empty());
}

#[test]
fn procerus_overdose_reported_but_plan_kept() {
    let mut planner = Planner::new();
    planner
        .plan_mut()
        .add(InjectionPoint::new("a", "procerus", 50.0, 30.0, 7))
        .unwrap();
    planner
        .plan_mut()
        .add(InjectionPoint::new("b", "Prócero", 51.0, 31.0, 6))
        .unwrap();

    let checks = planner.evaluate_safety(planner.plan().points());
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].level, SafetyLevel::Danger);
    assert_eq!(checks[0].message, "Prócero: 13U excede o limite máximo de 12U");
    assert_eq!(planner.plan().points().len(), 2);

    planner.plan_mut().undo().unwrap();
    assert!(planner.evaluate_safety(planner.plan().points()).is_empty());
}

#[test]
fn session_total_warning_and_danger() {
    let planner = Planner::new();
    let points = |per_point: u32| -> Vec<InjectionPoint> {
        ["masseter_left", "masseter_right", "frontalis", "mentalis", "nasalis"]
            .iter()
            .enumerate()
            .map(|(i, muscle)| InjectionPoint::new(format!("m{i}"), *muscle, 50.0, 50.0, per_point))
            .collect()
    };

    // 5 x 19 = 95U in total.
    let checks = planner.evaluate_safety(&points(19));
    let session: Vec<_> = checks.iter().filter(|c| c.label == "Total da Sessão").collect();
    assert_eq!(session.len(), 1);
    assert_eq!(session[0].level, SafetyLevel::Warning);

    let mut over = points(19);
    over[0].dosage = 25;
    let checks = planner.evaluate_safety(&over);
    let session: Vec<_> = checks.iter().filter(|c| c.label == "Total da Sessão").collect();
    assert_eq!(session.len(), 1);
    assert_eq!(session[0].level, SafetyLevel::Danger);
}

#[test]
fn without_detection_points_use_whole_image() {
    let planner = Planner::new();
    let point = InjectionPoint::new("a", "nasalis", 25.0, 50.0, 2);
    let placements = planner.photo_placements(&[point], Rect::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(placements[0].method, PlacementMethod::BoxFallback);
    assert!(Tolerance::DEFAULT.approx_eq_f64(placements[0].pixel.x, 50.0));
    assert!(Tolerance::DEFAULT.approx_eq_f64(placements[0].pixel.y, 50.0));
}

#[test]
fn unclassified_policy_passes_unknown_muscles() {
    let config = PlannerConfig {
        unknown_muscle: UnknownMusclePolicy::Unclassified,
        ..PlannerConfig::default()
    };
    let planner = Planner::from_config(config).expect("valid config");
    let point = InjectionPoint::new("x", "risorius", 5.0, 5.0, 3).with_depth(Depth::Deep);

    let validation = &planner.validations(std::slice::from_ref(&point))[0];
    assert!(validation.valid);
    assert_eq!(validation.zone, AnatomicalZone::Unknown);

    let surface = &planner.surface_placements(&[point])[0];
    assert_eq!(surface.zone, AnatomicalZone::Unknown);
}

#[test]
fn config_round_trips_through_json() {
    let json = serde_json::to_string(&PlannerConfig::default()).unwrap();
    let parsed: PlannerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, PlannerConfig::default());
    assert!(json.contains("\"unknownMuscle\":\"glabella\""));
}

#[test]
fn injection_point_serializes_in_camel_case() {
    let point = InjectionPoint::new("a", "procerus", 50.0, 30.0, 4);
    let value = serde_json::to_value(&point).unwrap();
    assert_eq!(value["depth"], "superficial");
    assert!(value.get("confidence").is_none());

    let parsed: InjectionPoint =
        serde_json::from_str(r#"{"id":"b","muscle":"mentalis","x":50,"y":87,"dosage":6,"confidence":0.9}"#)
            .unwrap();
    assert_eq!(parsed.depth, Depth::Superficial);
    assert_eq!(parsed.confidence, Some(0.9));
}

#[test]
fn unsided_names_keep_their_zone_and_limit() {
    let planner = Planner::new();
    let point = InjectionPoint::new("m", "Masseter", 12.0, 70.0, 40);

    let validation = &planner.validations(std::slice::from_ref(&point))[0];
    assert!(validation.valid);
    assert_eq!(validation.zone, AnatomicalZone::Masseter);
    assert_eq!(planner.surface_placements(std::slice::from_ref(&point))[0].zone, AnatomicalZone::Masseter);

    let checks = planner.evaluate_safety(&[point]);
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].level, SafetyLevel::Danger);
    assert_eq!(checks[0].message, "Masseter: 40U excede o limite máximo de 35U");
}
