use super::*;

const EPS: f64 = 1e-9;

fn assert_close(got: f64, want: f64) {
    assert!((got - want).abs() < EPS, "got {got}, want {want}");
}

fn identity_base(w: u32, h: u32) -> BaseFrame {
    BaseFrame {
        display: Transform2D::default(),
        intrinsic: Size::new(w, h).unwrap(),
    }
}

fn jacket() -> ClothingAsset {
    ClothingAsset::new(ClothingKind::Jacket, 300, 300, "jacket").unwrap()
}

fn cap() -> ClothingAsset {
    ClothingAsset::new(ClothingKind::Cap, 300, 200, "cap").unwrap()
}

fn torso_pose() -> Pose {
    Pose::new()
        .with(KeypointName::LeftShoulder, 100.0, 200.0)
        .with(KeypointName::RightShoulder, 200.0, 200.0)
        .with(KeypointName::LeftHip, 110.0, 400.0)
        .with(KeypointName::RightHip, 190.0, 400.0)
}

fn face_pose(eye_l: (f64, f64), eye_r: (f64, f64)) -> Pose {
    Pose::new()
        .with(KeypointName::Nose, 150.0, 120.0)
        .with(KeypointName::LeftEye, eye_l.0, eye_l.1)
        .with(KeypointName::RightEye, eye_r.0, eye_r.1)
}

#[test]
fn torso_golden_values() {
    let placed = PlacementRules::default().place_explained(
        ClothingKind::Jacket,
        Some(&torso_pose()),
        &jacket(),
        identity_base(400, 600),
    );
    assert_eq!(placed.rule, PlacementRule::Torso);

    let t = placed.transform;
    // torsoWidth = 130, torsoHeight = 240 -> max(130/300, 240/300) = 0.8
    assert_close(t.scale_x, 0.8);
    assert_close(t.scale_y, 0.8);
    // shoulder midpoint (150, 200); 300 * 0.8 = 240 wide, lifted by 20% of 240
    assert_close(t.left, 30.0);
    assert_close(t.top, 152.0);
    assert_eq!(t.rotation, 0.0);
}

#[test]
fn hoodie_uses_the_torso_rule_too() {
    let hoodie = ClothingAsset::new(ClothingKind::Hoodie, 300, 300, "hoodie").unwrap();
    let placed = PlacementRules::default().place_explained(
        ClothingKind::Hoodie,
        Some(&torso_pose()),
        &hoodie,
        identity_base(400, 600),
    );
    assert_eq!(placed.rule, PlacementRule::Torso);
    assert_close(placed.transform.scale_x, 0.8);
}

#[test]
fn keypoints_are_mapped_into_display_space_first() {
    let base = BaseFrame {
        display: Transform2D::uniform(0.5, 50.0, 20.0),
        intrinsic: Size::new(800, 1000).unwrap(),
    };
    let t = compute_initial_placement(ClothingKind::Jacket, Some(&torso_pose()), &jacket(), base);

    // Display shoulders (100,120)/(150,120), hips (105,220)/(145,220).
    // width 50 * 1.3 = 65, height 100 * 1.2 = 120 -> scale 0.4
    assert_close(t.scale_x, 0.4);
    assert_close(t.left, 125.0 - 60.0);
    assert_close(t.top, 120.0 - 300.0 * 0.4 * 0.2);
}

#[test]
fn missing_hips_fall_back_exactly() {
    let mut pose = torso_pose();
    pose.remove(KeypointName::LeftHip);
    let base = BaseFrame {
        display: Transform2D::uniform(0.5, 10.0, 40.0),
        intrinsic: Size::new(800, 600).unwrap(),
    };

    let placed = PlacementRules::default().place_explained(
        ClothingKind::Jacket,
        Some(&pose),
        &jacket(),
        base,
    );
    assert_eq!(placed.rule, PlacementRule::Fallback);
    // displayed base is 400x300
    assert_eq!(
        placed.transform,
        Transform2D::uniform(0.5, 10.0 + 100.0, 40.0 + 45.0)
    );
}

#[test]
fn absent_and_empty_pose_fall_back() {
    let base = identity_base(400, 600);
    let expected = Transform2D::uniform(0.5, 100.0, 90.0);
    for kind in ClothingKind::ALL {
        let asset = ClothingAsset::new(kind, 300, 300, kind.as_str()).unwrap();
        assert_eq!(compute_initial_placement(kind, None, &asset, base), expected);
        assert_eq!(
            compute_initial_placement(kind, Some(&Pose::new()), &asset, base),
            expected
        );
    }
}

#[test]
fn torso_pose_does_not_place_a_cap() {
    let placed = PlacementRules::default().place_explained(
        ClothingKind::Cap,
        Some(&torso_pose()),
        &cap(),
        identity_base(400, 600),
    );
    assert_eq!(placed.rule, PlacementRule::Fallback);
}

#[test]
fn cap_width_is_lower_bounded_by_base_width() {
    let placed = PlacementRules::default().place_explained(
        ClothingKind::Cap,
        Some(&face_pose((140.0, 100.0), (160.0, 100.0))),
        &cap(),
        identity_base(400, 500),
    );
    assert_eq!(placed.rule, PlacementRule::Head);

    // eye span 20 * 2.5 = 50 < 400 * 0.2 = 80
    let t = placed.transform;
    let scale = 80.0 / 300.0;
    assert_close(t.scale_x, scale);
    assert_close(t.left, 150.0 - 40.0);
    assert_close(t.top, 100.0 - 200.0 * scale * 0.7);
}

#[test]
fn cap_anchors_on_the_higher_eye() {
    let t = compute_initial_placement(
        ClothingKind::Cap,
        Some(&face_pose((100.0, 110.0), (200.0, 90.0))),
        &cap(),
        identity_base(400, 500),
    );
    let scale = 250.0 / 300.0;
    assert_close(t.scale_x, scale);
    assert_close(t.left, 150.0 - 125.0);
    assert_close(t.top, 90.0 - 200.0 * scale * 0.7);
}

#[test]
fn degenerate_torso_collapses_to_fallback() {
    // All four points coincide: the torso rule would yield a zero scale.
    let pose = Pose::new()
        .with(KeypointName::LeftShoulder, 50.0, 50.0)
        .with(KeypointName::RightShoulder, 50.0, 50.0)
        .with(KeypointName::LeftHip, 50.0, 50.0)
        .with(KeypointName::RightHip, 50.0, 50.0);
    let placed = PlacementRules::default().place_explained(
        ClothingKind::Jacket,
        Some(&pose),
        &jacket(),
        identity_base(400, 600),
    );
    assert_eq!(placed.rule, PlacementRule::Fallback);
    assert!(placed.transform.has_positive_scale());
}

#[test]
fn every_kind_and_pose_yields_positive_finite_transform() {
    let poses = [
        None,
        Some(Pose::new()),
        Some(torso_pose()),
        Some(face_pose((140.0, 100.0), (160.0, 100.0))),
        Some(torso_pose().with(KeypointName::Nose, 1e300, 1e300)),
    ];
    let bases = [
        identity_base(1, 1),
        identity_base(4000, 3000),
        BaseFrame {
            display: Transform2D::uniform(0.01, -5.0, 7.0),
            intrinsic: Size::new(640, 480).unwrap(),
        },
    ];
    for kind in ClothingKind::ALL {
        let asset = ClothingAsset::new(kind, 37, 91, "a").unwrap();
        for pose in &poses {
            for base in bases {
                let t = compute_initial_placement(kind, pose.as_ref(), &asset, base);
                assert!(t.has_positive_scale(), "{kind} {t:?}");
                assert!(t.is_finite(), "{kind} {t:?}");
                assert_eq!(t.rotation, 0.0);
            }
        }
    }
}

#[test]
fn rules_deserialize_with_defaults_and_reject_unknown_fields() {
    let rules: PlacementRules = serde_json::from_str(r#"{"torso_top_lift": 0.1}"#).unwrap();
    assert_eq!(rules.torso_top_lift, 0.1);
    assert_eq!(rules.fallback_scale, 0.5);
    assert!(serde_json::from_str::<PlacementRules>(r#"{"nope": 1}"#).is_err());
}
