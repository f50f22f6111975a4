use super::*;

#[test]
fn names_round_trip_through_strings() {
    for name in KeypointName::ALL {
        assert_eq!(name.as_str().parse::<KeypointName>().unwrap(), name);
    }
    assert!("left_foot".parse::<KeypointName>().is_err());
}

#[test]
fn json_list_parses_known_names_and_skips_unknown() {
    let pose = Pose::from_json_str(
        r#"[
            {"name": "nose", "x": 10, "y": 20, "score": 0.9},
            {"name": "left_toe", "x": 1, "y": 1},
            {"name": "left_eye", "x": 5.5, "y": 6.5}
        ]"#,
    )
    .unwrap();

    assert_eq!(pose.len(), 2);
    assert_eq!(
        pose.get(KeypointName::Nose),
        Some(&Keypoint::new(10.0, 20.0).with_score(0.9))
    );
    assert_eq!(pose.get(KeypointName::LeftEye).unwrap().score, None);
    assert!(pose.get(KeypointName::RightEye).is_none());
}

#[test]
fn json_duplicates_keep_last() {
    let pose = Pose::from_json_str(
        r#"[{"name": "nose", "x": 1, "y": 1}, {"name": "nose", "x": 2, "y": 3}]"#,
    )
    .unwrap();
    assert_eq!(pose.get(KeypointName::Nose).unwrap().point(), Point::new(2.0, 3.0));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Pose::from_json_str("{").unwrap_err();
    assert!(matches!(err, DrapeError::Serde(_)));
}

#[test]
fn non_finite_points_are_absent() {
    let pose = Pose::new().with(KeypointName::Nose, f64::NAN, 1.0);
    assert!(pose.get(KeypointName::Nose).is_none());
    assert!(pose.is_empty());
}

#[test]
fn require_reports_missing_points() {
    let pose = Pose::new()
        .with(KeypointName::LeftShoulder, 1.0, 2.0)
        .with(KeypointName::RightShoulder, 3.0, 4.0);

    let [l, r] = pose
        .require([KeypointName::LeftShoulder, KeypointName::RightShoulder])
        .unwrap();
    assert_eq!((l.x, r.x), (1.0, 3.0));

    assert!(
        pose.require([KeypointName::LeftShoulder, KeypointName::LeftHip])
            .is_none()
    );
}

#[test]
fn min_score_drops_low_confidence_but_keeps_unscored() {
    let mut pose = Pose::new().with(KeypointName::Nose, 1.0, 1.0);
    pose.set(KeypointName::LeftEye, Keypoint::new(2.0, 2.0).with_score(0.1));
    pose.set(KeypointName::RightEye, Keypoint::new(3.0, 3.0).with_score(0.8));

    let filtered = pose.with_min_score(0.3);
    assert!(filtered.get(KeypointName::Nose).is_some());
    assert!(filtered.get(KeypointName::LeftEye).is_none());
    assert!(filtered.get(KeypointName::RightEye).is_some());
}

#[test]
fn scaling_moves_points_and_keeps_scores() {
    let mut pose = Pose::new().with(KeypointName::LeftHip, 400.0, 300.0);
    pose.set(KeypointName::Nose, Keypoint::new(10.0, 20.0).with_score(0.7));

    let pose = pose.scaled(0.5, 0.25);
    let hip = pose.get(KeypointName::LeftHip).unwrap();
    assert_eq!((hip.x, hip.y), (200.0, 75.0));
    let nose = pose.get(KeypointName::Nose).unwrap();
    assert_eq!((nose.x, nose.y, nose.score), (5.0, 5.0, Some(0.7)));
    assert_eq!(pose.len(), 2);
}

#[test]
fn json_output_parses_back_to_same_pose() {
    let pose = Pose::new()
        .with(KeypointName::LeftHip, 110.0, 400.0)
        .with(KeypointName::RightHip, 190.0, 400.0);
    let s = pose.to_json_string().unwrap();
    assert_eq!(Pose::from_json_str(&s).unwrap(), pose);
}
