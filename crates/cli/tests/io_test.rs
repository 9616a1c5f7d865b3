//! File handling of the command line tool

use std::fs;
use std::path::Path;
use swing_analysis_cli::{
    load_config, load_poses, resolve_config, result_path, write_json, HandednessArg, Preset,
};
use swing_analysis_common::Handedness;
use swing_analysis_detection::{AnalysisConfig, SwingAnalyzer, WristSelection};
use swing_analysis_pose::{Keypoint, Pose, PoseModel, PoseSequence};

fn still_sequence(frames: u32) -> PoseSequence {
    let mut poses = PoseSequence::new(30.0, PoseModel::Coco17);
    let keypoints: Vec<Keypoint> = (0..17)
        .map(|i| Keypoint::new(400.0 + f64::from(i) * 10.0, 300.0 + f64::from(i) * 20.0, 0.9))
        .collect();
    for frame in 0..frames {
        poses.insert(frame, vec![Pose::new(keypoints.clone())]);
    }
    poses
}

#[test]
fn test_yaml_config_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swing.yaml");
    fs::write(&path, "min_velocity_kmh: 6.5\nwrist_selection: dominant\n").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.min_velocity_kmh, 6.5);
    assert_eq!(config.wrist_selection, WristSelection::Dominant);
    assert_eq!(config.score_percentile, AnalysisConfig::default().score_percentile);
}

#[test]
fn test_json_config_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swing.json");
    fs::write(&path, r#"{"handedness": "right", "merge_overlap_threshold": 0.5}"#).unwrap();

    let config =
        resolve_config(Some(path.as_path()), Preset::Strict, Some(HandednessArg::Left)).unwrap();
    // The file wins over the preset, the flag over the file
    assert_eq!(config.min_velocity_kmh, AnalysisConfig::default().min_velocity_kmh);
    assert_eq!(config.merge_overlap_threshold, 0.5);
    assert_eq!(config.handedness, Handedness::Left);

    let preset = resolve_config(None, Preset::Sensitive, None).unwrap();
    assert_eq!(preset, AnalysisConfig::sensitive());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"score_percentile": 140.0}"#).unwrap();
    assert!(resolve_config(Some(path.as_path()), Preset::Default, None).is_err());

    fs::write(&path, "{ not json").unwrap();
    assert!(load_config(&path).is_err());
    assert!(load_config(Path::new("/nonexistent/swing.yaml")).is_err());
}

#[test]
fn test_pose_file_round_trip_through_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rally.json");
    write_json(&still_sequence(60), Some(input.as_path()), false).unwrap();

    let poses = load_poses(&input).unwrap();
    assert_eq!(poses.len(), 60);
    assert_eq!(poses.model, PoseModel::Coco17);

    let result = SwingAnalyzer::new(AnalysisConfig::default())
        .unwrap()
        .analyze(&poses)
        .unwrap();
    assert!(result.swings.is_empty());

    let output = result_path(dir.path(), &input);
    write_json(&result, Some(output.as_path()), true).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("\"swings\": []"));
}

#[test]
fn test_unknown_pose_model_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("poses.json");
    fs::write(&input, r#"{"fps": 30.0, "model": "openpose25", "frames": {}}"#).unwrap();
    let error = load_poses(&input).unwrap_err();
    assert!(format!("{error:#}").contains("openpose25"));
}
