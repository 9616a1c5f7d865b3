//! End-to-end swing analysis on synthetic rallies

mod common;

use common::{Rally, Stroke, FPS};
use swing_analysis::detection::{
    MetricType, SeriesQuery, SeriesSide, SwingPhase, WristSelection,
};
use swing_analysis::{
    AnalysisConfig, AnalysisResult, Handedness, PoseModel, PoseSequence, Side,
    SwingAnalysisError, SwingAnalyzer, SwingType,
};

fn analyze_with(config: AnalysisConfig, poses: &PoseSequence) -> AnalysisResult {
    SwingAnalyzer::new(config)
        .expect("valid config")
        .analyze(poses)
        .expect("analysis succeeds")
}

fn analyze(poses: &PoseSequence) -> AnalysisResult {
    analyze_with(AnalysisConfig::default(), poses)
}

fn contacts(result: &AnalysisResult) -> Vec<u32> {
    result.swings.iter().map(|s| s.contact_frame).collect()
}

fn forehand_rally() -> PoseSequence {
    Rally::new(330)
        .stroke(60, Stroke::Forehand)
        .stroke(150, Stroke::Forehand)
        .stroke(240, Stroke::Forehand)
        .build()
}

#[test]
fn test_forehand_rally() {
    let result = analyze(&forehand_rally());

    assert_eq!(contacts(&result), vec![60, 150, 240]);
    assert!(result.swings.iter().all(|s| s.swing_type == SwingType::Forehand));
    assert_eq!(result.summary.total_swings, 3);
    assert_eq!(result.summary.forehands, 3);

    for swing in &result.swings {
        assert_eq!(swing.dominant_side, Side::Right);
        assert!(swing.peak_velocity_px > 50.0 && swing.peak_velocity_px < 62.0);
        assert!(swing.peak_rotation_velocity.is_some_and(|r| r > 2.0));
        assert!(swing.rotation_range.is_some_and(|r| r > 40.0));
        assert!(swing.confidence > 0.5 && swing.confidence <= 1.0);
        assert!(swing.key_positions.loading_peak.is_some());
        assert!(swing.key_positions.serve.is_none());
    }
}

#[test]
fn test_turn_around_vertical_axis_is_detected() {
    // Shoulders stay level in the image; only their width changes
    let poses = Rally::new(330)
        .axial()
        .stroke(60, Stroke::Forehand)
        .stroke(150, Stroke::Forehand)
        .stroke(240, Stroke::Forehand)
        .build();
    let result = analyze(&poses);

    assert_eq!(contacts(&result), vec![60, 150, 240]);
    assert!(result.swings.iter().all(|s| s.swing_type == SwingType::Forehand));
    for swing in &result.swings {
        let contact = result.frame(swing.contact_frame).unwrap();
        assert!(contact.rotation.shoulder_angular_velocity.unwrap().abs() < 1e-6);
        assert!(contact.rotation.orientation_delta.is_some_and(|r| r > 5.0));
        assert!(swing.peak_rotation_velocity.is_some_and(|r| r > 2.0));
    }

    let strict = analyze_with(AnalysisConfig::strict(), &poses);
    assert_eq!(strict.swings.len(), 3);
}

#[test]
fn test_backhands() {
    let one_handed = analyze(
        &Rally::new(240)
            .stroke(60, Stroke::Backhand)
            .stroke(160, Stroke::Backhand)
            .build(),
    );
    assert_eq!(contacts(&one_handed), vec![60, 160]);
    assert!(one_handed
        .swings
        .iter()
        .all(|s| s.swing_type == SwingType::Backhand));

    let two_handed = analyze(&Rally::new(180).stroke(90, Stroke::TwoHandedBackhand).build());
    assert_eq!(contacts(&two_handed), vec![90]);
    assert_eq!(two_handed.swings[0].swing_type, SwingType::BackhandTwoHanded);
    assert_eq!(two_handed.summary.two_handed_backhands, 1);
}

#[test]
fn test_left_handed_player_mirrors_direction() {
    // Trunk turning the backhand way for a right-hander is a lefty's forehand
    let poses = Rally::new(180).stroke(90, Stroke::Backhand).build();
    let lefty = AnalysisConfig {
        handedness: Handedness::Left,
        ..AnalysisConfig::default()
    };
    let result = analyze_with(lefty, &poses);
    assert_eq!(result.swings.len(), 1);
    assert_eq!(result.swings[0].swing_type, SwingType::Forehand);
}

#[test]
fn test_serve() {
    let poses = Rally::new(200).stroke(120, Stroke::Serve).build();
    let config = AnalysisConfig {
        wrist_selection: WristSelection::Dominant,
        ..AnalysisConfig::default()
    };
    let result = analyze_with(config, &poses);

    assert_eq!(contacts(&result), vec![120]);
    let serve = &result.swings[0];
    assert_eq!(serve.swing_type, SwingType::Serve);
    assert_eq!(result.summary.serves, 1);

    let positions = serve.key_positions.serve.as_ref().expect("serve positions");
    let contact = positions.contact_point.expect("contact point");
    let trophy = positions.trophy.expect("trophy position");
    let landing = positions.landing.expect("landing");
    assert!(contact.frame >= serve.clip.start_frame && contact.frame <= serve.clip.end_frame);
    // Trophy position 0.4 s before the highest racket-wrist frame
    assert_eq!(contact.frame - trophy.frame, 12);
    assert!(landing.frame >= contact.frame);
    assert!(serve.key_positions.loading_peak.is_none());
}

#[test]
fn test_still_player_has_no_swings() {
    let result = analyze(&Rally::new(120).build());
    assert!(result.swings.is_empty());
    assert_eq!(result.summary.total_swings, 0);
    assert_eq!(result.frames.len(), 120);
    assert!(result.frames.iter().all(|m| m.phase == SwingPhase::Neutral));
}

#[test]
fn test_empty_sequence_is_no_data() {
    let empty = PoseSequence::new(FPS, PoseModel::Coco17);
    let error = SwingAnalyzer::default().analyze(&empty).unwrap_err();
    assert!(matches!(error, SwingAnalysisError::NoData));
}

#[test]
fn test_analysis_is_idempotent() {
    let poses = forehand_rally();
    let analyzer = SwingAnalyzer::default();
    let first = analyzer.analyze(&poses).unwrap();
    let second = analyzer.analyze(&poses).unwrap();
    assert!(first.same_analysis(&second));
}

#[test]
fn test_frames_and_phase_boundaries_are_ordered() {
    let result = analyze(&forehand_rally());

    assert!(result.frames.windows(2).all(|w| w[0].frame < w[1].frame));
    assert!(result
        .swings
        .windows(2)
        .all(|w| w[0].contact_frame < w[1].contact_frame));

    for swing in &result.swings {
        let p = swing.phases;
        assert!(p.loading_start <= p.swing_start);
        assert!(p.swing_start <= p.contact);
        assert!(p.contact <= p.follow_end);
        assert!(swing.clip.start_frame <= p.follow_end && p.follow_end <= swing.clip.end_frame);

        let at = |frame| result.frame(frame).map(|m| m.phase);
        assert_eq!(at(p.contact), Some(SwingPhase::Contact));
        if p.follow_end < swing.clip.end_frame {
            assert_eq!(at(p.follow_end + 1), Some(SwingPhase::Recovery));
        }
    }
}

#[test]
fn test_no_non_finite_values() {
    let poses = Rally::new(240)
        .stroke(80, Stroke::Forehand)
        .stroke(170, Stroke::Backhand)
        .drop_frames([20, 21, 130])
        .build();
    let result = analyze(&poses);

    assert_eq!(result.frames.len(), 240);
    for m in &result.frames {
        for (name, value) in m.numeric_values() {
            assert!(
                value.map_or(true, f64::is_finite),
                "{name} at frame {} is {value:?}",
                m.frame
            );
        }
    }
    // Missing poses leave gaps, not zeros
    let dropped = result.frame(21).unwrap();
    assert_eq!(dropped.velocity.wrist.raw_px.right, None);
    assert_eq!(dropped.swing_score, None);
    assert_eq!(contacts(&result), vec![80, 170]);
}

#[test]
fn test_speed_conversion() {
    let result = analyze(&forehand_rally());

    assert!(!result.metadata.used_fallback_scale);
    assert!((result.metadata.torso_height_px - 200.0).abs() < 1e-6);
    assert!((result.metadata.meters_per_pixel - 0.00255).abs() < 1e-9);

    let factor = result.metadata.meters_per_pixel * FPS * 3.6;
    for swing in &result.swings {
        let expected = swing.peak_velocity_px * factor;
        assert!((swing.peak_velocity_kmh - expected).abs() < 1e-9);
    }
}

#[test]
fn test_close_detections_merge_by_clip_overlap() {
    // Two bursts 40 frames apart: clips of 91 frames overlap by about 56%
    let poses = Rally::new(260)
        .stroke(90, Stroke::Forehand)
        .stroke(130, Stroke::Forehand)
        .build();

    let separate = analyze(&poses);
    assert_eq!(contacts(&separate), vec![90, 130]);

    let merging = AnalysisConfig {
        merge_overlap_threshold: 0.5,
        ..AnalysisConfig::default()
    };
    let merged = analyze_with(merging, &poses);
    assert_eq!(merged.swings.len(), 1);
    let swing = &merged.swings[0];
    assert_eq!(swing.phases.loading_start, separate.swings[0].phases.loading_start);
    assert_eq!(swing.phases.follow_end, separate.swings[1].phases.follow_end);
    assert_eq!(swing.clip.start_frame, separate.swings[0].clip.start_frame);
    assert_eq!(swing.clip.end_frame, separate.swings[1].clip.end_frame);
}

#[test]
fn test_blazepose_input_matches_coco() {
    let rally = Rally::new(180).stroke(90, Stroke::Forehand);
    let coco = analyze(&rally.clone().build());
    let blaze = analyze(&rally.model(PoseModel::BlazePose33).build());

    assert_eq!(contacts(&coco), contacts(&blaze));
    assert_eq!(coco.swings[0].swing_type, blaze.swings[0].swing_type);
    assert!((coco.swings[0].peak_velocity_kmh - blaze.swings[0].peak_velocity_kmh).abs() < 1e-9);
}

#[test]
fn test_chart_series_peaks_at_contact() {
    let result = analyze(&Rally::new(180).stroke(90, Stroke::Forehand).build());
    let query = SeriesQuery::new(MetricType::VelocityKmh)
        .side(SeriesSide::Right)
        .frames(Some(60), Some(120));
    let points = result.series(&query).unwrap();

    assert_eq!(points.len(), 61);
    let fastest = points
        .iter()
        .filter(|p| p.value.is_some())
        .max_by(|a, b| a.value.unwrap().total_cmp(&b.value.unwrap()))
        .unwrap();
    assert_eq!(fastest.frame, 90);
    assert_eq!(fastest.phase, SwingPhase::Contact);
}
