// tests/engine_tests.rs
use opencv::{
    core::{Mat, Point, Rect, Scalar, Size, Vec3b, CV_8UC3},
    imgproc,
    prelude::*,
};
use snooker_core::{ColourId, PottedBalls, ShotState, TrackerSettings};
use snooker_cv::{
    traits::TrackerObserver, BallTrackingEngine, CropMode, FrameOptions, PassKind, Result,
    TrackerConfig, TrackerError,
};
use std::cell::RefCell;
use std::rc::Rc;

const WIDTH: i32 = 800;
const HEIGHT: i32 = 450;

fn cloth() -> Scalar {
    Scalar::new(100.0, 150.0, 100.0, 0.0)
}

fn white() -> Scalar {
    Scalar::all(255.0)
}

fn red() -> Scalar {
    Scalar::new(85.0, 0.0, 255.0, 0.0)
}

fn draw_ball(frame: &mut Mat, at: (i32, i32), colour: Scalar) -> opencv::Result<()> {
    imgproc::circle(
        frame,
        Point::new(at.0, at.1),
        12,
        colour,
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )
}

/// Cloth-coloured frame with optional white and red balls.
fn table_frame(white_at: Option<(i32, i32)>, red_at: Option<(i32, i32)>) -> opencv::Result<Mat> {
    let mut frame = Mat::new_rows_cols_with_default(HEIGHT, WIDTH, CV_8UC3, cloth())?;
    if let Some(at) = white_at {
        draw_ball(&mut frame, at, white())?;
    }
    if let Some(at) = red_at {
        draw_ball(&mut frame, at, red())?;
    }
    Ok(frame)
}

fn white_and_red_settings() -> TrackerSettings {
    let mut settings = TrackerSettings::default();
    settings
        .colour_detection_settings
        .detect_only(&[ColourId::White, ColourId::Red]);
    settings
}

fn white_and_red_engine() -> Result<BallTrackingEngine> {
    Ok(BallTrackingEngine::new(TrackerConfig::from_settings(
        white_and_red_settings(),
    ))?)
}

#[derive(Default)]
struct PottedRecorder {
    events: Rc<RefCell<Vec<PottedBalls>>>,
    white_changes: Rc<RefCell<Vec<bool>>>,
}

impl TrackerObserver for PottedRecorder {
    fn white_status_changed(&mut self, moving: bool) {
        self.white_changes.borrow_mut().push(moving);
    }

    fn ball_potted(&mut self, potted: &PottedBalls) {
        self.events.borrow_mut().push(*potted);
    }
}

#[test]
fn test_initial_frame_seeds_snapshots() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    let output = engine.process_frame(
        &table_frame(Some((100, 100)), Some((200, 200)))?,
        &FrameOptions::default(),
    )?;

    assert_eq!(output.pass, PassKind::Classification);
    assert!(output.potted.is_none());
    for snapshot in [engine.last_shot_snapshot(), engine.cur_shot_snapshot()] {
        assert_eq!(snapshot.count(ColourId::White), 1);
        assert_eq!(snapshot.count(ColourId::Red), 1);
        assert_eq!(snapshot.count(ColourId::Black), 0);
    }

    let white_ball = engine.cur_shot_snapshot().white().copied();
    let white_ball = white_ball.ok_or_else(|| anyhow::anyhow!("white not tracked"))?;
    assert!((white_ball.blob.x - 100.0).abs() < 1.5);
    assert!((white_ball.blob.y - 100.0).abs() < 1.5);
    Ok(())
}

#[test]
fn test_red_potted_once_when_white_stops() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    let recorder = PottedRecorder::default();
    let events = Rc::clone(&recorder.events);
    let white_changes = Rc::clone(&recorder.white_changes);
    engine.add_observer(Box::new(recorder));

    let options = FrameOptions::default();
    let mut potted = Vec::new();

    let opening = table_frame(Some((100, 100)), Some((200, 200)))?;
    potted.push(engine.process_frame(&opening, &options)?.potted);
    for step in 1..5 {
        let frame = table_frame(Some((100 + 8 * step, 100)), Some((200, 200)))?;
        potted.push(engine.process_frame(&frame, &options)?.potted);
    }

    // White has moved 40 px and the red has left the table.
    let stopped_here = table_frame(Some((140, 100)), None)?;
    potted.push(engine.process_frame(&stopped_here, &options)?.potted);
    assert!(engine.white_is_moving());
    assert_eq!(engine.shot_state(), ShotState::InProgress);

    for _ in 6..10 {
        potted.push(engine.process_frame(&stopped_here, &options)?.potted);
    }
    let finished = engine.process_frame(&stopped_here, &options)?;
    assert_eq!(finished.potted_colour(), Some(ColourId::Red));
    assert_eq!(finished.potted_count(), 1);
    potted.push(finished.potted);
    assert!(!engine.white_is_moving());
    assert_eq!(engine.shot_state(), ShotState::Idle);

    let reported: Vec<(usize, PottedBalls)> = potted
        .into_iter()
        .enumerate()
        .filter_map(|(frame, event)| event.map(|e| (frame, e)))
        .collect();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].0, 10);
    assert_eq!(reported[0].1.colour, ColourId::Red);
    assert_eq!(reported[0].1.count, 1);
    assert_eq!(reported[0].1.to_string(), "Potted 1 red/s");

    assert_eq!(*events.borrow(), vec![reported[0].1]);
    assert_eq!(*white_changes.borrow(), vec![true, false]);

    // The next shot starts from the post-pot layout.
    assert_eq!(engine.last_shot_snapshot().count(ColourId::Red), 0);
    let more = engine.process_frame(&table_frame(Some((140, 100)), None)?, &options)?;
    assert!(more.potted.is_none());
    Ok(())
}

#[test]
fn test_table_detection_without_cloth_fails_cleanly() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    engine.process_frame(
        &table_frame(Some((100, 100)), Some((200, 200)))?,
        &FrameOptions::default(),
    )?;

    let counter = engine.frame_counter();
    let last = engine.last_shot_snapshot().clone();
    let cur = engine.cur_shot_snapshot().clone();
    let temp = engine.temp_snapshot().clone();
    let stats = engine.stats().clone();

    let black = Mat::new_rows_cols_with_default(HEIGHT, WIDTH, CV_8UC3, Scalar::all(0.0))?;
    let options = FrameOptions {
        detect_table: true,
        ..FrameOptions::default()
    };
    let result = engine.process_frame(&black, &options);

    assert!(matches!(result, Err(TrackerError::NoContours)));
    assert_eq!(engine.frame_counter(), counter);
    assert_eq!(engine.last_shot_snapshot(), &last);
    assert_eq!(engine.cur_shot_snapshot(), &cur);
    assert_eq!(engine.temp_snapshot(), &temp);
    assert_eq!(engine.stats(), &stats);
    assert!(engine.table_boundary().is_none());
    Ok(())
}

#[test]
fn test_missing_table_range_is_an_error() -> Result<()> {
    let mut settings = white_and_red_settings();
    settings
        .colour_detection_settings
        .colours
        .remove(&ColourId::Table);
    let mut engine = BallTrackingEngine::new(TrackerConfig::from_settings(settings))?;

    let frame = table_frame(Some((100, 100)), None)?;
    let result = engine.process_frame(&frame, &FrameOptions::default());

    assert!(matches!(result, Err(TrackerError::MissingMask(ColourId::Table))));
    assert_eq!(engine.frame_counter(), 0);
    assert!(engine.last_pass().is_none());
    Ok(())
}

#[test]
fn test_sampling_cadence() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    let frame = table_frame(Some((100, 100)), Some((200, 200)))?;

    let mut passes = Vec::new();
    for _ in 0..11 {
        engine.process_frame(&frame, &FrameOptions::default())?;
        passes.push(engine.last_pass());
    }

    let classified: Vec<usize> = passes
        .iter()
        .enumerate()
        .filter(|(_, pass)| **pass == Some(PassKind::Classification))
        .map(|(call, _)| call)
        .collect();
    assert_eq!(classified, vec![0, 5, 10]);

    let stats = engine.stats();
    assert_eq!(stats.frames_processed, 11);
    assert_eq!(stats.classification_passes, 3);
    assert_eq!(stats.matching_passes, 8);
    Ok(())
}

#[test]
fn test_matching_moves_known_balls_only() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    engine.process_frame(&table_frame(Some((100, 100)), None)?, &FrameOptions::default())?;

    // A new red appears between sampling passes: not added by matching.
    engine.process_frame(
        &table_frame(Some((105, 100)), Some((400, 300)))?,
        &FrameOptions::default(),
    )?;

    let balls = engine.balls();
    assert!(balls[&ColourId::Red].is_empty());
    assert_eq!(balls[&ColourId::White].len(), 1);
    assert!((balls[&ColourId::White][0].blob.x - 105.0).abs() < 1.5);
    Ok(())
}

#[test]
fn test_classification_is_deterministic() -> Result<()> {
    let frame = table_frame(Some((100, 100)), Some((200, 200)))?;

    let mut first = white_and_red_engine()?;
    first.process_frame(&frame, &FrameOptions::default())?;

    for _ in 0..3 {
        let mut again = white_and_red_engine()?;
        again.process_frame(&frame, &FrameOptions::default())?;
        assert_eq!(again.balls(), first.balls());
    }
    Ok(())
}

#[test]
fn test_reloaded_settings_classify_identically() -> Result<()> {
    let settings = white_and_red_settings();
    let path = std::env::temp_dir().join(format!("snooker-settings-{}.json", std::process::id()));
    settings.save(&path)?;
    let reloaded = TrackerSettings::load(&path)?;
    std::fs::remove_file(&path)?;
    assert_eq!(reloaded, settings);

    let frame = table_frame(Some((100, 100)), Some((200, 200)))?;
    let mut before_save = BallTrackingEngine::new(TrackerConfig::from_settings(settings))?;
    let mut restored = BallTrackingEngine::new(TrackerConfig::from_settings(reloaded))?;
    before_save.process_frame(&frame, &FrameOptions::default())?;
    restored.process_frame(&frame, &FrameOptions::default())?;

    assert_eq!(before_save.balls(), restored.balls());
    assert_eq!(before_save.cur_shot_snapshot(), restored.cur_shot_snapshot());
    Ok(())
}

/// Cloth only inside (100, 50)..(700, 400), black around it.
fn framed_table(white_at: (i32, i32)) -> opencv::Result<Mat> {
    let mut frame = Mat::new_rows_cols_with_default(HEIGHT, WIDTH, CV_8UC3, Scalar::all(0.0))?;
    imgproc::rectangle(
        &mut frame,
        Rect::new(100, 50, 600, 350),
        cloth(),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    draw_ball(&mut frame, white_at, white())?;
    Ok(frame)
}

#[test]
fn test_crop_to_table_boundary() -> Result<()> {
    let mut config = TrackerConfig::from_settings(white_and_red_settings());
    config.crop_mode = CropMode::Crop;
    let mut engine = BallTrackingEngine::new(config)?;

    let options = FrameOptions {
        detect_table: true,
        crop_frames: true,
        ..FrameOptions::default()
    };
    let output = engine.process_frame(&framed_table((300, 200))?, &options)?;

    assert_eq!(output.frame.size()?, Size::new(600, 350));
    assert_eq!(output.binary.size()?, Size::new(600, 350));

    let white_ball = engine.cur_shot_snapshot().white().copied();
    let white_ball = white_ball.ok_or_else(|| anyhow::anyhow!("white not tracked"))?;
    assert!((white_ball.blob.x - 200.0).abs() < 1.5);
    assert!((white_ball.blob.y - 150.0).abs() < 1.5);
    Ok(())
}

#[test]
fn test_boundary_overlay_when_not_cropping() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    let options = FrameOptions {
        detect_table: true,
        ..FrameOptions::default()
    };
    let output = engine.process_frame(&framed_table((300, 200))?, &options)?;

    assert!(engine.table_boundary().is_some());
    assert_eq!(output.frame.size()?, Size::new(WIDTH, HEIGHT));
    let edge = *output.frame.at_2d::<Vec3b>(200, 100)?;
    assert_eq!((edge[0], edge[1], edge[2]), (255, 255, 255));
    Ok(())
}

#[test]
fn test_mask_colour_keeps_only_that_colour() -> Result<()> {
    let mut config = TrackerConfig::from_settings(white_and_red_settings());
    config.visualization.draw_labels = false;
    let mut engine = BallTrackingEngine::new(config)?;

    let options = FrameOptions {
        detect_colour: Some(ColourId::Red),
        mask_colour: true,
        ..FrameOptions::default()
    };
    let output = engine.process_frame(&table_frame(Some((100, 100)), Some((200, 200)))?, &options)?;

    // Cloth and white are masked out, the red survives.
    let cloth_px = *output.frame.at_2d::<Vec3b>(300, 500)?;
    let white_px = *output.frame.at_2d::<Vec3b>(100, 100)?;
    let red_px = *output.frame.at_2d::<Vec3b>(200, 200)?;
    assert_eq!((cloth_px[0], cloth_px[1], cloth_px[2]), (0, 0, 0));
    assert_eq!((white_px[0], white_px[1], white_px[2]), (0, 0, 0));
    assert_eq!((red_px[0], red_px[1], red_px[2]), (85, 0, 255));
    Ok(())
}

#[test]
fn test_snapshot_report_lists_counts() -> Result<()> {
    let mut engine = white_and_red_engine()?;
    engine.process_frame(
        &table_frame(Some((100, 100)), Some((200, 200)))?,
        &FrameOptions::default(),
    )?;

    let report = engine.snapshot_report();
    assert!(report.contains("PREVIOUS SNAPSHOT | CURRENT SNAPSHOT"));
    assert!(report.contains("reds: 1"));
    Ok(())
}
