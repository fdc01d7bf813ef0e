//! Play-count reporting integration tests
//!
//! The media output's time-update notification drives `on_time_update`;
//! a play is reported once per playback instance after 30% of the track.

mod common;

use async_trait::async_trait;
use chorus_playback::{PlayReporter, PlaybackConfig, PlaybackEvent, RepeatMode, ReportError};
use common::*;
use mockall::mock;
use mockall::Sequence;
use std::sync::Arc;
use std::time::Duration;

mock! {
    pub Reporter {}

    #[async_trait]
    impl PlayReporter for Reporter {
        async fn report_play(&self, track_id: &str) -> Result<(), ReportError>;
    }
}

fn secs(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

#[tokio::test]
async fn test_reports_once_past_threshold() {
    let (controller, output) = controller();
    let mut reporter = MockReporter::new();
    reporter
        .expect_report_play()
        .withf(|track_id: &str| track_id == "1")
        .times(1)
        .returning(|_| Ok(()));
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let list = tracks(&["1", "2"]);
    controller.play(list[0].clone(), Some(list));

    // 180s track: threshold is 54s
    output.set_position(secs(30));
    controller.on_time_update().await;
    assert!(!controller.play_reported());

    output.set_position(secs(53));
    controller.on_time_update().await;
    assert!(!controller.play_reported());

    output.set_position(secs(55));
    controller.on_time_update().await;
    assert!(controller.play_reported());

    output.set_position(secs(120));
    controller.on_time_update().await;
}

#[tokio::test]
async fn test_successful_report_emits_event() {
    let (controller, output) = controller();
    let events = record_events(&controller);
    let mut reporter = MockReporter::new();
    reporter.expect_report_play().returning(|_| Ok(()));
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let list = tracks(&["1"]);
    controller.play(list[0].clone(), Some(list));
    output.set_position(secs(100));
    controller.on_time_update().await;

    let reported: Vec<String> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::PlayReported { track_id } => Some(track_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(reported, vec!["1"]);
}

#[tokio::test]
async fn test_report_failure_is_swallowed() {
    let (controller, output) = controller();
    let events = record_events(&controller);
    let mut reporter = MockReporter::new();
    reporter
        .expect_report_play()
        .times(1)
        .returning(|track_id| Err(ReportError::new(track_id, "backend offline")));
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let list = tracks(&["1", "2"]);
    controller.play(list[0].clone(), Some(list));
    output.set_position(secs(100));

    controller.on_time_update().await;
    // Not retried for the same instance
    controller.on_time_update().await;

    assert!(controller.play_reported());
    assert!(controller.is_playing());
    assert!(!events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, PlaybackEvent::PlayReported { .. })));
}

#[tokio::test]
async fn test_each_load_is_a_new_instance() {
    let (controller, output) = controller();
    let mut seq = Sequence::new();
    let mut reporter = MockReporter::new();
    for id in ["1", "2", "1"] {
        reporter
            .expect_report_play()
            .withf(move |track_id: &str| track_id == id)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let list = tracks(&["1", "2"]);
    controller.play(list[0].clone(), Some(list.clone()));
    output.set_position(secs(60));
    controller.on_time_update().await;

    controller.next();
    output.set_position(secs(60));
    controller.on_time_update().await;

    // Replaying the same track counts again
    controller.play(list[0].clone(), None);
    assert!(!controller.play_reported());
    output.set_position(secs(60));
    controller.on_time_update().await;
}

#[tokio::test]
async fn test_repeat_one_restart_does_not_report_again() {
    let (controller, output) = controller();
    let mut reporter = MockReporter::new();
    reporter.expect_report_play().times(1).returning(|_| Ok(()));
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let list = tracks(&["1"]);
    controller.play(list[0].clone(), Some(list));
    controller.set_repeat(RepeatMode::One);

    output.set_position(secs(100));
    controller.on_time_update().await;

    controller.handle_media_ended();
    assert_eq!(controller.current_item().unwrap().id, "1");

    output.set_position(secs(100));
    controller.on_time_update().await;
}

#[tokio::test]
async fn test_unknown_track_duration_uses_output_duration() {
    let (controller, output) = controller();
    let mut reporter = MockReporter::new();
    reporter.expect_report_play().times(1).returning(|_| Ok(()));
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let stream = chorus_playback::TrackItem::new("live", "Live", "/media/live.mp3");
    controller.play(stream, None);
    output.log.lock().unwrap().duration = Some(secs(100));

    output.set_position(secs(29));
    controller.on_time_update().await;
    output.set_position(secs(31));
    controller.on_time_update().await;

    assert!(controller.play_reported());
}

#[tokio::test]
async fn test_no_duration_never_reports() {
    let (controller, output) = controller();
    let mut reporter = MockReporter::new();
    reporter.expect_report_play().never();
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let stream = chorus_playback::TrackItem::new("live", "Live", "/media/live.mp3");
    controller.play(stream, None);

    output.set_position(secs(3600));
    controller.on_time_update().await;

    assert!(!controller.play_reported());
}

#[tokio::test]
async fn test_nothing_tracked_without_reporter() {
    let (controller, output) = controller();
    let list = tracks(&["1"]);
    controller.play(list[0].clone(), Some(list));

    output.set_position(secs(100));
    controller.on_time_update().await;

    assert!(!controller.play_reported());
}

#[tokio::test]
async fn test_configured_threshold() {
    let (controller, output) = controller_with(PlaybackConfig {
        play_count_threshold: 0.5,
        ..Default::default()
    });
    let mut reporter = MockReporter::new();
    reporter.expect_report_play().times(1).returning(|_| Ok(()));
    controller.set_play_reporter(Some(Arc::new(reporter)));

    let list = tracks(&["1"]);
    controller.play(list[0].clone(), Some(list));

    output.set_position(secs(80));
    controller.on_time_update().await;
    assert!(!controller.play_reported());

    output.set_position(secs(91));
    controller.on_time_update().await;
    assert!(controller.play_reported());
}
