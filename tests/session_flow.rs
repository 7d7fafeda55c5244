use std::{sync::Arc, time::Duration};

use vibeflow_lib::{
    audio::AudioEngineHandle,
    clock::FixedClock,
    config::AppConfig,
    store::MemoryBackend,
    timer::commands,
    vibe_commands, AppState,
};

fn config(dir: &tempfile::TempDir) -> AppConfig {
    AppConfig {
        data_dir: dir.path().to_path_buf(),
        debug: false,
        fps: 30,
        audio_enabled: false,
        share_origin: "https://vibe.example".into(),
    }
}

fn app(dir: &tempfile::TempDir, backend: Arc<MemoryBackend>) -> AppState {
    AppState::new(
        config(dir),
        Arc::new(FixedClock::at_utc(2024, 3, 10, 9, 0)),
        backend,
        AudioEngineHandle::without_output(),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn bug_hunt_session_runs_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MemoryBackend::default());
    let state = app(&dir, backend.clone());

    let timer = commands::apply_preset(&state, "bug-hunt").await.unwrap();
    assert_eq!(timer.time_left(), 45 * 60);

    tokio::time::sleep(Duration::from_secs(45 * 60 + 2)).await;

    let timer = commands::get_timer_state(&state);
    assert!(!timer.active());
    assert_eq!(timer.time_left(), 0);

    state.store.read(|store| {
        let s = store.state();
        assert_eq!(s.streak.streak_days, 1);
        assert_eq!(s.completed_sessions, 1);
        assert_eq!(s.session_metrics.len(), 1);
        let metric = &s.session_metrics[0];
        assert_eq!(metric.preset_used, "Bug Hunt Mode");
        assert_eq!(metric.duration_minutes, 45.0);
        assert_eq!(metric.date, "2024-03-10");
        assert!(metric.completed);
    });

    let saved = backend.contents().unwrap();
    assert!(saved.contains("\"streakDays\":1"));

    // A restart picks the record back up
    let reopened = app(&dir, backend);
    assert_eq!(reopened.store.read(|s| s.state().streak.streak_days), 1);
    assert_eq!(reopened.store.read(|s| s.state().completed_sessions), 1);
}

#[tokio::test(start_paused = true)]
async fn stopped_session_is_not_booked() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(MemoryBackend::default());
    let state = app(&dir, backend.clone());

    commands::start_timer(&state, 1).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    commands::stop_timer(&state).await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(state.store.read(|s| s.state().completed_sessions), 0);
    assert!(backend.contents().is_none());
    assert!(commands::start_timer(&state, 0).await.is_err());
}

#[tokio::test]
async fn shared_vibe_travels_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let sender = app(&dir, Arc::new(MemoryBackend::default()));
    vibe_commands::submit_mood(&sender, "so tired after the release")
        .await
        .unwrap();
    let link = vibe_commands::share_vibe(&sender).unwrap();

    let receiver = app(&dir, Arc::new(MemoryBackend::default()));
    assert!(vibe_commands::open_share_link(&receiver, &link).unwrap());
    let received = receiver.store.read(|s| s.current_vibe().clone());
    let sent = sender.store.read(|s| s.current_vibe().clone());
    assert_eq!(received, sent);
    assert_eq!(received.name, "Sleep Recovery");
}
