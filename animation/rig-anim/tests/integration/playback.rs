//! Clip time from wall-clock time through a single instance.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use test_case::test_case;

use rig_anim::{
    AnimError, ManualClock, PaletteSlot, PlaybackManager, PlaybackState, SolidToModelManager,
};

use super::fixtures::arm_model;

fn instance() -> (ManualClock, SolidToModelManager<ManualClock>) {
    let clock = ManualClock::new();
    let mut instance = SolidToModelManager::new(clock.clone());
    instance.initialize(Arc::new(arm_model()), PaletteSlot { start: 0, len: 3 });
    (clock, instance)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_looping_clip_wraps_at_duration() {
    let (clock, mut instance) = instance();
    instance.play(true).expect("play");

    clock.advance_secs(2.4);
    let time = instance.current_animation_time().expect("time");
    assert!(approx(time, 10.0), "got {time}");
    assert_eq!(instance.playback_state(), Ok(PlaybackState::Playing));
}

#[test]
fn test_one_shot_clip_stops_after_wrapping() {
    let (clock, mut instance) = instance();
    instance.play(false).expect("play");

    clock.advance_secs(1.8);
    let time = instance.current_animation_time().expect("time");
    assert!(approx(time, 45.0), "got {time}");

    // 2.2 s is 55 ticks, which wraps to 5: the clip has ended
    clock.advance_secs(0.4);
    assert_eq!(instance.current_animation_time(), Ok(0.0));
    assert_eq!(instance.playback_state(), Ok(PlaybackState::Stopped));

    clock.advance_secs(0.4);
    assert_eq!(instance.current_animation_time(), Ok(0.0));
}

#[test]
fn test_one_shot_clip_restarts_from_zero() {
    let (clock, mut instance) = instance();
    instance.play(false).expect("play");
    clock.advance_secs(1.9);
    instance.current_animation_time().expect("near end");
    instance.stop().expect("stop");

    instance.play(false).expect("replay");
    clock.advance_secs(0.2);
    let time = instance.current_animation_time().expect("time");
    assert!(approx(time, 5.0), "got {time}");
    assert_eq!(instance.playback_state(), Ok(PlaybackState::Playing));
}

#[test_case(1.0, 12.5 ; "normal speed")]
#[test_case(2.0, 25.0 ; "double speed")]
#[test_case(0.5, 6.25 ; "half speed")]
fn test_speed_multiplies_tick_rate(speed: f64, expected: f64) {
    let (clock, mut instance) = instance();
    instance.set_animation_speed(speed).expect("speed");
    instance.play(true).expect("play");
    clock.advance_secs(0.5);

    let time = instance.current_animation_time().expect("time");
    assert!(approx(time, expected), "got {time}");
}

#[test]
fn test_zero_rate_clip_uses_default() {
    let (clock, mut instance) = instance();
    instance
        .set_current_animation_by_name("Idle")
        .expect("select");
    instance.play(true).expect("play");
    clock.advance_secs(0.5);

    // Idle declares 0 ticks/s and runs at the default 25
    let time = instance.current_animation_time().expect("time");
    assert!(approx(time, 12.5), "got {time}");
}

#[test]
fn test_pause_resume_reports_played_time_only() {
    let clock = ManualClock::new();
    let mut playback = PlaybackManager::new(clock.clone());

    playback.play(false);
    clock.advance_secs(1.0);
    playback.pause();
    clock.advance_secs(5.0);
    playback.play(false);
    clock.advance_secs(0.5);

    assert!(approx(playback.current_time(), 1.5));
}

#[test]
fn test_paused_instance_holds_clip_time() {
    let (clock, mut instance) = instance();
    instance.play(true).expect("play");
    clock.advance_secs(0.4);
    instance.pause().expect("pause");
    clock.advance_secs(3.0);

    let time = instance.current_animation_time().expect("time");
    assert!(approx(time, 10.0), "got {time}");
    assert_eq!(instance.is_paused(), Ok(true));
}

#[test]
fn test_mesh_names_and_indices_agree() {
    let (_, mut instance) = instance();
    let names: Vec<String> = instance.mesh_names().expect("names").to_vec();
    assert_eq!(names, vec!["Sleeve".to_string(), "Glove".to_string()]);

    for (index, name) in names.iter().enumerate() {
        instance
            .set_mesh_visibility_by_name(name, false)
            .expect("hide");
        assert_eq!(instance.mesh_visibility(index), Ok(false));
        instance
            .set_mesh_visibility(index, true)
            .expect("show");
        assert_eq!(instance.mesh_visibility_by_name(name), Ok(true));
    }
}

#[test]
fn test_uninitialized_instance_rejects_everything() {
    let mut instance = SolidToModelManager::new(ManualClock::new());

    assert_eq!(instance.play(false), Err(AnimError::NotInitialized));
    assert_eq!(instance.pause(), Err(AnimError::NotInitialized));
    assert_eq!(instance.stop(), Err(AnimError::NotInitialized));
    assert_eq!(instance.set_current_animation(0), Err(AnimError::NotInitialized));
    assert_eq!(instance.set_animation_speed(2.0), Err(AnimError::NotInitialized));
    assert_eq!(instance.mesh_visibility(0), Err(AnimError::NotInitialized));
    assert_eq!(instance.current_animation_time(), Err(AnimError::NotInitialized));
}

#[test]
fn test_invalid_selection_is_reported() {
    let (_, mut instance) = instance();
    assert_eq!(
        instance.set_current_animation(5),
        Err(AnimError::IndexOutOfRange {
            what: "clip",
            index: 5,
            len: 2
        })
    );
    assert_eq!(
        instance.set_mesh_visibility_by_name("Helmet", true),
        Err(AnimError::UnknownMesh("Helmet".to_string()))
    );
    assert_eq!(
        instance.set_mesh_visibility(2, true),
        Err(AnimError::IndexOutOfRange {
            what: "mesh",
            index: 2,
            len: 2
        })
    );
}
