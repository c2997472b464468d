//! Several instances driven by one `AnimSystem`.

use glam::{Mat4, Vec3};
use pretty_assertions::assert_eq;

use rig_anim::{
    AnimError, AnimSystem, AnimationOptions, ManualClock, ModelId, PaletteSlot, PlaybackState,
    PoseConsumer, Solid, StaticSolid,
};

use super::fixtures::{approx_vec, arm_model, arm_model_named, origin};

const SHOULDER: usize = 0;

#[test]
fn test_registration_lays_models_out_back_to_back() {
    let mut system = AnimSystem::new(AnimationOptions::default());
    let first = system.register_model(arm_model_named("Left"));
    let second = system.register_model(arm_model_named("Right"));

    assert_eq!(
        system.registry().slot(first),
        Ok(PaletteSlot { start: 0, len: 3 })
    );
    assert_eq!(
        system.registry().slot(second),
        Ok(PaletteSlot { start: 3, len: 3 })
    );
    assert_eq!(system.palette().len(), 6);
    assert!(system.palette().iter().all(|m| *m == Mat4::IDENTITY));

    // Same name again: no new range
    assert_eq!(system.register_model(arm_model_named("Left")), first);
    assert_eq!(system.registry().total_bones(), 6);
}

#[test]
fn test_shared_palette_last_instance_wins() {
    let mut system = AnimSystem::new(AnimationOptions::default());
    let arm = system.register_model(arm_model());
    let clock = ManualClock::new();

    let mut early = system.create_instance(arm, clock.clone()).expect("early");
    let mut late = system.create_instance(arm, clock.clone()).expect("late");
    assert_eq!(early.palette_slot(), late.palette_slot());
    assert_eq!(system.registry().instance_count(arm), Ok(2));

    early.play(true).expect("play early");
    clock.advance_secs(1.0);
    late.play(true).expect("play late");

    system.animate(&mut early).expect("animate early");
    system.animate(&mut late).expect("animate late");

    // Both write the same range; the later call decides the pose
    assert!(approx_vec(origin(system.palette()[SHOULDER]), Vec3::ZERO));
}

#[test]
fn test_per_instance_palette_keeps_poses_apart() {
    let mut system = AnimSystem::new(AnimationOptions::per_instance());
    let arm = system.register_model(arm_model());
    let clock = ManualClock::new();

    let mut early = system.create_instance(arm, clock.clone()).expect("early");
    let mut late = system.create_instance(arm, clock.clone()).expect("late");
    let early_slot = early.palette_slot().expect("slot");
    let late_slot = late.palette_slot().expect("slot");
    assert_eq!(early_slot, PaletteSlot { start: 0, len: 3 });
    assert_eq!(late_slot, PaletteSlot { start: 3, len: 3 });

    early.play(true).expect("play early");
    clock.advance_secs(1.0);
    late.play(true).expect("play late");

    system.animate(&mut early).expect("animate early");
    system.animate(&mut late).expect("animate late");

    let palette = system.palette();
    assert!(approx_vec(
        origin(palette[early_slot.start + SHOULDER]),
        Vec3::new(0.0, 5.0, 0.0)
    ));
    assert!(approx_vec(
        origin(palette[late_slot.start + SHOULDER]),
        Vec3::ZERO
    ));
}

#[test]
fn test_animate_all_skips_static_solids() {
    let mut system = AnimSystem::new(AnimationOptions::per_instance());
    let arm = system.register_model(arm_model());
    let clock = ManualClock::new();

    let mut solids: Vec<Solid<ManualClock>> = vec![
        StaticSolid::new(["Crate", "Lid"]).into(),
        system.create_instance(arm, clock.clone()).expect("first").into(),
        system.create_instance(arm, clock.clone()).expect("second").into(),
    ];
    for solid in &mut solids {
        if let Some(control) = solid.animation_control() {
            control.play(true).expect("play");
        }
    }
    clock.advance_secs(0.4);

    assert_eq!(system.animate_all(&mut solids), Ok(2));

    let palette = system.palette().to_vec();
    assert_eq!(solids[0].final_transforms(&palette), None);
    for solid in &solids[1..] {
        let finals = solid.final_transforms(&palette).expect("skinned");
        assert_eq!(finals.len(), 3);
        assert!(approx_vec(origin(finals[SHOULDER]), Vec3::new(0.0, 2.0, 0.0)));
    }
}

#[test]
fn test_snapshot_restores_on_a_fresh_instance() {
    let mut system = AnimSystem::new(AnimationOptions::default());
    let arm = system.register_model(arm_model());
    let clock = ManualClock::new();

    let mut original = system.create_instance(arm, clock.clone()).expect("original");
    original.set_animation_speed(0.5).expect("speed");
    original.set_mesh_visibility_by_name("Glove", false).expect("hide");
    original.play(false).expect("play");
    clock.advance_secs(2.0);
    let before = system.animate(&mut original).expect("animate");
    let saved = original.snapshot().expect("snapshot");

    let reload_clock = ManualClock::new();
    reload_clock.advance_secs(500.0);
    let mut reloaded = system.create_instance(arm, reload_clock.clone()).expect("reloaded");
    reloaded.restore(&saved).expect("restore");

    assert_eq!(reloaded.snapshot(), Ok(saved));
    assert_eq!(reloaded.playback_state(), Ok(PlaybackState::Playing));
    assert_eq!(reloaded.mesh_visibility_by_name("Glove"), Ok(false));

    // Restored mid-clip: the next frame continues, it does not auto-stop
    let after = system.animate(&mut reloaded).expect("animate");
    assert!((after - before).abs() < 1e-6);
    assert_eq!(reloaded.playback_state(), Ok(PlaybackState::Playing));
}

#[test]
fn test_removed_model_resets_range_and_rejects_instances() {
    let mut system = AnimSystem::new(AnimationOptions::default());
    let left = system.register_model(arm_model_named("Left"));
    let right = system.register_model(arm_model_named("Right"));
    let clock = ManualClock::new();

    let mut instance = system.create_instance(left, clock.clone()).expect("instance");
    instance.play(true).expect("play");
    clock.advance_secs(1.0);
    system.animate(&mut instance).expect("animate");
    assert!(system.palette()[..3].iter().any(|m| *m != Mat4::IDENTITY));

    let removed = system.registry_mut().remove_model(left).expect("remove");
    assert_eq!(removed.name(), "Left");
    assert!(system.palette()[..3].iter().all(|m| *m == Mat4::IDENTITY));
    assert_eq!(
        system.create_instance(left, clock.clone()).map(|_| ()),
        Err(AnimError::UnknownModel(left))
    );

    // A live instance of the removed model may no longer pose
    clock.advance_secs(0.5);
    assert_eq!(
        system.animate(&mut instance),
        Err(AnimError::UnknownModel(left))
    );
    assert!(system.palette()[..3].iter().all(|m| *m == Mat4::IDENTITY));

    // Ranges are not reused
    let again = system.register_model(arm_model_named("Left"));
    assert_eq!(again, ModelId(2));
    assert_eq!(
        system.registry().slot(again),
        Ok(PaletteSlot { start: 6, len: 3 })
    );
    assert_eq!(
        system.registry().slot(right),
        Ok(PaletteSlot { start: 3, len: 3 })
    );
}
