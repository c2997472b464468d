//! Interpolation and clip-time laws checked over generated inputs.

use glam::{Mat4, Quat, Vec3};
use proptest::prelude::*;

use rig_anim::{
    AnimationClip, DEFAULT_TICKS_PER_SECOND, KeyframeTrack, QuatKey, VectorKey, interpolate_key,
};

fn unit_quat() -> impl Strategy<Value = Quat> {
    (
        -1.0f32..1.0,
        -1.0f32..1.0,
        -1.0f32..1.0,
        -std::f32::consts::PI..std::f32::consts::PI,
    )
        .prop_filter("axis must not be degenerate", |(x, y, z, _)| {
            Vec3::new(*x, *y, *z).length() > 0.1
        })
        .prop_map(|(x, y, z, angle)| Quat::from_axis_angle(Vec3::new(x, y, z).normalize(), angle))
}

fn vec3() -> impl Strategy<Value = Vec3> {
    (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn sample_rotation(keys: &[QuatKey], time: f64) -> Quat {
    let mut out = Quat::IDENTITY;
    interpolate_key(keys, time, &mut out);
    out
}

proptest! {
    #[test]
    fn rotation_never_moves_away_from_destination(
        from in unit_quat(),
        to in unit_quat(),
        t1 in 0.0f64..1.0,
        t2 in 0.0f64..1.0,
    ) {
        let (t1, t2) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let keys = [QuatKey::new(0.0, from), QuatKey::new(1.0, to)];

        let early = sample_rotation(&keys, t1);
        let late = sample_rotation(&keys, t2);

        // Angular distance to the destination shrinks as time advances
        let distance = |q: Quat| q.dot(to).abs().min(1.0).acos();
        prop_assert!(distance(late) <= distance(early) + 5e-3);
    }

    #[test]
    fn rotation_takes_the_short_way(from in unit_quat(), to in unit_quat()) {
        let keys = [QuatKey::new(0.0, from), QuatKey::new(1.0, to)];
        let mid = sample_rotation(&keys, 0.5);

        // Halfway along the shortest arc is never further than 90 degrees
        // of rotation from either end
        prop_assert!(mid.dot(from).abs() >= std::f32::consts::FRAC_1_SQRT_2 - 1e-3);
        prop_assert!(mid.dot(to).abs() >= std::f32::consts::FRAC_1_SQRT_2 - 1e-3);
    }

    #[test]
    fn position_stays_between_keys(a in vec3(), b in vec3(), t in -1.0f64..2.0) {
        let keys = [VectorKey::new(0.0, a), VectorKey::new(1.0, b)];
        let mut out = Vec3::ZERO;
        interpolate_key(&keys, t, &mut out);

        let (lo, hi) = (a.min(b), a.max(b));
        prop_assert!(out.cmpge(lo - 1e-3).all() && out.cmple(hi + 1e-3).all());
    }

    #[test]
    fn empty_track_leaves_rest_pose(
        translation in vec3(),
        rotation in unit_quat(),
        time in 0.0f64..100.0,
    ) {
        let rest = Mat4::from_rotation_translation(rotation, translation);
        prop_assert_eq!(KeyframeTrack::new().sample(time, &rest), None);
    }

    #[test]
    fn wrapped_time_stays_inside_clip(
        seconds in 0.0f64..10_000.0,
        speed in 0.0f64..8.0,
        duration in 1.0f64..500.0,
    ) {
        let clip = AnimationClip::new("Loop", duration, 0.0, DEFAULT_TICKS_PER_SECOND);
        let ticks = clip.wrap_ticks(clip.seconds_to_ticks(seconds, speed));
        prop_assert!((0.0..duration).contains(&ticks));
    }
}
