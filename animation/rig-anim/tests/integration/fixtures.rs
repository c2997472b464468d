//! Shared test models

use glam::{Mat4, Quat, Vec3};
use rig_anim::{
    AnimationOptions, BoneData, BoneTree, KeyframeTrack, ModelAnimationData, QuatKey, VectorKey,
};

/// Four-node rig:
///
/// ```text
/// Armature (structural, lifted 1 on Z)
/// └── Shoulder (bone 0)
///     ├── Elbow (bone 2, 2 along X)
///     │   └── Wrist (bone 1, 1 along X)
///     └── Socket (structural, 1 along Y)
/// ```
///
/// Clip 0 "Reach" (50 ticks at 25/s) slides the shoulder along Y and turns
/// the elbow a quarter turn about Z. Clip 1 "Idle" (20 ticks, declared rate
/// 0) animates nothing.
pub fn arm_model() -> ModelAnimationData {
    arm_model_named("Arm")
}

pub fn arm_model_named(name: &str) -> ModelAnimationData {
    let mut tree = BoneTree::new();
    let armature = tree
        .add_root_node(
            "Armature",
            BoneData::structural(Mat4::from_translation(Vec3::Z)),
        )
        .expect("root");
    let shoulder = tree
        .add_node(
            armature,
            "Shoulder",
            BoneData::bone(0, Mat4::IDENTITY, Mat4::IDENTITY),
        )
        .expect("shoulder");
    let elbow = tree
        .add_node(
            shoulder,
            "Elbow",
            BoneData::bone(
                2,
                Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
                Mat4::IDENTITY,
            ),
        )
        .expect("elbow");
    tree.add_node(
        elbow,
        "Wrist",
        BoneData::bone(1, Mat4::from_translation(Vec3::X), Mat4::IDENTITY),
    )
    .expect("wrist");
    tree.add_node(
        shoulder,
        "Socket",
        BoneData::structural(Mat4::from_translation(Vec3::Y)),
    )
    .expect("socket");

    ModelAnimationData::builder(name, tree)
        .clip("Reach", 50.0, 25.0)
        .clip("Idle", 20.0, 0.0)
        .track(
            "Shoulder",
            0,
            KeyframeTrack::new().with_positions(vec![
                VectorKey::new(0.0, Vec3::ZERO),
                VectorKey::new(50.0, Vec3::new(0.0, 10.0, 0.0)),
            ]),
        )
        .track(
            "Elbow",
            0,
            KeyframeTrack::new().with_rotations(vec![
                QuatKey::new(0.0, Quat::IDENTITY),
                QuatKey::new(50.0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            ]),
        )
        .mesh("Sleeve")
        .mesh("Glove")
        .build(&AnimationOptions::default())
        .expect("arm model")
}

pub fn approx_vec(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

/// Origin of a skinning matrix in model space
pub fn origin(matrix: Mat4) -> Vec3 {
    matrix.transform_point3(Vec3::ZERO)
}
