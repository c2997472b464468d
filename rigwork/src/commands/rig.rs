//! Rig document command implementations

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use glam::Mat4;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rig_anim::{
    AnimSystem, AnimationOptions, ManualClock, ModelAnimationData, NodeId, PlaybackSnapshot,
    PoseConsumer, Solid,
};

use crate::document::RigDocument;
use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, create_table, format_components, render_tree,
};

#[derive(Subcommand)]
pub enum RigCommands {
    /// Display the bone hierarchy of a rig document
    Tree {
        /// Path to the rig document
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// List the clips and meshes of a rig document
    Clips {
        /// Path to the rig document
        file: PathBuf,
    },

    /// Play a clip for some wall-clock time and print the resulting pose
    Sample {
        /// Path to the rig document
        file: PathBuf,

        /// Clip name or index
        #[arg(short, long)]
        clip: String,

        /// Seconds of playback
        #[arg(short, long)]
        seconds: f64,

        /// Playback speed multiplier
        #[arg(long, default_value = "1.0")]
        speed: f64,

        /// Loop the clip instead of stopping at its end
        #[arg(long = "loop")]
        looped: bool,

        /// Frames per second used to step playback
        #[arg(long, default_value = "30")]
        fps: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(cmd: RigCommands) -> Result<()> {
    match cmd {
        RigCommands::Tree {
            file,
            depth,
            no_color,
        } => handle_tree(file, depth, no_color),
        RigCommands::Clips { file } => handle_clips(file),
        RigCommands::Sample {
            file,
            clip,
            seconds,
            speed,
            looped,
            fps,
            json,
        } => handle_sample(
            file,
            &SampleRequest {
                clip,
                seconds,
                speed,
                looped,
                fps,
            },
            json,
        ),
    }
}

fn load_model(path: &Path, options: &AnimationOptions) -> Result<ModelAnimationData> {
    RigDocument::load(path)?.to_model(options)
}

fn handle_tree(path: PathBuf, max_depth: Option<usize>, no_color: bool) -> Result<()> {
    let model = load_model(&path, &AnimationOptions::default())?;
    let tree = model.tree();

    let mut root = TreeNode::new(model.name(), NodeType::Model)
        .with_metadata("nodes", tree.len())
        .with_metadata("bones", model.bone_count());
    if let Some(skeleton_root) = tree.root() {
        root = root.add_child(bone_node(&model, skeleton_root));
    }

    let options = TreeOptions {
        // The model line sits above the skeleton root
        max_depth: max_depth.map(|depth| depth + 1),
        no_color,
        show_metadata: true,
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn bone_node(model: &ModelAnimationData, id: NodeId) -> TreeNode {
    let node = &model.tree()[id];
    let mut tree_node = match node.bone_id() {
        Some(bone_id) => TreeNode::new(node.name(), NodeType::Bone).with_metadata("id", bone_id),
        None => TreeNode::new(node.name(), NodeType::Structural),
    };

    let animated = (0..model.clips().len())
        .filter(|&clip| {
            model
                .track(node.name(), clip)
                .is_some_and(|track| !track.is_empty())
        })
        .count();
    if animated > 0 {
        tree_node = tree_node.with_metadata("clips", animated);
    }

    for &child in node.children() {
        tree_node = tree_node.add_child(bone_node(model, child));
    }
    tree_node
}

fn handle_clips(path: PathBuf) -> Result<()> {
    let model = load_model(&path, &AnimationOptions::default())?;

    println!("Rig: {}", model.name());
    println!("\n=== Clips ===");
    let mut table = create_table(&["#", "Name", "Ticks", "Ticks/s", "Seconds", "Animated bones"]);
    for (index, clip) in model.clips().iter().enumerate() {
        let animated = model
            .animated_bones()
            .filter(|bone| {
                model
                    .track(bone, index)
                    .is_some_and(|track| !track.is_empty())
            })
            .count();
        add_table_row(
            &mut table,
            vec![
                index.to_string(),
                clip.name.clone(),
                format!("{:.1}", clip.duration),
                format!("{:.1}", clip.ticks_per_second),
                format!("{:.3}", clip.duration_seconds()),
                animated.to_string(),
            ],
        );
    }
    table.printstd();

    if !model.mesh_names().is_empty() {
        println!("\n=== Meshes ===");
        let mut table = create_table(&["#", "Name"]);
        for (index, mesh) in model.mesh_names().iter().enumerate() {
            add_table_row(&mut table, vec![index.to_string(), mesh.clone()]);
        }
        table.printstd();
    }
    Ok(())
}

/// Frames stepped by `sample`; every frame is evaluated so a one-shot clip
/// cannot skip past its end
const MAX_SAMPLE_FRAMES: u64 = 1_000_000;

struct SampleRequest {
    clip: String,
    seconds: f64,
    speed: f64,
    looped: bool,
    fps: f64,
}

#[derive(Serialize)]
struct SampleReport {
    model: String,
    clip: String,
    frames: u64,
    ticks: f64,
    playback: PlaybackSnapshot,
    bones: Vec<BoneSample>,
}

#[derive(Serialize)]
struct BoneSample {
    name: String,
    bone_id: usize,
    translation: [f32; 3],
    rotation: [f32; 4],
    scale: [f32; 3],
    matrix: [f32; 16],
}

fn resolve_clip(model: &ModelAnimationData, clip: &str) -> Result<usize> {
    if let Some(index) = model.clip_index(clip) {
        return Ok(index);
    }
    let index: usize = clip
        .parse()
        .with_context(|| format!("Unknown clip '{clip}'"))?;
    model.clip(index)?;
    Ok(index)
}

fn sample(path: &Path, request: &SampleRequest) -> Result<SampleReport> {
    if !request.seconds.is_finite() || request.seconds < 0.0 {
        bail!("--seconds must be a non-negative number");
    }
    if !request.fps.is_finite() || request.fps <= 0.0 {
        bail!("--fps must be positive");
    }
    let frames = (request.seconds * request.fps).ceil();
    if frames > MAX_SAMPLE_FRAMES as f64 {
        bail!(
            "Sampling {:.0} frames exceeds the limit of {MAX_SAMPLE_FRAMES}; lower --seconds or --fps",
            frames
        );
    }
    let frames = frames as u64;

    let options = AnimationOptions::default();
    let model = load_model(path, &options)?;
    let clip_index = resolve_clip(&model, &request.clip)?;

    let mut system = AnimSystem::new(options);
    let id = system.register_model(model);
    let model = Arc::clone(system.registry().model(id)?);

    let clock = ManualClock::new();
    let mut instance = system.create_instance(id, clock.clone())?;
    instance.set_current_animation(clip_index)?;
    instance.set_animation_speed(request.speed)?;
    instance.play(request.looped)?;

    // Step frame by frame so a one-shot clip sees its own end
    let mut ticks = system.animate(&mut instance)?;
    for frame in 1..=frames {
        let at = (frame as f64 / request.fps).min(request.seconds);
        clock.set(Duration::from_secs_f64(at));
        ticks = system.animate(&mut instance)?;
    }
    log::info!(
        "Sampled '{}' clip {} over {} frames: {:.3} ticks",
        model.name(),
        clip_index,
        frames + 1,
        ticks
    );

    let playback = instance.snapshot()?;
    let solid = Solid::Animated(instance);
    let finals = solid
        .final_transforms(system.palette())
        .context("Instance has no palette range")?;

    let bones = model
        .tree()
        .depth_first()
        .filter_map(|node_id| {
            let node = &model.tree()[node_id];
            node.bone_id()
                .map(|bone_id| bone_sample(node.name(), bone_id, finals[bone_id]))
        })
        .collect();

    Ok(SampleReport {
        model: model.name().to_string(),
        clip: model.clip(clip_index)?.name.clone(),
        frames: frames + 1,
        ticks,
        playback,
        bones,
    })
}

fn bone_sample(name: &str, bone_id: usize, matrix: Mat4) -> BoneSample {
    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
    BoneSample {
        name: name.to_string(),
        bone_id,
        translation: translation.to_array(),
        rotation: rotation.to_array(),
        scale: scale.to_array(),
        matrix: matrix.to_cols_array(),
    }
}

fn handle_sample(path: PathBuf, request: &SampleRequest, json: bool) -> Result<()> {
    let report = sample(&path, request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Rig: {}", report.model);
    println!("Clip: {} (#{})", report.clip, report.playback.clip_index);
    println!(
        "Played {:.3}s at speed {} over {} frames",
        request.seconds, report.playback.speed, report.frames
    );
    println!("Clip time: {:.3} ticks", report.ticks);
    println!("State: {:?}", report.playback.state);

    println!("\n=== Palette ===");
    let mut table = create_table(&["Bone", "Id", "Translation", "Rotation (xyzw)", "Scale"]);
    for bone in &report.bones {
        add_table_row(
            &mut table,
            vec![
                bone.name.clone(),
                bone.bone_id.to_string(),
                format_components(&bone.translation),
                format_components(&bone.rotation),
                format_components(&bone.scale),
            ],
        );
    }
    table.printstd();
    Ok(())
}
