//! # Pose Pebbles
//!
//! An interactive sketch in which body keypoints from a pose-estimation model spawn small
//! "pebble" particles that fall, roll, and get knocked around by tracked hands and forearms.
//!
//! ## Features
//!
//! - **Pose sources**: scripted JSON timelines and a synthetic wandering figure behind one
//!   callback-based seam; results land in a single-slot latest-value cell
//! - **Spawning**: debounced, keypoint-filtered, confidence-gated pebble creation with an
//!   optional FIFO live cap
//! - **Motion**: the multiplicative gravity of the first sketches, or a Rapier 2D world with
//!   floor, walls, kinematic limb bodies, and a collision impulse
//! - **Rendering**: an immediate-mode surface trait with a recording `DrawList` and a software
//!   `Canvas` that exports PNG snapshots
//!
//! ## Architecture Design
//!
//! Every sketch runs inside an explicit [`sketch::SketchSession`]:
//! - **State**: pebble store, spawn policy, physics world, viewport
//! - **Update**: read latest poses → spawn → step → retire
//! - **Draw**: camera frame, keypoint markers, pebbles, limbs
//!
//! ### Example
//!
//! ```
//! use pose_pebbles::config::Variant;
//! use pose_pebbles::pose::{PoseScript, PoseSource, ScriptedPoseSource};
//! use pose_pebbles::render::DrawList;
//! use pose_pebbles::sketch::SketchSession;
//!
//! let script = PoseScript::from_json_str(r#"{ "frames": [ { "at_ms": 0, "poses": [
//!     { "keypoints": [ { "part": "nose", "position": { "x": 320.0, "y": 200.0 }, "score": 0.9 } ] }
//! ] } ] }"#).unwrap();
//! let mut source = ScriptedPoseSource::new(script);
//! let mut session = SketchSession::from_variant(Variant::Bounce).unwrap();
//! session.attach(&mut source);
//!
//! source.pump(0);
//! let report = session.update(0);
//! assert_eq!(report.spawned, 1);
//! assert_eq!(session.status(), "Model Loaded");
//!
//! let mut surface = DrawList::new(640, 480);
//! session.draw(&mut surface, None);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging, the latest-value slot, and the headless runner
//! - [`config`]: Sketch configuration and variant presets
//! - [`pose`]: Pose data model and pose sources
//! - [`physics`]: Rapier 2D world wrapper
//! - [`render`]: Render surfaces, colors, and camera feeds
//! - [`sketch`]: Pebbles, policies, and the per-frame session

/// Core infrastructure: errors, logging, headless runner
pub mod core;
/// Configuration system
pub mod config;
/// Pose data model and sources
pub mod pose;
/// Physics simulation using Rapier
pub mod physics;
/// Immediate-mode rendering surfaces
pub mod render;
/// Pebble sketch logic
pub mod sketch;

pub use config::{SketchConfig, Variant};
pub use core::{SketchError, SketchResult};
pub use sketch::SketchSession;
