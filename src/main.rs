use std::path::PathBuf;
use std::process;

use pose_pebbles::config::{SketchConfig, Variant};
use pose_pebbles::core::{PoseInput, RunOptions, SketchRunner};

const USAGE: &str = "Usage: pose_pebbles [--variant NAME|1-5] [--config FILE] [--poses FILE.json] \
[--frames N] [--snapshot FILE.png] [--seed N] [--no-camera]";

/// 命令行参数
#[derive(Debug, Default)]
struct Args {
    variant: Option<Variant>,
    config: Option<PathBuf>,
    poses: Option<PathBuf>,
    frames: Option<u64>,
    snapshot: Option<PathBuf>,
    seed: Option<u64>,
    no_camera: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match flag.as_str() {
            "--variant" => {
                args.variant = Some(value()?.parse().map_err(|e| format!("{}", e))?);
            }
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--poses" => args.poses = Some(PathBuf::from(value()?)),
            "--frames" => {
                args.frames = Some(value()?.parse().map_err(|e| format!("--frames: {}", e))?);
            }
            "--snapshot" => args.snapshot = Some(PathBuf::from(value()?)),
            "--seed" => {
                args.seed = Some(value()?.parse().map_err(|e| format!("--seed: {}", e))?);
            }
            "--no-camera" => args.no_camera = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn build_options(args: Args) -> Result<RunOptions, String> {
    let mut config = match (&args.config, args.variant) {
        (Some(path), _) => SketchConfig::from_file(path).map_err(|e| e.to_string())?,
        (None, Some(variant)) => variant.config(),
        (None, None) => SketchConfig::load_or_default(),
    };
    config.apply_env_overrides();
    if args.seed.is_some() {
        config.spawn.seed = args.seed;
    }

    let poses = match args.poses {
        Some(path) => PoseInput::Script(path),
        None => PoseInput::Synthetic {
            seed: args.seed.unwrap_or(0),
        },
    };

    let mut options = RunOptions::new(config, poses);
    if let Some(frames) = args.frames {
        options.frames = frames;
    }
    options.snapshot = args.snapshot;
    options.camera = !args.no_camera;
    Ok(options)
}

fn main() {
    let options = match parse_args().and_then(build_options) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            process::exit(2);
        }
    };

    match SketchRunner::run(options) {
        Ok(summary) => {
            println!(
                "{} frames, {} pebbles spawned, {} live at end ({})",
                summary.frames, summary.spawned, summary.final_live, summary.status
            );
        }
        Err(e) => {
            eprintln!("Sketch failed: {}", e);
            process::exit(1);
        }
    }
}
