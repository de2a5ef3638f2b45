//! Chunk generation smoke tool: builds chunk meshes from the command line.
//!
//! Usage: cargo run --release --bin generate_chunk -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>      Random seed (default: 0)
//!   --octaves <N>      Noise octaves (default: 4)
//!   --amplitude <A>    Height amplitude (default: 20.0)
//!   --x <CX>           Chunk x coordinate (default: 0)
//!   --z <CZ>           Chunk z coordinate (default: 0)
//!   --lod <LOD>        Simplification factor (default: 0)
//!   --config <PATH>    JSON config file (overrides the flags above except
//!                      --x/--z/--lod)

use std::path::PathBuf;
use std::time::Instant;

use glam::Vec3;

use terramesh::config::TerrainConfig;
use terramesh::streaming::lod::validate_detail_levels;
use terramesh::streaming::LodLevel;
use terramesh::terrain::mesh::{HeightfieldMeshBuilder, MAP_CHUNK_SIZE};
use terramesh::terrain::noise::NormalizeMode;

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let cx = parse_i32_arg(&args, "--x").unwrap_or(0);
    let cz = parse_i32_arg(&args, "--z").unwrap_or(0);
    let lod = parse_u32_arg(&args, "--lod").unwrap_or(0);

    let config = match parse_str_arg(&args, "--config") {
        Some(path) => match TerrainConfig::from_json_file(&PathBuf::from(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load {path}: {e}");
                std::process::exit(1);
            }
        },
        None => {
            let mut config = TerrainConfig {
                normalize_mode: NormalizeMode::Global,
                ..Default::default()
            };
            config.noise.seed = parse_u32_arg(&args, "--seed").unwrap_or(0);
            config.noise.octaves = parse_u32_arg(&args, "--octaves").unwrap_or(4);
            config.noise.persistence = 0.5;
            config.noise.lacunarity = 2.0;
            config.noise.amplitude = parse_f32_arg(&args, "--amplitude").unwrap_or(20.0);
            config
        }
    };

    let levels = vec![LodLevel { lod, distance_threshold: 400.0 }];
    if let Err(e) = validate_detail_levels(&levels) {
        eprintln!("invalid LOD factor {lod}: {e}");
        std::process::exit(1);
    }
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        std::process::exit(1);
    }

    println!("=== Terramesh Chunk Generator ===");
    println!("Chunk:  ({cx}, {cz}) at LOD {lod}");
    println!("Seed:   {}", config.noise.seed);
    println!("Octaves: {}, amplitude {}", config.noise.octaves, config.noise.amplitude);
    println!();

    let extent = (MAP_CHUNK_SIZE - 1) as f32;
    let anchor = Vec3::new(cx as f32 * extent, 0.0, cz as f32 * extent) * config.terrain_scale;

    let builder = HeightfieldMeshBuilder::new(&config);
    let start = Instant::now();
    let mesh = builder.build_mesh(anchor, lod);
    let elapsed = start.elapsed();

    let mut min_height = f32::INFINITY;
    let mut max_height = f32::NEG_INFINITY;
    for v in &mesh.vertices {
        min_height = min_height.min(v.y);
        max_height = max_height.max(v.y);
    }

    log::info!(
        "built {} vertices / {} triangles in {:.2?}",
        mesh.vertices.len(),
        mesh.triangles.len() / 3,
        elapsed
    );
    log::info!(
        "height range [{min_height:.3}, {max_height:.3}] at anchor ({:.0}, {:.0})",
        anchor.x,
        anchor.z
    );
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_f32_arg(args: &[String], name: &str) -> Option<f32> {
    parse_str_arg(args, name).and_then(|v| v.parse().ok())
}

fn parse_u32_arg(args: &[String], name: &str) -> Option<u32> {
    parse_str_arg(args, name).and_then(|v| v.parse().ok())
}

fn parse_i32_arg(args: &[String], name: &str) -> Option<i32> {
    parse_str_arg(args, name).and_then(|v| v.parse().ok())
}
