//! Batch tree generation utility
//!
//! Generates a set of tree meshes and writes one file per tree.
//!
//! Usage:
//!     generate_trees [OPTIONS] <OUTPUT_DIR>
//!
//! Example:
//!     generate_trees --preset pine -n 20 ./assets/trees
//!     generate_trees --params my_tree.json --format json ./assets/trees

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};

use arbor::core::{Result, logging};
use arbor::mesh::CommitOptions;
use arbor::mesh::export::{save_json, save_obj};
use arbor::procgen::{TreeParams, TreePreset, generate_tree_with_options};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Wavefront OBJ with vertex colors
    Obj,
    /// Mesh hierarchy as JSON
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Obj => "obj",
            OutputFormat::Json => "json",
        }
    }
}

/// Batch tree generation utility
#[derive(Parser, Debug)]
#[command(name = "generate_trees", about = "Generate procedural tree meshes")]
struct Args {
    /// Directory the tree files are written to
    output_dir: PathBuf,

    /// Preset to generate (deciduous, palm, pine, dead-stump, bare or all)
    #[arg(short, long, default_value = "all")]
    preset: String,

    /// JSON parameter file; replaces the preset
    #[arg(long)]
    params: Option<PathBuf>,

    /// Number of trees per preset
    #[arg(short = 'n', long, default_value_t = 10)]
    count: u32,

    /// Base seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Obj)]
    format: OutputFormat,

    /// Merge coincident vertices before writing
    #[arg(long)]
    weld: bool,
}

/// (name, parameters) pairs to generate
fn parameter_sets(args: &Args) -> Result<Vec<(String, TreeParams)>> {
    if let Some(path) = &args.params {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        return Ok(vec![(name, TreeParams::from_json_file(path)?)]);
    }

    let presets = if args.preset.eq_ignore_ascii_case("all") {
        TreePreset::ALL.to_vec()
    } else {
        vec![args.preset.parse::<TreePreset>()?]
    };
    Ok(presets
        .into_iter()
        .map(|preset| (preset.name().to_string(), preset.params()))
        .collect())
}

#[derive(Default)]
struct Totals {
    trees: u32,
    vertices: usize,
    triangles: usize,
}

fn generate_set(
    name: &str,
    params: &TreeParams,
    args: &Args,
    output_dir: &Path,
    totals: &mut Totals,
) -> Result<()> {
    log::info!("Generating {} {} trees...", args.count, name);
    let start = Instant::now();
    let options = CommitOptions {
        weld_vertices: args.weld,
        ..CommitOptions::default()
    };

    for i in 0..args.count {
        let seed = args.seed.wrapping_add(i as u64).wrapping_mul(0x517cc1b727220a95);
        let (tree, report) = generate_tree_with_options(params, seed, options)?;

        let path = output_dir.join(format!("{}_{:03}.{}", name, i, args.format.extension()));
        match args.format {
            OutputFormat::Obj => save_obj(&tree, &path)?,
            OutputFormat::Json => save_json(&tree, &path)?,
        }

        log::debug!(
            "{}: seed {:#x}, stump {}, {} branches",
            path.display(),
            seed,
            report.is_stump,
            report.branches.len()
        );
        totals.trees += 1;
        totals.vertices += tree.total_vertices();
        totals.triangles += tree.total_triangles();
    }

    let elapsed = start.elapsed();
    log::info!(
        "  Completed {} in {:.2}s ({:.1} trees/sec)",
        name,
        elapsed.as_secs_f64(),
        args.count as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let sets = parameter_sets(args)?;
    std::fs::create_dir_all(&args.output_dir)?;

    log::info!("Output directory: {}", args.output_dir.display());
    log::info!("Trees per set: {}, base seed: {}", args.count, args.seed);

    let total_start = Instant::now();
    let mut totals = Totals::default();
    for (name, params) in &sets {
        generate_set(name, params, args, &args.output_dir, &mut totals)?;
    }

    log::info!("Summary:");
    log::info!("  Total trees generated: {}", totals.trees);
    log::info!("  Vertices: {}, triangles: {}", totals.vertices, totals.triangles);
    log::info!("  Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

fn main() {
    logging::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        log::error!("Error generating trees: {}", e);
        std::process::exit(1);
    }
}
