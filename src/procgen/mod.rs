//! Procedural tree generation
//!
//! Generate a tree into a fresh `MeshNode`:
//!
//! ```
//! use arbor::procgen::{TreeParams, generate_tree};
//!
//! let tree = generate_tree(&TreeParams::pine(), 42).unwrap();
//! assert!(tree.total_triangles() > 0);
//! ```

pub mod branch;
pub mod foliage;
pub mod params;
pub mod random;
pub mod tree;
pub mod trunk;

pub use branch::{BranchGenerator, BranchSpawn};
pub use foliage::{FoliageGenerator, FoliageShape};
pub use params::{FoliageStyle, TreeParams, TreePreset};
pub use random::tree_rng;
pub use tree::{FoliageAttachment, TreeBuild, TrunkProfile};
pub use trunk::{GenerationReport, TrunkGenerator};

use crate::core::Result;
use crate::mesh::CommitOptions;
use crate::scene::MeshNode;

/// Root node name of generated trees
pub const TREE_NODE_NAME: &str = "Tree";

/// Generate one tree from `params`, reproducibly for a given `seed`
pub fn generate_tree(params: &TreeParams, seed: u64) -> Result<MeshNode> {
    generate_tree_with_options(params, seed, CommitOptions::default()).map(|(node, _)| node)
}

/// Like [`generate_tree`], with explicit commit options and the generation report
pub fn generate_tree_with_options(
    params: &TreeParams,
    seed: u64,
    options: CommitOptions,
) -> Result<(MeshNode, GenerationReport)> {
    let mut rng = tree_rng(seed);
    let mut node = MeshNode::new(TREE_NODE_NAME);
    let report = TrunkGenerator::new(params, &mut node)
        .with_commit_options(options)
        .generate(&mut rng)?;
    Ok((node, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_tree_all_presets() {
        for preset in TreePreset::ALL {
            let tree = generate_tree(&preset.params(), 1234).unwrap();
            assert_eq!(tree.name, TREE_NODE_NAME);
            assert!(tree.total_vertices() > 0, "{preset} produced no geometry");
        }
    }

    #[test]
    fn test_generate_tree_reproducible() {
        let params = TreeParams::palm();
        assert_eq!(generate_tree(&params, 9).unwrap(), generate_tree(&params, 9).unwrap());
    }

    #[test]
    fn test_welding_reduces_vertices() {
        let params = TreeParams {
            stump_chance: 0.0,
            ..TreeParams::palm()
        };
        let (plain, _) = generate_tree_with_options(&params, 3, CommitOptions::default()).unwrap();
        let options = CommitOptions {
            weld_vertices: true,
            ..CommitOptions::default()
        };
        let (welded, report) = generate_tree_with_options(&params, 3, options).unwrap();
        // The raw buffer is reported, the committed mesh is welded
        assert_eq!(report.vertices, plain.mesh.as_ref().unwrap().vertex_count());
        assert!(welded.total_vertices() <= plain.total_vertices());
    }

    #[test]
    fn test_generate_tree_rejects_invalid_params() {
        let params = TreeParams {
            stump_chance: -0.5,
            ..TreeParams::default()
        };
        assert!(generate_tree(&params, 1).is_err());
    }
}
