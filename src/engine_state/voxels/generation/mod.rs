//! # Terrain Generation
//!
//! Deterministic construction of a sector's initial content from its coordinates.
//!
//! ## Pipeline
//!
//! 1. **Enclosure** - bedrock floor and perimeter walls, when the world is walled
//! 2. **Terrain** - a flat floor, or biome columns picked from coherent noise
//! 3. **Trees** - scattered with a generator seeded from the sector coordinates
//! 4. **Clouds** - a noise-thresholded layer, only in cells still empty
//!
//! Each stage returns immediately when the sector's vertical extent misses the slab the
//! stage writes to, so most sectors above and below the surface cost almost nothing.
//!
//! The coherent-noise source is an explicit handle owned by the generator. Nothing here
//! keeps process-wide state, which lets the same generator run on the scheduler's worker
//! and on the main thread.

use std::sync::Arc;

use cgmath::Point3;
use noise::{Fbm, MultiFractal, NoiseFn, Simplex};

use crate::config::{Clouds, Enclosure, GeneratorConfig, Terrain, Trees};

use super::block::{block_type::BlockType, Block};
use super::sector::{Sector, SECTOR_SIZE};

use biome::{lookup_biome, MAX_BIOME_HEIGHT};
use trees::{TreeShape, MAX_TREE_HEIGHT};

pub mod biome;
pub mod trees;

/// Shared handle to a 2D coherent-noise function returning values in [-1, 1].
pub type NoiseHandle = Arc<dyn NoiseFn<f64, 2> + Send + Sync>;

/// Margin kept between a tree trunk and the sector's horizontal edges.
const TREE_MARGIN: i32 = 3;

/// Builds sectors from the generator configuration and a noise source.
pub struct TerrainGenerator {
    config: GeneratorConfig,
    noise: NoiseHandle,
}

impl TerrainGenerator {
    /// Creates a generator using fractal simplex noise built from `config.noise`.
    pub fn new(config: GeneratorConfig) -> Self {
        let noise = Fbm::<Simplex>::new(config.noise.seed).set_octaves(config.noise.octaves);
        Self::with_noise(config, Arc::new(noise))
    }

    /// Creates a generator sampling the given noise source.
    pub fn with_noise(config: GeneratorConfig, noise: NoiseHandle) -> Self {
        TerrainGenerator { config, noise }
    }

    /// Samples the noise source, clamped into [-1, 1].
    pub fn noise2(&self, x: f64, z: f64) -> f64 {
        self.noise.get([x, z]).clamp(-1.0, 1.0)
    }

    /// Generates the content of the sector at `position`.
    pub fn generate(&self, position: Point3<i32>) -> Sector {
        let mut sector = Sector::new(position);

        self.generate_enclosure(&mut sector);
        self.generate_terrain(&mut sector);
        self.generate_trees(&mut sector);
        self.generate_clouds(&mut sector);

        sector
    }

    /// All (x, z) block columns of a sector.
    fn iter_xz(sector: &Sector) -> impl Iterator<Item = (i32, i32)> {
        let min = sector.min_block();
        let max = sector.max_block();
        (min.x..max.x).flat_map(move |x| (min.z..max.z).map(move |z| (x, z)))
    }

    /// `true` if the column is strictly inside the enclosure walls.
    fn inside_walls(&self, x: i32, z: i32) -> bool {
        match self.config.enclosure {
            Enclosure::Open => true,
            Enclosure::Walled { half_size: n, .. } => -n < x && x < n && -n < z && z < n,
        }
    }

    fn generate_enclosure(&self, sector: &mut Sector) {
        let Enclosure::Walled { half_size: n, height } = self.config.enclosure else {
            return;
        };
        let y_pos = self.config.floor_y;
        if !sector.contains_y_range(y_pos, y_pos + height) {
            return;
        }

        let bedrock = Block::new(BlockType::BEDROCK);
        for (x, z) in Self::iter_xz(sector) {
            if x < -n || x > n || z < -n || z > n {
                continue;
            }
            sector.add_block(Point3::new(x, y_pos, z), bedrock);

            if x == -n || x == n || z == -n || z == n {
                for dy in 0..height {
                    sector.add_block(Point3::new(x, y_pos + dy, z), bedrock);
                }
            }
        }
    }

    fn generate_terrain(&self, sector: &mut Sector) {
        let y_pos = self.config.floor_y;
        match self.config.terrain {
            Terrain::Flat { block } => {
                if !sector.contains_y(y_pos) {
                    return;
                }
                let block = Block::new(block);
                for (x, z) in Self::iter_xz(sector) {
                    if self.inside_walls(x, z) {
                        sector.add_block(Point3::new(x, y_pos, z), block);
                    }
                }
            }
            Terrain::Biomes { frequency } => {
                if !sector.contains_y_range(y_pos, y_pos + MAX_BIOME_HEIGHT + 1) {
                    return;
                }
                for (x, z) in Self::iter_xz(sector) {
                    if !self.inside_walls(x, z) {
                        continue;
                    }
                    let biome = lookup_biome(self.noise2(x as f64 / frequency, z as f64 / frequency));
                    for depth in 0..biome.height {
                        let block = Block::new(biome.block_at_depth(depth as usize));
                        sector.add_block(Point3::new(x, y_pos + biome.height - depth, z), block);
                    }
                }
            }
        }
    }

    /// Surface block of the column at (x, z) and its height.
    fn surface_at(&self, x: i32, z: i32) -> (BlockType, i32) {
        match self.config.terrain {
            Terrain::Flat { block } => (block, self.config.floor_y),
            Terrain::Biomes { frequency } => {
                let biome = lookup_biome(self.noise2(x as f64 / frequency, z as f64 / frequency));
                (biome.surface(), self.config.floor_y + biome.height)
            }
        }
    }

    fn generate_trees(&self, sector: &mut Sector) {
        let Trees::Scattered { max_per_sector } = self.config.trees else {
            return;
        };
        let y_pos = self.config.floor_y;
        if !sector.contains_y_range(y_pos, y_pos + MAX_BIOME_HEIGHT + MAX_TREE_HEIGHT + 1) {
            return;
        }

        let position = sector.position();
        let seed = (position.x as i64 + position.z as i64) as u64;
        let mut rng = fastrand::Rng::with_seed(seed);
        let count = rng.usize(0..=max_per_sector);

        for _ in 0..count {
            let spread = 0..=SECTOR_SIZE - 2 * TREE_MARGIN - 1;
            let x = position.x * SECTOR_SIZE + TREE_MARGIN + rng.i32(spread.clone());
            let z = position.z * SECTOR_SIZE + TREE_MARGIN + rng.i32(spread);
            if let Enclosure::Walled { half_size, .. } = self.config.enclosure {
                let n = half_size - TREE_MARGIN;
                if x < -n + 2 || x > n - 2 || z < -n + 2 || z > n - 2 {
                    continue;
                }
            }

            let (surface, top) = self.surface_at(x, z);
            if !surface.supports_trees() {
                continue;
            }
            let (shape, height) = TreeShape::pick(surface, top - y_pos, &mut rng);
            shape.stamp(sector, Point3::new(x, top, z), height);
        }
    }

    fn generate_clouds(&self, sector: &mut Sector) {
        let Clouds::Layer {
            density,
            height,
            frequency,
        } = self.config.clouds
        else {
            return;
        };
        if !sector.contains_y(height) {
            return;
        }

        let cloud = Block::new(BlockType::CLOUD);
        for (x, z) in Self::iter_xz(sector) {
            let position = Point3::new(x, height, z);
            if sector.has_block(position) {
                continue;
            }
            let c = self.noise2(x as f64 / frequency, z as f64 / frequency);
            if (c + 1.0) * 0.5 < density {
                sector.add_block(position, cloud);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseConfig;
    use crate::engine_state::voxels::block::block_side::BlockSide;
    use noise::Constant;

    fn count(sector: &Sector, kind: BlockType) -> usize {
        sector
            .blocks()
            .values()
            .filter(|block| block.kind() == kind)
            .count()
    }

    fn constant(value: f64) -> NoiseHandle {
        Arc::new(Constant::new(value))
    }

    fn flat_config(floor_y: i32) -> GeneratorConfig {
        GeneratorConfig {
            floor_y,
            ..GeneratorConfig::flat(BlockType::GRASS)
        }
    }

    #[test]
    fn test_flat_floor_fills_one_layer() {
        let generator = TerrainGenerator::new(flat_config(3));
        let sector = generator.generate(Point3::new(0, 0, 0));

        assert_eq!(sector.len(), 256);
        assert_eq!(count(&sector, BlockType::GRASS), 256);
        assert!(sector.blocks().keys().all(|position| position.y == 3));
        // a single layer is exposed everywhere
        assert_eq!(sector.visible().len(), 256);
        assert!(!sector.is_face_full(BlockSide::BOTTOM));
    }

    #[test]
    fn test_stages_skip_sectors_outside_their_slab() {
        let generator = TerrainGenerator::new(GeneratorConfig::default());
        assert!(generator.generate(Point3::new(0, 5, 0)).is_empty());
        assert!(generator.generate(Point3::new(3, -4, -2)).is_empty());
    }

    #[test]
    fn test_walled_enclosure() {
        let config = GeneratorConfig {
            floor_y: 0,
            enclosure: Enclosure::Walled {
                half_size: 8,
                height: 3,
            },
            ..GeneratorConfig::flat(BlockType::GRASS)
        };
        let sector = TerrainGenerator::new(config).generate(Point3::new(0, 0, 0));

        // interior floor is terrain, the perimeter keeps bedrock 3 blocks high
        assert_eq!(count(&sector, BlockType::GRASS), 64);
        assert_eq!(count(&sector, BlockType::BEDROCK), 17 * 3);
        assert_eq!(
            sector.get_block(Point3::new(8, 2, 4)),
            Some(Block::new(BlockType::BEDROCK))
        );
        assert_eq!(sector.get_block(Point3::new(9, 0, 4)), None);
    }

    #[test]
    fn test_low_noise_gives_water_and_clouds() {
        let config = GeneratorConfig {
            floor_y: 0,
            enclosure: Enclosure::Open,
            terrain: Terrain::Biomes { frequency: 38.0 },
            clouds: Clouds::Layer {
                density: 0.35,
                height: 10,
                frequency: 20.0,
            },
            trees: Trees::Scattered { max_per_sector: 3 },
            noise: NoiseConfig::default(),
        };
        let generator = TerrainGenerator::with_noise(config, constant(-1.0));
        let sector = generator.generate(Point3::new(0, 0, 0));

        assert_eq!(count(&sector, BlockType::WATER), 256);
        assert!(sector
            .blocks()
            .iter()
            .filter(|(_, block)| block.kind() == BlockType::WATER)
            .all(|(position, _)| position.y == 1));
        assert_eq!(count(&sector, BlockType::CLOUD), 256);
        assert_eq!(sector.len(), 512);
    }

    #[test]
    fn test_high_noise_gives_snow_peaks_without_clouds() {
        let config = GeneratorConfig {
            floor_y: 0,
            enclosure: Enclosure::Open,
            ..GeneratorConfig::default()
        };
        let generator = TerrainGenerator::with_noise(config, constant(1.0));
        let sector = generator.generate(Point3::new(0, 0, 0));

        // columns 15 high, snow on top, no trees on snow, no clouds
        assert_eq!(sector.len(), 256 * 15);
        assert_eq!(count(&sector, BlockType::SNOW), 256 * 2);
        assert_eq!(count(&sector, BlockType::TUNDRA), 256);
        assert_eq!(count(&sector, BlockType::CLOUD), 0);
        assert!(sector.is_face_full(BlockSide::TOP));
        assert!(!sector.is_face_full(BlockSide::LEFT));
    }

    #[test]
    fn test_clouds_do_not_replace_blocks() {
        let config = GeneratorConfig {
            floor_y: 4,
            clouds: Clouds::Layer {
                density: 1.0,
                height: 4,
                frequency: 20.0,
            },
            ..flat_config(4)
        };
        let generator = TerrainGenerator::with_noise(config, constant(0.0));
        let sector = generator.generate(Point3::new(0, 0, 0));
        assert_eq!(count(&sector, BlockType::GRASS), 256);
        assert_eq!(count(&sector, BlockType::CLOUD), 0);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = TerrainGenerator::new(GeneratorConfig::default());
        for position in [Point3::new(0, -1, 0), Point3::new(2, 0, -3), Point3::new(-4, 1, 1)] {
            let first = generator.generate(position);
            let second = generator.generate(position);
            assert_eq!(first.blocks(), second.blocks());
            assert_eq!(first.visible(), second.visible());
        }

        let other = TerrainGenerator::new(GeneratorConfig::default());
        let position = Point3::new(1, -1, 1);
        assert_eq!(generator.generate(position).blocks(), other.generate(position).blocks());
    }

    #[test]
    fn test_trees_grow_on_grass() {
        // noise pinned to a one-block grass biome
        let config = GeneratorConfig {
            floor_y: 0,
            enclosure: Enclosure::Open,
            terrain: Terrain::Biomes { frequency: 38.0 },
            clouds: Clouds::Clear,
            trees: Trees::Scattered { max_per_sector: 3 },
            noise: NoiseConfig::default(),
        };
        let generator = TerrainGenerator::with_noise(config, constant(-0.258));

        let mut wood = 0;
        for sx in 0..8 {
            let sector = generator.generate(Point3::new(sx, 0, 0));
            assert!(count(&sector, BlockType::GRASS) <= 256);
            for (position, block) in sector.blocks() {
                if block.kind() == BlockType::WOOD {
                    assert!(position.y >= 1);
                }
            }
            wood += count(&sector, BlockType::WOOD);
        }
        assert!(wood > 0);
    }

    #[test]
    fn test_no_trees_on_water() {
        let config = GeneratorConfig {
            floor_y: 0,
            enclosure: Enclosure::Open,
            clouds: Clouds::Clear,
            ..GeneratorConfig::default()
        };
        let generator = TerrainGenerator::with_noise(config, constant(-1.0));
        for sx in 0..4 {
            let sector = generator.generate(Point3::new(sx, 0, sx));
            assert_eq!(count(&sector, BlockType::WOOD), 0);
            assert_eq!(count(&sector, BlockType::LEAVES), 0);
        }
    }
}
