//! Bundled world sampler built on layered Perlin climate noise.
//!
//! Five climate parameters are sampled per cell and classified into a biome id,
//! in the spirit of multi-noise biome placement. This is a stand-in so the tile
//! pipeline has something deterministic to draw; it makes no attempt to match any
//! particular game's terrain.

use noise::{NoiseFn, Perlin};

use crate::biomes::Biome;
use crate::coords::TileRegion;
use crate::error::SampleError;
use crate::sampler::{
    alloc_grid, BiomeFlavor, BiomeGrid, Dimension, GeneratorVersion, WorldSampler,
};
use crate::seeds::{LayerSeeds, END_SALT, NETHER_SALT, OVERWORLD_SALT};

/// Blocks per noise period for the continental layer at default biome size.
const CONTINENT_PERIOD: f64 = 4096.0;
/// Blocks per noise period for temperature/humidity.
const CLIMATE_PERIOD: f64 = 2048.0;
/// Blocks per noise period for erosion/weirdness.
const DETAIL_PERIOD: f64 = 1024.0;
/// Radius of the central end island, in blocks.
const END_ISLAND_RADIUS: f64 = 1000.0;

struct ClimateLayers {
    seeds: LayerSeeds,
    continentalness: Perlin,
    temperature: Perlin,
    humidity: Perlin,
    erosion: Perlin,
    weirdness: Perlin,
}

impl ClimateLayers {
    fn new(seeds: LayerSeeds) -> Self {
        Self {
            seeds,
            continentalness: Perlin::new(seeds.continentalness as u32),
            temperature: Perlin::new(seeds.temperature as u32),
            humidity: Perlin::new(seeds.humidity as u32),
            erosion: Perlin::new(seeds.erosion as u32),
            weirdness: Perlin::new(seeds.weirdness as u32),
        }
    }
}

/// Climate parameters at one point, each roughly in [-1, 1].
#[derive(Clone, Copy, Debug)]
struct Climate {
    continentalness: f64,
    temperature: f64,
    humidity: f64,
    erosion: f64,
    weirdness: f64,
}

/// Deterministic noise-driven `WorldSampler`.
pub struct NoiseSampler {
    version: GeneratorVersion,
    flavor: BiomeFlavor,
    dimension: Dimension,
    layers: Option<ClimateLayers>,
}

impl NoiseSampler {
    pub fn new() -> Self {
        Self {
            version: GeneratorVersion::default(),
            flavor: BiomeFlavor::default(),
            dimension: Dimension::default(),
            layers: None,
        }
    }

    /// Seeds currently in use, if a seed has been applied.
    pub fn seeds(&self) -> Option<LayerSeeds> {
        self.layers.as_ref().map(|l| l.seeds)
    }

    fn zoom(&self) -> f64 {
        match self.flavor {
            BiomeFlavor::Normal => 1.0,
            BiomeFlavor::LargeBiomes => 4.0,
        }
    }

    fn climate_at(&self, layers: &ClimateLayers, wx: f64, wz: f64) -> Climate {
        let zoom = self.zoom();
        let sample = |noise: &Perlin, period: f64, octaves: u32| {
            fbm(noise, wx / (period * zoom), wz / (period * zoom), octaves)
        };
        Climate {
            continentalness: sample(&layers.continentalness, CONTINENT_PERIOD, 5),
            temperature: sample(&layers.temperature, CLIMATE_PERIOD, 3),
            humidity: sample(&layers.humidity, CLIMATE_PERIOD, 3),
            erosion: sample(&layers.erosion, DETAIL_PERIOD, 4),
            weirdness: sample(&layers.weirdness, DETAIL_PERIOD, 4),
        }
    }

    fn classify(&self, climate: &Climate, wx: f64, wz: f64) -> Biome {
        match self.dimension {
            Dimension::Overworld => match self.version {
                GeneratorVersion::V1_18 => classify_overworld(climate),
            },
            Dimension::Nether => classify_nether(climate),
            Dimension::End => classify_end(climate, wx, wz),
        }
    }
}

impl Default for NoiseSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldSampler for NoiseSampler {
    fn configure(&mut self, version: GeneratorVersion, flavor: BiomeFlavor) {
        self.version = version;
        self.flavor = flavor;
    }

    fn apply_seed(&mut self, dimension: Dimension, seed: u64) {
        let salt = match dimension {
            Dimension::Overworld => OVERWORLD_SALT,
            Dimension::Nether => NETHER_SALT,
            Dimension::End => END_SALT,
        };
        let seeds = LayerSeeds::derive(seed, salt);
        // Perlin construction builds permutation tables; skip it when nothing changed.
        if self.dimension == dimension && self.seeds() == Some(seeds) {
            return;
        }
        self.dimension = dimension;
        self.layers = Some(ClimateLayers::new(seeds));
    }

    fn sample_biomes(&mut self, region: &TileRegion) -> Result<BiomeGrid, SampleError> {
        let layers = self.layers.as_ref().ok_or(SampleError::NotSeeded)?;
        if region.sx == 0 || region.sz == 0 || region.scale == 0 {
            return Err(SampleError::InvalidRegion(format!(
                "{}x{} cells at scale {}",
                region.sx, region.sz, region.scale
            )));
        }

        let mut grid = alloc_grid(region, Biome::Ocean.id())?;
        let half_cell = region.scale as f64 / 2.0;
        for (cx, cz, cell) in grid.iter_mut() {
            let (bx, bz) = region.cell_to_world(cx as u32, cz as u32);
            let wx = bx as f64 + half_cell;
            let wz = bz as f64 + half_cell;
            let climate = self.climate_at(layers, wx, wz);
            *cell = self.classify(&climate, wx, wz).id();
        }
        Ok(grid)
    }
}

/// Fractal sum of `octaves` Perlin octaves, normalised to roughly [-1, 1].
fn fbm(noise: &Perlin, x: f64, z: f64, octaves: u32) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut norm = 0.0;
    for _ in 0..octaves {
        sum += noise.get([x * frequency, z * frequency]) * amplitude;
        norm += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    sum / norm
}

fn classify_overworld(c: &Climate) -> Biome {
    let t = c.temperature;
    let h = c.humidity;

    // Oceans
    if c.continentalness < -0.15 {
        if c.weirdness > 0.75 && c.continentalness > -0.3 {
            return Biome::MushroomFields;
        }
        let deep = c.continentalness < -0.45;
        return match (t, deep) {
            (t, true) if t < -0.45 => Biome::DeepFrozenOcean,
            (t, false) if t < -0.45 => Biome::FrozenOcean,
            (t, _) if t < -0.15 => Biome::ColdOcean,
            (_, true) => Biome::DeepOcean,
            (t, false) if t < 0.2 => Biome::Ocean,
            (t, false) if t < 0.5 => Biome::LukewarmOcean,
            _ => Biome::WarmOcean,
        };
    }

    // Rivers cut through everything inland
    if c.weirdness.abs() < 0.02 {
        return if t < -0.45 {
            Biome::FrozenRiver
        } else {
            Biome::River
        };
    }

    // Shores
    if c.continentalness < -0.08 {
        return if c.erosion < -0.4 {
            Biome::StoneShore
        } else if t < -0.45 {
            Biome::SnowyBeach
        } else {
            Biome::Beach
        };
    }

    // Peaks and slopes
    if c.erosion < -0.45 && c.continentalness > 0.3 {
        return match t {
            t if t < -0.3 => Biome::FrozenPeaks,
            t if t > 0.3 => Biome::StonyPeaks,
            _ => Biome::JaggedPeaks,
        };
    }
    if c.erosion < -0.25 {
        return match (t, h) {
            (t, _) if t < -0.45 => Biome::SnowySlopes,
            (t, h) if t < -0.15 && h > 0.1 => Biome::Grove,
            (t, _) if t < -0.15 => Biome::SnowyMountains,
            (_, h) if h > 0.2 => Biome::WoodedMountains,
            _ => Biome::Mountains,
        };
    }

    classify_lowland(t, h, c.weirdness)
}

fn classify_lowland(t: f64, h: f64, weirdness: f64) -> Biome {
    match t {
        // Frozen
        t if t < -0.45 => {
            if h < 0.0 {
                Biome::SnowyTundra
            } else {
                Biome::SnowyTaiga
            }
        }
        // Cold
        t if t < -0.15 => match h {
            h if h < -0.2 => Biome::Plains,
            h if h < 0.3 => Biome::Taiga,
            _ => Biome::GiantTreeTaiga,
        },
        // Temperate
        t if t < 0.2 => match h {
            h if h < -0.35 => Biome::Plains,
            h if h < -0.1 => Biome::Meadow,
            h if h < 0.1 && weirdness > 0.3 => Biome::BirchForest,
            h if h < 0.1 => Biome::Forest,
            h if h < 0.35 => Biome::DarkForest,
            _ => Biome::Swamp,
        },
        // Warm
        t if t < 0.5 => match h {
            h if h < -0.1 => Biome::Savanna,
            h if h < 0.2 => Biome::Plains,
            _ => Biome::Jungle,
        },
        // Hot
        _ if h >= 0.0 => Biome::SavannaPlateau,
        _ if weirdness > 0.4 => Biome::Badlands,
        _ => Biome::Desert,
    }
}

fn classify_nether(c: &Climate) -> Biome {
    match (c.temperature, c.humidity) {
        (t, _) if t < -0.4 => Biome::SoulSandValley,
        (t, h) if t > 0.4 && h > 0.0 => Biome::CrimsonForest,
        (t, _) if t > 0.4 => Biome::BasaltDeltas,
        (_, h) if h > 0.4 => Biome::WarpedForest,
        _ => Biome::NetherWastes,
    }
}

fn classify_end(c: &Climate, wx: f64, wz: f64) -> Biome {
    if (wx * wx + wz * wz).sqrt() < END_ISLAND_RADIUS {
        return Biome::TheEnd;
    }
    match c.continentalness {
        v if v > 0.25 => Biome::EndHighlands,
        v if v > 0.05 => Biome::EndMidlands,
        v if v > -0.1 => Biome::EndBarrens,
        _ => Biome::SmallEndIslands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::BiomeId;
    use crate::coords::TileRegion;

    fn biome_at(sampler: &NoiseSampler, wx: f64, wz: f64) -> Option<BiomeId> {
        let layers = sampler.layers.as_ref()?;
        let climate = sampler.climate_at(layers, wx, wz);
        Some(sampler.classify(&climate, wx, wz).id())
    }

    fn seeded(seed: u64, dimension: Dimension) -> NoiseSampler {
        let mut sampler = NoiseSampler::new();
        sampler.configure(GeneratorVersion::V1_18, BiomeFlavor::Normal);
        sampler.apply_seed(dimension, seed);
        sampler
    }

    #[test]
    fn test_unseeded_sampler_errors() {
        let mut sampler = NoiseSampler::new();
        let region = TileRegion::for_tile(0, 0, 8, 4);
        assert!(matches!(sampler.sample_biomes(&region), Err(SampleError::NotSeeded)));
    }

    #[test]
    fn test_grid_matches_region_shape() {
        let mut sampler = seeded(12345, Dimension::Overworld);
        let region = TileRegion::for_tile(1, -1, 16, 4);
        let grid = sampler.sample_biomes(&region).unwrap();
        assert_eq!((grid.width, grid.height), (16, 16));
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let region = TileRegion::for_tile(3, 2, 32, 16);
        let a = seeded(99, Dimension::Overworld).sample_biomes(&region).unwrap();
        let b = seeded(99, Dimension::Overworld).sample_biomes(&region).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_ids_are_known_biomes() {
        let known: Vec<BiomeId> = Biome::ALL.iter().map(|b| b.id()).collect();
        for dimension in [Dimension::Overworld, Dimension::Nether, Dimension::End] {
            let mut sampler = seeded(7, dimension);
            let region = TileRegion::for_tile(0, 0, 48, 64);
            let grid = sampler.sample_biomes(&region).unwrap();
            for (_, _, id) in grid.iter() {
                assert!(known.contains(id), "{:?} produced unknown id {}", dimension, id);
            }
        }
    }

    #[test]
    fn test_end_centre_is_main_island() {
        let sampler = seeded(1, Dimension::End);
        assert_eq!(biome_at(&sampler, 0.0, 0.0), Some(Biome::TheEnd.id()));
    }

    #[test]
    fn test_reseeding_with_same_seed_keeps_layers() {
        let mut sampler = seeded(5, Dimension::Overworld);
        let before = sampler.seeds();
        sampler.apply_seed(Dimension::Overworld, 5);
        assert_eq!(sampler.seeds(), before);
        sampler.apply_seed(Dimension::Overworld, 6);
        assert_ne!(sampler.seeds(), before);
    }

    #[test]
    fn test_empty_region_is_rejected() {
        let mut sampler = seeded(5, Dimension::Overworld);
        let region = TileRegion::for_tile(0, 0, 0, 4);
        assert!(matches!(
            sampler.sample_biomes(&region),
            Err(SampleError::InvalidRegion(_))
        ));
    }
}
