//! The world-sampler seam.
//!
//! The pipeline only needs three things from a world generator: configure it,
//! seed it, and ask it for the biome ids of a region. Everything else about how
//! biomes come to be is the sampler's business.

use clap::ValueEnum;

use crate::biomes::BiomeId;
use crate::coords::TileRegion;
use crate::error::SampleError;
use crate::tilemap::Tilemap;

/// Grid of biome ids, `region.sx` wide and `region.sz` tall.
pub type BiomeGrid = Tilemap<BiomeId>;

/// Generation rule set requested from the sampler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeneratorVersion {
    /// Multi-noise climate layout (temperature, humidity, continentalness, erosion, weirdness)
    #[default]
    V1_18,
}

/// Biome size flavour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BiomeFlavor {
    /// Regular biome size
    Normal,
    /// Biomes four times larger along each axis
    #[default]
    LargeBiomes,
}

/// World dimension to sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

/// A deterministic source of biome grids.
///
/// Implementations must return the same grid for the same configuration, seed
/// and region. One instance is owned by one worker at a time.
pub trait WorldSampler: Send {
    /// Select the rule set and biome size.
    fn configure(&mut self, version: GeneratorVersion, flavor: BiomeFlavor);

    /// Seed the sampler for a dimension.
    fn apply_seed(&mut self, dimension: Dimension, seed: u64);

    /// Produce a fresh grid covering `region`. The caller owns the result.
    fn sample_biomes(&mut self, region: &TileRegion) -> Result<BiomeGrid, SampleError>;
}

impl<S: WorldSampler + ?Sized> WorldSampler for Box<S> {
    fn configure(&mut self, version: GeneratorVersion, flavor: BiomeFlavor) {
        (**self).configure(version, flavor)
    }

    fn apply_seed(&mut self, dimension: Dimension, seed: u64) {
        (**self).apply_seed(dimension, seed)
    }

    fn sample_biomes(&mut self, region: &TileRegion) -> Result<BiomeGrid, SampleError> {
        (**self).sample_biomes(region)
    }
}

/// Settings applied to every sampler a worker owns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SamplerSettings {
    pub version: GeneratorVersion,
    pub flavor: BiomeFlavor,
    pub dimension: Dimension,
}

impl SamplerSettings {
    /// Configure and seed `sampler` for a world.
    pub fn apply<S: WorldSampler + ?Sized>(&self, sampler: &mut S, seed: u64) {
        sampler.configure(self.version, self.flavor);
        sampler.apply_seed(self.dimension, seed);
    }
}

/// Allocate an empty grid for `region`, reporting allocation failure.
pub fn alloc_grid(region: &TileRegion, fill: BiomeId) -> Result<BiomeGrid, SampleError> {
    let (width, height) = (region.sx as usize, region.sz as usize);
    Tilemap::try_new_with(width, height, fill)
        .map_err(|_| SampleError::Allocation { width, height })
}
