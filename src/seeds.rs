//! Seed management for biome sampling
//!
//! Each climate layer gets its own seed, derived from the world seed, so that
//! layers vary independently while staying deterministic per world. Derivation
//! uses fixed salts and a fixed mixer, so the same world seed yields the same
//! layer seeds on every build and tiles rendered by different builds line up.

/// Dimension salts.
pub const OVERWORLD_SALT: u64 = 0x6f76_6572_776f_726c;
pub const NETHER_SALT: u64 = 0x6e65_7468_6572;
pub const END_SALT: u64 = 0x0065_6e64;

const CONTINENTALNESS_SALT: u64 = 0x636f_6e74;
const TEMPERATURE_SALT: u64 = 0x7465_6d70;
const HUMIDITY_SALT: u64 = 0x6875_6d69;
const EROSION_SALT: u64 = 0x6572_6f73;
const WEIRDNESS_SALT: u64 = 0x7765_6972;

/// Seeds for every noise layer the bundled sampler uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerSeeds {
    /// World seed (used for reference)
    pub world: u64,
    /// Continentalness (ocean vs. inland)
    pub continentalness: u64,
    /// Temperature bands
    pub temperature: u64,
    /// Humidity bands
    pub humidity: u64,
    /// Erosion (flat vs. mountainous)
    pub erosion: u64,
    /// Weirdness (variant selection, rivers)
    pub weirdness: u64,
}

impl LayerSeeds {
    /// Derive all layer seeds from a world seed and a dimension salt.
    pub fn derive(world: u64, salt: u64) -> Self {
        let base = splitmix64(world ^ salt);
        Self {
            world,
            continentalness: splitmix64(base ^ CONTINENTALNESS_SALT),
            temperature: splitmix64(base ^ TEMPERATURE_SALT),
            humidity: splitmix64(base ^ HUMIDITY_SALT),
            erosion: splitmix64(base ^ EROSION_SALT),
            weirdness: splitmix64(base ^ WEIRDNESS_SALT),
        }
    }
}

fn splitmix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = value;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
