//! Biome identifiers and the fixed biome → colour lookup table.
//!
//! Biome grids carry raw numeric identifiers so that any sampler can feed the
//! rasteriser. The numbering follows the classic overworld/nether/end biome ids
//! used by tiled-map viewers; ids without an entry render in `FALLBACK_COLOR`.

/// Raw biome identifier as produced by a sampler.
pub type BiomeId = i32;

/// Number of entries in the colour table.
pub const COLOR_TABLE_SIZE: usize = 256;

/// Colour for ids outside the table or without an assigned colour.
pub const FALLBACK_COLOR: [u8; 3] = [0, 0, 0];

/// 256-entry RGB lookup table indexed by biome id.
pub type BiomeColorTable = [[u8; 3]; COLOR_TABLE_SIZE];

/// Biomes known to the bundled sampler and the colour table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Biome {
    Ocean = 0,
    Plains = 1,
    Desert = 2,
    Mountains = 3,
    Forest = 4,
    Taiga = 5,
    Swamp = 6,
    River = 7,
    NetherWastes = 8,
    TheEnd = 9,
    FrozenOcean = 10,
    FrozenRiver = 11,
    SnowyTundra = 12,
    SnowyMountains = 13,
    MushroomFields = 14,
    Beach = 16,
    Jungle = 21,
    DeepOcean = 24,
    StoneShore = 25,
    SnowyBeach = 26,
    BirchForest = 27,
    DarkForest = 29,
    SnowyTaiga = 30,
    GiantTreeTaiga = 32,
    WoodedMountains = 34,
    Savanna = 35,
    SavannaPlateau = 36,
    Badlands = 37,
    SmallEndIslands = 40,
    EndMidlands = 41,
    EndHighlands = 42,
    EndBarrens = 43,
    WarmOcean = 44,
    LukewarmOcean = 45,
    ColdOcean = 46,
    DeepFrozenOcean = 50,
    SoulSandValley = 170,
    CrimsonForest = 171,
    WarpedForest = 172,
    BasaltDeltas = 173,
    Meadow = 177,
    Grove = 178,
    SnowySlopes = 179,
    JaggedPeaks = 180,
    FrozenPeaks = 181,
    StonyPeaks = 182,
}

impl Biome {
    pub const ALL: [Biome; 46] = [
        Biome::Ocean,
        Biome::Plains,
        Biome::Desert,
        Biome::Mountains,
        Biome::Forest,
        Biome::Taiga,
        Biome::Swamp,
        Biome::River,
        Biome::NetherWastes,
        Biome::TheEnd,
        Biome::FrozenOcean,
        Biome::FrozenRiver,
        Biome::SnowyTundra,
        Biome::SnowyMountains,
        Biome::MushroomFields,
        Biome::Beach,
        Biome::Jungle,
        Biome::DeepOcean,
        Biome::StoneShore,
        Biome::SnowyBeach,
        Biome::BirchForest,
        Biome::DarkForest,
        Biome::SnowyTaiga,
        Biome::GiantTreeTaiga,
        Biome::WoodedMountains,
        Biome::Savanna,
        Biome::SavannaPlateau,
        Biome::Badlands,
        Biome::SmallEndIslands,
        Biome::EndMidlands,
        Biome::EndHighlands,
        Biome::EndBarrens,
        Biome::WarmOcean,
        Biome::LukewarmOcean,
        Biome::ColdOcean,
        Biome::DeepFrozenOcean,
        Biome::SoulSandValley,
        Biome::CrimsonForest,
        Biome::WarpedForest,
        Biome::BasaltDeltas,
        Biome::Meadow,
        Biome::Grove,
        Biome::SnowySlopes,
        Biome::JaggedPeaks,
        Biome::FrozenPeaks,
        Biome::StonyPeaks,
    ];

    pub fn id(self) -> BiomeId {
        self as BiomeId
    }

    /// Map colour for this biome.
    pub fn color(self) -> [u8; 3] {
        match self {
            // Water
            Biome::Ocean => [0, 0, 112],
            Biome::DeepOcean => [0, 0, 48],
            Biome::WarmOcean => [0, 0, 172],
            Biome::LukewarmOcean => [0, 0, 144],
            Biome::ColdOcean => [32, 32, 112],
            Biome::FrozenOcean => [112, 112, 214],
            Biome::DeepFrozenOcean => [64, 64, 144],
            Biome::River => [0, 0, 255],
            Biome::FrozenRiver => [160, 160, 255],

            // Shores
            Biome::Beach => [250, 222, 85],
            Biome::SnowyBeach => [250, 240, 192],
            Biome::StoneShore => [162, 162, 132],

            // Lowlands
            Biome::Plains => [141, 179, 96],
            Biome::Meadow => [96, 164, 69],
            Biome::Desert => [250, 148, 24],
            Biome::Savanna => [189, 178, 95],
            Biome::SavannaPlateau => [167, 157, 100],
            Biome::Badlands => [217, 69, 21],
            Biome::Swamp => [7, 249, 178],
            Biome::MushroomFields => [255, 0, 255],

            // Forests
            Biome::Forest => [5, 102, 33],
            Biome::BirchForest => [48, 116, 68],
            Biome::DarkForest => [64, 81, 26],
            Biome::Jungle => [83, 123, 9],
            Biome::Taiga => [11, 102, 89],
            Biome::SnowyTaiga => [49, 85, 74],
            Biome::GiantTreeTaiga => [89, 102, 81],
            Biome::Grove => [71, 114, 108],

            // Cold
            Biome::SnowyTundra => [255, 255, 255],
            Biome::SnowySlopes => [196, 196, 196],

            // Mountains
            Biome::Mountains => [96, 96, 96],
            Biome::WoodedMountains => [80, 112, 80],
            Biome::SnowyMountains => [160, 160, 160],
            Biome::JaggedPeaks => [220, 220, 200],
            Biome::FrozenPeaks => [176, 179, 206],
            Biome::StonyPeaks => [123, 143, 116],

            // Nether
            Biome::NetherWastes => [87, 37, 38],
            Biome::SoulSandValley => [77, 58, 46],
            Biome::CrimsonForest => [152, 26, 17],
            Biome::WarpedForest => [73, 144, 123],
            Biome::BasaltDeltas => [100, 95, 99],

            // End
            Biome::TheEnd => [128, 128, 255],
            Biome::SmallEndIslands => [75, 75, 171],
            Biome::EndMidlands => [201, 201, 89],
            Biome::EndHighlands => [181, 181, 54],
            Biome::EndBarrens => [112, 112, 204],
        }
    }
}

/// Build the fixed colour table. Unassigned entries hold `FALLBACK_COLOR`.
pub fn biome_color_table() -> BiomeColorTable {
    let mut table = [FALLBACK_COLOR; COLOR_TABLE_SIZE];
    for biome in Biome::ALL {
        table[biome.id() as usize] = biome.color();
    }
    table
}

/// Look up a colour, falling back for ids the table cannot index.
pub fn color_for(table: &BiomeColorTable, id: BiomeId) -> [u8; 3] {
    usize::try_from(id)
        .ok()
        .and_then(|idx| table.get(idx))
        .copied()
        .unwrap_or(FALLBACK_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_in_table_range() {
        let mut seen = HashSet::new();
        for biome in Biome::ALL {
            assert!((0..COLOR_TABLE_SIZE as i32).contains(&biome.id()));
            assert!(seen.insert(biome.id()), "duplicate id {:?}", biome);
        }
    }

    #[test]
    fn test_table_matches_biome_colors() {
        let table = biome_color_table();
        assert_eq!(table[Biome::Plains.id() as usize], Biome::Plains.color());
        assert_eq!(table[Biome::StonyPeaks.id() as usize], Biome::StonyPeaks.color());
        // 15 is not assigned
        assert_eq!(table[15], FALLBACK_COLOR);
    }

    #[test]
    fn test_out_of_range_ids_fall_back() {
        let table = biome_color_table();
        assert_eq!(color_for(&table, -1), FALLBACK_COLOR);
        assert_eq!(color_for(&table, 256), FALLBACK_COLOR);
        assert_eq!(color_for(&table, i32::MAX), FALLBACK_COLOR);
        assert_eq!(color_for(&table, Biome::Desert.id()), Biome::Desert.color());
    }
}
