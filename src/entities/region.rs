//! Garment regions and the registry binding them to the garment asset.
//!
//! The registry is the single source of truth for which mesh and material slot
//! a region drives. Lookup is by the stable asset id; mesh names are never
//! matched by substring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::keys::*;

/// Placeable surface area on the garment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Front,
    Back,
    #[serde(rename = "sleeve_left")]
    LeftSleeve,
    #[serde(rename = "sleeve_right")]
    RightSleeve,
}

impl Region {
    /// All regions in registry order.
    pub const ALL: [Region; 4] = [
        Region::Front,
        Region::Back,
        Region::LeftSleeve,
        Region::RightSleeve,
    ];

    /// Stable asset id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Front => R_FRONT,
            Region::Back => R_BACK,
            Region::LeftSleeve => R_SLEEVE_LEFT,
            Region::RightSleeve => R_SLEEVE_RIGHT,
        }
    }

    /// Parse a stable asset id. Exact match only.
    pub fn from_id(id: &str) -> Option<Self> {
        Region::ALL.into_iter().find(|r| r.as_str() == id)
    }

    /// Display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Front => "Front",
            Region::Back => "Back",
            Region::LeftSleeve => "Left Sleeve",
            Region::RightSleeve => "Right Sleeve",
        }
    }

    pub fn is_sleeve(&self) -> bool {
        matches!(self, Region::LeftSleeve | Region::RightSleeve)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::from_id(s).ok_or_else(|| {
            let known: Vec<&str> = Region::ALL.iter().map(|r| r.as_str()).collect();
            format!("unknown region '{}' (expected one of: {})", s, known.join(", "))
        })
    }
}

/// Renderer binding of a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBinding {
    pub region: Region,
    /// Mesh node name in the garment asset
    pub mesh: &'static str,
    /// Material slot the decal and base color are written to
    pub material_slot: &'static str,
    /// Trim piece on this region (collar on the body panels, cuff on sleeves)
    pub trim_mesh: &'static str,
    /// Material slot of the trim piece
    pub trim_slot: &'static str,
    /// Scale in percent a freshly placed image starts at
    pub default_scale: f32,
    /// Base color used before the user picks one
    pub default_color: Color,
}

/// Fixed region -> binding table.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    bindings: IndexMap<Region, RegionBinding>,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::garment()
    }
}

impl RegionRegistry {
    /// Registry for the standard t-shirt asset.
    pub fn garment() -> Self {
        let body = Color::WHITE;
        let entries = [
            (Region::Front, MESH_FRONT, SLOT_BODY, MESH_COLLAR, 100.0),
            (Region::Back, MESH_BACK, SLOT_BODY, MESH_COLLAR, 100.0),
            (Region::LeftSleeve, MESH_SLEEVE_LEFT, SLOT_SLEEVE_LEFT, MESH_CUFF_LEFT, 50.0),
            (Region::RightSleeve, MESH_SLEEVE_RIGHT, SLOT_SLEEVE_RIGHT, MESH_CUFF_RIGHT, 50.0),
        ];
        let bindings = entries
            .into_iter()
            .map(|(region, mesh, material_slot, trim_mesh, default_scale)| {
                (
                    region,
                    RegionBinding {
                        region,
                        mesh,
                        material_slot,
                        trim_mesh,
                        trim_slot: SLOT_TRIM,
                        default_scale,
                        default_color: body,
                    },
                )
            })
            .collect();
        Self { bindings }
    }

    pub fn get(&self, region: Region) -> &RegionBinding {
        // Every Region variant is inserted by the only constructor.
        &self.bindings[&region]
    }

    /// Find the region bound to an asset id.
    pub fn by_asset_id(&self, id: &str) -> Option<&RegionBinding> {
        Region::from_id(id).and_then(|r| self.bindings.get(&r))
    }

    /// Find the region that drives a mesh (exact name).
    pub fn by_mesh(&self, mesh: &str) -> Option<&RegionBinding> {
        self.bindings.values().find(|b| b.mesh == mesh)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionBinding> {
        self.bindings.values()
    }
}
