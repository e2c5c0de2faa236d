//! Stable identifier constants shared by the registry, settings and storage.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Asset ids are emitted by the garment asset pipeline and must match exactly.

// === Region asset ids ===
/// Front panel of the torso
pub const R_FRONT: &str = "front";
/// Back panel of the torso
pub const R_BACK: &str = "back";
/// Left sleeve (wearer's left)
pub const R_SLEEVE_LEFT: &str = "sleeve_left";
/// Right sleeve (wearer's right)
pub const R_SLEEVE_RIGHT: &str = "sleeve_right";

// === Mesh names in the garment asset ===
pub const MESH_FRONT: &str = "Shirt_Front";
pub const MESH_BACK: &str = "Shirt_Back";
pub const MESH_SLEEVE_LEFT: &str = "Shirt_Sleeve_L";
pub const MESH_SLEEVE_RIGHT: &str = "Shirt_Sleeve_R";
pub const MESH_COLLAR: &str = "Shirt_Collar";
pub const MESH_CUFF_LEFT: &str = "Shirt_Cuff_L";
pub const MESH_CUFF_RIGHT: &str = "Shirt_Cuff_R";

// === Material slots ===
pub const SLOT_BODY: &str = "mat_body";
pub const SLOT_SLEEVE_LEFT: &str = "mat_sleeve_l";
pub const SLOT_SLEEVE_RIGHT: &str = "mat_sleeve_r";
/// Collar and cuffs share one material
pub const SLOT_TRIM: &str = "mat_trim";

// === Local key-value store ===
/// Key of the color snapshot in the local store
pub const K_COLORS: &str = "colors";

// === File names ===
/// Designer settings file
pub const SETTINGS_FILE: &str = "drape.json";
/// Local key-value store backing the color snapshot
pub const STORE_FILE: &str = "drape_store.json";
/// Default log file for `--log` without a path
pub const LOG_FILE: &str = "drape.log";
