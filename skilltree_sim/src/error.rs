// Error types for the fallible edges of the sim: parsing coordinates,
// loading configuration, and talking to a save store.
//
// Gameplay rejections (allocating a fogged node, deallocating the origin)
// are not errors. They come back as check enums from `action.rs`.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate key {input:?}: expected \"[x, y, z]\"")]
pub struct ParseCoordError {
    pub input: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Also covers invalid weight tables, which are rejected while
    /// deserializing.
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be within [0, 1], got {value}")]
    FrequencyOutOfRange { field: &'static str, value: f64 },
    #[error("invalid amount range for {field}")]
    InvalidRange { field: &'static str },
    #[error("available_distance ({available}) exceeds fog_of_war_distance ({fog})")]
    DistanceOrder { available: u32, fog: u32 },
    #[error("z_scale_factor must be at least 2, got {0}")]
    ZScale(i32),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("save store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("saved config is invalid: {0}")]
    Config(#[from] ConfigError),
    #[error("saved game is inconsistent: {0}")]
    Inconsistent(String),
}
