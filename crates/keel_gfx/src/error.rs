use thiserror::Error;

/// Errors that can occur while creating a context.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitError {
    #[error("device reports no supported API tier (capability bits {bits:#010x})")]
    NoApiTier { bits: u32 },

    #[error("device reports no texture units")]
    NoTextureUnits,

    #[error("texture unit cap {requested} exceeds the {available} units the device reports")]
    TextureUnitCap { requested: u32, available: u32 },

    #[error("bindless vertex path requires an API4 class device")]
    BindlessUnsupported,
}
