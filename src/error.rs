use thiserror::Error;

/// Errors raised while constructing a pyramid source from its options.
///
/// All of these are fatal at construction time: the source refuses to build
/// rather than falling back to a silent default.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The image extent must be strictly positive on both axes
    #[error("invalid image extent: {width}x{height} (both axes must be > 0)")]
    InvalidExtent { width: u32, height: u32 },

    /// Unrecognized tier size calculation name
    #[error("unknown tier size calculation {name:?} (expected \"default\" or \"truncated\")")]
    UnknownTierSizeCalculation { name: String },

    /// The base tile edge length must be strictly positive
    #[error("invalid tile edge length: {0} (must be > 0)")]
    InvalidTileEdge(u32),

    /// The origin request quality must be in 1..=100
    #[error("invalid quality: {0} (must be between 1 and 100)")]
    InvalidQuality(u8),

    /// The base URL could not be parsed
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors surfaced by the external transport/loader collaborator.
///
/// This crate issues no fetches itself; these variants type the boundary at
/// which a loader reports the outcome of a tile fetch. Retry policy, if any,
/// lives on the transport side.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// Network or transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The fetched payload could not be decoded into an image
    #[error("decode error: {0}")]
    Decode(String),

    /// The load was cancelled or superseded before completion
    #[error("load cancelled")]
    Cancelled,
}
