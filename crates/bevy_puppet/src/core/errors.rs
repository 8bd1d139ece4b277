use thiserror::Error;

/// Possible errors produced by the puppet engine.
///
/// Nothing here is fatal to a host: every failure path degrades to "this
/// visual feature is inactive" rather than halting the frame loop.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PuppetError {
    #[error("no animation clip registered under the name {0:?}")]
    UnknownClip(String),
    #[error("failed to parse puppet configuration: {0}")]
    ConfigParse(String),
}

pub type PuppetResult<T> = Result<T, PuppetError>;
