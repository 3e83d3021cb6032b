use thiserror::Error;

/// Error taxonomy for the timing-fit subsystem.
///
/// Only configuration problems surface as errors. Degenerate inputs (no hits,
/// zero total weight) and per-hit propagation failures are recovered locally
/// and degrade the estimate instead of aborting, so they have no variant here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TofitError {
    #[error("Invalid timing parameter: {0}")]
    InvalidTimingParameter(String),

    #[error("Invalid channel configuration: {0}")]
    InvalidChannelConfiguration(String),
}
