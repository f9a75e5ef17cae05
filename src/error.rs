use thiserror::Error;

/// Errors.
///    Error 1: Not all 12 edges exist exactly once, or an edge flip is unbalanced
///    Error 2: Not all corners exist exactly once, or a corner twist is unbalanced
///    Error 3: Parity error: Two corners or two edges have to be exchanged
///    Error 4: Invalid scramble string
///    Error 5: Invalid spin value
///    Error 6: Invalid collection data
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid edge value")]
    InvalidEdge,
    #[error("Invalid corner value")]
    InvalidCorner,
    #[error("Two corners or two edges have to be exchanged")]
    ParityError,
    #[error("Invalid scramble string")]
    InvalidScramble,
    #[error("Invalid spin value")]
    InvalidSpin,
    #[error("Invalid collection data: {0}")]
    InvalidCollection(String),
}
