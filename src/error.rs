use thiserror::Error;

/// Why a client request was dropped.
///
/// On the wire nothing is sent back (the client only ever notices the
/// absence of a broadcast); the reason exists so callers can log it and
/// tests can assert it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("player {0} is dead")]
    NotAlive(String),

    #[error("target {0} is not alive")]
    TargetNotAlive(String),

    #[error("round is already over")]
    GameOver,
}
