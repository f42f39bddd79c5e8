use thiserror::Error;

/// Failure of one turn of one session.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Model kept requesting tools after {max_rounds} rounds")]
    TooManyToolRounds { max_rounds: usize },

    #[error("Provider round timed out after {seconds}s")]
    Timeout { seconds: u64 },
}
