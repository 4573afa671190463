/// The crate's single error type, distinguishing the three kinds of failure
/// the matching engine and its surrounding plumbing can report.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration fault: {0}")]
    Config(String),

    #[error("programmer fault: {0}")]
    Programmer(String),

    #[error("i/o error")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, Error>;
