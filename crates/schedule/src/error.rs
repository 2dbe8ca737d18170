use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("malformed duration: {0}")]
    MalformedDuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
