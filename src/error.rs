use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaddysimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No weather record for {year}-{doy:03}")]
    MissingWeather { year: i32, doy: u16 },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, PaddysimError>;
