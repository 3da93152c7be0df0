use bridge_traits::BridgeError;
use core_async::runtime::RuntimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] RuntimeError),

    #[error("Diagnostic sink error: {0}")]
    Sink(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, Error>;
