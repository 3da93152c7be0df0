use bridge_traits::BridgeError;
use core_async::task::JoinError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourError {
    #[error("Diagnostic sink error: {0}")]
    Sink(#[from] BridgeError),

    #[error("Task failed: {0}")]
    Task(#[from] JoinError),

    #[error("Channel {0} closed unexpectedly")]
    ChannelClosed(&'static str),
}

pub type Result<T> = std::result::Result<T, TourError>;
