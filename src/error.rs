use crate::boundary::Fault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipeBufError {
    #[error("capacity must be greater than zero")]
    InvalidCapacity,

    #[error("channel is already open")]
    Busy,

    #[error("transfer interrupted after {transferred} bytes")]
    Interrupted { transferred: usize },

    #[error("transfer fault after {transferred} bytes")]
    Fault {
        transferred: usize,
        #[source]
        source: Fault,
    },

    #[error("resize to {requested} bytes would truncate {occupancy} buffered bytes")]
    WouldTruncate { requested: usize, occupancy: usize },
}

pub type Result<T> = std::result::Result<T, PipeBufError>;
