use ipnet::IpNet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid IP/subnet: {0}")]
    InvalidSubnet(String),

    #[error("subnet {0} is already banned")]
    AlreadyBanned(IpNet),

    #[error("subnet {0} was not previously manually banned")]
    NotBanned(IpNet),

    #[error("absolute ban time {until} is in the past (now {now})")]
    BanTimeInPast { until: u64, now: u64 },

    #[error("ban store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
