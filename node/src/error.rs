use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] ember_network::NetworkError),

    #[error("rpc error: {0}")]
    Rpc(#[from] ember_rpc::RpcError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("node not started")]
    NotStarted,
}
