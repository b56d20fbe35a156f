//! Plain TCP listener.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::net::NetError;

/// Parse the configured bind address.
pub fn bind_address(config: &ListenerConfig) -> Result<SocketAddr, NetError> {
    config
        .bind_address
        .parse()
        .map_err(|_| NetError::Address(config.bind_address.clone()))
}

/// Bind to the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, NetError> {
    let addr = bind_address(config)?;
    let listener = TcpListener::bind(addr).await.map_err(NetError::Bind)?;
    let local_addr = listener.local_addr().map_err(NetError::Bind)?;

    tracing::info!(
        address = %local_addr,
        max_in_flight = config.max_in_flight,
        "Listener bound"
    );
    Ok(listener)
}
