// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kpture-collector: the in-cluster broker.
//!
//! Any number of sniffer agents stream frames in; one controller client
//! streams the merged result out. Until the client shows up, inbound frames
//! are discarded; once it goes away, the broker tells every agent to stop,
//! waits for their streams to finish, and shuts the server down.

mod broker;
mod service;

pub use broker::Broker;

use std::net::SocketAddr;

use thiserror::Error;
use tonic::transport::server::Router;
use tonic::transport::Server;

use kpture_core::CollectorOptions;
use kpture_wire::agent_service_server::AgentServiceServer;
use kpture_wire::client_service_server::ClientServiceServer;

/// Errors bringing up or running the collector server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("reflection registry failed: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),

    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),
}

/// Serve the broker until the controller's stream ends and every agent has
/// drained.
pub async fn serve(opts: &CollectorOptions) -> Result<(), ServeError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], opts.server_port));
    let broker = Broker::new(opts.buffer_size);

    tracing::info!(port = opts.server_port, "collector listening");
    routes(broker.clone())
        .await?
        .serve_with_shutdown(addr, broker.terminated())
        .await?;
    Ok(())
}

/// The assembled service router: both broker services plus health and
/// reflection (the collector pod's probes hit the health service).
pub(crate) async fn routes(broker: Broker) -> Result<Router, ServeError> {
    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AgentServiceServer<Broker>>()
        .await;
    health_reporter
        .set_serving::<ClientServiceServer<Broker>>()
        .await;

    let reflection = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(kpture_wire::FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Ok(Server::builder()
        .add_service(health_service)
        .add_service(reflection)
        .add_service(AgentServiceServer::new(broker.clone()))
        .add_service(ClientServiceServer::new(broker)))
}
