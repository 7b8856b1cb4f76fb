// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local tunnel to the collector pod.
//!
//! A TCP listener bound to an OS-assigned port on 127.0.0.1; every accepted
//! connection is piped over a fresh kube-API port-forward to the collector's
//! server port. The controller dials gRPC against the local port.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Errors establishing the tunnel.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to bind local forward port: {0}")]
    Bind(#[source] std::io::Error),

    #[error("timeout waiting for port forward")]
    ReadyTimeout,

    #[error("port forward ended before becoming ready")]
    Aborted,
}

/// A tunnel that signals readiness once it accepts connections and runs
/// until cancelled.
#[async_trait]
pub trait Forwarder: Send + 'static {
    async fn forward(self, ready: oneshot::Sender<()>, stop: CancellationToken);
}

/// The kube-API-backed tunnel to one pod port.
pub struct PortForwarder {
    pods: Api<Pod>,
    pod_name: String,
    pod_port: u16,
    listener: TcpListener,
}

impl PortForwarder {
    /// Bind the local side. Port 0 asks the OS for any free port.
    pub async fn bind(pods: Api<Pod>, pod_name: String, pod_port: u16) -> Result<Self, ForwardError> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(ForwardError::Bind)?;
        Ok(Self {
            pods,
            pod_name,
            pod_port,
            listener,
        })
    }

    /// The OS-assigned local port.
    pub fn local_port(&self) -> Result<u16, ForwardError> {
        Ok(self.listener.local_addr().map_err(ForwardError::Bind)?.port())
    }
}

#[async_trait]
impl Forwarder for PortForwarder {
    async fn forward(self, ready: oneshot::Sender<()>, stop: CancellationToken) {
        let _ = ready.send(());
        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                accepted = self.listener.accept() => match accepted {
                    Ok((conn, _)) => {
                        let pods = self.pods.clone();
                        let pod_name = self.pod_name.clone();
                        let pod_port = self.pod_port;
                        tokio::spawn(forward_connection(pods, pod_name, pod_port, conn));
                    }
                    Err(err) => tracing::warn!(error = %err, "port forward accept failed"),
                },
            }
        }
    }
}

async fn forward_connection(pods: Api<Pod>, pod_name: String, pod_port: u16, mut conn: TcpStream) {
    let mut forwarder = match pods.portforward(&pod_name, &[pod_port]).await {
        Ok(forwarder) => forwarder,
        Err(err) => {
            tracing::warn!(pod = %pod_name, error = %err, "port forward dial failed");
            return;
        }
    };
    let Some(mut upstream) = forwarder.take_stream(pod_port) else {
        tracing::warn!(port = pod_port, "port forward stream missing");
        return;
    };
    if let Err(err) = tokio::io::copy_bidirectional(&mut conn, &mut upstream).await {
        tracing::debug!(error = %err, "port forward connection closed");
    }
}

/// Run `forwarder` on a background task and wait for its readiness signal
/// or the setup timeout, whichever comes first.
pub async fn start_forward<F>(forwarder: F, stop: CancellationToken, timeout: Duration) -> Result<(), ForwardError>
where
    F: Forwarder,
{
    let (ready_tx, ready_rx) = oneshot::channel();
    tokio::spawn(forwarder.forward(ready_tx, stop));

    match tokio::time::timeout(timeout, ready_rx).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(_)) => Err(ForwardError::Aborted),
        Err(_) => Err(ForwardError::ReadyTimeout),
    }
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod forward_tests;
