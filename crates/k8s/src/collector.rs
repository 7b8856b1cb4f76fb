// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collector pod lifecycle: deploy, wait for Running, tear down.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, ContainerPort, GRPCAction, Pod, PodSpec, Probe};
use kube::api::{DeleteParams, ObjectMeta, PostParams};
use kube::Api;
use thiserror::Error;

use kpture_core::{collector_pod_name, CollectorOptions};

/// Image for the collector pod.
pub const COLLECTOR_IMAGE: &str = "ghcr.io/kpture/collector:latest";

const READINESS_INITIAL_DELAY: i32 = 5;
const LIVENESS_INITIAL_DELAY: i32 = 10;
const DEPLOY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors mutating the cluster; these always trigger teardown.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("collector pod not running after {0:?}")]
    SetupTimeout(Duration),

    #[error("collector endpoint is not known yet")]
    MissingCollectorAddress,

    #[error("pod {0} has no container to attach the sniffer to")]
    NoTargetContainer(String),

    #[error(transparent)]
    Api(#[from] kube::Error),
}

/// Create, fetch and delete pods in the session namespace.
#[async_trait]
pub trait PodCrud {
    async fn create_pod(&self, pod: &Pod) -> Result<Pod, kube::Error>;
    async fn get_pod(&self, name: &str) -> Result<Pod, kube::Error>;
    async fn delete_pod(&self, name: &str) -> Result<(), kube::Error>;
}

#[async_trait]
impl PodCrud for Api<Pod> {
    async fn create_pod(&self, pod: &Pod) -> Result<Pod, kube::Error> {
        self.create(&PostParams::default(), pod).await
    }

    async fn get_pod(&self, name: &str) -> Result<Pod, kube::Error> {
        self.get(name).await
    }

    async fn delete_pod(&self, name: &str) -> Result<(), kube::Error> {
        self.delete(name, &DeleteParams::default()).await.map(|_| ())
    }
}

/// Create the collector pod and poll until it is Running, returning its IP.
///
/// The setup timeout bounds the poll; a timeout here surfaces as a
/// provisioning failure and the caller tears the session down.
pub async fn deploy_collector<C>(api: &C, opts: &CollectorOptions) -> Result<String, ProvisionError>
where
    C: PodCrud + Sync + ?Sized,
{
    let name = collector_pod_name(&opts.session_id);
    api.create_pod(&collector_pod(&name, opts)).await?;

    let wait = tokio::time::timeout(opts.setup_timeout, async {
        loop {
            let pod = api.get_pod(&name).await?;
            let status = pod.status.as_ref();
            if status.and_then(|s| s.phase.as_deref()) == Some("Running") {
                if let Some(ip) = status.and_then(|s| s.pod_ip.clone()) {
                    return Ok(ip);
                }
            }
            tokio::time::sleep(DEPLOY_POLL_INTERVAL).await;
        }
    })
    .await;

    match wait {
        Ok(result) => result,
        Err(_) => Err(ProvisionError::SetupTimeout(opts.setup_timeout)),
    }
}

/// Delete the session's collector pod. A pod that is already gone counts
/// as success.
pub async fn teardown_collector<C>(api: &C, session_id: &str) -> Result<(), ProvisionError>
where
    C: PodCrud + Sync + ?Sized,
{
    match api.delete_pod(&collector_pod_name(session_id)).await {
        Ok(()) => Ok(()),
        Err(kube::Error::Api(response)) if response.code == 404 => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn collector_pod(name: &str, opts: &CollectorOptions) -> Pod {
    let port = i32::from(opts.server_port);
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "collector".to_string(),
                image: Some(COLLECTOR_IMAGE.to_string()),
                image_pull_policy: Some("IfNotPresent".to_string()),
                args: Some(vec![
                    "proxy".to_string(),
                    "-p".to_string(),
                    opts.server_port.to_string(),
                    "-s".to_string(),
                    opts.buffer_size.to_string(),
                ]),
                ports: Some(vec![ContainerPort {
                    name: Some("grpc".to_string()),
                    container_port: port,
                    protocol: Some("TCP".to_string()),
                    ..ContainerPort::default()
                }]),
                readiness_probe: Some(grpc_probe(port, READINESS_INITIAL_DELAY)),
                liveness_probe: Some(grpc_probe(port, LIVENESS_INITIAL_DELAY)),
                ..Container::default()
            }],
            ..PodSpec::default()
        }),
        status: None,
    }
}

fn grpc_probe(port: i32, initial_delay: i32) -> Probe {
    Probe {
        grpc: Some(GRPCAction { port, service: None }),
        initial_delay_seconds: Some(initial_delay),
        ..Probe::default()
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod collector_tests;
