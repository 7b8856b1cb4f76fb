// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preflight checks: cluster version gate and target pod selection.
//!
//! Everything in this module runs before the session mutates the cluster;
//! a failure here aborts without any teardown.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::version::Info;
use kube::api::ListParams;
use kube::{Api, Client};
use thiserror::Error;

/// Errors surfaced before any cluster mutation.
#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("Ephemeral containers are not supported")]
    EphemeralUnsupported,

    #[error("unrecognized server version {0}.{1}")]
    Version(String, String),

    #[error("no target pods selected")]
    NoTargets,

    #[error("pod {0} is not in running state")]
    NotRunning(String),

    #[error(transparent)]
    Api(#[from] kube::Error),
}

/// Reports the cluster's server version.
#[async_trait]
pub trait VersionGetter {
    async fn server_version(&self) -> Result<Info, kube::Error>;
}

#[async_trait]
impl VersionGetter for Client {
    async fn server_version(&self) -> Result<Info, kube::Error> {
        self.apiserver_version().await
    }
}

/// Lists the pods of the session namespace.
#[async_trait]
pub trait PodLister {
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error>;
}

#[async_trait]
impl PodLister for Api<Pod> {
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        Ok(self.list(&ListParams::default()).await?.items)
    }
}

/// Ephemeral containers require 1.22; anything older is rejected.
pub async fn check_ephemeral_support<V>(version: &V) -> Result<(), PreflightError>
where
    V: VersionGetter + Sync + ?Sized,
{
    let info = version.server_version().await?;
    let major: i64 = info
        .major
        .parse()
        .map_err(|_| PreflightError::Version(info.major.clone(), info.minor.clone()))?;
    let minor: i64 = info
        .minor
        .parse()
        .map_err(|_| PreflightError::Version(info.major.clone(), info.minor.clone()))?;

    if major < 1 || (major == 1 && minor < 22) {
        return Err(PreflightError::EphemeralUnsupported);
    }
    Ok(())
}

/// Resolve the target pod set, preserving the server's list order.
///
/// An empty selection — no pods in the namespace with `--all`, or none of
/// the requested names present — is a configuration error, not an empty
/// capture.
pub async fn select_pods<L>(names: &[String], all: bool, lister: &L) -> Result<Vec<Pod>, PreflightError>
where
    L: PodLister + Sync + ?Sized,
{
    let pods = lister.list_pods().await?;
    let selected: Vec<Pod> = if all {
        pods
    } else {
        pods.into_iter()
            .filter(|pod| {
                pod.metadata
                    .name
                    .as_deref()
                    .is_some_and(|name| names.iter().any(|wanted| wanted == name))
            })
            .collect()
    };

    if selected.is_empty() {
        return Err(PreflightError::NoTargets);
    }
    Ok(selected)
}

/// Every target must be Running before injection.
pub fn ensure_running(pods: &[Pod]) -> Result<(), PreflightError> {
    for pod in pods {
        let phase = pod.status.as_ref().and_then(|status| status.phase.as_deref());
        if phase != Some("Running") {
            return Err(PreflightError::NotRunning(
                pod.metadata.name.clone().unwrap_or_default(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod preflight_tests;
