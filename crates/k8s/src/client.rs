// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster connection and namespace resolution.
//!
//! The kubeconfig comes from `KUBECONFIG` (colon-separated file list,
//! merged) with the usual `~/.kube/config` fallback. The namespace is the
//! explicit flag, else the current context's namespace, else `"default"`.

use std::time::Duration;

use k8s_openapi::api::core::v1::Pod;
use kube::client::ClientBuilder;
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Api, Client, Config};
use thiserror::Error;
use tower::limit::RateLimitLayer;

/// Sustained request rate against the cluster API, per second.
const DEFAULT_QPS: u64 = 40;
/// Burst ceiling for the cluster API rate limiter.
const DEFAULT_BURST: u64 = 80;

/// Errors resolving cluster credentials.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error(transparent)]
    Client(#[from] kube::Error),
}

/// A connected cluster plus the namespace a session operates in.
#[derive(Clone)]
pub struct Cluster {
    client: Client,
    namespace: String,
}

impl Cluster {
    /// Resolve credentials and namespace, and build a rate-limited client.
    pub async fn connect(namespace: Option<String>) -> Result<Self, ClientError> {
        let kubeconfig = Kubeconfig::read()?;
        let namespace = namespace
            .or_else(|| current_context_namespace(&kubeconfig))
            .unwrap_or_else(|| "default".to_string());

        let config =
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        // DEFAULT_BURST permits per 2 s window: DEFAULT_QPS average with a
        // burst ceiling of DEFAULT_BURST.
        let client = ClientBuilder::try_from(config)?
            .with_layer(&RateLimitLayer::new(
                DEFAULT_BURST,
                Duration::from_secs(DEFAULT_BURST / DEFAULT_QPS),
            ))
            .build();

        Ok(Self { client, namespace })
    }

    /// Pod API scoped to the session namespace.
    pub fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

fn current_context_namespace(kubeconfig: &Kubeconfig) -> Option<String> {
    let current = kubeconfig.current_context.as_deref()?;
    kubeconfig
        .contexts
        .iter()
        .find(|named| named.name == current)?
        .context
        .as_ref()?
        .namespace
        .clone()
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
