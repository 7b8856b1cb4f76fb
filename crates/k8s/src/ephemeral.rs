// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral sniffer injection and the best-effort status watcher.
//!
//! Sniffers are appended to live pods via the ephemeral-containers
//! subresource; they are never removed — an ephemeral container cannot be
//! deleted from a running pod, so it exits when the collector closes its
//! stream and is garbage-collected with the pod.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future;
use k8s_openapi::api::core::v1::{Capabilities, EphemeralContainer, Pod, SecurityContext};
use kube::api::{ListParams, PostParams};
use kube::Api;

use kpture_core::{sniffer_container_name, AgentOptions};

use crate::collector::ProvisionError;

/// Image for the injected sniffer containers.
pub const AGENT_IMAGE: &str = "ghcr.io/kpture/agent:latest";

/// Ephemeral containers do not support probes and the kubelet is slow to
/// reflect their state; the watcher polls at this cadence instead.
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

const AGENT_RUN_AS_USER: i64 = 1000;

/// Pod access needed to inject sniffers and watch them come up.
#[async_trait]
pub trait EphemeralContainerUpdater {
    async fn get_pod(&self, name: &str) -> Result<Pod, kube::Error>;
    async fn update_ephemeral_containers(&self, name: &str, pod: &Pod) -> Result<Pod, kube::Error>;
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error>;
}

#[async_trait]
impl EphemeralContainerUpdater for Api<Pod> {
    async fn get_pod(&self, name: &str) -> Result<Pod, kube::Error> {
        self.get(name).await
    }

    async fn update_ephemeral_containers(&self, name: &str, pod: &Pod) -> Result<Pod, kube::Error> {
        self.replace_ephemeral_containers(name, &PostParams::default(), pod)
            .await
    }

    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        Ok(self.list(&ListParams::default()).await?.items)
    }
}

/// Inject a sniffer into every target pod, concurrently.
///
/// The barrier is API-call completion, not container start (the watcher
/// covers that). Every failure is logged; the first is returned.
pub async fn inject_agents<U>(pods: &[Pod], api: &U, opts: &AgentOptions) -> Result<(), ProvisionError>
where
    U: EphemeralContainerUpdater + Sync + ?Sized,
{
    let results = future::join_all(pods.iter().map(|pod| inject_one(pod, api, opts))).await;

    let mut first = None;
    for err in results.into_iter().filter_map(Result::err) {
        tracing::error!(error = %err, "sniffer injection failed");
        first.get_or_insert(err);
    }
    match first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn inject_one<U>(pod: &Pod, api: &U, opts: &AgentOptions) -> Result<(), ProvisionError>
where
    U: EphemeralContainerUpdater + Sync + ?Sized,
{
    let name = pod.metadata.name.as_deref().unwrap_or_default();
    // Re-fetch so the update carries the latest resourceVersion; a stale
    // pod object gets a conflict error back.
    let fresh = api.get_pod(name).await?;
    let updated = with_sniffer(&fresh, opts)?;
    api.update_ephemeral_containers(name, &updated).await?;
    Ok(())
}

fn with_sniffer(pod: &Pod, opts: &AgentOptions) -> Result<Pod, ProvisionError> {
    let pod_name = pod.metadata.name.clone().unwrap_or_default();
    let target_ip = opts
        .target_ip
        .as_deref()
        .ok_or(ProvisionError::MissingCollectorAddress)?;
    let target_container = pod
        .spec
        .as_ref()
        .and_then(|spec| spec.containers.first())
        .ok_or_else(|| ProvisionError::NoTargetContainer(pod_name.clone()))?
        .name
        .clone();

    let sniffer = EphemeralContainer {
        name: sniffer_container_name(&opts.session_id),
        image: Some(AGENT_IMAGE.to_string()),
        image_pull_policy: Some("IfNotPresent".to_string()),
        args: Some(vec![
            "agent".to_string(),
            "-d".to_string(),
            opts.device.clone(),
            "-t".to_string(),
            target_ip.to_string(),
            "-l".to_string(),
            opts.snaplen.to_string(),
            "-p".to_string(),
            opts.target_port.to_string(),
            "-f".to_string(),
            opts.filter.clone(),
        ]),
        security_context: Some(SecurityContext {
            run_as_user: Some(AGENT_RUN_AS_USER),
            run_as_non_root: Some(true),
            privileged: Some(false),
            allow_privilege_escalation: Some(false),
            // Raw-socket capture without root.
            capabilities: Some(Capabilities {
                add: Some(vec!["NET_ADMIN".to_string(), "NET_RAW".to_string()]),
                ..Capabilities::default()
            }),
            ..SecurityContext::default()
        }),
        target_container_name: Some(target_container),
        ..EphemeralContainer::default()
    };

    let mut updated = pod.clone();
    if let Some(spec) = updated.spec.as_mut() {
        spec.ephemeral_containers
            .get_or_insert_with(Vec::new)
            .push(sniffer);
    }
    Ok(updated)
}

/// Poll the pod list until every target shows its sniffer Running.
///
/// Best-effort: streaming does not wait on this. A sniffer that lands in
/// Terminated gets its termination message logged and ends the watch.
pub async fn watch_agents<U>(api: U, targets: Vec<String>, session_id: String)
where
    U: EphemeralContainerUpdater + Send + Sync,
{
    let container = sniffer_container_name(&session_id);
    loop {
        let pods = match api.list_pods().await {
            Ok(pods) => pods,
            Err(err) => {
                tracing::warn!(error = %err, "sniffer watcher could not list pods");
                return;
            }
        };

        let mut running = 0usize;
        for pod in pods.iter().filter(|pod| {
            pod.metadata
                .name
                .as_deref()
                .is_some_and(|name| targets.iter().any(|target| target == name))
        }) {
            match sniffer_state(pod, &container) {
                SnifferState::Running => running += 1,
                SnifferState::Terminated(message) => {
                    tracing::warn!(
                        pod = pod.metadata.name.as_deref().unwrap_or_default(),
                        %message,
                        "sniffer terminated"
                    );
                    return;
                }
                SnifferState::Pending => {}
            }
        }

        if running == targets.len() {
            tracing::info!(count = running, "all sniffers running");
            return;
        }
        tokio::time::sleep(WATCH_INTERVAL).await;
    }
}

enum SnifferState {
    Pending,
    Running,
    Terminated(String),
}

fn sniffer_state(pod: &Pod, container: &str) -> SnifferState {
    let statuses = pod
        .status
        .as_ref()
        .and_then(|status| status.ephemeral_container_statuses.as_ref());
    if let Some(statuses) = statuses {
        for status in statuses.iter().filter(|status| status.name == container) {
            if let Some(state) = status.state.as_ref() {
                if state.running.is_some() {
                    return SnifferState::Running;
                }
                if let Some(terminated) = state.terminated.as_ref() {
                    return SnifferState::Terminated(terminated.message.clone().unwrap_or_default());
                }
            }
        }
    }
    SnifferState::Pending
}

#[cfg(test)]
#[path = "ephemeral_tests.rs"]
mod ephemeral_tests;
