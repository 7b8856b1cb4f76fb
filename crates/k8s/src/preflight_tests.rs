// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use k8s_openapi::api::core::v1::PodStatus;
use kube::api::ObjectMeta;
use kube::core::ErrorResponse;

fn api_error() -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: "boom".to_string(),
        reason: "InternalError".to_string(),
        code: 500,
    })
}

struct FakeVersion {
    major: &'static str,
    minor: &'static str,
    fail: bool,
}

#[async_trait]
impl VersionGetter for FakeVersion {
    async fn server_version(&self) -> Result<Info, kube::Error> {
        if self.fail {
            return Err(api_error());
        }
        Ok(Info {
            major: self.major.to_string(),
            minor: self.minor.to_string(),
            ..Info::default()
        })
    }
}

struct FakeLister {
    pods: Vec<Pod>,
    fail: bool,
}

#[async_trait]
impl PodLister for FakeLister {
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        if self.fail {
            return Err(api_error());
        }
        Ok(self.pods.clone())
    }
}

fn pod(name: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..ObjectMeta::default()
        },
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..PodStatus::default()
        }),
        ..Pod::default()
    }
}

#[tokio::test]
async fn version_1_21_is_rejected_with_exact_message() {
    let err = check_ephemeral_support(&FakeVersion { major: "1", minor: "21", fail: false })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Ephemeral containers are not supported");
}

#[tokio::test]
async fn version_1_22_is_accepted() {
    check_ephemeral_support(&FakeVersion { major: "1", minor: "22", fail: false })
        .await
        .unwrap();
}

#[tokio::test]
async fn major_below_one_is_rejected() {
    let err = check_ephemeral_support(&FakeVersion { major: "0", minor: "30", fail: false })
        .await
        .unwrap_err();
    assert!(matches!(err, PreflightError::EphemeralUnsupported));
}

#[tokio::test]
async fn unparseable_version_is_rejected() {
    let err = check_ephemeral_support(&FakeVersion { major: "azr", minor: "23", fail: false })
        .await
        .unwrap_err();
    assert!(matches!(err, PreflightError::Version(..)));

    let err = check_ephemeral_support(&FakeVersion { major: "1", minor: "qsd", fail: false })
        .await
        .unwrap_err();
    assert!(matches!(err, PreflightError::Version(..)));
}

#[tokio::test]
async fn version_api_error_propagates() {
    let err = check_ephemeral_support(&FakeVersion { major: "1", minor: "22", fail: true })
        .await
        .unwrap_err();
    assert!(matches!(err, PreflightError::Api(_)));
}

#[tokio::test]
async fn select_by_name_keeps_list_order() {
    let lister = FakeLister {
        pods: vec![pod("a", "Running"), pod("b", "Running"), pod("c", "Running")],
        fail: false,
    };
    let names = vec!["c".to_string(), "a".to_string()];

    let selected = select_pods(&names, false, &lister).await.unwrap();
    let selected: Vec<_> = selected
        .iter()
        .map(|p| p.metadata.name.as_deref().unwrap())
        .collect();
    assert_eq!(selected, ["a", "c"]);

    // Re-running against the same cluster state yields the same set in the
    // same order.
    let again = select_pods(&names, false, &lister).await.unwrap();
    let again: Vec<_> = again
        .iter()
        .map(|p| p.metadata.name.as_deref().unwrap())
        .collect();
    assert_eq!(selected, again);
}

#[tokio::test]
async fn select_all_returns_everything() {
    let lister = FakeLister {
        pods: vec![pod("a", "Running"), pod("b", "Running")],
        fail: false,
    };
    let selected = select_pods(&[], true, &lister).await.unwrap();
    assert_eq!(selected.len(), 2);
}

#[tokio::test]
async fn empty_selection_is_an_error() {
    let lister = FakeLister { pods: vec![], fail: false };
    let err = select_pods(&[], true, &lister).await.unwrap_err();
    assert!(matches!(err, PreflightError::NoTargets));

    let lister = FakeLister { pods: vec![pod("a", "Running")], fail: false };
    let err = select_pods(&["nope".to_string()], false, &lister).await.unwrap_err();
    assert!(matches!(err, PreflightError::NoTargets));
}

#[tokio::test]
async fn list_error_propagates() {
    let lister = FakeLister { pods: vec![], fail: true };
    let err = select_pods(&[], true, &lister).await.unwrap_err();
    assert!(matches!(err, PreflightError::Api(_)));
}

#[test]
fn ensure_running_rejects_pending_pods() {
    ensure_running(&[pod("a", "Running")]).unwrap();

    let err = ensure_running(&[pod("a", "Running"), pod("b", "Pending")]).unwrap_err();
    assert_eq!(err.to_string(), "pod b is not in running state");
}
