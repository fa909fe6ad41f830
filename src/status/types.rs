use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::WorkloadSpec;

/// State of one container, serialized in the Kubernetes `ContainerState` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerState {
    Waiting {},
    Running {
        #[serde(rename = "startedAt")]
        started_at: Option<DateTime<Utc>>,
    },
    Terminated {
        #[serde(rename = "startedAt")]
        started_at: Option<DateTime<Utc>>,
        #[serde(rename = "finishedAt")]
        finished_at: Option<DateTime<Utc>>,
        #[serde(rename = "exitCode")]
        exit_code: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    pub state: ContainerState,
    pub ready: bool,
}

impl ContainerStatus {
    pub fn waiting(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ContainerState::Waiting {},
            ready: false,
        }
    }

    pub fn running(name: impl Into<String>, started_at: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            state: ContainerState::Running { started_at },
            ready: true,
        }
    }

    pub fn terminated(
        name: impl Into<String>,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
        exit_code: i32,
    ) -> Self {
        Self {
            name: name.into(),
            state: ContainerState::Terminated {
                started_at,
                finished_at,
                exit_code,
            },
            ready: false,
        }
    }
}

/// Status of one workload, rebuilt on every reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatusSnapshot {
    pub name: String,
    #[serde(rename = "UID")]
    pub uid: String,
    pub namespace: String,
    pub containers: Vec<ContainerStatus>,
}

impl PodStatusSnapshot {
    pub fn for_workload(workload: &WorkloadSpec, containers: Vec<ContainerStatus>) -> Self {
        Self {
            name: workload.name.clone(),
            uid: workload.id.uid.clone(),
            namespace: workload.id.namespace.clone(),
            containers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn waiting_serializes_as_empty_object() {
        let status = ContainerStatus::waiting("app");
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"name": "app", "state": {"waiting": {}}, "ready": false})
        );
    }

    #[test]
    fn terminated_uses_kubernetes_field_names() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let status = ContainerStatus::terminated("app", Some(start), Some(end), 2);

        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "name": "app",
                "state": {"terminated": {
                    "startedAt": "2024-06-01T12:00:00Z",
                    "finishedAt": "2024-06-01T12:30:00Z",
                    "exitCode": 2
                }},
                "ready": false
            })
        );
    }

    #[test]
    fn snapshot_fields() {
        let workload = WorkloadSpec::new("web", "prod", "u-1", vec!["app".into()]);
        let snap = PodStatusSnapshot::for_workload(&workload, vec![ContainerStatus::running("app", None)]);
        let value = serde_json::to_value(&snap).unwrap();

        assert_eq!(value["name"], "web");
        assert_eq!(value["UID"], "u-1");
        assert_eq!(value["namespace"], "prod");
        assert_eq!(value["containers"][0]["ready"], true);
        assert_eq!(value["containers"][0]["state"]["running"]["startedAt"], serde_json::Value::Null);
    }
}
