use std::collections::HashMap;

use crate::scheduler::job::{JobRecord, WorkloadId};

/// In-memory map from workload identity to its scheduler job.
///
/// Shared as `Arc<RwLock<JobRegistry>>`. Entries are added by the submission
/// path and are never removed here.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: HashMap<WorkloadId, JobRecord>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the scheduler job for a workload. Returns false if the
    /// workload already has one; the existing record is kept.
    pub fn register(&mut self, id: WorkloadId, job_id: impl Into<String>) -> bool {
        if self.jobs.contains_key(&id) {
            return false;
        }
        self.jobs.insert(id, JobRecord::new(job_id));
        true
    }

    pub fn get(&self, id: &WorkloadId) -> Option<&JobRecord> {
        self.jobs.get(id)
    }

    pub fn get_mut(&mut self, id: &WorkloadId) -> Option<&mut JobRecord> {
        self.jobs.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn register_and_lookup() {
        let mut registry = JobRegistry::new();
        let id = WorkloadId::new("default", "abc");

        assert!(registry.is_empty());
        assert!(registry.register(id.clone(), "1001"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id).unwrap().job_id, "1001");
        assert!(registry.get(&WorkloadId::new("other", "abc")).is_none());
    }

    #[test]
    fn register_keeps_existing_record() {
        let mut registry = JobRegistry::new();
        let id = WorkloadId::new("default", "abc");
        registry.register(id.clone(), "1001");
        registry.get_mut(&id).unwrap().mark_started(Utc::now());

        assert!(!registry.register(id.clone(), "2002"));
        let rec = registry.get(&id).unwrap();
        assert_eq!(rec.job_id, "1001");
        assert!(rec.start_time.is_some());
    }
}
