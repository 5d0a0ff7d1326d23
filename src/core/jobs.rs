//! Job bookkeeping
//!
//! Tracks the jobs a caller has in progress and how many have finished. It
//! knows nothing about dispatch; callers decide what a job is and when it is
//! done.

use crate::utils::error::{BatchError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use uuid::Uuid;

/// Limits applied by a [`JobHolder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHolderConfig {
    /// Maximum number of active jobs, 0 for no limit
    pub max_active: usize,
}

/// Counter snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub active: u64,
    pub completed: u64,
}

/// Registry of active jobs by id with active/completed counters
pub struct JobHolder<J> {
    jobs: DashMap<String, J>,
    active: AtomicU64,
    completed: AtomicU64,
    config: RwLock<JobHolderConfig>,
}

impl<J> Default for JobHolder<J> {
    fn default() -> Self {
        Self::new(JobHolderConfig::default())
    }
}

impl<J> JobHolder<J> {
    pub fn new(config: JobHolderConfig) -> Self {
        Self {
            jobs: DashMap::new(),
            active: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            config: RwLock::new(config),
        }
    }

    pub fn configure(&self, config: JobHolderConfig) {
        debug!(max_active = config.max_active, "Configuring job holder");
        *self.config.write() = config;
    }

    pub fn config(&self) -> JobHolderConfig {
        *self.config.read()
    }

    /// Store `job` under `id`.
    ///
    /// Replacing a job that is already registered does not change the counters.
    pub fn add_job(&self, id: impl Into<String>, job: J) -> Result<()> {
        let max_active = self.config.read().max_active;

        match self.jobs.entry(id.into()) {
            Entry::Occupied(mut entry) => {
                debug!(id = %entry.key(), "Replacing active job");
                entry.insert(job);
            }
            Entry::Vacant(entry) => {
                if max_active > 0 && self.active.load(Ordering::Acquire) >= max_active as u64 {
                    warn!(id = %entry.key(), max_active, "Rejecting job, too many active jobs");
                    return Err(BatchError::config(format!(
                        "too many active jobs (max {})",
                        max_active
                    )));
                }
                entry.insert(job);
                self.active.fetch_add(1, Ordering::AcqRel);
            }
        }
        Ok(())
    }

    /// Store `job` under a fresh id and return the id
    pub fn register(&self, job: J) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.add_job(id.clone(), job)?;
        Ok(id)
    }

    /// Remove a finished job and count it as completed
    pub fn clean(&self, id: &str) -> Option<J> {
        let (_, job) = self.jobs.remove(id)?;
        self.active.fetch_sub(1, Ordering::AcqRel);
        self.completed.fetch_add(1, Ordering::AcqRel);
        Some(job)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }

    pub fn active_jobs(&self) -> u64 {
        self.active.load(Ordering::Acquire)
    }

    pub fn completed_jobs(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> JobStats {
        JobStats {
            active: self.active_jobs(),
            completed: self.completed_jobs(),
        }
    }
}

impl<J: Clone> JobHolder<J> {
    pub fn get_job(&self, id: &str) -> Option<J> {
        self.jobs.get(id).map(|entry| entry.value().clone())
    }
}
