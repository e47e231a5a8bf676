use crate::error::{OrchestratorError, Result};
use crate::job::StageId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Checkpoint data (placeholder for now, will be populated with actual stage data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: Uuid,
    pub job_id: Uuid,
    pub stage: StageId,
    pub cache_key: String,
    pub cache_data: Vec<u8>, // Serialized stage output (bincode)
}

impl Checkpoint {
    pub fn new(job_id: Uuid, stage: StageId, cache_key: String, cache_data: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            stage,
            cache_key,
            cache_data,
        }
    }
}

/// In-memory checkpoint manager, scoped to a single coordinator run.
pub struct CheckpointManager {
    checkpoints: std::sync::Arc<parking_lot::Mutex<Vec<Checkpoint>>>,
}

impl CheckpointManager {
    pub fn new_in_memory() -> Self {
        Self {
            checkpoints: std::sync::Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    /// Save checkpoint
    pub async fn save_checkpoint(&self, checkpoint: Checkpoint) -> Result<()> {
        let mut checkpoints = self.checkpoints.lock();

        // Remove existing checkpoint for same job+stage
        checkpoints.retain(|cp| !(cp.job_id == checkpoint.job_id && cp.stage == checkpoint.stage));

        checkpoints.push(checkpoint);
        Ok(())
    }

    /// Load checkpoint by cache key
    pub async fn load_checkpoint(&self, cache_key: &str) -> Result<Option<Vec<u8>>> {
        let checkpoints = self.checkpoints.lock();

        Ok(checkpoints
            .iter()
            .find(|cp| cp.cache_key == cache_key)
            .map(|cp| cp.cache_data.clone()))
    }

    /// Get completed stages for a job
    pub async fn completed_stages(&self, job_id: Uuid) -> Result<HashSet<StageId>> {
        let checkpoints = self.checkpoints.lock();

        Ok(checkpoints
            .iter()
            .filter(|cp| cp.job_id == job_id)
            .map(|cp| cp.stage)
            .collect())
    }

    /// Delete checkpoints for a job (cleanup after completion)
    pub async fn delete_job_checkpoints(&self, job_id: Uuid) -> Result<()> {
        let mut checkpoints = self.checkpoints.lock();
        checkpoints.retain(|cp| cp.job_id != job_id);
        Ok(())
    }
}
