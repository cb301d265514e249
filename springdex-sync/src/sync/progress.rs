//! Progress reporting for sync runs
//!
//! Thin wrapper over the shared [`EventBus`]: lossy emission, zero
//! subscribers is fine, and a slow observer can never stall the sync.

use super::result::{ComprehensiveSyncResult, PhaseResult};
use chrono::Utc;
use springdex_common::events::{EventBus, SyncEvent};
use uuid::Uuid;

pub struct ProgressReporter {
    events: EventBus,
    run_id: Uuid,
    total_phases: usize,
}

impl ProgressReporter {
    pub fn new(events: EventBus, run_id: Uuid, total_phases: usize) -> Self {
        Self {
            events,
            run_id,
            total_phases,
        }
    }

    pub fn sync_started(&self) {
        self.events.emit_lossy(SyncEvent::SyncStarted {
            run_id: self.run_id,
            total_phases: self.total_phases,
            timestamp: Utc::now(),
        });
    }

    pub fn phase_started(&self, phase_index: usize, description: &str) {
        self.events.emit_lossy(SyncEvent::PhaseStarted {
            run_id: self.run_id,
            phase_index,
            total_phases: self.total_phases,
            description: description.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn phase_completed(&self, phase_index: usize, description: &str, result: &PhaseResult) {
        let percent = ((phase_index + 1) as f64 / self.total_phases as f64) * 100.0;

        self.events.emit_lossy(SyncEvent::PhaseCompleted {
            run_id: self.run_id,
            phase_index,
            total_phases: self.total_phases,
            description: description.to_string(),
            success: result.success,
            created: result.created,
            updated: result.updated,
            skipped: result.skipped,
            errors: result.errors,
            percent,
            message: result.message.clone(),
            timestamp: Utc::now(),
        });
    }

    pub fn sync_completed(&self, result: &ComprehensiveSyncResult) {
        self.events.emit_lossy(SyncEvent::SyncCompleted {
            run_id: self.run_id,
            success: result.success,
            created: result.created,
            updated: result.updated,
            skipped: result.skipped,
            errors: result.errors,
            duration_seconds: result.duration_seconds(),
            timestamp: Utc::now(),
        });
    }

    pub fn sync_cancelled(&self, phases_completed: usize) {
        self.events.emit_lossy(SyncEvent::SyncCancelled {
            run_id: self.run_id,
            phases_completed,
            timestamp: Utc::now(),
        });
    }

    pub fn sync_failed(&self, message: &str) {
        self.events.emit_lossy(SyncEvent::SyncFailed {
            run_id: self.run_id,
            message: message.to_string(),
            timestamp: Utc::now(),
        });
    }
}
