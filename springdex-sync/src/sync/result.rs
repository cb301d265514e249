//! Result types for sync phases
//!
//! Every per-record operation reports an explicit outcome; phases
//! collect outcomes into immutable [`PhaseResult`] values that the
//! orchestrator merges. Degrade-don't-abort is a return-value contract
//! here, not suppressed exceptions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What happened to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Updated,
    Skipped,
    Error,
}

/// Mutable counters accumulated while a phase runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl PhaseStats {
    pub fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Created => self.created += 1,
            RecordOutcome::Updated => self.updated += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Error => self.errors += 1,
        }
    }

    pub fn merge(&mut self, other: PhaseStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.errors
    }
}

/// Immutable result of one completed phase
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    pub phase: String,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl PhaseResult {
    /// A successful phase carrying its accumulated stats
    pub fn completed(phase: impl Into<String>, started_at: DateTime<Utc>, stats: PhaseStats) -> Self {
        Self {
            phase: phase.into(),
            created: stats.created,
            updated: stats.updated,
            skipped: stats.skipped,
            errors: stats.errors,
            success: true,
            message: None,
            started_at,
            completed_at: Utc::now(),
        }
    }

    /// A phase that failed as a whole (fetch failure, escaped error)
    pub fn failed(
        phase: impl Into<String>,
        started_at: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase: phase.into(),
            created: 0,
            updated: 0,
            skipped: 0,
            errors: 1,
            success: false,
            message: Some(message.into()),
            started_at,
            completed_at: Utc::now(),
        }
    }

    pub fn stats(&self) -> PhaseStats {
        PhaseStats {
            created: self.created,
            updated: self.updated,
            skipped: self.skipped,
            errors: self.errors,
        }
    }
}

/// Aggregate result of a full orchestrated run
#[derive(Debug, Clone, Serialize)]
pub struct ComprehensiveSyncResult {
    pub run_id: Uuid,
    pub phases: Vec<PhaseResult>,
    /// AND of all phase successes
    pub success: bool,
    pub cancelled: bool,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ComprehensiveSyncResult {
    /// Aggregate phase results; success is the logical AND of every
    /// phase's success flag
    pub fn from_phases(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        phases: Vec<PhaseResult>,
        cancelled: bool,
    ) -> Self {
        let mut totals = PhaseStats::default();
        for phase in &phases {
            totals.merge(phase.stats());
        }

        let success = !cancelled && phases.iter().all(|p| p.success);

        Self {
            run_id,
            success,
            cancelled,
            created: totals.created,
            updated: totals.updated,
            skipped: totals.skipped,
            errors: totals.errors,
            started_at,
            completed_at: Utc::now(),
            phases,
        }
    }

    pub fn duration_seconds(&self) -> u64 {
        self.completed_at
            .signed_duration_since(self.started_at)
            .num_seconds()
            .max(0) as u64
    }
}
