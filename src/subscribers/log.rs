//! Built-in subscriber that writes run progress to stdout.
//!
//! Enabled via the `logging` feature. Demo/reference only; real deployments
//! will usually plug their own [`Subscribe`] implementation.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Prints one line per event, in the spirit of the classic console trace.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerStarted => {
                if let Some(w) = e.worker {
                    println!("[started] {w} begins its task");
                }
            }
            EventKind::PhaseStarted => {
                if let (Some(w), Some(phase)) = (e.worker, e.phase) {
                    println!("[phase] {w} starting phase {phase}");
                }
            }
            EventKind::IssueHit => {
                if let (Some(w), Some(issues)) = (e.worker, e.issues) {
                    println!("[issue] {w} hit an issue ({issues} so far)");
                }
            }
            EventKind::PhaseCompleted => {
                if let (Some(w), Some(phase)) = (e.worker, e.phase) {
                    println!("[phase] {w} finished phase {phase}, awaiting acknowledgment");
                }
            }
            EventKind::AckSent => {
                if let Some(w) = e.worker {
                    println!("[ack] supervisor accepted {w}'s phase");
                }
            }
            EventKind::AckUndeliverable => {
                println!("[ack] undeliverable: worker={:?} reason={:?}", e.worker, e.reason);
            }
            EventKind::WorkerFinished => {
                if let (Some(w), Some(issues)) = (e.worker, e.issues) {
                    println!("[finished] {w} completed the task with {issues} issues");
                }
            }
            EventKind::WorkerCrashed => {
                println!("[crashed] worker={:?} reason={:?}", e.worker, e.reason);
            }
            EventKind::QueueOverflow => {
                println!("[fatal] pending-event mailbox overflowed ({:?})", e.reason);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown] signal received, cancelling workers");
            }
            EventKind::AllDone => {
                println!("[done] all workers reaped (total issues: {:?})", e.issues);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
