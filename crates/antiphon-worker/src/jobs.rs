//! Tracking and lifecycle management for dispatched assistant jobs.

use antiphon_agent::{RealtimeSession, VoiceAssistant};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Lifecycle state of a dispatched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// The assistant is starting up or serving a conversation.
    Running,
    /// The session ended on its own.
    Completed,
    /// Startup failed before the session went live.
    Failed,
    /// The job was cancelled through the API.
    Cancelled,
}

/// Externally visible record of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Unique job identifier.
    pub id: Uuid,
    /// Room the assistant was dispatched to.
    pub room_name: String,
    /// Current lifecycle state.
    pub state: JobState,
    /// Failure message, present only for failed jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was dispatched.
    pub started_at: DateTime<Utc>,
}

/// A tracked job: its record plus the handles needed to tear it down.
struct JobEntry {
    record: JobRecord,
    task: Option<JoinHandle<()>>,
    session: Option<Arc<dyn RealtimeSession>>,
}

/// Tracks dispatched jobs and owns their teardown.
#[derive(Clone, Default)]
pub struct JobManager {
    /// Tracked jobs: job id -> entry.
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
}

impl JobManager {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Starts an assistant job for a room and returns its id.
    ///
    /// The job is tracked before the task is spawned, so the id is
    /// immediately visible to `get` and `cancel`.
    pub async fn dispatch(&self, assistant: Arc<VoiceAssistant>, room_name: String) -> Uuid {
        let id = Uuid::new_v4();
        let record = JobRecord {
            id,
            room_name: room_name.clone(),
            state: JobState::Running,
            error: None,
            started_at: Utc::now(),
        };

        {
            let mut jobs = self.jobs.write().await;
            jobs.insert(
                id,
                JobEntry {
                    record,
                    task: None,
                    session: None,
                },
            );
        }

        let manager = self.clone();
        let handle = tokio::spawn(async move {
            match assistant.run(&room_name).await {
                Ok(session) => {
                    let session: Arc<dyn RealtimeSession> = Arc::from(session);
                    manager.attach_session(id, Arc::clone(&session)).await;
                    session.wait_closed().await;
                    manager.finish(id, None).await;
                }
                Err(e) => {
                    tracing::error!(job = %id, room = %room_name, "assistant job failed: {}", e);
                    manager.finish(id, Some(e.to_string())).await;
                }
            }
        });

        // A cancel may have landed between the insert and here; if so the
        // task must not keep running untracked.
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(entry) if entry.record.state == JobState::Running => {
                entry.task = Some(handle);
            }
            _ => handle.abort(),
        }

        id
    }

    /// Records the live session handle for a running job.
    ///
    /// If the job was cancelled while the session was starting, the session
    /// is closed instead of stored.
    async fn attach_session(&self, id: Uuid, session: Arc<dyn RealtimeSession>) {
        let cancelled = {
            let mut jobs = self.jobs.write().await;
            match jobs.get_mut(&id) {
                Some(entry) if entry.record.state == JobState::Running => {
                    entry.session = Some(session.clone());
                    false
                }
                _ => true,
            }
        };

        if cancelled {
            session.close().await;
        }
    }

    /// Marks a running job as completed, or failed when an error is given.
    /// Jobs in any other state are left untouched.
    async fn finish(&self, id: Uuid, error: Option<String>) {
        let mut jobs = self.jobs.write().await;
        if let Some(entry) = jobs.get_mut(&id) {
            if entry.record.state != JobState::Running {
                return;
            }
            entry.record.state = match error {
                Some(message) => {
                    entry.record.error = Some(message);
                    JobState::Failed
                }
                None => JobState::Completed,
            };
            entry.session = None;
            entry.task = None;
        }
    }

    /// Cancels a running job: closes its session and stops its task.
    ///
    /// Returns `false` if the job does not exist or is no longer running.
    pub async fn cancel(&self, id: Uuid) -> bool {
        let (task, session) = {
            let mut jobs = self.jobs.write().await;
            match jobs.get_mut(&id) {
                Some(entry) if entry.record.state == JobState::Running => {
                    entry.record.state = JobState::Cancelled;
                    (entry.task.take(), entry.session.take())
                }
                _ => return false,
            }
        };

        if let Some(session) = session {
            session.close().await;
        }
        if let Some(task) = task {
            task.abort();
        }

        tracing::info!(job = %id, "job cancelled");
        true
    }

    /// Returns the record for a job, if it exists.
    pub async fn get(&self, id: Uuid) -> Option<JobRecord> {
        let jobs = self.jobs.read().await;
        jobs.get(&id).map(|entry| entry.record.clone())
    }

    /// Returns all job records, oldest first.
    pub async fn list(&self) -> Vec<JobRecord> {
        let jobs = self.jobs.read().await;
        let mut records: Vec<JobRecord> =
            jobs.values().map(|entry| entry.record.clone()).collect();
        records.sort_by_key(|record| record.started_at);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_record_serializes_without_an_error_field() {
        let record = JobRecord {
            id: Uuid::nil(),
            room_name: "demo-room".to_string(),
            state: JobState::Running,
            error: None,
            started_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).expect("serialization should not fail");
        assert_eq!(json["roomName"], "demo-room");
        assert_eq!(json["state"], "running");
        assert!(json.get("error").is_none());
        assert!(json.get("startedAt").is_some());
    }

    #[test]
    fn failed_record_carries_its_error() {
        let record = JobRecord {
            id: Uuid::nil(),
            room_name: "demo-room".to_string(),
            state: JobState::Failed,
            error: Some("Room service error: boom".to_string()),
            started_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).expect("serialization should not fail");
        assert_eq!(json["state"], "failed");
        assert_eq!(json["error"], "Room service error: boom");
    }
}
