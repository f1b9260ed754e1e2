use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crates::{
    domain::{
        repositories::{
            sessions::SessionRepository, users::UserRepository, zoom_tokens::ZoomTokenRepository,
        },
        value_objects::{
            enums::{meeting_types::MeetingType, session_sources::SessionSource},
            sessions::NewSession,
        },
    },
    zoom::{
        payloads::{MeetingInfo, MeetingOccurrence},
        zoom_client::ZoomApiError,
    },
};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::MeetingGateway,
    retry::{RetryPolicy, retry_async},
    sessions::SessionUseCase,
    zoom_tokens::ZoomTokenUseCase,
};

pub const WEBHOOK_SESSION_CAPACITY: i32 = 100;
pub const WEBHOOK_SESSION_COST: i64 = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub created: usize,
    pub errors: Vec<String>,
}

impl ReconcileReport {
    fn merge(&mut self, other: ReconcileReport) {
        self.created += other.created;
        self.errors.extend(other.errors);
    }
}

/// One async lock per (owner, zoom meeting id). Entries nobody holds are
/// dropped on the next acquire.
#[derive(Default)]
pub struct MeetingLocks {
    locks: Mutex<HashMap<(i64, i64), Arc<tokio::sync::Mutex<()>>>>,
}

impl MeetingLocks {
    pub async fn acquire(&self, user_id: i64, meeting_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry((user_id, meeting_id)).or_default())
        };
        lock.lock_owned().await
    }
}

/// Keeps local sessions in line with what Zoom reports for a meeting.
pub struct SessionSyncUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    session_repo: Arc<S>,
    sessions: Arc<SessionUseCase<S, U, T, G>>,
    tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
    meeting_gateway: Arc<G>,
    fetch_retry: RetryPolicy,
    locks: MeetingLocks,
}

impl<S, U, T, G> SessionSyncUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        sessions: Arc<SessionUseCase<S, U, T, G>>,
        tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
        meeting_gateway: Arc<G>,
        fetch_retry: RetryPolicy,
    ) -> Self {
        Self {
            session_repo,
            sessions,
            tokens,
            meeting_gateway,
            fetch_retry,
            locks: MeetingLocks::default(),
        }
    }

    /// Only a failed type-change purge is returned as an error; everything
    /// else lands in the report.
    pub async fn reconcile(
        &self,
        user_id: i64,
        meeting: &MeetingInfo,
    ) -> UseCaseResult<ReconcileReport> {
        let _guard = self.locks.acquire(user_id, meeting.id).await;
        let meeting_type = MeetingType::from_zoom_code(meeting.meeting_type);

        let existing = self
            .session_repo
            .find_by_owner_and_meeting(user_id, meeting.id)
            .await
            .map_err(|err| {
                error!(user_id, zoom_meeting_id = meeting.id, db_error = ?err, "session_sync: lookup failed");
                UseCaseError::Internal(err)
            })?;

        if let Some(existing) = existing {
            if existing.zoom_meeting_type != meeting_type {
                let purged = self
                    .session_repo
                    .delete_by_owner_and_meeting(user_id, meeting.id)
                    .await
                    .map_err(|err| {
                        error!(
                            user_id,
                            zoom_meeting_id = meeting.id,
                            db_error = ?err,
                            "session_sync: type change purge failed"
                        );
                        UseCaseError::Internal(err)
                    })?;
                info!(
                    user_id,
                    zoom_meeting_id = meeting.id,
                    from = %existing.zoom_meeting_type,
                    to = %meeting_type,
                    purged,
                    "session_sync: meeting type changed, sessions purged"
                );
            }
        }

        let report = match meeting_type {
            MeetingType::Recurring => self.reconcile_recurring(user_id, meeting).await,
            MeetingType::Singular => self.reconcile_singular(user_id, meeting).await,
            MeetingType::None => {
                debug!(
                    user_id,
                    zoom_meeting_id = meeting.id,
                    zoom_type = meeting.meeting_type,
                    "session_sync: meeting type not mirrored"
                );
                ReconcileReport::default()
            }
        };

        info!(
            user_id,
            zoom_meeting_id = meeting.id,
            created = report.created,
            errors = report.errors.len(),
            "session_sync: meeting reconciled"
        );
        Ok(report)
    }

    async fn reconcile_recurring(&self, user_id: i64, meeting: &MeetingInfo) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if meeting.occurrences.is_empty() {
            report.errors.push(format!(
                "meeting {}: recurring meeting has no occurrences",
                meeting.id
            ));
        }

        let mut processed = Vec::with_capacity(meeting.occurrences.len());
        for occurrence in &meeting.occurrences {
            processed.push(occurrence.occurrence_id.clone());
            self.reconcile_occurrence(user_id, meeting, occurrence, &mut report)
                .await;
        }

        match self
            .session_repo
            .delete_by_owner_and_meeting_excluding_occurrences(user_id, meeting.id, processed)
            .await
        {
            Ok(0) => {}
            Ok(removed) => info!(
                user_id,
                zoom_meeting_id = meeting.id,
                removed,
                "session_sync: dropped occurrences no longer scheduled"
            ),
            Err(err) => warn!(
                user_id,
                zoom_meeting_id = meeting.id,
                db_error = ?err,
                "session_sync: occurrence cleanup failed"
            ),
        }

        report
    }

    async fn reconcile_occurrence(
        &self,
        user_id: i64,
        meeting: &MeetingInfo,
        occurrence: &MeetingOccurrence,
        report: &mut ReconcileReport,
    ) {
        let occurrence_id = occurrence.occurrence_id.as_str();
        let existing = match self
            .session_repo
            .find_by_owner_meeting_and_occurrence(user_id, meeting.id, occurrence_id)
            .await
        {
            Ok(existing) => existing,
            Err(err) => {
                report.errors.push(format!(
                    "meeting {} occurrence {occurrence_id}: lookup failed: {err}",
                    meeting.id
                ));
                return;
            }
        };

        if occurrence.is_deleted() {
            if let Some(existing) = existing {
                match self.session_repo.delete(existing.id).await {
                    Ok(()) => info!(
                        user_id,
                        zoom_meeting_id = meeting.id,
                        occurrence_id,
                        session_id = existing.id,
                        "session_sync: deleted occurrence removed"
                    ),
                    Err(err) => report.errors.push(format!(
                        "meeting {} occurrence {occurrence_id}: delete failed: {err}",
                        meeting.id
                    )),
                }
            }
            return;
        }

        let start_time = occurrence.start_time.timestamp();
        if let Some(existing) = existing {
            if existing.has_schedule(start_time, occurrence.duration, &meeting.topic) {
                debug!(
                    user_id,
                    zoom_meeting_id = meeting.id,
                    occurrence_id,
                    "session_sync: occurrence unchanged"
                );
                return;
            }
            if let Err(err) = self.session_repo.delete(existing.id).await {
                report.errors.push(format!(
                    "meeting {} occurrence {occurrence_id}: delete of stale session failed: {err}",
                    meeting.id
                ));
                return;
            }
        }

        let candidate = candidate_session(
            user_id,
            meeting,
            MeetingType::Recurring,
            start_time,
            occurrence.duration,
            Some(occurrence.occurrence_id.clone()),
        );
        match self.sessions.create_session(candidate, false).await {
            Ok(_) => report.created += 1,
            Err(err) => report.errors.push(format!(
                "meeting {} occurrence {occurrence_id}: {err}",
                meeting.id
            )),
        }
    }

    async fn reconcile_singular(&self, user_id: i64, meeting: &MeetingInfo) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let Some(start) = meeting.start_time else {
            report
                .errors
                .push(format!("meeting {}: no start time", meeting.id));
            return report;
        };
        let start_time = start.timestamp();

        let existing = match self
            .session_repo
            .find_by_owner_and_meeting(user_id, meeting.id)
            .await
        {
            Ok(existing) => existing,
            Err(err) => {
                report
                    .errors
                    .push(format!("meeting {}: lookup failed: {err}", meeting.id));
                return report;
            }
        };

        let candidate = candidate_session(
            user_id,
            meeting,
            MeetingType::Singular,
            start_time,
            meeting.duration,
            None,
        );

        let outcome = match existing {
            Some(existing) if existing.has_schedule(start_time, meeting.duration, &meeting.topic) => {
                debug!(user_id, zoom_meeting_id = meeting.id, "session_sync: meeting unchanged");
                return report;
            }
            Some(existing) => self.sessions.reschedule_mirrored(&existing, candidate).await,
            None => self.sessions.create_session(candidate, false).await,
        };
        match outcome {
            Ok(_) => report.created += 1,
            Err(err) => report.errors.push(format!("meeting {}: {err}", meeting.id)),
        }
        report
    }

    /// Fetches each meeting from Zoom and reconciles it. Meetings Zoom no
    /// longer knows are skipped.
    pub async fn sync_meeting_ids(
        &self,
        user_id: i64,
        meeting_ids: Vec<i64>,
    ) -> UseCaseResult<ReconcileReport> {
        let token = self.tokens.get_valid_token(user_id).await?;
        self.sync_with_token(user_id, &token.access_token, meeting_ids)
            .await
    }

    async fn sync_with_token(
        &self,
        user_id: i64,
        access_token: &str,
        meeting_ids: Vec<i64>,
    ) -> UseCaseResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let gateway = &self.meeting_gateway;

        for meeting_id in meeting_ids {
            let fetched = retry_async(
                self.fetch_retry,
                "session_sync: get meeting",
                |err: &ZoomApiError| err.is_retryable() && !err.is_not_found(),
                move || gateway.get_meeting(access_token, meeting_id),
            )
            .await;

            let meeting = match fetched {
                Ok(meeting) => meeting,
                Err(err) if err.is_not_found() => {
                    info!(user_id, zoom_meeting_id = meeting_id, "session_sync: meeting gone in zoom, skipped");
                    continue;
                }
                Err(err) => {
                    warn!(user_id, zoom_meeting_id = meeting_id, error = %err, "session_sync: meeting fetch failed");
                    report.errors.push(format!("meeting {meeting_id}: {err}"));
                    continue;
                }
            };

            match self.reconcile(user_id, &meeting).await {
                Ok(reconciled) => report.merge(reconciled),
                Err(err) => report.errors.push(format!("meeting {meeting_id}: {err}")),
            }
        }

        Ok(report)
    }

    /// Pages through the user's upcoming Zoom meetings and reconciles all of them.
    pub async fn sync_user_meetings(&self, user_id: i64) -> UseCaseResult<ReconcileReport> {
        let token = self.tokens.get_valid_token(user_id).await?;

        let mut meeting_ids = Vec::new();
        let mut page_number = 1;
        loop {
            let page = self
                .meeting_gateway
                .list_upcoming_meetings(&token.access_token, page_number)
                .await
                .map_err(|err| {
                    error!(user_id, page_number, error = %err, "session_sync: listing meetings failed");
                    UseCaseError::ExternalService(err.to_string())
                })?;
            meeting_ids.extend(page.meetings.iter().map(|meeting| meeting.id));
            if page.is_last() {
                break;
            }
            page_number += 1;
        }

        info!(user_id, meetings = meeting_ids.len(), "session_sync: upcoming meetings listed");
        self.sync_with_token(user_id, &token.access_token, meeting_ids)
            .await
    }

    /// Local removal for a `meeting.deleted` event; nothing is sent back to Zoom.
    pub async fn remove_meeting(
        &self,
        user_id: i64,
        meeting_id: i64,
        meeting_type: MeetingType,
        occurrence_ids: Vec<String>,
    ) -> UseCaseResult<usize> {
        let _guard = self.locks.acquire(user_id, meeting_id).await;

        let removed = match meeting_type {
            MeetingType::None => {
                debug!(user_id, zoom_meeting_id = meeting_id, "session_sync: deleted meeting type not mirrored");
                return Ok(0);
            }
            MeetingType::Recurring if !occurrence_ids.is_empty() => {
                let mut removed = 0;
                for occurrence_id in &occurrence_ids {
                    removed += self
                        .session_repo
                        .delete_by_owner_meeting_and_occurrence(user_id, meeting_id, occurrence_id)
                        .await
                        .map_err(UseCaseError::Internal)?;
                }
                removed
            }
            MeetingType::Recurring | MeetingType::Singular => self
                .session_repo
                .delete_by_owner_and_meeting(user_id, meeting_id)
                .await
                .map_err(UseCaseError::Internal)?,
        };

        info!(user_id, zoom_meeting_id = meeting_id, removed, "session_sync: meeting removed");
        Ok(removed)
    }
}

fn candidate_session(
    user_id: i64,
    meeting: &MeetingInfo,
    meeting_type: MeetingType,
    start_time: i64,
    duration: i64,
    occurrence_id: Option<String>,
) -> NewSession {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());

    NewSession {
        user_id,
        name: meeting.topic.clone(),
        description: meeting.description().to_string(),
        start_time,
        duration,
        max_session_size: WEBHOOK_SESSION_CAPACITY,
        cost: WEBHOOK_SESSION_COST,
        meeting_url: non_empty(&meeting.join_url),
        zoom_password: non_empty(&meeting.password),
        is_draft: Some(true),
        zoom_meeting_id: Some(meeting.id),
        zoom_meeting_join_url: non_empty(&meeting.join_url),
        zoom_meeting_start_url: non_empty(&meeting.start_url),
        zoom_occurrence_id: occurrence_id,
        zoom_meeting_type: meeting_type,
        zoom_sync_enabled: Some(true),
        source: SessionSource::ZoomWebhook,
        ..Default::default()
    }
}
