use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OCCURRENCE_STATUS_DELETED: &str = "deleted";

/// `GET /meetings/{id}` response, reduced to what session sync reads.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeetingInfo {
    pub id: i64,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub agenda: String,
    #[serde(rename = "type", default)]
    pub meeting_type: i64,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub join_url: String,
    #[serde(default)]
    pub start_url: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub occurrences: Vec<MeetingOccurrence>,
}

impl MeetingInfo {
    pub fn description(&self) -> &str {
        if self.agenda.is_empty() {
            &self.topic
        } else {
            &self.agenda
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeetingOccurrence {
    pub occurrence_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub status: String,
}

impl MeetingOccurrence {
    pub fn is_deleted(&self) -> bool {
        self.status == OCCURRENCE_STATUS_DELETED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingSettings {
    pub host_video: bool,
    pub participant_video: bool,
    pub join_before_host: bool,
    pub mute_upon_entry: bool,
    pub waiting_room: bool,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            host_video: true,
            participant_video: false,
            join_before_host: false,
            mute_upon_entry: true,
            waiting_room: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateMeetingRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub meeting_type: i64,
    /// RFC 3339.
    pub start_time: String,
    pub duration: i64,
    pub password: String,
    pub agenda: String,
    pub settings: MeetingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedMeeting {
    pub id: i64,
    #[serde(default)]
    pub join_url: String,
    #[serde(default)]
    pub start_url: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateMeetingRequest {
    pub topic: String,
    pub start_time: String,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OAuthToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoomUser {
    pub id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeetingSummary {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeetingListPage {
    #[serde(default)]
    pub page_count: i64,
    #[serde(default)]
    pub page_number: i64,
    #[serde(default)]
    pub page_size: i64,
    #[serde(default)]
    pub total_records: i64,
    #[serde(default)]
    pub meetings: Vec<MeetingSummary>,
}

impl MeetingListPage {
    pub fn is_last(&self) -> bool {
        self.meetings.is_empty()
            || self.page_number >= self.page_count
            || self.total_records <= self.page_number * self.page_size
    }
}
