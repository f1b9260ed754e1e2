use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::sessions::{InsertSessionEntity, SessionEntity, UpdateSessionEntity},
    errors::RepositoryError,
    value_objects::{
        enums::{meeting_types::MeetingType, session_sources::SessionSource},
        users::PublicUser,
    },
};

pub const MIN_SESSION_DURATION: i64 = 1;
pub const MAX_SESSION_DURATION: i64 = 10_000;

/// A scheduled (or already held) class. Start time is Unix seconds and
/// duration is in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub start_time: i64,
    pub duration: i64,
    pub max_session_size: i32,
    pub cost: i64,
    pub meeting_url: Option<String>,
    pub profile_img_url: String,
    pub banner_img_url: String,
    pub tags: String,
    pub zoom_password: Option<String>,
    pub is_draft: Option<bool>,
    pub zoom_meeting_id: Option<i64>,
    pub zoom_meeting_join_url: Option<String>,
    pub zoom_meeting_start_url: Option<String>,
    pub zoom_occurrence_id: Option<String>,
    pub zoom_meeting_type: MeetingType,
    pub zoom_sync_enabled: Option<bool>,
    pub source: SessionSource,
}

impl Session {
    pub fn end_time(&self) -> i64 {
        self.start_time + self.duration * 60
    }

    pub fn is_sync_enabled(&self) -> bool {
        self.zoom_sync_enabled.unwrap_or(false)
    }

    /// The fields Zoom owns. Equal values mean a redelivered webhook carries
    /// nothing new for this row.
    pub fn has_schedule(&self, start_time: i64, duration: i64, name: &str) -> bool {
        self.start_time == start_time && self.duration == duration && self.name == name
    }
}

impl TryFrom<SessionEntity> for Session {
    type Error = RepositoryError;

    fn try_from(entity: SessionEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            user_id: entity.user_id,
            name: entity.name,
            description: entity.description,
            start_time: entity.start_time,
            duration: entity.duration,
            max_session_size: entity.max_session_size,
            cost: entity.cost_cents,
            meeting_url: entity.meeting_url,
            profile_img_url: entity.profile_img_url,
            banner_img_url: entity.banner_img_url,
            tags: entity.tags,
            zoom_password: entity.zoom_password,
            is_draft: entity.is_draft,
            zoom_meeting_id: entity.zoom_meeting_id,
            zoom_meeting_join_url: entity.zoom_meeting_join_url,
            zoom_meeting_start_url: entity.zoom_meeting_start_url,
            zoom_occurrence_id: entity.zoom_occurrence_id,
            zoom_meeting_type: entity.zoom_meeting_type.parse()?,
            zoom_sync_enabled: entity.zoom_sync_enabled,
            source: entity.source.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewSession {
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_time: i64,
    pub duration: i64,
    #[serde(default)]
    pub max_session_size: i32,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub profile_img_url: String,
    #[serde(default)]
    pub banner_img_url: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub zoom_password: Option<String>,
    #[serde(default)]
    pub is_draft: Option<bool>,
    #[serde(default)]
    pub zoom_meeting_id: Option<i64>,
    #[serde(default)]
    pub zoom_meeting_join_url: Option<String>,
    #[serde(default)]
    pub zoom_meeting_start_url: Option<String>,
    #[serde(default)]
    pub zoom_occurrence_id: Option<String>,
    #[serde(default)]
    pub zoom_meeting_type: MeetingType,
    #[serde(default)]
    pub zoom_sync_enabled: Option<bool>,
    #[serde(default)]
    pub source: SessionSource,
}

impl From<NewSession> for InsertSessionEntity {
    fn from(session: NewSession) -> Self {
        Self {
            user_id: session.user_id,
            name: session.name,
            description: session.description,
            start_time: session.start_time,
            duration: session.duration,
            max_session_size: session.max_session_size,
            cost_cents: session.cost,
            meeting_url: session.meeting_url,
            profile_img_url: session.profile_img_url,
            banner_img_url: session.banner_img_url,
            tags: session.tags,
            zoom_password: session.zoom_password,
            is_draft: session.is_draft,
            zoom_meeting_id: session.zoom_meeting_id,
            zoom_meeting_join_url: session.zoom_meeting_join_url,
            zoom_meeting_start_url: session.zoom_meeting_start_url,
            zoom_occurrence_id: session.zoom_occurrence_id,
            zoom_meeting_type: session.zoom_meeting_type.as_str().to_string(),
            zoom_sync_enabled: session.zoom_sync_enabled,
            source: session.source.as_str().to_string(),
        }
    }
}

/// Partial update. Outer `None` leaves a field as is; for nullable columns
/// `Some(None)` clears the value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub max_session_size: Option<i32>,
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default, with = "double_option")]
    pub meeting_url: Option<Option<String>>,
    #[serde(default)]
    pub profile_img_url: Option<String>,
    #[serde(default)]
    pub banner_img_url: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default, with = "double_option")]
    pub zoom_password: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub is_draft: Option<Option<bool>>,
    #[serde(skip)]
    pub zoom_meeting_id: Option<Option<i64>>,
    #[serde(skip)]
    pub zoom_meeting_join_url: Option<Option<String>>,
    #[serde(skip)]
    pub zoom_meeting_start_url: Option<Option<String>>,
    #[serde(skip)]
    pub zoom_meeting_type: Option<MeetingType>,
    #[serde(default, with = "double_option")]
    pub zoom_sync_enabled: Option<Option<bool>>,
}

impl From<SessionChanges> for UpdateSessionEntity {
    fn from(changes: SessionChanges) -> Self {
        Self {
            updated_at: Some(Utc::now()),
            name: changes.name,
            description: changes.description,
            start_time: changes.start_time,
            duration: changes.duration,
            max_session_size: changes.max_session_size,
            cost_cents: changes.cost,
            meeting_url: changes.meeting_url,
            profile_img_url: changes.profile_img_url,
            banner_img_url: changes.banner_img_url,
            tags: changes.tags,
            zoom_password: changes.zoom_password,
            is_draft: changes.is_draft,
            zoom_meeting_id: changes.zoom_meeting_id,
            zoom_meeting_join_url: changes.zoom_meeting_join_url,
            zoom_meeting_start_url: changes.zoom_meeting_start_url,
            zoom_meeting_type: changes
                .zoom_meeting_type
                .map(|meeting_type| meeting_type.as_str().to_string()),
            zoom_sync_enabled: changes.zoom_sync_enabled,
        }
    }
}

/// Distinguishes an absent JSON key (`None`) from an explicit `null` (`Some(None)`).
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydratedSession {
    #[serde(flatten)]
    pub session: Session,
    pub user: Option<PublicUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
}

impl HydratedSession {
    pub fn new(session: Session, user: Option<PublicUser>) -> Self {
        Self {
            session,
            user,
            purchased: None,
        }
    }
}

/// Sessions of one user split around a single `now` snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionBuckets {
    pub upcoming: Vec<HydratedSession>,
    pub live: Vec<HydratedSession>,
    pub previous: Vec<HydratedSession>,
}

impl SessionBuckets {
    /// `previous` holds sessions that started before `now`; the ones still
    /// running at `now` move to `live`, keeping their relative order.
    pub fn partition(
        upcoming: Vec<HydratedSession>,
        previous: Vec<HydratedSession>,
        now: i64,
    ) -> Self {
        let (live, previous): (Vec<_>, Vec<_>) = previous
            .into_iter()
            .partition(|hydrated| now < hydrated.session.end_time());
        Self {
            upcoming,
            live,
            previous,
        }
    }
}
