use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::RepositoryError;

/// Zoom's numeric meeting type for a one-off meeting with a fixed time.
pub const ZOOM_SINGULAR_CODE: i64 = 2;
/// Zoom's numeric meeting type for a recurring meeting with fixed times.
pub const ZOOM_RECURRING_CODE: i64 = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingType {
    #[default]
    None,
    Singular,
    Recurring,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::None => "NONE",
            MeetingType::Singular => "SINGULAR",
            MeetingType::Recurring => "RECURRING",
        }
    }

    /// Maps Zoom's numeric type. Types the platform does not mirror
    /// (instant meetings, recurring without fixed time) map to `None`.
    pub fn from_zoom_code(code: i64) -> Self {
        match code {
            ZOOM_SINGULAR_CODE => MeetingType::Singular,
            ZOOM_RECURRING_CODE => MeetingType::Recurring,
            _ => MeetingType::None,
        }
    }

    pub fn zoom_code(&self) -> Option<i64> {
        match self {
            MeetingType::None => None,
            MeetingType::Singular => Some(ZOOM_SINGULAR_CODE),
            MeetingType::Recurring => Some(ZOOM_RECURRING_CODE),
        }
    }
}

impl Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingType {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "NONE" => Ok(MeetingType::None),
            "SINGULAR" => Ok(MeetingType::Singular),
            "RECURRING" => Ok(MeetingType::Recurring),
            other => Err(RepositoryError::UnknownVariant {
                kind: "meeting type",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_zoom_codes_map_to_none() {
        assert_eq!(MeetingType::from_zoom_code(2), MeetingType::Singular);
        assert_eq!(MeetingType::from_zoom_code(8), MeetingType::Recurring);
        assert_eq!(MeetingType::from_zoom_code(1), MeetingType::None);
        assert_eq!(MeetingType::from_zoom_code(3), MeetingType::None);
    }

    #[test]
    fn rejects_unknown_stored_values() {
        assert_eq!("RECURRING".parse::<MeetingType>(), Ok(MeetingType::Recurring));
        assert!(matches!(
            "recurring".parse::<MeetingType>(),
            Err(RepositoryError::UnknownVariant { .. })
        ));
    }
}
