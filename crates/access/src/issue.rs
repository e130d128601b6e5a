//! Stored issue records as supplied by the storage layer.
//!
//! Only the attributes the access layer consumes are modelled. Locations are
//! stored as GeoJSON points and validated on deserialization, so an `Issue`
//! never carries an out-of-domain location.

use crate::caller::UserId;
use chrono::{DateTime, Utc};
use civicpulse_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub Uuid);

impl IssueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Workflow state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    #[default]
    Reported,
    Acknowledged,
    InProgress,
    Resolved,
    Rejected,
}

/// Private contact details of a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Populated user reference embedded in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

impl UserRef {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            contact: None,
        }
    }

    #[must_use]
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    /// `None` when the author account no longer exists
    pub author: Option<UserRef>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One entry in an issue's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub action: String,
    /// `None` for system-generated entries
    pub actor: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

/// A report that the issue is spam, abusive or a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub flagged_by: Option<UserRef>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// An issue record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "geojson_location")]
    pub location: GeoPoint,
    /// Always `None` for anonymous reports
    #[serde(default)]
    pub reporter: Option<UserRef>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub activity_log: Vec<ActivityEntry>,
    #[serde(default)]
    pub flags: Vec<Flag>,
    pub created_at: DateTime<Utc>,
}

impl Issue {
    /// A new report attributed to `reporter`.
    pub fn reported(title: impl Into<String>, location: GeoPoint, reporter: UserRef) -> Self {
        Self::blank(title.into(), location, Some(reporter), false)
    }

    /// A new report with no attributable reporter.
    pub fn anonymous(title: impl Into<String>, location: GeoPoint) -> Self {
        Self::blank(title.into(), location, None, true)
    }

    fn blank(
        title: String,
        location: GeoPoint,
        reporter: Option<UserRef>,
        is_anonymous: bool,
    ) -> Self {
        Self {
            id: IssueId::new(),
            title,
            description: String::new(),
            category: String::new(),
            location,
            reporter,
            is_anonymous,
            is_hidden: false,
            status: IssueStatus::default(),
            assigned_to: None,
            upvotes: 0,
            comments: Vec::new(),
            activity_log: Vec::new(),
            flags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Anonymous if flagged so, or if no reporter is attached.
    #[inline]
    pub fn is_effectively_anonymous(&self) -> bool {
        self.is_anonymous || self.reporter.is_none()
    }

    /// The reporter's id, unless the issue is anonymous.
    pub fn reporter_id(&self) -> Option<UserId> {
        if self.is_effectively_anonymous() {
            None
        } else {
            self.reporter.as_ref().map(|r| r.id)
        }
    }
}

/// Serde adapter storing a [`GeoPoint`] as a validated GeoJSON point.
mod geojson_location {
    use civicpulse_geo::{GeoJsonPoint, GeoPoint};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &GeoPoint, serializer: S) -> Result<S::Ok, S::Error> {
        GeoJsonPoint::from(*point).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GeoPoint, D::Error> {
        let raw = GeoJsonPoint::deserialize(deserializer)?;
        GeoPoint::try_from(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anonymous_constructor_clears_reporter() {
        let issue = Issue::anonymous("Pothole", GeoPoint::new(18.52, 73.85));
        assert!(issue.is_anonymous);
        assert!(issue.reporter.is_none());
        assert!(issue.reporter_id().is_none());
    }

    #[test]
    fn test_missing_reporter_is_effectively_anonymous() {
        let mut issue = Issue::reported(
            "Broken light",
            GeoPoint::new(18.52, 73.85),
            UserRef::new(UserId::new(), "asha"),
        );
        assert!(!issue.is_effectively_anonymous());

        issue.reporter = None;
        assert!(!issue.is_anonymous);
        assert!(issue.is_effectively_anonymous());
        assert!(issue.reporter_id().is_none());
    }

    #[test]
    fn test_anonymous_flag_hides_reporter_id() {
        let mut issue = Issue::reported(
            "Graffiti",
            GeoPoint::new(18.52, 73.85),
            UserRef::new(UserId::new(), "asha"),
        );
        issue.is_anonymous = true;
        assert!(issue.reporter_id().is_none());
    }

    #[test]
    fn test_deserialize_storage_record() {
        let id = Uuid::new_v4();
        let value = json!({
            "id": id,
            "title": "Pothole on FC Road",
            "location": {"type": "Point", "coordinates": [73.8567, 18.5204]},
            "isAnonymous": true,
            "status": "in-progress",
            "createdAt": "2026-03-01T10:00:00Z"
        });

        let issue: Issue = serde_json::from_value(value).unwrap();
        assert_eq!(issue.id, IssueId(id));
        assert_eq!(issue.location, GeoPoint::new(18.5204, 73.8567));
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert!(issue.comments.is_empty());
        assert!(!issue.is_hidden);
    }

    #[test]
    fn test_deserialize_location_with_altitude() {
        let value = json!({
            "id": Uuid::new_v4(),
            "title": "Fallen tree",
            "location": {"type": "Point", "coordinates": [73.8567, 18.5204, 560.0]},
            "createdAt": "2026-03-01T10:00:00Z"
        });

        let issue: Issue = serde_json::from_value(value).unwrap();
        assert_eq!(issue.location, GeoPoint::new(18.5204, 73.8567));
    }

    #[test]
    fn test_deserialize_rejects_invalid_location() {
        let value = json!({
            "id": Uuid::new_v4(),
            "title": "Bad",
            "location": {"type": "Point", "coordinates": [73.8567, 200.0]},
            "createdAt": "2026-03-01T10:00:00Z"
        });

        assert!(serde_json::from_value::<Issue>(value).is_err());
    }

    #[test]
    fn test_serialize_location_as_geojson() {
        let issue = Issue::anonymous("Pothole", GeoPoint::new(18.5, 73.8));
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["location"]["type"], "Point");
        assert_eq!(value["location"]["coordinates"][0], 73.8);
    }
}
