//! Error types for the access layer

use crate::policy::EditAction;
use civicpulse_core::{ErrorCode, ErrorReport};
use civicpulse_geo::GeoError;
use thiserror::Error;

/// Result type alias for access operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Fixed caller-facing message for unexpected failures.
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Reasons a read or write of an issue is refused.
///
/// Every variant except [`AccessError::Internal`] is an expected outcome of
/// the request and carries a message safe to show the caller.
#[derive(Error, Debug)]
pub enum AccessError {
    /// Required coordinates absent from the request
    #[error("Location is required: provide latitude and longitude")]
    MissingLocation,

    /// Coordinates present but non-numeric or out of domain
    #[error("Invalid location: {reason}")]
    InvalidLocation {
        /// What was wrong with the coordinates
        reason: String,
    },

    /// Requested radius is not a positive number
    #[error("Invalid distance: {reason}")]
    InvalidRadius {
        /// What was wrong with the radius
        reason: String,
    },

    /// Requested radius above the configured maximum
    #[error("Distance too large: requested {requested_km} km, maximum allowed is {max_km} km")]
    RadiusTooLarge {
        /// Radius the caller asked for
        requested_km: f64,
        /// Configured ceiling
        max_km: f64,
    },

    /// The issue exists but is beyond the allowed radius
    #[error("This issue is outside your allowed viewing area (max {max_km} km)")]
    OutOfArea {
        /// Configured ceiling
        max_km: f64,
        /// Computed distance, for logs only
        distance_km: f64,
    },

    /// Absent, or hidden from this caller
    #[error("Issue not found")]
    NotFound,

    /// Caller lacks edit rights on a visible issue
    #[error("You do not have permission to {action} this issue")]
    Forbidden {
        /// Attempted action
        action: EditAction,
    },

    /// Failure in storage or auth; detail never reaches the caller
    #[error("An unexpected error occurred")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AccessError {
    /// Create an invalid location error
    pub fn invalid_location(reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            reason: reason.into(),
        }
    }

    /// Create an invalid radius error
    pub fn invalid_radius(reason: impl Into<String>) -> Self {
        Self::InvalidRadius {
            reason: reason.into(),
        }
    }

    /// Wrap a collaborator failure
    pub fn internal(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Box::new(source))
    }

    /// HTTP status equivalent
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::MissingLocation
            | Self::InvalidLocation { .. }
            | Self::InvalidRadius { .. }
            | Self::RadiusTooLarge { .. } => 400,
            Self::OutOfArea { .. } | Self::Forbidden { .. } => 403,
            Self::NotFound => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Error code for programmatic handling
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingLocation => ErrorCode::MissingLocation,
            Self::InvalidLocation { .. } => ErrorCode::InvalidLocation,
            Self::InvalidRadius { .. } => ErrorCode::InvalidRadius,
            Self::RadiusTooLarge { .. } => ErrorCode::RadiusTooLarge,
            Self::OutOfArea { .. } => ErrorCode::OutOfArea,
            Self::NotFound => ErrorCode::NotFound,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Expected, caller-caused outcome (as opposed to a system fault)
    #[must_use]
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    /// Caller-facing report. Internal failures get a fixed message.
    pub fn to_report(&self) -> ErrorReport {
        let report = ErrorReport::new(self.code(), self.to_string());
        match self {
            Self::MissingLocation | Self::InvalidLocation { .. } => report.with_suggestion(
                "Send latitude (-90 to 90) and longitude (-180 to 180) as decimal degrees",
            ),
            Self::RadiusTooLarge { max_km, .. } => {
                report.with_suggestion(format!("Request a distance of at most {} km", max_km))
            }
            Self::OutOfArea { max_km, .. } => report.with_suggestion(format!(
                "Only issues within {} km of your location can be viewed",
                max_km
            )),
            _ => report,
        }
    }
}

impl From<GeoError> for AccessError {
    fn from(err: GeoError) -> Self {
        Self::invalid_location(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AccessError::MissingLocation.status(), 400);
        assert_eq!(AccessError::invalid_location("x").status(), 400);
        assert_eq!(
            AccessError::RadiusTooLarge { requested_km: 10.0, max_km: 5.0 }.status(),
            400
        );
        assert_eq!(
            AccessError::OutOfArea { max_km: 5.0, distance_km: 9.9 }.status(),
            403
        );
        assert_eq!(AccessError::NotFound.status(), 404);
        assert_eq!(
            AccessError::Forbidden { action: EditAction::Delete }.status(),
            403
        );
        assert_eq!(AccessError::internal(io::Error::other("db down")).status(), 500);
    }

    #[test]
    fn test_out_of_area_message_states_maximum() {
        let err = AccessError::OutOfArea { max_km: 5.0, distance_km: 9.96 };
        let message = err.to_string();
        assert!(message.contains("max 5 km"), "{}", message);
        assert!(!message.contains("9.96"));
    }

    #[test]
    fn test_internal_report_hides_source() {
        let err = AccessError::internal(io::Error::other("connection refused at 10.0.0.4:27017"));
        assert!(!err.is_operational());

        let report = err.to_report();
        assert_eq!(report.message, INTERNAL_MESSAGE);
        assert_eq!(report.code, ErrorCode::Internal);
        assert!(!serde_json::to_string(&report).unwrap().contains("10.0.0.4"));
    }

    #[test]
    fn test_operational_errors() {
        assert!(AccessError::NotFound.is_operational());
        assert!(AccessError::MissingLocation.is_operational());
    }

    #[test]
    fn test_geo_error_becomes_invalid_location() {
        let err: AccessError = GeoError::InvalidCoordinate {
            latitude: 200.0,
            longitude: 0.0,
        }
        .into();
        assert!(matches!(err, AccessError::InvalidLocation { .. }));
        assert_eq!(err.code(), ErrorCode::InvalidLocation);
    }

    #[test]
    fn test_radius_report_has_suggestion() {
        let report = AccessError::RadiusTooLarge { requested_km: 10.0, max_km: 5.0 }.to_report();
        assert_eq!(report.code_str, "E4004");
        assert_eq!(report.suggestion.as_deref(), Some("Request a distance of at most 5 km"));
    }
}
