//! Visibility and edit-rights decisions for a single issue.
//!
//! Rules, in order:
//! 1. A hidden issue is invisible to anyone below moderator, and reported as
//!    not found so moderated content cannot be enumerated.
//! 2. The distance from the caller's query location to the issue is computed.
//! 3. Anything farther than the radius is out of area.
//!
//! Edit rights are checked separately, on top of visibility.

use crate::caller::{CallerContext, Role};
use crate::issue::Issue;
use civicpulse_core::config::GeoConfig;
use civicpulse_geo::distance_km;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an issue was withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    /// Hidden from this caller; indistinguishable from absence
    NotFound,
    /// Beyond the allowed radius
    OutOfArea,
}

/// Outcome of [`VisibilityPolicy::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisibilityDecision {
    Allowed {
        distance_km: f64,
    },
    Denied {
        reason: DenyReason,
        /// `None` when the issue was rejected before distance was computed
        distance_km: Option<f64>,
    },
}

impl VisibilityDecision {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn distance_km(&self) -> Option<f64> {
        match *self {
            Self::Allowed { distance_km } => Some(distance_km),
            Self::Denied { distance_km, .. } => distance_km,
        }
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match *self {
            Self::Allowed { .. } => None,
            Self::Denied { reason, .. } => Some(reason),
        }
    }
}

/// Modifying operations on an existing issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditAction {
    /// Change title, description or category
    Update,
    Delete,
    /// Move the issue through its workflow
    UpdateStatus,
    /// Hide or unhide
    Moderate,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            EditAction::Update => "update",
            EditAction::Delete => "delete",
            EditAction::UpdateStatus => "change the status of",
            EditAction::Moderate => "moderate",
        };
        f.write_str(verb)
    }
}

/// Radius-bounded visibility rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityPolicy {
    max_radius_km: f64,
}

impl VisibilityPolicy {
    pub fn new(max_radius_km: f64) -> Self {
        Self { max_radius_km }
    }

    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(config.max_search_radius_km)
    }

    pub fn max_radius_km(&self) -> f64 {
        self.max_radius_km
    }

    /// Decide visibility against the configured maximum radius.
    pub fn evaluate(&self, caller: &CallerContext, issue: &Issue) -> VisibilityDecision {
        self.evaluate_within(caller, issue, self.max_radius_km)
    }

    /// Decide visibility against `radius_km`, never more than the maximum.
    pub fn evaluate_within(
        &self,
        caller: &CallerContext,
        issue: &Issue,
        radius_km: f64,
    ) -> VisibilityDecision {
        if issue.is_hidden && !caller.role().can_see_hidden() {
            return VisibilityDecision::Denied {
                reason: DenyReason::NotFound,
                distance_km: None,
            };
        }

        let distance = distance_km(&caller.query_location, &issue.location);
        let radius = radius_km.min(self.max_radius_km);

        if distance > radius {
            VisibilityDecision::Denied {
                reason: DenyReason::OutOfArea,
                distance_km: Some(distance),
            }
        } else {
            VisibilityDecision::Allowed {
                distance_km: distance,
            }
        }
    }

    /// Edit rights, independent of visibility.
    ///
    /// Admins may do anything. Moderators may change status and moderate,
    /// and may update or delete anonymous issues, which have no owner. The
    /// assignee may change status. The reporter may update or delete their
    /// own attributed issue. Callers without an identity never have edit
    /// rights.
    pub fn can_edit(&self, caller: &CallerContext, issue: &Issue, action: EditAction) -> bool {
        let role = caller.role();
        if role == Role::Anonymous {
            return false;
        }
        if role.is_admin() {
            return true;
        }

        match action {
            EditAction::Moderate => role == Role::Moderator,
            EditAction::UpdateStatus => {
                role == Role::Moderator || caller.is_user(issue.assigned_to)
            }
            EditAction::Update | EditAction::Delete => {
                if issue.is_effectively_anonymous() {
                    role == Role::Moderator
                } else {
                    caller.is_user(issue.reporter_id())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::UserId;
    use crate::issue::UserRef;
    use civicpulse_geo::GeoPoint;
    use proptest::prelude::*;

    const CALLER_AT: GeoPoint = GeoPoint::new(18.5204, 73.8567);
    const NEARBY: GeoPoint = GeoPoint::new(18.5205, 73.8568);
    const FAR: GeoPoint = GeoPoint::new(18.60, 73.90);

    fn policy() -> VisibilityPolicy {
        VisibilityPolicy::new(5.0)
    }

    fn reported_issue(at: GeoPoint, reporter: UserId) -> Issue {
        Issue::reported("Pothole", at, UserRef::new(reporter, "asha"))
    }

    #[test]
    fn test_nearby_issue_allowed_with_distance() {
        let caller = CallerContext::anonymous(CALLER_AT);
        let decision = policy().evaluate(&caller, &Issue::anonymous("Pothole", NEARBY));

        assert!(decision.is_allowed());
        let distance = decision.distance_km().unwrap();
        assert!((0.01..=0.02).contains(&distance), "distance: {}", distance);
    }

    #[test]
    fn test_far_issue_out_of_area() {
        let caller = CallerContext::anonymous(CALLER_AT);
        let decision = policy().evaluate(&caller, &Issue::anonymous("Pothole", FAR));

        assert_eq!(decision.reason(), Some(DenyReason::OutOfArea));
        assert!(decision.distance_km().unwrap() > 5.0);
    }

    #[test]
    fn test_hidden_issue_not_found_for_ordinary_callers() {
        let mut issue = Issue::anonymous("Pothole", NEARBY);
        issue.is_hidden = true;

        for caller in [
            CallerContext::anonymous(CALLER_AT),
            CallerContext::authenticated(UserId::new(), Role::User, CALLER_AT),
        ] {
            let decision = policy().evaluate(&caller, &issue);
            assert_eq!(
                decision,
                VisibilityDecision::Denied { reason: DenyReason::NotFound, distance_km: None }
            );
        }
    }

    #[test]
    fn test_hidden_issue_visible_to_moderators_within_radius() {
        let mut issue = Issue::anonymous("Pothole", NEARBY);
        issue.is_hidden = true;

        for role in [Role::Moderator, Role::Admin] {
            let caller = CallerContext::authenticated(UserId::new(), role, CALLER_AT);
            assert!(policy().evaluate(&caller, &issue).is_allowed());
        }
    }

    #[test]
    fn test_radius_applies_to_admins() {
        let admin = CallerContext::authenticated(UserId::new(), Role::Admin, CALLER_AT);
        let decision = policy().evaluate(&admin, &Issue::anonymous("Pothole", FAR));
        assert_eq!(decision.reason(), Some(DenyReason::OutOfArea));
    }

    #[test]
    fn test_hidden_and_far_reports_not_found() {
        let mut issue = Issue::anonymous("Pothole", FAR);
        issue.is_hidden = true;
        let caller = CallerContext::anonymous(CALLER_AT);
        assert_eq!(policy().evaluate(&caller, &issue).reason(), Some(DenyReason::NotFound));
    }

    #[test]
    fn test_evaluate_within_never_exceeds_maximum() {
        let caller = CallerContext::anonymous(CALLER_AT);
        let issue = Issue::anonymous("Pothole", FAR);

        assert!(!policy().evaluate_within(&caller, &issue, 50.0).is_allowed());
        assert!(VisibilityPolicy::new(15.0).evaluate_within(&caller, &issue, 50.0).is_allowed());
        assert!(!VisibilityPolicy::new(15.0).evaluate_within(&caller, &issue, 1.0).is_allowed());
    }

    #[test]
    fn test_reporter_can_update_and_delete() {
        let reporter = UserId::new();
        let issue = reported_issue(NEARBY, reporter);
        let owner = CallerContext::authenticated(reporter, Role::User, CALLER_AT);
        let stranger = CallerContext::authenticated(UserId::new(), Role::User, CALLER_AT);

        assert!(policy().can_edit(&owner, &issue, EditAction::Update));
        assert!(policy().can_edit(&owner, &issue, EditAction::Delete));
        assert!(!policy().can_edit(&owner, &issue, EditAction::UpdateStatus));
        assert!(!policy().can_edit(&owner, &issue, EditAction::Moderate));
        assert!(!policy().can_edit(&stranger, &issue, EditAction::Update));
    }

    #[test]
    fn test_ownership_never_established_for_anonymous_issue() {
        let reporter = UserId::new();
        let mut issue = reported_issue(NEARBY, reporter);
        issue.is_anonymous = true;
        let would_be_owner = CallerContext::authenticated(reporter, Role::User, CALLER_AT);

        assert!(!policy().can_edit(&would_be_owner, &issue, EditAction::Update));
        assert!(!policy().can_edit(&would_be_owner, &issue, EditAction::Delete));
    }

    #[test]
    fn test_assignee_can_update_status_only() {
        let assignee = UserId::new();
        let mut issue = Issue::anonymous("Pothole", NEARBY);
        issue.assigned_to = Some(assignee);
        let caller = CallerContext::authenticated(assignee, Role::User, CALLER_AT);

        assert!(policy().can_edit(&caller, &issue, EditAction::UpdateStatus));
        assert!(!policy().can_edit(&caller, &issue, EditAction::Update));
    }

    #[test]
    fn test_admin_and_moderator_rights() {
        let issue = reported_issue(NEARBY, UserId::new());
        let admin = CallerContext::authenticated(UserId::new(), Role::Admin, CALLER_AT);
        let moderator = CallerContext::authenticated(UserId::new(), Role::Moderator, CALLER_AT);

        for action in [
            EditAction::Update,
            EditAction::Delete,
            EditAction::UpdateStatus,
            EditAction::Moderate,
        ] {
            assert!(policy().can_edit(&admin, &issue, action));
        }
        assert!(policy().can_edit(&moderator, &issue, EditAction::Moderate));
        assert!(policy().can_edit(&moderator, &issue, EditAction::UpdateStatus));
        assert!(!policy().can_edit(&moderator, &issue, EditAction::Delete));
    }

    #[test]
    fn test_moderator_can_edit_anonymous_issue() {
        let moderator = CallerContext::authenticated(UserId::new(), Role::Moderator, CALLER_AT);
        let issue = Issue::anonymous("Pothole", NEARBY);

        for action in [
            EditAction::Update,
            EditAction::Delete,
            EditAction::UpdateStatus,
            EditAction::Moderate,
        ] {
            assert!(policy().can_edit(&moderator, &issue, action), "{}", action);
        }

        let user = CallerContext::authenticated(UserId::new(), Role::User, CALLER_AT);
        assert!(!policy().can_edit(&user, &issue, EditAction::Update));
        assert!(!policy().can_edit(&user, &issue, EditAction::Delete));
    }

    #[test]
    fn test_moderator_cannot_edit_attributed_issue() {
        let issue = reported_issue(NEARBY, UserId::new());
        let moderator = CallerContext::authenticated(UserId::new(), Role::Moderator, CALLER_AT);

        assert!(!policy().can_edit(&moderator, &issue, EditAction::Update));
        assert!(!policy().can_edit(&moderator, &issue, EditAction::Delete));
    }

    #[test]
    fn test_anonymous_caller_has_no_edit_rights() {
        let mut issue = Issue::anonymous("Pothole", NEARBY);
        issue.assigned_to = None;
        let caller = CallerContext::anonymous(CALLER_AT);
        for action in [
            EditAction::Update,
            EditAction::Delete,
            EditAction::UpdateStatus,
            EditAction::Moderate,
        ] {
            assert!(!policy().can_edit(&caller, &issue, action));
        }
    }

    fn point() -> impl Strategy<Value = GeoPoint> {
        (-89.0f64..=89.0, -179.0f64..=179.0).prop_map(|(lat, lon)| GeoPoint::new(lat, lon))
    }

    proptest! {
        #[test]
        fn prop_decision_matches_distance_threshold(
            caller_at in point(),
            d_lat in -0.1f64..0.1,
            d_lon in -0.1f64..0.1,
            max in 0.5f64..15.0,
        ) {
            let issue_at = GeoPoint::new(caller_at.latitude + d_lat, caller_at.longitude + d_lon);
            let caller = CallerContext::anonymous(caller_at);
            let issue = Issue::anonymous("Pothole", issue_at);
            let decision = VisibilityPolicy::new(max).evaluate(&caller, &issue);
            let distance = distance_km(&caller_at, &issue_at);

            if distance <= max {
                prop_assert!(decision.is_allowed());
            } else {
                prop_assert_eq!(decision.reason(), Some(DenyReason::OutOfArea));
            }
            prop_assert_eq!(decision.distance_km(), Some(distance));
        }
    }
}
