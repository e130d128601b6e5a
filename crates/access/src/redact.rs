//! Caller-visible projections of issues.
//!
//! Redaction builds a new view and never touches the stored record.
//! Anonymity belongs to the report only: commenters and actors in the
//! activity log keep their names even on an anonymous issue.
//!
//! Reporter rules:
//! - anonymous issue (flag set or no reporter attached): fixed sentinel
//! - caller is the reporter, or an admin: full identity
//! - anyone else: display name only

use crate::caller::{CallerContext, UserId};
use crate::issue::{ActivityEntry, Comment, Contact, Flag, Issue, IssueId, IssueStatus, UserRef};
use chrono::{DateTime, Utc};
use civicpulse_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used when no reporter or comment author is attributable.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Display name for activity-log entries without an actor.
pub const SYSTEM_NAME: &str = "System";

/// Reporter as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterView {
    pub id: Option<UserId>,
    pub display_name: String,
    pub contact: Option<Contact>,
}

impl ReporterView {
    /// `{id: null, displayName: "Anonymous", contact: null}`
    pub fn anonymous() -> Self {
        Self {
            id: None,
            display_name: ANONYMOUS_NAME.to_string(),
            contact: None,
        }
    }

    fn full(user: &UserRef) -> Self {
        Self {
            id: Some(user.id),
            display_name: user.display_name.clone(),
            contact: user.contact.clone(),
        }
    }

    fn name_only(display_name: &str) -> Self {
        Self {
            id: None,
            display_name: display_name.to_string(),
            contact: None,
        }
    }
}

/// Author or actor as shown to the caller. Contact details are never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorView {
    pub id: Option<UserId>,
    pub display_name: String,
}

impl ActorView {
    fn from_ref(user: Option<&UserRef>, fallback: &str) -> Self {
        match user {
            Some(user) => Self {
                id: Some(user.id),
                display_name: user.display_name.clone(),
            },
            None => Self {
                id: None,
                display_name: fallback.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub author: ActorView,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            author: ActorView::from_ref(comment.author.as_ref(), ANONYMOUS_NAME),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub action: String,
    pub actor: ActorView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

impl From<&ActivityEntry> for ActivityView {
    fn from(entry: &ActivityEntry) -> Self {
        Self {
            action: entry.action.clone(),
            actor: ActorView::from_ref(entry.actor.as_ref(), SYSTEM_NAME),
            note: entry.note.clone(),
            at: entry.at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagView {
    pub flagged_by: ActorView,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Flag> for FlagView {
    fn from(flag: &Flag) -> Self {
        Self {
            flagged_by: ActorView::from_ref(flag.flagged_by.as_ref(), ANONYMOUS_NAME),
            reason: flag.reason.clone(),
            created_at: flag.created_at,
        }
    }
}

/// An issue as the caller is allowed to see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIssueView {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: GeoPoint,
    pub status: IssueStatus,
    pub assigned_to: Option<UserId>,
    pub upvotes: u32,
    /// Effective anonymity of the report
    pub is_anonymous: bool,
    pub is_hidden: bool,
    pub reporter: ReporterView,
    pub comments: Vec<CommentView>,
    pub activity_log: Vec<ActivityView>,
    pub flag_count: usize,
    /// Only present for moderators and admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<FlagView>>,
    pub created_at: DateTime<Utc>,
}

/// Produce the caller-visible projection of a record.
///
/// Applying it to its own output for the same caller is a no-op.
pub trait Redact {
    fn redact(&self, caller: &CallerContext) -> PublicIssueView;
}

impl Redact for Issue {
    fn redact(&self, caller: &CallerContext) -> PublicIssueView {
        let reporter = match self.reporter.as_ref() {
            _ if self.is_effectively_anonymous() => ReporterView::anonymous(),
            Some(user) if caller.is_user(Some(user.id)) || caller.role().is_admin() => {
                ReporterView::full(user)
            }
            Some(user) => ReporterView::name_only(&user.display_name),
            None => ReporterView::anonymous(),
        };

        let flags = caller
            .role()
            .can_see_hidden()
            .then(|| self.flags.iter().map(FlagView::from).collect());

        PublicIssueView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            location: self.location,
            status: self.status,
            assigned_to: self.assigned_to,
            upvotes: self.upvotes,
            is_anonymous: self.is_effectively_anonymous(),
            is_hidden: self.is_hidden,
            reporter,
            comments: self.comments.iter().map(CommentView::from).collect(),
            activity_log: self.activity_log.iter().map(ActivityView::from).collect(),
            flag_count: self.flags.len(),
            flags,
            created_at: self.created_at,
        }
    }
}

impl Redact for PublicIssueView {
    fn redact(&self, caller: &CallerContext) -> PublicIssueView {
        let mut view = self.clone();

        let sees_full_identity = caller.role().is_admin()
            || (view.reporter.id.is_some() && caller.is_user(view.reporter.id));

        if view.is_anonymous {
            view.reporter = ReporterView::anonymous();
        } else if !sees_full_identity {
            view.reporter = ReporterView::name_only(&view.reporter.display_name);
        }

        if !caller.role().can_see_hidden() {
            view.flags = None;
        }
        view
    }
}

/// Redact a stored issue for `caller`.
pub fn redact(issue: &Issue, caller: &CallerContext) -> PublicIssueView {
    issue.redact(caller)
}
