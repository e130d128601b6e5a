//! Geospatial visibility and access control for civic issue reports.
//!
//! Every read or write of an issue passes through this crate:
//!
//! - **Coordinate validation** of the caller's query location
//!   ([`params`], [`AccessGate::require_location`])
//! - **Radius resolution** against the configured ceiling
//!   ([`AccessGate::resolve_radius`])
//! - **Visibility** by hidden flag and distance ([`VisibilityPolicy`])
//! - **Gating** of collections and single items ([`AccessGate`])
//! - **Anonymity redaction** of reporter identity ([`Redact`])
//! - **Pipelines** composing the above per route ([`pipeline`])
//!
//! # Example
//!
//! ```
//! use civicpulse_access::{AccessGate, CallerContext, Issue, Redact};
//! use civicpulse_core::config::GeoConfig;
//! use civicpulse_geo::GeoPoint;
//!
//! let gate = AccessGate::new(GeoConfig::default()).unwrap();
//! let here = gate.require_location(Some("18.5204"), Some("73.8567")).unwrap();
//! let caller = CallerContext::anonymous(here);
//!
//! let issue = Issue::anonymous("Pothole", GeoPoint::new(18.5205, 73.8568));
//! let located = gate.guard_single_item(&caller, Some(issue)).unwrap();
//!
//! let view = located.item.redact(&caller);
//! assert_eq!(view.reporter.display_name, "Anonymous");
//! assert!(located.distance_km <= 0.02);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod caller;
pub mod error;
pub mod gate;
pub mod issue;
pub mod params;
pub mod pipeline;
pub mod policy;
pub mod redact;

pub use caller::{CallerContext, Identity, Role, UserId};
pub use error::{AccessError, Result};
pub use gate::{AccessGate, Located};
pub use issue::{ActivityEntry, Comment, Contact, Flag, Issue, IssueId, IssueStatus, UserRef};
pub use params::{parse_location, LocationParams};
pub use pipeline::{IssueResponse, IssueSource, NearbyQuery};
pub use policy::{DenyReason, EditAction, VisibilityDecision, VisibilityPolicy};
pub use redact::{redact, PublicIssueView, Redact, ReporterView};
