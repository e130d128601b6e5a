//! Read and write pipelines for issue routes.
//!
//! Each route composes the same steps: parse the caller location, fetch from
//! storage, gate, redact, annotate with distance. Each step returns a new
//! value; nothing is attached to a shared request or response object.

use crate::caller::{CallerContext, Identity};
use crate::error::{AccessError, Result};
use crate::gate::{AccessGate, Located};
use crate::issue::{Issue, IssueId};
use crate::params::LocationParams;
use crate::policy::EditAction;
use crate::redact::{PublicIssueView, Redact};
use civicpulse_geo::{GeoPoint, Viewport};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Coarse pre-filter handed to storage for collection reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub viewport: Option<Viewport>,
    /// Privileged callers may receive hidden issues
    pub include_hidden: bool,
}

/// Storage collaborator.
///
/// `fetch_nearby` may over-return; every result is re-filtered by the gate.
pub trait IssueSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_by_id(&self, id: IssueId) -> std::result::Result<Option<Issue>, Self::Error>;

    fn fetch_nearby(&self, query: &NearbyQuery) -> std::result::Result<Vec<Issue>, Self::Error>;
}

/// A redacted issue annotated with its distance from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    #[serde(flatten)]
    pub issue: PublicIssueView,
    pub distance_km: f64,
}

impl IssueResponse {
    fn from_located(located: Located<Issue>, caller: &CallerContext) -> Self {
        Self {
            issue: located.item.redact(caller),
            distance_km: located.distance_km,
        }
    }
}

/// Issue list around the caller.
///
/// Location and radius are validated before storage is consulted.
pub fn list_nearby<S: IssueSource>(
    gate: &AccessGate,
    source: &S,
    identity: Option<Identity>,
    params: &LocationParams,
    viewport: Option<Viewport>,
) -> Result<Vec<IssueResponse>> {
    let location = params.location()?;
    let radius_km = gate.resolve_radius(params.distance())?;
    let caller = CallerContext::new(identity, location);

    let query = NearbyQuery {
        center: location,
        radius_km,
        viewport,
        include_hidden: caller.role().can_see_hidden(),
    };
    let candidates = source.fetch_nearby(&query).map_err(storage_failure)?;

    let visible = gate.filter_collection(&caller, candidates, radius_km, viewport.as_ref());
    debug!(count = visible.len(), radius_km, "listed nearby issues");

    Ok(visible
        .into_iter()
        .map(|located| IssueResponse::from_located(located, &caller))
        .collect())
}

/// Map markers: same as [`list_nearby`] but an oversized radius is clamped.
pub fn map_nearby<S: IssueSource>(
    gate: &AccessGate,
    source: &S,
    identity: Option<Identity>,
    location: GeoPoint,
    radius_km: Option<f64>,
    viewport: Option<Viewport>,
) -> Result<Vec<IssueResponse>> {
    let location = gate.require_point(Some(location))?;
    let radius_km = gate.clamp_radius(radius_km);
    let caller = CallerContext::new(identity, location);

    let query = NearbyQuery {
        center: location,
        radius_km,
        viewport,
        include_hidden: caller.role().can_see_hidden(),
    };
    let candidates = source.fetch_nearby(&query).map_err(storage_failure)?;

    Ok(gate
        .filter_collection(&caller, candidates, radius_km, viewport.as_ref())
        .into_iter()
        .map(|located| IssueResponse::from_located(located, &caller))
        .collect())
}

/// Single issue by id.
pub fn get_one<S: IssueSource>(
    gate: &AccessGate,
    source: &S,
    identity: Option<Identity>,
    params: &LocationParams,
    id: IssueId,
) -> Result<IssueResponse> {
    let caller = CallerContext::new(identity, params.location()?);
    let issue = source.fetch_by_id(id).map_err(storage_failure)?;
    let located = gate.guard_single_item(&caller, issue)?;
    Ok(IssueResponse::from_located(located, &caller))
}

/// Authorize a modification and hand back the stored record to be changed.
pub fn authorize_write<S: IssueSource>(
    gate: &AccessGate,
    source: &S,
    identity: Option<Identity>,
    params: &LocationParams,
    id: IssueId,
    action: EditAction,
) -> Result<Located<Issue>> {
    let caller = CallerContext::new(identity, params.location()?);
    let issue = source.fetch_by_id(id).map_err(storage_failure)?;
    gate.guard_write(&caller, issue, action)
}

fn storage_failure<E: std::error::Error + Send + Sync + 'static>(err: E) -> AccessError {
    error!(error = %err, "issue storage request failed");
    AccessError::internal(err)
}
