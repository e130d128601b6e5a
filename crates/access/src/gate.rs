//! Per-route guards for issue reads and writes.
//!
//! The gate is the single authority on radius and visibility. It is built
//! once from [`GeoConfig`] and shared by every request; each guard is a pure
//! function of its arguments.
//!
//! Single-item guards always re-check visibility, even when the item came out
//! of an already-filtered query. Knowing an id must never grant access
//! outside the radius.

use crate::caller::CallerContext;
use crate::error::{AccessError, Result};
use crate::issue::Issue;
use crate::params::{non_blank, parse_location};
use crate::policy::{DenyReason, EditAction, VisibilityDecision, VisibilityPolicy};
use civicpulse_core::config::GeoConfig;
use civicpulse_geo::{GeoPoint, Viewport};
use tracing::{debug, instrument};

/// An item paired with its distance from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub item: T,
    pub distance_km: f64,
}

impl<T> Located<T> {
    pub fn new(item: T, distance_km: f64) -> Self {
        Self { item, distance_km }
    }

    /// Transform the item, keeping the distance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Located<U> {
        Located {
            item: f(self.item),
            distance_km: self.distance_km,
        }
    }
}

/// Radius and visibility guards.
#[derive(Debug, Clone)]
pub struct AccessGate {
    config: GeoConfig,
    policy: VisibilityPolicy,
}

impl AccessGate {
    /// Build a gate from validated radius settings.
    pub fn new(config: GeoConfig) -> civicpulse_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            policy: VisibilityPolicy::from_config(&config),
        })
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    pub fn policy(&self) -> &VisibilityPolicy {
        &self.policy
    }

    pub fn max_radius_km(&self) -> f64 {
        self.config.max_search_radius_km
    }

    /// Require a valid caller (or new-issue) location from raw text.
    pub fn require_location(
        &self,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> Result<GeoPoint> {
        parse_location(latitude, longitude)
    }

    /// Require a valid location from an already-parsed body.
    pub fn require_point(&self, point: Option<GeoPoint>) -> Result<GeoPoint> {
        let point = point.ok_or(AccessError::MissingLocation)?;
        Ok(GeoPoint::try_new(point.latitude, point.longitude)?)
    }

    /// Resolve an explicitly requested radius.
    ///
    /// Absent means the configured default. A value above the maximum is
    /// rejected rather than truncated.
    pub fn resolve_radius(&self, requested: Option<&str>) -> Result<f64> {
        let Some(raw) = non_blank(requested) else {
            return Ok(self.config.default_search_radius_km);
        };

        let requested_km: f64 = raw
            .parse()
            .map_err(|_| AccessError::invalid_radius("distance must be a number"))?;

        if !requested_km.is_finite() || requested_km <= 0.0 {
            return Err(AccessError::invalid_radius("distance must be a positive number"));
        }

        let max_km = self.max_radius_km();
        if requested_km > max_km {
            debug!(requested_km, max_km, "rejected search radius above maximum");
            return Err(AccessError::RadiusTooLarge { requested_km, max_km });
        }

        Ok(requested_km)
    }

    /// Silent variant for map views: `min(requested, max)`, or the default
    /// when absent or not a positive number.
    pub fn clamp_radius(&self, requested: Option<f64>) -> f64 {
        match requested {
            Some(km) if km.is_finite() && km > 0.0 => km.min(self.max_radius_km()),
            _ => self.config.default_search_radius_km,
        }
    }

    /// Keep the candidates the caller may see, annotated with distance.
    ///
    /// Input order is preserved. `radius_km` is capped at the maximum, and a
    /// viewport can only remove items.
    #[instrument(
        skip_all,
        fields(
            candidates = candidates.len(),
            radius_km = tracing::field::Empty,
            visible = tracing::field::Empty
        )
    )]
    pub fn filter_collection(
        &self,
        caller: &CallerContext,
        candidates: Vec<Issue>,
        radius_km: f64,
        viewport: Option<&Viewport>,
    ) -> Vec<Located<Issue>> {
        let keep = |issue: Issue| -> Option<Located<Issue>> {
            let distance_km = match self.policy.evaluate_within(caller, &issue, radius_km) {
                VisibilityDecision::Allowed { distance_km } => distance_km,
                VisibilityDecision::Denied { .. } => return None,
            };
            if let Some(viewport) = viewport {
                if !viewport.contains(&issue.location) {
                    return None;
                }
            }
            Some(Located::new(issue, distance_km))
        };

        #[cfg(feature = "parallel")]
        let visible: Vec<Located<Issue>> = {
            use rayon::prelude::*;
            candidates.into_par_iter().filter_map(keep).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let visible: Vec<Located<Issue>> = candidates.into_iter().filter_map(keep).collect();

        tracing::Span::current().record("visible", visible.len());
        tracing::Span::current().record("radius_km", radius_km.min(self.max_radius_km()));
        visible
    }

    /// Re-check a single fetched issue.
    ///
    /// `None` (absent) and hidden-from-caller both yield
    /// [`AccessError::NotFound`].
    pub fn guard_single_item(
        &self,
        caller: &CallerContext,
        issue: Option<Issue>,
    ) -> Result<Located<Issue>> {
        let Some(issue) = issue else {
            return Err(AccessError::NotFound);
        };

        match self.policy.evaluate(caller, &issue) {
            VisibilityDecision::Allowed { distance_km } => Ok(Located::new(issue, distance_km)),
            VisibilityDecision::Denied { reason: DenyReason::NotFound, .. } => {
                debug!(issue_id = %issue.id, role = %caller.role(), "hidden issue withheld");
                Err(AccessError::NotFound)
            }
            VisibilityDecision::Denied { reason: DenyReason::OutOfArea, distance_km } => {
                let distance_km = distance_km.unwrap_or(f64::INFINITY);
                debug!(issue_id = %issue.id, distance_km, "issue outside caller area");
                Err(AccessError::OutOfArea {
                    max_km: self.max_radius_km(),
                    distance_km,
                })
            }
        }
    }

    /// Visibility first, then edit rights.
    pub fn guard_write(
        &self,
        caller: &CallerContext,
        issue: Option<Issue>,
        action: EditAction,
    ) -> Result<Located<Issue>> {
        let located = self.guard_single_item(caller, issue)?;
        if self.policy.can_edit(caller, &located.item, action) {
            Ok(located)
        } else {
            debug!(issue_id = %located.item.id, %action, role = %caller.role(), "edit refused");
            Err(AccessError::Forbidden { action })
        }
    }
}
