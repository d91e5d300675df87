//! Fresnel zone clearance evaluation and device height adjustment.

use crate::Result;
use cellnet_geo::ProfileSample;
use cellnet_metrics::{metric_defs, metrics, PlanLabels};
use cellnet_model::{ClearanceSettings, LinkId, LinkType, OwnerId, Repository, SiteId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

// ============================================================================
// Parameters
// ============================================================================

/// Parameters of the clearance loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceParams {
    /// Percentage of the first Fresnel zone radius that must stay clear.
    pub fresnel_clearance_pct: f64,
    /// Height added per iteration.
    pub height_step_m: f64,
    /// Device heights never rise above this.
    pub max_device_height_m: f64,
}

impl Default for ClearanceParams {
    fn default() -> Self {
        Self::from(&ClearanceSettings::default())
    }
}

impl From<&ClearanceSettings> for ClearanceParams {
    fn from(settings: &ClearanceSettings) -> Self {
        Self {
            fresnel_clearance_pct: settings.fresnel_clearance_pct,
            height_step_m: settings.height_step_m,
            max_device_height_m: settings.max_device_height_m,
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// First Fresnel zone radius in meters, scaled by `clearance_pct`.
///
/// `d1_km` is the distance from the near end, `total_km` the path length.
/// Returns 0 at the endpoints and for degenerate paths.
pub fn fresnel_radius_m(d1_km: f64, total_km: f64, frequency_ghz: f64, clearance_pct: f64) -> f64 {
    let denom = total_km * frequency_ghz;
    if denom <= 0.0 {
        return 0.0;
    }
    let radicand = d1_km * (total_km - d1_km) / denom;
    if radicand <= 0.0 {
        return 0.0;
    }
    17.3 * radicand.sqrt() * clearance_pct / 100.0
}

/// Iterate over the indices of obstructed profile samples.
///
/// The line of sight at sample `x` of `N` is `x * (b - a) / N + a` where
/// `a` and `b` are the device elevations. A sample is obstructed when the
/// line of sight minus the Fresnel radius falls below the terrain.
fn obstructions<'p>(
    profile: &'p [ProfileSample],
    distance_km: f64,
    frequency_ghz: f64,
    a_elevation_m: f64,
    b_elevation_m: f64,
    clearance_pct: f64,
) -> impl Iterator<Item = usize> + 'p {
    let n = profile.len();
    let degenerate = n < 2;
    profile
        .iter()
        .enumerate()
        .filter(move |_| !degenerate)
        .filter_map(move |(x, sample)| {
            let los = x as f64 * (b_elevation_m - a_elevation_m) / n as f64 + a_elevation_m;
            let fresnel =
                fresnel_radius_m(sample.distance_km, distance_km, frequency_ghz, clearance_pct);
            (los - fresnel < sample.elevation_m).then_some(x)
        })
}

/// Indices of every obstructed sample. Empty means the link is clear.
///
/// Profiles with fewer than two samples are always clear.
pub fn evaluate_clearance(
    profile: &[ProfileSample],
    distance_km: f64,
    frequency_ghz: f64,
    a_elevation_m: f64,
    b_elevation_m: f64,
    clearance_pct: f64,
) -> Vec<usize> {
    obstructions(
        profile,
        distance_km,
        frequency_ghz,
        a_elevation_m,
        b_elevation_m,
        clearance_pct,
    )
    .collect()
}

/// Index of the first obstructed sample, if any.
pub fn first_obstruction(
    profile: &[ProfileSample],
    distance_km: f64,
    frequency_ghz: f64,
    a_elevation_m: f64,
    b_elevation_m: f64,
    clearance_pct: f64,
) -> Option<usize> {
    obstructions(
        profile,
        distance_km,
        frequency_ghz,
        a_elevation_m,
        b_elevation_m,
        clearance_pct,
    )
    .next()
}

// ============================================================================
// Height adjustment loop
// ============================================================================

/// Heights at one end of a link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndHeights {
    /// Antenna height on the mast.
    pub device_height_m: f64,
    /// Ground elevation at the antenna.
    pub local_height_m: f64,
    /// Mast height of the site.
    pub site_height_m: f64,
}

impl EndHeights {
    /// Antenna elevation.
    pub fn elevation_m(&self) -> f64 {
        self.device_height_m + self.local_height_m
    }
}

/// Everything the loop needs to know about one link.
#[derive(Debug, Clone, Copy)]
pub struct ClearanceProblem<'a> {
    /// Private or public.
    pub link_type: LinkType,
    /// Owner-controlled end.
    pub a: EndHeights,
    /// Far end.
    pub b: EndHeights,
    /// Path length.
    pub distance_km: f64,
    /// Carrier frequency.
    pub frequency_ghz: f64,
    /// Terrain profile from `a` to `b`.
    pub profile: &'a [ProfileSample],
}

/// One raise of the device heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightStep {
    /// 1-based iteration number.
    pub iteration: u32,
    /// New device height at `a`.
    pub a_device_height_m: f64,
    /// New device height at `b`.
    pub b_device_height_m: f64,
    /// New site height at `a`, if the device outgrew the mast.
    pub a_site_raised_to: Option<f64>,
    /// New site height at `b`, if the device outgrew the mast.
    pub b_site_raised_to: Option<f64>,
}

/// Final state of the loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceOutcome {
    /// Final heights at `a`.
    pub a: EndHeights,
    /// Final heights at `b`.
    pub b: EndHeights,
    /// Number of raises performed.
    pub iterations: u32,
    /// False when the height ceiling was reached while still obstructed.
    pub converged: bool,
}

/// Raise both device heights until the profile clears.
///
/// Each iteration adds `height_step_m` to both ends, bounded by
/// `max_device_height_m`. A device raised above its mast lifts the mast
/// with it, except at the far end of a public link, which is held at the
/// other owner's mast height. Heights never decrease.
///
/// `on_step` sees every raise before the next evaluation, so callers can
/// persist intermediate heights. The loop ends when no sample is obstructed
/// or when neither end can rise any further.
pub fn adjust_heights<E>(
    problem: &ClearanceProblem<'_>,
    params: &ClearanceParams,
    mut on_step: impl FnMut(&HeightStep) -> std::result::Result<(), E>,
) -> std::result::Result<ClearanceOutcome, E> {
    let mut a = problem.a;
    let mut b = problem.b;
    let mut iterations = 0u32;

    loop {
        let obstructed = first_obstruction(
            problem.profile,
            problem.distance_km,
            problem.frequency_ghz,
            a.elevation_m(),
            b.elevation_m(),
            params.fresnel_clearance_pct,
        );
        if obstructed.is_none() {
            return Ok(ClearanceOutcome {
                a,
                b,
                iterations,
                converged: true,
            });
        }

        let next_a = raise(a.device_height_m, params);
        let mut next_b = raise(b.device_height_m, params);
        if problem.link_type == LinkType::Public && next_b > b.site_height_m {
            next_b = b.site_height_m.max(b.device_height_m);
        }

        if next_a <= a.device_height_m && next_b <= b.device_height_m {
            return Ok(ClearanceOutcome {
                a,
                b,
                iterations,
                converged: false,
            });
        }

        let mut a_site_raised_to = None;
        let mut b_site_raised_to = None;
        if next_a > a.site_height_m {
            a.site_height_m = next_a;
            a_site_raised_to = Some(next_a);
        }
        if problem.link_type == LinkType::Private && next_b > b.site_height_m {
            b.site_height_m = next_b;
            b_site_raised_to = Some(next_b);
        }

        a.device_height_m = next_a;
        b.device_height_m = next_b;
        iterations += 1;

        on_step(&HeightStep {
            iteration: iterations,
            a_device_height_m: next_a,
            b_device_height_m: next_b,
            a_site_raised_to,
            b_site_raised_to,
        })?;
    }
}

fn raise(height_m: f64, params: &ClearanceParams) -> f64 {
    (height_m + params.height_step_m)
        .min(params.max_device_height_m)
        .max(height_m)
}

// ============================================================================
// Repository driver
// ============================================================================

/// Sites whose mast height was raised, by link type. Sorted, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedSites {
    /// Sites raised by private links.
    pub private_site_ids: Vec<SiteId>,
    /// Sites raised by public links.
    pub public_site_ids: Vec<SiteId>,
}

/// Result of adjusting one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkAdjustment {
    /// The link.
    pub link_id: LinkId,
    /// Private or public.
    pub link_type: LinkType,
    /// Number of raises.
    pub iterations: u32,
    /// False when the link is still obstructed at the height ceiling.
    pub converged: bool,
    /// Final device height at `a`.
    pub a_device_height_m: f64,
    /// Final device height at `b`.
    pub b_device_height_m: f64,
}

/// Result of [`adjust_links`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentReport {
    /// Sites whose height changed.
    pub modified: ModifiedSites,
    /// Per-link results, in request order.
    pub links: Vec<LinkAdjustment>,
}

/// Raise device (and if needed site) heights of `link_ids` until each link
/// clears the configured Fresnel zone share.
///
/// Device heights and raised site heights are written to the repository
/// after every step, so a failure part-way leaves earlier steps committed.
pub fn adjust_links<R: Repository>(
    repo: &mut R,
    owner: &OwnerId,
    link_ids: &[LinkId],
) -> Result<AdjustmentReport> {
    let settings = repo.get_settings(owner)?;
    let params = ClearanceParams::from(&settings.clearance);

    let mut private_sites = BTreeSet::new();
    let mut public_sites = BTreeSet::new();
    let mut links = Vec::with_capacity(link_ids.len());

    for &link_id in link_ids {
        let link = repo.get_link(owner, link_id)?;
        let site_a = repo.get_site(&link.a.site)?;
        let site_b = repo.get_site(&link.b.site)?;

        let problem = ClearanceProblem {
            link_type: link.link_type,
            a: EndHeights {
                device_height_m: link.a.device_height_m,
                local_height_m: link.a.local_height_m,
                site_height_m: site_a.height_m,
            },
            b: EndHeights {
                device_height_m: link.b.device_height_m,
                local_height_m: link.b.local_height_m,
                site_height_m: site_b.height_m,
            },
            distance_km: link.distance_km,
            frequency_ghz: link.frequency_ghz,
            profile: &link.profile,
        };

        let labels = PlanLabels::new(owner.as_str()).with_link_type(link.link_type.to_string());
        let outcome = adjust_heights(&problem, &params, |step| -> Result<()> {
            if let Some(height) = step.a_site_raised_to {
                repo.update_site_height(&link.a.site, height)?;
                match link.link_type {
                    LinkType::Private => private_sites.insert(link.a.site.site.clone()),
                    LinkType::Public => public_sites.insert(link.a.site.site.clone()),
                };
                metrics::counter!(metric_defs::CLEARANCE_SITES_RAISED.name, &labels.to_labels())
                    .increment(1);
            }
            if let Some(height) = step.b_site_raised_to {
                repo.update_site_height(&link.b.site, height)?;
                private_sites.insert(link.b.site.site.clone());
                metrics::counter!(metric_defs::CLEARANCE_SITES_RAISED.name, &labels.to_labels())
                    .increment(1);
            }
            repo.update_link_heights(
                owner,
                link_id,
                step.a_device_height_m,
                step.b_device_height_m,
            )?;
            Ok(())
        })?;

        metrics::histogram!(metric_defs::CLEARANCE_ITERATIONS.name, &labels.to_labels())
            .record(outcome.iterations as f64);
        if outcome.converged {
            debug!(
                owner = %owner,
                link = %link_id,
                iterations = outcome.iterations,
                a_height_m = outcome.a.device_height_m,
                b_height_m = outcome.b.device_height_m,
                "Link clear"
            );
        } else {
            warn!(
                owner = %owner,
                link = %link_id,
                ceiling_m = params.max_device_height_m,
                "Link still obstructed at height ceiling"
            );
            metrics::counter!(
                metric_defs::CLEARANCE_UNCONVERGED.name,
                &PlanLabels::new(owner.as_str()).to_labels()
            )
            .increment(1);
        }

        links.push(LinkAdjustment {
            link_id,
            link_type: link.link_type,
            iterations: outcome.iterations,
            converged: outcome.converged,
            a_device_height_m: outcome.a.device_height_m,
            b_device_height_m: outcome.b.device_height_m,
        });
    }

    let modified = ModifiedSites {
        private_site_ids: private_sites.into_iter().collect(),
        public_site_ids: public_sites.into_iter().collect(),
    };
    info!(
        owner = %owner,
        links = links.len(),
        private_sites = modified.private_site_ids.len(),
        public_sites = modified.public_site_ids.len(),
        "Clearance adjustment complete"
    );

    Ok(AdjustmentReport { modified, links })
}
