//! Geometric filters and subset sampling over candidate sites.

use super::config::SiteCount;
use super::error::Error;
use super::spatial::SpatialGrid;
use crate::model::site::VirtualSite;
use rand::Rng;
use rand_distr::{Distribution, Poisson};

/// Drops candidates that clash with the ligand.
///
/// A site survives only if no ligand atom lies within `clash_distance` of it.
pub(crate) fn ligand_distance_filter(
    sites: Vec<VirtualSite>,
    ligand_positions: &[[f64; 3]],
    clash_distance: f64,
) -> Vec<VirtualSite> {
    if ligand_positions.is_empty() {
        return sites;
    }
    let grid = SpatialGrid::from_positions(ligand_positions, clash_distance);
    sites
        .into_iter()
        .filter(|site| !grid.has_neighbor_within(site.position, ligand_positions, clash_distance))
        .collect()
}

/// Enforces a minimum spacing between sites.
///
/// Greedy scan in candidate order: a site is kept when it sits at least
/// `spacing` away from every site kept before it.
pub(crate) fn mutual_distance_filter(sites: Vec<VirtualSite>, spacing: f64) -> Vec<VirtualSite> {
    let spacing_sq = spacing * spacing;
    let mut kept: Vec<VirtualSite> = Vec::with_capacity(sites.len());
    for site in sites {
        let crowded = kept.iter().any(|other| {
            let d = [
                site.position[0] - other.position[0],
                site.position[1] - other.position[1],
                site.position[2] - other.position[2],
            ];
            d[0] * d[0] + d[1] * d[1] + d[2] * d[2] < spacing_sq
        });
        if !crowded {
            kept.push(site);
        }
    }
    kept
}

/// Draws the final site subset.
///
/// The target count is either fixed or Poisson-distributed, and is clamped
/// to the number of surviving candidates.
pub(crate) fn sample_sites(
    sites: Vec<VirtualSite>,
    count: &SiteCount,
    rng: &mut impl Rng,
) -> Result<Vec<VirtualSite>, Error> {
    let target = match count {
        SiteCount::Exact(n) => *n,
        SiteCount::Poisson(mean) => {
            let poisson = Poisson::new(*mean)
                .map_err(|e| Error::invalid_config(format!("Poisson mean {mean}: {e}")))?;
            poisson.sample(rng) as usize
        }
    };
    let take = target.min(sites.len());
    if take == sites.len() {
        return Ok(sites);
    }
    let picked = rand::seq::index::sample(rng, sites.len(), take);
    Ok(picked.into_iter().map(|i| sites[i]).collect())
}
