//! Candidate interaction-point proposal.
//!
//! Each perceived ligand feature proposes one virtual site of the
//! complementary kind, placed at a random interaction distance. Aromatic
//! features place their site off the ring plane; everything else samples a
//! uniform direction. The candidate budget caps the total before the
//! geometric filters run.

use super::config::CandidateBudget;
use super::spatial::SpatialGrid;
use crate::model::molecule::Molecule;
use crate::model::site::VirtualSite;
use crate::perceive::{ChemFeature, FeatureKind};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};
use std::f64::consts::{PI, TAU};

/// Interaction distance range for atom-anchored features, in Angstrom.
const ATOM_SITE_MIN: f64 = 2.0;
const ATOM_SITE_MAX: f64 = 4.0;

/// Stacking distance range above an aromatic ring plane, in Angstrom.
const RING_SITE_MIN: f64 = 3.0;
const RING_SITE_MAX: f64 = 4.5;

/// Water-probe radius for the surface estimate, in Angstrom.
const PROBE_RADIUS: f64 = 1.4;
const SURFACE_STEPS_THETA: usize = 12;
const SURFACE_STEPS_PHI: usize = 8;

pub(crate) fn propose(
    ligand: &Molecule,
    features: &[ChemFeature],
    budget: &CandidateBudget,
    rng: &mut impl Rng,
) -> Vec<VirtualSite> {
    let mut sites: Vec<VirtualSite> = features
        .iter()
        .map(|feature| place_site(ligand, feature, rng))
        .collect();

    let cap = match budget {
        CandidateBudget::Fixed(n) => *n,
        CandidateBudget::PerArea(coef) => {
            (coef * approx_surface_area(ligand)).ceil() as usize
        }
    };
    if sites.len() > cap {
        let picked = rand::seq::index::sample(rng, sites.len(), cap);
        sites = picked.into_iter().map(|i| sites[i]).collect();
    }
    sites
}

fn place_site(ligand: &Molecule, feature: &ChemFeature, rng: &mut impl Rng) -> VirtualSite {
    let kind = feature.kind.complement();
    let position = match feature.kind {
        FeatureKind::Aromatic => {
            let mut normal = ring_normal(ligand, &feature.atoms)
                .unwrap_or_else(|| UnitSphere.sample(rng));
            if rng.random_bool(0.5) {
                for c in &mut normal {
                    *c = -*c;
                }
            }
            let dist = rng.random_range(RING_SITE_MIN..=RING_SITE_MAX);
            offset(feature.position, normal, dist)
        }
        _ => {
            let dir: [f64; 3] = UnitSphere.sample(rng);
            let dist = rng.random_range(ATOM_SITE_MIN..=ATOM_SITE_MAX);
            offset(feature.position, dir, dist)
        }
    };
    VirtualSite::new(kind, position)
}

fn offset(origin: [f64; 3], dir: [f64; 3], dist: f64) -> [f64; 3] {
    [
        origin[0] + dir[0] * dist,
        origin[1] + dir[1] * dist,
        origin[2] + dir[2] * dist,
    ]
}

/// Unit normal of the ring plane, from the first three ring atoms. Returns
/// `None` when the atoms are (numerically) collinear.
fn ring_normal(ligand: &Molecule, ring: &[usize]) -> Option<[f64; 3]> {
    if ring.len() < 3 {
        return None;
    }
    let p0 = ligand.atoms[ring[0]].position;
    let p1 = ligand.atoms[ring[1]].position;
    let p2 = ligand.atoms[ring[2]].position;
    let u = [p1[0] - p0[0], p1[1] - p0[1], p1[2] - p0[2]];
    let v = [p2[0] - p0[0], p2[1] - p0[1], p2[2] - p0[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len < 1e-9 {
        return None;
    }
    Some([n[0] / len, n[1] / len, n[2] / len])
}

/// Approximate solvent-accessible surface area in square Angstrom.
///
/// Shrake-Rupley style: sample each atom's probe-inflated sphere on a
/// phi/theta lattice and scale the sphere area by the unoccluded fraction.
pub(crate) fn approx_surface_area(molecule: &Molecule) -> f64 {
    let positions: Vec<[f64; 3]> = molecule.atoms.iter().map(|a| a.position).collect();
    let radii: Vec<f64> = molecule
        .atoms
        .iter()
        .map(|a| a.element.vdw_radius())
        .collect();
    let max_inflated = radii.iter().fold(0.0f64, |acc, r| acc.max(*r)) + PROBE_RADIUS;
    let grid = SpatialGrid::from_positions(&positions, 2.0 * max_inflated);

    let mut area = 0.0;
    for (i, center) in positions.iter().enumerate() {
        let inflated = radii[i] + PROBE_RADIUS;
        let mut accessible = 0usize;
        let mut total = 0usize;

        for p_i in 0..SURFACE_STEPS_PHI {
            let phi = PI * p_i as f64 / SURFACE_STEPS_PHI as f64;
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();
            for t_i in 0..SURFACE_STEPS_THETA {
                let theta = TAU * t_i as f64 / SURFACE_STEPS_THETA as f64;
                let sample = [
                    center[0] + inflated * sin_phi * theta.cos(),
                    center[1] + inflated * sin_phi * theta.sin(),
                    center[2] + inflated * cos_phi,
                ];
                total += 1;

                let occluded = grid
                    .query_radius(sample, &positions, max_inflated)
                    .into_iter()
                    .any(|j| {
                        if j == i {
                            return false;
                        }
                        let d = [
                            sample[0] - positions[j][0],
                            sample[1] - positions[j][1],
                            sample[2] - positions[j][2],
                        ];
                        let dist_sq = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
                        let r = radii[j] + PROBE_RADIUS;
                        dist_sq < r * r
                    });
                if !occluded {
                    accessible += 1;
                }
            }
        }

        area += 4.0 * PI * inflated * inflated * accessible as f64 / total as f64;
    }
    area
}
