//! Binary labeling of a sampled pharmacophore.
//!
//! A pharmacophore is active when at least one of its sites sits within the
//! distance threshold of a ligand feature of the matching kind (a donor
//! feature is matched by an acceptor-like site, and so on). The matched
//! feature positions are collected so a dataset can record where the
//! interactions happen, not just that they exist.

use crate::model::site::Pharmacophore;
use crate::perceive::ChemFeature;

/// Assigns the binary label and collects the matched feature positions.
///
/// Returns `(label, positives)` where `label` is 1 exactly when `positives`
/// is non-empty. Each ligand feature contributes its position at most once,
/// no matter how many sites fall within range of it.
pub(crate) fn assign_label(
    features: &[ChemFeature],
    pharmacophore: &Pharmacophore,
    distance_threshold: f64,
) -> (u8, Vec<[f64; 3]>) {
    let threshold_sq = distance_threshold * distance_threshold;
    let mut positives = Vec::new();

    for feature in features {
        let wanted = feature.kind.complement();
        let matched = pharmacophore.sites.iter().any(|site| {
            site.kind == wanted && dist_sq(site.position, feature.position) <= threshold_sq
        });
        if matched {
            positives.push(feature.position);
        }
    }

    (u8::from(!positives.is_empty()), positives)
}

#[inline]
fn dist_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    d[0] * d[0] + d[1] * d[1] + d[2] * d[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::site::{SiteKind, VirtualSite};
    use crate::perceive::FeatureKind;

    fn feature(kind: FeatureKind, position: [f64; 3]) -> ChemFeature {
        ChemFeature {
            kind,
            position,
            atoms: vec![0],
        }
    }

    fn pharm(sites: Vec<VirtualSite>) -> Pharmacophore {
        Pharmacophore::new(sites)
    }

    #[test]
    fn matching_site_within_threshold_is_active() {
        let features = vec![feature(FeatureKind::Donor, [0.0, 0.0, 0.0])];
        let sites = pharm(vec![VirtualSite::new(
            SiteKind::AcceptorLike,
            [3.0, 0.0, 0.0],
        )]);
        let (label, positives) = assign_label(&features, &sites, 3.5);
        assert_eq!(label, 1);
        assert_eq!(positives, vec![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn matching_site_beyond_threshold_is_inactive() {
        let features = vec![feature(FeatureKind::Donor, [0.0, 0.0, 0.0])];
        let sites = pharm(vec![VirtualSite::new(
            SiteKind::AcceptorLike,
            [3.6, 0.0, 0.0],
        )]);
        let (label, positives) = assign_label(&features, &sites, 3.5);
        assert_eq!(label, 0);
        assert!(positives.is_empty());
    }

    #[test]
    fn wrong_kind_within_threshold_does_not_count() {
        // A donor feature wants an acceptor-like site; an apolar site at the
        // same spot is just scenery.
        let features = vec![feature(FeatureKind::Donor, [0.0, 0.0, 0.0])];
        let sites = pharm(vec![VirtualSite::new(SiteKind::Apolar, [2.0, 0.0, 0.0])]);
        let (label, positives) = assign_label(&features, &sites, 3.5);
        assert_eq!(label, 0);
        assert!(positives.is_empty());
    }

    #[test]
    fn feature_matched_by_two_sites_appears_once() {
        let features = vec![feature(FeatureKind::Acceptor, [0.0, 0.0, 0.0])];
        let sites = pharm(vec![
            VirtualSite::new(SiteKind::DonorLike, [2.5, 0.0, 0.0]),
            VirtualSite::new(SiteKind::DonorLike, [0.0, 2.5, 0.0]),
        ]);
        let (label, positives) = assign_label(&features, &sites, 3.5);
        assert_eq!(label, 1);
        assert_eq!(positives.len(), 1);
    }

    #[test]
    fn multiple_matched_features_all_reported() {
        let features = vec![
            feature(FeatureKind::Donor, [0.0, 0.0, 0.0]),
            feature(FeatureKind::Hydrophobe, [10.0, 0.0, 0.0]),
            feature(FeatureKind::Acceptor, [20.0, 0.0, 0.0]),
        ];
        let sites = pharm(vec![
            VirtualSite::new(SiteKind::AcceptorLike, [2.0, 0.0, 0.0]),
            VirtualSite::new(SiteKind::Apolar, [10.0, 2.0, 0.0]),
            // Nothing donor-like near the acceptor feature.
        ]);
        let (label, positives) = assign_label(&features, &sites, 3.5);
        assert_eq!(label, 1);
        assert_eq!(
            positives,
            vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]],
        );
    }

    #[test]
    fn empty_pharmacophore_is_inactive() {
        let features = vec![feature(FeatureKind::Donor, [0.0, 0.0, 0.0])];
        let (label, positives) = assign_label(&features, &Pharmacophore::default(), 3.5);
        assert_eq!(label, 0);
        assert!(positives.is_empty());
    }

    #[test]
    fn featureless_ligand_is_inactive() {
        let sites = pharm(vec![VirtualSite::new(SiteKind::Apolar, [0.0, 0.0, 0.0])]);
        let (label, positives) = assign_label(&[], &sites, 3.5);
        assert_eq!(label, 0);
        assert!(positives.is_empty());
    }
}
