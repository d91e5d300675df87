//! End-to-end tests: synthesize a topology, then adjust it for clearance.

use cellnet_geo::{Coord, FlatTerrain, GridTerrain, SphericalGeodesy};
use cellnet_link::{adjust_links, evaluate_clearance, TopologySynthesizer};
use cellnet_model::{
    InMemoryRepository, Link, LinkType, Owner, OwnerId, Repository, Settings, Site, SiteId,
    SiteKey, Technology,
};

fn owner() -> OwnerId {
    OwnerId::from("acme")
}

fn repo(sites: &[(&str, f64, f64)]) -> InMemoryRepository {
    let mut repo = InMemoryRepository::new();
    repo.insert_owner(Owner::new("acme", "Acme", "noc@acme.example"));
    for (id, lon, lat) in sites {
        repo.insert_site(Site::new("acme", *id, Coord::new(*lon, *lat), 30.0, Technology::FourG));
    }
    repo
}

fn site_ids(ids: &[&str]) -> Vec<SiteId> {
    ids.iter().map(|s| SiteId::from(*s)).collect()
}

fn is_clear(link: &Link, settings: &Settings) -> bool {
    evaluate_clearance(
        &link.profile,
        link.distance_km,
        link.frequency_ghz,
        link.a.device_elevation_m(),
        link.b.device_elevation_m(),
        settings.clearance.fresnel_clearance_pct,
    )
    .is_empty()
}

/// Flat ground at 100 m with a 160 m north-south ridge at lon 0.01.
fn ridge() -> GridTerrain {
    let width = 5;
    let height = 3;
    let mut elevations = vec![100.0; width * height];
    for row in 0..height {
        elevations[row * width + 2] = 160.0;
    }
    GridTerrain::new((-0.01, -0.01), (0.03, 0.01), width, height, elevations)
        .expect("valid grid")
}

#[test]
fn test_three_sites_yield_two_private_links() {
    let geo = SphericalGeodesy::new(FlatTerrain::new(50.0));
    // b is between a and c, so the MST is the path a-b-c.
    let mut repo = repo(&[("a", 0.0, 0.0), ("b", 0.01, 0.0), ("c", 0.03, 0.0)]);

    let result = TopologySynthesizer::new(&geo)
        .synthesize(&mut repo, &owner(), &site_ids(&["a", "b", "c"]))
        .expect("synthesis succeeds");

    assert_eq!(result.created_link_ids.len(), 2);
    assert_eq!(result.backbone_link_ids, result.created_link_ids);

    let links = repo.get_links(&owner()).unwrap();
    assert_eq!(links.len(), 2);
    for link in &links {
        assert_eq!(link.link_type, LinkType::Private);
        assert_eq!(link.profile.len(), 100);
    }

    let b = SiteKey::new("acme", "b");
    let a = SiteKey::new("acme", "a");
    let c = SiteKey::new("acme", "c");
    assert!(links.iter().any(|l| l.connects(&a, &b)));
    assert!(links.iter().any(|l| l.connects(&b, &c)));
    assert!(!links.iter().any(|l| l.connects(&a, &c)));
}

#[test]
fn test_three_sites_star_when_center_is_closest() {
    let geo = SphericalGeodesy::new(FlatTerrain::new(0.0));
    // Hub at the origin with three spokes; spokes are farther from each other.
    let mut repo = repo(&[
        ("hub", 0.0, 0.0),
        ("n", 0.0, 0.01),
        ("e", 0.01, 0.0),
        ("s", 0.0, -0.01),
    ]);

    TopologySynthesizer::new(&geo)
        .synthesize(&mut repo, &owner(), &site_ids(&["hub", "n", "e", "s"]))
        .expect("synthesis succeeds");

    let hub = SiteKey::new("acme", "hub");
    let links = repo.get_links(&owner()).unwrap();
    assert_eq!(links.len(), 3);
    assert!(links.iter().all(|l| l.touches(&hub)));
}

#[test]
fn test_obstructed_link_clears_after_adjustment() {
    let geo = SphericalGeodesy::new(ridge());
    let mut repo = repo(&[("west", 0.0, 0.0), ("east", 0.02, 0.0)]);
    let settings = repo.get_settings(&owner()).unwrap();

    let result = TopologySynthesizer::new(&geo)
        .synthesize(&mut repo, &owner(), &site_ids(&["west", "east"]))
        .expect("synthesis succeeds");
    assert_eq!(result.created_link_ids.len(), 1);

    let before = repo.get_link(&owner(), result.created_link_ids[0]).unwrap();
    assert!(!is_clear(&before, &settings), "ridge should block the new link");

    let report = adjust_links(&mut repo, &owner(), &result.created_link_ids).expect("adjusts");
    assert_eq!(report.links.len(), 1);
    assert!(report.links[0].converged);
    assert!(report.links[0].iterations > 0);

    let after = repo.get_link(&owner(), result.created_link_ids[0]).unwrap();
    assert!(is_clear(&after, &settings));
    assert!(after.a.device_height_m > before.a.device_height_m);

    // A ~60 m ridge needs more than the 30 m masts.
    assert_eq!(
        report.modified.private_site_ids,
        vec![SiteId::from("east"), SiteId::from("west")]
    );
    let west = repo.get_site(&SiteKey::new("acme", "west")).unwrap();
    assert_eq!(west.height_m, after.a.device_height_m);
}

/// Two 100 m hilltops at lon 0 and 0.02 with a valley between them.
fn valley() -> GridTerrain {
    GridTerrain::new(
        (0.0, -0.01),
        (0.02, 0.01),
        3,
        2,
        vec![100.0, 0.0, 100.0, 100.0, 0.0, 100.0],
    )
    .expect("valid grid")
}

#[test]
fn test_adjusting_clear_link_changes_nothing() {
    let geo = SphericalGeodesy::new(valley());
    let mut repo = repo(&[("a", 0.0, 0.0), ("b", 0.02, 0.0)]);
    let result = TopologySynthesizer::new(&geo)
        .synthesize(&mut repo, &owner(), &site_ids(&["a", "b"]))
        .unwrap();
    let before = repo.get_link(&owner(), result.created_link_ids[0]).unwrap();

    let report = adjust_links(&mut repo, &owner(), &result.created_link_ids).unwrap();

    assert_eq!(report.links[0].iterations, 0);
    assert!(report.modified.private_site_ids.is_empty());
    assert_eq!(repo.get_link(&owner(), before.id).unwrap(), before);
}
