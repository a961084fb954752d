//! DOKS region slugs.

/// Regions queried when none is requested.
pub const DEFAULT_REGIONS: &[&str] = &[
    "nyc1", "nyc3", "ams3", "fra1", "lon1", "sgp1", "tor1", "sfo2", "sfo3", "blr1", "syd1",
];

/// Whether `slug` is a region DOKS is known to run in.
#[must_use]
pub fn is_known_region(slug: &str) -> bool {
    DEFAULT_REGIONS.contains(&slug)
}
