//! Capacity factors for replacement technologies.
//!
//! Wind and solar capacity factors depend on where a plant is. These are looked up from a set of
//! sampled sites by picking the site nearest to the plant. Distances are measured on the flat
//! (latitude, longitude) plane without any geodesic correction.
use crate::fuel::Fuel;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;

/// A point given as latitude and longitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Squared Euclidean distance in degrees
    fn squared_distance(&self, other: &Coordinates) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlon = self.longitude - other.longitude;
        dlat * dlat + dlon * dlon
    }
}

/// A sampled site with a known capacity factor
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityFactorSite {
    /// Location of the site
    pub location: Coordinates,
    /// Capacity factor at the site
    pub capacity_factor: Dimensionless,
}

/// Where the capacity factor for a replacement fuel comes from
#[derive(Debug, Clone, PartialEq)]
pub enum CapacityFactorSource {
    /// The same capacity factor everywhere
    Uniform(Dimensionless),
    /// The capacity factor of the nearest sampled site
    Sites(Vec<CapacityFactorSite>),
}

impl CapacityFactorSource {
    /// Get the capacity factor for each of `locations`, in the same order
    pub fn resolve(&self, locations: &[Coordinates]) -> Result<Vec<Dimensionless>> {
        match self {
            Self::Uniform(capacity_factor) => Ok(vec![*capacity_factor; locations.len()]),
            Self::Sites(sites) => {
                let (points, capacity_factors): (Vec<_>, Vec<_>) = sites
                    .iter()
                    .map(|site| (site.location, site.capacity_factor))
                    .unzip();
                nearest_capacity_factor(locations, &points, &capacity_factors)
            }
        }
    }
}

/// A map of [`CapacityFactorSource`]s, keyed by fuel
pub type CapacityFactorSourceMap = IndexMap<Fuel, CapacityFactorSource>;

/// Capacity factors for each replacement fuel, aligned with the order of the plants assessed
pub type PlantCapacityFactors = IndexMap<Fuel, Vec<Dimensionless>>;

/// Index of the sample point nearest to `query`.
///
/// If several points are equally near, the first of them is chosen. Returns `None` if there are no
/// sample points.
pub fn nearest_site_index(query: &Coordinates, sample_points: &[Coordinates]) -> Option<usize> {
    sample_points
        .iter()
        .map(|point| query.squared_distance(point))
        .position_min_by(f64::total_cmp)
}

/// Find the capacity factor of the nearest sample point for each query point.
///
/// # Arguments
///
/// * `query_points` - Locations to find capacity factors for
/// * `sample_points` - Locations of the sampled sites
/// * `sample_capacity_factors` - Capacity factor at each sampled site
///
/// # Returns
///
/// One capacity factor per query point, or an error if there are no sample points or the sample
/// slices differ in length.
pub fn nearest_capacity_factor(
    query_points: &[Coordinates],
    sample_points: &[Coordinates],
    sample_capacity_factors: &[Dimensionless],
) -> Result<Vec<Dimensionless>> {
    ensure!(!sample_points.is_empty(), "No sampled sites provided");
    ensure!(
        sample_points.len() == sample_capacity_factors.len(),
        "Got {} sampled sites but {} capacity factors",
        sample_points.len(),
        sample_capacity_factors.len()
    );

    query_points
        .iter()
        .map(|query| {
            let idx = nearest_site_index(query, sample_points)
                .context("No sampled sites provided")?;
            Ok(sample_capacity_factors[idx])
        })
        .collect()
}

/// Resolve the capacity factor of each fuel in `fuels` for each plant location
pub fn resolve_capacity_factors(
    sources: &CapacityFactorSourceMap,
    fuels: &[Fuel],
    locations: &[Coordinates],
) -> Result<PlantCapacityFactors> {
    fuels
        .iter()
        .map(|fuel| {
            let source = sources
                .get(fuel)
                .with_context(|| format!("No capacity factor provided for fuel {fuel}"))?;
            Ok((*fuel, source.resolve(locations)?))
        })
        .collect()
}
