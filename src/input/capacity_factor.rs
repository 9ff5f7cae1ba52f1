//! Code for reading capacity factor site samples from a CSV file.
use super::fuel::UniformCapacityFactorMap;
use super::{deserialise_proportion_nonzero, input_err_msg, read_csv_optional};
use crate::capacity_factor::{
    CapacityFactorSite, CapacityFactorSource, CapacityFactorSourceMap, Coordinates,
};
use crate::fuel::Fuel;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::Path;

const CAPACITY_FACTOR_SITES_FILE_NAME: &str = "capacity_factor_sites.csv";

/// A sampled site retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct CapacityFactorSiteRaw {
    fuel: Fuel,
    latitude: f64,
    longitude: f64,
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    capacity_factor: Dimensionless,
}

/// Work out where each fuel's capacity factor comes from.
///
/// Fuels with sampled sites in the (optional) sites file use the nearest site. Other fuels use
/// the capacity factor given in the fuels file. Every replacement fuel must have one or the other.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `uniform_capacity_factors` - Capacity factors from the fuels file
/// * `replacement_fuels` - Fuels which will be considered as replacements
pub fn read_capacity_factor_sources(
    model_dir: &Path,
    uniform_capacity_factors: UniformCapacityFactorMap,
    replacement_fuels: &[Fuel],
) -> Result<CapacityFactorSourceMap> {
    let file_path = model_dir.join(CAPACITY_FACTOR_SITES_FILE_NAME);
    let sites = read_csv_optional(&file_path)?;
    let sites = read_sites_from_iter(sites).with_context(|| input_err_msg(&file_path))?;

    let mut sources: CapacityFactorSourceMap = uniform_capacity_factors
        .into_iter()
        .map(|(fuel, capacity_factor)| (fuel, CapacityFactorSource::Uniform(capacity_factor)))
        .collect();
    for (fuel, sites) in sites {
        debug!("Using {} sampled sites for capacity factors of {fuel}", sites.len());
        sources.insert(fuel, CapacityFactorSource::Sites(sites));
    }

    for fuel in replacement_fuels {
        ensure!(
            sources.contains_key(fuel),
            "No capacity factor provided for replacement fuel {fuel}"
        );
    }

    Ok(sources)
}

fn read_sites_from_iter<I>(iter: I) -> Result<IndexMap<Fuel, Vec<CapacityFactorSite>>>
where
    I: Iterator<Item = CapacityFactorSiteRaw>,
{
    let mut sites = IndexMap::<_, Vec<_>>::new();
    for record in iter {
        ensure!(
            record.latitude.is_finite() && record.longitude.is_finite(),
            "Site location for fuel {} must be finite",
            record.fuel
        );

        sites.entry(record.fuel).or_default().push(CapacityFactorSite {
            location: Coordinates {
                latitude: record.latitude,
                longitude: record.longitude,
            },
            capacity_factor: record.capacity_factor,
        });
    }

    Ok(sites)
}
