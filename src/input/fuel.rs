//! Code for reading the fuels CSV file.
use super::{deserialise_optional_proportion_nonzero, input_err_msg, read_csv};
use crate::fuel::{Fuel, FuelParameterMap, FuelParameters};
use crate::units::{CarbonContent, Dimensionless, HeatRate};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const FUELS_FILE_NAME: &str = "fuels.csv";

/// A fuel record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct FuelRaw {
    fuel: Fuel,
    heat_rate_btu_per_kwh: HeatRate,
    carbon_content_tonnes_per_mmbtu: CarbonContent,
    #[serde(default, deserialize_with = "deserialise_optional_proportion_nonzero")]
    capacity_factor: Option<Dimensionless>,
}

/// Capacity factors which apply everywhere, keyed by fuel
pub type UniformCapacityFactorMap = IndexMap<Fuel, Dimensionless>;

/// Read fuel parameters from the fuels CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The parameters of each fuel, along with the capacity factors of those fuels which have one.
pub fn read_fuels(model_dir: &Path) -> Result<(FuelParameterMap, UniformCapacityFactorMap)> {
    let file_path = model_dir.join(FUELS_FILE_NAME);
    let fuels = read_csv(&file_path)?;
    read_fuels_from_iter(fuels).with_context(|| input_err_msg(&file_path))
}

fn read_fuels_from_iter<I>(iter: I) -> Result<(FuelParameterMap, UniformCapacityFactorMap)>
where
    I: Iterator<Item = FuelRaw>,
{
    let mut parameters = FuelParameterMap::new();
    let mut capacity_factors = UniformCapacityFactorMap::new();
    for record in iter {
        let heat_rate = record.heat_rate_btu_per_kwh;
        ensure!(
            heat_rate.is_finite() && heat_rate >= HeatRate(0.0),
            "Heat rate for fuel {} must be a finite number >= 0",
            record.fuel
        );
        let carbon_content = record.carbon_content_tonnes_per_mmbtu;
        ensure!(
            carbon_content.is_finite() && carbon_content >= CarbonContent(0.0),
            "Carbon content for fuel {} must be a finite number >= 0",
            record.fuel
        );

        let existing = parameters.insert(
            record.fuel,
            FuelParameters {
                heat_rate,
                carbon_content,
            },
        );
        ensure!(
            existing.is_none(),
            "Duplicate entry for fuel {}",
            record.fuel
        );

        if let Some(capacity_factor) = record.capacity_factor {
            capacity_factors.insert(record.fuel, capacity_factor);
        }
    }

    Ok((parameters, capacity_factors))
}
