//! The model represents the static input data provided by the user.
use crate::capacity_factor::CapacityFactorSourceMap;
use crate::cost::CostTables;
use crate::fuel::FuelParameterMap;
use crate::plant::Plant;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Existing plants, in file order
    pub plants: Vec<Plant>,
    /// Fuel prices and plant costs by state
    pub cost_tables: CostTables,
    /// Heat rates and carbon contents of fuels
    pub fuel_parameters: FuelParameterMap,
    /// Where the capacity factor of each fuel comes from
    pub capacity_factor_sources: CapacityFactorSourceMap,
}
