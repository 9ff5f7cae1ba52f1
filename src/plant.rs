//! Existing generating units and the checks applied to their records.
use crate::capacity_factor::Coordinates;
use crate::fuel::Fuel;
use crate::id::define_id_type;
use crate::units::{Capacity, Dimensionless, Emissions, Energy, FuelEnergy};
use anyhow::{Context, Result, ensure};
use log::{info, warn};
use serde::Deserialize;

define_id_type! {PlantID}
define_id_type! {StateID}

/// The lowest capacity factor which a plant record may imply
pub const MIN_CAPACITY_FACTOR: Dimensionless = Dimensionless(0.0);

/// The highest capacity factor which a plant record may imply.
///
/// Slightly above 1 to allow for seasonal variation in capacity and efficiency.
pub const MAX_CAPACITY_FACTOR: Dimensionless = Dimensionless(1.05);

/// An existing generating unit
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plant {
    /// A unique identifier for the plant
    pub id: PlantID,
    /// Two-letter code of the state the plant is in (e.g. "TX")
    pub state: StateID,
    /// Latitude of the plant in degrees
    pub latitude: f64,
    /// Longitude of the plant in degrees
    pub longitude: f64,
    /// The year in which the plant was commissioned
    pub commissioning_year: u32,
    /// The fuel the plant currently burns
    pub primary_fuel: Fuel,
    /// Nameplate capacity (MW)
    pub capacity: Capacity,
    /// Annual generation (kWh)
    pub generation: Energy,
    /// Annual fuel consumption (mmBtu)
    pub fuel_consumption: FuelEnergy,
    /// Annual CO2 emissions (tonnes)
    pub emissions: Emissions,
}

impl Plant {
    /// The location of the plant
    pub fn location(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// The capacity factor implied by the plant's capacity and generation
    pub fn capacity_factor(&self) -> Dimensionless {
        self.capacity.capacity_factor(self.generation)
    }

    /// The age of the plant in `year`
    pub fn age(&self, year: u32) -> Result<u32> {
        year.checked_sub(self.commissioning_year).with_context(|| {
            format!(
                "Invalid input record: plant {} was commissioned in {}, after {year}",
                self.id, self.commissioning_year
            )
        })
    }

    /// Check that the record describes a plant which can be assessed
    pub fn validate(&self) -> Result<()> {
        self.check_record()
            .with_context(|| format!("Invalid input record: plant {}", self.id))
    }

    fn check_record(&self) -> Result<()> {
        ensure!(
            self.capacity.is_finite() && self.capacity > Capacity(0.0),
            "Capacity must be a finite number greater than zero"
        );
        ensure!(
            self.generation.is_finite() && self.generation > Energy(0.0),
            "Generation must be a finite number greater than zero"
        );
        ensure!(
            self.fuel_consumption.is_finite() && self.fuel_consumption > FuelEnergy(0.0),
            "Fuel consumption must be a finite number greater than zero"
        );
        ensure!(
            self.emissions.is_finite() && self.emissions > Emissions(0.0),
            "Emissions must be a finite number greater than zero"
        );
        ensure!(
            self.latitude.is_finite() && self.longitude.is_finite(),
            "Location must be finite"
        );

        let capacity_factor = self.capacity_factor();
        ensure!(
            (MIN_CAPACITY_FACTOR..=MAX_CAPACITY_FACTOR).contains(&capacity_factor),
            "Implied capacity factor {} is outside the range [{}, {}]",
            capacity_factor.value(),
            MIN_CAPACITY_FACTOR.value(),
            MAX_CAPACITY_FACTOR.value()
        );

        Ok(())
    }
}

/// Remove plants which cannot be assessed.
///
/// A plant is dropped if its record is invalid (see [`Plant::validate`]) or if its primary fuel is
/// not one of `fuels`. Each dropped plant is reported with a warning.
pub fn clean_plants(plants: Vec<Plant>, fuels: &[Fuel]) -> Vec<Plant> {
    let total = plants.len();
    let cleaned: Vec<_> = plants
        .into_iter()
        .filter(|plant| {
            if !fuels.contains(&plant.primary_fuel) {
                warn!(
                    "Dropping plant {}: fuel {} is not being considered for replacement",
                    plant.id, plant.primary_fuel
                );
                return false;
            }

            if let Err(err) = plant.validate() {
                warn!("Dropping plant: {err:#}");
                return false;
            }

            true
        })
        .collect();

    info!(
        "{} of {total} plants are eligible for replacement",
        cleaned.len()
    );

    cleaned
}
