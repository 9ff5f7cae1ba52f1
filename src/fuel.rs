//! Fuels (generating technologies) and their physical parameters.
use crate::units::{CarbonContent, HeatRate};
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// A fuel or generating technology, either of an existing plant or of a replacement
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
    strum::EnumIter,
)]
pub enum Fuel {
    /// Coal-fired steam plant
    #[string = "Coal"]
    Coal,
    /// Natural gas plant of unspecified type
    #[string = "Gas"]
    Gas,
    /// Natural gas combined cycle
    #[string = "Gas_CC"]
    GasCombinedCycle,
    /// Natural gas simple cycle (combustion turbine)
    #[string = "Gas_SC"]
    GasSimpleCycle,
    /// Oil-fired plant
    #[string = "Oil"]
    Oil,
    /// Onshore wind
    #[string = "Wind"]
    Wind,
    /// Utility-scale solar PV
    #[string = "Solar"]
    Solar,
}

impl Fuel {
    /// Whether the fuel is a fossil fuel
    pub fn is_fossil(self) -> bool {
        !matches!(self, Self::Wind | Self::Solar)
    }
}

/// The fuels whose plants are considered for replacement by default
pub fn default_fossil_fuels() -> Vec<Fuel> {
    vec![
        Fuel::Coal,
        Fuel::Gas,
        Fuel::GasSimpleCycle,
        Fuel::GasCombinedCycle,
        Fuel::Oil,
    ]
}

/// The fuels which may replace an existing plant by default
pub fn default_replacement_fuels() -> Vec<Fuel> {
    vec![Fuel::Gas, Fuel::Solar, Fuel::Wind]
}

/// Physical parameters of a fuel used when it replaces an existing plant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelParameters {
    /// Fuel input per unit electricity generated (Btu/kWh)
    pub heat_rate: HeatRate,
    /// CO2 emitted per unit fuel burned (tonnes/mmBtu)
    pub carbon_content: CarbonContent,
}

/// A map of [`FuelParameters`], keyed by fuel
pub type FuelParameterMap = IndexMap<Fuel, FuelParameters>;
