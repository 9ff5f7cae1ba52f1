//! The metrics by which replacement candidates are compared.
use anyhow::{Result, bail};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// A metric used to choose between replacement candidates.
///
/// The candidate with the lowest value is chosen.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
    strum::EnumIter,
)]
pub enum Metric {
    /// Replacement cost minus existing cost ($/yr)
    #[string = "cost"]
    CostDelta,
    /// Cost difference divided by emissions avoided ($/tonne)
    #[string = "cost_per_emissions_abated"]
    CostPerEmissionsAbated,
    /// Existing emissions minus replacement emissions (tonnes/yr)
    #[string = "emissions"]
    EmissionsDelta,
    /// Existing cost per unit generation ($/kWh)
    #[string = "existing_cost_per_kwh"]
    ExistingCostPerEnergy,
    /// Replacement cost per unit generation ($/kWh)
    #[string = "new_cost_per_kwh"]
    NewCostPerEnergy,
}

impl Metric {
    /// Get the metric with the given numeric index (0 to 4)
    pub fn from_index(index: usize) -> Result<Self> {
        Ok(match index {
            0 => Self::CostDelta,
            1 => Self::CostPerEmissionsAbated,
            2 => Self::EmissionsDelta,
            3 => Self::ExistingCostPerEnergy,
            4 => Self::NewCostPerEnergy,
            _ => bail!("Metric index must be between 0 and 4 (got {index})"),
        })
    }

    /// The numeric index of the metric
    pub fn index(self) -> usize {
        self as usize
    }
}
