//! Annualised costs of building and operating generating capacity.
//!
//! Costs are assembled from per-state cost tables: a fuel price for each (state, fuel) pair and a
//! set of plant cost parameters for each (state, fuel) pair. Capital costs are annualised with a
//! level payment over the financing lifetime.
use crate::finance::level_payment;
use crate::fuel::Fuel;
use crate::plant::StateID;
use crate::units::{
    Capacity, Dimensionless, Energy, FuelEnergy, Money, MoneyPerFuelEnergy, MoneyPerKW,
    MoneyPerKWYear, MoneyPerMWh,
};
use anyhow::{Context, Result, ensure};
use std::collections::HashMap;

/// Cost parameters for a plant of a particular fuel in a particular state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantCost {
    /// Variable O&M ($/MWh)
    pub variable_om: MoneyPerMWh,
    /// Fixed O&M ($/kW-yr)
    pub fixed_om: MoneyPerKWYear,
    /// Overnight capital cost ($/kW)
    pub capital_cost: MoneyPerKW,
    /// Capital cost of any storage built alongside the plant ($/kW)
    pub storage_capital: MoneyPerKW,
    /// Fixed O&M of any storage built alongside the plant ($/kW-yr)
    pub storage_om: MoneyPerKWYear,
}

impl PlantCost {
    /// Apply a capital incentive and a storage cost multiplier.
    ///
    /// `credit` is the fraction added to capital and storage capital (negative for a tax credit)
    /// and `grant` is added to capital afterwards. Storage costs are then scaled by
    /// `storage_multiplier`.
    pub fn with_incentive(
        &self,
        credit: Dimensionless,
        grant: MoneyPerKW,
        storage_multiplier: Dimensionless,
    ) -> Self {
        let credit_factor = Dimensionless(1.0) + credit;
        Self {
            capital_cost: self.capital_cost * credit_factor + grant,
            storage_capital: self.storage_capital * credit_factor * storage_multiplier,
            storage_om: self.storage_om * storage_multiplier,
            ..*self
        }
    }
}

/// Everything needed to cost a plant of a given fuel in a given state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostScenario {
    /// Variable O&M ($/MWh)
    pub variable_om: MoneyPerMWh,
    /// Fixed O&M ($/kW-yr)
    pub fixed_om: MoneyPerKWYear,
    /// Overnight capital cost ($/kW)
    pub capital_cost: MoneyPerKW,
    /// Storage capital cost ($/kW)
    pub storage_capital: MoneyPerKW,
    /// Storage O&M ($/kW-yr)
    pub storage_om: MoneyPerKWYear,
    /// Fuel price ($/mmBtu)
    pub fuel_price: MoneyPerFuelEnergy,
}

impl CostScenario {
    /// Combine plant cost parameters with a fuel price
    pub fn new(plant_cost: &PlantCost, fuel_price: MoneyPerFuelEnergy) -> Self {
        Self {
            variable_om: plant_cost.variable_om,
            fixed_om: plant_cost.fixed_om,
            capital_cost: plant_cost.capital_cost,
            storage_capital: plant_cost.storage_capital,
            storage_om: plant_cost.storage_om,
            fuel_price,
        }
    }
}

/// Terms under which new capital is financed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financing {
    /// Annual discount rate
    pub discount_rate: Dimensionless,
    /// Number of years over which capital is repaid
    pub lifetime: u32,
}

/// How a plant operates over a year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingProfile {
    /// Annual generation (kWh)
    pub generation: Energy,
    /// Installed capacity (MW)
    pub capacity: Capacity,
    /// Annual fuel burned (mmBtu)
    pub fuel_demand: FuelEnergy,
}

/// The components of a plant's annual cost
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnnualCost {
    /// Variable O&M
    pub variable_om: Money,
    /// Fixed O&M, including storage O&M
    pub fixed_om: Money,
    /// Fuel
    pub fuel: Money,
    /// Annual payment on capital, including storage capital
    pub capital: Money,
}

impl AnnualCost {
    /// Total annual cost
    pub fn total(&self) -> Money {
        self.variable_om + self.fixed_om + self.fuel + self.capital
    }
}

/// Calculate the annual cost of each cost component for a plant.
///
/// Capital is repaid annually over the financing lifetime.
pub fn annual_cost_breakdown(
    scenario: &CostScenario,
    financing: &Financing,
    profile: &OperatingProfile,
) -> Result<AnnualCost> {
    let principal = (scenario.capital_cost + scenario.storage_capital).per_mw() * profile.capacity;
    let capital = level_payment(principal, financing.discount_rate, financing.lifetime, 1)?;

    Ok(AnnualCost {
        variable_om: scenario.variable_om.per_kwh() * profile.generation,
        fixed_om: (scenario.fixed_om + scenario.storage_om).per_mw() * profile.capacity,
        fuel: scenario.fuel_price * profile.fuel_demand,
        capital,
    })
}

/// Calculate the total annual cost of building and running a plant
pub fn annualized_total_cost(
    scenario: &CostScenario,
    financing: &Financing,
    profile: &OperatingProfile,
) -> Result<Money> {
    Ok(annual_cost_breakdown(scenario, financing, profile)?.total())
}

/// Calculate [`annualized_total_cost`] for parallel slices of scenarios and operating profiles
pub fn annualized_total_costs(
    scenarios: &[CostScenario],
    profiles: &[OperatingProfile],
    financing: &Financing,
) -> Result<Vec<Money>> {
    ensure!(
        scenarios.len() == profiles.len(),
        "Got {} cost scenarios but {} operating profiles",
        scenarios.len(),
        profiles.len()
    );

    scenarios
        .iter()
        .zip(profiles)
        .map(|(scenario, profile)| annualized_total_cost(scenario, financing, profile))
        .collect()
}

/// Fuel prices, keyed by state and fuel
pub type FuelPriceMap = HashMap<(StateID, Fuel), MoneyPerFuelEnergy>;

/// Plant cost parameters, keyed by state and fuel
pub type PlantCostMap = HashMap<(StateID, Fuel), PlantCost>;

/// The regional cost tables used to cost existing and replacement plants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTables {
    /// Fuel prices by state and fuel
    pub fuel_prices: FuelPriceMap,
    /// Plant cost parameters by state and fuel
    pub plant_costs: PlantCostMap,
}

impl CostTables {
    /// Look up the price of `fuel` in `state`
    pub fn fuel_price(&self, state: &StateID, fuel: Fuel) -> Result<MoneyPerFuelEnergy> {
        self.fuel_prices
            .get(&(state.clone(), fuel))
            .copied()
            .with_context(|| format!("No fuel price found for fuel {fuel} in state {state}"))
    }

    /// Look up the plant cost parameters for `fuel` in `state`
    pub fn plant_cost(&self, state: &StateID, fuel: Fuel) -> Result<&PlantCost> {
        self.plant_costs
            .get(&(state.clone(), fuel))
            .with_context(|| format!("No plant costs found for fuel {fuel} in state {state}"))
    }

    /// Look up the full cost scenario for `fuel` in `state`
    pub fn scenario(&self, state: &StateID, fuel: Fuel) -> Result<CostScenario> {
        let plant_cost = self.plant_cost(state, fuel)?;
        let fuel_price = self.fuel_price(state, fuel)?;

        Ok(CostScenario::new(plant_cost, fuel_price))
    }
}
