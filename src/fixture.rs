//! Fixtures for tests
use crate::capacity_factor::{CapacityFactorSource, CapacityFactorSourceMap, PlantCapacityFactors};
use crate::cost::{CostScenario, CostTables, Financing, PlantCost};
use crate::fuel::{Fuel, FuelParameterMap, FuelParameters};
use crate::model::{Model, ModelParameters};
use crate::plant::{Plant, StateID};
use crate::replacement::{Metric, ReplacementDecision, ReplacementOptions};
use crate::units::{
    Capacity, CarbonContent, Dimensionless, Emissions, Energy, FuelEnergy, HeatRate,
    MoneyPerFuelEnergy, MoneyPerKW, MoneyPerKWYear, MoneyPerMWh,
};
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn plant() -> Plant {
    Plant {
        id: "plant1".into(),
        state: "TX".into(),
        latitude: 31.0,
        longitude: -97.0,
        commissioning_year: 2000,
        primary_fuel: Fuel::Coal,
        capacity: Capacity(100.0),
        generation: Energy(4e8),
        fuel_consumption: FuelEnergy(4e6),
        emissions: Emissions(2e5),
    }
}

/// Plant costs without storage
fn plant_cost(variable_om: f64, fixed_om: f64, capital_cost: f64) -> PlantCost {
    PlantCost {
        variable_om: MoneyPerMWh(variable_om),
        fixed_om: MoneyPerKWYear(fixed_om),
        capital_cost: MoneyPerKW(capital_cost),
        storage_capital: MoneyPerKW(0.0),
        storage_om: MoneyPerKWYear(0.0),
    }
}

/// Costs for Texas only
#[fixture]
pub fn cost_tables() -> CostTables {
    let texas = StateID::from("TX");
    let solar = PlantCost {
        storage_capital: MoneyPerKW(300.0),
        storage_om: MoneyPerKWYear(8.0),
        ..plant_cost(0.0, 20.0, 1100.0)
    };
    let costs = [
        (Fuel::Coal, plant_cost(4.5, 40.0, 3500.0), 2.0),
        (Fuel::Gas, plant_cost(2.0, 12.0, 1000.0), 3.0),
        (Fuel::Wind, plant_cost(0.0, 26.0, 1400.0), 0.0),
        (Fuel::Solar, solar, 0.0),
    ];

    let mut tables = CostTables::default();
    for (fuel, plant_cost, price) in costs {
        tables
            .plant_costs
            .insert((texas.clone(), fuel), plant_cost);
        tables
            .fuel_prices
            .insert((texas.clone(), fuel), MoneyPerFuelEnergy(price));
    }

    tables
}

#[fixture]
pub fn gas_scenario() -> CostScenario {
    CostScenario::new(&plant_cost(2.0, 12.0, 1000.0), MoneyPerFuelEnergy(3.0))
}

#[fixture]
pub fn financing() -> Financing {
    Financing {
        discount_rate: Dimensionless(0.05),
        lifetime: 30,
    }
}

#[fixture]
pub fn fuel_parameters() -> FuelParameterMap {
    let parameters = |heat_rate, carbon_content| FuelParameters {
        heat_rate: HeatRate(heat_rate),
        carbon_content: CarbonContent(carbon_content),
    };

    FuelParameterMap::from([
        (Fuel::Gas, parameters(6500.0, 0.05306)),
        (Fuel::Wind, parameters(0.0, 0.0)),
        (Fuel::Solar, parameters(0.0, 0.0)),
    ])
}

/// Capacity factors for a single plant
#[fixture]
pub fn capacity_factors() -> PlantCapacityFactors {
    PlantCapacityFactors::from([
        (Fuel::Gas, vec![Dimensionless(0.55)]),
        (Fuel::Solar, vec![Dimensionless(0.25)]),
        (Fuel::Wind, vec![Dimensionless(0.35)]),
    ])
}

#[fixture]
pub fn replacement_options(financing: Financing) -> ReplacementOptions {
    ReplacementOptions {
        measure_year: 2021,
        financing,
        existing_capital_cost: MoneyPerKW(0.0),
        original_payments_per_year: 1,
        metric: Metric::CostPerEmissionsAbated,
        subset: vec![Fuel::Gas, Fuel::Solar, Fuel::Wind],
    }
}

#[fixture]
pub fn decision() -> ReplacementDecision {
    ReplacementDecision {
        plant_id: "plant1".into(),
        state: "TX".into(),
        primary_fuel: Fuel::Coal,
        replacement_fuel: Fuel::Wind,
        capacity: Capacity(100.0),
        generation: Energy(4e8),
        emissions: Emissions(2e5),
        metric: 28.42257659480378,
        emissions_reduction: Emissions(2e5),
    }
}

/// A model with a single plant and default parameters
#[fixture]
pub fn model(
    plant: Plant,
    cost_tables: CostTables,
    fuel_parameters: FuelParameterMap,
) -> Model {
    let capacity_factor_sources = CapacityFactorSourceMap::from([
        (Fuel::Gas, CapacityFactorSource::Uniform(Dimensionless(0.55))),
        (Fuel::Solar, CapacityFactorSource::Uniform(Dimensionless(0.25))),
        (Fuel::Wind, CapacityFactorSource::Uniform(Dimensionless(0.35))),
    ]);

    Model {
        model_path: PathBuf::from("model"),
        parameters: toml::from_str::<ModelParameters>("").unwrap(),
        plants: vec![plant],
        cost_tables,
        fuel_parameters,
        capacity_factor_sources,
    }
}
