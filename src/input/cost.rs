//! Code for reading the fuel price, plant cost and tax credit CSV files.
use super::{input_err_msg, read_csv, try_insert};
use crate::cost::{CostTables, FuelPriceMap, PlantCost, PlantCostMap};
use crate::fuel::Fuel;
use crate::model::ModelParameters;
use crate::plant::StateID;
use crate::units::{Dimensionless, MoneyPerFuelEnergy, MoneyPerKW, MoneyPerKWYear, MoneyPerMWh};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const FUEL_PRICES_FILE_NAME: &str = "fuel_prices.csv";
const PLANT_COSTS_FILE_NAME: &str = "plant_costs.csv";
const TAX_CREDITS_FILE_NAME: &str = "tax_credits.csv";

/// The state name used for credits which apply in every state
const NATIONAL: &str = "national";

/// A fuel price record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct FuelPriceRaw {
    state: StateID,
    fuel: Fuel,
    price_per_mmbtu: MoneyPerFuelEnergy,
}

/// A plant cost record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct PlantCostRaw {
    state: StateID,
    fuel: Fuel,
    variable_om_per_mwh: MoneyPerMWh,
    fixed_om_per_kw_year: MoneyPerKWYear,
    capital_cost_per_kw: MoneyPerKW,
    storage_cap_per_kw: MoneyPerKW,
    storage_om_per_kw_year: MoneyPerKWYear,
}

impl PlantCostRaw {
    /// Check that all costs are finite and non-negative
    fn validate(&self) -> Result<()> {
        let costs = [
            ("variable_om_per_mwh", self.variable_om_per_mwh.value()),
            ("fixed_om_per_kw_year", self.fixed_om_per_kw_year.value()),
            ("capital_cost_per_kw", self.capital_cost_per_kw.value()),
            ("storage_cap_per_kw", self.storage_cap_per_kw.value()),
            ("storage_om_per_kw_year", self.storage_om_per_kw_year.value()),
        ];
        for (name, value) in costs {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} for fuel {} in state {} must be a finite number >= 0",
                self.fuel,
                self.state
            );
        }

        Ok(())
    }
}

/// How a tax credit record adjusts capital costs
#[derive(PartialEq, Debug, Clone, Copy, DeserializeLabeledStringEnum)]
enum IncentiveKind {
    /// A fraction of capital cost
    #[string = "credit"]
    Credit,
    /// A fixed amount ($/kW)
    #[string = "grant"]
    Grant,
}

/// A tax credit record retrieved from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct TaxCreditRaw {
    state: StateID,
    fuel: Fuel,
    kind: IncentiveKind,
    amount: f64,
}

/// Capital incentives for one fuel in one state
#[derive(PartialEq, Debug, Default, Clone, Copy)]
struct Incentive {
    /// Sum of credits, as a fraction added to capital costs
    credit: Dimensionless,
    /// A fixed adjustment to capital costs, which replaces the state's credits
    grant: Option<MoneyPerKW>,
}

/// Incentives keyed by state and fuel. National credits are keyed by [`NATIONAL`].
type IncentiveMap = IndexMap<(StateID, Fuel), Incentive>;

/// Read the fuel prices and plant costs for each state.
///
/// Plant costs are adjusted for tax credits (if enabled) and the storage cost multiplier.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `parameters` - Model parameters
pub fn read_cost_tables(model_dir: &Path, parameters: &ModelParameters) -> Result<CostTables> {
    let file_path = model_dir.join(FUEL_PRICES_FILE_NAME);
    let fuel_prices = read_fuel_prices_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let incentives = if parameters.tax_credits {
        let file_path = model_dir.join(TAX_CREDITS_FILE_NAME);
        info!("Applying tax credits from {}", file_path.display());
        read_tax_credits_from_iter(read_csv(&file_path)?)
            .with_context(|| input_err_msg(&file_path))?
    } else {
        IncentiveMap::new()
    };

    let file_path = model_dir.join(PLANT_COSTS_FILE_NAME);
    let plant_costs = read_plant_costs_from_iter(read_csv(&file_path)?)
        .and_then(|costs| {
            adjust_plant_costs(costs, &incentives, parameters.storage_cost_multiplier)
        })
        .with_context(|| input_err_msg(&file_path))?;

    Ok(CostTables {
        fuel_prices,
        plant_costs,
    })
}

fn read_fuel_prices_from_iter<I>(iter: I) -> Result<FuelPriceMap>
where
    I: Iterator<Item = FuelPriceRaw>,
{
    let mut map = FuelPriceMap::new();
    for record in iter {
        let price = record.price_per_mmbtu;
        ensure!(
            price.is_finite() && price >= MoneyPerFuelEnergy(0.0),
            "Price for fuel {} in state {} must be a finite number >= 0",
            record.fuel,
            record.state
        );

        try_insert(&mut map, (record.state, record.fuel), price)
            .context("Duplicate fuel price entry")?;
    }

    Ok(map)
}

fn read_plant_costs_from_iter<I>(iter: I) -> Result<PlantCostMap>
where
    I: Iterator<Item = PlantCostRaw>,
{
    let mut map = PlantCostMap::new();
    for record in iter {
        record.validate()?;

        let cost = PlantCost {
            variable_om: record.variable_om_per_mwh,
            fixed_om: record.fixed_om_per_kw_year,
            capital_cost: record.capital_cost_per_kw,
            storage_capital: record.storage_cap_per_kw,
            storage_om: record.storage_om_per_kw_year,
        };
        try_insert(&mut map, (record.state, record.fuel), cost)
            .context("Duplicate plant cost entry")?;
    }

    Ok(map)
}

/// Fold tax credit records into incentives for each state and fuel.
///
/// Credits for the same state and fuel are summed. Records for fossil fuels are ignored.
fn read_tax_credits_from_iter<I>(iter: I) -> Result<IncentiveMap>
where
    I: Iterator<Item = TaxCreditRaw>,
{
    let mut map = IncentiveMap::new();
    for TaxCreditRaw {
        state,
        fuel,
        kind,
        amount,
    } in iter
    {
        ensure!(
            amount.is_finite(),
            "Tax credit for fuel {fuel} in state {state} must be a finite number"
        );
        if fuel.is_fossil() {
            warn!("Ignoring tax credit for fossil fuel {fuel} in state {state}");
            continue;
        }

        let incentive = map.entry((state.clone(), fuel)).or_default();
        match kind {
            IncentiveKind::Credit => incentive.credit = incentive.credit + Dimensionless(amount),
            IncentiveKind::Grant => {
                ensure!(
                    &*state.0 != NATIONAL,
                    "Grants must be for a single state (fuel {fuel})"
                );
                ensure!(
                    incentive.grant.is_none(),
                    "Duplicate grant for fuel {fuel} in state {state}"
                );
                incentive.grant = Some(MoneyPerKW(amount));
            }
        }
    }

    Ok(map)
}

/// Apply incentives and the storage cost multiplier to every plant cost entry.
///
/// Each state's credits are added to the national credit for the fuel, unless the state has a
/// grant, in which case only the national credit and the grant apply.
fn adjust_plant_costs(
    plant_costs: PlantCostMap,
    incentives: &IncentiveMap,
    storage_multiplier: Dimensionless,
) -> Result<PlantCostMap> {
    let national = StateID::from(NATIONAL);
    plant_costs
        .into_iter()
        .map(|((state, fuel), cost)| {
            let national_credit = incentives
                .get(&(national.clone(), fuel))
                .map_or(Dimensionless(0.0), |incentive| incentive.credit);
            let (credit, grant) = match incentives.get(&(state.clone(), fuel)) {
                Some(Incentive {
                    grant: Some(grant), ..
                }) => (national_credit, *grant),
                Some(incentive) => (national_credit + incentive.credit, MoneyPerKW(0.0)),
                None => (national_credit, MoneyPerKW(0.0)),
            };

            let cost = cost.with_incentive(credit, grant, storage_multiplier);
            ensure!(
                cost.capital_cost.is_finite()
                    && cost.capital_cost >= MoneyPerKW(0.0)
                    && cost.storage_capital.is_finite()
                    && cost.storage_capital >= MoneyPerKW(0.0),
                "Adjusted capital cost for {fuel} in state {state} must be a finite number >= 0"
            );

            Ok(((state, fuel), cost))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn price(state: &str, fuel: Fuel, price: f64) -> FuelPriceRaw {
        FuelPriceRaw {
            state: state.into(),
            fuel,
            price_per_mmbtu: MoneyPerFuelEnergy(price),
        }
    }

    fn plant_cost(state: &str, fuel: Fuel, capital_cost: f64) -> PlantCostRaw {
        PlantCostRaw {
            state: state.into(),
            fuel,
            variable_om_per_mwh: MoneyPerMWh(2.0),
            fixed_om_per_kw_year: MoneyPerKWYear(12.0),
            capital_cost_per_kw: MoneyPerKW(capital_cost),
            storage_cap_per_kw: MoneyPerKW(0.0),
            storage_om_per_kw_year: MoneyPerKWYear(0.0),
        }
    }

    #[test]
    fn test_read_fuel_prices_from_iter() {
        let prices = read_fuel_prices_from_iter(
            [price("TX", Fuel::Gas, 3.0), price("TX", Fuel::Coal, 2.0)].into_iter(),
        )
        .unwrap();
        assert_eq!(prices[&(StateID::from("TX"), Fuel::Gas)], MoneyPerFuelEnergy(3.0));

        assert_error!(
            read_fuel_prices_from_iter(
                [price("TX", Fuel::Gas, 3.0), price("TX", Fuel::Gas, 4.0)].into_iter()
            ),
            "Duplicate fuel price entry"
        );
        assert_error!(
            read_fuel_prices_from_iter([price("TX", Fuel::Gas, -1.0)].into_iter()),
            "Price for fuel Gas in state TX must be a finite number >= 0"
        );
    }

    #[test]
    fn test_read_plant_costs_from_iter() {
        let costs = read_plant_costs_from_iter(
            [
                plant_cost("TX", Fuel::Gas, 1000.0),
                plant_cost("CA", Fuel::Gas, 1200.0),
            ]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(
            costs[&(StateID::from("CA"), Fuel::Gas)].capital_cost,
            MoneyPerKW(1200.0)
        );

        assert_error!(
            read_plant_costs_from_iter(
                [
                    plant_cost("TX", Fuel::Gas, 1000.0),
                    plant_cost("TX", Fuel::Gas, 1200.0)
                ]
                .into_iter()
            ),
            "Duplicate plant cost entry"
        );
        assert_error!(
            read_plant_costs_from_iter([plant_cost("TX", Fuel::Wind, f64::NAN)].into_iter()),
            "capital_cost_per_kw for fuel Wind in state TX must be a finite number >= 0"
        );
    }

    fn tax_credit(state: &str, fuel: Fuel, kind: IncentiveKind, amount: f64) -> TaxCreditRaw {
        TaxCreditRaw {
            state: state.into(),
            fuel,
            kind,
            amount,
        }
    }

    /// A 30% national credit for wind and solar, with extra state incentives
    #[fixture]
    fn incentives() -> IncentiveMap {
        use IncentiveKind::{Credit, Grant};

        read_tax_credits_from_iter(
            [
                tax_credit(NATIONAL, Fuel::Wind, Credit, -0.3),
                tax_credit(NATIONAL, Fuel::Solar, Credit, -0.3),
                tax_credit("TX", Fuel::Wind, Credit, -0.1),
                tax_credit("CA", Fuel::Wind, Credit, -0.05),
                tax_credit("CA", Fuel::Wind, Grant, -200.0),
                tax_credit("TX", Fuel::Gas, Credit, -0.5),
                tax_credit(NATIONAL, Fuel::Coal, Credit, -0.5),
            ]
            .into_iter(),
        )
        .unwrap()
    }

    #[rstest]
    #[case::state_credit("TX", Fuel::Wind, 1000.0 * (1.0 - 0.3 - 0.1))]
    #[case::national_credit_only("TX", Fuel::Solar, 1000.0 * (1.0 - 0.3))]
    #[case::grant_overrides_state_credit("CA", Fuel::Wind, 1000.0 * (1.0 - 0.3) - 200.0)]
    #[case::state_without_entries("PA", Fuel::Wind, 1000.0 * (1.0 - 0.3))]
    #[case::fossil_gets_no_credit("TX", Fuel::Gas, 1000.0)]
    #[case::fossil_gets_no_national_credit("TX", Fuel::Coal, 1000.0)]
    fn test_adjust_plant_costs_capital(
        incentives: IncentiveMap,
        #[case] state: &str,
        #[case] fuel: Fuel,
        #[case] expected: f64,
    ) {
        let costs = read_plant_costs_from_iter([plant_cost(state, fuel, 1000.0)].into_iter())
            .unwrap();
        let costs = adjust_plant_costs(costs, &incentives, Dimensionless(1.0)).unwrap();
        assert_approx_eq!(
            MoneyPerKW,
            costs[&(StateID::from(state), fuel)].capital_cost,
            MoneyPerKW(expected),
            epsilon = 1e-9
        );
    }

    #[rstest]
    fn test_read_tax_credits_from_iter(incentives: IncentiveMap) {
        // Fossil fuel records are dropped
        assert!(incentives.keys().all(|(_, fuel)| !fuel.is_fossil()));
        assert_eq!(incentives.len(), 4);

        let california = incentives[&(StateID::from("CA"), Fuel::Wind)];
        assert_eq!(california.credit, Dimensionless(-0.05));
        assert_eq!(california.grant, Some(MoneyPerKW(-200.0)));

        assert_error!(
            read_tax_credits_from_iter(
                [tax_credit(NATIONAL, Fuel::Solar, IncentiveKind::Grant, -100.0)].into_iter()
            ),
            "Grants must be for a single state (fuel Solar)"
        );
        assert_error!(
            read_tax_credits_from_iter(
                [
                    tax_credit("CA", Fuel::Solar, IncentiveKind::Grant, -100.0),
                    tax_credit("CA", Fuel::Solar, IncentiveKind::Grant, -50.0)
                ]
                .into_iter()
            ),
            "Duplicate grant for fuel Solar in state CA"
        );
        assert_error!(
            read_tax_credits_from_iter(
                [tax_credit("CA", Fuel::Wind, IncentiveKind::Credit, f64::NAN)].into_iter()
            ),
            "Tax credit for fuel Wind in state CA must be a finite number"
        );
    }

    #[test]
    fn test_adjust_plant_costs_storage() {
        let solar = PlantCostRaw {
            storage_cap_per_kw: MoneyPerKW(300.0),
            storage_om_per_kw_year: MoneyPerKWYear(8.0),
            ..plant_cost("TX", Fuel::Solar, 1000.0)
        };
        let costs = read_plant_costs_from_iter([solar].into_iter()).unwrap();
        let costs = adjust_plant_costs(costs, &IncentiveMap::new(), Dimensionless(1.5)).unwrap();
        let cost = costs[&(StateID::from("TX"), Fuel::Solar)];
        assert_eq!(cost.capital_cost, MoneyPerKW(1000.0));
        assert_eq!(cost.storage_capital, MoneyPerKW(450.0));
        assert_eq!(cost.storage_om, MoneyPerKWYear(12.0));

        // A grant can't make capital costs negative
        let costs = read_plant_costs_from_iter([plant_cost("CA", Fuel::Wind, 100.0)].into_iter())
            .unwrap();
        let incentives = read_tax_credits_from_iter(
            [tax_credit("CA", Fuel::Wind, IncentiveKind::Grant, -200.0)].into_iter(),
        )
        .unwrap();
        assert_error!(
            adjust_plant_costs(costs, &incentives, Dimensionless(1.0)),
            "Adjusted capital cost for Wind in state CA must be a finite number >= 0"
        );
    }

    #[test]
    fn test_read_cost_tables() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(FUEL_PRICES_FILE_NAME)).unwrap();
            writeln!(file, "state,fuel,price_per_mmbtu\nTX,Gas,3.0\nTX,Wind,0.0").unwrap();
        }
        {
            let mut file = File::create(dir.path().join(PLANT_COSTS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "state,fuel,variable_om_per_mwh,fixed_om_per_kw_year,capital_cost_per_kw,\
storage_cap_per_kw,storage_om_per_kw_year
TX,Gas,2.0,12.0,1000.0,0.0,0.0
TX,Wind,0.0,26.0,1400.0,0.0,0.0"
            )
            .unwrap();
        }

        let mut parameters = toml::from_str::<ModelParameters>("").unwrap();
        let tables = read_cost_tables(dir.path(), &parameters).unwrap();
        let scenario = tables.scenario(&"TX".into(), Fuel::Wind).unwrap();
        assert_eq!(scenario.capital_cost, MoneyPerKW(1400.0));
        assert_eq!(scenario.fuel_price, MoneyPerFuelEnergy(0.0));
        assert!(tables.scenario(&"TX".into(), Fuel::Solar).is_err());

        // Tax credits enabled, but no file
        parameters.tax_credits = true;
        assert!(read_cost_tables(dir.path(), &parameters).is_err());

        {
            let mut file = File::create(dir.path().join(TAX_CREDITS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "state,fuel,kind,amount\nnational,Wind,credit,-0.3\nTX,Gas,credit,-0.3"
            )
            .unwrap();
        }
        let tables = read_cost_tables(dir.path(), &parameters).unwrap();
        let wind = tables.scenario(&"TX".into(), Fuel::Wind).unwrap();
        assert_approx_eq!(MoneyPerKW, wind.capital_cost, MoneyPerKW(980.0), epsilon = 1e-9);
        let gas = tables.scenario(&"TX".into(), Fuel::Gas).unwrap();
        assert_eq!(gas.capital_cost, MoneyPerKW(1000.0));
    }
}
