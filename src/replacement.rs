//! The replacement-decision engine.
//!
//! For each existing plant, every candidate replacement fuel is costed and its emissions
//! estimated. The candidate with the lowest value of the selected [`Metric`] is then chosen.
//!
//! The cost of a replacement includes paying off what remains of the existing plant's capital.
//! The existing plant's original principal is taken to be its capacity multiplied by the
//! candidate's capital cost, and it is assumed to have been financed on the same terms as the
//! replacement.
use crate::capacity_factor::PlantCapacityFactors;
use crate::cost::{CostScenario, CostTables, Financing, OperatingProfile, annualized_total_cost};
use crate::finance::{level_payment, remaining_principal};
use crate::fuel::{Fuel, FuelParameterMap, FuelParameters};
use crate::plant::{Plant, PlantID, StateID};
use crate::units::{
    Capacity, Dimensionless, Emissions, Energy, Money, MoneyPerEmissions, MoneyPerEnergy,
    MoneyPerKW,
};
use anyhow::{Context, Result, ensure};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub mod metric;
pub use metric::Metric;

/// A fuel which could replace an existing plant, along with its parameters for the plant's
/// location
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementCandidate {
    /// The replacement fuel
    pub fuel: Fuel,
    /// Capacity factor of new capacity at the plant's location
    pub capacity_factor: Dimensionless,
    /// Heat rate and carbon content of the fuel
    pub parameters: FuelParameters,
    /// Costs of the fuel in the plant's state
    pub scenario: CostScenario,
}

/// The loan taken out to build an existing plant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExistingLoan {
    /// The amount originally borrowed
    pub principal: Money,
    /// Years since the plant was commissioned
    pub age: u32,
    /// Annual interest rate of the loan
    pub rate: Dimensionless,
    /// Years over which the loan is repaid
    pub lifetime: u32,
    /// Number of payments made each year
    pub payments_per_year: u32,
}

/// The capacity (MW) needed to produce `generation` at `capacity_factor`
pub fn size_capacity(generation: Energy, capacity_factor: Dimensionless) -> Capacity {
    Capacity::for_generation(generation, capacity_factor)
}

/// Emissions from producing `generation` with a fuel.
///
/// Carbon content is in tonnes per mmBtu, so the fuel burned (heat rate in Btu/kWh times
/// generation) is converted from Btu to mmBtu (÷1e6) before applying it.
pub fn estimate_emissions(generation: Energy, parameters: &FuelParameters) -> Emissions {
    parameters.carbon_content * parameters.heat_rate.fuel_demand(generation)
}

/// Annual cost of building and running new capacity to replace `generation`
pub fn direct_replacement_cost(
    generation: Energy,
    candidate: &ReplacementCandidate,
    financing: &Financing,
) -> Result<Money> {
    let profile = OperatingProfile {
        generation,
        capacity: size_capacity(generation, candidate.capacity_factor),
        fuel_demand: candidate.parameters.heat_rate.fuel_demand(generation),
    };
    annualized_total_cost(&candidate.scenario, financing, &profile)
}

/// Annual cost of replacing `generation`, including paying off the rest of the existing loan.
///
/// The outstanding principal is refinanced on the replacement's terms.
pub fn total_replacement_cost(
    generation: Energy,
    candidate: &ReplacementCandidate,
    financing: &Financing,
    existing_loan: &ExistingLoan,
) -> Result<Money> {
    let direct_cost = direct_replacement_cost(generation, candidate, financing)?;
    let leftover = remaining_principal(
        existing_loan.principal,
        existing_loan.age,
        existing_loan.rate,
        existing_loan.lifetime,
        existing_loan.payments_per_year,
    )?;
    let payoff_cost = level_payment(leftover, financing.discount_rate, financing.lifetime, 1)?;

    Ok(direct_cost + payoff_cost)
}

/// Cost of a replacement per tonne of emissions it avoids.
///
/// If the replacement doesn't change emissions, the result is infinite (or NaN if the cost
/// doesn't change either). If it increases emissions, the sign is flipped.
pub fn cost_per_emissions_abated(
    existing_cost: Money,
    replacement_cost: Money,
    existing_emissions: Emissions,
    new_emissions: Emissions,
) -> MoneyPerEmissions {
    (replacement_cost - existing_cost) / (existing_emissions - new_emissions)
}

/// Annual cost of carrying on running an existing plant.
///
/// The plant is costed with its own fuel's costs, except that its capital cost is replaced with
/// `existing_capital_cost` and it has no storage capital.
pub fn existing_plant_cost(
    plant: &Plant,
    scenario: &CostScenario,
    financing: &Financing,
    existing_capital_cost: MoneyPerKW,
) -> Result<Money> {
    let scenario = CostScenario {
        capital_cost: existing_capital_cost,
        storage_capital: MoneyPerKW(0.0),
        ..*scenario
    };
    let profile = OperatingProfile {
        generation: plant.generation,
        capacity: plant.capacity,
        fuel_demand: plant.fuel_consumption,
    };
    annualized_total_cost(&scenario, financing, &profile)
}

/// The values of every [`Metric`] for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMetrics {
    /// Replacement cost minus existing cost
    pub cost_delta: Money,
    /// Cost difference per tonne of emissions avoided
    pub cost_per_emissions_abated: MoneyPerEmissions,
    /// Existing emissions minus replacement emissions
    pub emissions_delta: Emissions,
    /// Existing cost per kWh generated
    pub existing_cost_per_energy: MoneyPerEnergy,
    /// Replacement cost per kWh generated
    pub new_cost_per_energy: MoneyPerEnergy,
}

impl CandidateMetrics {
    /// The value of the given metric
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::CostDelta => self.cost_delta.value(),
            Metric::CostPerEmissionsAbated => self.cost_per_emissions_abated.value(),
            Metric::EmissionsDelta => self.emissions_delta.value(),
            Metric::ExistingCostPerEnergy => self.existing_cost_per_energy.value(),
            Metric::NewCostPerEnergy => self.new_cost_per_energy.value(),
        }
    }
}

/// The result of costing one candidate for one plant
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEvaluation {
    /// The replacement fuel
    pub fuel: Fuel,
    /// Annual cost of the existing plant
    pub existing_cost: Money,
    /// Annual cost of the replacement, including the existing plant's remaining capital
    pub replacement_cost: Money,
    /// Annual emissions of the replacement
    pub new_emissions: Emissions,
    /// Values of each metric
    pub metrics: CandidateMetrics,
}

/// Options controlling how replacements are assessed
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementOptions {
    /// The year in which decisions are made
    pub measure_year: u32,
    /// Financing terms for new capital
    pub financing: Financing,
    /// Capital cost still being paid on existing plants ($/kW)
    pub existing_capital_cost: MoneyPerKW,
    /// Payments per year on existing plants' original loans
    pub original_payments_per_year: u32,
    /// The metric to minimise
    pub metric: Metric,
    /// Candidate replacement fuels, in order of preference for ties
    pub subset: Vec<Fuel>,
}

/// The tables needed to build replacement candidates
#[derive(Debug, Clone, Copy)]
pub struct ReplacementInputs<'a> {
    /// Fuel prices and plant costs by state
    pub cost_tables: &'a CostTables,
    /// Heat rates and carbon contents of replacement fuels
    pub fuel_parameters: &'a FuelParameterMap,
    /// Capacity factors of replacement fuels, one per plant
    pub capacity_factors: &'a PlantCapacityFactors,
}

/// The chosen replacement for a plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementDecision {
    /// The plant being replaced
    pub plant_id: PlantID,
    /// The state the plant is in
    pub state: StateID,
    /// The plant's current fuel
    pub primary_fuel: Fuel,
    /// The chosen replacement fuel
    pub replacement_fuel: Fuel,
    /// Nameplate capacity of the existing plant (MW)
    pub capacity: Capacity,
    /// Annual generation being replaced (kWh)
    pub generation: Energy,
    /// Annual emissions of the existing plant (tonnes)
    pub emissions: Emissions,
    /// Value of the selected metric for the chosen fuel
    pub metric: f64,
    /// Emissions avoided by the chosen replacement (tonnes/yr)
    pub emissions_reduction: Emissions,
}

/// A plant which could not be assessed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPlant {
    /// The plant which was skipped
    pub plant_id: PlantID,
    /// Why it was skipped
    pub reason: String,
}

/// Decisions for every plant which could be assessed, along with the plants which couldn't
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementOutcome {
    /// One decision per assessed plant, in input order
    pub decisions: Vec<ReplacementDecision>,
    /// Plants which were skipped, in input order
    pub skipped: Vec<SkippedPlant>,
}

/// Build the replacement candidates for the plant at `plant_index`
fn build_candidates(
    plant: &Plant,
    plant_index: usize,
    inputs: &ReplacementInputs,
    subset: &[Fuel],
) -> Result<Vec<ReplacementCandidate>> {
    subset
        .iter()
        .map(|&fuel| {
            let capacity_factor = *inputs
                .capacity_factors
                .get(&fuel)
                .and_then(|capacity_factors| capacity_factors.get(plant_index))
                .with_context(|| format!("No capacity factor found for fuel {fuel}"))?;
            let parameters = *inputs
                .fuel_parameters
                .get(&fuel)
                .with_context(|| format!("No fuel parameters found for fuel {fuel}"))?;
            let scenario = inputs.cost_tables.scenario(&plant.state, fuel)?;

            Ok(ReplacementCandidate {
                fuel,
                capacity_factor,
                parameters,
                scenario,
            })
        })
        .collect()
}

/// Cost a single candidate for a plant, given the plant's existing cost
fn evaluate_candidate(
    plant: &Plant,
    candidate: &ReplacementCandidate,
    existing_cost: Money,
    age: u32,
    options: &ReplacementOptions,
) -> Result<CandidateEvaluation> {
    let financing = &options.financing;
    let existing_loan = ExistingLoan {
        principal: candidate.scenario.capital_cost.per_mw() * plant.capacity,
        age,
        rate: financing.discount_rate,
        lifetime: financing.lifetime,
        payments_per_year: options.original_payments_per_year,
    };
    let replacement_cost =
        total_replacement_cost(plant.generation, candidate, financing, &existing_loan)?;
    let new_emissions = estimate_emissions(plant.generation, &candidate.parameters);

    let metrics = CandidateMetrics {
        cost_delta: replacement_cost - existing_cost,
        cost_per_emissions_abated: cost_per_emissions_abated(
            existing_cost,
            replacement_cost,
            plant.emissions,
            new_emissions,
        ),
        emissions_delta: plant.emissions - new_emissions,
        existing_cost_per_energy: existing_cost / plant.generation,
        new_cost_per_energy: replacement_cost / plant.generation,
    };

    Ok(CandidateEvaluation {
        fuel: candidate.fuel,
        existing_cost,
        replacement_cost,
        new_emissions,
        metrics,
    })
}

/// Cost every candidate for a plant.
///
/// Evaluations are returned in the same order as `candidates`.
pub fn evaluate_plant(
    plant: &Plant,
    candidates: &[ReplacementCandidate],
    cost_tables: &CostTables,
    options: &ReplacementOptions,
) -> Result<Vec<CandidateEvaluation>> {
    let age = plant.age(options.measure_year)?;
    let own_scenario = cost_tables.scenario(&plant.state, plant.primary_fuel)?;
    let existing_cost = existing_plant_cost(
        plant,
        &own_scenario,
        &options.financing,
        options.existing_capital_cost,
    )?;

    candidates
        .iter()
        .map(|candidate| evaluate_candidate(plant, candidate, existing_cost, age, options))
        .collect()
}

/// Choose the candidate with the lowest value of `metric`.
///
/// Ties go to the earliest candidate. NaN values never win unless every value is NaN, in which
/// case the first candidate is chosen. Returns `None` if there are no candidates.
pub fn select_candidate(
    evaluations: &[CandidateEvaluation],
    metric: Metric,
) -> Option<&CandidateEvaluation> {
    evaluations.iter().reduce(|best, candidate| {
        let best_value = best.metrics.value(metric);
        let value = candidate.metrics.value(metric);
        if value < best_value || (best_value.is_nan() && !value.is_nan()) {
            candidate
        } else {
            best
        }
    })
}

/// Check and cost a single plant, then choose its replacement
fn assess_plant(
    plant: &Plant,
    plant_index: usize,
    inputs: &ReplacementInputs,
    options: &ReplacementOptions,
) -> Result<ReplacementDecision> {
    plant.validate()?;
    let candidates = build_candidates(plant, plant_index, inputs, &options.subset)?;
    let evaluations = evaluate_plant(plant, &candidates, inputs.cost_tables, options)?;
    let chosen = select_candidate(&evaluations, options.metric)
        .context("No replacement candidates available")?;

    debug!(
        "Plant {}: replacing {} with {} ({} = {})",
        plant.id,
        plant.primary_fuel,
        chosen.fuel,
        options.metric,
        chosen.metrics.value(options.metric)
    );

    Ok(ReplacementDecision {
        plant_id: plant.id.clone(),
        state: plant.state.clone(),
        primary_fuel: plant.primary_fuel,
        replacement_fuel: chosen.fuel,
        capacity: plant.capacity,
        generation: plant.generation,
        emissions: plant.emissions,
        metric: chosen.metrics.value(options.metric),
        emissions_reduction: chosen.metrics.emissions_delta,
    })
}

/// Choose a replacement fuel for each plant.
///
/// `inputs.capacity_factors` must hold one capacity factor per plant for every fuel in
/// `options.subset`. Plants which cannot be assessed (e.g. because of an invalid record or a
/// missing cost) are skipped with a warning and returned in [`ReplacementOutcome::skipped`].
pub fn replacement_iteration(
    plants: &[Plant],
    inputs: &ReplacementInputs,
    options: &ReplacementOptions,
) -> Result<ReplacementOutcome> {
    ensure!(!options.subset.is_empty(), "No replacement fuels provided");
    for (fuel, capacity_factors) in inputs.capacity_factors {
        ensure!(
            capacity_factors.len() == plants.len(),
            "Got {} capacity factors for fuel {fuel} but {} plants",
            capacity_factors.len(),
            plants.len()
        );
    }

    let mut outcome = ReplacementOutcome::default();
    for (plant_index, plant) in plants.iter().enumerate() {
        match assess_plant(plant, plant_index, inputs, options) {
            Ok(decision) => outcome.decisions.push(decision),
            Err(err) => {
                warn!("Skipping plant {}: {err:#}", plant.id);
                outcome.skipped.push(SkippedPlant {
                    plant_id: plant.id.clone(),
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    info!(
        "Chose replacements for {} plants ({} skipped)",
        outcome.decisions.len(),
        outcome.skipped.len()
    );

    Ok(outcome)
}
