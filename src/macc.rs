//! Marginal abatement cost curves (MACCs).
//!
//! A MACC ranks replacement decisions by their metric (typically $/tonne abated). Each decision
//! becomes a bar whose width is the emissions it avoids and whose height is its metric, with the
//! bars laid end to end in order of increasing metric.
use crate::plant::StateID;
use crate::replacement::ReplacementDecision;
use crate::units::Emissions;
use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

/// The default lowest metric value included in a MACC
pub const DEFAULT_LOWER_BOUND: f64 = -200.0;

/// The default highest metric value included in a MACC
pub const DEFAULT_UPPER_BOUND: f64 = 200.0;

/// Decisions must avoid more than this to be included in a MACC
pub const MIN_EMISSIONS_REDUCTION: Emissions = Emissions(1.0);

/// The position of a bar along the MACC's x-axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaccExtent {
    /// Cumulative emissions reduction before this bar (gigatonnes)
    pub cum_red_prev: f64,
    /// Cumulative emissions reduction up to and including this bar (gigatonnes)
    pub cum_red: f64,
}

/// Running totals of emissions reductions, in gigatonnes
#[derive(Debug, Default)]
struct CumulativeReduction {
    total: Emissions,
}

impl CumulativeReduction {
    /// Add a bar of width `reduction`, returning its extent
    fn push(&mut self, reduction: Emissions) -> MaccExtent {
        let cum_red_prev = self.total.gigatonnes();
        self.total += reduction;
        MaccExtent {
            cum_red_prev,
            cum_red: self.total.gigatonnes(),
        }
    }
}

/// A replacement decision placed on the MACC
#[derive(Debug, Clone, PartialEq)]
pub struct MaccRow {
    /// The decision
    pub decision: ReplacementDecision,
    /// "{original fuel}→{replacement fuel}"
    pub label: String,
    /// Where the bar sits on the x-axis
    pub extent: MaccExtent,
    /// Cumulative emissions of the existing plants up to and including this one (tonnes)
    pub cum_emission: Emissions,
}

/// Build a MACC from replacement decisions.
///
/// Only decisions with a metric in `[lower_bound, upper_bound]` and an emissions reduction above
/// [`MIN_EMISSIONS_REDUCTION`] are included. Rows are sorted by metric, with ties kept in input
/// order.
pub fn build_macc(
    decisions: &[ReplacementDecision],
    lower_bound: f64,
    upper_bound: f64,
) -> Vec<MaccRow> {
    let mut included: Vec<_> = decisions
        .iter()
        .filter(|decision| {
            (lower_bound..=upper_bound).contains(&decision.metric)
                && decision.emissions_reduction > MIN_EMISSIONS_REDUCTION
        })
        .collect();
    included.sort_by(|a, b| a.metric.total_cmp(&b.metric));

    info!(
        "{} of {} decisions lie within the MACC bounds [{lower_bound}, {upper_bound}]",
        included.len(),
        decisions.len()
    );

    let mut reduction = CumulativeReduction::default();
    let mut cum_emission = Emissions(0.0);
    included
        .into_iter()
        .map(|decision| {
            cum_emission += decision.emissions;
            MaccRow {
                label: format!("{}→{}", decision.primary_fuel, decision.replacement_fuel),
                extent: reduction.push(decision.emissions_reduction),
                cum_emission,
                decision: decision.clone(),
            }
        })
        .collect()
}

/// A bar of the per-state MACC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMaccRow {
    /// The state
    pub state: StateID,
    /// Number of plants in the state included in the MACC
    pub plants: u32,
    /// Mean metric of the state's decisions
    pub metric: f64,
    /// Total emissions reduction in the state (tonnes/yr)
    pub emissions_reduction: Emissions,
    /// Cumulative emissions reduction before this bar (gigatonnes)
    pub cum_red_prev: f64,
    /// Cumulative emissions reduction up to and including this bar (gigatonnes)
    pub cum_red: f64,
}

/// Aggregate a MACC by state.
///
/// Each state's bar has the mean metric and total emissions reduction of its rows. Bars are
/// sorted by metric, with ties kept in order of each state's first appearance.
pub fn build_state_macc(rows: &[MaccRow]) -> Vec<StateMaccRow> {
    let totals = rows.iter().fold(
        IndexMap::<StateID, (u32, f64, Emissions)>::new(),
        |mut totals, row| {
            let decision = &row.decision;
            let entry = totals
                .entry(decision.state.clone())
                .or_insert((0, 0.0, Emissions(0.0)));
            entry.0 += 1;
            entry.1 += decision.metric;
            entry.2 += decision.emissions_reduction;
            totals
        },
    );

    let mut states: Vec<_> = totals
        .into_iter()
        .map(|(state, (plants, metric_sum, emissions_reduction))| {
            (state, plants, metric_sum / f64::from(plants), emissions_reduction)
        })
        .collect();
    states.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut reduction = CumulativeReduction::default();
    states
        .into_iter()
        .map(|(state, plants, metric, emissions_reduction)| {
            let MaccExtent {
                cum_red_prev,
                cum_red,
            } = reduction.push(emissions_reduction);
            StateMaccRow {
                state,
                plants,
                metric,
                emissions_reduction,
                cum_red_prev,
                cum_red,
            }
        })
        .collect()
}
