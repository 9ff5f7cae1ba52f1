//! Functionality for running a replacement assessment over a whole model.
use crate::capacity_factor::resolve_capacity_factors;
use crate::macc::{MaccRow, StateMaccRow, build_macc, build_state_macc};
use crate::model::Model;
use crate::output::DataWriter;
use crate::output::metadata::write_metadata;
use crate::plant::clean_plants;
use crate::replacement::{ReplacementInputs, ReplacementOutcome, replacement_iteration};
use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use std::path::Path;

/// The results of assessing a model
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Replacement decisions, along with the plants which were skipped
    pub outcome: ReplacementOutcome,
    /// The MACC built from the decisions
    pub macc: Vec<MaccRow>,
    /// The MACC aggregated by state
    pub state_macc: Vec<StateMaccRow>,
}

/// Choose replacements for the model's plants and build MACCs from the results.
pub fn assess(model: &Model) -> Result<Assessment> {
    let parameters = &model.parameters;
    let plants = clean_plants(model.plants.clone(), &parameters.fossil_fuels);

    let options = parameters.replacement_options();
    let locations = plants.iter().map(|plant| plant.location()).collect_vec();
    let capacity_factors =
        resolve_capacity_factors(&model.capacity_factor_sources, &options.subset, &locations)
            .context("Failed to resolve capacity factors")?;

    let inputs = ReplacementInputs {
        cost_tables: &model.cost_tables,
        fuel_parameters: &model.fuel_parameters,
        capacity_factors: &capacity_factors,
    };
    let outcome = replacement_iteration(&plants, &inputs, &options)?;

    let macc = build_macc(
        &outcome.decisions,
        parameters.macc_lower_bound,
        parameters.macc_upper_bound,
    );
    let state_macc = build_state_macc(&macc);
    info!("MACC covers {} plants in {} states", macc.len(), state_macc.len());

    Ok(Assessment {
        outcome,
        macc,
        state_macc,
    })
}

/// Run the assessment and write the results to `output_path`.
///
/// # Arguments:
///
/// * `model` - The model to assess
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<()> {
    write_metadata(output_path, &model.model_path, &model.parameters)
        .context("Failed to save metadata")?;

    let assessment = assess(model)?;

    let mut writer = DataWriter::create(output_path)?;
    writer.write_decisions(&assessment.outcome.decisions)?;
    writer.write_skipped(&assessment.outcome.skipped)?;
    writer.write_macc(&assessment.macc)?;
    writer.write_state_macc(&assessment.state_macc)?;
    writer.flush()?;

    Ok(())
}
