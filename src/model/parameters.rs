//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::cost::Financing;
use crate::fuel::{Fuel, default_fossil_fuels, default_replacement_fuels};
use crate::input::{input_err_msg, is_unique, read_toml};
use crate::macc::{DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND};
use crate::replacement::{Metric, ReplacementOptions};
use crate::units::{Dimensionless, MoneyPerKW};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_measure_year, u32, 2021);
define_param_default!(default_discount_rate, Dimensionless, Dimensionless(0.05));
define_param_default!(default_lifetime, u32, 30);
define_param_default!(default_payments_per_year, u32, 1);
define_unit_param_default!(default_existing_capital_cost, MoneyPerKW, 0.0);
define_param_default!(default_metric, Metric, Metric::CostPerEmissionsAbated);
define_param_default!(default_macc_lower_bound, f64, DEFAULT_LOWER_BOUND);
define_param_default!(default_macc_upper_bound, f64, DEFAULT_UPPER_BOUND);
define_param_default!(default_storage_cost_multiplier, Dimensionless, Dimensionless(1.0));

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The year in which replacement decisions are made.
    ///
    /// Used to calculate the age of existing plants.
    #[serde(default = "default_measure_year")]
    pub measure_year: u32,
    /// Discount rate for financing new capital and existing loans
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Dimensionless,
    /// Number of years over which capital is repaid
    #[serde(default = "default_lifetime")]
    pub lifetime: u32,
    /// Number of payments made each year on existing plants' original loans
    #[serde(default = "default_payments_per_year")]
    pub payments_per_year: u32,
    /// Capital cost ($/kW) still charged to existing plants which carry on running.
    ///
    /// Zero treats the capital of existing plants as sunk.
    #[serde(default = "default_existing_capital_cost")]
    pub existing_capital_cost: MoneyPerKW,
    /// The metric used to choose between replacement fuels.
    ///
    /// Defaults to cost per tonne abated. This differs from the analysis this tool is based on,
    /// which ranked by cost difference. Set `metric = "cost"` to reproduce its rankings.
    #[serde(default = "default_metric")]
    pub metric: Metric,
    /// Fuels which may replace existing plants, in order of preference for ties
    #[serde(default = "default_replacement_fuels")]
    pub replacement_fuels: Vec<Fuel>,
    /// Fuels of the existing plants which are considered for replacement
    #[serde(default = "default_fossil_fuels")]
    pub fossil_fuels: Vec<Fuel>,
    /// The lowest metric value included in the MACC
    #[serde(default = "default_macc_lower_bound")]
    pub macc_lower_bound: f64,
    /// The highest metric value included in the MACC
    #[serde(default = "default_macc_upper_bound")]
    pub macc_upper_bound: f64,
    /// Whether to apply the tax credits and grants in `tax_credits.csv` to wind and solar
    #[serde(default)]
    pub tax_credits: bool,
    /// Factor applied to storage capital and O&M costs, for sensitivity analysis
    #[serde(default = "default_storage_cost_multiplier")]
    pub storage_cost_multiplier: Dimensionless,
}

/// Check that the `discount_rate` parameter is valid
fn check_discount_rate(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value > Dimensionless(0.0),
        "discount_rate must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that a list of fuels is non-empty and has no repeats
fn check_fuel_list(name: &str, fuels: &[Fuel]) -> Result<()> {
    ensure!(!fuels.is_empty(), "`{name}` is empty");
    ensure!(is_unique(fuels), "`{name}` must not contain duplicates");

    Ok(())
}

/// Check that the MACC bounds are valid
fn check_macc_bounds(lower: f64, upper: f64) -> Result<()> {
    ensure!(
        lower.is_finite() && upper.is_finite(),
        "macc_lower_bound and macc_upper_bound must be finite"
    );
    ensure!(
        lower < upper,
        "macc_lower_bound must be less than macc_upper_bound"
    );

    Ok(())
}

/// Check that the `storage_cost_multiplier` parameter is valid
fn check_storage_cost_multiplier(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value >= Dimensionless(0.0),
        "storage_cost_multiplier must be a finite number >= 0"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // discount_rate
        check_discount_rate(self.discount_rate)?;

        // lifetime and payments_per_year
        ensure!(self.lifetime > 0, "lifetime cannot be zero");
        ensure!(self.payments_per_year > 0, "payments_per_year cannot be zero");

        // existing_capital_cost
        ensure!(
            self.existing_capital_cost.is_finite()
                && self.existing_capital_cost >= MoneyPerKW(0.0),
            "existing_capital_cost must be a finite number >= 0"
        );

        // replacement_fuels and fossil_fuels
        check_fuel_list("replacement_fuels", &self.replacement_fuels)?;
        check_fuel_list("fossil_fuels", &self.fossil_fuels)?;
        if let Some(fuel) = self.fossil_fuels.iter().find(|fuel| !fuel.is_fossil()) {
            warn!("{fuel} is listed in fossil_fuels but is not a fossil fuel");
        }

        // macc_lower_bound and macc_upper_bound
        check_macc_bounds(self.macc_lower_bound, self.macc_upper_bound)?;

        // storage_cost_multiplier
        check_storage_cost_multiplier(self.storage_cost_multiplier)?;

        Ok(())
    }

    /// Financing terms for new capital
    pub fn financing(&self) -> Financing {
        Financing {
            discount_rate: self.discount_rate,
            lifetime: self.lifetime,
        }
    }

    /// Options for assessing replacements
    pub fn replacement_options(&self) -> ReplacementOptions {
        ReplacementOptions {
            measure_year: self.measure_year,
            financing: self.financing(),
            existing_capital_cost: self.existing_capital_cost,
            original_payments_per_year: self.payments_per_year,
            metric: self.metric,
            subset: self.replacement_fuels.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_model_file(dir: &Path, contents: &str) {
        let mut file = File::create(dir.join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
        writeln!(file, "{contents}").unwrap();
    }

    #[test]
    fn test_model_params_from_path_defaults() {
        let dir = tempdir().unwrap();
        write_model_file(dir.path(), "");

        let params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(params.measure_year, 2021);
        assert_eq!(params.discount_rate, Dimensionless(0.05));
        assert_eq!(params.lifetime, 30);
        assert_eq!(params.metric, Metric::CostPerEmissionsAbated);
        assert_eq!(
            params.replacement_fuels,
            [Fuel::Gas, Fuel::Solar, Fuel::Wind]
        );
        assert_eq!(params.macc_lower_bound, -200.0);
        assert_eq!(params.macc_upper_bound, 200.0);
        assert!(!params.tax_credits);
        assert_eq!(params.storage_cost_multiplier, Dimensionless(1.0));
    }

    #[test]
    fn test_model_params_from_path() {
        let dir = tempdir().unwrap();
        write_model_file(
            dir.path(),
            "measure_year = 2030
discount_rate = 0.07
metric = \"cost\"
replacement_fuels = [\"Wind\", \"Gas_CC\"]
tax_credits = true
storage_cost_multiplier = 0.5",
        );

        let params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(params.measure_year, 2030);
        assert_eq!(params.metric, Metric::CostDelta);
        assert!(params.tax_credits);
        assert_eq!(params.storage_cost_multiplier, Dimensionless(0.5));

        let options = params.replacement_options();
        assert_eq!(options.subset, [Fuel::Wind, Fuel::GasCombinedCycle]);
        assert_eq!(options.financing.discount_rate, Dimensionless(0.07));
        assert_eq!(options.financing.lifetime, 30);
    }

    #[test]
    fn test_model_params_unknown_metric() {
        let dir = tempdir().unwrap();
        write_model_file(dir.path(), "metric = \"cheapest\"");
        assert!(ModelParameters::from_path(dir.path()).is_err());
    }

    #[rstest]
    #[case(0.05, true)]
    #[case(1e-10, true)]
    #[case(0.0, false)]
    #[case(-0.05, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_discount_rate(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(
            check_discount_rate(Dimensionless(value)).is_ok(),
            expected_valid
        );
    }

    #[test]
    fn test_check_fuel_list() {
        assert!(check_fuel_list("fuels", &[Fuel::Gas, Fuel::Wind]).is_ok());
        assert_error!(check_fuel_list("fuels", &[]), "`fuels` is empty");
        assert_error!(
            check_fuel_list("fuels", &[Fuel::Gas, Fuel::Gas]),
            "`fuels` must not contain duplicates"
        );
    }

    #[rstest]
    #[case(1.0, true)]
    #[case(0.0, true)]
    #[case(2.5, true)]
    #[case(-0.1, false)]
    #[case(f64::NAN, false)]
    fn test_check_storage_cost_multiplier(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(
            check_storage_cost_multiplier(Dimensionless(value)).is_ok(),
            expected_valid
        );
    }

    #[rstest]
    #[case(-200.0, 200.0, true)]
    #[case(0.0, 1.0, true)]
    #[case(1.0, 1.0, false)]
    #[case(10.0, -10.0, false)]
    #[case(f64::NEG_INFINITY, 0.0, false)]
    fn test_check_macc_bounds(#[case] lower: f64, #[case] upper: f64, #[case] valid: bool) {
        assert_eq!(check_macc_bounds(lower, upper).is_ok(), valid);
    }
}
