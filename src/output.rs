//! The module responsible for writing output data to disk.
use crate::macc::{MaccRow, StateMaccRow};
use crate::replacement::{ReplacementDecision, SkippedPlant};
use crate::units::Emissions;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "macc_results";

/// The output file name for replacement decisions
const DECISIONS_FILE_NAME: &str = "replacement_decisions.csv";

/// The output file name for the MACC
const MACC_FILE_NAME: &str = "macc.csv";

/// The output file name for the per-state MACC
const STATE_MACC_FILE_NAME: &str = "state_macc.csv";

/// The output file name for plants which couldn't be assessed
const SKIPPED_PLANTS_FILE_NAME: &str = "skipped_plants.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data.
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output directory had existing contents which were deleted, false otherwise.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// The columns of the MACC CSV file which follow the decision columns
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct MaccColumns {
    label: String,
    cum_red_prev: f64,
    cum_red: f64,
    cum_emission: Emissions,
}

impl MaccColumns {
    fn new(row: &MaccRow) -> Self {
        Self {
            label: row.label.clone(),
            cum_red_prev: row.extent.cum_red_prev,
            cum_red: row.extent.cum_red,
            cum_emission: row.cum_emission,
        }
    }
}

/// An object for writing results to CSV files
pub struct DataWriter {
    decisions_writer: csv::Writer<File>,
    macc_writer: csv::Writer<File>,
    state_macc_writer: csv::Writer<File>,
    skipped_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            decisions_writer: new_writer(DECISIONS_FILE_NAME)?,
            macc_writer: new_writer(MACC_FILE_NAME)?,
            state_macc_writer: new_writer(STATE_MACC_FILE_NAME)?,
            skipped_writer: new_writer(SKIPPED_PLANTS_FILE_NAME)?,
        })
    }

    /// Write replacement decisions to a CSV file
    pub fn write_decisions(&mut self, decisions: &[ReplacementDecision]) -> Result<()> {
        for decision in decisions {
            self.decisions_writer.serialize(decision)?;
        }

        Ok(())
    }

    /// Write the MACC to a CSV file
    pub fn write_macc(&mut self, rows: &[MaccRow]) -> Result<()> {
        for row in rows {
            self.macc_writer
                .serialize((&row.decision, MaccColumns::new(row)))?;
        }

        Ok(())
    }

    /// Write the per-state MACC to a CSV file
    pub fn write_state_macc(&mut self, rows: &[StateMaccRow]) -> Result<()> {
        for row in rows {
            self.state_macc_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write skipped plants to a CSV file
    pub fn write_skipped(&mut self, skipped: &[SkippedPlant]) -> Result<()> {
        for plant in skipped {
            self.skipped_writer.serialize(plant)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.decisions_writer.flush()?;
        self.macc_writer.flush()?;
        self.state_macc_writer.flush()?;
        self.skipped_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::decision;
    use crate::macc::{DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND, build_macc, build_state_macc};
    use itertools::{Itertools, assert_equal};
    use rstest::rstest;
    use std::iter;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_decisions(decision: ReplacementDecision) {
        let dir = tempdir().unwrap();

        // Write a decision
        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer.write_decisions(&[decision.clone()]).unwrap();
            writer.flush().unwrap();
        }

        // Read back and compare
        let records: Vec<ReplacementDecision> =
            csv::Reader::from_path(dir.path().join(DECISIONS_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_equal(records, iter::once(decision));
    }

    #[rstest]
    fn test_write_macc(decision: ReplacementDecision) {
        let rows = build_macc(&[decision], DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND);
        let state_rows = build_state_macc(&rows);
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer.write_macc(&rows).unwrap();
            writer.write_state_macc(&state_rows).unwrap();
            writer.flush().unwrap();
        }

        let mut reader = csv::Reader::from_path(dir.path().join(MACC_FILE_NAME)).unwrap();
        assert_equal(
            reader.headers().unwrap().iter(),
            [
                "plant_id",
                "state",
                "primary_fuel",
                "replacement_fuel",
                "capacity",
                "generation",
                "emissions",
                "metric",
                "emissions_reduction",
                "label",
                "cum_red_prev",
                "cum_red",
                "cum_emission",
            ],
        );
        let records: Vec<MaccColumns> = reader.into_deserialize().try_collect().unwrap();
        assert_equal(records, iter::once(MaccColumns::new(&rows[0])));

        let records: Vec<StateMaccRow> =
            csv::Reader::from_path(dir.path().join(STATE_MACC_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_equal(records, state_rows);
    }

    #[test]
    fn test_write_skipped() {
        let skipped = SkippedPlant {
            plant_id: "plant2".into(),
            reason: "No plant costs found for fuel Gas in state CA".into(),
        };
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path()).unwrap();
            writer.write_skipped(&[skipped.clone()]).unwrap();
            writer.flush().unwrap();
        }

        let records: Vec<SkippedPlant> =
            csv::Reader::from_path(dir.path().join(SKIPPED_PLANTS_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_equal(records, iter::once(skipped));
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        // Create a new directory should succeed
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");

        // Create the directory first
        fs::create_dir(&output_dir).unwrap();

        // Should succeed since directory is empty
        let result = create_output_directory(&output_dir, false).unwrap();
        assert!(!result);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join(MACC_FILE_NAME), "old").unwrap();

        // Fails without permission to overwrite
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join(MACC_FILE_NAME).exists());

        // Old contents are deleted when overwriting
        let result = create_output_directory(&output_dir, true).unwrap();
        assert!(result);
        assert!(output_dir.is_dir());
        assert!(!output_dir.join(MACC_FILE_NAME).exists());
    }
}
