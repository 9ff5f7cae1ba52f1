//! Code for reading the plants CSV file.
use super::{input_err_msg, read_csv};
use crate::plant::Plant;
use anyhow::{Context, Result, ensure};
use std::collections::HashSet;
use std::path::Path;

const PLANTS_FILE_NAME: &str = "plants.csv";

/// Read the existing plants from the plants CSV file.
///
/// Records are returned in file order. Their values are not checked here (see
/// [`crate::plant::clean_plants`]), but plant IDs must be unique.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_plants(model_dir: &Path) -> Result<Vec<Plant>> {
    let file_path = model_dir.join(PLANTS_FILE_NAME);
    let plants = read_csv(&file_path)?;
    read_plants_from_iter(plants).with_context(|| input_err_msg(&file_path))
}

fn read_plants_from_iter<I>(iter: I) -> Result<Vec<Plant>>
where
    I: Iterator<Item = Plant>,
{
    let mut ids = HashSet::new();
    let mut plants = Vec::new();
    for plant in iter {
        ensure!(
            ids.insert(plant.id.clone()),
            "Duplicate plant ID found: {}",
            plant.id
        );
        plants.push(plant);
    }

    Ok(plants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, plant};
    use crate::fuel::Fuel;
    use crate::units::{Capacity, Emissions};
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Create an example plants file in dir_path
    fn create_plants_file(dir_path: &Path) {
        let file_path = dir_path.join(PLANTS_FILE_NAME);
        let mut file = File::create(file_path).unwrap();
        writeln!(
            file,
            "id,state,latitude,longitude,commissioning_year,primary_fuel,capacity,generation,\
fuel_consumption,emissions
plant1,TX,31.0,-97.0,2000,Coal,100.0,400000000.0,4000000.0,200000.0
plant2,CA,36.5,-119.5,1995,Gas_CC,250.0,900000000.0,6300000.0,334000.0"
        )
        .unwrap();
    }

    #[rstest]
    fn test_read_plants(plant: Plant) {
        let dir = tempdir().unwrap();
        create_plants_file(dir.path());
        let plants = read_plants(dir.path()).unwrap();

        assert_eq!(plants.len(), 2);
        assert_eq!(plants[0], plant);
        assert_eq!(plants[1].primary_fuel, Fuel::GasCombinedCycle);
        assert_eq!(plants[1].capacity, Capacity(250.0));
        assert_eq!(plants[1].emissions, Emissions(334000.0));
    }

    #[rstest]
    fn test_read_plants_from_iter_duplicate(plant: Plant) {
        assert_error!(
            read_plants_from_iter([plant.clone(), plant].into_iter()),
            "Duplicate plant ID found: plant1"
        );
    }

    #[test]
    fn test_read_plants_unknown_fuel() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(PLANTS_FILE_NAME);
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(
                file,
                "id,state,latitude,longitude,commissioning_year,primary_fuel,capacity,generation,\
fuel_consumption,emissions
plant1,TX,31.0,-97.0,2000,Nuclear,100.0,400000000.0,4000000.0,200000.0"
            )
            .unwrap();
        }

        assert!(read_plants(dir.path()).is_err());
    }
}
