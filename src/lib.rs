//! Common functionality for building marginal abatement cost curves (MACCs) for the replacement
//! of fossil fuel power plants.
#![warn(missing_docs)]
use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod assessment;
pub mod capacity_factor;
pub mod cli;
pub mod cost;
pub mod finance;
pub mod fuel;
pub mod id;
pub mod input;
pub mod log;
pub mod macc;
pub mod model;
pub mod output;
pub mod plant;
pub mod replacement;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the directory where the program's config files are stored
pub fn get_macc_config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Could not determine the user's config directory")?;
    path.push("macc");

    Ok(path)
}
