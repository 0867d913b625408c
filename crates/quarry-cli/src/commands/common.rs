//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{ArrayD, IxDyn};
use quarry_bloq::InteropConfig;
use quarry_bloq::interop::QuregMap;
use quarry_circuit::Circuit;

/// Load a circuit from a JSON file.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !ext.eq_ignore_ascii_case("json") {
        anyhow::bail!("Unsupported circuit format: '{ext}' (expected .json)");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    Circuit::from_json(&source).with_context(|| format!("Failed to parse circuit: {path}"))
}

/// Load interop settings, falling back to the defaults.
pub fn load_config(path: Option<&str>) -> Result<InteropConfig> {
    let Some(path) = path else {
        return Ok(InteropConfig::default());
    };
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    InteropConfig::from_json(&source).with_context(|| format!("Invalid config: {path}"))
}

/// Qubit arrays for the default register of an imported `circuit`.
pub fn default_quregs(circuit: &Circuit, config: &InteropConfig) -> Result<QuregMap> {
    let qubits = circuit.all_qubits();
    let n = qubits.len();
    let arr = ArrayD::from_shape_vec(IxDyn(&[n, 1]), qubits)?;
    Ok(QuregMap::from([(config.default_register.clone(), arr)]))
}
