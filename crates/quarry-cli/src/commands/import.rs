//! Import command implementation.

use anyhow::{Context, Result};
use console::style;

use quarry_bloq::interop;

use super::common::{load_circuit, load_config};

/// Execute the import command.
pub fn execute(input: &str, config: Option<&str>) -> Result<()> {
    println!(
        "{} Importing {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let config = load_config(config)?;
    let circuit = load_circuit(input)?;
    println!(
        "  Loaded: {} qubits, {} ops",
        circuit.all_qubits().len(),
        circuit.len()
    );

    let cbloq = interop::import_with_config(&circuit, None, None, None, &config)
        .context("Failed to import circuit")?;

    println!("{} Import complete", style("✓").green().bold());
    println!(
        "  Result: {} instances, {} connections",
        cbloq.bloq_instances().len(),
        cbloq.connections().len()
    );
    for reg in cbloq.signature().iter() {
        println!("  Register: {}", style(reg).yellow());
    }
    println!();
    print!("{}", cbloq.debug_text()?);

    Ok(())
}
