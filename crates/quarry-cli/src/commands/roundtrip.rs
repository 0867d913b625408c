//! Roundtrip command implementation.

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use quarry_bloq::interop;
use quarry_circuit::{Circuit, SimpleQubitManager};

use super::common::{default_quregs, load_circuit, load_config};

/// Execute the roundtrip command.
pub fn execute(input: &str, config: Option<&str>) -> Result<()> {
    println!(
        "{} Round-tripping {}",
        style("→").cyan().bold(),
        style(input).green()
    );

    let config = load_config(config)?;
    let circuit = load_circuit(input)?;

    let cbloq = interop::import_with_config(&circuit, None, None, None, &config)
        .context("Failed to import circuit")?;
    println!("  Imported: {} instances", cbloq.bloq_instances().len());

    let quregs = default_quregs(&circuit, &config)?;
    let mut qm = SimpleQubitManager::new();
    let (exported, out) =
        interop::export_with_config(cbloq.signature(), &quregs, &cbloq, &mut qm, &config)
            .context("Failed to export composite bloq")?;
    debug!(operations = exported.len(), "exported circuit");

    if out != quregs {
        anyhow::bail!("Output registers do not match the input qubits");
    }

    let expected = sorted_ops(&circuit);
    let actual = sorted_ops(&exported);
    if expected != actual {
        for (a, b) in expected.iter().zip(actual.iter()).filter(|(a, b)| a != b) {
            debug!(expected = %a, actual = %b, "operation mismatch");
        }
        anyhow::bail!(
            "Round trip changed the circuit: {} ops in, {} ops out",
            expected.len(),
            actual.len()
        );
    }

    println!(
        "{} Round trip preserved {} ops",
        style("✓").green().bold(),
        actual.len()
    );
    if exported == circuit {
        println!("  Operation order unchanged");
    }

    Ok(())
}

/// Operations of `circuit` as sorted display strings.
fn sorted_ops(circuit: &Circuit) -> Vec<String> {
    let mut ops: Vec<String> = circuit.operations().iter().map(ToString::to_string).collect();
    ops.sort();
    ops
}
