//! Version command implementation.

use console::style;

use quarry_bloq::{InteropConfig, TraversalOrder};

/// Workspace crates linked into the binary, with their versions.
fn components() -> [(&'static str, &'static str, &'static str); 3] {
    [
        ("quarry-circuit", quarry_circuit::VERSION, "flat circuits"),
        ("quarry-bloq", quarry_bloq::VERSION, "bloq graphs and circuit interop"),
        ("quarry-cli", env!("CARGO_PKG_VERSION"), "command-line interface"),
    ]
}

fn traversal_name(order: TraversalOrder) -> &'static str {
    match order {
        TraversalOrder::Greedy => "greedy",
        TraversalOrder::Insertion => "insertion",
    }
}

/// Execute the version command.
pub fn execute() {
    println!(
        "{} {}",
        style("quarry").cyan().bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).yellow()
    );
    for (name, version, role) in components() {
        println!("  {name:<16}{:<10}{}", style(version).yellow(), style(role).dim());
    }

    let defaults = InteropConfig::default();
    println!();
    println!(
        "Defaults: register '{}', {} traversal",
        defaults.default_register,
        traversal_name(defaults.traversal)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_share_workspace_version() {
        let components = components();
        assert!(components.iter().all(|(_, v, _)| *v == env!("CARGO_PKG_VERSION")));
        assert_eq!(components[1].0, "quarry-bloq");
    }

    #[test]
    fn test_traversal_names_match_config_json() {
        for order in [TraversalOrder::Greedy, TraversalOrder::Insertion] {
            let json = format!(r#"{{"traversal":"{}"}}"#, traversal_name(order));
            assert_eq!(InteropConfig::from_json(&json).unwrap().traversal, order);
        }
    }
}
