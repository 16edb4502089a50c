use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;

const DOMAIN_PACKAGE_NAME: &str = "apotheca-domain";
const FORBIDDEN_DOMAIN_DEPENDENCIES: &[&str] = &[
    "apotheca-auth",
    "apotheca-store",
    "apotheca-webapp",
    "axum",
    "sqlx",
    "tokio",
];

// The read-model crate must stay free of web and database machinery so every
// other crate can depend on it without cycles.
fn main() -> Result<()> {
    let metadata = MetadataCommand::new()
        .exec()
        .context("failed to run `cargo metadata`")?;

    let resolve = metadata
        .resolve
        .as_ref()
        .context("`cargo metadata` did not include a resolved dependency graph")?;

    let domain = metadata
        .packages
        .iter()
        .find(|p| p.name == DOMAIN_PACKAGE_NAME)
        .with_context(|| format!("package `{}` not found in workspace", DOMAIN_PACKAGE_NAME))?;

    let id_to_name: HashMap<_, _> = metadata
        .packages
        .iter()
        .map(|p| (p.id.clone(), p.name.as_str()))
        .collect();

    let adjacency: HashMap<_, _> = resolve
        .nodes
        .iter()
        .map(|node| {
            let deps: Vec<_> = node.deps.iter().map(|dep| dep.pkg.clone()).collect();
            (node.id.clone(), deps)
        })
        .collect();

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(domain.id.clone());
    visited.insert(domain.id.clone());

    let mut violations = Vec::new();

    while let Some(current) = queue.pop_front() {
        let Some(deps) = adjacency.get(&current) else {
            continue;
        };

        for dep in deps.iter().cloned() {
            if !visited.insert(dep.clone()) {
                continue;
            }

            if let Some(name) = id_to_name.get(&dep) {
                if FORBIDDEN_DOMAIN_DEPENDENCIES.contains(name) {
                    violations.push((*name).to_string());
                }
            }

            queue.push_back(dep);
        }
    }

    if !violations.is_empty() {
        violations.sort();
        violations.dedup();
        eprintln!(
            "FAIL: `{}` depends on forbidden crate(s): {}",
            DOMAIN_PACKAGE_NAME,
            violations.join(", ")
        );
        std::process::exit(1);
    }

    println!(
        "OK: `{}` has no dependency edge to {}",
        DOMAIN_PACKAGE_NAME,
        FORBIDDEN_DOMAIN_DEPENDENCIES.join(", ")
    );

    Ok(())
}
