use anyhow::Result;
use colored::*;
use crosscheck_engine::AdapterRegistry;

pub fn execute() -> Result<()> {
    let registry = AdapterRegistry::builtin();

    println!("{}", "Supported scanners:".bold());
    for (tool, description) in registry.list() {
        println!("  {}  {}", tool.as_str().bright_cyan(), description);
    }

    Ok(())
}
