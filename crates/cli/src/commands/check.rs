//! `rolescope check` — Construction and integrity validation.

use std::path::Path;

use rolescope_core::check_integrity;

use super::{CommandResult, load_condition};

pub fn run(file: &Path) -> CommandResult {
    println!("🔍 Checking {}...", file.display());

    let condition = match load_condition(file) {
        Ok(condition) => condition,
        Err(e) => {
            println!("   ❌ {e}");
            std::process::exit(1);
        }
    };
    println!("   ✅ Well-formed ({} nodes)", condition.node_count());

    match check_integrity(&condition) {
        Ok(()) => println!("   ✅ Integrity checks passed"),
        Err(e) => {
            println!("   ❌ {e}");
            std::process::exit(1);
        }
    }
    Ok(())
}
