pub mod table;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print a serializable value as JSON to stdout, for `--json` mode.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
