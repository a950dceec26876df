//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `inventory_core` linkage without the Flutter runtime.
//! - Run one in-memory insert/list/delete-all pass with deterministic output.

use inventory_core::db::open_db_in_memory;
use inventory_core::{InventoryService, ItemUri, SqliteItemRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("inventory_core ping={}", inventory_core::ping());
    println!("inventory_core version={}", inventory_core::core_version());

    match smoke_roundtrip() {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("inventory_core smoke=failed error={err}");
            ExitCode::FAILURE
        }
    }
}

fn smoke_roundtrip() -> Result<String, Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let service = InventoryService::new(SqliteItemRepository::try_new(&conn)?);

    let uri = service.insert_sample()?;
    let listed = service.list_items()?.len();
    let removed = service.delete(ItemUri::Collection)?;

    Ok(format!(
        "inventory_core smoke=ok inserted={uri} listed={listed} removed={removed}"
    ))
}
