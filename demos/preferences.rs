/// UI Preferences Example
///
/// This example demonstrates:
/// - Persisting column layout, sorts and widths to a directory
/// - Reopening the table and getting the same view back
/// - Falling back to defaults when the stored blob is corrupt

use dealtable::{
    Action, ColumnCommand, DealStore, DealsTable, FileStorage, MoveDirection, Storage,
    SystemClock, TableConfig, STORAGE_KEY,
};
use std::error::Error;

fn open(dir: &std::path::Path) -> Result<DealsTable<FileStorage>, Box<dyn Error>> {
    Ok(DealsTable::with_parts(
        DealStore::seeded(),
        FileStorage::new(dir)?,
        SystemClock,
        TableConfig::default(),
    ))
}

fn print_columns(table: &DealsTable<FileStorage>) {
    let visible: Vec<&str> = table.columns().visible().map(|c| c.id.as_str()).collect();
    println!("   Visible columns: {}", visible.join(", "));
    println!("   Table width:     {:.0}px", table.total_width());
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== DealTable Preferences Example ===\n");

    let dir = std::env::temp_dir().join("dealtable-preferences-demo");

    // 1. Customize the grid
    println!("1. Customizing the layout in {}...", dir.display());
    let mut table = open(&dir)?;
    table.apply(Action::ResetColumns);
    table.apply(Action::ToggleColumn { column_id: "contacts".to_string() });
    table.apply(Action::ColumnAction {
        column_id: "owner".to_string(),
        action: ColumnCommand::Move(MoveDirection::Left),
    });
    table.apply(Action::ResizeColumn { column_id: "deal".to_string(), width: 260.0 });
    table.apply(Action::ToggleTemplate {
        template_id: "forecastValue".to_string(),
        selected: true,
    });
    print_columns(&table);
    println!();

    // 2. Reopen
    println!("2. Reopening from disk...");
    let table = open(&dir)?;
    print_columns(&table);
    println!("   Templates:       {:?}\n", table.ui_state().selected_templates);

    // 3. Corrupt the blob
    println!("3. Corrupting the stored state...");
    let mut storage = FileStorage::new(&dir)?;
    storage.set_item(STORAGE_KEY, "{ not json")?;
    let table = open(&dir)?;
    print_columns(&table);

    storage.remove_item(STORAGE_KEY)?;
    println!("\n=== Example Complete ===");
    Ok(())
}
