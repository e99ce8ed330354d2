/// Bulk and Row Actions Example
///
/// This example demonstrates:
/// - Selecting rows and applying bulk actions
/// - Row context-menu actions (duplicate, reassign, delete)
/// - Announcements returned by each action

use dealtable::{Action, BulkAction, CellInput, DealsTable, MemoryStorage, Outcome, RowAction};

fn report(step: &str, outcome: &Outcome) {
    match &outcome.announcement {
        Some(message) => println!("   {} -> \"{}\"", step, message),
        None => println!("   {} -> (no announcement)", step),
    }
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== DealTable Bulk Actions Example ===\n");

    let mut table = DealsTable::new(MemoryStorage::new());

    // 1. Select two deals and close them
    println!("1. Selecting deals 1 and 2...");
    for id in ["1", "2"] {
        table.apply(Action::ToggleRowSelection { row_id: id.to_string() });
    }
    let outcome = table.apply(Action::Bulk {
        action: BulkAction::ChangeStage("closed-won".to_string()),
    });
    report("change stage", &outcome);
    let totals = table.totals();
    println!(
        "   Selection totals: {} deals, {:.0} value, {:.0}% won\n",
        totals.total_deals, totals.total_value, totals.conversion_rate
    );

    // 2. Reassign and email
    println!("2. Reassigning the selection...");
    let outcome = table.apply(Action::Bulk {
        action: BulkAction::ChangeOwner("emma-brown".to_string()),
    });
    report("change owner", &outcome);
    let outcome = table.apply(Action::Bulk { action: BulkAction::Email });
    report("email", &outcome);
    println!();

    // 3. Row actions
    println!("3. Row actions on deal 3...");
    let outcome = table.apply(Action::Row {
        deal_id: "3".to_string(),
        action: RowAction::Duplicate,
    });
    report("duplicate", &outcome);
    let outcome = table.apply(Action::Row {
        deal_id: "3".to_string(),
        action: RowAction::Meeting,
    });
    report("meeting", &outcome);
    println!("   Deals now: {}\n", table.store().len());

    // 4. Inline edit
    println!("4. Editing deal 5's value...");
    table.apply(Action::UpdateCell {
        row_id: "5".to_string(),
        column_id: "dealValue".to_string(),
        value: CellInput::text("$72,500"),
    });
    println!("   Deal 5 value: {:.0}\n", table.store().get("5").map_or(0.0, |d| d.deal_value));

    // 5. Delete the selection
    println!("5. Deleting the selection...");
    let outcome = table.apply(Action::Bulk { action: BulkAction::Delete });
    report("delete", &outcome);
    println!("   Deals left: {}", table.store().len());

    println!("\n=== Example Complete ===");
}
