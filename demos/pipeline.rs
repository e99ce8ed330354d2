/// Deals Pipeline Example
///
/// This example demonstrates:
/// - Filtering the seed deals by stage and value range
/// - Multi-column sorting
/// - Summary totals and the footer breakdown

use dealtable::{Action, DealsTable, FilterCriteria, MemoryStorage, SortKey, SortSpec};

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== DealTable Pipeline Example ===\n");

    let mut table = DealsTable::new(MemoryStorage::new());

    // 1. Everything
    println!("1. All deals:");
    for deal in table.visible_rows() {
        println!(
            "   {:<2} {:<32} {:<12} {:>10.0}  {}",
            deal.id, deal.deal, deal.stage, deal.deal_value, deal.owner
        );
    }
    println!();

    // 2. Filter
    println!("2. Open deals between 50k and 150k...");
    table.apply(Action::SetFilters {
        filters: FilterCriteria::new()
            .with_stages(["Discovery", "Proposal", "Negotiation"])
            .with_range(50_000.0, 150_000.0),
    });
    for deal in table.visible_rows() {
        println!("   {:<2} {:<32} {:>10.0}", deal.id, deal.deal, deal.deal_value);
    }
    println!();

    // 3. Sort by owner, then value descending
    println!("3. Sorted by owner, then value descending...");
    table.apply(Action::SetSorts {
        sorts: SortSpec::from(vec![
            SortKey::ascending("owner"),
            SortKey::descending("dealValue"),
        ]),
    });
    for deal in table.visible_rows() {
        println!("   {:<14} {:>10.0}  {}", deal.owner, deal.deal_value, deal.deal);
    }
    println!();

    // 4. Totals
    let totals = table.totals();
    println!("4. Totals over visible rows:");
    println!("   Deals:           {}", totals.total_deals);
    println!("   Pipeline value:  {:.0}", totals.total_value);
    println!("   Forecast:        {:.0}", totals.total_forecast);
    println!("   Average value:   {:.0}", totals.avg_deal_value);
    println!("   Conversion rate: {:.1}%", totals.conversion_rate);
    println!("   Closing soon:    {}", totals.closing_soon);
    println!("   Stages:          {:?}", totals.stage_breakdown);

    let summary = table.summary();
    println!(
        "   Showing {} of {} deals, owners: {:?}",
        summary.visible, summary.total, summary.owner_breakdown
    );

    println!("\n=== Example Complete ===");
}
