//! Property-based tests for the deals pipeline, column layout and preferences.

use chrono::NaiveDate;
use dealtable::{
    aggregate, filter, filter_positions, sort, sort_positions, ColumnLayout, Contacts, Deal,
    FilterCriteria, MemoryStorage, PreferenceStore, SortDirection, SortKey, SortSpec, Stage,
    UiState, OWNERS, TEMPLATES,
};
use proptest::prelude::*;
use std::cmp::Ordering;

const COLUMN_IDS: [&str; 13] = [
    "select",
    "expand",
    "deal",
    "stage",
    "dealValue",
    "owner",
    "expectedClose",
    "activitiesTimeline",
    "lastInteraction",
    "quotesInvoices",
    "contacts",
    "accounts",
    "forecastValue",
];

const SORTABLE: [&str; 8] = [
    "deal",
    "stage",
    "dealValue",
    "owner",
    "expectedClose",
    "accounts",
    "forecastValue",
    "contacts",
];

fn stage_strategy() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

fn owner_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(OWNERS.iter().map(|o| o.name.to_string()).collect::<Vec<_>>())
}

fn deal_strategy() -> impl Strategy<Value = (String, Stage, u32, String, Vec<String>, String)> {
    (
        "[A-Za-z ]{0,12}",
        stage_strategy(),
        0u32..250_000,
        owner_strategy(),
        prop::collection::vec("[A-Z][a-z]{1,6}", 0..3),
        prop::option::of((2024i32..2026, 1u32..13, 1u32..29))
            .prop_map(|date| match date {
                Some((y, m, d)) => format!("{:04}-{:02}-{:02}", y, m, d),
                None => String::new(),
            }),
    )
}

fn deals_strategy() -> impl Strategy<Value = Vec<Deal>> {
    prop::collection::vec(deal_strategy(), 0..25).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (name, stage, value, owner, contacts, close))| {
                Deal::new(i.to_string(), name)
                    .with_stage(stage)
                    .with_value(value as f64)
                    .with_forecast(value as f64 * 0.9)
                    .with_owner(owner)
                    .with_contacts(contacts.into_iter().collect::<Contacts>())
                    .with_expected_close(close)
            })
            .collect()
    })
}

fn criteria_strategy() -> impl Strategy<Value = FilterCriteria> {
    (
        "[a-z]{0,2}",
        prop::sample::subsequence(Stage::ALL.iter().map(|s| s.label().to_string()).collect::<Vec<_>>(), 0..3),
        prop::sample::subsequence(OWNERS.iter().map(|o| o.name.to_string()).collect::<Vec<_>>(), 0..3),
        0u32..250_000,
        0u32..250_000,
    )
        .prop_map(|(search, stages, owners, min, max)| {
            FilterCriteria::new()
                .with_search(search)
                .with_stages(stages)
                .with_owners(owners)
                .with_range(min as f64, max as f64)
        })
}

fn sort_spec_strategy() -> impl Strategy<Value = SortSpec> {
    prop::collection::vec(
        (prop::sample::select(SORTABLE.to_vec()), any::<bool>()),
        0..4,
    )
    .prop_map(|keys| {
        SortSpec::from(
            keys.into_iter()
                .map(|(column, asc)| {
                    let direction = if asc { SortDirection::Asc } else { SortDirection::Desc };
                    SortKey::new(column, direction)
                })
                .collect::<Vec<_>>(),
        )
    })
}

#[derive(Debug, Clone)]
enum LayoutOp {
    Toggle(&'static str),
    Hide(&'static str),
    Reorder(&'static str, &'static str),
    MoveLeft(&'static str),
    MoveRight(&'static str),
    ShowAll,
    HideAll,
    Reset,
}

fn apply_layout_op(layout: &mut ColumnLayout, op: LayoutOp) {
    match op {
        LayoutOp::Toggle(id) => {
            layout.toggle_visibility(id);
        }
        LayoutOp::Hide(id) => {
            layout.hide(id);
        }
        LayoutOp::Reorder(from, to) => {
            layout.reorder(from, to);
        }
        LayoutOp::MoveLeft(id) => {
            layout.move_left(id);
        }
        LayoutOp::MoveRight(id) => {
            layout.move_right(id);
        }
        LayoutOp::ShowAll => layout.show_all(),
        LayoutOp::HideAll => layout.hide_all(),
        LayoutOp::Reset => layout.reset_to_default(),
    }
}

/// Each filter clause evaluated by hand: search, stage, owner, value range.
fn clause_results(deal: &Deal, criteria: &FilterCriteria) -> [bool; 4] {
    let needle = criteria.search.to_lowercase();
    let haystacks = [
        deal.deal.to_lowercase(),
        deal.owner.to_lowercase(),
        deal.accounts.to_lowercase(),
        deal.contacts.to_display().to_lowercase(),
    ];
    let search = needle.is_empty() || haystacks.iter().any(|h| h.contains(&needle));
    let stage = criteria.stage.is_empty()
        || criteria.stage.iter().any(|label| label == deal.stage.label());
    let owner = criteria.owner.is_empty() || criteria.owner.contains(&deal.owner);
    let (min, max) = criteria.deal_value_range;
    let range = min <= deal.deal_value && deal.deal_value <= max;
    [search, stage, owner, range]
}

fn template_ids() -> Vec<String> {
    TEMPLATES.iter().map(|t| t.id.to_string()).collect()
}

fn layout_op_strategy() -> impl Strategy<Value = LayoutOp> {
    let id = || prop::sample::select(COLUMN_IDS.to_vec());
    prop_oneof![
        id().prop_map(LayoutOp::Toggle),
        id().prop_map(LayoutOp::Hide),
        (id(), id()).prop_map(|(a, b)| LayoutOp::Reorder(a, b)),
        id().prop_map(LayoutOp::MoveLeft),
        id().prop_map(LayoutOp::MoveRight),
        Just(LayoutOp::ShowAll),
        Just(LayoutOp::HideAll),
        Just(LayoutOp::Reset),
    ]
}

proptest! {
    #[test]
    fn filter_keeps_exactly_the_matching_records(
        deals in deals_strategy(),
        criteria in criteria_strategy(),
    ) {
        let kept = filter(&deals, &criteria);
        let positions = filter_positions(&deals, &criteria);
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(positions.len(), kept.len());

        for (i, deal) in deals.iter().enumerate() {
            let clauses = clause_results(deal, &criteria);
            if positions.contains(&i) {
                prop_assert!(clauses.iter().all(|c| *c), "kept {:?} failing {:?}", deal.id, clauses);
            } else {
                prop_assert!(clauses.iter().any(|c| !*c), "dropped {:?} passing every clause", deal.id);
            }
        }
        for (position, deal) in positions.iter().zip(&kept) {
            prop_assert!(std::ptr::eq(&deals[*position], *deal));
        }
    }

    #[test]
    fn sort_is_ordered_and_stable(deals in deals_strategy(), spec in sort_spec_strategy()) {
        let mut positions: Vec<usize> = (0..deals.len()).collect();
        sort_positions(&deals, &mut positions, &spec);

        let mut seen = positions.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..deals.len()).collect::<Vec<_>>());

        for pair in positions.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match spec.compare(&deals[a], &deals[b]) {
                Ordering::Less => {}
                Ordering::Equal => prop_assert!(a < b, "tie out of input order"),
                Ordering::Greater => prop_assert!(false, "rows out of order"),
            }
        }
    }

    #[test]
    fn empty_sort_spec_is_identity(deals in deals_strategy()) {
        let rows: Vec<&Deal> = deals.iter().collect();
        prop_assert_eq!(sort(&rows, &SortSpec::new()), rows);
    }

    #[test]
    fn aggregate_is_repeatable_and_safe(deals in deals_strategy()) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let first = aggregate(&deals, today);
        let second = aggregate(&deals, today);
        prop_assert_eq!(&first, &second);

        prop_assert!(first.avg_deal_value.is_finite());
        prop_assert!((0.0..=100.0).contains(&first.conversion_rate));
        prop_assert_eq!(first.stage_breakdown.values().sum::<usize>(), deals.len());
        prop_assert!(first.closing_soon <= deals.len());
    }

    #[test]
    fn locked_columns_stay_visible(ops in prop::collection::vec(layout_op_strategy(), 0..30)) {
        let mut layout = ColumnLayout::default();
        for op in ops {
            apply_layout_op(&mut layout, op);
            prop_assert!(layout.columns().iter().filter(|c| c.locked).all(|c| c.visible));
            prop_assert_eq!(layout.len(), COLUMN_IDS.len());
        }
    }

    #[test]
    fn preferences_round_trip(
        criteria in criteria_strategy(),
        spec in sort_spec_strategy(),
        expanded in prop::collection::vec("[0-9]{1,3}", 0..5),
        widths in prop::collection::btree_map(prop::sample::select(COLUMN_IDS.to_vec()), 80u32..400, 0..4),
        ops in prop::collection::vec(layout_op_strategy(), 0..10),
        selection in prop::collection::btree_map("[0-9]{1,3}", any::<bool>(), 0..6),
        templates in prop::sample::subsequence(template_ids(), 0..4),
        headers in prop::collection::btree_map(prop::sample::select(template_ids()), "[A-Za-z]{1,8}", 0..4),
    ) {
        let mut layout = ColumnLayout::default();
        for op in ops {
            apply_layout_op(&mut layout, op);
        }

        let mut state = UiState::default();
        state.column_config = layout;
        state.filters = criteria;
        state.sorts = spec;
        state.row_selection = selection;
        state.expanded_rows = expanded;
        state.selected_templates = templates;
        state.header_values = headers;
        state.column_widths = widths.into_iter().map(|(id, w)| (id.to_string(), w as f64)).collect();

        let mut prefs = PreferenceStore::open(MemoryStorage::new());
        prefs.save_state(state.clone());

        let reloaded = PreferenceStore::open(prefs.into_storage());
        prop_assert_eq!(reloaded.state(), &state);
    }

    #[test]
    fn arbitrary_blobs_never_break_loading(raw in "\\PC{0,64}") {
        let state = UiState::from_json_overlay(&raw);
        prop_assert!(state.column_config.columns().iter().filter(|c| c.locked).all(|c| c.visible));
        prop_assert!(!state.column_config.is_empty());
    }
}
