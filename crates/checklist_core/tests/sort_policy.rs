use checklist_core::{order, ChecklistConfig, ChecklistItem, SortMode};

fn item(id: i64, title: &str, done: bool, created_at: Option<i64>) -> ChecklistItem {
    ChecklistItem {
        id,
        created_at,
        title: title.to_string(),
        is_done: done,
    }
}

fn titles(items: &[ChecklistItem]) -> Vec<&str> {
    items.iter().map(|item| item.title.as_str()).collect()
}

fn config(sort_mode: SortMode, move_done: bool) -> ChecklistConfig {
    ChecklistConfig {
        sort_mode,
        move_done_items_to_bottom: move_done,
        ..ChecklistConfig::default()
    }
}

#[test]
fn custom_order_with_done_overlay_keeps_group_order() {
    let items = vec![
        item(1, "A", false, None),
        item(2, "B", true, None),
        item(3, "C", false, None),
        item(4, "D", true, None),
    ];

    let ordered = order(&items, &config(SortMode::Custom, true));
    assert_eq!(titles(&ordered), vec!["A", "C", "B", "D"]);
}

#[test]
fn custom_order_without_overlay_is_untouched() {
    let items = vec![
        item(9, "zeta", true, None),
        item(1, "alpha", false, None),
        item(5, "mid", true, None),
    ];

    let ordered = order(&items, &config(SortMode::Custom, false));
    assert_eq!(ordered, items);
}

#[test]
fn alphabetical_is_case_insensitive_and_numeric_aware() {
    let items = vec![
        item(1, "item 10", false, None),
        item(2, "Banana", false, None),
        item(3, "item 2", false, None),
        item(4, "apple", false, None),
    ];

    let ordered = order(&items, &config(SortMode::Alphabetical, false));
    assert_eq!(titles(&ordered), vec!["apple", "Banana", "item 2", "item 10"]);
}

#[test]
fn alphabetical_then_done_overlay() {
    let items = vec![
        item(1, "cherry", false, None),
        item(2, "apple", true, None),
        item(3, "banana", false, None),
        item(4, "date", true, None),
    ];

    let ordered = order(&items, &config(SortMode::Alphabetical, true));
    assert_eq!(titles(&ordered), vec!["banana", "cherry", "apple", "date"]);
}

#[test]
fn equal_keys_keep_input_order() {
    let items = vec![
        item(5, "Milk", false, None),
        item(2, "milk", false, None),
        item(8, "apple", false, None),
    ];

    let ordered = order(&items, &config(SortMode::Alphabetical, false));
    let ids: Vec<i64> = ordered.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![8, 5, 2]);
}

#[test]
fn equal_timestamps_keep_input_order_in_both_directions() {
    let items = vec![
        item(4, "first", false, Some(1_000)),
        item(1, "second", false, Some(1_000)),
        item(9, "later", false, Some(2_000)),
    ];

    let ascending = order(&items, &config(SortMode::DateCreated, false));
    assert_eq!(titles(&ascending), vec!["first", "second", "later"]);

    let descending = ChecklistConfig {
        sort_descending: true,
        ..config(SortMode::DateCreated, false)
    };
    let ordered = order(&items, &descending);
    assert_eq!(titles(&ordered), vec!["later", "first", "second"]);
}

#[test]
fn date_created_treats_missing_timestamp_as_oldest() {
    let items = vec![
        item(1, "newest", false, Some(3_000)),
        item(2, "legacy", false, None),
        item(3, "older", false, Some(1_000)),
    ];

    let ordered = order(&items, &config(SortMode::DateCreated, false));
    assert_eq!(titles(&ordered), vec!["legacy", "older", "newest"]);
}

#[test]
fn descending_reverses_comparator_but_not_done_overlay() {
    let items = vec![
        item(1, "a", false, None),
        item(2, "b", true, None),
        item(3, "c", false, None),
    ];
    let descending = ChecklistConfig {
        sort_mode: SortMode::InsertionOrder,
        sort_descending: true,
        move_done_items_to_bottom: true,
        ..ChecklistConfig::default()
    };

    let ordered = order(&items, &descending);
    assert_eq!(titles(&ordered), vec!["c", "a", "b"]);
}

#[test]
fn descending_is_ignored_in_custom_mode() {
    let items = vec![item(2, "b", false, None), item(1, "a", false, None)];
    let custom = ChecklistConfig {
        sort_descending: true,
        ..ChecklistConfig::default()
    };

    assert_eq!(order(&items, &custom), items);
}

#[test]
fn ordering_is_idempotent() {
    let items = vec![
        item(4, "d", true, Some(10)),
        item(1, "a", false, Some(40)),
        item(3, "c", true, Some(20)),
        item(2, "b", false, Some(30)),
    ];

    for mode in [
        SortMode::Custom,
        SortMode::Alphabetical,
        SortMode::DateCreated,
        SortMode::InsertionOrder,
    ] {
        for move_done in [false, true] {
            let snapshot = config(mode, move_done);
            let once = order(&items, &snapshot);
            let twice = order(&once, &snapshot);
            assert_eq!(once, twice, "mode={mode:?} move_done={move_done}");
        }
    }
}
