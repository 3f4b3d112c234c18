use crate::core::counter::ServiceCounter;
use crate::core::errors::CounterError;
use crate::core::routing::Placement;
use crate::core::types::Customer;

fn customer(name: &str, units: u32) -> Customer {
    Customer::new(name, "Guest", units)
}

fn lane_names(counter: &ServiceCounter, lane: usize) -> Vec<Option<String>> {
    counter.lanes()[lane]
        .slots()
        .iter()
        .map(|slot| slot.as_ref().map(|c| c.first_name().to_string()))
        .collect()
}

fn assert_all_left_packed(counter: &ServiceCounter) {
    for lane in counter.lanes() {
        assert!(lane.is_left_packed(), "lane {} has a hole: {:?}", lane.id(), lane.slots());
    }
}

fn filled_counter() -> ServiceCounter {
    let mut counter = ServiceCounter::from_layout(&[2, 3, 5], 3).unwrap();
    for (name, units) in [("A", 2), ("B", 1), ("C", 3), ("D", 1), ("E", 1), ("F", 1), ("G", 1)] {
        counter.add_customer(customer(name, units)).unwrap();
    }
    counter
}

#[test]
fn test_arrivals_fill_smallest_lane_first() {
    let counter = filled_counter();
    assert_eq!(counter.routing_order().as_slice(), &[0, 1, 2]);

    let some = |name: &str| Some(name.to_string());
    assert_eq!(lane_names(&counter, 0), vec![some("A"), some("B")]);
    assert_eq!(lane_names(&counter, 1), vec![some("C"), some("D"), some("E")]);
    assert_eq!(lane_names(&counter, 2), vec![some("F"), some("G"), None, None, None]);
}

#[test]
fn test_serve_debits_stock_and_credits_income() {
    let mut counter = filled_counter();
    counter.set_stock(5).unwrap();

    let departure = counter.serve_customer(0).unwrap();
    assert_eq!(departure.customer.first_name(), "A");
    assert_eq!(departure.refill, None);
    assert_eq!(counter.stock(), 3);
    assert_eq!(counter.lane_income(0).unwrap(), 1300);
    assert_eq!(lane_names(&counter, 0), vec![Some("B".to_string()), None]);
    assert_all_left_packed(&counter);
}

#[test]
fn test_insufficient_stock_leaves_state_unchanged() {
    let mut counter = filled_counter();
    counter.set_stock(1).unwrap();
    let before = counter.clone();

    let err = counter.serve_customer(0).unwrap_err();
    assert!(matches!(err, CounterError::InsufficientStock { required: 2, available: 1 }));
    assert_eq!(counter, before);
    assert_eq!(counter.stock(), 1);
    assert_eq!(counter.total_income(), 0);
}

#[test]
fn test_stock_is_shared_across_lanes() {
    let mut counter = filled_counter();
    counter.set_stock(5).unwrap();

    counter.serve_customer(0).unwrap();
    counter.serve_customer(1).unwrap();
    assert_eq!(counter.stock(), 0);
    assert_eq!(counter.lane_income(0).unwrap(), 1300);
    assert_eq!(counter.lane_income(1).unwrap(), 1950);
    assert_eq!(counter.total_income(), 3250);

    assert!(matches!(
        counter.serve_customer(2),
        Err(CounterError::InsufficientStock { required: 1, available: 0 })
    ));
}

#[test]
fn test_overflow_and_backfill() {
    let mut counter = ServiceCounter::from_layout(&[1, 2], 2).unwrap();
    let placements: Vec<_> = ["A", "B", "C", "D", "E"]
        .into_iter()
        .map(|name| counter.add_customer(customer(name, 1)).unwrap())
        .collect();
    assert_eq!(
        placements,
        vec![
            Placement::Lane(0),
            Placement::Lane(1),
            Placement::Lane(1),
            Placement::Waiting,
            Placement::Waiting,
        ]
    );

    let err = counter.add_customer(customer("F", 1)).unwrap_err();
    assert!(matches!(err, CounterError::QueueFull(_)));
    assert_eq!(counter.customer_count(), 5);

    let departure = counter.remove_customer(1, 0).unwrap();
    assert_eq!(departure.customer.first_name(), "B");
    let refill = departure.refill.unwrap();
    assert_eq!(refill.lane, 1);
    assert_eq!(refill.customer.first_name(), "D");
    assert_eq!(lane_names(&counter, 1), vec![Some("C".to_string()), Some("D".to_string())]);
    assert_eq!(counter.waiting_lane().len(), 1);
    assert_all_left_packed(&counter);
}

#[test]
fn test_remove_errors_do_not_touch_waiting_lane() {
    let mut counter = ServiceCounter::from_layout(&[1], 2).unwrap();
    counter.add_customer(customer("A", 1)).unwrap();
    counter.add_customer(customer("B", 1)).unwrap();

    assert!(matches!(
        counter.remove_customer(3, 0),
        Err(CounterError::SelectionOutOfRange { index: 3, max: 0 })
    ));
    assert!(matches!(
        counter.remove_customer(0, 1),
        Err(CounterError::SelectionOutOfRange { index: 1, max: 0 })
    ));
    assert!(matches!(counter.serve_customer(0), Err(CounterError::InsufficientStock { .. })));
    assert_eq!(counter.waiting_lane().len(), 1);
}

#[test]
fn test_removals_keep_lanes_left_packed() {
    let mut counter = filled_counter();
    counter.set_stock(50).unwrap();

    let removals = [(2, 1), (1, 1), (2, 0), (0, 1), (1, 0)];
    for (lane, position) in removals {
        counter.remove_customer(lane, position).unwrap();
        assert_all_left_packed(&counter);
    }
    while counter.serve_customer(1).is_ok() {
        assert_all_left_packed(&counter);
    }
    assert!(counter.lanes()[1].is_empty());
}

#[test]
fn test_search_across_counter() {
    let mut counter = ServiceCounter::from_layout(&[1, 1], 2).unwrap();
    counter.add_customer(Customer::new("Ada", "Lovelace", 1)).unwrap();
    counter.add_customer(Customer::new("Alan", "Turing", 1)).unwrap();
    counter.add_customer(Customer::new("Grace", "Hopper", 1)).unwrap();
    counter.add_customer(Customer::new("Adele", "Goldberg", 1)).unwrap();

    let hits = counter.search("ad");
    assert_eq!(hits.match_count(), 2);
    assert_eq!(hits.lanes[0][0].map(Customer::first_name), Some("Ada"));
    assert!(hits.lanes[1][0].is_none());
    assert!(hits.waiting[0].is_none());
    assert_eq!(hits.waiting[1].map(Customer::first_name), Some("Adele"));

    assert_eq!(counter.search("").match_count(), 4);
    let none = counter.search("zzz");
    assert!(none.is_empty());
    assert_eq!(none.lanes.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 1]);
    assert_eq!(none.waiting.len(), 2);
}

#[test]
fn test_sorted_customers_and_lanes_with_space() {
    let mut counter = ServiceCounter::from_layout(&[2, 3], 2).unwrap();
    for (first, last) in [("Zoe", "Adams"), ("Ann", "Baker"), ("Mia", "Chen"), ("Ann", "Abbott")] {
        counter.add_customer(Customer::new(first, last, 1)).unwrap();
    }

    let sorted: Vec<String> = counter.sorted_customers().iter().map(|c| c.full_name()).collect();
    assert_eq!(sorted, vec!["Ann Abbott", "Ann Baker", "Mia Chen", "Zoe Adams"]);
    assert_eq!(counter.lanes_with_space(), vec![1]);
}

#[test]
fn test_restock_and_low_stock() {
    let mut counter = ServiceCounter::from_layout(&[2], 1).unwrap();
    assert!(counter.is_stock_low());
    assert_eq!(counter.restock(30).unwrap(), 30);
    assert!(!counter.is_stock_low());
    assert!(matches!(
        counter.restock(21),
        Err(CounterError::StockOutOfRange { value: 51, .. })
    ));
    assert_eq!(counter.stock(), 30);
}

#[test]
fn test_clone_has_independent_stock() {
    let mut counter = filled_counter();
    counter.set_stock(10).unwrap();
    let mut copy = counter.clone();

    copy.serve_customer(0).unwrap();
    assert_eq!(copy.stock(), 8);
    assert_eq!(counter.stock(), 10);
    assert_eq!(counter.lanes()[0].occupied_count(), 2);
}

#[test]
fn test_invalid_layout_is_rejected() {
    assert!(matches!(
        ServiceCounter::from_layout(&[], 1),
        Err(CounterError::InvalidConfig(_))
    ));
    assert!(matches!(
        ServiceCounter::from_layout(&[2, 0], 1),
        Err(CounterError::InvalidConfig(_))
    ));
}

#[test]
fn test_names_that_break_snapshots_are_rejected() {
    let mut counter = ServiceCounter::from_layout(&[1], 1).unwrap();
    counter.add_customer(Customer::new("Ada", "Lovelace", 1)).unwrap();
    let before = counter.clone();

    for (first, last) in [("Ada,Jr", "Lovelace"), ("Alan", "null"), ("", "Turing"), ("Grace", "Hop\nper")] {
        let err = counter.add_customer(Customer::new(first, last, 1)).unwrap_err();
        assert!(matches!(err, CounterError::Validation(_)), "accepted {:?} {:?}", first, last);
        assert_eq!(counter, before);
    }

    let mut restored = ServiceCounter::from_layout(&[1], 1).unwrap();
    restored.restore_snapshot(&counter.to_snapshot()).unwrap();
    assert_eq!(restored, counter);
}
