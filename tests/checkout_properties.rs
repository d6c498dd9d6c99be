use chrono::Utc;
use proptest::prelude::*;
use proptest::test_runner::Config;
use ticketera::checkout::{compute_totals, CheckoutLine, CheckoutState};
use ticketera::models::{
    CatalogItem, CatalogItemType, Event, Orientation, Seat, SeatStatus, Sector, Stadium, Stand, Stock, TierType,
};
use ticketera::selection::SelectionMachine;

fn line(price: f64, quantity: u32) -> CheckoutLine {
    CheckoutLine {
        item_id: format!("item-{price}-{quantity}"),
        name: "Entrada".into(),
        kind: CatalogItemType::Ticket,
        unit_price: price,
        quantity,
        available: 1_000,
        max_per_person: None,
        numbered: false,
        selected: false,
        seats: vec![],
    }
}

fn numbered_event(seats: u32) -> Event {
    let mut event = Event {
        id: "ev".into(),
        name: "Final".into(),
        date: Utc::now(),
        description: None,
        address: None,
        club_id: None,
        service_charge: 0.0,
        catalog_items: vec![CatalogItem {
            id: "platea".into(),
            name: "Platea".into(),
            kind: CatalogItemType::Sector,
            price: 100.0,
            stock: Stock { aviable: seats, reserved: 0, sold: 0 },
            sector_id: Some("sec".into()),
            max_per_person: None,
            tickets: vec![],
        }],
        stadium: Some(Stadium {
            id: "st".into(),
            name: "Estadio".into(),
            stands: vec![Stand {
                id: "E-1".into(),
                name: None,
                orientation: Orientation::East,
                tier: TierType::First,
                sectors: vec![Sector {
                    id: "sec".into(),
                    name: "Platea".into(),
                    numerated: true,
                    seats: (1..=seats)
                        .map(|n| Seat { row_label: "A".into(), seat_number: n, status: SeatStatus::Available })
                        .collect(),
                    visible: false,
                }],
            }],
        }),
    };
    event.derive_sector_visibility();
    event
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn totals_follow_formula(
        lines in prop::collection::vec((0u32..50_000, 0u32..20), 0..6),
        fee in 0u32..=30,
        discount in 0u32..=150,
    ) {
        let lines: Vec<CheckoutLine> = lines.into_iter().map(|(p, q)| line(p as f64, q)).collect();
        let totals = compute_totals(&lines, fee as f64, discount as f64);

        let subtotal: f64 = lines.iter().map(|l| l.unit_price * l.quantity as f64).sum();
        prop_assert_eq!(totals.subtotal, subtotal);
        prop_assert_eq!(totals.service_fee, (subtotal * fee as f64 / 100.0).round());
        prop_assert_eq!(totals.discount, (subtotal * discount as f64 / 100.0).round());
        prop_assert_eq!(totals.total, (subtotal + totals.service_fee - totals.discount).max(0.0));
        prop_assert!(totals.total >= 0.0);
    }

    #[test]
    fn double_toggle_restores_selection(
        picks in prop::collection::vec(1u32..=20, 0..8),
        seat in 1u32..=20,
    ) {
        let event = numbered_event(20);
        let mut machine = SelectionMachine::new("ev");
        machine.select_sector(&event, "sec").unwrap();
        for n in picks {
            machine.toggle_seat(&format!("A{n}")).unwrap();
        }

        let mut before = machine.selected().to_vec();
        let code = format!("A{seat}");
        let first = machine.toggle_seat(&code).unwrap();
        let second = machine.toggle_seat(&code).unwrap();
        prop_assert_ne!(first, second);

        let mut after = machine.selected().to_vec();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn quantity_never_exceeds_stock(quantity in 0u32..60) {
        let event = numbered_event(40);
        let mut checkout = CheckoutState::for_event(&event);
        let result = checkout.quote_quantity("platea", quantity);
        prop_assert_eq!(result.is_ok(), quantity <= 40);
        prop_assert!(checkout.set_quantity("platea", quantity).is_err());
        prop_assert!(checkout.line("platea").unwrap().quantity <= 40);
    }
}
