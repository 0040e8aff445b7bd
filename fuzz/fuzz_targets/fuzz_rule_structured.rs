#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use arbitrary::Arbitrary;
use astral_layout::{Condition, HeadlessEnvironment, LayoutEngine, LayoutError};
use libfuzzer_sys::fuzz_target;

const LABELS: [&str; 7] = [
    "ExtraLarge",
    "Large",
    "Medium",
    "Small",
    "ExtraSmall",
    "Other",
    "Missing",
];
const SELECTORS: [&str; 6] = ["<", "<=", ">", ">=", "=", "?"];

#[derive(Arbitrary, Debug)]
enum FuzzCondition {
    Breakpoint { label: u8, selector: u8 },
    Predicate(bool),
}

#[derive(Arbitrary, Debug)]
struct FuzzRule {
    conditions: Vec<FuzzCondition>,
    all_required: bool,
    sizes: Vec<(u16, u16)>,
}

fuzz_target!(|input: FuzzRule| {
    let env = HeadlessEnvironment::new(800.0, 600.0);
    let engine = LayoutEngine::new(env.clone());

    let conditions: Vec<Condition> = input
        .conditions
        .iter()
        .take(16)
        .map(|c| match *c {
            FuzzCondition::Breakpoint { label, selector } => Condition::breakpoint(
                LABELS[usize::from(label) % LABELS.len()],
                SELECTORS[usize::from(selector) % SELECTORS.len()],
            ),
            FuzzCondition::Predicate(result) => Condition::predicate(move || result),
        })
        .collect();
    let empty = conditions.is_empty();

    let fired = Rc::new(Cell::new(0usize));
    let (ok, ko) = (Rc::clone(&fired), Rc::clone(&fired));
    let outcome = engine.apply_if(
        move || ok.set(ok.get() + 1),
        move || ko.set(ko.get() + 1),
        conditions,
        input.all_required,
    );

    let handle = match outcome {
        Ok(handle) => handle,
        Err(LayoutError::MissingConditions) => {
            assert!(empty);
            assert_eq!(fired.get(), 0);
            return;
        }
        Err(LayoutError::NoBreakpointForLabel { .. }) => {
            assert_eq!(fired.get(), 0);
            return;
        }
        Err(other) => panic!("unexpected error: {other:?}"),
    };
    assert_eq!(fired.get(), 1);

    let mut expected = 1;
    for &(width, height) in input.sizes.iter().take(32) {
        env.set_window_size(f64::from(width), f64::from(height));
        engine.notify_resize();
        if handle.last_error().is_none() {
            expected += 1;
        }
        assert_eq!(fired.get(), expected);
    }
});
