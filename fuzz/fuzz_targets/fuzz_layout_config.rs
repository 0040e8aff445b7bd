#![no_main]

use astral_layout::{LayoutConfig, WindowSize};
use libfuzzer_sys::fuzz_target;

const PROBES: [(f64, f64); 6] = [
    (0.0, 0.0),
    (320.0, 640.0),
    (1280.0, 900.0),
    (1920.0, 1080.0),
    (-1.0, f64::NAN),
    (f64::INFINITY, f64::INFINITY),
];

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(table) = LayoutConfig::from_json(text).and_then(LayoutConfig::into_table) else {
        return;
    };

    for (width, height) in PROBES {
        let size = WindowSize::new(width, height);
        if let Some((label, bp)) = table.classify(size) {
            assert!(bp.contains(size));
            assert_eq!(table.get(label), Some(bp));
        }
    }

    // Whatever parsed must survive a serialize/parse cycle with its labels intact.
    let Ok(json) = serde_json::to_string(&LayoutConfig::new(table.clone())) else {
        return;
    };
    if let Ok(back) = LayoutConfig::from_json(&json).and_then(LayoutConfig::into_table) {
        assert_eq!(back.labels(), table.labels());
    }
});
