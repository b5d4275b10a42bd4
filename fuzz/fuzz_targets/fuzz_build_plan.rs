#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Translating query parameters never fails and never keeps control keys
        if let Ok(params) = tour_lite::utils::json::parse_json_object(s) {
            let plan = tour_lite::query::build_plan(&params);
            for k in tour_lite::query::EXCLUDED_KEYS {
                assert!(!plan.filter.contains_key(k));
            }
        }
    }
});
