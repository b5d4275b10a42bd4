#![no_main]
use libfuzzer_sys::fuzz_target;
use tour_lite::store::TOUR_SCHEMA;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(params) = tour_lite::utils::json::parse_json_object(s) {
            let plan = tour_lite::query::build_plan(&params);
            let Ok(filter) = TOUR_SCHEMA.cast_filter(&plan.filter) else { return };
            // A tiny set of documents to exercise eval paths
            let docs = [
                bson::doc! {"name": "The Forest Hiker", "price": 397.0, "difficulty": "easy"},
                bson::doc! {"price": 10, "images": ["a.jpg", "b.jpg"], "nested": {"z": 3}},
                bson::doc! {"ratingsAverage": 4.5},
            ];
            for d in &docs {
                let _ = tour_lite::query::matches(d, &filter);
            }
        }
    }
});
