use proptest::prelude::*;
use serde_json::{Map, Value};
use tour_lite::query::{EXCLUDED_KEYS, build_filter, build_plan};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z]{0,7}"
}

proptest! {
    #[test]
    fn control_keys_never_reach_filter(
        fields in proptest::collection::btree_map(field_name(), scalar(), 0..6),
        controls in proptest::collection::btree_map(0usize..4, scalar(), 0..4),
    ) {
        let mut q = Map::new();
        for (k, v) in &fields { q.insert(k.clone(), v.clone()); }
        for (i, v) in &controls { q.insert(EXCLUDED_KEYS[*i].to_string(), v.clone()); }
        let filter = build_filter(&q);
        for k in EXCLUDED_KEYS {
            prop_assert!(!filter.contains_key(k));
        }
        for (k, v) in &fields {
            if !EXCLUDED_KEYS.contains(&k.as_str()) {
                prop_assert_eq!(filter.get(k), Some(v));
            }
        }
    }

    #[test]
    fn only_control_keys_give_empty_filter(controls in proptest::collection::btree_map(0usize..4, scalar(), 0..4)) {
        let q: Map<String, Value> = controls.iter().map(|(i, v)| (EXCLUDED_KEYS[*i].to_string(), v.clone())).collect();
        prop_assert!(build_plan(&q).filter.is_empty());
    }

    #[test]
    fn ranges_are_tagged(field in field_name(), lo in any::<i32>(), hi in any::<i32>()) {
        prop_assume!(!EXCLUDED_KEYS.contains(&field.as_str()));
        let mut inner = Map::new();
        inner.insert("gte".into(), lo.into());
        inner.insert("lte".into(), hi.into());
        let mut q = Map::new();
        q.insert(field.clone(), Value::Object(inner));
        let filter = build_filter(&q);
        let cond = filter.get(&field).and_then(Value::as_object).cloned().unwrap_or_default();
        prop_assert_eq!(cond.get("$gte"), Some(&Value::from(lo)));
        prop_assert_eq!(cond.get("$lte"), Some(&Value::from(hi)));
        prop_assert_eq!(cond.len(), 2);
    }
}
