mod fixtures;

use fixtures::manager;
use proptest::prelude::*;
use relmap::prelude::*;

fn arb_id() -> impl Strategy<Value = i64> {
    0_i64..1_000
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _-]{0,16}"
}

proptest! {
    #[test]
    fn identity_is_unique_per_type_and_id(ids in prop::collection::vec(arb_id(), 1..32)) {
        let mut om = manager();

        for id in &ids {
            let first = om
                .create("product", &json!({ "id": id, "name": "a" }))
                .expect("create");
            let again = om.get_reference("product", *id).expect("reference");
            prop_assert!(first.ptr_eq(&again));
        }

        let mut distinct = ids.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(om.get_all("product").len(), distinct.len());
    }

    #[test]
    fn string_and_numeric_ids_address_the_same_entity(id in arb_id()) {
        let mut om = manager();

        let by_text = om
            .create("product", &json!({ "id": id.to_string(), "name": "a" }))
            .expect("create");
        let by_int = om
            .create("product", &json!({ "id": id, "name": "b" }))
            .expect("update");

        prop_assert!(by_text.ptr_eq(&by_int));
        prop_assert_eq!(by_text.get("name").expect("name"), Value::from("b"));
    }

    #[test]
    fn scalar_properties_round_trip(
        name in arb_name(),
        budget in any::<i64>(),
        active in any::<bool>(),
        tags in prop::collection::vec(arb_name(), 0..4),
    ) {
        let mut om = manager();
        let payload = json!({
            "id": 1,
            "name": name,
            "description": null,
            "budget": budget,
            "active": active,
            "created_at": null,
            "tags": tags,
            "settings": { "nested": [budget] },
            "code": "x",
            "type": null,
            "products": [],
        });

        let project = om.create("project", &payload).expect("create");
        let out = om.to_array(&project).expect("serialize");

        for key in ["name", "description", "budget", "active", "created_at", "tags", "settings"] {
            prop_assert_eq!(&out[key], &payload[key], "{} should round trip", key);
        }
    }

    #[test]
    fn placeholders_upgrade_exactly_once(id in arb_id(), holders in 1_usize..5) {
        let mut om = manager();

        let references: Vec<_> = (0..holders)
            .map(|_| om.get_reference("project_type", id).expect("reference"))
            .collect();
        let loaded = om
            .create("project_type", &json!({ "id": id, "name": "t" }))
            .expect("upgrade");

        for reference in &references {
            prop_assert!(reference.ptr_eq(&loaded));
            prop_assert_eq!(reference.get("name").expect("name"), Value::from("t"));
        }
        prop_assert_eq!(om.metrics().entity("project_type").placeholders_upgraded, 1);
    }
}
