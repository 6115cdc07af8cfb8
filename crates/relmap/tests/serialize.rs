mod fixtures;

use fixtures::{manager, project_payload};
use relmap::{ErrorKind, prelude::*};

#[test]
fn to_array_emits_persistable_properties_in_declaration_order() {
    let mut om = manager();
    let project = om
        .create("project", &project_payload(10))
        .expect("project should hydrate");

    let out = om.to_array(&project).expect("fully initialized project");

    let keys: Vec<_> = out.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        [
            "name",
            "description",
            "budget",
            "active",
            "created_at",
            "tags",
            "settings",
            "code",
            "type",
            "products",
        ],
        "identifier is transient"
    );
    assert_eq!(out["budget"], json!(1500));
    assert_eq!(out["active"], json!(true));
    assert_eq!(out["created_at"], json!("2011-05-06T12:00:00.000Z"));
    assert_eq!(out["code"], json!("prj"), "unreadable values still serialize");
    assert_eq!(out["type"], json!(8));
    assert_eq!(out["products"], json!([]));
}

#[test]
fn one_to_many_children_are_embedded() {
    let mut om = manager();
    let mut payload = project_payload(1);
    payload["products"] = json!([{ "id": 10, "name": "a" }]);
    let project = om.create("project", &payload).expect("project should hydrate");
    let product = om.get("product", 10_i64).expect("product");

    let child = om.to_array(&product).expect("product is complete");
    assert_eq!(child, json!({ "name": "a", "project": 1 }).as_object().cloned().expect("object"));

    let out = om.to_array(&project).expect("project is complete");
    assert_eq!(out["products"], json!([{ "name": "a", "project": 1 }]));
}

#[test]
fn incomplete_parents_fail_even_with_complete_children() {
    let mut om = manager();
    let project = om
        .create(
            "project",
            &json!({
                "id": 1,
                "name": "p",
                "products": [{ "id": 10, "name": "a", "project": 1 }],
            }),
        )
        .expect("project should hydrate");

    let err: Error = om
        .to_array(&project)
        .expect_err("project is missing most properties")
        .into();
    assert_eq!(err.kind, ErrorKind::Uninitialized);
}

#[test]
fn uninitialized_properties_are_reported_together() {
    let mut om = manager();
    let product = om
        .create("product", &json!({ "id": 1, "project": null }))
        .expect("product should hydrate");

    let err = product.get("name").expect_err("name was never loaded");
    assert!(err.to_string().contains("'name'"));

    let err = om.to_array(&product).expect_err("name is uninitialized");
    assert!(err.is_uninitialized());
    assert_eq!(err.uninitialized_properties(), ["name"]);
    assert!(err.message.contains("uninitialized properties: name"));
}

#[test]
fn scalar_round_trip_preserves_normalized_values() {
    let mut om = manager();
    let project = om
        .create("project", &project_payload(1))
        .expect("project should hydrate");
    let out = om.to_array(&project).expect("serialize");

    let mut payload = serde_json::Value::Object(out);
    payload["id"] = json!(2);
    let copy = om.create("project", &payload).expect("re-hydrate");

    for property in ["name", "description", "budget", "active", "created_at", "tags", "settings"] {
        assert_eq!(
            copy.get(property).expect("copied property"),
            project.get(property).expect("source property"),
            "{property} should survive a round trip"
        );
    }
}

#[test]
fn unattached_placeholders_cannot_be_serialized() {
    let mut om = manager();
    let placeholder = om.get_reference("project_type", 3_i64).expect("reference");

    let err: Error = om
        .to_array(&placeholder)
        .expect_err("no data yet")
        .into();
    assert_eq!(err.kind, ErrorKind::NotLoaded);
}

#[test]
fn serialization_is_counted() {
    let mut om = manager();
    let product = om
        .create("product", &json!({ "id": 1, "name": "a", "project": null }))
        .expect("product should hydrate");

    om.to_array(&product).expect("serialize");
    om.to_array(&product).expect("serialize again");

    assert_eq!(om.metrics().entity("product").entities_serialized, 2);
}
