#![allow(dead_code)]

use relmap::{ObjectManager, prelude::*};

/// Manager with the project / product / project_type schema registered.
pub fn manager() -> ObjectManager {
    let mut om = ObjectManager::new();
    register_all(&mut om);
    om
}

pub fn register_all(om: &mut ObjectManager) {
    om.register(project()).expect("project should register");
    om.register(product()).expect("product should register");
    om.register(project_type()).expect("project_type should register");
}

pub fn project() -> EntityDescriptor {
    EntityDescriptor::new("project")
        .property("id", PropertyDescriptor::identifier())
        .property("name", PropertyDescriptor::text())
        .property("description", PropertyDescriptor::text())
        .property("budget", PropertyDescriptor::int())
        .property("active", PropertyDescriptor::boolean())
        .property("created_at", PropertyDescriptor::date())
        .property("tags", PropertyDescriptor::array())
        .property("settings", PropertyDescriptor::object())
        .property(
            "code",
            PropertyDescriptor::custom(
                CustomTransform::new(|raw| {
                    Ok(Value::Text(
                        raw.as_str().unwrap_or_default().to_ascii_uppercase(),
                    ))
                })
                .backward(|value| Ok(value.as_text().map(|s| json!(s.to_ascii_lowercase())))),
            )
            .readable(false),
        )
        .property(
            "type",
            PropertyDescriptor::relation(Relation::many_to_one("project_type")),
        )
        .property(
            "products",
            PropertyDescriptor::relation(
                Relation::one_to_many("product").back_reference("project"),
            ),
        )
}

pub fn product() -> EntityDescriptor {
    EntityDescriptor::new("product")
        .property("id", PropertyDescriptor::identifier())
        .property("name", PropertyDescriptor::text())
        .property(
            "project",
            PropertyDescriptor::relation(Relation::many_to_one("project")),
        )
}

pub fn project_type() -> EntityDescriptor {
    EntityDescriptor::new("project_type")
        .property("id", PropertyDescriptor::identifier())
        .property("name", PropertyDescriptor::text())
}

/// Complete project payload; every property initialized.
pub fn project_payload(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Project name",
        "description": "Description",
        "budget": "1500",
        "active": 1,
        "created_at": "2011-05-06T12:00:00Z",
        "tags": ["a", "b"],
        "settings": { "theme": "dark" },
        "code": "prj",
        "type": 8,
        "products": [],
    })
}
