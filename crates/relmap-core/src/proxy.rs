//! Placeholder factory.
//!
//! A placeholder stands in for an entity known only by its identifier. It is
//! a regular [`EntityRef`] whose slot holds no field storage until the
//! manager attaches some; see `entity` for the guarded accessors.

use crate::{entity::EntityRef, model::EntityModel, value::EntityId};
use std::{collections::HashMap, rc::Rc};

///
/// PlaceholderClass
///
/// Per-type placeholder shape: the identifier property, always readable,
/// and the guarded properties that require attachment.
///

#[derive(Debug, Eq, PartialEq)]
pub struct PlaceholderClass {
    entity: String,
    id_property: String,
    guarded: Vec<String>,
}

impl PlaceholderClass {
    #[must_use]
    pub fn from_model(model: &EntityModel) -> Self {
        let guarded = model
            .fields()
            .iter()
            .filter(|field| field.name != model.id_property)
            .map(|field| field.name.clone())
            .collect();

        Self {
            entity: model.name.clone(),
            id_property: model.id_property.clone(),
            guarded,
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub fn id_property(&self) -> &str {
        &self.id_property
    }

    #[must_use]
    pub fn guarded(&self) -> &[String] {
        &self.guarded
    }

    #[must_use]
    pub fn is_guarded(&self, property: &str) -> bool {
        self.guarded.iter().any(|name| name == property)
    }
}

///
/// PlaceholderFactory
///
/// Pluggable seam for producing placeholders. Implementations must memoize
/// one class per entity type for their whole lifetime.
///

pub trait PlaceholderFactory {
    fn placeholder_class(&mut self, model: &Rc<EntityModel>) -> Rc<PlaceholderClass>;

    fn create_placeholder(&mut self, model: &Rc<EntityModel>, id: EntityId) -> EntityRef;
}

///
/// ProxyFactory
/// Default factory; classes are built on first use and cached by entity name.
///

#[derive(Debug, Default)]
pub struct ProxyFactory {
    classes: HashMap<String, Rc<PlaceholderClass>>,
}

impl ProxyFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl PlaceholderFactory for ProxyFactory {
    fn placeholder_class(&mut self, model: &Rc<EntityModel>) -> Rc<PlaceholderClass> {
        self.classes
            .entry(model.name.clone())
            .or_insert_with(|| Rc::new(PlaceholderClass::from_model(model)))
            .clone()
    }

    fn create_placeholder(&mut self, model: &Rc<EntityModel>, id: EntityId) -> EntityRef {
        let class = self.placeholder_class(model);

        EntityRef::placeholder(model.clone(), class, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityDescriptor, PropertyDescriptor};

    fn model(name: &str) -> Rc<EntityModel> {
        Rc::new(
            EntityDescriptor::new(name)
                .property("id", PropertyDescriptor::identifier())
                .property("name", PropertyDescriptor::text())
                .property("description", PropertyDescriptor::text())
                .compile("id")
                .expect("fixture should compile"),
        )
    }

    #[test]
    fn classes_are_memoized_per_entity_type() {
        let mut factory = ProxyFactory::new();
        let project = model("project");

        let first = factory.placeholder_class(&project);
        let second = factory.placeholder_class(&project);
        assert!(Rc::ptr_eq(&first, &second), "same type must reuse its class");

        let other = factory.placeholder_class(&model("product"));
        assert!(!Rc::ptr_eq(&first, &other));
        assert_eq!(factory.len(), 2);
    }

    #[test]
    fn class_guards_every_property_except_the_identifier() {
        let class = PlaceholderClass::from_model(&model("project"));

        assert_eq!(class.entity(), "project");
        assert_eq!(class.id_property(), "id");
        assert_eq!(class.guarded(), ["name", "description"]);
        assert!(!class.is_guarded("id"));
    }

    #[test]
    fn created_placeholders_are_distinct_handles() {
        let mut factory = ProxyFactory::new();
        let project = model("project");

        let a = factory.create_placeholder(&project, EntityId::Int(5));
        let b = factory.create_placeholder(&project, EntityId::Int(5));

        assert_ne!(a, b, "the factory does not deduplicate; the identity map does");
        assert_eq!(a.key(), Some(&EntityId::Int(5)));
        assert_eq!(factory.len(), 1);
    }
}
