///
/// Cardinality
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cardinality {
    ManyToOne,
    OneToMany {
        /// Property on the target type that receives the owning entity.
        back_reference: Option<String>,
    },
    ManyToMany,
    OneToOne,
}

///
/// Relation
///
/// Relation half of a property descriptor. A `OneToOne` without a target is
/// an embedded plain value rather than an entity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Relation {
    pub target: Option<String>,
    pub cardinality: Cardinality,
}

impl Relation {
    #[must_use]
    pub fn many_to_one(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            cardinality: Cardinality::ManyToOne,
        }
    }

    #[must_use]
    pub fn many_to_many(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            cardinality: Cardinality::ManyToMany,
        }
    }

    #[must_use]
    pub fn one_to_many(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            cardinality: Cardinality::OneToMany {
                back_reference: None,
            },
        }
    }

    #[must_use]
    pub fn one_to_one(target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            cardinality: Cardinality::OneToOne,
        }
    }

    /// One-to-one relation carrying a plain nested value.
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            target: None,
            cardinality: Cardinality::OneToOne,
        }
    }

    /// Set the inverse property wired on each child of a one-to-many.
    /// Has no effect on other cardinalities.
    #[must_use]
    pub fn back_reference(mut self, property: impl Into<String>) -> Self {
        if let Cardinality::OneToMany { back_reference } = &mut self.cardinality {
            *back_reference = Some(property.into());
        }
        self
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[must_use]
    pub const fn requires_target(&self) -> bool {
        !matches!(self.cardinality, Cardinality::OneToOne)
    }
}
