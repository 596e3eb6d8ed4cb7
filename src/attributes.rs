//! Product Attributes
//!
//! Variant options (conductor type, colour, ...) chosen when adding a product to
//! the cart. The server expects at most one value per attribute.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    ids::TypedId,
    validation::{Field, ValidationErrors},
};

/// Attribute id
pub type AttributeId = TypedId<ProductAttribute>;

/// Attribute value id
pub type AttributeValueId = TypedId<AttributeValue>;

/// Selected attribute values sent with an add-to-cart request.
pub type AttributeSelections = SmallVec<[AttributeSelection; 4]>;

/// A variant option offered by a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAttribute {
    /// Attribute id.
    pub id: AttributeId,

    /// Display name.
    pub name: String,

    /// Values the customer can pick from.
    pub values: Vec<AttributeValue>,
}

/// One value of a [`ProductAttribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    /// Value id.
    pub id: AttributeValueId,

    /// Display name.
    pub name: String,

    /// Whether the catalog pre-selects this value.
    pub is_pre_selected: bool,
}

/// A chosen `(attribute, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSelection {
    /// Attribute id.
    pub attribute_id: AttributeId,

    /// Chosen value id.
    pub value_id: AttributeValueId,
}

impl ProductAttribute {
    fn offers(&self, value: AttributeValueId) -> bool {
        self.values.iter().any(|candidate| candidate.id == value)
    }

    fn pre_selected(&self) -> Option<AttributeValueId> {
        self.values
            .iter()
            .find(|value| value.is_pre_selected)
            .map(|value| value.id)
    }
}

/// Build the selections for a product from the customer's explicit `choices`.
///
/// Attributes without an explicit choice fall back to their pre-selected value
/// and are omitted when they have none.
///
/// # Errors
///
/// Returns a [`Field::Attribute`] error when a choice names an attribute the
/// product does not have, or a value the attribute does not offer.
pub fn resolve_attributes(
    attributes: &[ProductAttribute],
    choices: &FxHashMap<AttributeId, AttributeValueId>,
) -> Result<AttributeSelections, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    for (attribute_id, value_id) in choices {
        match attributes.iter().find(|a| a.id == *attribute_id) {
            Some(attribute) if attribute.offers(*value_id) => {}
            Some(_) => errors.push(Field::Attribute, "Selected value is not available"),
            None => errors.push(Field::Attribute, "Unknown product attribute"),
        }
    }

    errors.into_result()?;

    Ok(attributes
        .iter()
        .filter_map(|attribute| {
            choices
                .get(&attribute.id)
                .copied()
                .or_else(|| attribute.pre_selected())
                .map(|value_id| AttributeSelection {
                    attribute_id: attribute.id,
                    value_id,
                })
        })
        .collect())
}

/// Check raw selections for repeated attributes.
///
/// # Errors
///
/// Returns a [`Field::Attribute`] error when an attribute appears more than once.
pub fn unique_selections(
    selections: impl IntoIterator<Item = AttributeSelection>,
) -> Result<AttributeSelections, ValidationErrors> {
    let mut seen = FxHashSet::default();
    let mut unique = AttributeSelections::new();

    for selection in selections {
        if !seen.insert(selection.attribute_id) {
            return Err(ValidationErrors::single(
                Field::Attribute,
                "Only one value may be chosen per attribute",
            ));
        }

        unique.push(selection);
    }

    Ok(unique)
}
