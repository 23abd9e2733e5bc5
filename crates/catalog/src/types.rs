use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Aisle number → department name.
///
/// Integer keys serialize as JSON strings (`{"3": "Dairy & Refrigerated"}`).
pub type AisleLayout = BTreeMap<u32, String>;

/// A single product on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    /// Display name
    pub name: String,
    /// Aisle number (1-based)
    pub aisle: u32,
    /// Unit price in dollars
    pub price: f64,
    /// Units on hand
    pub stock: u32,
    /// Shelf section code within the aisle
    pub section: String,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        aisle: u32,
        price: f64,
        stock: u32,
        section: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aisle,
            price,
            stock,
            section: section.into(),
        }
    }
}

/// Product keyed by its canonical lowercase name.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: String,
    pub product: Product,
}

/// Suggests a meal once every trigger item is on the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRule {
    pub trigger_items: Vec<String>,
    pub suggestion: String,
}

impl MealRule {
    pub fn new(trigger_items: &[&str], suggestion: impl Into<String>) -> Self {
        Self {
            trigger_items: trigger_items.iter().map(|t| t.to_string()).collect(),
            suggestion: suggestion.into(),
        }
    }
}

/// Read-only store data: products, aisle layout and meal rules.
#[derive(Debug, Clone)]
pub struct StoreCatalog {
    store_id: String,
    store_name: String,
    entries: Vec<CatalogEntry>,
    aisle_layout: AisleLayout,
    meal_rules: Vec<MealRule>,
}

impl StoreCatalog {
    /// Build a catalog. Product keys are canonicalized to trimmed lowercase;
    /// entry order is preserved and drives lookup precedence.
    pub fn new(
        store_id: impl Into<String>,
        store_name: impl Into<String>,
        products: Vec<(String, Product)>,
        aisle_layout: AisleLayout,
        meal_rules: Vec<MealRule>,
    ) -> Self {
        let entries = products
            .into_iter()
            .map(|(key, product)| CatalogEntry {
                key: key.trim().to_lowercase(),
                product,
            })
            .collect();
        Self {
            store_id: store_id.into(),
            store_name: store_name.into(),
            entries,
            aisle_layout,
            meal_rules,
        }
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.entries.iter().map(|entry| &entry.product)
    }

    pub fn product(&self, key: &str) -> Option<&Product> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.product)
    }

    pub fn aisle_layout(&self) -> &AisleLayout {
        &self.aisle_layout
    }

    pub fn department(&self, aisle: u32) -> Option<&str> {
        self.aisle_layout.get(&aisle).map(String::as_str)
    }

    pub fn meal_rules(&self) -> &[MealRule] {
        &self.meal_rules
    }

    /// Serializable key → product view that keeps catalog order.
    pub fn product_map(&self) -> ProductMap<'_> {
        ProductMap(&self.entries)
    }
}

/// Serializes catalog entries as a JSON object in catalog order.
#[derive(Debug, Clone, Copy)]
pub struct ProductMap<'a>(&'a [CatalogEntry]);

impl Serialize for ProductMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.key, &entry.product)?;
        }
        map.end()
    }
}
