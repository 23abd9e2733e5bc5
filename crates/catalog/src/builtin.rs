use crate::types::{AisleLayout, MealRule, Product, StoreCatalog};
use once_cell::sync::Lazy;

static CARROLLTON: Lazy<StoreCatalog> = Lazy::new(carrollton_supercenter);

/// The built-in Carrollton Supercenter catalog, constructed once per process.
pub fn builtin_catalog() -> &'static StoreCatalog {
    &CARROLLTON
}

fn carrollton_supercenter() -> StoreCatalog {
    let products = [
        ("milk", Product::new("p1", "Milk (1 Gallon)", 3, 3.50, 42, "B2")),
        ("almond milk", Product::new("p1a", "Almond Milk", 3, 4.50, 25, "B2")),
        ("oat milk", Product::new("p1b", "Oat Milk (Half Gallon)", 3, 4.00, 15, "B3")),
        ("eggs", Product::new("p3", "Large Eggs (12 pack)", 3, 4.00, 8, "C1")),
        ("bread", Product::new("p2", "White Bread", 7, 2.50, 30, "A1")),
        ("pasta", Product::new("p5", "Spaghetti Pasta", 8, 1.50, 50, "A3")),
        ("pasta sauce", Product::new("p8", "Marinara Sauce", 8, 3.00, 40, "B2")),
        ("ground beef", Product::new("p6", "Ground Beef (1 lb)", 15, 8.00, 25, "D1")),
        ("chicken", Product::new("p9", "Chicken Breast", 15, 6.50, 35, "A1")),
        ("cereal", Product::new("p15", "Honey Nut Cereal", 9, 4.50, 40, "B1")),
        ("bananas", Product::new("p11", "Bananas", 1, 1.25, 80, "A1")),
        ("apples", Product::new("p12", "Red Apples", 1, 2.00, 60, "A2")),
        ("toilet paper", Product::new("p13", "Toilet Paper (12 rolls)", 13, 12.00, 20, "C3")),
        ("shampoo", Product::new("p14", "Shampoo (Volumizing)", 12, 5.50, 25, "A1")),
    ]
    .into_iter()
    .map(|(key, product)| (key.to_string(), product))
    .collect();

    let aisle_layout: AisleLayout = [
        "Fresh Produce",
        "Fresh Produce",
        "Dairy & Refrigerated",
        "Frozen Foods",
        "Frozen Foods",
        "Bakery",
        "Bakery & Bread",
        "Pantry & Dry Goods",
        "Breakfast & Cereal",
        "Snacks & Candy",
        "Beverages",
        "Health & Beauty",
        "Household Items",
        "Electronics",
        "Meat & Seafood",
        "Deli",
    ]
    .into_iter()
    .zip(1u32..)
    .map(|(department, aisle)| (aisle, department.to_string()))
    .collect();

    let meal_rules = vec![
        MealRule::new(&["pasta", "ground beef", "pasta sauce"], "Spaghetti Bolognese"),
        MealRule::new(&["chicken", "bread"], "Chicken Sandwiches"),
        MealRule::new(&["eggs", "bread"], "French Toast or Egg Sandwiches"),
    ];

    StoreCatalog::new(
        "5422-Carrollton-Supercenter",
        "Carrollton Supercenter",
        products,
        aisle_layout,
        meal_rules,
    )
}
