use serde_json::{json, Value};

use chem_catalog_core::{Attachment, Category, Product, ProductDraft, SubCategory};

/// Test fixtures for consistent catalog data
pub struct TestFixtures {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub sub_categories: Vec<SubCategory>,
}

impl TestFixtures {
    pub fn load() -> Self {
        Self {
            products: sample_products(),
            categories: sample_categories(),
            sub_categories: sample_sub_categories(),
        }
    }
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: "6650a1".to_string(),
            category: "Solvents".to_string(),
            sub_category: "Alcohols".to_string(),
            name: "Ethanol".to_string(),
            cas: "64-17-5".to_string(),
            description: "High purity ethanol for laboratory use".to_string(),
            sds: Attachment::Stored("https://files.example.com/ethanol_sds.pdf".to_string()),
            tds: Attachment::Stored("https://files.example.com/ethanol_tds.pdf".to_string()),
        },
        Product {
            id: "6650a2".to_string(),
            category: "Acids".to_string(),
            sub_category: "Carboxylic Acids".to_string(),
            name: "Acetic Acid".to_string(),
            cas: "64-19-7".to_string(),
            description: "Glacial acetic acid, 99.8% purity".to_string(),
            sds: Attachment::Stored("https://files.example.com/acetic_acid_sds.pdf".to_string()),
            tds: Attachment::Absent,
        },
        Product {
            id: "6650a3".to_string(),
            category: "Bases".to_string(),
            sub_category: "Hydroxides".to_string(),
            name: "Sodium Hydroxide".to_string(),
            cas: "1310-73-2".to_string(),
            description: "Sodium hydroxide pellets, 98% purity".to_string(),
            sds: Attachment::Absent,
            tds: Attachment::Absent,
        },
    ]
}

pub fn sample_categories() -> Vec<Category> {
    ["Solvents", "Acids", "Bases"]
        .iter()
        .enumerate()
        .map(|(i, name)| Category {
            id: format!("cat-{i}"),
            name: name.to_string(),
        })
        .collect()
}

pub fn sample_sub_categories() -> Vec<SubCategory> {
    [
        ("Alcohols", "Solvents"),
        ("Ketones", "Solvents"),
        ("Carboxylic Acids", "Acids"),
        ("Mineral Acids", "Acids"),
        ("Hydroxides", "Bases"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, category))| SubCategory {
        id: format!("sub-{i}"),
        name: name.to_string(),
        category: Some(category.to_string()),
    })
    .collect()
}

/// A draft that passes validation.
pub fn complete_draft() -> ProductDraft {
    ProductDraft {
        category: "Solvents".to_string(),
        sub_category: "Ketones".to_string(),
        name: "Acetone".to_string(),
        cas: "67-64-1".to_string(),
        description: "ACS reagent grade".to_string(),
        sds: Attachment::Absent,
        tds: Attachment::Absent,
    }
}

/// `{ success: true, data }`
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// `{ success: false, message }`
pub fn rejection(message: &str) -> Value {
    json!({ "success": false, "message": message })
}

/// Product as the service serializes it.
pub fn product_json(product: &Product) -> Value {
    serde_json::to_value(product).unwrap_or(Value::Null)
}
