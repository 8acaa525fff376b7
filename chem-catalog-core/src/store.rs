use tracing::{debug, warn};

use crate::models::Product;

/// Products known to this session, in display order.
///
/// Identifiers are unique: appending a record whose id is already present
/// replaces that record in place.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    products: Vec<Product>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let mut store = Self::new();
        store.replace_all(products);
        store
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn append(&mut self, product: Product) {
        if let Some(existing) = self.products.iter_mut().find(|p| p.id == product.id) {
            warn!("product {} already in catalog; replacing", product.id);
            *existing = product;
        } else {
            debug!("appending product {}", product.id);
            self.products.push(product);
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(index))
    }

    /// Swap in a freshly fetched list, dropping duplicate ids after the first.
    pub fn replace_all(&mut self, products: Vec<Product>) {
        self.products.clear();
        for product in products {
            if self.get(&product.id).is_some() {
                warn!("duplicate product id {} in fetched list; keeping the first", product.id);
                continue;
            }
            self.products.push(product);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            category: "Solvents".to_string(),
            sub_category: "Alcohols".to_string(),
            name: name.to_string(),
            cas: "64-17-5".to_string(),
            description: String::new(),
            sds: Default::default(),
            tds: Default::default(),
        }
    }

    #[test]
    fn append_and_remove() {
        let mut store = CatalogStore::new();
        store.append(product("1", "Ethanol"));
        store.append(product("2", "Methanol"));
        assert_eq!(store.len(), 2);

        let removed = store.remove("1").unwrap();
        assert_eq!(removed.name, "Ethanol");
        assert_eq!(store.len(), 1);
        assert!(store.remove("1").is_none());
    }

    #[test]
    fn append_with_known_id_replaces() {
        let mut store = CatalogStore::with_products(vec![product("1", "Ethanol")]);
        store.append(product("1", "Ethanol absolute"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().name, "Ethanol absolute");
    }

    #[test]
    fn replace_all_keeps_first_of_duplicates() {
        let mut store = CatalogStore::new();
        store.replace_all(vec![product("1", "A"), product("2", "B"), product("1", "C")]);
        let names: Vec<_> = store.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
