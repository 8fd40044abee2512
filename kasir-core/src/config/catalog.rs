//! Product catalog.

use kasir_sdk::objects::Product;

#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub products: Vec<Product>,
}

impl CatalogConfig {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}
