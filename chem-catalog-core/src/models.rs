use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CatalogError, Result};

// ===== ATTACHMENTS =====

/// A document attached to a product record.
///
/// `Pending` only ever exists client-side, between the user picking a file
/// and the create/update call that uploads it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    Absent,
    Stored(String),
    Pending(PendingUpload),
}

impl Attachment {
    pub fn is_absent(&self) -> bool {
        matches!(self, Attachment::Absent)
    }

    pub fn stored_url(&self) -> Option<&str> {
        match self {
            Attachment::Stored(url) => Some(url),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingUpload> {
        match self {
            Attachment::Pending(upload) => Some(upload),
            _ => None,
        }
    }

    /// Short text for tables and form labels.
    pub fn describe(&self) -> String {
        match self {
            Attachment::Absent => "none".to_string(),
            Attachment::Stored(url) => url.clone(),
            Attachment::Pending(upload) => format!("{} ({} bytes, not uploaded)", upload.file_name, upload.len()),
        }
    }
}

impl From<Option<String>> for Attachment {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.trim().is_empty() => Attachment::Stored(url),
            _ => Attachment::Absent,
        }
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Attachment::Stored(url) => serializer.serialize_some(url),
            Attachment::Absent | Attachment::Pending(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(Attachment::from(value))
    }
}

/// File picked by the user but not yet sent to the service.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PendingUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = if file_name.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        };
        Self {
            file_name,
            content_type: content_type.to_string(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment.pdf".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ===== PRODUCT RECORDS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProductWire")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub category: String,
    #[serde(rename = "subCategory")]
    pub sub_category: String,
    #[serde(rename = "product")]
    pub name: String,
    pub cas: String,
    pub description: String,
    #[serde(skip_serializing_if = "Attachment::is_absent")]
    pub sds: Attachment,
    #[serde(skip_serializing_if = "Attachment::is_absent")]
    pub tds: Attachment,
}

/// Records come back with `_id`, `id`, or both depending on the backend's
/// serializer settings.
#[derive(Deserialize)]
struct ProductWire {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(rename = "subCategory", default)]
    sub_category: String,
    #[serde(default)]
    product: String,
    #[serde(default)]
    cas: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    sds: Attachment,
    #[serde(default)]
    tds: Attachment,
}

impl TryFrom<ProductWire> for Product {
    type Error = String;

    fn try_from(wire: ProductWire) -> std::result::Result<Self, Self::Error> {
        let id = wire
            .mongo_id
            .or(wire.id)
            .ok_or_else(|| "product record without `_id`".to_string())?;
        Ok(Product {
            id,
            category: wire.category,
            sub_category: wire.sub_category,
            name: wire.product,
            cas: wire.cas,
            description: wire.description,
            sds: wire.sds,
            tds: wire.tds,
        })
    }
}

/// What the create endpoint hands back: the issued identifier and the
/// attachment references the server settled on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CreatedWire")]
pub struct CreatedProduct {
    pub id: String,
    pub sds: Attachment,
    pub tds: Attachment,
}

#[derive(Deserialize)]
struct CreatedWire {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    sds: Attachment,
    #[serde(default)]
    tds: Attachment,
}

impl TryFrom<CreatedWire> for CreatedProduct {
    type Error = String;

    fn try_from(wire: CreatedWire) -> std::result::Result<Self, Self::Error> {
        let id = wire
            .mongo_id
            .or(wire.id)
            .ok_or_else(|| "created product without `_id`".to_string())?;
        Ok(CreatedProduct {
            id,
            sds: wire.sds,
            tds: wire.tds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub name: String,
    /// Parent category name, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// ===== FIELDS & DRAFTS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductField {
    Category,
    SubCategory,
    Name,
    Cas,
    Description,
    Sds,
    Tds,
}

impl ProductField {
    pub const ALL: [ProductField; 7] = [
        ProductField::Category,
        ProductField::SubCategory,
        ProductField::Name,
        ProductField::Cas,
        ProductField::Description,
        ProductField::Sds,
        ProductField::Tds,
    ];

    pub const REQUIRED: [ProductField; 5] = [
        ProductField::Category,
        ProductField::SubCategory,
        ProductField::Name,
        ProductField::Cas,
        ProductField::Description,
    ];

    /// Name used in JSON records and multipart bodies.
    pub fn wire_name(self) -> &'static str {
        match self {
            ProductField::Category => "category",
            ProductField::SubCategory => "subCategory",
            ProductField::Name => "product",
            ProductField::Cas => "cas",
            ProductField::Description => "description",
            ProductField::Sds => "sds",
            ProductField::Tds => "tds",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductField::Category => "Category",
            ProductField::SubCategory => "Sub Category",
            ProductField::Name => "Product Name",
            ProductField::Cas => "CAS Number",
            ProductField::Description => "Description",
            ProductField::Sds => "Safety Data Sheet (SDS)",
            ProductField::Tds => "Technical Data Sheet (TDS)",
        }
    }

    pub fn is_attachment(self) -> bool {
        matches!(self, ProductField::Sds | ProductField::Tds)
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for ProductField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "category" => Ok(ProductField::Category),
            "subCategory" | "sub_category" | "sub-category" => Ok(ProductField::SubCategory),
            "product" | "name" => Ok(ProductField::Name),
            "cas" => Ok(ProductField::Cas),
            "description" => Ok(ProductField::Description),
            "sds" => Ok(ProductField::Sds),
            "tds" => Ok(ProductField::Tds),
            other => Err(CatalogError::UnknownField(other.to_string())),
        }
    }
}

/// A product without its identifier: what the forms edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub category: String,
    pub sub_category: String,
    pub name: String,
    pub cas: String,
    pub description: String,
    pub sds: Attachment,
    pub tds: Attachment,
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            category: product.category.clone(),
            sub_category: product.sub_category.clone(),
            name: product.name.clone(),
            cas: product.cas.clone(),
            description: product.description.clone(),
            sds: product.sds.clone(),
            tds: product.tds.clone(),
        }
    }

    /// Text value of a field; attachment fields yield their stored reference.
    pub fn text(&self, field: ProductField) -> &str {
        match field {
            ProductField::Category => &self.category,
            ProductField::SubCategory => &self.sub_category,
            ProductField::Name => &self.name,
            ProductField::Cas => &self.cas,
            ProductField::Description => &self.description,
            ProductField::Sds => self.sds.stored_url().unwrap_or(""),
            ProductField::Tds => self.tds.stored_url().unwrap_or(""),
        }
    }

    /// Setting text on an attachment field records a stored reference.
    pub fn set_text(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Category => self.category = value,
            ProductField::SubCategory => self.sub_category = value,
            ProductField::Name => self.name = value,
            ProductField::Cas => self.cas = value,
            ProductField::Description => self.description = value,
            ProductField::Sds => self.sds = Attachment::from(Some(value)),
            ProductField::Tds => self.tds = Attachment::from(Some(value)),
        }
    }

    pub fn attachment(&self, field: ProductField) -> Option<&Attachment> {
        match field {
            ProductField::Sds => Some(&self.sds),
            ProductField::Tds => Some(&self.tds),
            _ => None,
        }
    }

    pub fn set_attachment(&mut self, field: ProductField, attachment: Attachment) -> Result<()> {
        match field {
            ProductField::Sds => self.sds = attachment,
            ProductField::Tds => self.tds = attachment,
            other => return Err(CatalogError::NotAnAttachment(other.wire_name())),
        }
        Ok(())
    }

    pub fn into_product(self, id: String) -> Product {
        Product {
            id,
            category: self.category,
            sub_category: self.sub_category,
            name: self.name,
            cas: self.cas,
            description: self.description,
            sds: self.sds,
            tds: self.tds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_accepts_mongo_id_and_wire_names() {
        let product: Product = serde_json::from_value(json!({
            "_id": "665f",
            "category": "Solvents",
            "subCategory": "Alcohols",
            "product": "Ethanol",
            "cas": "64-17-5",
            "description": "High purity ethanol",
            "sds": "https://files.example/ethanol_sds.pdf",
            "tds": null
        }))
        .unwrap();

        assert_eq!(product.id, "665f");
        assert_eq!(product.name, "Ethanol");
        assert_eq!(product.sub_category, "Alcohols");
        assert_eq!(
            product.sds,
            Attachment::Stored("https://files.example/ethanol_sds.pdf".to_string())
        );
        assert_eq!(product.tds, Attachment::Absent);
    }

    #[test]
    fn product_tolerates_both_id_spellings() {
        let product: Product = serde_json::from_value(json!({
            "_id": "abc",
            "id": "abc",
            "product": "Acetic Acid"
        }))
        .unwrap();
        assert_eq!(product.id, "abc");
        assert_eq!(product.description, "");
    }

    #[test]
    fn product_without_identifier_is_rejected() {
        let result: std::result::Result<Product, _> =
            serde_json::from_value(json!({ "product": "Nameless" }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_attachment_string_is_absent() {
        let created: CreatedProduct = serde_json::from_value(json!({
            "_id": "1",
            "sds": "",
            "tds": "uploads/tds.pdf"
        }))
        .unwrap();
        assert_eq!(created.sds, Attachment::Absent);
        assert_eq!(created.tds.stored_url(), Some("uploads/tds.pdf"));
    }

    #[test]
    fn pending_attachment_never_serializes() {
        let mut draft = ProductDraft::default();
        draft
            .set_attachment(
                ProductField::Sds,
                Attachment::Pending(PendingUpload::new("sheet.pdf", vec![1, 2, 3])),
            )
            .unwrap();
        let product = draft.into_product("p1".to_string());
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["sds"], serde_json::Value::Null);
        assert!(value.get("tds").is_none());
        assert_eq!(value["_id"], "p1");
        assert_eq!(value["product"], "");
    }

    #[test]
    fn draft_from_product_copies_everything_but_id() {
        let product = Product {
            id: "42".to_string(),
            category: "Bases".to_string(),
            sub_category: "Hydroxides".to_string(),
            name: "Sodium Hydroxide".to_string(),
            cas: "1310-73-2".to_string(),
            description: "Pellets".to_string(),
            sds: Attachment::Stored("naoh_sds.pdf".to_string()),
            tds: Attachment::Absent,
        };
        let draft = ProductDraft::from_product(&product);
        assert_eq!(draft.clone().into_product("42".to_string()), product);
        assert_eq!(draft.text(ProductField::Sds), "naoh_sds.pdf");
    }

    #[test]
    fn text_fields_refuse_files() {
        let mut draft = ProductDraft::default();
        let err = draft
            .set_attachment(ProductField::Cas, Attachment::Absent)
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotAnAttachment("cas")));
    }

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in ProductField::ALL {
            assert_eq!(field.wire_name().parse::<ProductField>().unwrap(), field);
        }
        assert!("colour".parse::<ProductField>().is_err());
    }

    #[test]
    fn pdf_uploads_get_pdf_content_type() {
        assert_eq!(PendingUpload::new("SDS.PDF", vec![]).content_type, "application/pdf");
        assert_eq!(
            PendingUpload::new("notes.txt", vec![]).content_type,
            "application/octet-stream"
        );
    }
}
