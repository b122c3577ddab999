//! Inventory records and the ordered collection that holds them.
//!
//! # Why are prices and stocks strings? (for beginners)
//!
//! `unit_price` and `stock_kg` are carried as opaque text.  Nothing in the
//! system does arithmetic on them: they are typed in by a user, stored, shown
//! back and overwritten.  Keeping them as strings means `"2.50"` is stored and
//! displayed as `"2.50"` (a float would turn it into `2.5`), and equality is
//! plain textual equality.
//!
//! # Ordering
//!
//! [`InventoryCollection`] is an insertion-ordered `Vec`.  There is no sort
//! anywhere; the order records were added in is the order they are shown in
//! and the order they are written to the snapshot file in.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::errors::InventoryError;

/// One stocked item.
///
/// `name` is the unique, case-sensitive key.  Uniqueness is enforced by
/// [`InventoryCollection::append`]; there is no rename operation, so once a
/// record is in the collection its key never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Unique key, e.g. `"carrot"`.
    pub name: String,
    /// Price per kilogram, stored verbatim.
    pub unit_price: String,
    /// Remaining stock in kilograms, stored verbatim.
    pub stock_kg: String,
}

impl InventoryRecord {
    /// Builds a record from its three textual fields.
    pub fn new(
        name: impl Into<String>,
        unit_price: impl Into<String>,
        stock_kg: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit_price: unit_price.into(),
            stock_kg: stock_kg.into(),
        }
    }

    /// Returns the value of a single updatable field.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::UnitPrice => &self.unit_price,
            Field::StockKg => &self.stock_kg,
        }
    }
}

/// The fields of a record that `update` may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    UnitPrice,
    StockKg,
}

/// Insertion-ordered set of [`InventoryRecord`]s keyed by name.
///
/// This is also the document shape of the snapshot file: serialised as TOML it
/// becomes an array of `[[vegetable]]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryCollection {
    #[serde(rename = "vegetable", default)]
    records: Vec<InventoryRecord>,
}

impl InventoryCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record called `name`, if any.
    pub fn find(&self, name: &str) -> Option<&InventoryRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Returns every record in insertion order.
    pub fn find_all(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Returns `true` if a record called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Appends `record` at the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::DuplicateKey`] and leaves the collection
    /// untouched if a record with the same name is already present.
    pub fn append(&mut self, record: InventoryRecord) -> Result<(), InventoryError> {
        if self.contains(&record.name) {
            return Err(InventoryError::DuplicateKey(record.name));
        }
        self.records.push(record);
        Ok(())
    }

    /// Overwrites one field of the record called `name`.
    ///
    /// Returns `false` if no such record exists.
    pub fn update_field(&mut self, name: &str, field: Field, value: &str) -> bool {
        match self.records.iter_mut().find(|r| r.name == name) {
            Some(record) => {
                let slot = match field {
                    Field::UnitPrice => &mut record.unit_price,
                    Field::StockKg => &mut record.stock_kg,
                };
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<InventoryRecord>> for InventoryCollection {
    /// Builds a collection from a list, dropping later duplicates of a name so
    /// the uniqueness invariant holds even for hand-edited input.
    fn from(records: Vec<InventoryRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            if let Err(InventoryError::DuplicateKey(name)) = collection.append(record) {
                warn!("dropping duplicate vegetable '{name}'; the first entry is kept");
            }
        }
        collection
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn carrot() -> InventoryRecord {
        InventoryRecord::new("carrot", "2.50", "100")
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        // Arrange
        let mut c = InventoryCollection::new();

        // Act
        c.append(InventoryRecord::new("leek", "1", "1")).unwrap();
        c.append(InventoryRecord::new("beet", "2", "2")).unwrap();
        c.append(InventoryRecord::new("kale", "3", "3")).unwrap();

        // Assert
        let names: Vec<&str> = c.find_all().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["leek", "beet", "kale"]);
    }

    #[test]
    fn test_append_duplicate_is_rejected_and_collection_unchanged() {
        let mut c = InventoryCollection::new();
        c.append(carrot()).unwrap();

        let result = c.append(InventoryRecord::new("carrot", "3.00", "50"));

        assert_eq!(result, Err(InventoryError::DuplicateKey("carrot".to_string())));
        assert_eq!(c.len(), 1);
        assert_eq!(c.find("carrot"), Some(&carrot()));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut c = InventoryCollection::new();
        c.append(carrot()).unwrap();

        assert!(c.append(InventoryRecord::new("Carrot", "1", "1")).is_ok());
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_update_field_overwrites_only_the_named_field() {
        let mut c = InventoryCollection::new();
        c.append(carrot()).unwrap();

        assert!(c.update_field("carrot", Field::UnitPrice, "3.00"));

        let record = c.find("carrot").unwrap();
        assert_eq!(record.unit_price, "3.00");
        assert_eq!(record.stock_kg, "100");
    }

    #[test]
    fn test_update_field_on_missing_name_returns_false() {
        let mut c = InventoryCollection::new();
        assert!(!c.update_field("kale", Field::StockKg, "10"));
        assert!(c.is_empty());
    }

    #[test]
    fn test_from_vec_drops_duplicate_names() {
        let c = InventoryCollection::from(vec![
            carrot(),
            InventoryRecord::new("carrot", "9", "9"),
        ]);
        assert_eq!(c.find_all(), &[carrot()]);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_from_vec_warns_with_the_dropped_name() {
        // Arrange
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        // Act
        let c = tracing::subscriber::with_default(subscriber, || {
            InventoryCollection::from(vec![
                carrot(),
                InventoryRecord::new("leek", "1", "1"),
                InventoryRecord::new("carrot", "9", "9"),
            ])
        });

        // Assert
        assert_eq!(c.len(), 2);
        let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("dropping duplicate vegetable 'carrot'"), "{logs}");
        assert!(!logs.contains("'leek'"));
    }

    #[test]
    fn test_record_field_accessor() {
        let r = carrot();
        assert_eq!(r.field(Field::UnitPrice), "2.50");
        assert_eq!(r.field(Field::StockKg), "100");
    }
}
