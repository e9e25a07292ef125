//! Single-row CSV export.

use crate::error::ExportError;
use quill_model::{Entity, Record};

/// An entity that can be laid out as one CSV row.
///
/// The default layout is one column per declared attribute, in schema order,
/// and only works for flat schemas. Types holding lists or nested entities
/// override [`Tabular::to_record`] to flatten them.
pub trait Tabular: Entity {
    fn to_record(&self) -> Result<Vec<(String, String)>, ExportError> {
        flat_record(self)
    }
}

impl Tabular for Record {}

/// One `(name, cell)` pair per declared attribute; unset attributes give an
/// empty cell.
pub fn flat_record<E: Entity + ?Sized>(
    entity: &E,
) -> Result<Vec<(String, String)>, ExportError> {
    entity
        .schema()
        .attributes()
        .iter()
        .map(|attribute| {
            if !attribute.kind.is_scalar() {
                return Err(ExportError::Shape {
                    type_name: entity.type_name().to_string(),
                    attribute: attribute.name.clone(),
                    kind: attribute.kind.label(),
                });
            }
            let cell = entity
                .value_of(&attribute.name)
                .map(ToString::to_string)
                .unwrap_or_default();
            Ok((attribute.name.clone(), cell))
        })
        .collect()
}

/// Header line plus one data line, each `\n`-terminated.
pub fn to_csv<E: Tabular + ?Sized>(entity: &E) -> Result<String, ExportError> {
    let row = entity.to_record()?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(row.iter().map(|(name, _)| name.as_str()))?;
    writer.write_record(row.iter().map(|(_, cell)| cell.as_str()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::{EntityKey, Timestamp};
    use quill_model::{Schema, Value};
    use std::sync::Arc;

    fn contract() -> Record {
        let schema = Schema::builder("Contract")
            .text("description")
            .text("client")
            .number("amount")
            .timestamp("signed_at")
            .build()
            .unwrap();
        let mut r = Record::new(Arc::new(schema));
        r.set("description", "Web site, phase \"one\"").unwrap();
        r.set("client", "ACME").unwrap();
        r.set("amount", 5500.0).unwrap();
        r
    }

    #[test]
    fn exactly_two_lines_with_quoting() {
        let csv = to_csv(&contract()).unwrap();
        assert_eq!(
            csv,
            "description,client,amount,signed_at\n\
             \"Web site, phase \"\"one\"\"\",ACME,5500,\n"
        );
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn timestamps_use_iso_form() {
        let mut r = contract();
        r.set("signed_at", Timestamp::from_millis(0)).unwrap();
        let row = r.to_record().unwrap();
        assert_eq!(row[3].0, "signed_at");
        assert_eq!(row[3].1, "1970-01-01T00:00:00.000000Z");
    }

    #[test]
    fn list_attribute_is_a_shape_error() {
        let schema = Schema::builder("Order")
            .text("client")
            .list("products")
            .build()
            .unwrap();
        let r = Record::new(Arc::new(schema));
        let err = to_csv(&r).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Shape { ref attribute, kind: "list", .. } if attribute == "products"
        ));
    }

    #[test]
    fn nested_entity_attribute_is_a_shape_error() {
        let customer = Schema::builder("Customer").text("name").build().unwrap();
        let schema = Schema::builder("Order")
            .integer("n")
            .entity("customer", Arc::new(customer))
            .build()
            .unwrap();
        let r = Record::new(Arc::new(schema));
        let err = to_csv(&r).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Shape { ref type_name, ref attribute, kind: "entity" }
                if type_name == "Order" && attribute == "customer"
        ));
    }

    struct Order {
        record: Record,
    }

    impl Entity for Order {
        fn schema(&self) -> &Schema {
            self.record.schema()
        }

        fn key(&self) -> EntityKey {
            self.record.key()
        }

        fn value_of(&self, name: &str) -> Option<&Value> {
            self.record.value_of(name)
        }
    }

    impl Tabular for Order {
        fn to_record(&self) -> Result<Vec<(String, String)>, ExportError> {
            let products = self
                .record
                .get("products")
                .and_then(Value::as_list)
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            Ok(vec![("products".into(), products)])
        }
    }

    #[test]
    fn overridden_layout_flattens_lists() {
        let schema = Schema::builder("Order").list("products").build().unwrap();
        let mut record = Record::new(Arc::new(schema));
        record.set("products", vec!["Laptop", "Mouse"]).unwrap();
        let csv = to_csv(&Order { record }).unwrap();
        assert_eq!(csv, "products\n\"Laptop, Mouse\"\n");
    }
}
