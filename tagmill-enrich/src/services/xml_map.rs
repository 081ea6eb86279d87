//! Recursive XML-to-JSON conversion for remote records
//!
//! The remote record API answers with hierarchical XML of no fixed schema.
//! Records are converted into JSON documents that can be merged into object
//! metadata without knowing the schema up front.
//!
//! Conversion rules, preserved exactly for compatibility with the upstream
//! feed:
//! - A leaf element with non-empty trimmed text collapses to a plain string,
//!   even when it carries attributes (the attributes are dropped).
//! - Attributes become keys of the element's object.
//! - Element text alongside children is stored under the reserved `"text"`
//!   key.
//! - Repeated sibling tags promote the value to an array in document order;
//!   singleton tags stay single values. Consumers must treat every key as
//!   one-or-many.

use serde_json::{Map, Value};

/// Parse an XML document body and convert its root element.
///
/// # Errors
///
/// Returns the underlying parse error for malformed markup; callers decide
/// how a bad record affects the surrounding operation.
pub fn parse_document(body: &str) -> Result<Value, roxmltree::Error> {
    let document = roxmltree::Document::parse(body)?;
    Ok(convert(document.root_element()))
}

/// Convert one element (depth-first) into a JSON value.
pub fn convert(node: roxmltree::Node<'_, '_>) -> Value {
    let mut record = Map::new();

    for attribute in node.attributes() {
        record.insert(
            attribute.name().to_string(),
            Value::String(attribute.value().to_string()),
        );
    }

    let text = node.text().map(str::trim).filter(|t| !t.is_empty());
    let children: Vec<_> = node.children().filter(|c| c.is_element()).collect();

    if children.is_empty() {
        if let Some(text) = text {
            // Leaf with text collapses to a scalar, attributes and all.
            return Value::String(text.to_string());
        }
        return Value::Object(record);
    }

    if let Some(text) = text {
        record.insert("text".to_string(), Value::String(text.to_string()));
    }

    for child in children {
        let converted = convert(child);
        let tag = child.tag_name().name().to_string();
        match record.get_mut(&tag) {
            Some(Value::Array(items)) => items.push(converted),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, converted]);
            }
            None => {
                record.insert(tag, converted);
            }
        }
    }

    Value::Object(record)
}
