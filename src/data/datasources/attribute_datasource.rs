use der::{asn1::AnyRef, Decode, Reader, SliceReader, Tagged};

use crate::{data::models::receipt_attribute_model::ReceiptAttributeModel, errors::AttributeError};

pub trait AttributeDatasource {
    /// Splits a receipt payload, or a nested in-app purchase payload, into
    /// its attribute triples, in encoding order.
    ///
    /// content:
    ///   DER of a constructed value (SET or SEQUENCE) whose elements are
    ///   `ReceiptAttribute` sequences.
    fn walk<'a>(&self, content: &'a [u8]) -> Result<Vec<ReceiptAttributeModel<'a>>, AttributeError>;
}

pub struct AttributeDatasourceImpl;

impl AttributeDatasource for AttributeDatasourceImpl {
    fn walk<'a>(&self, content: &'a [u8]) -> Result<Vec<ReceiptAttributeModel<'a>>, AttributeError> {
        let wrapper = AnyRef::from_der(content)
            .map_err(|e| AttributeError::Malformed(format!("attribute set: {e}")))?;
        if !wrapper.tag().is_constructed() {
            return Err(AttributeError::Malformed(format!(
                "attribute set is a primitive {}",
                wrapper.tag()
            )));
        }

        // Element by element rather than as a SET OF: the vendor does not
        // emit elements in DER set order, and that order must be preserved.
        let mut reader = SliceReader::new(wrapper.value())
            .map_err(|e| AttributeError::Malformed(format!("attribute set: {e}")))?;
        let mut attributes = Vec::new();
        while !reader.is_finished() {
            let attribute = ReceiptAttributeModel::decode(&mut reader).map_err(|e| {
                AttributeError::Malformed(format!("attribute #{}: {e}", attributes.len()))
            })?;
            attributes.push(attribute);
        }
        tracing::trace!(count = attributes.len(), "walked attribute set");
        Ok(attributes)
    }
}

impl AttributeDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}
