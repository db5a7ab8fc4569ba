//! Per-kind document normalization.
//!
//! Templates, separators and metadata keys are a reproducibility contract:
//! the same record must produce a byte-identical document on every build.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::CorpusError;
use crate::faq::FaqEntry;
use crate::{Document, RawRecord, SourceKind};

/// Normalize one raw record of the given kind into a [`Document`].
///
/// Pure function; the only failure mode is a missing or wrongly-typed
/// required field.
///
/// # Errors
///
/// Returns [`CorpusError::MalformedRecord`] naming the offending field.
pub fn normalize(kind: SourceKind, record: &RawRecord) -> Result<Document, CorpusError> {
    match kind {
        SourceKind::Product => normalize_product(record),
        SourceKind::Review => normalize_review(record),
        SourceKind::Comment => normalize_comment(record),
        SourceKind::Faq => Err(CorpusError::Source(
            "FAQ documents come from the seed set, not raw records".into(),
        )),
    }
}

/// Build the document for one seeded FAQ entry. Ids are `faq_{index}`.
#[must_use]
pub fn faq_document(index: usize, entry: &FaqEntry) -> Document {
    Document {
        id: format!("faq_{index}"),
        text: format!("Câu hỏi: {} | Trả lời: {}", entry.question, entry.answer),
        metadata: HashMap::from([
            ("type".into(), Value::String("faq".into())),
            ("question".into(), Value::String(entry.question.into())),
        ]),
    }
}

fn normalize_product(record: &RawRecord) -> Result<Document, CorpusError> {
    let kind = SourceKind::Product;
    let id = required_scalar(record, kind, "id")?;
    let name = required_str(record, kind, "productName")?;

    let mut parts = vec![format!("Sản phẩm: {name}")];
    if let Some(short_desc) = optional_scalar(record, "shortDesc") {
        parts.push(format!("Mô tả ngắn: {short_desc}"));
    }
    if let Some(description) = optional_scalar(record, "description") {
        parts.push(format!("Mô tả chi tiết: {description}"));
    }
    let price = optional_scalar(record, "price");
    if let Some(price) = &price {
        parts.push(format!("Giá: {price} VNĐ"));
    }

    let mut metadata = HashMap::from([
        ("type".into(), Value::String("product".into())),
        ("product_id".into(), Value::String(id.clone())),
        ("product_name".into(), Value::String(name.to_owned())),
    ]);
    if let Some(price) = price {
        metadata.insert("price".into(), Value::String(price));
    }
    if let Some(category_id) = optional_scalar(record, "categoryId") {
        metadata.insert("category_id".into(), Value::String(category_id));
    }

    Ok(Document {
        id: format!("product_{id}"),
        text: parts.join(" | "),
        metadata,
    })
}

fn normalize_review(record: &RawRecord) -> Result<Document, CorpusError> {
    let kind = SourceKind::Review;
    let id = required_scalar(record, kind, "id")?;
    let product_id = required_scalar(record, kind, "productId")?;
    let text = required_str(record, kind, "text")?;
    let rating = required_int(record, kind, "rating")?;
    let user_name = required_str(record, kind, "userName")?;

    Ok(Document {
        id: format!("review_{id}"),
        text: format!(
            "Đánh giá về sản phẩm: {text} | Đánh giá: {rating}/5 sao | Người đánh giá: {user_name}"
        ),
        metadata: HashMap::from([
            ("type".into(), Value::String("review".into())),
            ("review_id".into(), Value::String(id)),
            ("product_id".into(), Value::String(product_id)),
            ("rating".into(), Value::Number(rating.into())),
            ("user_name".into(), Value::String(user_name.to_owned())),
        ]),
    })
}

fn normalize_comment(record: &RawRecord) -> Result<Document, CorpusError> {
    let kind = SourceKind::Comment;
    let id = required_scalar(record, kind, "id")?;
    let product_id = required_scalar(record, kind, "productId")?;
    let text = required_str(record, kind, "text")?;

    Ok(Document {
        id: format!("comment_{id}"),
        text: format!("Bình luận: {text}"),
        metadata: HashMap::from([
            ("type".into(), Value::String("comment".into())),
            ("comment_id".into(), Value::String(id)),
            ("product_id".into(), Value::String(product_id)),
        ]),
    })
}

fn required_str<'a>(
    record: &'a RawRecord,
    kind: SourceKind,
    field: &'static str,
) -> Result<&'a str, CorpusError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or(CorpusError::MalformedRecord { kind, field })
}

fn required_int(
    record: &RawRecord,
    kind: SourceKind,
    field: &'static str,
) -> Result<i64, CorpusError> {
    record
        .get(field)
        .and_then(Value::as_i64)
        .ok_or(CorpusError::MalformedRecord { kind, field })
}

fn required_scalar(
    record: &RawRecord,
    kind: SourceKind,
    field: &'static str,
) -> Result<String, CorpusError> {
    record
        .get(field)
        .and_then(scalar_string)
        .ok_or(CorpusError::MalformedRecord { kind, field })
}

/// A present, truthy scalar rendered as a string. Null, absent, empty-string
/// and zero values are treated as "not present", matching the system of
/// record's loose optional columns.
fn optional_scalar(record: &RawRecord, field: &str) -> Option<String> {
    let value = record.get(field)?;
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        _ => scalar_string(value),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
