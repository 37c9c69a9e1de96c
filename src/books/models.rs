use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Book record as exchanged with the backend.
///
/// Only `id` is mandatory on the wire; the backend owns every other field
/// and older records may lack some of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Assigned by the backend, never by the client
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    /// Publication year
    #[serde(default, deserialize_with = "lenient_i32")]
    pub year: i32,
    /// Backends often send decimals as strings such as `"350.00"`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Page count
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub pages: Option<u32>,
    /// Creation timestamp as sent by the backend (RFC 3339 or a bare date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A number as backends actually send it: integer, float or numeric text.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Int(value) => Some(*value as f64),
            LooseNumber::Float(value) => Some(*value),
            LooseNumber::Text(text) => text.trim().parse().ok(),
            LooseNumber::Other(_) => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(value) => Some(*value),
            LooseNumber::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(text) => text.trim().parse().ok(),
            LooseNumber::Other(_) => None,
        }
    }
}

// `null` and unreadable values fall back to the field default so one odd
// record cannot fail a whole collection.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(LooseNumber::as_f64).unwrap_or_default())
}

fn lenient_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(LooseNumber::as_i64)
        .and_then(|raw| i32::try_from(raw).ok())
        .unwrap_or_default())
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<LooseNumber>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(LooseNumber::as_i64)
        .and_then(|raw| u32::try_from(raw).ok()))
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i32,
    pub price: f64,
    pub category: String,
    pub pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_records_decode_with_defaults() {
        let book: Book = serde_json::from_str(r#"{"id":1,"title":"A"}"#).unwrap();
        assert_eq!(book.id, 1);
        assert_eq!(book.title, "A");
        assert!(book.author.is_empty());
        assert_eq!(book.created_at, None);
    }

    #[test]
    fn numbers_may_arrive_as_text_or_null() {
        let book: Book = serde_json::from_str(
            r#"{"id":2,"title":"Emma","year":"1815","price":"350.00","pages":"474"}"#,
        )
        .unwrap();
        assert_eq!(book.year, 1815);
        assert_eq!(book.price, 350.0);
        assert_eq!(book.pages, Some(474));

        let book: Book =
            serde_json::from_str(r#"{"id":3,"year":null,"price":null,"pages":null}"#).unwrap();
        assert_eq!(book.year, 0);
        assert_eq!(book.price, 0.0);
        assert_eq!(book.pages, None);

        let book: Book =
            serde_json::from_str(r#"{"id":4,"year":1965.0,"price":120,"pages":"n/a"}"#).unwrap();
        assert_eq!(book.year, 1965);
        assert_eq!(book.price, 120.0);
        assert_eq!(book.pages, None);
    }

    #[test]
    fn optional_fields_are_omitted_when_absent() {
        let book = Book {
            id: 3,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            year: 1965,
            price: 350.0,
            category: None,
            pages: None,
            created_at: None,
        };
        let json = serde_json::to_value(&book).unwrap();
        assert!(json.get("category").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["year"], 1965);
    }
}
