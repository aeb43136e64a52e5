//! Wire shapes of the commerce API and their normalized records.
//!
//! The remote sends prices as strings, nests media and profile pictures in objects,
//! and names fields after its own data model. Everything is flattened and renamed here
//! so the rest of the crate only sees [`UserRecord`], [`ItemRecord`] and
//! [`SaleConfirmation`].
//!
//! The `interpret_*` functions turn a status code and body into a record or a typed
//! error. They perform no I/O.

use crate::{
    core::{item::NewItem, user::NewUser},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, de};

/// A member as returned by `GET /members?username=...`, normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    /// Remote member id
    pub id: i64,
    /// Renamed from `username`
    pub student_number: String,
    /// Given name
    pub first_name: String,
    /// Renamed from `primary_last_name_main`
    pub last_name: String,
    /// Renamed from `primary_last_name_prefix`
    pub last_name_prefix: Option<String>,
    /// Parsed from a date or timestamp string
    pub date_of_birth: NaiveDate,
    /// Renamed from `has_sdd_mandate`
    pub has_signed_mandate: bool,
    /// Flattened from `profile_picture.url`, empty when absent
    pub profile_picture_url: String,
}

/// A product as returned by `GET /products...`, normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRecord {
    /// Remote product id
    pub id: i64,
    /// Product name
    pub name: String,
    /// Cents, parsed from the remote's string
    pub price: i64,
    /// Whether the remote offers it for sale
    pub published: bool,
    /// First entry of `media`, empty when there is none
    pub media_url: String,
    /// Remote folder the product belongs to
    pub folder_id: i64,
    /// Renamed from `folder`
    pub folder_name: Option<String>,
}

/// One confirmed line of a posted sale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmedLine {
    /// Product on this line, when the remote reports it
    pub product_id: Option<i64>,
    /// Quantity on this line, when the remote reports it
    pub quantity: Option<i64>,
    /// Unit price in cents
    pub price: i64,
    /// Line total in cents
    pub total_price: i64,
}

/// The remote's answer to `POST /sales`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleConfirmation {
    /// Remote sale id
    pub remote_id: i64,
    /// Remote sale reference
    pub reference: String,
    /// Creation time, in UTC when the remote sent an offset
    pub created_at: NaiveDateTime,
    /// Confirmed lines, in the remote's order
    pub lines: Vec<ConfirmedLine>,
}

impl SaleConfirmation {
    /// Sum of the confirmed line totals, in cents. `None` when the sum overflows.
    #[must_use]
    pub fn total_price(&self) -> Option<i64> {
        self.lines
            .iter()
            .try_fold(0_i64, |sum, line| sum.checked_add(line.total_price))
    }
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    id: i64,
    username: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    primary_last_name_main: Option<String>,
    #[serde(default)]
    primary_last_name_prefix: Option<String>,
    date_of_birth: String,
    #[serde(default)]
    has_sdd_mandate: bool,
    #[serde(default)]
    profile_picture: Option<RawMedia>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: i64,
    name: String,
    #[serde(deserialize_with = "cents")]
    price: i64,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    media: Vec<RawMedia>,
    folder_id: i64,
    #[serde(default)]
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSaleLine {
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(deserialize_with = "cents")]
    price: i64,
    #[serde(deserialize_with = "cents")]
    total_price: i64,
}

#[derive(Debug, Deserialize)]
struct RawSale {
    id: i64,
    #[serde(default)]
    reference: String,
    created: String,
    #[serde(default)]
    items: Vec<RawSaleLine>,
}

/// Accepts cents as either a JSON number or a numeric string. Negative amounts are rejected.
fn cents<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(i64),
        Text(String),
    }

    let value = match Amount::deserialize(deserializer)? {
        Amount::Number(n) => n,
        Amount::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("price {text:?} is not an integer")))?,
    };
    if value < 0 {
        return Err(de::Error::custom(format!("price {value} is negative")));
    }
    Ok(value)
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Ok(with_offset.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| Error::Unexpected {
            message: format!("Unrecognized timestamp {text:?}"),
        })
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").or_else(|_| parse_timestamp(text).map(|t| t.date()))
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

impl TryFrom<RawMember> for UserRecord {
    type Error = Error;

    fn try_from(raw: RawMember) -> Result<Self> {
        Ok(Self {
            id: raw.id,
            student_number: raw.username,
            first_name: raw.first_name,
            last_name: raw.primary_last_name_main.unwrap_or_default(),
            last_name_prefix: non_empty(raw.primary_last_name_prefix),
            date_of_birth: parse_date(&raw.date_of_birth)?,
            has_signed_mandate: raw.has_sdd_mandate,
            profile_picture_url: raw.profile_picture.map(|p| p.url).unwrap_or_default(),
        })
    }
}

impl From<RawProduct> for ItemRecord {
    fn from(raw: RawProduct) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            price: raw.price,
            published: raw.published,
            media_url: raw
                .media
                .into_iter()
                .next()
                .map(|m| m.url)
                .unwrap_or_default(),
            folder_id: raw.folder_id,
            folder_name: raw.folder,
        }
    }
}

impl TryFrom<RawSale> for SaleConfirmation {
    type Error = Error;

    fn try_from(raw: RawSale) -> Result<Self> {
        Ok(Self {
            remote_id: raw.id,
            reference: raw.reference,
            created_at: parse_timestamp(&raw.created)?,
            lines: raw
                .items
                .into_iter()
                .map(|line| ConfirmedLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price: line.price,
                    total_price: line.total_price,
                })
                .collect(),
        })
    }
}

impl From<UserRecord> for NewUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            student_number: record.student_number,
            first_name: record.first_name,
            last_name: record.last_name,
            last_name_prefix: record.last_name_prefix,
            date_of_birth: record.date_of_birth,
            has_signed_mandate: record.has_signed_mandate,
            profile_picture_url: non_empty(Some(record.profile_picture_url)),
        }
    }
}

impl From<ItemRecord> for NewItem {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            price: record.price,
            published: record.published,
            media_url: non_empty(Some(record.media_url)),
            folder_id: record.folder_id,
        }
    }
}

fn ensure_success(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Remote {
            status: Some(status.as_u16()),
            message: body.to_string(),
        })
    }
}

/// Reads the single member in a `/members?username=` response.
pub fn interpret_member(status: StatusCode, body: &str, student_number: &str) -> Result<UserRecord> {
    ensure_success(status, body)?;
    let members: Vec<RawMember> = serde_json::from_str(body)?;
    let member = members
        .into_iter()
        .next()
        .ok_or_else(|| Error::UserNotFound {
            student_number: student_number.to_string(),
        })?;
    UserRecord::try_from(member)
}

/// Reads a `/products/{id}` response. A 404 means the product does not exist.
pub fn interpret_product(status: StatusCode, body: &str, item_id: i64) -> Result<ItemRecord> {
    if status == StatusCode::NOT_FOUND {
        return Err(Error::ItemNotFound { item_id });
    }
    ensure_success(status, body)?;
    let product: RawProduct = serde_json::from_str(body)?;
    Ok(product.into())
}

/// Reads a `/products?folder_id=` response.
///
/// The remote answers an unknown folder id with an empty list rather than a 404, so an
/// empty list is reported as [`Error::FolderNotFound`]. A real but empty folder looks
/// the same.
pub fn interpret_folder_products(
    status: StatusCode,
    body: &str,
    folder_id: i64,
) -> Result<Vec<ItemRecord>> {
    ensure_success(status, body)?;
    let products: Vec<RawProduct> = serde_json::from_str(body)?;
    if products.is_empty() {
        return Err(Error::FolderNotFound { folder_id });
    }
    Ok(products.into_iter().map(ItemRecord::from).collect())
}

/// Reads a `POST /sales` response.
///
/// The remote reports a missing direct-debit mandate as a 404 whose body mentions the
/// mandate. That case is reclassified as [`Error::UserNotSigned`].
pub fn interpret_sale(status: StatusCode, body: &str) -> Result<SaleConfirmation> {
    if status == StatusCode::NOT_FOUND && body.to_lowercase().contains("mandate") {
        return Err(Error::UserNotSigned {
            message: body.to_string(),
        });
    }
    ensure_success(status, body)?;
    let sale: RawSale = serde_json::from_str(body)?;
    SaleConfirmation::try_from(sale)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "id": 13591,
            "name": "Testproduct",
            "price": "0",
            "published": true,
            "media": [{"url": "https://example.org/a.png"}, {"url": "https://example.org/b.png"}],
            "folder_id": 1998,
            "folder": "Speciaal"
        })
    }

    #[test]
    fn test_member_is_normalized() {
        let body = json!([{
            "id": 347980,
            "username": "s9999999",
            "first_name": "Test",
            "primary_last_name_main": "Gebruiker",
            "primary_last_name_prefix": "de",
            "date_of_birth": "1999-12-31",
            "has_sdd_mandate": true,
            "profile_picture": {"url": "https://example.org/me.jpg"}
        }])
        .to_string();

        let user = interpret_member(StatusCode::OK, &body, "s9999999").unwrap();
        assert_eq!(user.id, 347_980);
        assert_eq!(user.student_number, "s9999999");
        assert_eq!(user.last_name, "Gebruiker");
        assert_eq!(user.last_name_prefix.as_deref(), Some("de"));
        assert_eq!(user.date_of_birth, NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
        assert!(user.has_signed_mandate);
        assert_eq!(user.profile_picture_url, "https://example.org/me.jpg");
    }

    #[test]
    fn test_member_without_picture_gets_empty_url() {
        let body = json!([{
            "id": 1,
            "username": "s1",
            "first_name": "A",
            "primary_last_name_main": "B",
            "primary_last_name_prefix": null,
            "date_of_birth": "2000-01-01T00:00:00",
            "has_sdd_mandate": false,
            "profile_picture": null
        }])
        .to_string();

        let user = interpret_member(StatusCode::OK, &body, "s1").unwrap();
        assert_eq!(user.profile_picture_url, "");
        assert!(user.last_name_prefix.is_none());
        assert_eq!(user.date_of_birth, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }

    #[test]
    fn test_empty_member_list_is_user_not_found() {
        let err = interpret_member(StatusCode::OK, "[]", "s8888888").unwrap_err();
        assert!(matches!(err, Error::UserNotFound { student_number } if student_number == "s8888888"));
    }

    #[test]
    fn test_product_price_and_media_are_flattened() {
        let item = interpret_product(StatusCode::OK, &product_json().to_string(), 13591).unwrap();
        assert_eq!(item.price, 0);
        assert_eq!(item.media_url, "https://example.org/a.png");
        assert_eq!(item.folder_name.as_deref(), Some("Speciaal"));
        assert_eq!(item.folder_id, 1998);
    }

    #[test]
    fn test_product_price_accepts_numbers() {
        let mut raw = product_json();
        raw["price"] = json!(150);
        raw["media"] = json!([]);
        let item = interpret_product(StatusCode::OK, &raw.to_string(), 13591).unwrap();
        assert_eq!(item.price, 150);
        assert_eq!(item.media_url, "");
    }

    #[test]
    fn test_product_negative_price_is_rejected() {
        let mut raw = product_json();
        raw["price"] = json!("-5");
        let err = interpret_product(StatusCode::OK, &raw.to_string(), 13591).unwrap_err();
        assert!(matches!(err, Error::Unexpected { .. }));
    }

    #[test]
    fn test_product_404_is_item_not_found() {
        let err = interpret_product(StatusCode::NOT_FOUND, "{}", 1).unwrap_err();
        assert!(matches!(err, Error::ItemNotFound { item_id: 1 }));
    }

    #[test]
    fn test_empty_folder_is_folder_not_found() {
        let err = interpret_folder_products(StatusCode::OK, "[]", 1).unwrap_err();
        assert!(matches!(err, Error::FolderNotFound { folder_id: 1 }));
    }

    #[test]
    fn test_folder_products_are_normalized() {
        let body = json!([product_json(), product_json()]).to_string();
        let items = interpret_folder_products(StatusCode::OK, &body, 1998).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.price == 0 && i.folder_id == 1998));
    }

    #[test]
    fn test_server_error_is_remote_error() {
        let err = interpret_folder_products(StatusCode::INTERNAL_SERVER_ERROR, "oops", 1).unwrap_err();
        assert!(matches!(err, Error::Remote { status: Some(500), .. }));
    }

    #[test]
    fn test_mandate_404_is_reclassified() {
        let body = r#"{"message": "User has no valid SDD mandate"}"#;
        let err = interpret_sale(StatusCode::NOT_FOUND, body).unwrap_err();
        assert!(matches!(err, Error::UserNotSigned { .. }));
    }

    #[test]
    fn test_plain_404_on_sale_stays_remote_error() {
        let err = interpret_sale(StatusCode::NOT_FOUND, r#"{"message": "user not found"}"#).unwrap_err();
        assert!(matches!(err, Error::Remote { status: Some(404), .. }));
    }

    #[test]
    fn test_sale_confirmation_totals() {
        let body = json!({
            "id": 991,
            "reference": "S-2020-0001",
            "created": "2020-10-18T12:34:56",
            "items": [
                {"product_id": 13591, "quantity": 2, "price": "75", "total_price": "150"},
                {"product_id": 13592, "quantity": 1, "price": "50", "total_price": "50"}
            ]
        })
        .to_string();

        let confirmation = interpret_sale(StatusCode::OK, &body).unwrap();
        assert_eq!(confirmation.remote_id, 991);
        assert_eq!(confirmation.reference, "S-2020-0001");
        assert_eq!(confirmation.total_price(), Some(200));
        assert_eq!(
            confirmation.created_at,
            NaiveDate::from_ymd_opt(2020, 10, 18)
                .unwrap()
                .and_hms_opt(12, 34, 56)
                .unwrap()
        );
    }

    #[test]
    fn test_sale_confirmation_total_overflow_is_none() {
        let body = json!({
            "id": 1,
            "reference": "R",
            "created": "2020-10-18T12:00:00",
            "items": [
                {"price": "1", "total_price": "9223372036854775807"},
                {"price": "1", "total_price": "1"}
            ]
        })
        .to_string();

        let confirmation = interpret_sale(StatusCode::OK, &body).unwrap();
        assert_eq!(confirmation.lines.len(), 2);
        assert_eq!(confirmation.total_price(), None);
    }

    #[test]
    fn test_sale_created_with_offset_is_converted_to_utc() {
        let body = json!({
            "id": 1,
            "reference": "R",
            "created": "2020-10-18T14:00:00+02:00",
            "items": []
        })
        .to_string();
        let confirmation = interpret_sale(StatusCode::CREATED, &body).unwrap();
        assert_eq!(confirmation.created_at.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_item_record_to_new_item_drops_empty_media() {
        let mut raw = product_json();
        raw["media"] = json!([]);
        let record = interpret_product(StatusCode::OK, &raw.to_string(), 13591).unwrap();
        let new_item = NewItem::from(record);
        assert!(new_item.media_url.is_none());
    }
}
