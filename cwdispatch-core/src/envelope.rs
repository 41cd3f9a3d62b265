//! Event envelope: the fixed outer structure of every inbound event.
//!
//! ```text
//! {
//!     "version": "0",
//!     "id": "85085726-4d64-918b-c9bb-62b172316c7c",
//!     "detail-type": "EC2 Instance State-change Notification",
//!     "source": "aws.ec2",
//!     "account": "261421242815",
//!     "time": "2019-06-16T22:20:01Z",
//!     "region": "us-west-2",
//!     "resources": ["arn:aws:ec2:us-west-2:261421242815:instance/i-1"],
//!     "detail": { ... }
//! }
//! ```
//!
//! Notes:
//! - `source` and `detail-type` are required non-empty strings.
//! - `detail` is required but may be `null`.
//! - The remaining metadata is optional and defaults to empty.

use crate::{
    error::{DispatchError, EnvelopeError},
    payload::{self, RawObject, RawValue, Shape},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Everything in an envelope except the detail.
///
/// The dispatcher attaches a copy to the [`Context`](crate::Context) of every
/// handler it invokes, see [`Context::header`](crate::Context::header).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventHeader {
    version: String,
    id: String,
    #[serde(rename = "detail-type")]
    detail_type: String,
    source: String,
    account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<DateTime<Utc>>,
    region: String,
    resources: Vec<String>,
}

impl EventHeader {
    /// The envelope format version (currently always `"0"`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Unique event id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Service that raised the event, e.g. `aws.ec2`.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifies the structure of the event detail.
    pub fn detail_type(&self) -> &str {
        &self.detail_type
    }

    /// Account the event was raised for.
    pub fn account(&self) -> &str {
        &self.account
    }

    /// When the event occurred. Usually second resolution.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    /// Region the event was raised in.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resources (typically ARNs) affected by the event.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }
}

/// The outer structure of an inbound event.
///
/// Constructed once per inbound message and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEnvelope {
    #[serde(flatten)]
    header: EventHeader,
    detail: RawValue,
}

impl EventEnvelope {
    /// Create an envelope with the required fields, format version `"0"`,
    /// and empty metadata.
    pub fn new(source: impl Into<String>, detail_type: impl Into<String>, detail: RawValue) -> Self {
        Self {
            header: EventHeader {
                version: "0".to_string(),
                detail_type: detail_type.into(),
                source: source.into(),
                ..EventHeader::default()
            },
            detail,
        }
    }

    /// Build an envelope from a parsed message.
    pub fn from_raw(raw: RawValue) -> Result<Self, EnvelopeError> {
        let found = Shape::of(&raw);
        let RawValue::Object(mut fields) = raw else {
            return Err(EnvelopeError::NotAnObject { found });
        };

        let source = required_string(&fields, "source")?;
        let detail_type = required_string(&fields, "detail-type")?;
        let detail = fields
            .remove("detail")
            .ok_or(EnvelopeError::MissingField("detail"))?;

        let header = EventHeader {
            version: optional_string(&fields, "version")?,
            id: optional_string(&fields, "id")?,
            detail_type,
            source,
            account: optional_string(&fields, "account")?,
            time: optional_time(&fields)?,
            region: optional_string(&fields, "region")?,
            resources: string_list(&fields, "resources")?,
        };
        Ok(Self { header, detail })
    }

    /// Parse raw message bytes straight into an envelope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DispatchError> {
        let raw = payload::parse(bytes)?;
        Ok(Self::from_raw(raw)?)
    }

    /// Set the event id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.header.id = id.into();
        self
    }

    /// Set the account and region the event was raised in.
    pub fn with_origin(mut self, account: impl Into<String>, region: impl Into<String>) -> Self {
        self.header.account = account.into();
        self.header.region = region.into();
        self
    }

    /// Set the event timestamp.
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.header.time = Some(time);
        self
    }

    /// Set the affected resources.
    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Metadata of the event.
    pub fn header(&self) -> &EventHeader {
        &self.header
    }

    /// The envelope format version.
    pub fn version(&self) -> &str {
        self.header.version()
    }

    /// Unique event id.
    pub fn id(&self) -> &str {
        self.header.id()
    }

    /// Service that raised the event.
    pub fn source(&self) -> &str {
        self.header.source()
    }

    /// Identifies the structure of [`detail`](Self::detail).
    pub fn detail_type(&self) -> &str {
        self.header.detail_type()
    }

    /// Account the event was raised for.
    pub fn account(&self) -> &str {
        self.header.account()
    }

    /// When the event occurred.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.header.time()
    }

    /// Region the event was raised in.
    pub fn region(&self) -> &str {
        self.header.region()
    }

    /// Resources affected by the event.
    pub fn resources(&self) -> &[String] {
        self.header.resources()
    }

    /// The event-specific payload.
    pub fn detail(&self) -> &RawValue {
        &self.detail
    }

    /// Take ownership of the event-specific payload.
    pub fn into_detail(self) -> RawValue {
        self.detail
    }

    /// Split into metadata and detail.
    pub fn into_parts(self) -> (EventHeader, RawValue) {
        (self.header, self.detail)
    }
}

impl TryFrom<RawValue> for EventEnvelope {
    type Error = EnvelopeError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl<'de> Deserialize<'de> for EventEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawValue::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

fn required_string(fields: &RawObject, field: &'static str) -> Result<String, EnvelopeError> {
    match fields.get(field) {
        None => Err(EnvelopeError::MissingField(field)),
        Some(RawValue::String(s)) if s.is_empty() => Err(EnvelopeError::EmptyField(field)),
        Some(RawValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(field, Shape::String, other)),
    }
}

fn optional_string(fields: &RawObject, field: &'static str) -> Result<String, EnvelopeError> {
    match fields.get(field) {
        None | Some(RawValue::Null) => Ok(String::new()),
        Some(RawValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(field, Shape::String, other)),
    }
}

fn optional_time(fields: &RawObject) -> Result<Option<DateTime<Utc>>, EnvelopeError> {
    match fields.get("time") {
        None | Some(RawValue::Null) => Ok(None),
        Some(RawValue::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|error| EnvelopeError::InvalidTimestamp {
                value: s.clone(),
                error,
            }),
        Some(other) => Err(wrong_type("time", Shape::String, other)),
    }
}

fn string_list(fields: &RawObject, field: &'static str) -> Result<Vec<String>, EnvelopeError> {
    match fields.get(field) {
        None | Some(RawValue::Null) => Ok(Vec::new()),
        Some(RawValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                RawValue::String(s) => Ok(s.clone()),
                other => Err(wrong_type(field, Shape::String, other)),
            })
            .collect(),
        Some(other) => Err(wrong_type(field, Shape::Array, other)),
    }
}

fn wrong_type(field: &'static str, expected: Shape, found: &RawValue) -> EnvelopeError {
    EnvelopeError::WrongType {
        field,
        expected,
        found: Shape::of(found),
    }
}
