//! Success/failure response envelopes.
//!
//! Every response body produced by this crate is one of:
//!
//! ```json
//! { "success": false, "error": { "code": "NOT_FOUND", ... } }
//! { "success": true,  "data": ... }
//! ```
//!
//! [`ResponseEnvelope`] models the pair as an enum so the discriminant and
//! the populated field can never disagree.

use serde::de::{self, Deserializer, IntoDeserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::types::ErrorRecord;

/// Discriminated response body: either a failure or a success payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope<T> {
    Failure(ErrorRecord),
    Success(T),
}

impl<T> ResponseEnvelope<T> {
    #[inline]
    pub fn failure(error: ErrorRecord) -> Self {
        Self::Failure(error)
    }

    #[inline]
    pub fn success(data: T) -> Self {
        Self::Success(data)
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[inline]
    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success(_) => None,
        }
    }

    #[inline]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Failure(_) => None,
            Self::Success(data) => Some(data),
        }
    }

    /// Converts into a `Result`, with the failure on the error side.
    #[inline]
    pub fn into_result(self) -> Result<T, ErrorRecord> {
        match self {
            Self::Failure(error) => Err(error),
            Self::Success(data) => Ok(data),
        }
    }
}

impl<T> From<Result<T, ErrorRecord>> for ResponseEnvelope<T> {
    #[inline]
    fn from(result: Result<T, ErrorRecord>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for ResponseEnvelope<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ResponseEnvelope", 2)?;
        match self {
            Self::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            },
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            },
        }
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename = "ResponseEnvelope")]
struct RawEnvelope<T> {
    success: bool,
    error: Option<ErrorRecord>,
    data: Option<T>,
}

impl<'de, T> Deserialize<'de> for ResponseEnvelope<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEnvelope::<T>::deserialize(deserializer)?;
        match (raw.success, raw.error, raw.data) {
            (false, Some(error), None) => Ok(Self::Failure(error)),
            (false, None, _) => Err(de::Error::missing_field("error")),
            (false, Some(_), Some(_)) => {
                Err(de::Error::custom("failure envelope must not carry `data`"))
            },
            (true, None, Some(data)) => Ok(Self::Success(data)),
            // `data` may be omitted for empty payloads; decode it from unit.
            (true, None, None) => {
                let unit: de::value::UnitDeserializer<D::Error> = ().into_deserializer();
                T::deserialize(unit).map(Self::Success)
            },
            (true, Some(_), _) => Err(de::Error::custom("success envelope must not carry `error`")),
        }
    }
}
