//! Request and response contracts shared by the engine and the HTTP server.
//!
//! Every entity has exactly one set of types here: a `*New` payload for
//! creation, an `*Update` payload for partial updates and a `*View` returned
//! to clients. Money is always expressed in minor units of the trip currency
//! (`*_minor` fields).

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Declares a closed string enumeration with its wire representation.
///
/// The generated enum serializes to the given literals and exposes
/// `as_str()`, `ALL`, `Display`, `FromStr` and `TryFrom<&str>`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the canonical string stored in the database.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $crate::ParseEnumError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err($crate::ParseEnumError::new($kind, other)),
                }
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_from(s)
            }
        }
    };
}

pub mod activity;
pub mod auth;
pub mod budget;
pub mod catalog;
pub mod collaborator;
pub mod community;
pub mod share;
pub mod stats;
pub mod stop;
pub mod template;
pub mod trip;
pub mod user;

/// A stored or submitted value is not part of a closed enumeration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Currency of a trip and of every money value attached to it.
///
/// Amounts are stored as an `i64` number of minor units; `minor_units()`
/// returns how many decimal digits separate major from minor units
/// (`10.50 USD` ⇄ `1050`, `1200 JPY` ⇄ `1200`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
    Jpy,
    Aud,
    Cad,
}

impl Currency {
    pub const ALL: &'static [Currency] = &[
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Inr,
        Currency::Jpy,
        Currency::Aud,
        Currency::Cad,
    ];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| ParseEnumError::new("currency", value))
    }
}

/// Generic acknowledgement body (`{"message": .., "success": ..}`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

/// Deserializes a field that distinguishes "absent" from "explicit null".
///
/// Use with `#[serde(default, deserialize_with = "crate::double_option")]`:
/// a missing field stays `None`, `null` becomes `Some(None)` and a value
/// becomes `Some(Some(value))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
