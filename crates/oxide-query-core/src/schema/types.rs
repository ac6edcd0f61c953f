//! SQL data types and their Rust counterparts.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A SQL column type. Dialects turn it into their own spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// 2-byte integer.
    SmallInt,
    /// 4-byte integer.
    Integer,
    /// 8-byte integer.
    BigInt,
    /// 4-byte float.
    Real,
    /// 8-byte float.
    Double,
    /// Exact numeric.
    Decimal {
        /// Total digits.
        precision: u16,
        /// Digits after the decimal point.
        scale: u16,
    },
    /// Fixed-length character string.
    Char(u32),
    /// Variable-length character string.
    Varchar(u32),
    /// Unbounded text.
    Text,
    /// Binary large object.
    Blob,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp without zone.
    Timestamp,
    /// Timestamp with time zone.
    TimestampWithTimeZone,
    /// Boolean.
    Boolean,
    /// Type spelled verbatim.
    Custom(Cow<'static, str>),
}

/// Rust types that can back a column.
pub trait SqlType {
    /// The type with any `Option` removed; values compared against a column
    /// are of this type.
    type NonNull;

    /// Default SQL type for DDL.
    const DATA_TYPE: DataType;

    /// Whether the column accepts NULL.
    const NULLABLE: bool = false;
}

macro_rules! impl_sql_type {
    ($($ty:ty => $data_type:expr),+ $(,)?) => {
        $(
            impl SqlType for $ty {
                type NonNull = $ty;
                const DATA_TYPE: DataType = $data_type;
            }
        )+
    };
}

impl_sql_type! {
    bool => DataType::Boolean,
    i8 => DataType::SmallInt,
    i16 => DataType::SmallInt,
    i32 => DataType::Integer,
    i64 => DataType::BigInt,
    u8 => DataType::SmallInt,
    u16 => DataType::Integer,
    u32 => DataType::BigInt,
    f32 => DataType::Real,
    f64 => DataType::Double,
    String => DataType::Varchar(255),
    Vec<u8> => DataType::Blob,
    NaiveDate => DataType::Date,
    DateTime<Utc> => DataType::TimestampWithTimeZone,
}

impl<T: SqlType> SqlType for Option<T> {
    type NonNull = T::NonNull;
    const DATA_TYPE: DataType = T::DATA_TYPE;
    const NULLABLE: bool = true;
}
