//! Supplier mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`MobileNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MobileNumberError {
    /// The input string is empty.
    #[error("mobile number cannot be empty")]
    Empty,
    /// The input contains something other than digits, spaces, dashes or a leading +.
    #[error("mobile number may only contain digits, spaces, dashes and a leading +")]
    InvalidCharacter,
    /// Too few or too many digits.
    #[error("mobile number must have between {min} and {max} digits")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A supplier's mobile number, normalized to digits with an optional `+`.
///
/// Suppliers are unique by mobile number, so formatting differences such as
/// `+91 98450-12345` and `+919845012345` must compare equal.
///
/// ```
/// use stockroom_core::MobileNumber;
///
/// let a = MobileNumber::parse("+91 98450-12345").unwrap();
/// let b = MobileNumber::parse("+919845012345").unwrap();
/// assert_eq!(a, b);
/// assert!(MobileNumber::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse and normalize a mobile number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters or
    /// punctuation other than spaces and dashes, or has a digit count outside
    /// 7..=15.
    pub fn parse(s: &str) -> Result<Self, MobileNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MobileNumberError::Empty);
        }

        let (plus, rest) = trimmed
            .strip_prefix('+')
            .map_or((false, trimmed), |rest| (true, rest));

        let mut digits = String::with_capacity(rest.len() + 1);
        if plus {
            digits.push('+');
        }
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(MobileNumberError::InvalidCharacter),
            }
        }

        let count = digits.len() - usize::from(plus);
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&count) {
            return Err(MobileNumberError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(digits))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MobileNumber {
    type Error = MobileNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MobileNumber> for String {
    fn from(value: MobileNumber) -> Self {
        value.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for MobileNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for MobileNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Stored values were normalized on the way in
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for MobileNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_separators() {
        let number = MobileNumber::parse(" 98450-123 45 ").unwrap();
        assert_eq!(number.as_str(), "9845012345");
    }

    #[test]
    fn test_keeps_leading_plus() {
        let number = MobileNumber::parse("+44 7700 900123").unwrap();
        assert_eq!(number.as_str(), "+447700900123");
    }

    #[test]
    fn test_empty() {
        assert_eq!(MobileNumber::parse("   "), Err(MobileNumberError::Empty));
    }

    #[test]
    fn test_rejects_letters_and_inner_plus() {
        assert_eq!(
            MobileNumber::parse("98450abc"),
            Err(MobileNumberError::InvalidCharacter)
        );
        assert_eq!(
            MobileNumber::parse("98+4501234"),
            Err(MobileNumberError::InvalidCharacter)
        );
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            MobileNumber::parse("12345"),
            Err(MobileNumberError::BadLength { .. })
        ));
        assert!(matches!(
            MobileNumber::parse("1234567890123456"),
            Err(MobileNumberError::BadLength { .. })
        ));
        assert!(MobileNumber::parse("1234567").is_ok());
    }
}
