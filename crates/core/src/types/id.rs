//! Newtype IDs for type-safe entity references.
//!
//! Every table in the purchase-order pipeline uses a `SERIAL` key. The
//! `define_id!` macro wraps those keys so a supplier reference can never be
//! passed where a branch or category is expected.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use stockroom_core::define_id;
/// define_id!(SupplierId);
/// define_id!(BranchId);
///
/// let supplier_id = SupplierId::new(7);
/// let branch_id = BranchId::new(2);
///
/// // These are different types, so this won't compile:
/// // let _: SupplierId = branch_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Reference data
define_id!(BranchId);
define_id!(SupplierId);
define_id!(CategoryId);
define_id!(ProductId);
define_id!(AdminUserId);

// Purchase-order pipeline
define_id!(PurchaseOrderId);
define_id!(LineItemId);
define_id!(ReceiptId);
define_id!(ReceiptLineId);
define_id!(ProductInstanceId);
define_id!(TransactionHistoryId);

impl PurchaseOrderId {
    /// Whether this looks like a database-assigned identifier.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.0 > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip_through_i32() {
        let id = LineItemId::from(42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_unassigned_purchase_order_id() {
        assert!(!PurchaseOrderId::new(0).is_assigned());
        assert!(PurchaseOrderId::new(1).is_assigned());
    }
}
