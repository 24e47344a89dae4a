use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gudang_core::{AttachmentRef, ItemCode, RequestId, SessionContext, StockError, StockResult};

/// Stock movement direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Goods received into the warehouse.
    In,
    /// Goods issued out of the warehouse.
    Out,
    /// Goods given back after an event.
    Return,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::In => "IN",
            MovementKind::Out => "OUT",
            MovementKind::Return => "RETURN",
        }
    }

    /// Sign applied to the quantity when the movement is approved.
    pub fn sign(self) -> i64 {
        match self {
            MovementKind::In | MovementKind::Return => 1,
            MovementKind::Out => -1,
        }
    }
}

/// Business classification of an OUT movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Support,
    Sale,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Support => "Support",
            TransactionType::Sale => "Sale",
        }
    }
}

impl core::str::FromStr for TransactionType {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "support" => Ok(TransactionType::Support),
            "sale" => Ok(TransactionType::Sale),
            other => Err(StockError::validation(format!(
                "transaction type must be Support or Sale, got: {other}"
            ))),
        }
    }
}

/// Kind-specific request payload.
///
/// Each variant carries only the fields its kind requires; the constructors
/// on [`PendingRequest`] validate them, so a value of this type is always
/// well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum RequestDetails {
    In {
        /// Delivery order / surat jalan number.
        delivery_reference: String,
        attachment: AttachmentRef,
    },
    Out {
        transaction_type: TransactionType,
        event: String,
    },
    Return {
        event: String,
    },
}

impl RequestDetails {
    pub fn kind(&self) -> MovementKind {
        match self {
            RequestDetails::In { .. } => MovementKind::In,
            RequestDetails::Out { .. } => MovementKind::Out,
            RequestDetails::Return { .. } => MovementKind::Return,
        }
    }

    pub fn event(&self) -> Option<&str> {
        match self {
            RequestDetails::In { .. } => None,
            RequestDetails::Out { event, .. } | RequestDetails::Return { event } => {
                Some(event.as_str())
            }
        }
    }
}

/// A not-yet-decided movement request.
///
/// Created by a requester action; consumed (deleted) exactly once by approval
/// or rejection; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: RequestId,
    pub item_code: ItemCode,
    pub item_name: String,
    pub quantity: i64,
    pub unit: String,
    pub requested_date: NaiveDate,
    pub requester: String,
    pub created_at: DateTime<Utc>,
    pub details: RequestDetails,
}

impl PendingRequest {
    /// IN receipt: requires a delivery reference and an uploaded document.
    pub fn stock_in(
        item_code: ItemCode,
        item_name: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
        delivery_reference: impl Into<String>,
        attachment: AttachmentRef,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> StockResult<Self> {
        let delivery_reference = delivery_reference.into();
        if delivery_reference.trim().is_empty() {
            return Err(StockError::validation(
                "IN request requires a delivery reference",
            ));
        }
        if attachment.as_str().is_empty() {
            return Err(StockError::validation(
                "IN request requires an uploaded delivery document",
            ));
        }

        Self::build(
            item_code,
            item_name,
            quantity,
            unit,
            session,
            now,
            RequestDetails::In {
                delivery_reference: delivery_reference.trim().to_string(),
                attachment,
            },
        )
    }

    /// OUT issue: requires a transaction type and a non-empty event label.
    pub fn stock_out(
        item_code: ItemCode,
        item_name: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
        transaction_type: TransactionType,
        event: impl Into<String>,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> StockResult<Self> {
        let event = event.into();
        if event.trim().is_empty() {
            return Err(StockError::validation("OUT request requires an event label"));
        }

        Self::build(
            item_code,
            item_name,
            quantity,
            unit,
            session,
            now,
            RequestDetails::Out {
                transaction_type,
                event: event.trim().to_string(),
            },
        )
    }

    /// RETURN give-back after an event. The label is optional on the intake
    /// screen, so a blank one becomes the usual placeholder.
    pub fn stock_return(
        item_code: ItemCode,
        item_name: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
        event: impl Into<String>,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> StockResult<Self> {
        let event = event.into();
        let event = if event.trim().is_empty() {
            "-".to_string()
        } else {
            event.trim().to_string()
        };

        Self::build(
            item_code,
            item_name,
            quantity,
            unit,
            session,
            now,
            RequestDetails::Return { event },
        )
    }

    fn build(
        item_code: ItemCode,
        item_name: impl Into<String>,
        quantity: i64,
        unit: impl Into<String>,
        session: &SessionContext,
        now: DateTime<Utc>,
        details: RequestDetails,
    ) -> StockResult<Self> {
        if quantity <= 0 {
            return Err(StockError::validation("quantity must be positive"));
        }

        Ok(Self {
            id: RequestId::new(),
            item_code,
            item_name: item_name.into(),
            quantity,
            unit: unit.into(),
            requested_date: now.date_naive(),
            requester: session.username().to_string(),
            created_at: now,
            details,
        })
    }

    pub fn kind(&self) -> MovementKind {
        self.details.kind()
    }

    /// Quantity with the approval sign applied (IN/RETURN positive, OUT negative).
    pub fn signed_quantity(&self) -> i64 {
        self.kind().sign() * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gudang_core::Role;

    fn session() -> SessionContext {
        SessionContext::new("budi", Role::User)
    }

    fn code() -> ItemCode {
        "ITM-0001".parse().unwrap()
    }

    #[test]
    fn out_request_requires_event_label() {
        let err = PendingRequest::stock_out(
            code(),
            "Sirup Original",
            4,
            "box",
            TransactionType::Support,
            "   ",
            &session(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn in_request_requires_delivery_reference() {
        let err = PendingRequest::stock_in(
            code(),
            "Sirup Original",
            4,
            "box",
            "",
            AttachmentRef::new("uploads/x.pdf"),
            &session(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn zero_quantity_is_rejected_for_every_kind() {
        let s = session();
        let now = Utc::now();
        assert!(
            PendingRequest::stock_return(code(), "Sirup", 0, "box", "Expo", &s, now).is_err()
        );
        assert!(PendingRequest::stock_out(
            code(),
            "Sirup",
            -3,
            "box",
            TransactionType::Sale,
            "Expo",
            &s,
            now
        )
        .is_err());
    }

    #[test]
    fn signed_quantity_follows_kind() {
        let s = session();
        let now = Utc::now();
        let out = PendingRequest::stock_out(
            code(),
            "Sirup",
            4,
            "box",
            TransactionType::Support,
            "Expo",
            &s,
            now,
        )
        .unwrap();
        let ret =
            PendingRequest::stock_return(code(), "Sirup", 2, "box", "Sisa Expo", &s, now).unwrap();
        assert_eq!(out.signed_quantity(), -4);
        assert_eq!(ret.signed_quantity(), 2);
    }

    #[test]
    fn blank_return_label_becomes_placeholder() {
        let req = PendingRequest::stock_return(code(), "Sirup", 2, "box", " ", &session(), Utc::now())
            .unwrap();
        assert_eq!(req.details.event(), Some("-"));
    }
}
