// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

macro_rules! label_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Error> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($label) {
                        return Ok($name::$variant);
                    }
                )+
                Err(Error::validation(format!(
                    "Unknown {} '{}'",
                    stringify!($name).to_lowercase(),
                    s
                )))
            }
        }
    };
}

label_enum!(Nature {
    Income => "income",
    Expense => "expense",
});

label_enum!(Division {
    Personal => "personal",
    Family => "family",
    Investment => "investment",
});

label_enum!(SpendType {
    Essential => "essential",
    Important => "important",
    Comfort => "comfort",
    Investment => "investment",
});

label_enum!(SystemKind {
    OpeningBalance => "opening_balance",
    InvoiceProjection => "invoice_projection",
});

impl Nature {
    /// Signed contribution of `amount` to a running balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Nature::Income => amount,
            Nature::Expense => -amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub division: Division,
    pub r#type: SpendType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub nature: Nature,
    pub date: DateTime<Utc>,
    pub division: Option<Division>,
    pub r#type: Option<SpendType>,
    pub category_id: Option<i64>,
    pub is_paid: bool,
    pub is_system_generated: bool,
    pub system_kind: Option<SystemKind>,
    pub source_card_id: Option<i64>,
    pub notes: Option<String>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.nature.signed(self.amount)
    }

    pub fn is_opening_balance(&self) -> bool {
        self.system_kind == Some(SystemKind::OpeningBalance)
    }
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub nature: Nature,
    pub date: DateTime<Utc>,
    pub division: Option<Division>,
    pub r#type: Option<SpendType>,
    pub category_id: Option<i64>,
    pub is_paid: bool,
    pub is_system_generated: bool,
    pub system_kind: Option<SystemKind>,
    pub source_card_id: Option<i64>,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// A plain, paid, user-entered transaction.
    pub fn user(
        user_id: i64,
        description: impl Into<String>,
        amount: Decimal,
        nature: Nature,
        date: DateTime<Utc>,
    ) -> Self {
        NewTransaction {
            user_id,
            description: description.into(),
            amount,
            nature,
            date,
            division: None,
            r#type: None,
            category_id: None,
            is_paid: true,
            is_system_generated: false,
            system_kind: None,
            source_card_id: None,
            notes: None,
        }
    }
}

/// Partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub nature: Option<Nature>,
    pub date: Option<DateTime<Utc>>,
    pub division: Option<Division>,
    pub r#type: Option<SpendType>,
    pub category_id: Option<i64>,
    pub is_paid: Option<bool>,
    pub notes: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.nature.is_none()
            && self.date.is_none()
            && self.division.is_none()
            && self.r#type.is_none()
            && self.category_id.is_none()
            && self.is_paid.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub brand: String,
    pub limit: Decimal,
    pub closing_day: u32,
    pub due_day: u32,
    pub recurring_amount: Decimal,
    pub expected_amount: Decimal,
    pub current_total_amount: Decimal,
    pub division: Division,
    pub r#type: SpendType,
    pub is_shared: bool,
    pub my_percentage: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewCreditCard {
    pub user_id: i64,
    pub name: String,
    pub brand: String,
    pub limit: Decimal,
    pub closing_day: u32,
    pub due_day: u32,
    pub recurring_amount: Decimal,
    pub expected_amount: Decimal,
    pub division: Division,
    pub r#type: SpendType,
    pub is_shared: bool,
    pub my_percentage: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CreditCardPatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub limit: Option<Decimal>,
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub recurring_amount: Option<Decimal>,
    pub expected_amount: Option<Decimal>,
    pub current_total_amount: Option<Decimal>,
    pub division: Option<Division>,
    pub r#type: Option<SpendType>,
    pub is_shared: Option<bool>,
    pub my_percentage: Option<Decimal>,
}
