//! Offering submissions and the 80/20 remittance split.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Submission, SubmissionHeader};

/// An offering record. `amount_100` is the only authoritative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingSubmission {
    #[serde(flatten)]
    pub header: SubmissionHeader,
    pub amount_100: Decimal,
}

/// The 100% amount with its 80% and 20% shares derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingSplit {
    pub amount_100: Decimal,
    pub amount_80: Decimal,
    pub amount_20: Decimal,
}

impl OfferingSplit {
    /// Derives both shares from the authoritative amount.
    pub fn from_amount(amount_100: Decimal) -> Self {
        Self {
            amount_100,
            amount_80: amount_100 * Decimal::new(8, 1),
            amount_20: amount_100 * Decimal::new(2, 1),
        }
    }

    /// Same split rounded to two decimal places for display.
    pub fn rounded(&self) -> Self {
        Self {
            amount_100: self.amount_100.round_dp(2),
            amount_80: self.amount_80.round_dp(2),
            amount_20: self.amount_20.round_dp(2),
        }
    }
}

impl OfferingSubmission {
    pub fn new(header: SubmissionHeader, amount_100: Decimal) -> Self {
        Self { header, amount_100 }
    }

    pub fn split(&self) -> OfferingSplit {
        OfferingSplit::from_amount(self.amount_100)
    }
}

impl Submission for OfferingSubmission {
    fn header(&self) -> &SubmissionHeader {
        &self.header
    }
}

/// Sum of `amount_100` across records. Derived shares are never summed.
pub fn total_offering<'a>(records: impl IntoIterator<Item = &'a OfferingSubmission>) -> Decimal {
    records.into_iter().map(|r| r.amount_100).sum()
}
