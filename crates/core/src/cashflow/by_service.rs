//! Cash payments by hospital service.
//!
//! Every cash payment item becomes one row; the row carries its amount in the
//! column of the service it settled and nothing elsewhere. A cumulative column
//! keeps the running cash total. Invoiced amounts per service are kept beside
//! the cash totals so cash and accrual can be compared.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cash payment item, as read from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePayment {
    /// Cash receipt reference.
    pub reference: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Paying patient.
    pub patient: String,
    /// Service of the settled invoice.
    pub service: String,
    /// Amount allocated to the invoice.
    pub amount: Decimal,
}

/// Amount invoiced for one service over the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInvoiced {
    /// Service name.
    pub service: String,
    /// Invoiced amount.
    pub amount: Decimal,
}

/// One matrix row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMatrixRow {
    /// Cash receipt reference.
    pub reference: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Paying patient.
    pub patient: String,
    /// One slot per service column; only the row's own service is set.
    pub values: Vec<Option<Decimal>>,
    /// Running cash total up to and including this row.
    pub cumulative: Decimal,
}

/// Cash payments against services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMatrix {
    /// Service columns, alphabetical.
    pub services: Vec<String>,
    /// Payment rows ordered by date then reference.
    pub rows: Vec<ServiceMatrixRow>,
    /// Cash received per service column.
    pub cash_totals: Vec<Decimal>,
    /// Amount invoiced per service column.
    pub invoiced_totals: Vec<Decimal>,
    /// Total cash received.
    pub grand_total: Decimal,
    /// Total invoiced.
    pub invoiced_grand_total: Decimal,
}

impl ServiceMatrix {
    /// Builds the matrix. Columns cover every service that was paid or invoiced.
    #[must_use]
    pub fn build(mut payments: Vec<ServicePayment>, invoiced: &[ServiceInvoiced]) -> Self {
        let services: Vec<String> = payments
            .iter()
            .map(|p| p.service.as_str())
            .chain(invoiced.iter().map(|i| i.service.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        payments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.reference.cmp(&b.reference)));

        let mut cash_totals = vec![Decimal::ZERO; services.len()];
        let mut cumulative = Decimal::ZERO;
        let mut rows = Vec::with_capacity(payments.len());

        for payment in payments {
            let column = services.binary_search(&payment.service).ok();
            let mut values = vec![None; services.len()];
            if let Some(index) = column {
                values[index] = Some(payment.amount);
                cash_totals[index] += payment.amount;
            }
            cumulative += payment.amount;

            rows.push(ServiceMatrixRow {
                reference: payment.reference,
                date: payment.date,
                patient: payment.patient,
                values,
                cumulative,
            });
        }

        let mut invoiced_totals = vec![Decimal::ZERO; services.len()];
        for line in invoiced {
            if let Ok(index) = services.binary_search(&line.service) {
                invoiced_totals[index] += line.amount;
            }
        }

        Self {
            invoiced_grand_total: invoiced_totals.iter().copied().sum(),
            services,
            rows,
            cash_totals,
            invoiced_totals,
            grand_total: cumulative,
        }
    }

    /// Cash received minus amount invoiced, per service column.
    #[must_use]
    pub fn collection_gaps(&self) -> Vec<Decimal> {
        self.cash_totals
            .iter()
            .zip(&self.invoiced_totals)
            .map(|(cash, invoiced)| cash - invoiced)
            .collect()
    }
}
