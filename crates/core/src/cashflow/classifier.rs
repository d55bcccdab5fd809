//! Income/expense classification of a period's postings.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use super::types::{FlowEntry, Posting};

/// Labelled flows of one period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedFlows {
    /// Debit-side entries, one per transaction type label.
    pub incomes: Vec<FlowEntry>,
    /// Credit-side entries, one per transaction type label.
    pub expenses: Vec<FlowEntry>,
    /// Sum of `debit_equiv` over income postings.
    pub total_income: Decimal,
    /// Sum of `credit_equiv` over expense postings.
    pub total_expense: Decimal,
}

/// Splits postings into incomes (`debit_equiv > 0`) and expenses
/// (`credit_equiv > 0`). Both filters run independently, so a posting with a
/// positive debit and a positive credit shows up on both sides.
#[must_use]
pub fn classify(postings: &[&Posting]) -> ClassifiedFlows {
    let incomes: Vec<&Posting> = postings
        .iter()
        .copied()
        .filter(|p| p.debit_equiv > Decimal::ZERO)
        .collect();
    let expenses: Vec<&Posting> = postings
        .iter()
        .copied()
        .filter(|p| p.credit_equiv > Decimal::ZERO)
        .collect();

    ClassifiedFlows {
        total_income: incomes.iter().map(|p| p.debit_equiv).sum(),
        total_expense: expenses.iter().map(|p| p.credit_equiv).sum(),
        incomes: label_flows(&incomes, |p| p.debit_equiv),
        expenses: label_flows(&expenses, |p| p.credit_equiv),
    }
}

/// One entry per distinct label, first occurrence wins. The value is the total
/// of every row sharing the origin of the winning row.
fn label_flows(rows: &[&Posting], amount: fn(&Posting) -> Decimal) -> Vec<FlowEntry> {
    let mut by_origin = HashMap::new();
    for row in rows {
        *by_origin.entry(row.origin_id).or_insert(Decimal::ZERO) += amount(row);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries = Vec::new();
    for row in rows.iter().copied() {
        if !seen.insert(row.transaction_type.as_str()) {
            continue;
        }
        entries.push(FlowEntry {
            transfer_type: row.transaction_type.clone(),
            value: by_origin.get(&row.origin_id).copied().unwrap_or_default(),
            currency_id: row.currency_id,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhima_shared::types::{CurrencyId, TransactionTypeId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn posting(origin: i32, label: &str, debit: Decimal, credit: Decimal) -> Posting {
        Posting {
            transaction_id: format!("T{origin}"),
            record_uuid: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            period_id: None,
            account_number: "57110010".to_string(),
            debit_equiv: debit,
            credit_equiv: credit,
            currency_id: CurrencyId::new(origin),
            description: String::new(),
            origin_id: Some(TransactionTypeId::new(origin)),
            transaction_type: label.to_string(),
        }
    }

    #[test]
    fn test_splits_by_side_and_sums_per_origin() {
        let rows = [
            posting(1, "CASH_PAYMENT", dec!(100), dec!(0)),
            posting(2, "SUPPORT_INCOME", dec!(40), dec!(0)),
            posting(1, "CASH_PAYMENT", dec!(25), dec!(0)),
            posting(9, "PURCHASES", dec!(0), dec!(70)),
        ];
        let refs: Vec<&Posting> = rows.iter().collect();

        let flows = classify(&refs);

        assert_eq!(flows.incomes.len(), 2);
        assert_eq!(flows.incomes[0].transfer_type, "CASH_PAYMENT");
        assert_eq!(flows.incomes[0].value, dec!(125));
        assert_eq!(flows.incomes[1].transfer_type, "SUPPORT_INCOME");
        assert_eq!(flows.incomes[1].value, dec!(40));
        assert_eq!(flows.expenses.len(), 1);
        assert_eq!(flows.expenses[0].value, dec!(70));
        assert_eq!(flows.total_income, dec!(165));
        assert_eq!(flows.total_expense, dec!(70));
    }

    #[test]
    fn test_posting_with_both_sides_counts_twice() {
        let rows = [posting(3, "VOUCHER", dec!(10), dec!(4))];
        let refs: Vec<&Posting> = rows.iter().collect();

        let flows = classify(&refs);

        assert_eq!(flows.incomes[0].value, dec!(10));
        assert_eq!(flows.expenses[0].value, dec!(4));
    }

    #[test]
    fn test_first_occurrence_sets_currency_and_origin() {
        // Two origins sharing a label: the first row decides the entry.
        let rows = [
            posting(5, "GENERIC_INCOME", dec!(30), dec!(0)),
            posting(6, "GENERIC_INCOME", dec!(50), dec!(0)),
        ];
        let refs: Vec<&Posting> = rows.iter().collect();

        let flows = classify(&refs);

        assert_eq!(flows.incomes.len(), 1);
        assert_eq!(flows.incomes[0].value, dec!(30));
        assert_eq!(flows.incomes[0].currency_id, CurrencyId::new(5));
        assert_eq!(flows.total_income, dec!(80));
    }

    #[test]
    fn test_zero_rows_are_ignored() {
        let rows = [posting(1, "CASH_PAYMENT", dec!(0), dec!(0))];
        let refs: Vec<&Posting> = rows.iter().collect();

        assert_eq!(classify(&refs), ClassifiedFlows::default());
    }
}
