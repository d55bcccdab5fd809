//! Database seeder for cashflow development and testing.
//!
//! Seeds one fiscal year with its periods, a cash box, transaction types,
//! a year of cash box postings, and patient invoices settled in cash.
//!
//! Usage: cargo run --bin seeder

use bhima_db::entities::{
    account, cash, cash_item, fiscal_year, general_ledger, invoice, patient, period, service,
    transaction_type, voucher,
};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

/// Seeded fiscal year.
const YEAR: i32 = 2024;
/// Cash box account id.
const CASH_ACCOUNT_ID: i32 = 1;
/// Enterprise currency.
const CURRENCY_ID: i32 = 2;
/// Transaction types: (id, text, category). Id 4 is the transfer type the
/// cashflow leaves out by default.
const TRANSACTION_TYPES: [(i32, &str, &str); 6] = [
    (1, "CASH_PAYMENT", "income"),
    (2, "SUPPORT_INCOME", "income"),
    (4, "TRANSFER", "other"),
    (9, "PURCHASES", "expense"),
    (10, "SALARIES", "expense"),
    (11, "UTILITIES", "expense"),
];
const SERVICES: [&str; 4] = ["Administration", "Laboratory", "Maternity", "Pharmacy"];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = bhima_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    if fiscal_year::Entity::find_by_id(YEAR)
        .one(&db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("Fiscal year {YEAR} already exists, skipping...");
        return;
    }

    println!("Seeding fiscal year {YEAR}...");
    seed_fiscal_year(&db).await;

    println!("Seeding accounts and transaction types...");
    seed_chart(&db).await;

    println!("Seeding cash box postings...");
    seed_postings(&db).await;

    println!("Seeding invoices and cash payments...");
    seed_cash_payments(&db).await;

    println!("Seeding complete!");
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn month_end(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap()
}

fn period_id(month: u32) -> i32 {
    YEAR * 100 + i32::try_from(month).unwrap()
}

/// Seeds the fiscal year, its twelve months and the opening/closing
/// pseudo-periods 0 and 13.
async fn seed_fiscal_year(db: &DatabaseConnection) {
    fiscal_year::ActiveModel {
        id: Set(YEAR),
        label: Set(format!("Fiscal Year {YEAR}")),
        start_date: Set(date(YEAR, 1, 1)),
        end_date: Set(date(YEAR, 12, 31)),
    }
    .insert(db)
    .await
    .expect("Failed to insert fiscal year");

    for number in 0..=13u32 {
        let (start, end) = match number {
            0 => (date(YEAR, 1, 1), date(YEAR, 1, 1)),
            13 => (date(YEAR, 12, 31), date(YEAR, 12, 31)),
            month => {
                let start = date(YEAR, month, 1);
                (start, month_end(start))
            }
        };

        period::ActiveModel {
            id: Set(period_id(number)),
            fiscal_year_id: Set(YEAR),
            number: Set(i16::try_from(number).unwrap()),
            start_date: Set(start),
            end_date: Set(end),
            locked: Set(false),
        }
        .insert(db)
        .await
        .expect("Failed to insert period");
    }
    println!("  Created 14 periods");
}

async fn seed_chart(db: &DatabaseConnection) {
    for (id, number, label) in [
        (CASH_ACCOUNT_ID, "57110010", "Main cash box"),
        (2, "57110020", "Pharmacy cash box"),
        (3, "52100010", "Bank account"),
    ] {
        account::ActiveModel {
            id: Set(id),
            number: Set(number.to_string()),
            label: Set(label.to_string()),
            locked: Set(false),
        }
        .insert(db)
        .await
        .expect("Failed to insert account");
    }

    for (id, text, category) in TRANSACTION_TYPES {
        transaction_type::ActiveModel {
            id: Set(id),
            text: Set(text.to_string()),
            category: Set(category.to_string()),
        }
        .insert(db)
        .await
        .expect("Failed to insert transaction type");
    }
}

async fn insert_posting(
    db: &DatabaseConnection,
    trans_id: String,
    record_uuid: Uuid,
    trans_date: NaiveDate,
    origin: i32,
    debit: Decimal,
    credit: Decimal,
) {
    general_ledger::ActiveModel {
        uuid: Set(Uuid::new_v4()),
        record_uuid: Set(record_uuid),
        trans_id: Set(trans_id),
        trans_date: Set(trans_date),
        period_id: Set(Some(period_id(trans_date.month()))),
        account_id: Set(CASH_ACCOUNT_ID),
        debit: Set(debit),
        credit: Set(credit),
        debit_equiv: Set(debit),
        credit_equiv: Set(credit),
        currency_id: Set(CURRENCY_ID),
        description: Set(format!("Seeded posting on {trans_date}")),
        transaction_type_id: Set(Some(origin)),
    }
    .insert(db)
    .await
    .expect("Failed to insert posting");
}

/// Seeds a few postings per month on the cash box, plus one transfer to
/// the bank each month that reports must leave out.
async fn seed_postings(db: &DatabaseConnection) {
    let mut sequence = 0;
    let mut inserted = 0;

    for month in 1..=12u32 {
        let scale = Decimal::from(month);
        let lines = [
            (5, 1, Decimal::new(150_000, 2) + scale * Decimal::from(25), Decimal::ZERO),
            (8, 2, Decimal::new(40_000, 2), Decimal::ZERO),
            (12, 9, Decimal::ZERO, Decimal::new(62_050, 2) + scale * Decimal::from(10)),
            (25, 10, Decimal::ZERO, Decimal::new(90_000, 2)),
            (27, 11, Decimal::ZERO, Decimal::new(7_500, 2)),
            (28, 4, Decimal::ZERO, Decimal::new(20_000, 2)),
        ];

        for (day, origin, debit, credit) in lines {
            sequence += 1;
            let trans_date = date(YEAR, month, day);
            let record_uuid = Uuid::new_v4();

            if origin == 4 {
                voucher::ActiveModel {
                    uuid: Set(record_uuid),
                    reference: Set(format!("VO.TPA.{sequence}")),
                    date: Set(trans_date),
                    type_id: Set(origin),
                    currency_id: Set(CURRENCY_ID),
                    amount: Set(credit),
                    description: Set("Transfer to bank".to_string()),
                }
                .insert(db)
                .await
                .expect("Failed to insert voucher");
            }

            insert_posting(
                db,
                format!("TPA{sequence}"),
                record_uuid,
                trans_date,
                origin,
                debit,
                credit,
            )
            .await;
            inserted += 1;
        }
    }
    println!("  Created {inserted} postings");
}

/// Seeds patients, one invoice per patient and service, and cash payments
/// settling most of them.
async fn seed_cash_payments(db: &DatabaseConnection) {
    let mut service_ids = Vec::with_capacity(SERVICES.len());
    for (index, name) in SERVICES.iter().enumerate() {
        let id = i32::try_from(index + 1).unwrap();
        service::ActiveModel {
            id: Set(id),
            name: Set((*name).to_string()),
        }
        .insert(db)
        .await
        .expect("Failed to insert service");
        service_ids.push(id);
    }

    let mut payments = 0;
    for patient_no in 1..=8u32 {
        let patient_uuid = Uuid::new_v4();
        patient::ActiveModel {
            uuid: Set(patient_uuid),
            reference: Set(format!("PA.HEV.{patient_no}")),
            display_name: Set(format!("Patient {patient_no}")),
        }
        .insert(db)
        .await
        .expect("Failed to insert patient");

        for (offset, service_id) in service_ids.iter().enumerate() {
            let day = patient_no + u32::try_from(offset).unwrap();
            let invoice_date = date(YEAR, 5, day);
            let cost = Decimal::from(10 * (offset + 1)) + Decimal::from(patient_no);
            let invoice_uuid = Uuid::new_v4();
            let reference = format!("IV.HEV.{patient_no}.{service_id}");

            invoice::ActiveModel {
                uuid: Set(invoice_uuid),
                reference: Set(reference.clone()),
                patient_uuid: Set(patient_uuid),
                service_id: Set(*service_id),
                date: Set(invoice_date),
                cost: Set(cost),
                reversed: Set(false),
            }
            .insert(db)
            .await
            .expect("Failed to insert invoice");

            // Every third invoice stays unpaid
            if (patient_no + service_id.unsigned_abs()) % 3 == 0 {
                continue;
            }

            let cash_uuid = Uuid::new_v4();
            cash::ActiveModel {
                uuid: Set(cash_uuid),
                reference: Set(format!("CP.{reference}")),
                date: Set(invoice_date.succ_opt().unwrap()),
                patient_uuid: Set(patient_uuid),
                currency_id: Set(CURRENCY_ID),
                amount: Set(cost),
                reversed: Set(false),
            }
            .insert(db)
            .await
            .expect("Failed to insert cash payment");

            cash_item::ActiveModel {
                uuid: Set(Uuid::new_v4()),
                cash_uuid: Set(cash_uuid),
                invoice_uuid: Set(invoice_uuid),
                amount: Set(cost),
            }
            .insert(db)
            .await
            .expect("Failed to insert cash item");
            payments += 1;
        }
    }
    println!("  Created {payments} cash payments");
}
