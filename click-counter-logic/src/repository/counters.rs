use std::collections::HashMap;

use entity::counters;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, DbErr, EntityTrait, QueryFilter,
    Statement, TransactionTrait,
};

use crate::{
    error::ServiceError,
    types::{CounterTotals, CountryTotal},
};

const UPSERT_INCREMENT_SQL: &str = r#"
    INSERT INTO counters (doc_id, country, count)
    VALUES ($1, $2, 1)
    ON CONFLICT (doc_id) DO UPDATE SET count = counters.count + 1
"#;

/// Applies `+1` to the global document and to `country_<CODE>`, in one
/// transaction (§4.B `Increment`; invariant 2 in §3 — global always equals
/// the sum of country counts at a transaction boundary).
pub async fn increment<C>(db: &C, country_code: &str, country_label: &str) -> Result<(), ServiceError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;
    upsert_one(&txn, counters::GLOBAL_DOC_ID, None).await?;
    let doc_id = counters::country_doc_id(country_code);
    upsert_one(&txn, &doc_id, Some(country_label)).await?;
    txn.commit().await?;
    Ok(())
}

async fn upsert_one(
    txn: &DatabaseTransaction,
    doc_id: &str,
    country: Option<&str>,
) -> Result<(), DbErr> {
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        UPSERT_INCREMENT_SQL,
        [
            doc_id.to_string().into(),
            country.map(|c| c.to_string()).into(),
        ],
    ))
    .await?;
    Ok(())
}

/// Reads the global total and every `country_*` document (§4.B `GetTotals`).
/// Not transactional: a caller may observe the global count updated slightly
/// ahead of, or behind, a given country's count.
pub async fn get_totals<C>(db: &C) -> Result<CounterTotals, ServiceError>
where
    C: ConnectionTrait,
{
    let global = counters::Entity::find_by_id(counters::GLOBAL_DOC_ID)
        .one(db)
        .await?
        .map(|model| model.count)
        .unwrap_or(0);

    let countries = counters::Entity::find()
        .filter(counters::Column::DocId.ne(counters::GLOBAL_DOC_ID))
        .all(db)
        .await?
        .into_iter()
        .map(|model| {
            let country = model.country.unwrap_or_default();
            (model.doc_id, CountryTotal { count: model.count, country })
        })
        .collect::<HashMap<_, _>>();

    Ok(CounterTotals { global, countries })
}
