// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal record operations and the guarded lifecycle transaction.

use std::str::FromStr;

use guarantor_core::types::timestamp_now;
use guarantor_core::{
    Amount, Deal, DealId, DealPatch, DealStatus, DealTransition, GuarantorError, PaymentRail,
    TransitionOutcome, UserId,
};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};

use crate::database::{Database, map_tr_err};
use crate::queries::users;

const SELECT_DEAL: &str = "SELECT deal_id, seller_id, seller_username, buyer_id, amount, offer,
            deal_type, status, successful, created_at, updated_at
     FROM deals WHERE deal_id = ?1";

/// Insert a new deal.
pub async fn insert_deal(db: &Database, deal: &Deal) -> Result<(), GuarantorError> {
    let deal = deal.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO deals (deal_id, seller_id, seller_username, buyer_id, amount, offer,
                                    deal_type, status, successful, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    deal.id.as_str(),
                    deal.seller_id.0,
                    deal.seller_name,
                    deal.buyer_id.map(|b| b.0),
                    deal.amount.to_string(),
                    deal.offer,
                    deal.rail.to_string(),
                    deal.status.to_string(),
                    deal.successful,
                    deal.created_at,
                    deal.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a deal by its exact id.
pub async fn get_deal(db: &Database, id: &DealId) -> Result<Option<Deal>, GuarantorError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Deal>, rusqlite::Error> { select_deal(conn, &id) })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the fields set in `patch`. Returns `false` if no row matched.
pub async fn update_deal_fields(
    db: &Database,
    id: &DealId,
    patch: DealPatch,
) -> Result<bool, GuarantorError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE deals SET
                     buyer_id = COALESCE(?2, buyer_id),
                     status = COALESCE(?3, status),
                     successful = COALESCE(?4, successful),
                     amount = COALESCE(?5, amount),
                     offer = COALESCE(?6, offer),
                     updated_at = ?7
                 WHERE deal_id = ?1",
                params![
                    id.as_str(),
                    patch.buyer_id.map(|b| b.0),
                    patch.status.map(|s| s.to_string()),
                    patch.successful,
                    patch.amount.map(|a| a.to_string()),
                    patch.offer,
                    timestamp_now(),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a deal. Returns `false` if no row matched.
pub async fn delete_deal(db: &Database, id: &DealId) -> Result<bool, GuarantorError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute("DELETE FROM deals WHERE deal_id = ?1", params![id.as_str()])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a lifecycle transition in one immediate transaction.
///
/// The row is re-read inside the transaction and the transition's guard is
/// checked against it, so a concurrent writer can never be overwritten.
/// Completion increments the seller's counter in the same transaction.
pub async fn apply_transition(
    db: &Database,
    id: &DealId,
    transition: DealTransition,
) -> Result<TransitionOutcome, GuarantorError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<TransitionOutcome, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(mut deal) = select_deal(&tx, &id)? else {
                return Ok(TransitionOutcome::Missing);
            };
            if !transition.permits(&deal) {
                return Ok(TransitionOutcome::Stale(deal));
            }

            let now = timestamp_now();
            match transition {
                DealTransition::Claim { buyer } => {
                    tx.execute(
                        "UPDATE deals SET buyer_id = ?2, updated_at = ?3 WHERE deal_id = ?1",
                        params![id.as_str(), buyer.0, now],
                    )?;
                    deal.buyer_id = Some(buyer);
                }
                DealTransition::Complete => {
                    tx.execute(
                        "UPDATE deals SET status = 'completed', successful = 1, updated_at = ?2
                         WHERE deal_id = ?1",
                        params![id.as_str(), now],
                    )?;
                    users::increment_in(&tx, deal.seller_id)?;
                    deal.status = DealStatus::Completed;
                    deal.successful = true;
                }
                DealTransition::Cancel => {
                    tx.execute(
                        "UPDATE deals SET status = 'cancelled', updated_at = ?2 WHERE deal_id = ?1",
                        params![id.as_str(), now],
                    )?;
                    deal.status = DealStatus::Cancelled;
                }
                DealTransition::Purge => {
                    tx.execute("DELETE FROM deals WHERE deal_id = ?1", params![id.as_str()])?;
                }
            }
            if !matches!(transition, DealTransition::Purge) {
                deal.updated_at = now;
            }
            tx.commit()?;
            Ok(TransitionOutcome::Applied(deal))
        })
        .await
        .map_err(map_tr_err)
}

fn select_deal(conn: &rusqlite::Connection, id: &DealId) -> Result<Option<Deal>, rusqlite::Error> {
    conn.query_row(SELECT_DEAL, params![id.as_str()], row_to_deal)
        .optional()
}

fn row_to_deal(row: &Row<'_>) -> Result<Deal, rusqlite::Error> {
    let buyer: Option<i64> = row.get(3)?;
    Ok(Deal {
        id: DealId::from(row.get::<_, String>(0)?),
        seller_id: UserId(row.get(1)?),
        seller_name: row.get(2)?,
        buyer_id: buyer.map(UserId),
        amount: parse_column::<Amount>(row, 4)?,
        offer: row.get(5)?,
        rail: parse_column::<PaymentRail>(row, 6)?,
        status: parse_column::<DealStatus>(row, 7)?,
        successful: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Reads a TEXT column and parses it, reporting failures as conversion errors.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
