// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile operations.

use guarantor_core::{GuarantorError, Language, User, UserId, UserPatch};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

/// Insert the user if absent, then overwrite only the fields set in `patch`.
pub async fn upsert_user(db: &Database, id: UserId, patch: UserPatch) -> Result<(), GuarantorError> {
    let language = patch.language.map(|l| l.to_string());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (user_id, ton_wallet, card_number, lang, successful_deals)
                 VALUES (?1, ?2, ?3, COALESCE(?4, 'ru'), COALESCE(?5, 0))
                 ON CONFLICT(user_id) DO UPDATE SET
                     ton_wallet = COALESCE(?2, ton_wallet),
                     card_number = COALESCE(?3, card_number),
                     lang = COALESCE(?4, lang),
                     successful_deals = COALESCE(?5, successful_deals)",
                params![
                    id.0,
                    patch.wallet,
                    patch.card_number,
                    language,
                    patch.successful_deals
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a user profile by id.
pub async fn get_user(db: &Database, id: UserId) -> Result<Option<User>, GuarantorError> {
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                "SELECT user_id, ton_wallet, card_number, lang, successful_deals
                 FROM users WHERE user_id = ?1",
                params![id.0],
                |row| {
                    let lang: Option<String> = row.get(3)?;
                    Ok(User {
                        id: UserId(row.get(0)?),
                        wallet: row.get(1)?,
                        card_number: row.get(2)?,
                        language: Language::from_stored(lang.as_deref()),
                        successful_deals: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Add one to the user's successful-deal counter.
pub async fn increment_successful_deals(db: &Database, id: UserId) -> Result<(), GuarantorError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> { increment_in(conn, id) })
        .await
        .map_err(map_tr_err)
}

/// Counter increment usable inside an open transaction.
pub(crate) fn increment_in(conn: &rusqlite::Connection, id: UserId) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO users (user_id, successful_deals) VALUES (?1, 1)
         ON CONFLICT(user_id) DO UPDATE SET successful_deals = successful_deals + 1",
        params![id.0],
    )?;
    Ok(())
}
