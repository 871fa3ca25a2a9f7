// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of Telegram updates into channel-agnostic [`InboundEvent`]s.

use guarantor_core::{Action, InboundEvent, UserId};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, User};
use tracing::debug;

use crate::command;

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

fn sender(user: &User) -> Option<(UserId, Option<String>)> {
    let id = i64::try_from(user.id.0).ok()?;
    Some((UserId(id), user.username.clone()))
}

/// Converts a private message into an event.
///
/// Completed payments become [`Action::PaymentReceived`]; text is parsed
/// as a command or step input. Messages without a sender or without
/// usable content yield `None`.
pub fn message_event(msg: &Message) -> Option<InboundEvent> {
    let (user, display_name) = sender(msg.from.as_ref()?)?;
    let action = if let Some(payment) = msg.successful_payment() {
        Action::PaymentReceived {
            payload: payment.invoice_payload.clone(),
        }
    } else {
        command::parse_text(msg.text()?)
    };
    Some(InboundEvent::new(user, display_name, action))
}

/// Converts an inline keyboard press into an event.
pub fn callback_event(query: &CallbackQuery) -> Option<InboundEvent> {
    let data = query.data.as_deref()?;
    let Some(action) = command::parse_callback(data) else {
        debug!(data, "ignoring unknown callback data");
        return None;
    };
    let (user, display_name) = sender(&query.from)?;
    Some(InboundEvent::new(user, display_name, action))
}
