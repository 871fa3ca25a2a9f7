// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deal deep links: `https://t.me/<bot>?start=order_<rail>_<id>`.

use guarantor_core::{DealId, PaymentRail};

const ORDER_PREFIX: &str = "order_";

/// Builds the shareable link a buyer opens to claim the deal.
pub fn deal_link(bot_username: &str, rail: PaymentRail, id: &DealId) -> String {
    format!("https://t.me/{bot_username}?start={}", start_payload(rail, id))
}

/// The `/start` payload for a deal, e.g. `order_star_aB3dE9xZ`.
pub fn start_payload(rail: PaymentRail, id: &DealId) -> String {
    format!("{ORDER_PREFIX}{rail}_{id}")
}

/// Extracts the deal id from a `/start` payload.
///
/// Accepts any rail prefix, a `#` before the id, and surrounding
/// whitespace. Returns `None` for payloads that are not deal links.
pub fn parse_start_payload(payload: &str) -> Option<DealId> {
    let rest = payload.trim().strip_prefix(ORDER_PREFIX)?;
    [PaymentRail::Wallet, PaymentRail::Stars, PaymentRail::Card]
        .iter()
        .find_map(|rail| rest.strip_prefix(rail.to_string().as_str())?.strip_prefix('_'))
        .map(DealId::normalize)
        .filter(|id| !id.as_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_embeds_rail_and_id() {
        let id = DealId::from("aB3dE9xZ".to_string());
        assert_eq!(
            deal_link("escrow_bot", PaymentRail::Stars, &id),
            "https://t.me/escrow_bot?start=order_star_aB3dE9xZ"
        );
    }

    #[test]
    fn payload_round_trips_for_every_rail() {
        let id = DealId::from("Zz09Yy18".to_string());
        for rail in [PaymentRail::Wallet, PaymentRail::Stars, PaymentRail::Card] {
            assert_eq!(parse_start_payload(&start_payload(rail, &id)), Some(id.clone()));
        }
    }

    #[test]
    fn payload_tolerates_marker_and_whitespace() {
        assert_eq!(
            parse_start_payload(" order_ton_#abcDEF12 ").unwrap().as_str(),
            "abcDEF12"
        );
    }

    #[test]
    fn unrelated_payloads_are_not_links() {
        assert_eq!(parse_start_payload("ref_12345"), None);
        assert_eq!(parse_start_payload("order_usd_abcdefgh"), None);
        assert_eq!(parse_start_payload("order_card_"), None);
    }
}
