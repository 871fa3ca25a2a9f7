// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text command and callback data parsing.
//!
//! Both surfaces map onto the same [`Action`] set, so a user can drive every
//! flow with either the inline keyboards or typed commands.

use guarantor_core::{Action, Language, PaymentRail, UsageHint};

/// Parses a private text message.
///
/// Recognized commands take at most one argument; a missing or malformed
/// argument yields [`Action::Usage`]. Anything else, including unknown
/// commands, is step input for the current conversation.
pub fn parse_text(text: &str) -> Action {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Action::Text(text.to_string());
    };

    let (head, arg) = match body.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (body, ""),
    };
    // `/buy@escrow_bot abc` in clients that append the bot name.
    let command = head.split_once('@').map_or(head, |(name, _)| name);
    let arg = (!arg.is_empty()).then_some(arg);

    match command {
        "start" => Action::Start {
            payload: arg.map(str::to_string),
        },
        "menu" => Action::Menu,
        "wallet" => Action::AddWallet,
        "card" => Action::AddCard,
        "deal" => Action::CreateDeal,
        "buy" => with_deal_id(arg, UsageHint::Buy, Action::Claim),
        "confirm" => with_deal_id(arg, UsageHint::Confirm, Action::ConfirmPayment),
        "cancel" => with_deal_id(arg, UsageHint::Cancel, Action::RequestCancel),
        "set_my_deals" => match arg.and_then(|a| a.parse::<i64>().ok()) {
            Some(count) => Action::SetDealCount(count),
            None => Action::Usage(UsageHint::SetDeals),
        },
        "lang" => Action::ChangeLanguage(arg.and_then(|a| a.to_lowercase().parse().ok())),
        _ => Action::Text(text.to_string()),
    }
}

fn with_deal_id(arg: Option<&str>, hint: UsageHint, action: fn(String) -> Action) -> Action {
    match arg {
        Some(id) => action(id.to_string()),
        None => Action::Usage(hint),
    }
}

/// Parses inline keyboard callback data. Returns `None` for unknown data.
pub fn parse_callback(data: &str) -> Option<Action> {
    let action = match data {
        "manage_rekv" => Action::ManageWallets,
        "add_ton" => Action::AddWallet,
        "add_card" => Action::AddCard,
        "back_to_menu" => Action::Menu,
        "create_deal" => Action::CreateDeal,
        "pay_ton" => Action::ChooseRail(PaymentRail::Wallet),
        "pay_star" => Action::ChooseRail(PaymentRail::Stars),
        "pay_card" => Action::ChooseRail(PaymentRail::Card),
        "change_lang" => Action::ChangeLanguage(None),
        "lang_ru" => Action::ChangeLanguage(Some(Language::Ru)),
        "lang_en" => Action::ChangeLanguage(Some(Language::En)),
        _ => return parse_deal_callback(data),
    };
    Some(action)
}

/// Callback prefixes that carry a deal id.
const DEAL_CALLBACKS: [(&str, fn(String) -> Action); 5] = [
    ("exit_yes_", Action::Cancel),
    ("close_", Action::RequestCancel),
    ("confirm_pay_", Action::ConfirmPayment),
    ("exit_deal_", Action::LeaveDeal),
    ("pay_stars_", Action::PayStars),
];

fn parse_deal_callback(data: &str) -> Option<Action> {
    DEAL_CALLBACKS.iter().find_map(|(prefix, action)| {
        data.strip_prefix(prefix)
            .filter(|id| !id.is_empty())
            .map(|id| action(id.to_string()))
    })
}

/// Callback data for a deal-scoped button.
pub(crate) fn deal_callback(prefix: &str, deal_id: &str) -> String {
    format!("{prefix}{deal_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_step_input() {
        assert_eq!(parse_text("UQ123"), Action::Text("UQ123".into()));
        assert_eq!(
            parse_text("  https://t.me/nft/PlushPepe-1 "),
            Action::Text("  https://t.me/nft/PlushPepe-1 ".into())
        );
    }

    #[test]
    fn start_with_and_without_payload() {
        assert_eq!(parse_text("/start"), Action::Start { payload: None });
        assert_eq!(
            parse_text("/start order_ton_aB3dE9xZ"),
            Action::Start {
                payload: Some("order_ton_aB3dE9xZ".into())
            }
        );
    }

    #[test]
    fn bot_suffix_is_ignored() {
        assert_eq!(
            parse_text("/buy@escrow_bot aB3dE9xZ"),
            Action::Claim("aB3dE9xZ".into())
        );
    }

    #[test]
    fn deal_commands_require_an_id() {
        assert_eq!(parse_text("/buy"), Action::Usage(UsageHint::Buy));
        assert_eq!(parse_text("/confirm   "), Action::Usage(UsageHint::Confirm));
        assert_eq!(parse_text("/cancel"), Action::Usage(UsageHint::Cancel));
        assert_eq!(
            parse_text("/confirm #aB3dE9xZ"),
            Action::ConfirmPayment("#aB3dE9xZ".into())
        );
        assert_eq!(
            parse_text("/cancel aB3dE9xZ"),
            Action::RequestCancel("aB3dE9xZ".into())
        );
    }

    #[test]
    fn set_my_deals_parses_integer() {
        assert_eq!(parse_text("/set_my_deals 100"), Action::SetDealCount(100));
        assert_eq!(
            parse_text("/set_my_deals many"),
            Action::Usage(UsageHint::SetDeals)
        );
        assert_eq!(parse_text("/set_my_deals"), Action::Usage(UsageHint::SetDeals));
    }

    #[test]
    fn lang_command() {
        assert_eq!(
            parse_text("/lang EN"),
            Action::ChangeLanguage(Some(Language::En))
        );
        assert_eq!(parse_text("/lang"), Action::ChangeLanguage(None));
        assert_eq!(parse_text("/lang de"), Action::ChangeLanguage(None));
    }

    #[test]
    fn unknown_command_is_text() {
        assert_eq!(parse_text("/help"), Action::Text("/help".into()));
    }

    #[test]
    fn menu_callbacks() {
        assert_eq!(parse_callback("manage_rekv"), Some(Action::ManageWallets));
        assert_eq!(parse_callback("back_to_menu"), Some(Action::Menu));
        assert_eq!(
            parse_callback("pay_star"),
            Some(Action::ChooseRail(PaymentRail::Stars))
        );
        assert_eq!(
            parse_callback("lang_en"),
            Some(Action::ChangeLanguage(Some(Language::En)))
        );
    }

    #[test]
    fn deal_callbacks_carry_the_id() {
        assert_eq!(
            parse_callback("close_aB3dE9xZ"),
            Some(Action::RequestCancel("aB3dE9xZ".into()))
        );
        assert_eq!(
            parse_callback("exit_yes_aB3dE9xZ"),
            Some(Action::Cancel("aB3dE9xZ".into()))
        );
        assert_eq!(
            parse_callback("confirm_pay_aB3dE9xZ"),
            Some(Action::ConfirmPayment("aB3dE9xZ".into()))
        );
        assert_eq!(
            parse_callback("exit_deal_aB3dE9xZ"),
            Some(Action::LeaveDeal("aB3dE9xZ".into()))
        );
        assert_eq!(
            parse_callback("pay_stars_aB3dE9xZ"),
            Some(Action::PayStars("aB3dE9xZ".into()))
        );
    }

    #[test]
    fn ids_may_contain_underscores() {
        assert_eq!(
            parse_callback("exit_deal_ab_cd"),
            Some(Action::LeaveDeal("ab_cd".into()))
        );
    }

    #[test]
    fn unknown_or_empty_callbacks() {
        assert_eq!(parse_callback("pay_usd"), None);
        assert_eq!(parse_callback("close_"), None);
        assert_eq!(parse_callback(""), None);
    }
}
