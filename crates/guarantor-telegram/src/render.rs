// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text rendering of notices, with the inline keyboard that goes
//! along with each one.

use guarantor_config::model::DealsConfig;
use guarantor_core::{Deal, InputField, Language, Notice, PaymentRail, Rejection, UsageHint};

use crate::command::deal_callback;

/// Presentation settings that are not part of any notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSettings {
    /// Shown in the welcome text, e.g. `@escrow_support`.
    pub support_contact: Option<String>,
}

impl From<&DealsConfig> for RenderSettings {
    fn from(config: &DealsConfig) -> Self {
        Self {
            support_contact: config.support_contact.clone(),
        }
    }
}

/// An inline keyboard button; `data` is parsed back by
/// [`parse_callback`](crate::command::parse_callback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// A rendered message. Each button gets its own keyboard row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub keyboard: Vec<Button>,
}

impl Rendered {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    fn with(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.keyboard.extend(buttons);
        self
    }
}

fn tr(language: Language, ru: &'static str, en: &'static str) -> &'static str {
    match language {
        Language::Ru => ru,
        Language::En => en,
    }
}

fn back_button(language: Language) -> Button {
    Button::new(tr(language, "⬅️ Вернуться в меню", "⬅️ Back to menu"), "back_to_menu")
}

fn main_menu(language: Language) -> [Button; 3] {
    [
        Button::new(
            tr(language, "📥 Управление реквизитами", "📥 Manage Wallets"),
            "manage_rekv",
        ),
        Button::new(tr(language, "📔 Создать сделку", "📔 Create Deal"), "create_deal"),
        Button::new(tr(language, "🏴 Сменить язык", "🏴 Change Language"), "change_lang"),
    ]
}

fn wallets_menu(language: Language) -> [Button; 3] {
    [
        Button::new(
            tr(language, "🪙 Добавить/Изменить TON", "🪙 Add/Edit TON Wallet"),
            "add_ton",
        ),
        Button::new(
            tr(language, "💳 Добавить/Изменить карту", "💳 Add/Edit Card"),
            "add_card",
        ),
        back_button(language),
    ]
}

fn amount_line(deal: &Deal) -> String {
    format!("{} {}", deal.amount.display_for(deal.rail), deal.rail.currency())
}

/// Renders `notice` in `language`.
pub fn render(notice: &Notice, language: Language, settings: &RenderSettings) -> Rendered {
    let lang = language;
    match notice {
        Notice::Welcome => {
            let mut text = tr(
                lang,
                "Добро пожаловать в надежный P2P-гарант\n\n\
                 💼 Покупайте и продавайте всё, что угодно, безопасно!\n\n\
                 Выберите нужный раздел ниже:",
                "Welcome to a reliable P2P guarantor\n\n\
                 💼 Buy and sell anything, safely!\n\n\
                 Choose a section below:",
            )
            .to_string();
            if let Some(contact) = &settings.support_contact {
                text.push_str(&format!(
                    "\n\n{} {contact}",
                    tr(lang, "💁‍♂️ Поддержка:", "💁‍♂️ Support:")
                ));
            }
            Rendered::text(text).with(main_menu(lang))
        }
        Notice::ManageWallets => {
            Rendered::text(tr(lang, "Выберите действие:", "Choose an action:"))
                .with(wallets_menu(lang))
        }
        Notice::PromptWallet { current } => {
            let mut text = tr(lang, "🔑 Добавьте ваш TON-кошелек:", "🔑 Add your TON wallet:")
                .to_string();
            if let Some(current) = current {
                text.push_str(&format!(
                    "\n\n{} {current}",
                    tr(lang, "Текущий:", "Current:")
                ));
            }
            Rendered::text(text).with([back_button(lang)])
        }
        Notice::PromptCard { current } => {
            let mut text = tr(
                lang,
                "💳 Введите номер вашей карты (12-19 цифр):",
                "💳 Enter your card number (12-19 digits):",
            )
            .to_string();
            if let Some(current) = current {
                text.push_str(&format!(
                    "\n\n{} {current}",
                    tr(lang, "Текущая:", "Current:")
                ));
            }
            Rendered::text(text).with([back_button(lang)])
        }
        Notice::WalletSaved => {
            Rendered::text(tr(lang, "✅ Установлен TON-кошелек", "✅ TON wallet set"))
                .with(wallets_menu(lang))
        }
        Notice::CardSaved => {
            Rendered::text(tr(lang, "✅ Номер карты сохранен", "✅ Card number saved"))
                .with(wallets_menu(lang))
        }
        Notice::ChoosePayMethod => Rendered::text(tr(
            lang,
            "💰 Выберите метод оплаты:",
            "💰 Choose payment method:",
        ))
        .with([
            Button::new(tr(lang, "💎 TON-Кошелек", "💎 TON Wallet"), "pay_ton"),
            Button::new(tr(lang, "⭐ Звезды", "⭐ Stars"), "pay_star"),
            Button::new(tr(lang, "💳 На карту", "💳 Card"), "pay_card"),
            back_button(lang),
        ]),
        Notice::PromptAmount { rail } => {
            let text = match rail {
                PaymentRail::Wallet => tr(
                    lang,
                    "Введите сумму TON сделки (например: 199.99):",
                    "Enter TON deal amount (e.g.: 199.99):",
                ),
                PaymentRail::Stars => tr(
                    lang,
                    "Введите количество звезд для оплаты (например: 150):",
                    "Enter number of stars for payment (e.g.: 150):",
                ),
                PaymentRail::Card => tr(
                    lang,
                    "💼 Создание сделки\n\nВведите сумму RUB сделки в формате: 199.99",
                    "💼 Creating deal\n\nEnter RUB deal amount in format: 199.99",
                ),
            };
            Rendered::text(text).with([back_button(lang)])
        }
        Notice::PromptOffer { rail, amount } => {
            let amount = format!("{} {}", amount.display_for(*rail), rail.currency());
            let text = match lang {
                Language::Ru => format!(
                    "📝 Опишите, что предлагаете за {amount}.\n\n\
                     Пример:\nhttps://t.me/nft/PlushPepe-1"
                ),
                Language::En => format!(
                    "📝 Describe what you offer for {amount}.\n\n\
                     Example:\nhttps://t.me/nft/PlushPepe-1"
                ),
            };
            Rendered::text(text).with([back_button(lang)])
        }
        Notice::DealCreated { deal, link } => {
            let amount = amount_line(deal);
            let offer = &deal.offer;
            let text = match lang {
                Language::Ru => format!(
                    "✅ Сделка создана!\n\n💰 Сумма: {amount}\n📜 Описание: {offer}\n\
                     🔗 Ссылка для покупателя:\n{link}"
                ),
                Language::En => format!(
                    "✅ Deal created!\n\n💰 Amount: {amount}\n📜 Description: {offer}\n\
                     🔗 Link for buyer:\n{link}"
                ),
            };
            Rendered::text(text).with([Button::new(
                tr(lang, "❌ Закрыть сделку", "❌ Close Deal"),
                deal_callback("close_", deal.id.as_str()),
            )])
        }
        Notice::ConfirmCancel { deal_id } => {
            let text = match lang {
                Language::Ru => format!("❓ Уверены, что хотите закрыть сделку #{deal_id}?"),
                Language::En => format!("❓ Are you sure you want to close deal #{deal_id}?"),
            };
            Rendered::text(text).with([
                Button::new(
                    tr(lang, "✅ Да, закрыть", "✅ Yes, Close"),
                    deal_callback("exit_yes_", deal_id.as_str()),
                ),
                Button::new(tr(lang, "⬅️ Нет", "⬅️ No"), "back_to_menu"),
            ])
        }
        Notice::DealCancelled { deal_id } => {
            let text = match lang {
                Language::Ru => format!("✅ Сделка #{deal_id} закрыта"),
                Language::En => format!("✅ Deal #{deal_id} closed"),
            };
            Rendered::text(text).with([back_button(lang)])
        }
        Notice::DealSummary {
            deal,
            seller_deals,
            pay_to,
        } => render_summary(deal, *seller_deals, pay_to.as_deref(), lang),
        Notice::BuyerJoined {
            deal_id,
            buyer_name,
        } => Rendered::text(match lang {
            Language::Ru => format!("✅ Пользователь @{buyer_name} присоединился к сделке #{deal_id}"),
            Language::En => format!("✅ User @{buyer_name} joined deal #{deal_id}"),
        }),
        Notice::PaymentConfirmed { deal, buyer_name } => {
            let id = &deal.id;
            let amount = amount_line(deal);
            Rendered::text(match lang {
                Language::Ru => format!(
                    "✅ Покупатель @{buyer_name} подтвердил оплату по сделке #{id}\n\n💰 Сумма: {amount}"
                ),
                Language::En => format!(
                    "✅ Buyer @{buyer_name} confirmed payment for deal #{id}\n\n💰 Amount: {amount}"
                ),
            })
        }
        Notice::PaymentAccepted => Rendered::text(tr(
            lang,
            "✅ Оплата успешно проведена! Спасибо за покупку!",
            "✅ Payment successful! Thank you for your purchase!",
        ))
        .with([back_button(lang)]),
        Notice::StarsPayment { deal, recipient } => {
            let id = &deal.id;
            let amount = amount_line(deal);
            let recipient = recipient.as_deref().unwrap_or("-");
            let text = match lang {
                Language::Ru => format!(
                    "💫 Оплата сделки #{id}\n\n🏦 Получатель: {recipient}\n💰 Сумма: {amount}\n\
                     📝 Комментарий: {id}\n\nПосле оплаты нажмите «Подтвердить оплату»."
                ),
                Language::En => format!(
                    "💫 Payment for deal #{id}\n\n🏦 Recipient: {recipient}\n💰 Amount: {amount}\n\
                     📝 Comment: {id}\n\nAfter paying, press \"Confirm payment\"."
                ),
            };
            Rendered::text(text).with([
                Button::new(
                    tr(lang, "✅ Подтвердить оплату", "✅ Confirm payment"),
                    deal_callback("confirm_pay_", id.as_str()),
                ),
                Button::new(
                    tr(lang, "❌ Выйти из сделки", "❌ Exit deal"),
                    deal_callback("exit_deal_", id.as_str()),
                ),
            ])
        }
        Notice::LeftDeal { deal_id } => Rendered::text(match lang {
            Language::Ru => format!(
                "↩️ Вы вышли из сделки #{deal_id}.\n\n\
                 Вы остаётесь её покупателем. Продавец может отменить сделку."
            ),
            Language::En => format!(
                "↩️ You stepped away from deal #{deal_id}.\n\n\
                 You remain its buyer. The seller can cancel the deal."
            ),
        })
        .with([back_button(lang)]),
        Notice::BuyerLeft {
            deal_id,
            buyer_name,
        } => Rendered::text(match lang {
            Language::Ru => format!(
                "⚠️ Покупатель @{buyer_name} вышел из сделки #{deal_id}.\n\n\
                 Сделка остаётся за ним. Вы можете отменить её."
            ),
            Language::En => format!(
                "⚠️ Buyer @{buyer_name} stepped away from deal #{deal_id}.\n\n\
                 The deal stays attached to them. You can cancel it."
            ),
        })
        .with([Button::new(
            tr(lang, "❌ Отменить сделку", "❌ Cancel deal"),
            deal_callback("close_", deal_id.as_str()),
        )]),
        Notice::DealCountSet { count } => Rendered::text(match lang {
            Language::Ru => format!("✅ Установлено успешных сделок: {count}"),
            Language::En => format!("✅ Successful deals set: {count}"),
        }),
        Notice::ChooseLanguage => {
            Rendered::text(tr(lang, "Изменить язык:", "Change language:")).with([
                Button::new("🇷🇺 Русский", "lang_ru"),
                Button::new("🇬🇧 English", "lang_en"),
            ])
        }
        Notice::LanguageChanged { language } => {
            let name = match language {
                Language::Ru => "Русский",
                Language::En => "English",
            };
            Rendered::text(match lang {
                Language::Ru => format!("Язык изменен на {name}"),
                Language::En => format!("Language changed to {name}"),
            })
            .with(main_menu(lang))
        }
        Notice::Usage(hint) => Rendered::text(render_usage(*hint, lang)),
        Notice::Rejected(rejection) => {
            Rendered::text(render_rejection(rejection, lang)).with([back_button(lang)])
        }
        Notice::Failure => Rendered::text(tr(
            lang,
            "⚠️ Не удалось выполнить запрос. Попробуйте позже.",
            "⚠️ The request failed. Please try again later.",
        )),
    }
}

fn render_summary(
    deal: &Deal,
    seller_deals: i64,
    pay_to: Option<&str>,
    lang: Language,
) -> Rendered {
    let id = &deal.id;
    let seller = &deal.seller_name;
    let seller_id = deal.seller_id;
    let offer = &deal.offer;
    let amount = amount_line(deal);
    let pay_to = pay_to.unwrap_or_else(|| tr(lang, "уточните у поддержки", "ask support"));
    let text = match lang {
        Language::Ru => format!(
            "💳 Информация о сделке #{id}\n\n👤 Вы покупатель в сделке.\n\
             📌 Продавец: @{seller} | 🆔 {seller_id}\n• Успешные сделки: {seller_deals}\n\n\
             • Вы покупаете:\n{offer}\n\n🏦 Адрес для оплаты:\n{pay_to}\n\n\
             💰 Сумма к оплате: {amount}\n📝 Комментарий к платежу (мемо): {id}\n\n\
             ⚠️ Пожалуйста, убедитесь в правильности данных перед оплатой. Комментарий обязателен!"
        ),
        Language::En => format!(
            "💳 Deal info #{id}\n\n👤 You are the buyer in this deal.\n\
             📌 Seller: @{seller} | 🆔 {seller_id}\n• Successful deals: {seller_deals}\n\n\
             • You are buying:\n{offer}\n\n🏦 Payment address:\n{pay_to}\n\n\
             💰 Amount to pay: {amount}\n📝 Payment comment (memo): {id}\n\n\
             ⚠️ Please check the details before payment. The memo is required!"
        ),
    };
    let pay = match deal.rail {
        PaymentRail::Stars => Button::new(
            tr(lang, "💫 Оплатить Stars", "💫 Pay Stars"),
            deal_callback("pay_stars_", id.as_str()),
        ),
        PaymentRail::Wallet | PaymentRail::Card => Button::new(
            tr(lang, "✅ Подтвердить оплату", "✅ Confirm payment"),
            deal_callback("confirm_pay_", id.as_str()),
        ),
    };
    Rendered::text(text).with([
        pay,
        Button::new(
            tr(lang, "❌ Выйти из сделки", "❌ Exit deal"),
            deal_callback("exit_deal_", id.as_str()),
        ),
    ])
}

fn render_usage(hint: UsageHint, lang: Language) -> &'static str {
    match hint {
        UsageHint::Buy => tr(
            lang,
            "Использование: /buy <ID сделки>\nПример: /buy ABC123XY",
            "Usage: /buy <Deal ID>\nExample: /buy ABC123XY",
        ),
        UsageHint::Confirm => tr(
            lang,
            "Использование: /confirm <ID сделки>\nПример: /confirm ABC123XY",
            "Usage: /confirm <Deal ID>\nExample: /confirm ABC123XY",
        ),
        UsageHint::Cancel => tr(
            lang,
            "Использование: /cancel <ID сделки>\nПример: /cancel ABC123XY",
            "Usage: /cancel <Deal ID>\nExample: /cancel ABC123XY",
        ),
        UsageHint::SetDeals => tr(
            lang,
            "Использование: /set_my_deals <число>\nПример: /set_my_deals 100",
            "Usage: /set_my_deals <number>\nExample: /set_my_deals 100",
        ),
    }
}

fn render_rejection(rejection: &Rejection, lang: Language) -> String {
    match rejection {
        Rejection::NotFound { deal_id } | Rejection::NotOpen { deal_id } => match lang {
            Language::Ru => format!("❌ Сделка #{deal_id} не найдена или уже закрыта."),
            Language::En => format!("❌ Deal #{deal_id} not found or already closed."),
        },
        Rejection::Forbidden { deal_id } => match lang {
            Language::Ru => format!("❌ Это действие недоступно для сделки #{deal_id}."),
            Language::En => format!("❌ This action is not available for deal #{deal_id}."),
        },
        Rejection::SelfTrade => tr(
            lang,
            "❌ Вы не можете купить у самого себя!",
            "❌ You cannot buy from yourself!",
        )
        .to_string(),
        Rejection::AlreadyClaimed => tr(
            lang,
            "❌ К этой сделке уже присоединился другой покупатель!",
            "❌ Another buyer already joined this deal!",
        )
        .to_string(),
        Rejection::InvalidInput(field) => render_invalid(*field, lang).to_string(),
        Rejection::NoPaymentMethod => tr(
            lang,
            "❌ Для создания сделки необходимо добавить TON-кошелек или карту!\n\n\
             Перейдите в «Управление реквизитами» и добавьте платежные данные.",
            "❌ To create a deal, add a TON wallet or card!\n\n\
             Go to \"Manage Wallets\" and add payment details.",
        )
        .to_string(),
        Rejection::InvalidStep => tr(
            lang,
            "❌ Сейчас это действие недоступно. Вернитесь в меню.",
            "❌ This action is not available right now. Go back to the menu.",
        )
        .to_string(),
        Rejection::CountOverrideDisabled => tr(
            lang,
            "❌ Изменение счетчика сделок отключено.",
            "❌ Changing the deal counter is disabled.",
        )
        .to_string(),
    }
}

fn render_invalid(field: InputField, lang: Language) -> &'static str {
    match field {
        InputField::Wallet => tr(
            lang,
            "❌ Неверный адрес TON-кошелька",
            "❌ Invalid TON wallet address",
        ),
        InputField::Card => tr(
            lang,
            "❌ Неверный формат номера карты. Введите только цифры, от 12 до 19 символов.",
            "❌ Invalid card number format. Enter only digits, 12 to 19 characters.",
        ),
        InputField::Amount => tr(
            lang,
            "❌ Неверный формат суммы. Попробуйте снова.",
            "❌ Invalid amount format. Try again.",
        ),
        InputField::Offer => tr(
            lang,
            "❌ Принимаются только ссылки в формате https://t.me/nft/… Попробуйте снова.",
            "❌ Only links in the format https://t.me/nft/… are accepted. Try again.",
        ),
        InputField::DealCount => tr(
            lang,
            "❌ Количество сделок не может быть отрицательным.",
            "❌ The deal count cannot be negative.",
        ),
    }
}
