// SPDX-FileCopyrightText: 2026 Guarantor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Guarantor escrow bot.
//!
//! Implements [`ChannelAdapter`] and [`NotificationGateway`] for the
//! Telegram Bot API via teloxide: long polling for messages and inline
//! keyboard presses, and plain-text delivery of rendered notices.

pub mod command;
pub mod handler;
pub mod render;

use async_trait::async_trait;
use guarantor_config::model::TelegramConfig;
use guarantor_core::{
    AdapterType, ChannelAdapter, Delivery, GuarantorError, HealthStatus, InboundEvent,
    NotificationGateway, PluginAdapter,
};
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use render::{Button, RenderSettings, Rendered};

/// Telegram channel adapter.
///
/// Private messages and callback queries are translated into
/// [`InboundEvent`]s and queued for [`receive`](ChannelAdapter::receive).
pub struct TelegramChannel {
    bot: Bot,
    render: RenderSettings,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling: Option<ShutdownToken>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig, render: RenderSettings) -> Result<Self, GuarantorError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            GuarantorError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(GuarantorError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot: Bot::new(token),
            render,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

async fn forward(tx: &mpsc::Sender<InboundEvent>, event: Option<InboundEvent>) {
    let Some(event) = event else {
        return;
    };
    if tx.send(event).await.is_err() {
        warn!("inbound channel closed, dropping update");
    }
}

fn keyboard(buttons: Vec<Button>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .into_iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label, b.data)]),
    )
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, GuarantorError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), GuarantorError> {
        debug!("Telegram channel shutting down");
        let Some(token) = &self.polling else {
            return Ok(());
        };
        match token.shutdown() {
            Ok(stopped) => stopped.await,
            Err(_) => debug!("polling was not running"),
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), GuarantorError> {
        if self.polling.is_some() {
            return Ok(()); // Already connected
        }

        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    forward(&tx, handler::message_event(&msg)).await;
                    respond(())
                }
            }))
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                    let tx = callback_tx.clone();
                    async move {
                        // Stops the client-side spinner; the reply comes as a new message.
                        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                            debug!(error = %e, "failed to answer callback query");
                        }
                        forward(&tx, handler::callback_event(&query)).await;
                        respond(())
                    }
                }),
            );

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_| async {})
            .build();
        let token = dispatcher.shutdown_token();

        info!("starting Telegram long polling");
        tokio::spawn(async move {
            dispatcher.dispatch().await;
        });

        self.polling = Some(token);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, GuarantorError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| GuarantorError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[async_trait]
impl NotificationGateway for TelegramChannel {
    async fn notify(&self, delivery: Delivery) -> Result<(), GuarantorError> {
        let Rendered { text, keyboard: buttons } =
            render::render(&delivery.notice, delivery.language, &self.render);
        let request = self.bot.send_message(ChatId(delivery.user.0), text);
        let result = if buttons.is_empty() {
            request.await
        } else {
            request.reply_markup(keyboard(buttons)).await
        };
        result.map_err(|e| GuarantorError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }
}
