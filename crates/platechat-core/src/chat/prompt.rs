//! Prompt assembly for the vehicle-information assistant.
//!
//! Turns a user message plus optional licence-plate context and prior turns
//! into the ordered message list sent to the completion service:
//!
//! ```text
//! system    base instruction [+ plate block]
//! ...       prior turns, in order
//! user      the current message
//! ```

use platechat_types::chat::{ChatContext, HistoryEntry};
use platechat_types::llm::{Message, MessageRole};
use platechat_types::session::LicensePlate;

const BASE_INSTRUCTION: &str = "あなたは車両情報に関する質問に答えるAIアシスタントです。\n\
日本語で丁寧に応答してください。\n\
ユーザーの質問に対して、簡潔で分かりやすい回答を心がけてください。";

/// Rendered in place of any plate field the reader did not recognise.
pub const UNKNOWN_FIELD: &str = "不明";

/// Context fed to the assembler, already merged from request and session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    pub license_plate: Option<LicensePlate>,
    pub prior_messages: Vec<Message>,
}

impl PromptContext {
    /// Normalize caller-supplied context.
    ///
    /// History entries with a missing or unrecognised role become `user`;
    /// missing content becomes the empty string.
    pub fn from_chat_context(context: &ChatContext) -> Self {
        Self {
            license_plate: context.license_plate.clone(),
            prior_messages: context
                .conversation_history
                .iter()
                .map(history_entry_to_message)
                .collect(),
        }
    }

    /// True when there is nothing beyond the base instruction to add.
    pub fn is_empty(&self) -> bool {
        self.plate().is_none() && self.prior_messages.is_empty()
    }

    fn plate(&self) -> Option<&LicensePlate> {
        self.license_plate.as_ref().filter(|p| !p.is_empty())
    }
}

fn history_entry_to_message(entry: &HistoryEntry) -> Message {
    let role = entry
        .role
        .as_deref()
        .and_then(|r| r.parse::<MessageRole>().ok())
        .unwrap_or(MessageRole::User);
    Message::new(role, entry.content.clone().unwrap_or_default())
}

/// Stateless prompt assembler.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Build the system prompt, appending the plate block when a plate is known.
    pub fn build_system_prompt(plate: Option<&LicensePlate>) -> String {
        let Some(plate) = plate.filter(|p| !p.is_empty()) else {
            return BASE_INSTRUCTION.to_string();
        };

        let field = |value: &Option<String>| value.as_deref().unwrap_or(UNKNOWN_FIELD).to_string();
        let confidence = plate.confidence.unwrap_or(0.0);

        format!(
            "{BASE_INSTRUCTION}\n\
             現在認識されているナンバープレート情報:\n\
             - 地名: {region}\n\
             - 分類番号: {classification}\n\
             - ひらがな: {hiragana}\n\
             - 一連番号: {serial}\n\
             - 完全なナンバー: {full_text}\n\
             - 認識信頼度: {confidence}%\n\
             \n\
             この情報を参考にして、ユーザーの質問に答えてください。",
            region = field(&plate.region),
            classification = field(&plate.classification_number),
            hiragana = field(&plate.hiragana),
            serial = field(&plate.serial_number),
            full_text = field(&plate.full_text),
        )
    }

    /// Assemble the full message list for one completion call.
    pub fn build_messages(message: &str, context: Option<&PromptContext>) -> Vec<Message> {
        let prior = context.map(|c| c.prior_messages.as_slice()).unwrap_or(&[]);
        let mut messages = Vec::with_capacity(prior.len() + 2);

        messages.push(Message::system(Self::build_system_prompt(
            context.and_then(PromptContext::plate),
        )));
        messages.extend(prior.iter().cloned());
        messages.push(Message::user(message));
        messages
    }
}
