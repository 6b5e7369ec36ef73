//! Reply keyboard markup for providers that render quick replies as buttons.

use serde::Serialize;

use crate::layout::{LayoutLimits, layout};

/// Row budget used for Telegram-style reply keyboards.
pub const REPLY_KEYBOARD_LIMITS: LayoutLimits = LayoutLimits::new(5, 30, 2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_contact: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_location: bool,
}

impl KeyboardButton {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: false,
            request_location: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    pub fn from_quick_replies<S: AsRef<str>>(replies: &[S]) -> Self {
        let keyboard = layout(replies, REPLY_KEYBOARD_LIMITS)
            .rows()
            .iter()
            .map(|row| row.iter().map(KeyboardButton::text).collect())
            .collect();
        Self {
            keyboard,
            resize_keyboard: true,
            one_time_keyboard: true,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn builds_one_time_keyboard() {
        let markup = ReplyKeyboardMarkup::from_quick_replies(&["Yes", r"Maybe\/Later", "No"]);
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "keyboard": [
                    [{"text": "Yes"}, {"text": "Maybe/Later"}],
                    [{"text": "No"}]
                ],
                "resize_keyboard": true,
                "one_time_keyboard": true
            })
        );
    }

    #[test]
    fn caps_at_five_rows() {
        let replies: Vec<String> = (0..14).map(|i| format!("reply {i}")).collect();
        let markup = ReplyKeyboardMarkup::from_quick_replies(&replies);
        assert_eq!(markup.keyboard.len(), 5);
        assert_eq!(markup.keyboard[4][1].text, "reply 9");
    }
}
