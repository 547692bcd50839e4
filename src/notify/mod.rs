//! Alert formatting and delivery to the chat channel.

pub mod format;
pub mod telegram;

pub use format::{format_notification, format_notification_with_buttons};
pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use serde::Serialize;

/// One inline action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub text: String,
    pub url: String,
}

impl Button {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Group buttons two per row for the chat platform's inline keyboard.
pub fn pack_rows(buttons: &[Button]) -> Vec<Vec<Button>> {
    buttons.chunks(2).map(|row| row.to_vec()).collect()
}

/// Delivery seam the pipeline depends on. Implementations report success
/// as a boolean and never raise past this boundary.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str, buttons: Option<&[Button]>) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_rows_groups_two_per_row() {
        let b = |n: usize| Button::new(format!("b{n}"), format!("https://x.test/{n}"));
        assert!(pack_rows(&[]).is_empty());
        assert_eq!(pack_rows(&[b(1)]), vec![vec![b(1)]]);
        assert_eq!(pack_rows(&[b(1), b(2)]), vec![vec![b(1), b(2)]]);
        assert_eq!(
            pack_rows(&[b(1), b(2), b(3)]),
            vec![vec![b(1), b(2)], vec![b(3)]]
        );
    }
}
