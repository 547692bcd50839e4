//! Pure rendering of a stored post into the Telegram HTML alert.
//! No I/O here; the dispatcher decides what to do with the output.

use chrono::Utc;

use super::Button;
use crate::model::{Analysis, Post};

/// Tweet bodies longer than this are truncated with an ellipsis.
const BODY_CAP: usize = 200;

/// Render the rich-text alert for a classified post. Always returns a
/// non-empty string naming the token symbol; a post without analysis
/// renders with the neutral placeholder fields.
pub fn format_notification(post: &Post) -> String {
    let fallback;
    let analysis: &Analysis = match &post.analysis {
        Some(a) => a,
        None => {
            fallback = Analysis::fallback();
            &fallback
        }
    };

    let symbol = display_or(&post.token_symbol, "Unknown token");
    let username = display_or(&post.twitter_username, "unknown");

    let mut msg = format!(
        "📊 <b>{symbol} Market Alert</b>\n\n\
         <b>Twitter account:</b> @{username}\n\
         <b>Event type:</b> {}\n\
         <b>Impact level:</b> {}\n\
         <b>Expected volatility:</b> {} (24H)\n\n\
         <b>Tweet:</b>\n<i>{}</i>\n\n\
         <b>Key factors:</b>\n",
        analysis.event_type,
        analysis.impact_level.label(),
        analysis.expected_volatility,
        truncate_body(&post.text),
    );

    for (i, factor) in analysis.key_factors.iter().take(3).enumerate() {
        msg.push_str(&format!("{}. {factor}\n", i + 1));
    }

    msg.push_str(&format!(
        "\n<b>Historical reference:</b>\n{}",
        analysis.historical_reference
    ));

    let now = Utc::now().format("%Y-%m-%d %H:%M:%S");
    msg.push_str(&format!("\n\n<i>Analyzed at: {now} UTC</i>"));

    if let Some(url) = original_tweet_url(post) {
        msg.push_str(&format!("\n\n<a href='{url}'>View original</a>"));
    }

    msg
}

/// Same message plus the action buttons: a view-original link when the deep
/// link exists, then either the caller's trading buttons or the default
/// exchange pair links for the token.
pub fn format_notification_with_buttons(
    post: &Post,
    trading_buttons: Option<Vec<Button>>,
) -> (String, Vec<Button>) {
    let message = format_notification(post);

    let mut buttons = Vec::new();
    if let Some(url) = original_tweet_url(post) {
        buttons.push(Button::new("View original", url));
    }

    // An empty caller list counts as "not supplied": defaults still apply.
    match trading_buttons {
        Some(extra) if !extra.is_empty() => buttons.extend(extra),
        _ if !post.token_symbol.is_empty() => {
            let symbol = &post.token_symbol;
            buttons.push(Button::new(
                format!("{symbol}/USDT Binance"),
                format!("https://www.binance.com/en/trade/{symbol}_USDT"),
            ));
            buttons.push(Button::new(
                format!("{symbol}/USDT OKX"),
                format!("https://www.okx.com/trade-spot/{}-usdt", symbol.to_lowercase()),
            ));
        }
        _ => {}
    }

    (message, buttons)
}

fn original_tweet_url(post: &Post) -> Option<String> {
    if post.tweet_id.is_empty() || post.twitter_username.is_empty() {
        return None;
    }
    Some(format!(
        "https://twitter.com/{}/status/{}",
        post.twitter_username, post.tweet_id
    ))
}

fn truncate_body(text: &str) -> String {
    if text.chars().count() <= BODY_CAP {
        return text.to_string();
    }
    let mut out: String = text.chars().take(BODY_CAP).collect();
    out.push_str("...");
    out
}

fn display_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
