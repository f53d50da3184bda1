//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;
use unicode_segmentation::UnicodeSegmentation;

// Import localization
use crate::localization::{t_args_lang, t_lang};

// Import catalog types
use crate::db::Product;

/// Callback data of the "browse catalog" button
pub const CALLBACK_SHOW_PRODUCTS: &str = "show_products";
/// Callback data of the "ask AI" button
pub const CALLBACK_ASK_AI: &str = "ask_ai";

/// Telegram rejects messages longer than this many characters
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// The two-choice main menu
pub fn create_main_menu_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            t_lang("menu-browse-catalog", language_code),
            CALLBACK_SHOW_PRODUCTS,
        ),
        InlineKeyboardButton::callback(t_lang("menu-ask-ai", language_code), CALLBACK_ASK_AI),
    ]])
}

/// Format a price with two decimals, e.g. `$1200.00`
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// HTML mention of a Telegram user
pub fn format_user_mention(user_id: u64, full_name: &str) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user_id,
        html::escape(full_name)
    )
}

/// Format the catalog as an HTML listing
pub fn format_product_list(products: &[Product], language_code: Option<&str>) -> String {
    let mut result = format!("{}\n\n", t_lang("catalog-header", language_code));

    for product in products {
        result.push_str(&format!("<b>{}</b>\n", html::escape(&product.name)));
        result.push_str(&t_args_lang(
            "catalog-description",
            &[("description", html::escape(&product.description).as_str())],
            language_code,
        ));
        result.push('\n');
        result.push_str(&t_args_lang(
            "catalog-price",
            &[("price", format_price(product.price).as_str())],
            language_code,
        ));
        result.push('\n');
        if let Some(url) = product.image_url.as_deref().filter(|url| !url.is_empty()) {
            result.push_str(&t_args_lang(
                "catalog-image",
                &[("url", html::escape(url).as_str())],
                language_code,
            ));
            result.push('\n');
        }
        result.push('\n');
    }

    result.trim_end().to_string()
}

/// Split a message into chunks of at most `max_chars` characters.
///
/// Splits on line boundaries where possible; a single line longer than the
/// limit is cut between grapheme clusters.
pub fn split_long_message(message: &str, max_chars: usize) -> Vec<String> {
    if message.is_empty() {
        return Vec::new();
    }

    if message.chars().count() <= max_chars {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.lines() {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
                current_len = 0;
            }

            let mut chunk = String::new();
            let mut chunk_len = 0;
            for grapheme in line.graphemes(true) {
                let grapheme_len = grapheme.chars().count();
                if chunk_len + grapheme_len > max_chars {
                    parts.push(std::mem::take(&mut chunk));
                    chunk_len = 0;
                }
                chunk.push_str(grapheme);
                chunk_len += grapheme_len;
            }
            if !chunk.is_empty() {
                current = chunk;
                current_len = chunk_len;
            }
            continue;
        }

        // +1 for the newline joining it to the current chunk
        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed > max_chars {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1200.0), "$1200.00");
        assert_eq!(format_price(799.5), "$799.50");
        assert_eq!(format_price(0.0), "$0.00");
    }

    #[test]
    fn test_main_menu_has_two_buttons() {
        let keyboard = create_main_menu_keyboard(None);
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 2);
    }

    #[test]
    fn test_user_mention_escapes_name() {
        let mention = format_user_mention(7, "Tom & <Jerry>");
        assert_eq!(mention, "<a href=\"tg://user?id=7\">Tom &amp; &lt;Jerry&gt;</a>");
    }

    #[test]
    fn test_product_list_escapes_html() {
        let products = vec![Product {
            id: 1,
            name: "Cable <USB-C>".to_string(),
            description: "Fast & durable".to_string(),
            price: 9.99,
            image_url: None,
        }];
        let listing = format_product_list(&products, None);
        assert!(listing.contains("<b>Cable &lt;USB-C&gt;</b>"));
        assert!(listing.contains("Fast &amp; durable"));
        assert!(listing.contains("$9.99"));
        assert!(!listing.contains("Image:"));
    }

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_long_message("hello", 10), vec!["hello".to_string()]);
        assert!(split_long_message("", 10).is_empty());
    }

    #[test]
    fn test_split_on_lines() {
        let parts = split_long_message("aaaa\nbbbb\ncccc", 9);
        assert_eq!(parts, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn test_split_very_long_line() {
        let line = "ж".repeat(25);
        let parts = split_long_message(&line, 10);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|part| part.chars().count() <= 10));
        assert_eq!(parts.concat(), line);
    }
}
