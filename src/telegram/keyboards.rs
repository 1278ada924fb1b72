//! Telegram keyboard builders for hostwatch
//!
//! Provides pre-built inline keyboard layouts for:
//! - Main menu navigation
//! - The add-host flow (cancel / back)
//! - The paginated host list
//! - Host detail actions

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::database::Host;

/// Hosts shown per page of the host list
pub const HOSTS_PER_PAGE: usize = 8;

// === HELPER FUNCTIONS ===

/// Create a callback button
fn btn(text: &str, callback_data: &str) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.to_string(), callback_data.to_string())
}

// === MAIN MENU ===

/// Main menu keyboard with primary navigation options
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            btn("➕ Add host", "add:start"),
            btn("💻 My hosts", "menu:hosts"),
        ],
        vec![btn("⚙️ Settings", "menu:settings")],
    ])
}

/// Single "back to menu" button, used under info and error messages
pub fn menu_button() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![btn("◀️ Menu", "menu:main")]])
}

// === ADD-HOST FLOW ===

/// Cancel-only keyboard for the first onboarding prompt
pub fn cancel() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![btn("❌ Cancel", "add:cancel")]])
}

/// Cancel plus one step back; `back_data` selects which step to return to
pub fn cancel_and_back(back_data: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        btn("❌ Cancel", "add:cancel"),
        btn("⬅️ Back", back_data),
    ]])
}

// === HOST LIST ===

/// Paginated host list: up to eight host buttons (two per row), optional
/// prev/next navigation, and a menu button.
pub fn hosts_list(hosts: &[Host], page: usize) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = vec![];

    if hosts.is_empty() {
        rows.push(vec![btn("No hosts yet", "noop")]);
        rows.push(vec![btn("◀️ Menu", "menu:main")]);
        return InlineKeyboardMarkup::new(rows);
    }

    let total_pages = hosts.len().div_ceil(HOSTS_PER_PAGE);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * HOSTS_PER_PAGE;
    let end = (start + HOSTS_PER_PAGE).min(hosts.len());

    for chunk in hosts[start..end].chunks(2) {
        let row: Vec<InlineKeyboardButton> = chunk
            .iter()
            .map(|host| btn(&host.name, &format!("host:{}", host.id)))
            .collect();
        rows.push(row);
    }

    let mut nav = vec![];
    if page > 1 {
        nav.push(btn("⬅️ Prev", &format!("hosts:page:{}", page - 1)));
    }
    if page < total_pages {
        nav.push(btn("Next ➡️", &format!("hosts:page:{}", page + 1)));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }

    rows.push(vec![btn("◀️ Menu", "menu:main")]);
    InlineKeyboardMarkup::new(rows)
}

// === HOST DETAIL ===

/// Actions under a host detail view: trigger a fetch, or go back
pub fn host_actions(ip: &str, port: u16) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![btn("📡 Send request", &format!("fetch:{}:{}", ip, port))],
        vec![btn("◀️ Menu", "menu:main")],
    ])
}

// === SETTINGS ===

/// Settings menu with the short/full format toggle
pub fn settings_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![btn("🔄 Toggle info format", "settings:toggle")],
        vec![btn("◀️ Menu", "menu:main")],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(id: i64, name: &str) -> Host {
        Host {
            id,
            ip: format!("10.0.0.{}", id),
            port: 8080,
            name: name.to_string(),
            last_checked: None,
            owner_tg_id: 42,
        }
    }

    #[test]
    fn test_main_menu_structure() {
        let keyboard = main_menu();
        assert_eq!(keyboard.inline_keyboard.len(), 2);
        assert_eq!(keyboard.inline_keyboard[0].len(), 2);
    }

    #[test]
    fn test_empty_host_list_shows_placeholder() {
        let keyboard = hosts_list(&[], 1);
        assert_eq!(keyboard.inline_keyboard.len(), 2);
    }

    #[test]
    fn test_host_list_pagination_rows() {
        let hosts: Vec<Host> = (1..=10).map(|i| host(i, &format!("h{}", i))).collect();

        // Page 1: 8 hosts in 4 rows, a nav row, a menu row
        let keyboard = hosts_list(&hosts, 1);
        assert_eq!(keyboard.inline_keyboard.len(), 6);

        // Page 2: 2 hosts in 1 row, a nav row, a menu row
        let keyboard = hosts_list(&hosts, 2);
        assert_eq!(keyboard.inline_keyboard.len(), 3);

        // Out-of-range pages clamp instead of panicking
        let keyboard = hosts_list(&hosts, 99);
        assert_eq!(keyboard.inline_keyboard.len(), 3);
    }

    #[test]
    fn test_callback_data_length() {
        // Telegram limits callback data to 64 bytes; the longest data this
        // module can emit is a fetch target with a full IPv6 address
        let ip = "2001:0db8:85a3:0000:0000:8a2e:0370:7334";
        let callback = format!("fetch:{}:{}", ip, 65535u16);
        assert!(callback.len() <= 64);
    }
}
