//! Shared UI icons and emojis.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[AUTH]");

// Entity indicators
pub static BUG: Emoji<'_, '_> = Emoji("🐞 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
pub static USERS: Emoji<'_, '_> = Emoji("👥 ", "");
