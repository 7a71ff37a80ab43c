use colored::Color;

pub const PRIMARY: Color = Color::BrightBlue;
pub const ACCENT: Color = Color::Cyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const TIMESTAMP: Color = Color::BrightBlack;
pub const INFO: Color = Color::BrightCyan;
pub const SUCCESS: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const DEBUG: Color = Color::Blue;

pub const SUBDOMAIN: Color = Color::Blue;
pub const LIVE: Color = Color::Green;
pub const JS_FILE: Color = Color::Yellow;
pub const VULN: Color = Color::Red;
pub const STAGE: Color = Color::BrightBlue;
