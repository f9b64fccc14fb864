use crate::schema::{Severity, Status};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub label: &'static str,
    pub color: &'static str,
    pub gradient: (&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityStyle {
    pub gradient: (&'static str, &'static str),
}

impl Status {
    pub fn style(self) -> StatusStyle {
        match self {
            Status::Unresolved => StatusStyle {
                label: "Unresolved",
                color: "#ef4444",
                gradient: ("#f87171", "#fca5a5"),
            },
            Status::InProgress => StatusStyle {
                label: "In Progress",
                color: "#f97316",
                gradient: ("#fbbf24", "#fde68a"),
            },
            Status::Resolved => StatusStyle {
                label: "Resolved",
                color: "#22c55e",
                gradient: ("#22c55e", "#86efac"),
            },
        }
    }
}

impl Severity {
    pub fn style(self) -> SeverityStyle {
        match self {
            Severity::High => SeverityStyle {
                gradient: ("#f87171", "#fca5a5"),
            },
            Severity::Medium => SeverityStyle {
                gradient: ("#fbbf24", "#fde68a"),
            },
            Severity::Low => SeverityStyle {
                gradient: ("#10b981", "#6ee7b7"),
            },
        }
    }
}

const CATEGORY_PALETTE: [&str; 4] = ["#3b82f6", "#06b6d4", "#f59e0b", "#ef4444"];

/// Colour for the `index`-th slice of the category breakdown; wraps around.
pub fn category_color(index: usize) -> &'static str {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

/// `#rrggbb` to an RGB triple.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
