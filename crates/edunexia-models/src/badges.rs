//! Display badges.
//!
//! Every role scope and role kind maps to exactly one badge through an
//! exhaustive `match`, so adding a variant without a rendering rule fails to
//! compile.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Purple,
    Blue,
    Green,
    Amber,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Badge {
    pub label: &'static str,
    pub color: BadgeColor,
}

impl Badge {
    pub const fn new(label: &'static str, color: BadgeColor) -> Self {
        Self { label, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_serializes_lowercase_color() {
        let json = serde_json::to_value(Badge::new("Polo", BadgeColor::Green)).unwrap();
        assert_eq!(json["label"], "Polo");
        assert_eq!(json["color"], "green");
    }
}
