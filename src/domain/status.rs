// Machine status classification
//
// Upstream status strings are free text with no documented vocabulary. The
// rules below run in order and the first match wins, so their precedence is
// part of the contract.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const STATUS_UNKNOWN: &str = "Status Unknown";

static MINUTES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+)\s*min").expect("valid minutes pattern"));

/// Semantic state a machine's raw status is normalized into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum StatusCategory {
    Available,
    InUse,
    FinishingSoon,
    CycleFinished,
    OutOfOrder,
    Unknown,
    /// Unrecognized upstream text, title-cased
    Other(String),
}

impl StatusCategory {
    /// Available and CycleFinished end a reminder
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusCategory::Available | StatusCategory::CycleFinished)
    }

    /// A machine is mid-cycle, so a reminder makes sense
    pub fn is_running(&self) -> bool {
        matches!(self, StatusCategory::InUse | StatusCategory::FinishingSoon)
    }

    pub fn label(&self) -> &str {
        match self {
            StatusCategory::Available => "Available",
            StatusCategory::InUse => "In Use",
            StatusCategory::FinishingSoon => "Finishing Soon",
            StatusCategory::CycleFinished => "Cycle Finished",
            StatusCategory::OutOfOrder => "Out of Order",
            StatusCategory::Unknown => STATUS_UNKNOWN,
            StatusCategory::Other(text) => text,
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            StatusCategory::Available => Presentation {
                icon: StatusIcon::CheckCircle,
                text_color: "text-green-700 dark:text-green-400",
                bg_color: "bg-green-100 dark:bg-green-900",
                border_color: "border-green-500",
                color_hex: "#22c55e",
            },
            StatusCategory::OutOfOrder => Presentation {
                icon: StatusIcon::XCircle,
                text_color: "text-red-700 dark:text-red-400",
                bg_color: "bg-red-100 dark:bg-red-900",
                border_color: "border-red-500",
                color_hex: "#ef4444",
            },
            StatusCategory::CycleFinished => Presentation {
                icon: StatusIcon::CheckCircle,
                text_color: "text-teal-700 dark:text-teal-400",
                bg_color: "bg-teal-100 dark:bg-teal-900",
                border_color: "border-teal-500",
                color_hex: "#14b8a6",
            },
            StatusCategory::FinishingSoon => Presentation {
                icon: StatusIcon::Clock,
                text_color: "text-yellow-700 dark:text-yellow-400",
                bg_color: "bg-yellow-100 dark:bg-yellow-900",
                border_color: "border-yellow-500",
                color_hex: "#eab308",
            },
            StatusCategory::InUse => Presentation {
                icon: StatusIcon::Zap,
                text_color: "text-blue-700 dark:text-blue-400",
                bg_color: "bg-blue-100 dark:bg-blue-900",
                border_color: "border-blue-500",
                color_hex: "#3b82f6",
            },
            StatusCategory::Unknown | StatusCategory::Other(_) => Presentation {
                icon: StatusIcon::AlertTriangle,
                text_color: "text-gray-700 dark:text-gray-400",
                bg_color: "bg-gray-100 dark:bg-gray-900",
                border_color: "border-gray-400",
                color_hex: "#6b7280",
            },
        }
    }
}

/// Symbolic icon; the renderer maps it to an actual glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusIcon {
    CheckCircle,
    XCircle,
    Clock,
    Zap,
    AlertTriangle,
}

/// Static styling attached to each category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub icon: StatusIcon,
    pub text_color: &'static str,
    pub bg_color: &'static str,
    pub border_color: &'static str,
    pub color_hex: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: StatusCategory,
    pub display_label: String,
    pub remaining_time_text: String,
    pub presentation: Presentation,
}

impl ClassificationResult {
    fn new(category: StatusCategory, remaining_time_text: String) -> Self {
        Self {
            display_label: category.label().to_string(),
            presentation: category.presentation(),
            category,
            remaining_time_text,
        }
    }

    /// Large text on a machine card: the countdown while running, else the label
    pub fn primary_text(&self) -> &str {
        if self.category.is_running() && !self.remaining_time_text.is_empty() {
            &self.remaining_time_text
        } else {
            &self.display_label
        }
    }

    /// The label, shown under the countdown when the countdown is primary
    pub fn secondary_text(&self) -> Option<&str> {
        if self.primary_text() == self.display_label {
            None
        } else {
            Some(&self.display_label)
        }
    }
}

/// Classify a raw upstream status. Total: every input yields a result.
pub fn classify(raw_status: Option<&str>, minutes_remaining: Option<i64>) -> ClassificationResult {
    let trimmed = raw_status.unwrap_or_default().trim();
    if trimmed.is_empty() {
        return ClassificationResult::new(StatusCategory::Unknown, String::new());
    }

    let lower = trimmed.to_lowercase();
    let contains_any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if lower.contains("available") {
        return ClassificationResult::new(StatusCategory::Available, String::new());
    }
    if contains_any(&["out of order", "service", "offline"]) {
        return ClassificationResult::new(StatusCategory::OutOfOrder, String::new());
    }
    if contains_any(&["eoc", "cycle finished", "complete", "cycle complete"]) {
        return ClassificationResult::new(StatusCategory::CycleFinished, String::new());
    }

    // Only the first numeral group counts; it picks the category, while the
    // in-use countdown comes from the separate minutes field.
    match parse_minutes_token(trimmed) {
        Some(minutes) if minutes > 0 && minutes <= 5 => {
            return ClassificationResult::new(
                StatusCategory::FinishingSoon,
                format_duration(Some(minutes as i64)),
            );
        }
        Some(minutes) if minutes > 5 => {
            return ClassificationResult::new(
                StatusCategory::InUse,
                format_duration(minutes_remaining),
            );
        }
        _ => {}
    }

    if lower.contains("in use") {
        return ClassificationResult::new(StatusCategory::InUse, format_duration(minutes_remaining));
    }

    if trimmed != "Unknown" {
        return ClassificationResult::new(StatusCategory::Other(title_case(trimmed)), String::new());
    }

    ClassificationResult::new(StatusCategory::Unknown, String::new())
}

/// "2h 5m" / "45m"; empty for absent or non-positive values
pub fn format_duration(minutes: Option<i64>) -> String {
    match minutes {
        Some(total) if total > 0 => {
            let hours = total / 60;
            let mins = total % 60;
            if hours > 0 {
                format!("{}h {}m", hours, mins)
            } else {
                format!("{}m", mins)
            }
        }
        _ => String::new(),
    }
}

fn parse_minutes_token(status: &str) -> Option<u64> {
    let digits = MINUTES_PATTERN.captures(status)?.get(1)?.as_str();
    // Digits only, so the sole failure is overflow: treat as a long cycle
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// Uppercase the first character of every ASCII word, leaving the rest as is
fn title_case(text: &str) -> String {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut prev_is_word = false;

    text.chars()
        .map(|c| {
            let out = if is_word(c) && !prev_is_word {
                c.to_ascii_uppercase()
            } else {
                c
            };
            prev_is_word = is_word(c);
            out
        })
        .collect()
}
