//! Coarse attentiveness states
//!
//! Fine-grained behavior labels produced by the analysis model are bucketed
//! into a small fixed set of core states. The states double as the chart's
//! categorical axis, so their order is fixed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse attentiveness state used as the timeline's categorical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoreState {
    /// Actively working: writing notes, raising a hand, reading
    #[serde(rename = "高度專注")]
    HighFocus,
    /// Attending to the teacher, board, or material
    #[serde(rename = "接收資訊")]
    ReceivingInformation,
    /// Off-task behavior
    #[serde(rename = "潛在分心")]
    PotentialDistraction,
    /// Resting, occluded, or no identifiable behavior
    #[serde(rename = "狀態不明/休息")]
    UnclearOrRest,
}

/// Static category table. Lookups are exact and case-sensitive.
pub const CATEGORY_TABLE: &[(&str, CoreState)] = &[
    ("筆記", CoreState::HighFocus),
    ("舉手", CoreState::HighFocus),
    ("身體前傾", CoreState::HighFocus),
    ("翻閱書本", CoreState::HighFocus),
    ("目視前方", CoreState::ReceivingInformation),
    ("目視黑板/老師", CoreState::ReceivingInformation),
    ("目視桌面/教材", CoreState::ReceivingInformation),
    ("坐姿直立", CoreState::ReceivingInformation),
    ("玩弄物品", CoreState::PotentialDistraction),
    ("目視他處", CoreState::PotentialDistraction),
    ("喝水/飲食", CoreState::PotentialDistraction),
    ("整理個人物品", CoreState::PotentialDistraction),
    ("低頭/伏案(非睡)", CoreState::PotentialDistraction),
    ("低頭", CoreState::PotentialDistraction),
    ("目視同學", CoreState::PotentialDistraction),
    ("趴睡", CoreState::PotentialDistraction),
    ("無明顯特定行為", CoreState::UnclearOrRest),
    ("被遮擋/無法判斷", CoreState::UnclearOrRest),
];

impl CoreState {
    /// Canonical axis order, independent of which states a report contains
    pub const ORDERED: [CoreState; 4] = [
        CoreState::HighFocus,
        CoreState::ReceivingInformation,
        CoreState::PotentialDistraction,
        CoreState::UnclearOrRest,
    ];

    /// Map a fine-grained behavior category; unknown categories are unclear/rest
    pub fn from_category(category: &str) -> CoreState {
        CATEGORY_TABLE
            .iter()
            .find(|(label, _)| *label == category)
            .map(|(_, state)| *state)
            .unwrap_or(CoreState::UnclearOrRest)
    }

    /// Display label (same as the serialized form)
    pub fn label(self) -> &'static str {
        match self {
            CoreState::HighFocus => "高度專注",
            CoreState::ReceivingInformation => "接收資訊",
            CoreState::PotentialDistraction => "潛在分心",
            CoreState::UnclearOrRest => "狀態不明/休息",
        }
    }

    /// Position on the categorical axis
    pub fn axis_index(self) -> usize {
        match self {
            CoreState::HighFocus => 0,
            CoreState::ReceivingInformation => 1,
            CoreState::PotentialDistraction => 2,
            CoreState::UnclearOrRest => 3,
        }
    }

    /// Axis labels in canonical order
    pub fn axis_labels() -> Vec<&'static str> {
        Self::ORDERED.iter().map(|s| s.label()).collect()
    }
}

impl fmt::Display for CoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        assert_eq!(CoreState::from_category("筆記"), CoreState::HighFocus);
        assert_eq!(
            CoreState::from_category("目視黑板/老師"),
            CoreState::ReceivingInformation
        );
        assert_eq!(
            CoreState::from_category("玩弄物品"),
            CoreState::PotentialDistraction
        );
        assert_eq!(
            CoreState::from_category("被遮擋/無法判斷"),
            CoreState::UnclearOrRest
        );
    }

    #[test]
    fn test_non_task_behaviors_are_distraction() {
        for category in crate::digest::NON_TASK_BEHAVIORS {
            assert_eq!(
                CoreState::from_category(category),
                CoreState::PotentialDistraction,
                "{}",
                category
            );
        }
    }

    #[test]
    fn test_unknown_category_is_unclear() {
        assert_eq!(CoreState::from_category("跳舞"), CoreState::UnclearOrRest);
        assert_eq!(CoreState::from_category(""), CoreState::UnclearOrRest);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        assert_eq!(CoreState::from_category(" 筆記"), CoreState::UnclearOrRest);
        assert_eq!(CoreState::from_category("低頭/伏案"), CoreState::UnclearOrRest);
    }

    #[test]
    fn test_table_has_no_duplicate_categories() {
        for (i, (label, _)) in CATEGORY_TABLE.iter().enumerate() {
            assert!(
                CATEGORY_TABLE[i + 1..].iter().all(|(other, _)| other != label),
                "duplicate category {label}"
            );
        }
    }

    #[test]
    fn test_axis_index_matches_order() {
        for (i, state) in CoreState::ORDERED.iter().enumerate() {
            assert_eq!(state.axis_index(), i);
        }
    }

    #[test]
    fn test_serialization_uses_label() {
        let json = serde_json::to_string(&CoreState::UnclearOrRest).unwrap();
        assert_eq!(json, "\"狀態不明/休息\"");

        let parsed: CoreState = serde_json::from_str("\"潛在分心\"").unwrap();
        assert_eq!(parsed, CoreState::PotentialDistraction);
    }
}
