//! Draw flags - annotations explaining why a pairing looks the way it does

use std::fmt;

use serde::{Deserialize, Serialize};

/// Annotation attached to a pairing or to a team within a pairing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DrawFlag {
    /// Random conflict avoidance ran out of swap attempts
    #[serde(rename = "max_swapped")]
    MaxSwapped,
    /// Swapped by one-up-one-down to avoid a history conflict
    #[serde(rename = "1u1d_hist")]
    OneUpOneDownHistory,
    /// Swapped by one-up-one-down to avoid an institution conflict
    #[serde(rename = "1u1d_inst")]
    OneUpOneDownInstitution,
    /// Swapped by one-up-one-down to accommodate another swap
    #[serde(rename = "1u1d_other")]
    OneUpOneDownOther,
    #[serde(rename = "bub_up_hist")]
    BubbleUpHistory,
    #[serde(rename = "bub_up_inst")]
    BubbleUpInstitution,
    #[serde(rename = "bub_up_accom")]
    BubbleUpAccommodate,
    #[serde(rename = "bub_dn_hist")]
    BubbleDownHistory,
    #[serde(rename = "bub_dn_inst")]
    BubbleDownInstitution,
    #[serde(rename = "bub_dn_accom")]
    BubbleDownAccommodate,
    /// A conflict in an intermediate bracket could not be bubbled away
    #[serde(rename = "no_bub_updn")]
    NoBubbleUpDown,
    /// Team was pulled up from a lower bracket
    #[serde(rename = "pullup")]
    Pullup,
}

impl DrawFlag {
    /// Every flag, in display order
    pub const ALL: [DrawFlag; 12] = [
        DrawFlag::MaxSwapped,
        DrawFlag::OneUpOneDownHistory,
        DrawFlag::OneUpOneDownInstitution,
        DrawFlag::OneUpOneDownOther,
        DrawFlag::BubbleUpHistory,
        DrawFlag::BubbleUpInstitution,
        DrawFlag::BubbleUpAccommodate,
        DrawFlag::BubbleDownHistory,
        DrawFlag::BubbleDownInstitution,
        DrawFlag::BubbleDownAccommodate,
        DrawFlag::NoBubbleUpDown,
        DrawFlag::Pullup,
    ];

    /// Short code used on the wire
    pub fn code(self) -> &'static str {
        match self {
            DrawFlag::MaxSwapped => "max_swapped",
            DrawFlag::OneUpOneDownHistory => "1u1d_hist",
            DrawFlag::OneUpOneDownInstitution => "1u1d_inst",
            DrawFlag::OneUpOneDownOther => "1u1d_other",
            DrawFlag::BubbleUpHistory => "bub_up_hist",
            DrawFlag::BubbleUpInstitution => "bub_up_inst",
            DrawFlag::BubbleUpAccommodate => "bub_up_accom",
            DrawFlag::BubbleDownHistory => "bub_dn_hist",
            DrawFlag::BubbleDownInstitution => "bub_dn_inst",
            DrawFlag::BubbleDownAccommodate => "bub_dn_accom",
            DrawFlag::NoBubbleUpDown => "no_bub_updn",
            DrawFlag::Pullup => "pullup",
        }
    }

    /// Human-readable description
    pub fn description(self) -> &'static str {
        match self {
            DrawFlag::MaxSwapped => "Too many swaps",
            DrawFlag::OneUpOneDownHistory => "One-up-one-down (history)",
            DrawFlag::OneUpOneDownInstitution => "One-up-one-down (institution)",
            DrawFlag::OneUpOneDownOther => "One-up-one-down (to accommodate)",
            DrawFlag::BubbleUpHistory => "Bubble up (history)",
            DrawFlag::BubbleUpInstitution => "Bubble up (institution)",
            DrawFlag::BubbleUpAccommodate => "Bubble up (to accommodate)",
            DrawFlag::BubbleDownHistory => "Bubble down (history)",
            DrawFlag::BubbleDownInstitution => "Bubble down (institution)",
            DrawFlag::BubbleDownAccommodate => "Bubble down (to accommodate)",
            DrawFlag::NoBubbleUpDown => "Can't bubble up/down",
            DrawFlag::Pullup => "Pull-up team",
        }
    }

    /// Look a flag up by its wire code
    pub fn from_code(code: &str) -> Option<DrawFlag> {
        Self::ALL.iter().copied().find(|flag| flag.code() == code)
    }
}

impl fmt::Display for DrawFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
