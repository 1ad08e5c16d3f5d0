//! Element identities and their Active-slot grouping.

use serde::{Deserialize, Serialize};

/// Elemental attribute of a hit, bar or anomaly.
///
/// Discriminants are the stable element codes used in reports.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum ElementType {
    Physical = 0,
    Fire = 1,
    Ice = 2,
    Electric = 3,
    Ether = 4,
    /// Shares the Ice Active slot.
    Frost = 5,
    AuricInk = 6,
}

impl ElementType {
    pub const COUNT: usize = 7;

    pub const ALL: [ElementType; Self::COUNT] = [
        Self::Physical,
        Self::Fire,
        Self::Ice,
        Self::Electric,
        Self::Ether,
        Self::Frost,
        Self::AuricInk,
    ];

    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Logical Active slot. Ice and Frost are two codes for one slot.
    pub const fn slot(self) -> AnomalySlot {
        match self {
            Self::Physical => AnomalySlot::Physical,
            Self::Fire => AnomalySlot::Fire,
            Self::Ice | Self::Frost => AnomalySlot::Ice,
            Self::Electric => AnomalySlot::Electric,
            Self::Ether => AnomalySlot::Ether,
            Self::AuricInk => AnomalySlot::AuricInk,
        }
    }

    pub const fn shares_slot_with(self, other: ElementType) -> bool {
        self.slot() as u8 == other.slot() as u8
    }

    /// Name of the anomaly this element inflicts.
    pub const fn anomaly_name(self) -> &'static str {
        match self {
            Self::Physical => "assault",
            Self::Fire => "burn",
            Self::Ice => "shatter",
            Self::Electric => "shock",
            Self::Ether => "corruption",
            Self::Frost => "frost_shatter",
            Self::AuricInk => "auric_corruption",
        }
    }
}

/// One logical Active position on the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AnomalySlot {
    Physical,
    Fire,
    Ice,
    Electric,
    Ether,
    AuricInk,
}
