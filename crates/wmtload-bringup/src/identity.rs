use serde::Serialize;

/// What detection learned about the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChipIdentity {
    /// Id read back from the driver, truncated to 32 bits.
    pub raw_chip_id: u32,
    /// Chip type after applying the driver's acknowledgement to the rule table.
    pub resolved_chip_type: Option<u32>,
    /// The chip is integrated into the SoC rather than an external combo chip.
    pub is_soc_integrated: bool,
}

impl ChipIdentity {
    /// Identity built from a live launcher query when detection did not run.
    pub fn unresolved(raw_chip_id: u32) -> Self {
        Self {
            raw_chip_id,
            resolved_chip_type: None,
            is_soc_integrated: false,
        }
    }
}

/// Coarse partition of the set-chip-id acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Low,
    Middle,
    High,
}

impl Band {
    fn of(ack: i64) -> Self {
        if ack < 0x507 {
            Self::Low
        } else if ack < 0x690 {
            Self::Middle
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Type(u32),
    Unresolved,
}

struct ChipTypeRule {
    band: Band,
    acks: &'static [i64],
    outcome: Outcome,
}

/// Evaluated top to bottom; the first rule whose band and acknowledgement match wins.
/// No match keeps the raw chip id.
const CHIP_TYPE_RULES: &[ChipTypeRule] = &[
    ChipTypeRule {
        band: Band::Low,
        acks: &[0x321, 0x335, 0x337],
        outcome: Outcome::Type(0x6735),
    },
    ChipTypeRule {
        band: Band::Low,
        acks: &[0x326],
        outcome: Outcome::Type(0x6755),
    },
    ChipTypeRule {
        band: Band::Low,
        acks: &[-1],
        outcome: Outcome::Unresolved,
    },
    ChipTypeRule {
        band: Band::Low,
        acks: &[0x279],
        outcome: Outcome::Type(0x6797),
    },
    ChipTypeRule {
        band: Band::Middle,
        acks: &[0x507],
        outcome: Outcome::Type(0x6759),
    },
    ChipTypeRule {
        band: Band::Middle,
        acks: &[0x551],
        outcome: Outcome::Type(0x6757),
    },
    ChipTypeRule {
        band: Band::High,
        acks: &[0x690],
        outcome: Outcome::Type(0x6763),
    },
    ChipTypeRule {
        band: Band::High,
        acks: &[0x713],
        outcome: Outcome::Type(0x6775),
    },
    ChipTypeRule {
        band: Band::High,
        acks: &[0x788],
        outcome: Outcome::Type(0x6771),
    },
];

/// Map the driver's reply to set-chip-id onto a chip type.
///
/// `None` means the driver rejected the id (`-1`); the caller skips module
/// re-initialization in that case.
pub fn resolve_chip_type(ack: i64, raw_chip_id: u32) -> Option<u32> {
    let band = Band::of(ack);
    let rule = CHIP_TYPE_RULES
        .iter()
        .find(|rule| rule.band == band && rule.acks.contains(&ack));

    match rule.map(|rule| rule.outcome) {
        Some(Outcome::Type(chip_type)) => Some(chip_type),
        Some(Outcome::Unresolved) => None,
        None => Some(raw_chip_id),
    }
}
