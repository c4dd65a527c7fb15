//! Typed cheat codes.

use bulwark_core::constants::CHEAT_BUFFER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatCode {
    /// Grant wood.
    GimmeWood,
    /// Grant crystals.
    Shinies,
    /// End the current intermission.
    NextWave,
    /// Kill every enemy without reward.
    Smite,
}

impl CheatCode {
    pub const ALL: [CheatCode; 4] = [
        CheatCode::GimmeWood,
        CheatCode::Shinies,
        CheatCode::NextWave,
        CheatCode::Smite,
    ];

    pub fn word(self) -> &'static str {
        match self {
            CheatCode::GimmeWood => "gimmewood",
            CheatCode::Shinies => "shinies",
            CheatCode::NextWave => "nextwave",
            CheatCode::Smite => "smite",
        }
    }
}

/// The last few typed characters.
#[derive(Debug, Clone, Default)]
pub struct CheatBuffer {
    typed: String,
}

impl CheatBuffer {
    /// Append `ch`; returns the code completed by it, if any.
    pub fn push(&mut self, ch: char) -> Option<CheatCode> {
        self.typed.push(ch.to_ascii_lowercase());
        let excess = self.typed.chars().count().saturating_sub(CHEAT_BUFFER_LEN);
        if excess > 0 {
            self.typed = self.typed.chars().skip(excess).collect();
        }

        let code = CheatCode::ALL
            .into_iter()
            .find(|code| self.typed.ends_with(code.word()))?;
        self.typed.clear();
        Some(code)
    }
}
