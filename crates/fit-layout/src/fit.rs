//! Fit modes: how a source aspect ratio is mapped onto a target box.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseFitModeError;

/// Policy for mapping the source aspect ratio onto the target box.
///
/// Closed set; there is no custom mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitMode {
    /// Scale by the larger ratio so the target box is fully covered.
    /// The overflow is not cropped.
    #[default]
    Cover,
    /// Scale by the smaller ratio so the image fits inside the target box.
    Contain,
    /// Scale each axis independently to the target; aspect ratio is not kept.
    Fill,
    /// Like `Contain`, but never enlarges.
    MaxFit,
    /// Like `Contain`, but never shrinks.
    MinFit,
}

impl FitMode {
    pub const ALL: [FitMode; 5] = [
        FitMode::Cover,
        FitMode::Contain,
        FitMode::Fill,
        FitMode::MaxFit,
        FitMode::MinFit,
    ];

    /// Canonical token, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            FitMode::Cover => "cover",
            FitMode::Contain => "contain",
            FitMode::Fill => "fill",
            FitMode::MaxFit => "maxFit",
            FitMode::MinFit => "minFit",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitMode {
    type Err = ParseFitModeError;

    /// Accepts the camelCase tokens plus snake/kebab spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "cover" => Ok(FitMode::Cover),
            "contain" => Ok(FitMode::Contain),
            "fill" => Ok(FitMode::Fill),
            "maxfit" => Ok(FitMode::MaxFit),
            "minfit" => Ok(FitMode::MinFit),
            _ => Err(ParseFitModeError(s.to_string())),
        }
    }
}
