use std::str::FromStr;

use palette::Srgb;
use palette::rgb::FromHexError;

// ---------------------------------------------------------------------------
// Chart palette: dataset index → border colour
// ---------------------------------------------------------------------------

/// Fixed list of series colours, cycled by dataset index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPalette {
    colors: Vec<Srgb<u8>>,
}

impl ChartPalette {
    /// Blue, emerald, amber, red, violet.
    pub const DEFAULT_HEX: [&'static str; 5] =
        ["#2563eb", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

    /// Parse `#rrggbb` (or bare `rrggbb`) codes. An empty list is an error
    /// since there would be nothing to cycle through.
    pub fn from_hex_codes<S: AsRef<str>>(codes: &[S]) -> Result<Self, PaletteError> {
        if codes.is_empty() {
            return Err(PaletteError::Empty);
        }
        let colors = codes
            .iter()
            .map(|code| {
                Srgb::<u8>::from_str(code.as_ref().trim()).map_err(|source| PaletteError::Hex {
                    code: code.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ChartPalette { colors })
    }

    /// Colour for the dataset at `index`, formatted as lowercase `#rrggbb`.
    pub fn color_for(&self, index: usize) -> String {
        let rgb = self.colors[index % self.colors.len()];
        format!("#{rgb:x}")
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ChartPalette {
    fn default() -> Self {
        let colors = Self::DEFAULT_HEX
            .iter()
            .filter_map(|code| Srgb::<u8>::from_str(code).ok())
            .collect();
        ChartPalette { colors }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("palette must contain at least one colour")]
    Empty,
    #[error("'{code}' is not a hex colour: {source}")]
    Hex {
        code: String,
        #[source]
        source: FromHexError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_round_trips_hex() {
        let palette = ChartPalette::default();
        assert_eq!(palette.len(), 5);
        assert_eq!(palette.color_for(0), "#2563eb");
        assert_eq!(palette.color_for(4), "#8b5cf6");
    }

    #[test]
    fn colours_cycle_by_index() {
        let palette = ChartPalette::default();
        assert_eq!(palette.color_for(5), palette.color_for(0));
        assert_eq!(palette.color_for(7), "#f59e0b");
    }

    #[test]
    fn uppercase_and_bare_codes_are_normalised() {
        let palette = ChartPalette::from_hex_codes(&["#FF0000", "00ff00"]).unwrap();
        assert_eq!(palette.color_for(0), "#ff0000");
        assert_eq!(palette.color_for(1), "#00ff00");
    }

    #[test]
    fn invalid_codes_are_rejected() {
        assert!(matches!(
            ChartPalette::from_hex_codes::<&str>(&[]),
            Err(PaletteError::Empty)
        ));
        assert!(matches!(
            ChartPalette::from_hex_codes(&["not-a-colour"]),
            Err(PaletteError::Hex { .. })
        ));
    }
}
