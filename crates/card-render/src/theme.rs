//! Card themes and palettes.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::layout::CardLayout;

/// Visual treatment of a card. Both themes print the same fields in the
/// same order; they differ in geometry constants and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTheme {
    #[default]
    Classic,
    Premium,
}

impl CardTheme {
    pub const ALL: [CardTheme; 2] = [CardTheme::Classic, CardTheme::Premium];

    pub fn layout(self) -> &'static CardLayout {
        match self {
            Self::Classic => &CardLayout::CLASSIC,
            Self::Premium => &CardLayout::PREMIUM,
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Classic => &Palette::CLASSIC,
            Self::Premium => &Palette::PREMIUM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for CardTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardTheme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "premium" => Ok(Self::Premium),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown card theme `{0}` (expected classic or premium)")]
pub struct UnknownTheme(pub String);

/// Colors used by one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Vertical background gradient (top, bottom).
    pub background: [Rgba<u8>; 2],
    /// Optional diagonal wash painted over the background.
    pub background_wash: Option<[Rgba<u8>; 2]>,
    /// Translucent decorative circles behind the card.
    pub decoration: Rgba<u8>,
    /// Card body.
    pub card: Rgba<u8>,
    /// Header band gradient (left, right).
    pub header: [Rgba<u8>; 2],
    pub title: Rgba<u8>,
    pub subtitle: Rgba<u8>,
    /// Photo border and corner accents.
    pub accent: Rgba<u8>,
    /// Ring drawn around the photo border; fully transparent disables it.
    pub halo: Rgba<u8>,
    pub placeholder: Rgba<u8>,
    pub label: Rgba<u8>,
    pub value: Rgba<u8>,
    /// Backing behind each detail row.
    pub row_card: Rgba<u8>,
    pub muted: Rgba<u8>,
    pub footer: Rgba<u8>,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 0xff])
}

const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

const TRANSPARENT: Rgba<u8> = rgba(0, 0, 0, 0);

impl Palette {
    pub const CLASSIC: Palette = Palette {
        background: [rgb(0x66, 0x7e, 0xea), rgb(0x76, 0x4b, 0xa2)],
        background_wash: None,
        decoration: TRANSPARENT,
        card: rgb(0xff, 0xff, 0xff),
        header: [rgb(0x66, 0x7e, 0xea), rgb(0x76, 0x4b, 0xa2)],
        title: rgb(0xff, 0xff, 0xff),
        subtitle: rgb(0x66, 0x7e, 0xea),
        accent: rgb(0x66, 0x7e, 0xea),
        halo: TRANSPARENT,
        placeholder: rgb(0xe0, 0xe0, 0xe0),
        label: rgb(0x66, 0x7e, 0xea),
        value: rgb(0x33, 0x33, 0x33),
        row_card: TRANSPARENT,
        muted: rgb(0x66, 0x66, 0x66),
        footer: rgb(0x66, 0x7e, 0xea),
    };

    pub const PREMIUM: Palette = Palette {
        background: [rgb(0x0f, 0x20, 0x27), rgb(0x2c, 0x53, 0x64)],
        background_wash: Some([rgba(0xd4, 0xaf, 0x37, 0x48), rgba(0xd4, 0xaf, 0x37, 0x00)]),
        decoration: rgba(0xff, 0xff, 0xff, 0x30),
        card: rgba(0xfd, 0xfb, 0xf5, 0xf5),
        header: [rgb(0x1c, 0x1c, 0x3c), rgb(0x3a, 0x3a, 0x6e)],
        title: rgb(0xf5, 0xd7, 0x7a),
        subtitle: rgb(0xb8, 0x90, 0x2f),
        accent: rgb(0xc9, 0xa2, 0x27),
        halo: rgba(0xc9, 0xa2, 0x27, 0x46),
        placeholder: rgb(0xd9, 0xd4, 0xc7),
        label: rgb(0x1c, 0x1c, 0x3c),
        value: rgb(0x2b, 0x2b, 0x2b),
        row_card: rgba(0xc9, 0xa2, 0x27, 0x1c),
        muted: rgb(0x6b, 0x6b, 0x6b),
        footer: rgb(0xf5, 0xd7, 0x7a),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parsing_is_case_insensitive() {
        assert_eq!("Premium".parse::<CardTheme>(), Ok(CardTheme::Premium));
        assert_eq!(" classic ".parse::<CardTheme>(), Ok(CardTheme::Classic));
        assert!("gold".parse::<CardTheme>().is_err());
    }

    #[test]
    fn test_theme_round_trips_through_display() {
        for theme in CardTheme::ALL {
            assert_eq!(theme.to_string().parse::<CardTheme>(), Ok(theme));
        }
    }
}
