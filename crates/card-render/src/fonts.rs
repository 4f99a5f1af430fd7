//! TrueType font discovery and loading.

use std::fmt;
use std::path::{Path, PathBuf};

use campuscard_common::FontPaths;
use rusttype::{point, Font, Scale};

use crate::scene::FontFace;

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const ITALIC_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
    "/Library/Fonts/Arial Italic.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

/// A loaded font together with the file it came from.
pub struct LoadedFont {
    pub path: PathBuf,
    pub font: Font<'static>,
}

impl fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFont").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Fonts available to the rasterizer. Bold and italic fall back to the
/// regular face; with no regular face, text is not drawn.
#[derive(Debug, Default)]
pub struct FontSet {
    regular: Option<LoadedFont>,
    bold: Option<LoadedFont>,
    italic: Option<LoadedFont>,
}

impl FontSet {
    /// A set with no fonts. Scenes still rasterize, without text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load configured fonts, falling back to well-known system paths.
    pub fn load(paths: &FontPaths) -> Self {
        let set = Self {
            regular: load_face(paths.regular.as_deref(), REGULAR_CANDIDATES),
            bold: load_face(paths.bold.as_deref(), BOLD_CANDIDATES),
            italic: load_face(paths.italic.as_deref(), ITALIC_CANDIDATES),
        };
        if set.regular.is_none() {
            tracing::warn!("No usable regular font found; card text will not be drawn");
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_none()
    }

    /// Font used for a face, after fallback.
    pub fn face(&self, face: FontFace) -> Option<&Font<'static>> {
        self.loaded(face).map(|loaded| &loaded.font)
    }

    /// File backing a face, after fallback.
    pub fn source(&self, face: FontFace) -> Option<&Path> {
        self.loaded(face).map(|loaded| loaded.path.as_path())
    }

    fn loaded(&self, face: FontFace) -> Option<&LoadedFont> {
        let preferred = match face {
            FontFace::Regular => None,
            FontFace::Bold => self.bold.as_ref(),
            FontFace::Italic => self.italic.as_ref(),
        };
        preferred.or(self.regular.as_ref())
    }
}

fn load_face(explicit: Option<&Path>, candidates: &[&str]) -> Option<LoadedFont> {
    if let Some(path) = explicit {
        match read_font(path) {
            Some(font) => return Some(font),
            None => tracing::warn!(path = %path.display(), "Configured font is unusable"),
        }
    }
    candidates
        .iter()
        .map(Path::new)
        .filter(|path| path.exists())
        .find_map(read_font)
}

fn read_font(path: &Path) -> Option<LoadedFont> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path = %path.display(), "Cannot read font: {e}");
            return None;
        }
    };
    let font = Font::try_from_vec(bytes)?;
    tracing::debug!(path = %path.display(), "Loaded font");
    Some(LoadedFont {
        path: path.to_path_buf(),
        font,
    })
}

/// Advance width of `text` at `size` pixels, including kerning.
pub fn text_width(font: &Font<'_>, size: f32, text: &str) -> f32 {
    font.layout(text, Scale::uniform(size), point(0.0, 0.0))
        .last()
        .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}
