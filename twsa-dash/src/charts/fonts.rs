//! Chart font registration
//!
//! plotters draws text through ab_glyph and needs a TrueType font registered
//! under a family name. Registration happens at most once per process.

use once_cell::sync::OnceCell;
use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Family every chart uses for text
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceCell<Option<PathBuf>> = OnceCell::new();

/// Register the chart font if not done yet
///
/// `configured` is tried first, then well-known system locations. Returns
/// true when a font is registered and charts may draw text. The first call
/// decides for the lifetime of the process.
pub fn ensure_font(configured: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| register_first_usable(configured))
        .is_some()
}

fn register_first_usable(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if !path.exists() {
            warn!("Configured chart font not found: {}", path.display());
        }
    }

    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps a 'static reference to the font data
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!("Chart font: {}", path.display());
                return Some(path);
            }
            Err(_) => warn!("Ignoring unusable font file: {}", path.display()),
        }
    }

    warn!("No chart font available; charts will render without text");
    None
}
