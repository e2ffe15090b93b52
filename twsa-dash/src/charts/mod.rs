//! Chart renderers
//!
//! Each renderer consumes one derived view and returns PNG bytes:
//! - [`ChartRenderer::render_category_chart`]: bar per sentiment label
//! - [`ChartRenderer::render_time_series_chart`]: line per label over dates
//! - [`ChartRenderer::render_word_chart`]: word cloud of the corpus
//!
//! Renderers are independent. One failing never prevents the others from
//! producing their image.

mod category;
pub mod fonts;
mod palette;
mod timeline;
pub mod wordcloud;

use base64::{engine::general_purpose, Engine as _};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;
use twsa_common::config::ChartConfig;

/// Rendering failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The view has nothing to draw
    #[error("Nothing to draw: {0} is empty")]
    EmptyView(&'static str),

    /// The corpus has text but no countable words (e.g. only stopwords)
    #[error("Corpus contains no countable words")]
    NoWords,

    /// Plotting backend failure
    #[error("Drawing failed: {0}")]
    Backend(String),

    /// PNG encoding failure
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

pub(crate) fn backend_error<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

/// Stateless chart factory
///
/// Text (titles, axis labels, legends, words) is only drawn when a chart
/// font could be registered. Without one, charts still render their shapes.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
    text: bool,
}

impl ChartRenderer {
    /// Renderer drawing text if a font from `config` or the system is available
    pub fn new(config: ChartConfig) -> Self {
        let text = fonts::ensure_font(config.font_path.as_deref());
        Self { config, text }
    }

    /// Renderer that never draws text
    pub fn without_text(config: ChartConfig) -> Self {
        Self { config, text: false }
    }

    pub fn draws_text(&self) -> bool {
        self.text
    }
}

/// Render into an RGB buffer and encode it as PNG
pub(crate) fn draw_png<F>(width: u32, height: u32, draw: F) -> Result<Vec<u8>, RenderError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), RenderError>,
{
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_error)?;
        draw(&root)?;
        root.present().map_err(backend_error)?;
    }
    encode_png(width, height, buffer)
}

/// Encode a packed RGB buffer as PNG
pub fn encode_png(width: u32, height: u32, rgb: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    let image = image::RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
        RenderError::Encode(format!("buffer does not match {}x{} canvas", width, height))
    })?;

    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut png, image::ImageOutputFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(png.into_inner())
}

/// `data:` URI embedding PNG bytes in an `img` `src` attribute
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_encode_png_signature_and_size() {
        let png = encode_png(4, 3, vec![255u8; 4 * 3 * 3]).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(png_dimensions(&png), (4, 3));
    }

    #[test]
    fn test_encode_png_rejects_wrong_buffer() {
        let err = encode_png(4, 3, vec![0u8; 5]).unwrap_err();
        assert!(matches!(err, RenderError::Encode(_)));
    }

    #[test]
    fn test_data_uri_prefix_and_payload() {
        let uri = to_data_uri(&[0x89, b'P', b'N', b'G']);
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_draw_png_blank_canvas() {
        let png = draw_png(20, 10, |_| Ok(())).unwrap();
        assert_eq!(png_dimensions(&png), (20, 10));
    }

    #[test]
    fn test_without_text_never_draws_text() {
        let renderer = ChartRenderer::without_text(ChartConfig::default());
        assert!(!renderer.draws_text());
    }
}
