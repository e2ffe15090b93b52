//! Word cloud
//!
//! Layout is separated from drawing so its guarantees can be checked without
//! decoding an image:
//! - font size is a non-decreasing function of word frequency
//! - placed words never overlap and stay inside the canvas
//! - a word that does not fit is dropped, never shrunk
//!
//! Placement starts each word at a random angle on a spiral around the
//! canvas center, so two renders of the same corpus differ in arrangement.

use super::fonts::FONT_FAMILY;
use super::palette::indexed_color;
use super::{backend_error, draw_png, ChartRenderer, RenderError};
use crate::pipeline::Corpus;
use once_cell::sync::Lazy;
use plotters::prelude::*;
use rand::Rng;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

/// Word tokens: a word character followed by word characters or apostrophes
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w[\w']+").expect("word pattern is valid"));

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORD_LIST.iter().copied().collect());

const STOPWORD_LIST: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers", "herself",
    "him", "himself", "his", "how", "how's", "however", "http", "https", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just",
    "k", "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not",
    "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours",
    "ourselves", "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd", "she'll",
    "she's", "should", "shouldn't", "since", "so", "some", "such", "than", "that", "that's",
    "the", "their", "theirs", "them", "themselves", "then", "there", "there's", "therefore",
    "these", "they", "they'd", "they'll", "they're", "they've", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll",
    "we're", "we've", "were", "weren't", "what", "what's", "when", "when's", "where",
    "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with", "won't",
    "would", "wouldn't", "www", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

/// Spiral growth in pixels per radian
const SPIRAL_STEP: f64 = 2.0;
/// Angle advanced per placement attempt
const ANGLE_STEP: f64 = 0.1;
/// Gap kept between neighbouring words
const PADDING: i32 = 2;
/// Glyph advance estimate as a fraction of the font size
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// A word positioned on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub frequency: usize,
    pub font_size: u32,
    /// Top-left corner
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        x < self.x + self.width as i32 + PADDING
            && self.x < x + width as i32 + PADDING
            && y < self.y + self.height as i32 + PADDING
            && self.y < y + height as i32 + PADDING
    }
}

/// Count words in `corpus`, most frequent first
///
/// Tokens are lowercased, a trailing `'s` is removed, stopwords and pure
/// numbers are dropped. Ties are broken alphabetically. At most `max_words`
/// entries are returned.
pub fn word_frequencies(corpus: &str, max_words: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in WORD_PATTERN.find_iter(corpus) {
        let lower = token.as_str().to_lowercase();
        let word = lower.strip_suffix("'s").unwrap_or(&lower);
        if word.chars().count() < 2
            || STOPWORDS.contains(word)
            || word.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }

    let mut frequencies: Vec<(String, usize)> = counts.into_iter().collect();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    frequencies.truncate(max_words);
    frequencies
}

/// Font size for a word seen `frequency` times when the top word is seen
/// `max_frequency` times
pub fn font_size(frequency: usize, max_frequency: usize, min_size: u32, max_size: u32) -> u32 {
    if max_frequency == 0 || max_size <= min_size {
        return min_size;
    }
    let ratio = frequency.min(max_frequency) as f64 / max_frequency as f64;
    min_size + ((max_size - min_size) as f64 * ratio).round() as u32
}

fn text_box(word: &str, size: u32) -> (u32, u32) {
    let chars = word.chars().count() as f64;
    let width = (chars * size as f64 * CHAR_WIDTH_RATIO).ceil() as u32;
    (width.max(1), size)
}

/// Place `frequencies` (most frequent first) on a `canvas` of (width, height)
pub fn layout_words<R: Rng>(
    frequencies: &[(String, usize)],
    canvas: (u32, u32),
    sizes: (u32, u32),
    rng: &mut R,
) -> Vec<PlacedWord> {
    let (canvas_w, canvas_h) = (canvas.0 as i32, canvas.1 as i32);
    let max_frequency = frequencies.iter().map(|(_, f)| *f).max().unwrap_or(0);
    let (cx, cy) = (canvas_w as f64 / 2.0, canvas_h as f64 / 2.0);
    let max_radius = (cx * cx + cy * cy).sqrt();
    let aspect = canvas_h as f64 / canvas_w.max(1) as f64;

    let mut placed: Vec<PlacedWord> = Vec::with_capacity(frequencies.len());
    // Smallest box that failed; anything at least as large fails too
    let mut smallest_failure: Option<(u32, u32)> = None;

    for (word, frequency) in frequencies {
        let size = font_size(*frequency, max_frequency, sizes.0, sizes.1);
        let (width, height) = text_box(word, size);
        if width as i32 > canvas_w || height as i32 > canvas_h {
            continue;
        }
        if matches!(smallest_failure, Some((fw, fh)) if width >= fw && height >= fh) {
            continue;
        }

        let start = rng.gen_range(0.0..TAU);
        let mut position = None;
        let mut t = 0.0;
        loop {
            let radius = SPIRAL_STEP * t;
            if radius > max_radius {
                break;
            }
            let angle = start + t;
            let x = (cx + radius * angle.cos() - width as f64 / 2.0).round() as i32;
            let y = (cy + radius * aspect * angle.sin() - height as f64 / 2.0).round() as i32;
            let inside = x >= 0
                && y >= 0
                && x + width as i32 <= canvas_w
                && y + height as i32 <= canvas_h;
            if inside && !placed.iter().any(|p| p.overlaps(x, y, width, height)) {
                position = Some((x, y));
                break;
            }
            t += ANGLE_STEP;
        }

        match position {
            Some((x, y)) => placed.push(PlacedWord {
                word: word.clone(),
                frequency: *frequency,
                font_size: size,
                x,
                y,
                width,
                height,
            }),
            None => {
                smallest_failure = Some(match smallest_failure {
                    Some((fw, fh)) if fw * fh <= width * height => (fw, fh),
                    _ => (width, height),
                })
            }
        }
    }

    placed
}

impl ChartRenderer {
    /// Word cloud layout for `frequencies` on the configured canvas
    pub fn word_layout(&self, frequencies: &[(String, usize)]) -> Vec<PlacedWord> {
        layout_words(
            frequencies,
            (self.config.wordcloud_width, self.config.wordcloud_height),
            (self.config.min_font_size, self.config.max_font_size),
            &mut rand::thread_rng(),
        )
    }

    /// Word cloud of the corpus, bigger words being more frequent
    pub fn render_word_chart(&self, corpus: &Corpus) -> Result<Vec<u8>, RenderError> {
        if corpus.is_blank() {
            return Err(RenderError::EmptyView("corpus"));
        }
        let frequencies = word_frequencies(corpus.as_str(), self.config.max_words);
        if frequencies.is_empty() {
            return Err(RenderError::NoWords);
        }
        let layout = self.word_layout(&frequencies);
        if layout.is_empty() {
            return Err(RenderError::NoWords);
        }
        let text = self.text;

        draw_png(
            self.config.wordcloud_width,
            self.config.wordcloud_height,
            |root| {
                for (rank, placed) in layout.iter().enumerate() {
                    let color = indexed_color(rank);
                    if text {
                        let style = (FONT_FAMILY, placed.font_size as f64)
                            .into_font()
                            .color(&color);
                        root.draw(&Text::new(placed.word.as_str(), (placed.x, placed.y), style))
                            .map_err(backend_error)?;
                    } else {
                        root.draw(&Rectangle::new(
                            [
                                (placed.x, placed.y),
                                (
                                    placed.x + placed.width as i32,
                                    placed.y + placed.height as i32,
                                ),
                            ],
                            color.mix(0.85).filled(),
                        ))
                        .map_err(backend_error)?;
                    }
                }
                Ok(())
            },
        )
    }
}
