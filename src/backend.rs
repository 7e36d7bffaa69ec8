//! The document backend the layout engine draws through.
//!
//! All coordinates are millimetres measured from the top-left corner of the
//! current page. Font sizes are points.

use crate::error::Error;
use crate::model::{Alignment, FontFamily, FontStyle, Photo};

/// A single line of text placed inside a box of `width` x `height`.
/// The backend positions the text within the box according to `align`.
#[derive(Clone, Copy, Debug)]
pub struct Cell<'a> {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: &'a str,
    pub align: Alignment,
    pub link: Option<&'a str>,
}

pub trait Backend {
    /// (width, height) of every page in mm.
    fn page_size(&self) -> (f32, f32);

    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    /// Make the regular, bold, italic and bold-italic variants of `family` available.
    fn register_family(&mut self, family: FontFamily) -> Result<(), Error>;

    fn set_font(&mut self, family: FontFamily, style: FontStyle, size_pt: f32);

    /// Rendered width of `text` in mm under the current font.
    fn text_width(&mut self, text: &str) -> f32;

    /// Split `text` into lines no wider than `max_width` under the current font.
    fn split_lines(&mut self, text: &str, max_width: f32) -> Vec<String> {
        split_to_width(text, max_width, |s| self.text_width(s))
    }

    fn set_text_color(&mut self, rgb: [u8; 3]);

    fn cell(&mut self, cell: Cell<'_>);

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32);

    fn image(&mut self, photo: &Photo, x: f32, y: f32, width: f32, height: f32)
    -> Result<(), Error>;

    fn finish(self) -> Result<Vec<u8>, Error>;
}

/// Greedy word wrap. Words wider than `max_width` are broken between characters.
/// Always yields at least one line; a non-positive width yields the text unchanged.
pub fn split_to_width(
    text: &str,
    max_width: f32,
    mut measure: impl FnMut(&str) -> f32,
) -> Vec<String> {
    if max_width <= 0.0 {
        return vec![text.to_string()];
    }
    if !text.contains('\n') && measure(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
                continue;
            }
            // Word alone is too wide: hard-break it.
            for ch in word.chars() {
                current.push(ch);
                if measure(&current) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::split_to_width;

    fn mono(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn fitting_text_is_returned_verbatim() {
        assert_eq!(split_to_width("a  b", 10.0, mono), vec!["a  b"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(split_to_width("", 10.0, mono), vec![""]);
    }

    #[test]
    fn non_positive_width_skips_wrapping() {
        assert_eq!(split_to_width("one two three", 0.0, mono), vec!["one two three"]);
        assert_eq!(split_to_width("one two three", -5.0, mono), vec!["one two three"]);
    }

    #[test]
    fn greedy_word_wrap() {
        assert_eq!(
            split_to_width("one two three four", 9.0, mono),
            vec!["one two", "three", "four"]
        );
    }

    #[test]
    fn long_words_break_between_characters() {
        assert_eq!(
            split_to_width("abcdefghij xy", 4.0, mono),
            vec!["abcd", "efgh", "ij", "xy"]
        );
    }

    #[test]
    fn newlines_start_new_lines() {
        assert_eq!(split_to_width("ab\ncd", 10.0, mono), vec!["ab", "cd"]);
    }

    #[test]
    fn wrapped_lines_rewrap_to_themselves() {
        for line in split_to_width("the quick brown fox jumps over the lazy dog", 12.0, mono) {
            assert_eq!(split_to_width(&line, 12.0, mono), vec![line.clone()]);
        }
    }
}
