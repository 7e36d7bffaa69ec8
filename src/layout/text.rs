use crate::backend::Backend;
use crate::model::{FontFamily, FontStyle};

/// Font state a measurement is taken under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextFont {
    pub(crate) family: FontFamily,
    pub(crate) style: FontStyle,
    pub(crate) size: f32,
}

impl TextFont {
    pub(crate) fn apply<B: Backend>(self, backend: &mut B) {
        backend.set_font(self.family, self.style, self.size);
    }
}

/// Width of `text` in mm under `font`.
pub(crate) fn measure_width<B: Backend>(backend: &mut B, font: TextFont, text: &str) -> f32 {
    font.apply(backend);
    backend.text_width(text)
}

/// Lines of `text` no wider than `max_width` under `font`; never empty.
pub(crate) fn wrap_to_width<B: Backend>(
    backend: &mut B,
    font: TextFont,
    text: &str,
    max_width: f32,
) -> Vec<String> {
    if max_width <= 0.0 {
        return vec![text.to_string()];
    }
    font.apply(backend);
    let lines = backend.split_lines(text, max_width);
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
