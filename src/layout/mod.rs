mod contact;
mod sections;
mod text;

use crate::backend::{Backend, Cell};
use crate::error::Error;
use crate::model::{Alignment, FontFamily, FontStyle, Photo, ResumeDocument};

pub use contact::{ContactToken, break_contact_lines, contact_tokens, normalize_url, phone_url};
pub use sections::format_date_range;

use text::{TextFont, measure_width, wrap_to_width};

/// Left column narrower than this (mm) is treated as degenerate.
pub const MIN_LEFT_COLUMN_WIDTH: f32 = 60.0;
/// Share of the content width a degenerate left column falls back to.
pub const NARROW_LEFT_COLUMN_RATIO: f32 = 0.7;

/// Fixed template geometry in mm. One value governs the whole document.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub line_height: f32,
    pub section_spacing: f32,
    pub entry_spacing: f32,
    pub right_column_width: f32,
    pub skill_label_width: f32,
    pub name_line_height: f32,
    pub header_gap: f32,
    pub rule_width: f32,
    pub link_color: [u8; 3],
    pub photo_max_width: f32,
    pub photo_max_height: f32,
    pub photo_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin_left: 20.0,
            margin_right: 20.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            line_height: 5.5,
            section_spacing: 1.2,
            entry_spacing: 0.8,
            right_column_width: 52.0,
            skill_label_width: 40.0,
            name_line_height: 8.0,
            header_gap: 2.0,
            rule_width: 0.2,
            link_color: [0, 51, 153],
            photo_max_width: 24.0,
            photo_max_height: 28.0,
            photo_gap: 4.0,
        }
    }
}

const TEXT_COLOR: [u8; 3] = [0, 0, 0];

/// Write position. `page` is zero-based.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cursor {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) page: usize,
}

/// Horizontal band text is laid out in.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Band {
    pub(crate) x: f32,
    pub(crate) width: f32,
}

/// Per-render layout state: the backend, the geometry and the one mutable cursor.
pub(crate) struct Layout<'a, B: Backend> {
    backend: B,
    config: &'a LayoutConfig,
    family: FontFamily,
    base_size: f32,
    page_width: f32,
    page_height: f32,
    cursor: Cursor,
}

impl<'a, B: Backend> Layout<'a, B> {
    fn new(backend: B, config: &'a LayoutConfig, family: FontFamily, base_size: f32) -> Self {
        let (page_width, page_height) = backend.page_size();
        Self {
            backend,
            config,
            family,
            base_size,
            page_width,
            page_height,
            cursor: Cursor {
                x: config.margin_left,
                y: config.margin_top,
                page: 0,
            },
        }
    }

    pub(crate) fn config(&self) -> &'a LayoutConfig {
        self.config
    }

    pub(crate) fn base_size(&self) -> f32 {
        self.base_size
    }

    pub(crate) fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub(crate) fn content_width(&self) -> f32 {
        self.page_width - self.config.margin_left - self.config.margin_right
    }

    pub(crate) fn content_band(&self) -> Band {
        Band {
            x: self.cursor.x,
            width: self.content_width(),
        }
    }

    fn printable_bottom(&self) -> f32 {
        self.page_height - self.config.margin_bottom
    }

    pub(crate) fn font(&self, style: FontStyle, size: f32) -> TextFont {
        TextFont {
            family: self.family,
            style,
            size,
        }
    }

    pub(crate) fn draw_image(
        &mut self,
        photo: &Photo,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error> {
        self.backend.image(photo, x, y, width, height)
    }

    fn start_page(&mut self) {
        self.backend.add_page();
        self.cursor = Cursor {
            x: self.config.margin_left,
            y: self.config.margin_top,
            page: self.backend.page_count().saturating_sub(1),
        };
    }

    /// Start a new page when `needed` mm would cross the printable bottom.
    /// A block taller than a whole page is left to overflow rather than
    /// leaving an empty page behind.
    pub(crate) fn ensure_space(&mut self, needed: f32) {
        let at_top = self.cursor.y <= self.config.margin_top;
        if self.cursor.y + needed > self.printable_bottom() && !at_top {
            log::debug!(
                "page break: y={:.1}mm + {:.1}mm > {:.1}mm",
                self.cursor.y,
                needed,
                self.printable_bottom()
            );
            self.start_page();
        }
    }

    pub(crate) fn advance(&mut self, dy: f32) {
        self.cursor.y += dy;
    }

    /// Move the cursor down to at least `y` on the current page.
    pub(crate) fn advance_to(&mut self, y: f32) {
        self.cursor.y = self.cursor.y.max(y);
    }

    pub(crate) fn measure(&mut self, font: TextFont, text: &str) -> f32 {
        measure_width(&mut self.backend, font, text)
    }

    pub(crate) fn wrap(&mut self, font: TextFont, text: &str, max_width: f32) -> Vec<String> {
        wrap_to_width(&mut self.backend, font, text, max_width)
    }

    /// Draw one line of text at the cursor row without moving the cursor.
    pub(crate) fn draw_text(
        &mut self,
        font: TextFont,
        x: f32,
        width: f32,
        text: &str,
        align: Alignment,
        link: Option<&str>,
    ) {
        font.apply(&mut self.backend);
        self.backend.cell(Cell {
            x,
            y: self.cursor.y,
            width,
            height: self.config.line_height,
            text,
            align,
            link,
        });
    }

    pub(crate) fn write_wrapped_text(
        &mut self,
        text: &str,
        style: FontStyle,
        size: f32,
        align: Alignment,
    ) {
        let band = self.content_band();
        let font = self.font(style, size);
        let line_height = self.config.line_height;
        self.write_wrapped_in(text, font, align, band, line_height);
    }

    /// Wrap `text` to `band` and write it line by line, each line checked for space.
    pub(crate) fn write_wrapped_in(
        &mut self,
        text: &str,
        font: TextFont,
        align: Alignment,
        band: Band,
        line_height: f32,
    ) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        for line in self.wrap(font, text, band.width) {
            self.ensure_space(line_height);
            font.apply(&mut self.backend);
            self.backend.cell(Cell {
                x: band.x,
                y: self.cursor.y,
                width: band.width,
                height: line_height,
                text: &line,
                align,
                link: None,
            });
            self.cursor.y += line_height;
        }
    }

    /// Left label and right-aligned value, each wrapped to its own column.
    ///
    /// Both columns are wrapped first so the row height is known; the whole row
    /// then claims its space in one `ensure_space` call and is drawn on one page.
    pub(crate) fn write_two_column_row(&mut self, left: &str, right: &str, bold_left: bool) {
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() && right.is_empty() {
            return;
        }

        let content_width = self.content_width();
        let right_width = self.config.right_column_width;
        let mut left_width = content_width - right_width;
        if left_width < MIN_LEFT_COLUMN_WIDTH {
            left_width = content_width * NARROW_LEFT_COLUMN_RATIO;
        }

        let left_font = self.font(
            if bold_left { FontStyle::Bold } else { FontStyle::Regular },
            self.base_size,
        );
        let right_font = self.font(FontStyle::Regular, self.base_size);

        // Measure.
        let left_lines = if left.is_empty() {
            Vec::new()
        } else {
            self.wrap(left_font, left, left_width)
        };
        let right_lines = if right.is_empty() {
            Vec::new()
        } else {
            self.wrap(right_font, right, right_width)
        };
        let line_height = self.config.line_height;
        let row_height = left_lines.len().max(right_lines.len()) as f32 * line_height;

        // Draw.
        self.ensure_space(row_height);
        let top = self.cursor.y;
        let left_x = self.config.margin_left;
        let right_x = self.config.margin_left + content_width - right_width;

        left_font.apply(&mut self.backend);
        for (i, line) in left_lines.iter().enumerate() {
            self.backend.cell(Cell {
                x: left_x,
                y: top + i as f32 * line_height,
                width: left_width,
                height: line_height,
                text: line,
                align: Alignment::Left,
                link: None,
            });
        }
        right_font.apply(&mut self.backend);
        for (i, line) in right_lines.iter().enumerate() {
            self.backend.cell(Cell {
                x: right_x,
                y: top + i as f32 * line_height,
                width: right_width,
                height: line_height,
                text: line,
                align: Alignment::Right,
                link: None,
            });
        }
        self.cursor.y = top + row_height;
    }

    pub(crate) fn write_bullet(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let size = self.base_size;
        self.write_wrapped_text(&format!("- {text}"), FontStyle::Regular, size, Alignment::Left);
    }

    /// Uppercased bold title with a full-width rule under it.
    pub(crate) fn add_section_title(&mut self, title: &str) {
        let line_height = self.config.line_height;
        // Keep the title on the same page as at least one following line.
        self.ensure_space(line_height * 2.0);

        let font = self.font(FontStyle::Bold, self.base_size + 1.0);
        let band = self.content_band();
        self.draw_text(font, band.x, band.width, &title.to_uppercase(), Alignment::Left, None);
        self.cursor.y += line_height;

        let y = self.cursor.y;
        let rule_width = self.config.rule_width;
        self.backend
            .line(band.x, y, band.x + band.width, y, rule_width);
        self.cursor.y += self.config.section_spacing;
    }

    /// Bold `label:` in the fixed label column, value wrapped beside it.
    pub(crate) fn write_labeled_line(&mut self, label: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let label_width = self.config.skill_label_width;
        let value_width = self.content_width() - label_width;
        let label_font = self.font(FontStyle::Bold, self.base_size);
        let value_font = self.font(FontStyle::Regular, self.base_size);

        let label_lines = self.wrap(label_font, &format!("{label}:"), label_width);
        let value_lines = self.wrap(value_font, value, value_width);
        let line_height = self.config.line_height;
        let row_height = label_lines.len().max(value_lines.len()) as f32 * line_height;

        self.ensure_space(row_height);
        let top = self.cursor.y;
        let label_x = self.config.margin_left;
        let value_x = label_x + label_width;

        label_font.apply(&mut self.backend);
        for (i, line) in label_lines.iter().enumerate() {
            self.backend.cell(Cell {
                x: label_x,
                y: top + i as f32 * line_height,
                width: label_width,
                height: line_height,
                text: line,
                align: Alignment::Left,
                link: None,
            });
        }
        value_font.apply(&mut self.backend);
        for (i, line) in value_lines.iter().enumerate() {
            self.backend.cell(Cell {
                x: value_x,
                y: top + i as f32 * line_height,
                width: value_width,
                height: line_height,
                text: line,
                align: Alignment::Left,
                link: None,
            });
        }
        self.cursor.y = top + row_height;
    }

    pub(crate) fn set_link_color(&mut self, linked: bool) {
        let color = if linked {
            self.config.link_color
        } else {
            TEXT_COLOR
        };
        self.backend.set_text_color(color);
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        self.backend.finish()
    }
}

/// Lay out `doc` through `backend` and return the serialized document.
///
/// Sections are written in a fixed order: header, education, experience,
/// projects, technical skills. Empty sections are skipped.
pub fn render_into<B: Backend>(
    doc: &ResumeDocument,
    config: &LayoutConfig,
    mut backend: B,
) -> Result<Vec<u8>, Error> {
    let family = doc.settings.font_family;
    let base_size = doc.settings.font_size.base_size_pt();
    backend.register_family(family)?;

    let mut layout = Layout::new(backend, config, family, base_size);
    layout.start_page();
    layout.set_link_color(false);

    sections::write_header(&mut layout, doc)?;
    sections::write_education(&mut layout, &doc.education);
    sections::write_experience(&mut layout, &doc.experience);
    sections::write_projects(&mut layout, &doc.projects);
    sections::write_technical_skills(&mut layout, &doc.technical_skills);

    log::debug!(
        "layout finished on page {} at y={:.1}mm",
        layout.cursor().page + 1,
        layout.cursor().y
    );
    layout.finish()
}
