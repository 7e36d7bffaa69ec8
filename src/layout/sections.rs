use crate::backend::Backend;
use crate::error::Error;
use crate::model::{
    Alignment, Education, Experience, FontStyle, Photo, Project, ResumeDocument, TechnicalSkills,
};

use super::Layout;
use super::contact::{contact_tokens, write_contact_line};

/// `"<start> - <end>"`, or whichever half is present.
pub fn format_date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (start, "") => start.to_string(),
        ("", end) => end.to_string(),
        (start, end) => format!("{start} - {end}"),
    }
}

/// Photo size in mm: the pixel aspect ratio fitted into the max box.
fn fit_photo(photo: &Photo, max_width: f32, max_height: f32) -> (f32, f32) {
    if photo.pixel_width == 0 || photo.pixel_height == 0 {
        return (max_width, max_height);
    }
    let (pw, ph) = (photo.pixel_width as f32, photo.pixel_height as f32);
    let scale = (max_width / pw).min(max_height / ph);
    (pw * scale, ph * scale)
}

pub(crate) fn write_header<B: Backend>(
    layout: &mut Layout<'_, B>,
    doc: &ResumeDocument,
) -> Result<(), Error> {
    let config = layout.config();
    let top = layout.cursor().y;
    let mut band = layout.content_band();
    let mut photo_bottom = top;

    if let Some(photo) = doc.photo.as_ref().filter(|_| doc.settings.show_photo) {
        let (width, height) = fit_photo(photo, config.photo_max_width, config.photo_max_height);
        let x = band.x + band.width - width;
        layout.draw_image(photo, x, top, width, height)?;
        log::debug!("photo placed at x={x:.1}mm, {width:.1}x{height:.1}mm");
        photo_bottom = top + height;
        band.width = (band.width - width - config.photo_gap).max(0.0);
    }

    let name = doc.personal_info.full_name();
    let name_font = layout.font(FontStyle::Bold, layout.base_size() + 5.0);
    layout.write_wrapped_in(&name, name_font, Alignment::Center, band, config.name_line_height);

    let tokens = contact_tokens(&doc.personal_info);
    write_contact_line(layout, &tokens, band);

    layout.advance_to(photo_bottom);
    layout.advance(config.header_gap);
    Ok(())
}

pub(crate) fn write_education<B: Backend>(layout: &mut Layout<'_, B>, entries: &[Education]) {
    if entries.is_empty() {
        return;
    }
    layout.add_section_title("Education");
    for entry in entries {
        layout.write_two_column_row(&entry.institution, &entry.location, true);
        let dates = format_date_range(&entry.start_date, &entry.end_date);
        layout.write_two_column_row(&entry.degree, &dates, false);
        write_bullets(layout, &entry.bullets);
        layout.advance(layout.config().entry_spacing);
    }
}

pub(crate) fn write_experience<B: Backend>(layout: &mut Layout<'_, B>, entries: &[Experience]) {
    if entries.is_empty() {
        return;
    }
    layout.add_section_title("Experience");
    for entry in entries {
        let dates = format_date_range(&entry.start_date, &entry.end_date);
        layout.write_two_column_row(&entry.role, &dates, true);
        layout.write_two_column_row(&entry.company, &entry.location, false);
        write_bullets(layout, &entry.bullets);
        layout.advance(layout.config().entry_spacing);
    }
}

pub(crate) fn write_projects<B: Backend>(layout: &mut Layout<'_, B>, entries: &[Project]) {
    if entries.is_empty() {
        return;
    }
    layout.add_section_title("Projects");
    for entry in entries {
        let dates = format_date_range(&entry.start_date, &entry.end_date);
        layout.write_two_column_row(&entry.name, &dates, true);
        let size = layout.base_size();
        layout.write_wrapped_text(&entry.tech_stack, FontStyle::Italic, size, Alignment::Left);
        write_bullets(layout, &entry.bullets);
        layout.advance(layout.config().entry_spacing);
    }
}

pub(crate) fn write_technical_skills<B: Backend>(
    layout: &mut Layout<'_, B>,
    skills: &TechnicalSkills,
) {
    if !skills.has_content() {
        return;
    }
    layout.add_section_title("Technical Skills");
    for (label, value) in skills.labeled() {
        layout.write_labeled_line(label, value);
    }
}

fn write_bullets<B: Backend>(layout: &mut Layout<'_, B>, bullets: &[String]) {
    for bullet in bullets {
        layout.write_bullet(bullet);
    }
}
