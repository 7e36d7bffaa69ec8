use crate::backend::Backend;
use crate::model::{Alignment, FontStyle, PersonalInfo};

use super::{Band, Layout};

pub const CONTACT_SEPARATOR: &str = " | ";

const LINK_SCHEMES: [&str; 4] = ["http://", "https://", "mailto:", "tel:"];

/// One segment of the contact line. An empty `url` renders as plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactToken {
    pub text: String,
    pub url: String,
}

/// Turn a user-entered link into an absolute URL.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if LINK_SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return trimmed.to_string();
    }
    if trimmed.contains('@') && !trimmed.contains('/') {
        return format!("mailto:{trimmed}");
    }
    format!("https://{trimmed}")
}

/// `tel:` URL keeping only the digits and a leading `+`; empty without digits.
pub fn phone_url(phone: &str) -> String {
    let phone = phone.trim();
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return String::new();
    }
    let plus = if phone.starts_with('+') { "+" } else { "" };
    format!("tel:{plus}{digits}")
}

/// Contact tokens in display order: phone, email, LinkedIn, GitHub, website,
/// then custom links. Blank fields are dropped.
pub fn contact_tokens(info: &PersonalInfo) -> Vec<ContactToken> {
    let mut tokens = Vec::new();
    let mut push = |text: &str, url: String| {
        let text = text.trim();
        if !text.is_empty() {
            tokens.push(ContactToken {
                text: text.to_string(),
                url,
            });
        }
    };

    push(&info.phone, phone_url(&info.phone));
    let email = info.email.trim();
    let mailto = if email.starts_with("mailto:") {
        email.to_string()
    } else {
        format!("mailto:{email}")
    };
    push(email, mailto);
    push(&info.linkedin, normalize_url(&info.linkedin));
    push(&info.github, normalize_url(&info.github));
    push(&info.website, normalize_url(&info.website));

    for link in &info.other_links {
        let url = link.url.trim();
        if url.is_empty() {
            continue;
        }
        let label = link.label.trim();
        push(if label.is_empty() { url } else { label }, normalize_url(url));
    }
    tokens
}

/// Greedy line breaking over token widths. Returns token indices per line.
///
/// A separator precedes every token except the first on its line. A line is
/// closed before a token that would push it past `max_width`, unless the line
/// is still empty, so a single over-wide token stays whole on its own line.
pub fn break_contact_lines(widths: &[f32], separator_width: f32, max_width: f32) -> Vec<Vec<usize>> {
    let mut lines = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_width = 0.0f32;

    for (i, &width) in widths.iter().enumerate() {
        if !current.is_empty() && current_width + separator_width + width > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current_width += separator_width;
        }
        current_width += width;
        current.push(i);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Write the contact tokens centred in `band`, wrapping as needed.
pub(crate) fn write_contact_line<B: Backend>(
    layout: &mut Layout<'_, B>,
    tokens: &[ContactToken],
    band: Band,
) {
    if tokens.is_empty() {
        return;
    }
    let font = layout.font(FontStyle::Regular, layout.base_size());
    let line_height = layout.config().line_height;
    let separator_width = layout.measure(font, CONTACT_SEPARATOR);
    let widths: Vec<f32> = tokens
        .iter()
        .map(|token| layout.measure(font, &token.text))
        .collect();

    for line in break_contact_lines(&widths, separator_width, band.width) {
        let line_width: f32 = line.iter().map(|&i| widths[i]).sum::<f32>()
            + separator_width * line.len().saturating_sub(1) as f32;
        let mut x = (band.x + (band.width - line_width) / 2.0).max(band.x);

        layout.ensure_space(line_height);
        for (pos, &i) in line.iter().enumerate() {
            if pos > 0 {
                layout.draw_text(font, x, separator_width, CONTACT_SEPARATOR, Alignment::Left, None);
                x += separator_width;
            }
            let token = &tokens[i];
            let link = (!token.url.is_empty()).then_some(token.url.as_str());
            if link.is_some() {
                layout.set_link_color(true);
            }
            layout.draw_text(font, x, widths[i], &token.text, Alignment::Left, link);
            if link.is_some() {
                layout.set_link_color(false);
            }
            x += widths[i];
        }
        layout.advance(line_height);
    }
}
