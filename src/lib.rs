mod backend;
mod error;
mod fonts;
mod layout;
mod model;
mod pdf;
pub mod request;

pub use backend::{Backend, Cell, split_to_width};
pub use error::{Error, FieldError};
pub use fonts::FontSource;
pub use layout::{
    ContactToken, LayoutConfig, break_contact_lines, contact_tokens, format_date_range,
    normalize_url, phone_url, render_into,
};
pub use model::{
    Alignment, Education, Experience, FontFamily, FontSize, FontStyle, ImageFormat, PersonalInfo,
    PersonalLink, Photo, Project, RenderSettings, ResumeDocument, TechnicalSkills,
};
pub use pdf::{A4, PdfBackend, RenderOptions};

use std::path::Path;
use std::time::Instant;

/// Render `doc` to PDF bytes with system fonts and compressed streams.
pub fn render(doc: &ResumeDocument) -> Result<Vec<u8>, Error> {
    render_with(doc, &RenderOptions::default())
}

pub fn render_with(doc: &ResumeDocument, options: &RenderOptions) -> Result<Vec<u8>, Error> {
    let backend = PdfBackend::new(options.clone());
    render_into(doc, &LayoutConfig::default(), backend)
}

pub fn convert_json_to_pdf(input: &Path, output: &Path) -> Result<(), Error> {
    convert_json_to_pdf_with(input, output, &RenderOptions::default())
}

pub fn convert_json_to_pdf_with(
    input: &Path,
    output: &Path,
    options: &RenderOptions,
) -> Result<(), Error> {
    let t0 = Instant::now();
    let request = request::parse(input)?;
    convert_request(request, output, options, t0)
}

pub fn convert_json_bytes_to_pdf(input: &[u8], output: &Path) -> Result<(), Error> {
    let t0 = Instant::now();
    let request = request::parse_bytes(input)?;
    convert_request(request, output, &RenderOptions::default(), t0)
}

fn convert_request(
    request: request::GeneratePdfRequest,
    output: &Path,
    options: &RenderOptions,
    t0: Instant,
) -> Result<(), Error> {
    let doc = request::validate(request)?;
    let t_parse = t0.elapsed();

    let bytes = render_with(&doc, options)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
