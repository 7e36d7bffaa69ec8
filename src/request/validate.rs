use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, FieldError};
use crate::model::{FontFamily, FontSize, Photo, RenderSettings, ResumeDocument};

use super::GeneratePdfRequest;

/// Ceiling on the decoded photo payload.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

const PHOTO_PREFIXES: [&str; 2] = ["data:image/jpeg;base64,", "data:image/png;base64,"];

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn field_errors(request: &GeneratePdfRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let data = &request.data;
    let info = &data.personal_info;

    if blank(&info.first_name) {
        errors.push(FieldError::new("data.personalInfo.firstName", "must not be empty"));
    }
    if blank(&info.last_name) {
        errors.push(FieldError::new("data.personalInfo.lastName", "must not be empty"));
    }

    let photo_blank = request.photo.as_deref().is_none_or(blank);
    if request.settings.show_photo && photo_blank {
        errors.push(FieldError::new(
            "photo",
            "must be provided when settings.showPhoto is true",
        ));
    }

    if data.experience.is_empty()
        && data.education.is_empty()
        && data.projects.is_empty()
        && !data.technical_skills.has_content()
    {
        errors.push(FieldError::new(
            "data",
            "at least one content section must be filled (experience, education, projects, or technicalSkills)",
        ));
    }

    for (i, entry) in data.experience.iter().enumerate() {
        if blank(&entry.role) && blank(&entry.company) {
            errors.push(FieldError::new(
                format!("data.experience[{i}]"),
                "must include role or company",
            ));
        }
    }
    for (i, entry) in data.education.iter().enumerate() {
        if blank(&entry.institution) {
            errors.push(FieldError::new(
                format!("data.education[{i}].institution"),
                "must not be empty",
            ));
        }
    }
    for (i, entry) in data.projects.iter().enumerate() {
        if blank(&entry.name) {
            errors.push(FieldError::new(
                format!("data.projects[{i}].name"),
                "must not be empty",
            ));
        }
    }

    if FontFamily::parse(&request.settings.font_family).is_none() {
        errors.push(FieldError::new(
            "settings.fontFamily",
            "must be one of: times, garamond, calibri, arial",
        ));
    }
    if FontSize::parse(&request.settings.font_size).is_none() {
        errors.push(FieldError::new(
            "settings.fontSize",
            "must be one of: small, medium, large",
        ));
    }
    errors
}

fn photo_error(message: &str) -> Error {
    Error::Validation(vec![FieldError::new("photo", message)])
}

/// Format first, then size.
fn decode_photo(value: &str) -> Result<Photo, Error> {
    let Some(payload) = PHOTO_PREFIXES
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
    else {
        return Err(photo_error("must be a base64 encoded JPEG or PNG data URL"));
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| photo_error("invalid base64 photo encoding"))?;
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(Error::PhotoTooLarge);
    }
    Photo::from_bytes(bytes)
}

/// Check a request and turn it into the document the layout engine reads.
///
/// Field errors are collected and returned together; the photo is checked
/// only once every field passes.
pub fn validate(request: GeneratePdfRequest) -> Result<ResumeDocument, Error> {
    let errors = field_errors(&request);
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    let photo = match request.photo.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(decode_photo(value)?),
        _ => None,
    };

    let settings = RenderSettings {
        font_family: FontFamily::from_str_or_default(&request.settings.font_family),
        font_size: FontSize::from_str_or_default(&request.settings.font_size),
        show_photo: request.settings.show_photo,
    };
    let data = request.data;
    Ok(ResumeDocument {
        personal_info: data.personal_info,
        experience: data.experience,
        education: data.education,
        projects: data.projects,
        technical_skills: data.technical_skills,
        settings,
        photo,
    })
}
