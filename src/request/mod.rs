//! Generate-PDF requests: the JSON envelope around a résumé and its checks.

mod validate;

use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::model::{Education, Experience, PersonalInfo, Project, TechnicalSkills};

pub use validate::{MAX_PHOTO_BYTES, validate};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub technical_skills: TechnicalSkills,
}

/// Settings as sent by the client. Enum values stay raw strings until validated.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestSettings {
    pub font_family: String,
    pub font_size: String,
    pub show_photo: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratePdfRequest {
    pub data: ResumeData,
    pub settings: RequestSettings,
    /// `data:image/{jpeg,png};base64,...` URL.
    pub photo: Option<String>,
}

pub fn parse_bytes(input: &[u8]) -> Result<GeneratePdfRequest, Error> {
    Ok(serde_json::from_slice(input)?)
}

pub fn parse(path: &Path) -> Result<GeneratePdfRequest, Error> {
    let bytes = std::fs::read(path)?;
    parse_bytes(&bytes)
}
