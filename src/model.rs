use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontFamily {
    #[default]
    Times,
    Garamond,
    Calibri,
    Arial,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Times,
        FontFamily::Garamond,
        FontFamily::Calibri,
        FontFamily::Arial,
    ];

    /// Strict lookup: `None` for anything outside the four supported names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "times" => Some(FontFamily::Times),
            "garamond" => Some(FontFamily::Garamond),
            "calibri" => Some(FontFamily::Calibri),
            "arial" => Some(FontFamily::Arial),
            _ => None,
        }
    }

    /// Permissive lookup used by the renderer: empty or unknown values become `Times`.
    pub fn from_str_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontFamily::Times => "times",
            FontFamily::Garamond => "garamond",
            FontFamily::Calibri => "calibri",
            FontFamily::Arial => "arial",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Some(FontSize::Small),
            "medium" => Some(FontSize::Medium),
            "large" => Some(FontSize::Large),
            _ => None,
        }
    }

    /// Permissive lookup used by the renderer: empty or unknown values become `Medium`.
    pub fn from_str_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Body text size in points. Section titles use +1, the name +5.
    pub fn base_size_pt(self) -> f32 {
        match self {
            FontSize::Small => 10.0,
            FontSize::Medium => 11.0,
            FontSize::Large => 12.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSettings {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub show_photo: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Clone, Debug)]
pub struct Photo {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl Photo {
    /// Sniff the format and read the pixel dimensions of raw JPEG/PNG bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Error> {
        let format = match image::guess_format(&data)? {
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Png => ImageFormat::Png,
            other => {
                return Err(Error::Image(format!(
                    "unsupported photo format {other:?} (expected JPEG or PNG)"
                )));
            }
        };
        let reader = image::ImageReader::new(std::io::Cursor::new(&data)).with_guessed_format()?;
        let (pixel_width, pixel_height) = reader.into_dimensions()?;
        Ok(Photo {
            data,
            format,
            pixel_width,
            pixel_height,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalLink {
    pub label: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub other_links: Vec<PersonalLink>,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: String,
    pub location: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub location: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub tech_stack: String,
    pub start_date: String,
    pub end_date: String,
    pub bullets: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalSkills {
    pub languages: String,
    pub frameworks: String,
    pub developer_tools: String,
    pub libraries: String,
}

impl TechnicalSkills {
    /// Labeled lines in render order.
    pub fn labeled(&self) -> [(&'static str, &str); 4] {
        [
            ("Languages", &self.languages),
            ("Frameworks", &self.frameworks),
            ("Developer Tools", &self.developer_tools),
            ("Libraries", &self.libraries),
        ]
    }

    pub fn has_content(&self) -> bool {
        self.labeled().iter().any(|(_, value)| !value.trim().is_empty())
    }
}

/// Everything the layout engine reads. Owned by the caller, never mutated.
#[derive(Clone, Debug, Default)]
pub struct ResumeDocument {
    pub personal_info: PersonalInfo,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub technical_skills: TechnicalSkills,
    pub settings: RenderSettings,
    pub photo: Option<Photo>,
}
