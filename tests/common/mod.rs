#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use resume_pdf::{
    A4, Alignment, Backend, Cell, Education, Error, Experience, FontFamily, FontSource, FontStyle,
    ImageFormat, LayoutConfig, PersonalInfo, Photo, Project, RenderOptions, ResumeDocument,
    TechnicalSkills, render_into,
};

/// Fixed advance per character, in mm per point of font size.
pub const ADVANCE_PER_PT: f32 = 0.18;

pub const PRINTABLE_BOTTOM: f32 = A4.1 - 20.0;

#[derive(Clone, Debug)]
pub struct DrawnCell {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub align: Alignment,
    pub link: Option<String>,
    pub style: FontStyle,
    pub size: f32,
    pub color: [u8; 3],
}

#[derive(Clone, Debug)]
pub struct DrawnLine {
    pub page: usize,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Clone, Debug)]
pub struct DrawnImage {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Recording {
    pub pages: usize,
    pub families: Vec<FontFamily>,
    pub cells: Vec<DrawnCell>,
    pub lines: Vec<DrawnLine>,
    pub images: Vec<DrawnImage>,
}

impl Recording {
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn find(&self, text: &str) -> Option<&DrawnCell> {
        self.cells.iter().find(|c| c.text == text)
    }

    pub fn count(&self, text: &str) -> usize {
        self.cells.iter().filter(|c| c.text == text).count()
    }
}

pub fn advance(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * ADVANCE_PER_PT
}

/// A4 backend with a fixed-advance metric that records every draw call.
pub struct RecordingBackend {
    recording: Rc<RefCell<Recording>>,
    style: FontStyle,
    size: f32,
    color: [u8; 3],
}

impl RecordingBackend {
    pub fn new() -> (Self, Rc<RefCell<Recording>>) {
        let recording = Rc::new(RefCell::new(Recording::default()));
        let backend = Self {
            recording: Rc::clone(&recording),
            style: FontStyle::Regular,
            size: 11.0,
            color: [0, 0, 0],
        };
        (backend, recording)
    }

    fn page(&self) -> usize {
        self.recording.borrow().pages.saturating_sub(1)
    }
}

impl Backend for RecordingBackend {
    fn page_size(&self) -> (f32, f32) {
        A4
    }

    fn add_page(&mut self) {
        self.recording.borrow_mut().pages += 1;
    }

    fn page_count(&self) -> usize {
        self.recording.borrow().pages
    }

    fn register_family(&mut self, family: FontFamily) -> Result<(), Error> {
        self.recording.borrow_mut().families.push(family);
        Ok(())
    }

    fn set_font(&mut self, _family: FontFamily, style: FontStyle, size_pt: f32) {
        self.style = style;
        self.size = size_pt;
    }

    fn text_width(&mut self, text: &str) -> f32 {
        advance(text, self.size)
    }

    fn set_text_color(&mut self, rgb: [u8; 3]) {
        self.color = rgb;
    }

    fn cell(&mut self, cell: Cell<'_>) {
        let page = self.page();
        self.recording.borrow_mut().cells.push(DrawnCell {
            page,
            x: cell.x,
            y: cell.y,
            width: cell.width,
            height: cell.height,
            text: cell.text.to_string(),
            align: cell.align,
            link: cell.link.map(str::to_string),
            style: self.style,
            size: self.size,
            color: self.color,
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, _width: f32) {
        let page = self.page();
        self.recording.borrow_mut().lines.push(DrawnLine {
            page,
            x1,
            y1,
            x2,
            y2,
        });
    }

    fn image(
        &mut self,
        _photo: &Photo,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error> {
        let page = self.page();
        self.recording.borrow_mut().images.push(DrawnImage {
            page,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }
}

pub fn record(doc: &ResumeDocument) -> Recording {
    record_with(doc, &LayoutConfig::default())
}

pub fn record_with(doc: &ResumeDocument, config: &LayoutConfig) -> Recording {
    let (backend, recording) = RecordingBackend::new();
    render_into(doc, config, backend).expect("recording backend never fails");
    recording.borrow().clone()
}

pub fn standard_options() -> RenderOptions {
    RenderOptions {
        fonts: FontSource::Standard,
        font_dirs: Vec::new(),
        compress: false,
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn render_standard(doc: &ResumeDocument) -> Vec<u8> {
    init_logging();
    resume_pdf::render_with(doc, &standard_options()).expect("render failed")
}

pub fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf)
        .expect("output is not a readable PDF")
        .get_pages()
        .len()
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

pub fn ada() -> ResumeDocument {
    ResumeDocument {
        personal_info: PersonalInfo {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        },
        experience: vec![Experience {
            company: "Analytical Engines Ltd".into(),
            location: "London".into(),
            role: "Analyst".into(),
            start_date: "1842".into(),
            end_date: "1843".into(),
            bullets: vec!["Wrote the first published algorithm".into()],
        }],
        ..Default::default()
    }
}

pub fn full_resume() -> ResumeDocument {
    let mut doc = ada();
    doc.personal_info.phone = "+44 20 7946 0000".into();
    doc.personal_info.github = "github.com/ada".into();
    doc.education = vec![Education {
        institution: "University of London".into(),
        location: "London".into(),
        degree: "Mathematics".into(),
        start_date: "1833".into(),
        end_date: "1835".into(),
        bullets: vec!["Tutored by Augustus De Morgan".into()],
    }];
    doc.projects = vec![Project {
        name: "Note G".into(),
        tech_stack: "Analytical Engine, punched cards".into(),
        start_date: "1843".into(),
        end_date: String::new(),
        bullets: vec!["Computed Bernoulli numbers".into()],
    }];
    doc.technical_skills = TechnicalSkills {
        languages: "Mathematics".into(),
        developer_tools: "Punched cards".into(),
        ..Default::default()
    };
    doc
}

pub fn portrait_photo() -> Photo {
    Photo {
        data: Vec::new(),
        format: ImageFormat::Png,
        pixel_width: 300,
        pixel_height: 400,
    }
}

/// A small real PNG, for backends that decode the photo.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_fn(6, 8, |x, y| image::Rgb([(x * 40) as u8, (y * 30) as u8, 128]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
