mod xobject;

use std::collections::HashMap;
use std::path::PathBuf;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::backend::{Backend, Cell};
use crate::error::Error;
use crate::fonts::{ExtraFonts, FontEntry, FontSource, load_font};
use crate::model::{Alignment, FontFamily, FontStyle, Photo};

use xobject::PreparedImage;

const PT_PER_MM: f32 = 72.0 / 25.4;

/// A4 portrait, in mm.
pub const A4: (f32, f32) = (210.0, 297.0);

/// Knobs for the PDF backend.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub fonts: FontSource,
    /// Searched before the system font directories.
    pub font_dirs: Vec<PathBuf>,
    /// FlateDecode page content streams.
    pub compress: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fonts: FontSource::System,
            font_dirs: Vec::new(),
            compress: true,
        }
    }
}

struct LinkAnnotation {
    rect: Rect,
    url: String,
}

struct PageContent {
    content: Content,
    links: Vec<LinkAnnotation>,
}

impl PageContent {
    fn new() -> Self {
        Self {
            content: Content::new(),
            links: Vec::new(),
        }
    }
}

pub struct PdfBackend {
    page_width: f32,
    page_height: f32,
    options: RenderOptions,
    extra_fonts: ExtraFonts,
    fonts: Vec<FontEntry>,
    font_index: HashMap<(FontFamily, FontStyle), usize>,
    current_font: Option<usize>,
    font_size: f32,
    text_color: [u8; 3],
    pages: Vec<PageContent>,
    images: Vec<PreparedImage>,
}

impl PdfBackend {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            page_width: A4.0,
            page_height: A4.1,
            extra_fonts: ExtraFonts::new(options.font_dirs.clone()),
            options,
            fonts: Vec::new(),
            font_index: HashMap::new(),
            current_font: None,
            font_size: 11.0,
            text_color: [0, 0, 0],
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    fn register_variant(&mut self, family: FontFamily, style: FontStyle) -> Result<usize, Error> {
        if let Some(&idx) = self.font_index.get(&(family, style)) {
            return Ok(idx);
        }
        let pdf_name = format!("F{}", self.fonts.len() + 1);
        let entry = load_font(
            family,
            style,
            self.options.fonts,
            &self.extra_fonts,
            pdf_name,
        )?;
        self.fonts.push(entry);
        let idx = self.fonts.len() - 1;
        self.font_index.insert((family, style), idx);
        Ok(idx)
    }

    fn current_page(&mut self) -> &mut PageContent {
        if self.pages.is_empty() {
            self.pages.push(PageContent::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// mm from the top of the page -> pt from the bottom.
    fn pdf_y(&self, y: f32) -> f32 {
        (self.page_height - y) * PT_PER_MM
    }
}

impl Backend for PdfBackend {
    fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    fn add_page(&mut self) {
        self.pages.push(PageContent::new());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn register_family(&mut self, family: FontFamily) -> Result<(), Error> {
        for style in FontStyle::ALL {
            self.register_variant(family, style)?;
        }
        Ok(())
    }

    fn set_font(&mut self, family: FontFamily, style: FontStyle, size_pt: f32) {
        let idx = match self.register_variant(family, style) {
            Ok(idx) => Some(idx),
            Err(e) => {
                log::warn!("set_font {family:?}/{style:?} failed: {e}");
                None
            }
        };
        self.current_font = idx.or(self.current_font);
        self.font_size = size_pt;
    }

    fn text_width(&mut self, text: &str) -> f32 {
        let size = self.font_size;
        match self.current_font {
            Some(idx) => self.fonts[idx].text_width(text, size) / PT_PER_MM,
            None => 0.0,
        }
    }

    fn set_text_color(&mut self, rgb: [u8; 3]) {
        self.text_color = rgb;
    }

    fn cell(&mut self, cell: Cell<'_>) {
        let Some(idx) = self.current_font else {
            log::warn!("cell drawn before any font was set: {:?}", cell.text);
            return;
        };
        if cell.text.is_empty() {
            return;
        }
        let size = self.font_size;
        let text_w = self.fonts[idx].text_width(cell.text, size) / PT_PER_MM;
        let x = match cell.align {
            Alignment::Left => cell.x,
            Alignment::Center => cell.x + (cell.width - text_w) / 2.0,
            Alignment::Right => cell.x + cell.width - text_w,
        };
        let baseline = cell.y + cell.height / 2.0 + 0.3 * size / PT_PER_MM;
        let (x_pt, y_pt) = (x * PT_PER_MM, self.pdf_y(baseline));
        let (cell_top, cell_bottom) = (self.pdf_y(cell.y), self.pdf_y(cell.y + cell.height));

        let bytes = self.fonts[idx].encode(cell.text);
        let pdf_name = self.fonts[idx].pdf_name.clone();
        let [r, g, b] = self.text_color;

        let page = self.current_page();
        page.content.begin_text();
        page.content
            .set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        page.content.set_font(Name(pdf_name.as_bytes()), size);
        page.content.next_line(x_pt, y_pt);
        page.content.show(Str(&bytes));
        page.content.end_text();

        if let Some(url) = cell.link {
            page.links.push(LinkAnnotation {
                rect: Rect::new(x_pt, cell_bottom, x_pt + text_w * PT_PER_MM, cell_top),
                url: url.to_string(),
            });
        }
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) {
        let (y1, y2) = (self.pdf_y(y1), self.pdf_y(y2));
        let content = &mut self.current_page().content;
        content.save_state();
        content.set_line_width(width * PT_PER_MM);
        content.set_stroke_gray(0.0);
        content.move_to(x1 * PT_PER_MM, y1);
        content.line_to(x2 * PT_PER_MM, y2);
        content.stroke();
        content.restore_state();
    }

    fn image(
        &mut self,
        photo: &Photo,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error> {
        self.images.push(xobject::prepare(photo)?);
        let name = format!("Im{}", self.images.len());
        let y_bottom = self.pdf_y(y + height);
        let content = &mut self.current_page().content;
        content.save_state();
        content.transform([
            width * PT_PER_MM,
            0.0,
            0.0,
            height * PT_PER_MM,
            x * PT_PER_MM,
            y_bottom,
        ]);
        content.x_object(Name(name.as_bytes()));
        content.restore_state();
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();
        if self.pages.is_empty() {
            self.add_page();
        }

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let mut font_pairs: Vec<(String, Ref)> = Vec::with_capacity(self.fonts.len());
        for entry in &self.fonts {
            let font_ref = alloc();
            entry.embed(&mut pdf, font_ref, &mut alloc)?;
            font_pairs.push((entry.pdf_name.clone(), font_ref));
        }
        let t_fonts = t0.elapsed();

        let mut image_xobjects: Vec<(String, Ref)> = Vec::with_capacity(self.images.len());
        for (i, img) in self.images.iter().enumerate() {
            let xobj_ref = alloc();
            xobject::write_xobject(&mut pdf, xobj_ref, img, &mut alloc);
            image_xobjects.push((format!("Im{}", i + 1), xobj_ref));
        }

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        let page_annot_refs: Vec<Vec<Ref>> = self
            .pages
            .iter()
            .map(|page| {
                page.links
                    .iter()
                    .map(|link| {
                        let annot_ref = alloc();
                        let mut annot = pdf.annotation(annot_ref);
                        annot
                            .subtype(pdf_writer::types::AnnotationType::Link)
                            .rect(link.rect)
                            .border(0.0, 0.0, 0.0, None);
                        annot
                            .action()
                            .action_type(pdf_writer::types::ActionType::Uri)
                            .uri(Str(link.url.as_bytes()));
                        annot_ref
                    })
                    .collect()
            })
            .collect();

        for (i, page) in self.pages.into_iter().enumerate() {
            let raw = page.content.finish();
            if self.options.compress {
                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
                pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
            } else {
                pdf.stream(content_ids[i], raw.as_slice());
            }
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);
        pdf.document_info(info_id)
            .title(TextStr("Resume"))
            .producer(TextStr(concat!("resume-pdf ", env!("CARGO_PKG_VERSION"))));

        let media_box = Rect::new(
            0.0,
            0.0,
            self.page_width * PT_PER_MM,
            self.page_height * PT_PER_MM,
        );
        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(media_box)
                .parent(pages_id)
                .contents(content_ids[i]);
            if !page_annot_refs[i].is_empty() {
                page.annotations(page_annot_refs[i].iter().copied());
            }
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !image_xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &image_xobjects {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        log::info!(
            "PDF assembly: fonts={:.1}ms, total={:.1}ms, {} page(s), {} font(s), {} image(s)",
            t_fonts.as_secs_f64() * 1000.0,
            t0.elapsed().as_secs_f64() * 1000.0,
            n,
            font_pairs.len(),
            image_xobjects.len(),
        );

        Ok(pdf.finish())
    }
}
