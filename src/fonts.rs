use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;
use crate::model::{FontFamily, FontStyle};

/// Where font programs come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontSource {
    /// Installed TrueType/OpenType faces, falling back to standard Type1 fonts.
    #[default]
    System,
    /// Non-embedded standard Type1 fonts only; output does not depend on the machine.
    Standard,
}

/// Installed family names tried in order for each supported family.
fn installed_names(family: FontFamily) -> &'static [&'static str] {
    match family {
        FontFamily::Times => &[
            "Times New Roman",
            "Liberation Serif",
            "Tinos",
            "Nimbus Roman",
            "TeX Gyre Termes",
        ],
        FontFamily::Garamond => &["EB Garamond", "Garamond", "EB Garamond 12", "Cormorant Garamond"],
        FontFamily::Calibri => &["Calibri", "Carlito"],
        FontFamily::Arial => &["Arial", "Liberation Sans", "Arimo", "Nimbus Sans"],
    }
}

/// Type1 base font used when nothing is installed. Only Times and Helvetica are
/// among the standard 14; the other two are referenced by name with explicit widths.
fn standard_base_font(family: FontFamily, style: FontStyle) -> &'static str {
    use FontStyle::*;
    match (family, style) {
        (FontFamily::Times, Regular) => "Times-Roman",
        (FontFamily::Times, Bold) => "Times-Bold",
        (FontFamily::Times, Italic) => "Times-Italic",
        (FontFamily::Times, BoldItalic) => "Times-BoldItalic",
        (FontFamily::Arial, Regular) => "Helvetica",
        (FontFamily::Arial, Bold) => "Helvetica-Bold",
        (FontFamily::Arial, Italic) => "Helvetica-Oblique",
        (FontFamily::Arial, BoldItalic) => "Helvetica-BoldOblique",
        (FontFamily::Garamond, Regular) => "Garamond",
        (FontFamily::Garamond, Bold) => "Garamond-Bold",
        (FontFamily::Garamond, Italic) => "Garamond-Italic",
        (FontFamily::Garamond, BoldItalic) => "Garamond-BoldItalic",
        (FontFamily::Calibri, Regular) => "Calibri",
        (FontFamily::Calibri, Bold) => "Calibri-Bold",
        (FontFamily::Calibri, Italic) => "Calibri-Italic",
        (FontFamily::Calibri, BoldItalic) => "Calibri-BoldItalic",
    }
}

#[derive(Clone, Copy)]
struct Glyph {
    gid: u16,
    width_1000: f32,
}

pub(crate) struct TrueTypeFont {
    ps_name: String,
    data: Vec<u8>,
    face_index: u32,
    glyphs: HashMap<char, Glyph>,
    remapper: subsetter::GlyphRemapper,
    /// Subset gid -> glyph drawn under it, filled as text is encoded for drawing.
    used: BTreeMap<u16, UsedGlyph>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct UsedGlyph {
    /// Gid in the original font program.
    gid: u16,
    ch: char,
    width_1000: f32,
}

impl TrueTypeFont {
    fn load(path: &Path, face_index: u32, family_name: &str, style: FontStyle) -> Result<Self, Error> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        Face::parse(&data, face_index)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        let suffix = match style {
            FontStyle::Regular => "",
            FontStyle::Bold => "-Bold",
            FontStyle::Italic => "-Italic",
            FontStyle::BoldItalic => "-BoldItalic",
        };
        Ok(TrueTypeFont {
            ps_name: format!("{}{}", family_name.replace(' ', ""), suffix),
            data,
            face_index,
            glyphs: HashMap::new(),
            remapper: subsetter::GlyphRemapper::new(),
            used: BTreeMap::new(),
        })
    }

    /// Fill the glyph cache for every char of `text` not seen before.
    fn cache_glyphs(&mut self, text: &str) {
        if text.chars().all(|ch| self.glyphs.contains_key(&ch)) {
            return;
        }
        let Ok(face) = Face::parse(&self.data, self.face_index) else {
            return;
        };
        let units = face.units_per_em() as f32;
        for ch in text.chars() {
            if self.glyphs.contains_key(&ch) {
                continue;
            }
            let gid = face.glyph_index(ch).unwrap_or(GlyphId(0));
            let width_1000 = face
                .glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0);
            self.glyphs.insert(ch, Glyph { gid: gid.0, width_1000 });
        }
    }
}

pub(crate) struct StandardFont {
    base_font: &'static str,
    widths_1000: Vec<f32>,
    serif: bool,
    italic: bool,
}

impl StandardFont {
    fn new(family: FontFamily, style: FontStyle) -> Self {
        let serif = matches!(family, FontFamily::Times | FontFamily::Garamond);
        let mut widths_1000 = if serif { times_widths() } else { helvetica_widths() };
        let scale = match family {
            FontFamily::Garamond => 0.96,
            FontFamily::Calibri => 0.9,
            _ => 1.0,
        } * if style.is_bold() { 1.05 } else { 1.0 };
        for w in &mut widths_1000 {
            *w *= scale;
        }
        StandardFont {
            base_font: standard_base_font(family, style),
            widths_1000,
            serif,
            italic: style.is_italic(),
        }
    }

    fn is_base14(&self) -> bool {
        self.base_font.starts_with("Times") || self.base_font.starts_with("Helvetica")
    }

    fn char_width_1000(&self, ch: char) -> f32 {
        let byte = match char_to_winansi(ch) {
            0 => b'?',
            b => b,
        };
        self.widths_1000[(byte - 32) as usize]
    }
}

pub(crate) enum FontProgram {
    TrueType(TrueTypeFont),
    Standard(StandardFont),
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) program: FontProgram,
}

impl FontEntry {
    /// Width of `text` in points at `font_size`.
    pub(crate) fn text_width(&mut self, text: &str, font_size: f32) -> f32 {
        let w1000: f32 = match &mut self.program {
            FontProgram::TrueType(tt) => {
                tt.cache_glyphs(text);
                text.chars()
                    .map(|ch| tt.glyphs.get(&ch).map_or(0.0, |g| g.width_1000))
                    .sum()
            }
            FontProgram::Standard(std_font) => {
                text.chars().map(|ch| std_font.char_width_1000(ch)).sum()
            }
        };
        w1000 * font_size / 1000.0
    }

    /// Encode `text` for a `Tj` operand, recording the glyphs for subsetting.
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.program {
            FontProgram::TrueType(tt) => {
                tt.cache_glyphs(text);
                let mut out = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let glyph = tt.glyphs.get(&ch).copied().unwrap_or(Glyph {
                        gid: 0,
                        width_1000: 0.0,
                    });
                    let new_gid = tt.remapper.remap(glyph.gid);
                    tt.used.entry(new_gid).or_insert(UsedGlyph {
                        gid: glyph.gid,
                        ch,
                        width_1000: glyph.width_1000,
                    });
                    out.extend_from_slice(&new_gid.to_be_bytes());
                }
                out
            }
            FontProgram::Standard(_) => to_winansi_bytes(text),
        }
    }

    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<(), Error> {
        match &self.program {
            FontProgram::TrueType(tt) => embed_truetype(pdf, font_ref, tt, alloc),
            FontProgram::Standard(std_font) => {
                embed_standard(pdf, font_ref, std_font, alloc);
                Ok(())
            }
        }
    }
}

/// Resolve one variant of `family` to a font program.
pub(crate) fn load_font(
    family: FontFamily,
    style: FontStyle,
    source: FontSource,
    extra: &ExtraFonts,
    pdf_name: String,
) -> Result<FontEntry, Error> {
    let t0 = std::time::Instant::now();
    let mut program = None;
    if source == FontSource::System {
        for name in installed_names(family) {
            if let Some((path, face_index)) =
                find_font_file(name, style.is_bold(), style.is_italic(), extra)
            {
                program = Some(FontProgram::TrueType(TrueTypeFont::load(
                    &path, face_index, name, style,
                )?));
                log::debug!("font {family:?}/{style:?}: {name} from {}", path.display());
                break;
            }
        }
        if program.is_none() {
            log::warn!(
                "Font not found: {} {style:?}, using {}",
                family.as_str(),
                standard_base_font(family, style)
            );
        }
    }
    let program =
        program.unwrap_or_else(|| FontProgram::Standard(StandardFont::new(family, style)));

    log::debug!(
        "load_font: {family:?} {style:?} → {:.1}ms",
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(FontEntry { pdf_name, program })
}

/// Embed a TrueType/OpenType face as a Type0 font with Identity-H encoding,
/// subsetted to the glyphs that were drawn.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    tt: &TrueTypeFont,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<(), Error> {
    let face = Face::parse(&tt.data, tt.face_index)
        .map_err(|e| Error::Font(format!("{}: {e}", tt.ps_name)))?;

    let units = face.units_per_em() as f32;
    let scale = |v: f32| v / units * 1000.0;
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        scale(bb.x_min as f32),
        scale(bb.y_min as f32),
        scale(bb.x_max as f32),
        scale(bb.y_max as f32),
    );
    let cap_height = face.capital_height().map(|h| scale(h as f32)).unwrap_or(700.0);

    // Content streams carry subset gids; the full program needs them mapped back.
    let (font_data, gid_map) = match subsetter::subset(&tt.data, tt.face_index, &tt.remapper) {
        Ok(data) => (data, None),
        Err(e) => {
            log::warn!("Font subsetting failed for {}: {e}; embedding full font", tt.ps_name);
            (tt.data.clone(), Some(cid_to_gid_map(&tt.used)))
        }
    };
    let data_len = i32::try_from(font_data.len())
        .map_err(|_| Error::Font(format!("{}: font program too large", tt.ps_name)))?;

    let data_ref = alloc();
    pdf.stream(data_ref, &font_data).pair(Name(b"Length1"), data_len);

    let gid_map_ref = gid_map.map(|map| {
        let map_ref = alloc();
        pdf.stream(map_ref, &map);
        map_ref
    });

    let ps_name = tt.ps_name.as_bytes();
    let descriptor_ref = alloc();
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name))
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(scale(face.ascender() as f32))
        .descent(scale(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(CidFontType::Type2);
        cid.base_font(Name(ps_name));
        cid.system_info(identity_system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        match gid_map_ref {
            Some(map_ref) => cid.cid_to_gid_map_stream(map_ref),
            None => cid.cid_to_gid_map_predefined(Name(b"Identity")),
        };
        if !tt.used.is_empty() {
            let mut w = cid.widths();
            for (&cid_gid, used) in &tt.used {
                w.consecutive(cid_gid, [used.width_1000]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", tt.ps_name);
    let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
    for (&cid_gid, used) in &tt.used {
        cmap.pair(cid_gid, used.ch);
    }
    let cmap_data = cmap.finish();
    let tounicode_ref = alloc();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);
    Ok(())
}

/// CIDToGIDMap stream body: one big-endian original gid per subset gid.
fn cid_to_gid_map(used: &BTreeMap<u16, UsedGlyph>) -> Vec<u8> {
    let len = used.keys().next_back().map_or(0, |&last| last as usize + 1);
    let mut map = vec![0u8; len * 2];
    for (&cid, glyph) in used {
        let at = cid as usize * 2;
        map[at..at + 2].copy_from_slice(&glyph.gid.to_be_bytes());
    }
    map
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

fn embed_standard(
    pdf: &mut Pdf,
    font_ref: Ref,
    std_font: &StandardFont,
    alloc: &mut impl FnMut() -> Ref,
) {
    let base_font = Name(std_font.base_font.as_bytes());
    if std_font.is_base14() {
        pdf.type1_font(font_ref)
            .base_font(base_font)
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        return;
    }

    let descriptor_ref = alloc();
    let mut flags = FontFlags::NON_SYMBOLIC;
    if std_font.serif {
        flags |= FontFlags::SERIF;
    }
    if std_font.italic {
        flags |= FontFlags::ITALIC;
    }
    pdf.font_descriptor(descriptor_ref)
        .name(base_font)
        .flags(flags)
        .bbox(Rect::new(-170.0, -230.0, 1000.0, 900.0))
        .italic_angle(if std_font.italic { -12.0 } else { 0.0 })
        .ascent(700.0)
        .descent(-220.0)
        .cap_height(660.0)
        .stem_v(80.0);

    pdf.type1_font(font_ref)
        .base_font(base_font)
        .encoding_predefined(Name(b"WinAnsiEncoding"))
        .first_char(32)
        .last_char(255)
        .widths(std_font.widths_1000.iter().copied())
        .font_descriptor(descriptor_ref);
}

/// (lowercase family name, bold, italic) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    // Name ID 1 keeps "Liberation Serif" apart from "Liberation Sans Narrow".
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

fn system_font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("RESUME_PDF_FONTS") {
        dirs.extend(std::env::split_paths(&val).filter(|p| !p.as_os_str().is_empty()));
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/Library/Fonts/Microsoft".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        match std::env::var("WINDIR") {
            Ok(windir) => dirs.push(PathBuf::from(windir).join("Fonts")),
            Err(_) => dirs.push("C:\\Windows\\Fonts".into()),
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn index_font_file(path: &Path, index: &mut FontLookup) {
    let Ok(file) = std::fs::File::open(path) else {
        return;
    };
    // SAFETY: font files are only read; a concurrent truncation surfaces as a parse failure.
    let Ok(data) = (unsafe { Mmap::map(&file) }) else {
        return;
    };
    let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
    for face_index in 0..face_count {
        let Ok(face) = Face::parse(&data, face_index) else {
            continue;
        };
        if let Some(family) = font_family_name(&face) {
            index
                .entry((family.to_lowercase(), face.is_bold(), face.is_italic()))
                .or_insert((path.to_path_buf(), face_index));
        }
    }
}

fn scan_font_dirs(dirs: Vec<PathBuf>) -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files_scanned = 0u32;

    let mut stack = dirs;
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        // Sorted so that duplicate families resolve the same way on every run.
        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                stack.push(path);
            } else if is_font_file(&path) {
                files_scanned += 1;
                index_font_file(&path, &mut index);
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} dirs, {} files parsed → {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        visited.len(),
        files_scanned,
        index.len(),
    );
    index
}

/// Index over caller-supplied font directories, scanned on first lookup.
#[derive(Debug, Default)]
pub(crate) struct ExtraFonts {
    dirs: Vec<PathBuf>,
    index: OnceCell<FontLookup>,
}

impl ExtraFonts {
    pub(crate) fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            index: OnceCell::new(),
        }
    }

    fn index(&self) -> Option<&FontLookup> {
        if self.dirs.is_empty() {
            return None;
        }
        Some(self.index.get_or_init(|| scan_font_dirs(self.dirs.clone())))
    }
}

/// Look up a font file by family name and style, preferring `extra` over the
/// system index. Falls back to the regular face when the styled one is missing.
fn find_font_file(
    family_name: &str,
    bold: bool,
    italic: bool,
    extra: &ExtraFonts,
) -> Option<(PathBuf, u32)> {
    let key = family_name.to_lowercase();
    let lookup = |index: &FontLookup| {
        index
            .get(&(key.clone(), bold, italic))
            .or_else(|| {
                if bold || italic {
                    index.get(&(key.clone(), false, false))
                } else {
                    None
                }
            })
            .cloned()
    };
    if let Some(found) = extra.index().and_then(|index| lookup(index)) {
        return Some(found);
    }
    lookup(FONT_INDEX.get_or_init(|| scan_font_dirs(system_font_directories())))
}

/// Map a single Unicode char to its WinAnsi (Windows-1252) byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Encode text as WinAnsi bytes, replacing unmappable chars with '?'.
fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match char_to_winansi(c) {
            0 => b'?',
            b => b,
        })
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            64 => 1015.0,                         // @
            124 => 260.0,                         // |
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=63 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// Approximate Times-Roman widths at 1000 units/em for WinAnsi chars 32..=255.
fn times_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 250.0,                    // space
            44 | 46 => 250.0,               // , .
            45 => 333.0,                    // -
            58 | 59 => 278.0,               // : ;
            64 => 921.0,                    // @
            124 => 200.0,                   // |
            33..=47 => 333.0,               // punctuation
            48..=57 => 500.0,               // digits
            60..=63 => 564.0,               // < = > ?
            73 => 333.0,                    // I
            74 => 389.0,                    // J
            77 => 889.0,                    // M
            87 => 944.0,                    // W
            65..=90 => 690.0,               // uppercase A-Z (average)
            91..=96 => 333.0,               // brackets etc.
            105 | 106 | 108 | 116 => 278.0, // narrow lowercase: i j l t
            102 | 114 => 333.0,             // f r
            109 => 778.0,                   // m
            119 => 722.0,                   // w
            97..=122 => 480.0,              // lowercase a-z (average)
            _ => 500.0,
        })
        .collect()
}
