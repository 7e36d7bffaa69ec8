mod common;

use common::{ada, full_resume, portrait_photo, record, record_with};
use resume_pdf::{Alignment, Education, FontFamily, FontSize, FontStyle, LayoutConfig, TechnicalSkills};

const EPS: f32 = 1e-3;

fn index_of(texts: &[&str], text: &str) -> usize {
    texts
        .iter()
        .position(|t| *t == text)
        .unwrap_or_else(|| panic!("{text:?} not drawn"))
}

#[test]
fn sections_follow_the_fixed_order() {
    let rec = record(&full_resume());
    let texts = rec.texts();
    let education = index_of(&texts, "EDUCATION");
    let experience = index_of(&texts, "EXPERIENCE");
    let projects = index_of(&texts, "PROJECTS");
    let skills = index_of(&texts, "TECHNICAL SKILLS");
    assert!(index_of(&texts, "Ada Lovelace") < education);
    assert!(education < experience && experience < projects && projects < skills);
    assert_eq!(rec.lines.len(), 4);
}

#[test]
fn empty_sections_are_skipped() {
    let rec = record(&ada());
    assert!(rec.find("EXPERIENCE").is_some());
    for title in ["EDUCATION", "PROJECTS", "TECHNICAL SKILLS"] {
        assert!(rec.find(title).is_none(), "{title} should be skipped");
    }
    assert_eq!(rec.lines.len(), 1);
}

#[test]
fn whitespace_only_skills_count_as_empty() {
    let mut doc = ada();
    doc.technical_skills.frameworks = "   ".into();
    let rec = record(&doc);
    assert!(rec.find("TECHNICAL SKILLS").is_none());
}

#[test]
fn only_languages_renders_one_labeled_line() {
    let mut doc = ada();
    doc.technical_skills = TechnicalSkills {
        languages: "Rust, Go".into(),
        ..Default::default()
    };
    let rec = record(&doc);
    assert_eq!(rec.count("Languages:"), 1);
    for label in ["Frameworks:", "Developer Tools:", "Libraries:"] {
        assert_eq!(rec.count(label), 0, "{label} should be absent");
    }
    let label = rec.find("Languages:").unwrap();
    let value = rec.find("Rust, Go").unwrap();
    assert_eq!(label.style, FontStyle::Bold);
    assert!((value.x - (label.x + 40.0)).abs() < EPS);
    assert!((value.y - label.y).abs() < EPS);
}

#[test]
fn education_entry_order() {
    let rec = record(&full_resume());
    let texts = rec.texts();
    let institution = index_of(&texts, "University of London");
    assert_eq!(
        &texts[institution..institution + 5],
        [
            "University of London",
            "London",
            "Mathematics",
            "1833 - 1835",
            "- Tutored by Augustus De Morgan"
        ]
    );
    assert_eq!(rec.cells[institution].style, FontStyle::Bold);
    assert_eq!(rec.cells[institution + 1].align, Alignment::Right);
    assert_eq!(rec.cells[institution + 2].style, FontStyle::Regular);
}

#[test]
fn experience_entry_order() {
    let rec = record(&ada());
    let texts = rec.texts();
    let role = index_of(&texts, "Analyst");
    assert_eq!(
        &texts[role..role + 5],
        [
            "Analyst",
            "1842 - 1843",
            "Analytical Engines Ltd",
            "London",
            "- Wrote the first published algorithm"
        ]
    );
    assert_eq!(rec.cells[role].style, FontStyle::Bold);
    assert_eq!(rec.cells[role + 2].style, FontStyle::Regular);
}

#[test]
fn project_entry_has_italic_tech_stack() {
    let rec = record(&full_resume());
    let texts = rec.texts();
    let name = index_of(&texts, "Note G");
    assert_eq!(
        &texts[name..name + 4],
        [
            "Note G",
            "1843",
            "Analytical Engine, punched cards",
            "- Computed Bernoulli numbers"
        ]
    );
    assert_eq!(rec.cells[name + 2].style, FontStyle::Italic);
}

#[test]
fn entries_are_separated_by_entry_spacing() {
    let mut doc = ada();
    let second = doc.experience[0].clone();
    doc.experience.push(second);
    let rec = record(&doc);

    let bullets: Vec<_> = rec
        .cells
        .iter()
        .filter(|c| c.text == "- Wrote the first published algorithm")
        .collect();
    let roles: Vec<_> = rec.cells.iter().filter(|c| c.text == "Analyst").collect();
    assert_eq!(roles.len(), 2);
    assert!((roles[1].y - (bullets[0].y + 5.5 + 0.8)).abs() < EPS);
}

#[test]
fn blank_two_column_row_takes_no_space() {
    let mut doc = ada();
    doc.education = vec![Education {
        institution: "  ".into(),
        location: " ".into(),
        degree: "Deg".into(),
        ..Default::default()
    }];
    let rec = record(&doc);
    let texts = rec.texts();

    let title = index_of(&texts, "EDUCATION");
    let degree = index_of(&texts, "Deg");
    assert_eq!(degree, title + 1, "blank row drew {:?}", &texts[title + 1..degree]);
    assert!((rec.cells[degree].y - (rec.cells[title].y + 5.5 + 1.2)).abs() < EPS);
}

#[test]
fn wide_right_column_falls_back_to_a_fixed_left_share() {
    let config = LayoutConfig {
        right_column_width: 120.0,
        ..Default::default()
    };
    let rec = record_with(&ada(), &config);

    let role = rec.find("Analyst").unwrap();
    assert!((role.x - 20.0).abs() < EPS);
    assert!((role.width - 0.7 * 170.0).abs() < EPS, "left width {}", role.width);

    let dates = rec.find("1842 - 1843").unwrap();
    assert_eq!(dates.align, Alignment::Right);
    assert!((dates.width - 120.0).abs() < EPS);
    assert!((dates.x - 70.0).abs() < EPS);
    assert!((dates.y - role.y).abs() < EPS);
}

#[test]
fn section_title_rule_and_spacing() {
    let rec = record(&ada());
    let title = rec.find("EXPERIENCE").unwrap();
    let rule = &rec.lines[0];
    assert_eq!(title.style, FontStyle::Bold);
    assert!((title.size - 12.0).abs() < EPS);
    assert!((rule.y1 - (title.y + 5.5)).abs() < EPS);
    assert!((rule.x1 - 20.0).abs() < EPS && (rule.x2 - 190.0).abs() < EPS);

    let role = rec.find("Analyst").unwrap();
    assert!((role.y - (rule.y1 + 1.2)).abs() < EPS);
}

#[test]
fn font_settings_drive_sizes_and_family() {
    let mut doc = ada();
    doc.settings.font_family = FontFamily::Garamond;
    doc.settings.font_size = FontSize::Large;
    let rec = record(&doc);

    assert_eq!(rec.families, [FontFamily::Garamond]);
    assert!((rec.find("Ada Lovelace").unwrap().size - 17.0).abs() < EPS);
    assert!((rec.find("EXPERIENCE").unwrap().size - 13.0).abs() < EPS);
    assert!((rec.find("Analyst").unwrap().size - 12.0).abs() < EPS);
}

#[test]
fn photo_sits_top_right_and_narrows_the_header() {
    let mut doc = ada();
    doc.settings.show_photo = true;
    doc.photo = Some(portrait_photo());
    let rec = record(&doc);

    assert_eq!(rec.images.len(), 1);
    let photo = &rec.images[0];
    assert!((photo.height - 28.0).abs() < EPS);
    assert!((photo.width - 21.0).abs() < EPS);
    assert!((photo.x + photo.width - 190.0).abs() < EPS);
    assert!((photo.y - 20.0).abs() < EPS);

    let name = rec.find("Ada Lovelace").unwrap();
    assert!((name.width - (170.0 - 21.0 - 4.0)).abs() < EPS);

    let title = rec.find("EXPERIENCE").unwrap();
    assert!(title.y >= photo.y + photo.height + 2.0 - EPS);
}

#[test]
fn photo_is_ignored_unless_enabled() {
    let mut doc = ada();
    doc.photo = Some(portrait_photo());
    let rec = record(&doc);
    assert!(rec.images.is_empty());
    assert!((rec.find("Ada Lovelace").unwrap().width - 170.0).abs() < EPS);
}
