mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::png_bytes;
use resume_pdf::request::{parse_bytes, validate};
use resume_pdf::{Error, FontFamily, FontSize, ImageFormat};
use serde_json::{Value, json};

fn request_json() -> Value {
    json!({
        "data": {
            "personalInfo": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "otherLinks": [{"label": "", "url": "ada.dev"}]
            },
            "education": [{"institution": "University of London", "degree": "Mathematics"}]
        },
        "settings": {"fontFamily": " Garamond ", "fontSize": "LARGE", "showPhoto": false}
    })
}

fn check(value: Value) -> Result<resume_pdf::ResumeDocument, Error> {
    validate(parse_bytes(value.to_string().as_bytes())?)
}

fn rejected_fields(value: Value) -> Vec<String> {
    match check(value) {
        Err(Error::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn valid_request_becomes_a_document() {
    let doc = check(request_json()).unwrap();
    assert_eq!(doc.settings.font_family, FontFamily::Garamond);
    assert_eq!(doc.settings.font_size, FontSize::Large);
    assert_eq!(doc.education[0].institution, "University of London");
    assert_eq!(doc.personal_info.other_links[0].url, "ada.dev");
    assert!(doc.photo.is_none());
}

#[test]
fn missing_settings_fail_enum_checks() {
    let mut value = request_json();
    value["settings"] = json!({});
    assert_eq!(
        rejected_fields(value),
        ["settings.fontFamily", "settings.fontSize"]
    );
}

#[test]
fn nested_entries_are_addressed_by_index() {
    let mut value = request_json();
    value["data"]["experience"] = json!([{"role": "Analyst"}, {"location": "London"}]);
    value["data"]["projects"] = json!([{"name": " "}]);
    assert_eq!(
        rejected_fields(value),
        ["data.experience[1]", "data.projects[0].name"]
    );
}

#[test]
fn show_photo_requires_a_photo() {
    let mut value = request_json();
    value["settings"]["showPhoto"] = json!(true);
    value["photo"] = json!("   ");
    assert_eq!(rejected_fields(value), ["photo"]);
}

#[test]
fn png_data_url_is_decoded() {
    let mut value = request_json();
    value["settings"]["showPhoto"] = json!(true);
    value["photo"] = json!(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png_bytes())
    ));
    let doc = check(value).unwrap();
    let photo = doc.photo.expect("photo decoded");
    assert_eq!(photo.format, ImageFormat::Png);
    assert_eq!((photo.pixel_width, photo.pixel_height), (6, 8));
}

#[test]
fn unsupported_photo_type_is_a_field_error() {
    let mut value = request_json();
    value["photo"] = json!("data:image/webp;base64,AAAA");
    assert_eq!(rejected_fields(value), ["photo"]);
}

#[test]
fn oversized_photo_is_rejected_after_format_check() {
    let mut value = request_json();
    let payload = STANDARD.encode(vec![0u8; 5 * 1024 * 1024 + 1]);
    value["photo"] = json!(format!("data:image/jpeg;base64,{payload}"));
    assert!(matches!(check(value), Err(Error::PhotoTooLarge)));
}

#[test]
fn photo_is_not_checked_while_fields_are_invalid() {
    let mut value = request_json();
    value["data"]["personalInfo"]["lastName"] = json!("");
    value["photo"] = json!("not a data url");
    assert_eq!(rejected_fields(value), ["data.personalInfo.lastName"]);
}
