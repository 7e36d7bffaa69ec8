use std::io::{BufReader, Cursor};

use image::{ColorType, ImageDecoder};
use pdf_writer::{Filter, Pdf, Ref};

use crate::error::Error;
use crate::model::{ImageFormat, Photo};

/// Image data ready to be written as an XObject.
pub(super) enum PreparedImage {
    /// DCT data passed through untouched.
    Jpeg {
        data: Vec<u8>,
        width: u32,
        height: u32,
        gray: bool,
    },
    /// Deflated RGB samples plus an optional deflated alpha soft mask.
    Raster {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
        width: u32,
        height: u32,
    },
}

pub(super) fn prepare(photo: &Photo) -> Result<PreparedImage, Error> {
    let format = match photo.format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    let reader = || image::ImageReader::with_format(BufReader::new(Cursor::new(&photo.data)), format);

    if photo.format == ImageFormat::Jpeg {
        let decoder = reader().into_decoder()?;
        let (width, height) = decoder.dimensions();
        match decoder.color_type() {
            ColorType::L8 | ColorType::Rgb8 => {
                return Ok(PreparedImage::Jpeg {
                    data: photo.data.clone(),
                    width,
                    height,
                    gray: decoder.color_type() == ColorType::L8,
                });
            }
            // CMYK and friends are re-encoded below.
            _ => {}
        }
    }

    let rgba = reader().decode()?.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);
    let alpha = has_alpha.then(|| {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
    });

    Ok(PreparedImage::Raster {
        rgb,
        alpha,
        width,
        height,
    })
}

pub(super) fn write_xobject(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    img: &PreparedImage,
    alloc: &mut impl FnMut() -> Ref,
) {
    match img {
        PreparedImage::Jpeg {
            data,
            width,
            height,
            gray,
        } => {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(*width as i32);
            xobj.height(*height as i32);
            if *gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
        }
        PreparedImage::Raster {
            rgb,
            alpha,
            width,
            height,
        } => {
            let smask_ref = alpha.as_ref().map(|alpha| {
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(*width as i32);
                mask.height(*height as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask_ref
            });

            let mut xobj = pdf.image_xobject(xobj_ref, rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(*width as i32);
            xobj.height(*height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
}
