//! Fixture writers shared by the unit tests.
//!
//! Images are generated with the `image` encoders, APNG with the `png`
//! encoder. The EXIF fixtures are big-endian TIFF blocks spliced into a JPEG
//! as an APP1 segment.

use image::codecs::gif::GifEncoder;
use image::codecs::webp::WebPEncoder;
use image::{
    DynamicImage, ExtendedColorType, Frame, ImageEncoder, ImageFormat, Rgba, RgbaImage, RgbImage,
};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    RgbImage::new(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .expect("write jpeg");
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::new(width, height)
        .save_with_format(path, ImageFormat::Png)
        .expect("write png");
}

pub fn write_gif(path: &Path, width: u32, height: u32, frames: u8) {
    let file = File::create(path).expect("create gif");
    let mut encoder = GifEncoder::new(file);
    encoder
        .encode_frames((0..frames).map(|i| {
            Frame::new(RgbaImage::from_pixel(
                width,
                height,
                Rgba([i.wrapping_mul(60), 0, 0, 255]),
            ))
        }))
        .expect("encode gif");
}

/// JPEG carrying IFD0 `Make = "Canon"` and a GPS IFD with
/// `GPSLatitudeRef = "N"`, `GPSLatitude = 40/1 0/1 0/1`.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32) {
    write_jpeg_with_tiff(path, width, height, &gps_tiff_block());
}

/// JPEG whose IFD0 holds a valid `Make = "Canon"` followed by a `Model`
/// entry pointing past the end of the TIFF block.
pub fn write_jpeg_with_broken_exif(path: &Path, width: u32, height: u32) {
    write_jpeg_with_tiff(path, width, height, &broken_tiff_block());
}

fn write_jpeg_with_tiff(path: &Path, width: u32, height: u32, tiff: &[u8]) {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .expect("encode jpeg");

    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(tiff);

    // Right after SOI.
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).expect("write jpeg");
}

/// Animated PNG with `frames` full-canvas frames.
pub fn write_apng(path: &Path, width: u32, height: u32, frames: u32) {
    let file = File::create(path).expect("create png");
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_animated(frames, 0).expect("set animated");
    encoder.set_frame_delay(1, 10).expect("set delay");

    let mut writer = encoder.write_header().expect("png header");
    for i in 0..frames {
        let pixel = [(i as u8).wrapping_mul(60), 0, 0, 255];
        let data: Vec<u8> = pixel
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        writer.write_image_data(&data).expect("png frame");
    }
    writer.finish().expect("finish png");
}

/// Animated WebP: each frame is a lossless still from the `image` encoder,
/// wrapped in an `ANMF` chunk behind `VP8X` and `ANIM` headers.
pub fn write_animated_webp(path: &Path, width: u32, height: u32, frames: u32) {
    let mut body = b"WEBP".to_vec();

    let mut vp8x = vec![0x12, 0, 0, 0]; // animation | alpha
    vp8x.extend_from_slice(&u24(width - 1));
    vp8x.extend_from_slice(&u24(height - 1));
    riff_chunk(&mut body, b"VP8X", &vp8x);

    let mut anim = 0u32.to_le_bytes().to_vec();
    anim.extend_from_slice(&0u16.to_le_bytes());
    riff_chunk(&mut body, b"ANIM", &anim);

    for i in 0..frames {
        let shade = (i as u8).wrapping_mul(60);
        let still = RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255]));
        let mut encoded = Vec::new();
        WebPEncoder::new_lossless(&mut encoded)
            .write_image(still.as_raw(), width, height, ExtendedColorType::Rgba8)
            .expect("encode webp frame");

        let mut anmf = Vec::new();
        anmf.extend_from_slice(&u24(0)); // x / 2
        anmf.extend_from_slice(&u24(0)); // y / 2
        anmf.extend_from_slice(&u24(width - 1));
        anmf.extend_from_slice(&u24(height - 1));
        anmf.extend_from_slice(&u24(100)); // duration, ms
        anmf.push(0);
        riff_chunk(&mut anmf, b"VP8L", find_riff_chunk(&encoded, b"VP8L"));
        riff_chunk(&mut body, b"ANMF", &anmf);
    }

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    std::fs::write(path, out).expect("write webp");
}

/// Single-page TIFF.
pub fn write_tiff(path: &Path, width: u32, height: u32) {
    RgbImage::new(width, height)
        .save_with_format(path, ImageFormat::Tiff)
        .expect("write tiff");
}

fn u24(n: u32) -> [u8; 3] {
    let [a, b, c, _] = n.to_le_bytes();
    [a, b, c]
}

fn riff_chunk(buf: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) {
    buf.extend_from_slice(fourcc);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        buf.push(0);
    }
}

fn find_riff_chunk<'a>(file: &'a [u8], fourcc: &[u8; 4]) -> &'a [u8] {
    let mut pos = 12;
    while pos + 8 <= file.len() {
        let len = u32::from_le_bytes(file[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let payload = &file[pos + 8..pos + 8 + len];
        if &file[pos..pos + 4] == fourcc {
            return payload;
        }
        pos += 8 + len + len % 2;
    }
    panic!("no {} chunk in encoded webp", String::from_utf8_lossy(fourcc));
}

const ASCII: u16 = 2;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

fn entry(buf: &mut Vec<u8>, tag: u16, typ: u16, count: u32, value: [u8; 4]) {
    buf.extend_from_slice(&tag.to_be_bytes());
    buf.extend_from_slice(&typ.to_be_bytes());
    buf.extend_from_slice(&count.to_be_bytes());
    buf.extend_from_slice(&value);
}

fn broken_tiff_block() -> Vec<u8> {
    // Layout: header(8) | IFD0(30) | "Canon\0"(6)
    const IFD0: u32 = 8;
    const MAKE: u32 = IFD0 + 30;

    let mut buf = b"MM\0\x2A".to_vec();
    buf.extend_from_slice(&IFD0.to_be_bytes());

    buf.extend_from_slice(&2u16.to_be_bytes());
    entry(&mut buf, 0x010F, ASCII, 6, MAKE.to_be_bytes());
    entry(&mut buf, 0x0110, ASCII, 6, 0xFFFFu32.to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(b"Canon\0");

    assert_eq!(buf.len() as u32, MAKE + 6);
    buf
}

fn gps_tiff_block() -> Vec<u8> {
    // Layout: header(8) | IFD0(30) | "Canon\0"(6) | GPS IFD(30) | 3 rationals(24)
    const IFD0: u32 = 8;
    const MAKE: u32 = IFD0 + 30;
    const GPS_IFD: u32 = MAKE + 6;
    const LATITUDE: u32 = GPS_IFD + 30;

    let mut buf = b"MM\0\x2A".to_vec();
    buf.extend_from_slice(&IFD0.to_be_bytes());

    buf.extend_from_slice(&2u16.to_be_bytes());
    entry(&mut buf, 0x010F, ASCII, 6, MAKE.to_be_bytes());
    entry(&mut buf, 0x8825, LONG, 1, GPS_IFD.to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    buf.extend_from_slice(b"Canon\0");

    buf.extend_from_slice(&2u16.to_be_bytes());
    entry(&mut buf, 1, ASCII, 2, *b"N\0\0\0");
    entry(&mut buf, 2, RATIONAL, 3, LATITUDE.to_be_bytes());
    buf.extend_from_slice(&0u32.to_be_bytes());
    for (num, den) in [(40u32, 1u32), (0, 1), (0, 1)] {
        buf.extend_from_slice(&num.to_be_bytes());
        buf.extend_from_slice(&den.to_be_bytes());
    }

    assert_eq!(buf.len() as u32, LATITUDE + 24);
    buf
}
