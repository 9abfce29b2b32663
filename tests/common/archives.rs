use std::io::{Cursor, Write};

use image::{ImageFormat, Rgb, RgbImage};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A tiny valid image in the requested format.
pub fn image_bytes(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb([200, 30, 30]));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), format).unwrap();
    out
}

pub fn png_bytes() -> Vec<u8> {
    image_bytes(ImageFormat::Png)
}

/// Build a zip in memory from (name, contents) pairs. Names ending in `/`
/// become directory entries.
pub fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}
