//! Shared fixtures for the integration tests

#![allow(dead_code)]

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Photo-like fixture: a colored product block on a white backdrop
pub fn write_product_photo(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for y in height / 4..height * 3 / 4 {
        for x in width / 4..width * 3 / 4 {
            image.put_pixel(x, y, Rgb([30, 90, 160]));
        }
    }

    let path = dir.join(name);
    image.save(&path).expect("write product photo");
    path
}

/// Opaque red logo
pub fn write_logo(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([220, 20, 20, 255]))
        .save(&path)
        .expect("write logo");
    path
}

/// File with an image extension but garbage contents
pub fn write_corrupt_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not a png").expect("write corrupt image");
    path
}

pub fn write_text_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "inventory notes").expect("write text file");
    path
}

/// Regular files in `dir`, sorted by name
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
