/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

/// A fully decoded composite image
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DecodedImage {
    pub width:            usize,
    pub height:           usize,
    /// `width * height` RGB triples in row major order
    pub pixels:           Vec<[u8; 3]>,
    /// Horizontal and vertical pixel density
    pub pixels_per_meter: (u32, u32)
}

impl DecodedImage {
    /// Pixels flattened to interleaved `RGB` bytes
    pub fn as_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Pixels per inch on both axes, rounded to the nearest integer
    pub fn dpi(&self) -> (u32, u32) {
        let to_dpi = |ppm: u32| ((f64::from(ppm) * 0.0254).round()) as u32;
        (to_dpi(self.pixels_per_meter.0), to_dpi(self.pixels_per_meter.1))
    }
}
