/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion of decompressed samples to RGB
use alloc::vec::Vec;

use zune_core::log::debug;

use crate::color_mode::ColorModeData;
use crate::constants::ColorModes;
use crate::errors::PSDDecodeErrors;
use crate::header::HeaderInfo;
use crate::image_data::PixelBuffer;
use crate::resources::ImageResources;
use crate::utils::read_be_sample;

// D65 reference white, 2° observer
const REF_X: f64 = 95.047;
const REF_Y: f64 = 100.000;
const REF_Z: f64 = 108.883;

/// Turns one interleaved pixel into RGB, picked once per image from its color mode
#[derive(Debug, Copy, Clone)]
pub enum PixelDecoder<'a> {
    /// Grayscale and duotone
    Gray,
    Indexed { palette: &'a [u8] },
    Rgb,
    Cmyk,
    /// CMY, plus black when there are exactly four channels
    MultiChannel { has_black: bool },
    Lab
}

impl<'a> PixelDecoder<'a> {
    /// Pick the decoder for the header's color mode, checking that `buffer`
    /// has what the mode needs
    pub fn new(
        header: &HeaderInfo, color_data: &'a ColorModeData, resources: &ImageResources,
        buffer: &PixelBuffer
    ) -> Result<PixelDecoder<'a>, PSDDecodeErrors> {
        let channels = buffer.channels;
        let needs_channels = |count: usize| {
            if channels < count {
                return Err(PSDDecodeErrors::UnsupportedChannelCount(header.channels));
            }
            Ok(())
        };

        let decoder = match header.color_mode {
            ColorModes::Bitmap => {
                return Err(PSDDecodeErrors::UnsupportedColorFormat(ColorModes::Bitmap));
            }
            ColorModes::Grayscale | ColorModes::DuoTone => PixelDecoder::Gray,
            ColorModes::IndexedColor => {
                if buffer.bytes_per_sample != 1 {
                    return Err(PSDDecodeErrors::UnsupportedBitDepth(header.depth));
                }
                let has_colors = resources.color_count.is_some_and(|count| count > 0);

                match color_data.palette() {
                    Some(palette) if has_colors => PixelDecoder::Indexed { palette },
                    _ => return Err(PSDDecodeErrors::MissingPalette)
                }
            }
            ColorModes::RGB => {
                needs_channels(3)?;
                PixelDecoder::Rgb
            }
            ColorModes::CMYK => {
                needs_channels(4)?;
                PixelDecoder::Cmyk
            }
            ColorModes::MultiChannel => {
                needs_channels(3)?;
                // only a four channel image carries black, extra channels are spot colors
                PixelDecoder::MultiChannel {
                    has_black: channels == 4
                }
            }
            ColorModes::LabColor => {
                needs_channels(3)?;
                PixelDecoder::Lab
            }
        };
        debug!("Using {:?} pixel decoder", decoder);

        Ok(decoder)
    }

    /// Convert a single pixel whose samples are `bytes_per_sample` wide
    pub fn decode_pixel(&self, pixel: &[u8], bytes_per_sample: usize) -> [u8; 3] {
        let sample = |channel: usize| {
            let start = channel * bytes_per_sample;
            read_be_sample(&pixel[start..start + bytes_per_sample])
        };
        let depth = 8 * bytes_per_sample as u32;
        let to_u8 = |value: u32| (value >> (depth - 8)).min(255) as u8;

        match self {
            PixelDecoder::Gray => {
                let value = to_u8(sample(0));
                [value, value, value]
            }
            PixelDecoder::Indexed { palette } => {
                let index = usize::from(pixel[0]);
                [palette[index], palette[index + 256], palette[index + 512]]
            }
            PixelDecoder::Rgb => [to_u8(sample(0)), to_u8(sample(1)), to_u8(sample(2))],
            PixelDecoder::Cmyk => {
                let max = f64::from((1_u32 << depth) - 1);
                let ink = |channel: usize| 1.0 - f64::from(sample(channel)) / max;

                cmyk_to_rgb(ink(0), ink(1), ink(2), ink(3))
            }
            PixelDecoder::MultiChannel { has_black } => {
                let max = f64::from((1_u32 << depth) - 1);
                let ink = |channel: usize| 1.0 - f64::from(sample(channel)) / max;
                let black = if *has_black { ink(3) } else { 0.0 };

                cmyk_to_rgb(ink(0), ink(1), ink(2), black)
            }
            PixelDecoder::Lab => {
                let max = f64::from(1_u32 << depth);
                let l_coef = max / 100.0;
                let ab_coef = max / 256.0;

                let l = (f64::from(sample(0)) / l_coef).trunc();
                let a = (f64::from(sample(1)) / ab_coef - 128.0).trunc();
                let b = (f64::from(sample(2)) / ab_coef - 128.0).trunc();

                lab_to_rgb(l, a, b)
            }
        }
    }
}

/// Convert every pixel of `buffer` to RGB.
///
/// The result has exactly `pixel_count` entries
pub fn compose(
    buffer: &PixelBuffer, decoder: PixelDecoder, pixel_count: usize
) -> Result<Vec<[u8; 3]>, PSDDecodeErrors> {
    let stride = buffer.stride();

    if buffer.pixel_count() < pixel_count {
        return Err(PSDDecodeErrors::TruncatedFile {
            needed:    pixel_count * stride,
            available: buffer.data.len()
        });
    }

    let pixels = buffer
        .data
        .chunks_exact(stride)
        .take(pixel_count)
        .map(|pixel| decoder.decode_pixel(pixel, buffer.bytes_per_sample))
        .collect();

    Ok(pixels)
}

#[inline]
fn clamp_u8(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Convert ink coverages in `0.0..=1.0` to RGB
pub fn cmyk_to_rgb(c: f64, m: f64, y: f64, k: f64) -> [u8; 3] {
    let component = |ink: f64| clamp_u8((255.0 * (1.0 - (ink * (1.0 - k) + k))).round());

    [component(c), component(m), component(y)]
}

/// CIE L*a*b* to XYZ against the D65 white point
pub fn lab_to_xyz(l: f64, a: f64, b: f64) -> [f64; 3] {
    let var_y = (l + 16.0) / 116.0;
    let var_x = a / 500.0 + var_y;
    let var_z = var_y - b / 200.0;

    let f = |v: f64| {
        let cube = v * v * v;
        if cube > 0.008856 {
            cube
        } else {
            (v - 16.0 / 116.0) / 7.787
        }
    };

    [REF_X * f(var_x), REF_Y * f(var_y), REF_Z * f(var_z)]
}

/// XYZ (0..100 scale) to sRGB
pub fn xyz_to_rgb(x: f64, y: f64, z: f64) -> [u8; 3] {
    let (x, y, z) = (x / 100.0, y / 100.0, z / 100.0);

    let linear = [
        x * 3.2406 + y * -1.5372 + z * -0.4986,
        x * -0.9689 + y * 1.8758 + z * 0.0415,
        x * 0.0557 + y * -0.2040 + z * 1.0570
    ];

    linear.map(|v| {
        let companded = if v > 0.0031308 {
            1.055 * v.powf(1.0 / 2.4) - 0.055
        } else {
            12.92 * v
        };
        clamp_u8((companded * 256.0).trunc())
    })
}

pub fn lab_to_rgb(l: f64, a: f64, b: f64) -> [u8; 3] {
    let [x, y, z] = lab_to_xyz(l, a, b);
    xyz_to_rgb(x, y, z)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn header(channels: u16, depth: u16, color_mode: ColorModes) -> HeaderInfo {
        HeaderInfo {
            channels,
            width: 1,
            height: 1,
            depth,
            color_mode
        }
    }

    fn buffer(data: &[u8], channels: usize, bytes_per_sample: usize) -> PixelBuffer {
        PixelBuffer {
            data: data.to_vec(),
            channels,
            bytes_per_sample
        }
    }

    #[test]
    fn cmyk_extremes() {
        assert_eq!(cmyk_to_rgb(0.0, 0.0, 0.0, 0.0), [255, 255, 255]);
        assert_eq!(cmyk_to_rgb(1.0, 1.0, 1.0, 1.0), [0, 0, 0]);
        assert_eq!(cmyk_to_rgb(1.0, 0.0, 0.0, 0.0), [0, 255, 255]);
        assert_eq!(cmyk_to_rgb(0.0, 0.0, 0.0, 0.5), [128, 128, 128]);
    }

    #[test]
    fn lab_extremes() {
        assert_eq!(lab_to_rgb(100.0, 0.0, 0.0), [255, 255, 255]);
        assert_eq!(lab_to_rgb(0.0, 0.0, 0.0), [0, 0, 0]);

        let [r, g, b] = lab_to_rgb(50.0, 80.0, 60.0);
        assert!(r > g && r > b);
    }

    #[test]
    fn indexed_uses_palette_planes() {
        let mut palette = vec![0_u8; 768];
        palette[5] = 10;
        palette[5 + 256] = 20;
        palette[5 + 512] = 30;

        let color_data = ColorModeData { data: palette };
        let resources = ImageResources {
            color_count: Some(256),
            ..Default::default()
        };
        let pixels = buffer(&[5], 1, 1);
        let header = header(1, 8, ColorModes::IndexedColor);

        let decoder = PixelDecoder::new(&header, &color_data, &resources, &pixels).unwrap();
        assert_eq!(compose(&pixels, decoder, 1).unwrap(), [[10, 20, 30]]);
    }

    #[test]
    fn indexed_without_palette_or_count() {
        let header = header(1, 8, ColorModes::IndexedColor);
        let pixels = buffer(&[5], 1, 1);
        let with_count = ImageResources {
            color_count: Some(16),
            ..Default::default()
        };
        let palette = ColorModeData {
            data: vec![0; 768]
        };

        assert!(matches!(
            PixelDecoder::new(&header, &ColorModeData::default(), &with_count, &pixels),
            Err(PSDDecodeErrors::MissingPalette)
        ));
        assert!(matches!(
            PixelDecoder::new(&header, &palette, &ImageResources::default(), &pixels),
            Err(PSDDecodeErrors::MissingPalette)
        ));
    }

    #[test]
    fn gray_narrows_sixteen_bits() {
        let header = header(1, 16, ColorModes::Grayscale);
        let pixels = buffer(&[0xAB, 0xCD, 0xFF, 0xFF], 1, 2);
        let color_data = ColorModeData::default();
        let decoder = PixelDecoder::new(
            &header,
            &color_data,
            &ImageResources::default(),
            &pixels
        )
        .unwrap();

        assert_eq!(
            compose(&pixels, decoder, 2).unwrap(),
            [[0xAB, 0xAB, 0xAB], [0xFF, 0xFF, 0xFF]]
        );
    }

    #[test]
    fn gray_ignores_extra_channels() {
        let header = header(2, 8, ColorModes::DuoTone);
        let pixels = buffer(&[10, 255, 20, 0], 2, 1);
        let color_data = ColorModeData::default();
        let decoder = PixelDecoder::new(
            &header,
            &color_data,
            &ImageResources::default(),
            &pixels
        )
        .unwrap();

        assert_eq!(
            compose(&pixels, decoder, 2).unwrap(),
            [[10, 10, 10], [20, 20, 20]]
        );
    }

    #[test]
    fn cmyk_samples_are_inverted() {
        let header = header(4, 8, ColorModes::CMYK);
        // stored values are inverted, 255 means no ink
        let pixels = buffer(&[255, 255, 255, 255, 0, 255, 255, 255], 4, 1);
        let color_data = ColorModeData::default();
        let decoder = PixelDecoder::new(
            &header,
            &color_data,
            &ImageResources::default(),
            &pixels
        )
        .unwrap();

        assert_eq!(
            compose(&pixels, decoder, 2).unwrap(),
            [[255, 255, 255], [0, 255, 255]]
        );
    }

    #[test]
    fn multichannel_without_black() {
        let header = header(3, 8, ColorModes::MultiChannel);
        let pixels = buffer(&[255, 0, 255], 3, 1);
        let color_data = ColorModeData::default();
        let decoder = PixelDecoder::new(
            &header,
            &color_data,
            &ImageResources::default(),
            &pixels
        )
        .unwrap();

        assert!(matches!(
            decoder,
            PixelDecoder::MultiChannel { has_black: false }
        ));
        assert_eq!(compose(&pixels, decoder, 1).unwrap(), [[255, 0, 255]]);
    }

    #[test]
    fn multichannel_black_only_with_four_channels() {
        let color_data = ColorModeData::default();
        let resources = ImageResources::default();

        let four = buffer(&[255, 255, 255, 0], 4, 1);
        let decoder =
            PixelDecoder::new(&header(4, 8, ColorModes::MultiChannel), &color_data, &resources, &four)
                .unwrap();
        assert!(matches!(decoder, PixelDecoder::MultiChannel { has_black: true }));
        assert_eq!(compose(&four, decoder, 1).unwrap(), [[0, 0, 0]]);

        // fourth and fifth channels are spot colors here, not black
        let five = buffer(&[255, 255, 255, 0, 0], 5, 1);
        let decoder =
            PixelDecoder::new(&header(5, 8, ColorModes::MultiChannel), &color_data, &resources, &five)
                .unwrap();
        assert!(matches!(decoder, PixelDecoder::MultiChannel { has_black: false }));
        assert_eq!(compose(&five, decoder, 1).unwrap(), [[255, 255, 255]]);
    }

    #[test]
    fn modes_need_enough_channels() {
        let pixels = buffer(&[0, 0], 2, 1);
        for mode in [ColorModes::RGB, ColorModes::CMYK, ColorModes::LabColor] {
            assert!(matches!(
                PixelDecoder::new(
                    &header(2, 8, mode),
                    &ColorModeData::default(),
                    &ImageResources::default(),
                    &pixels
                ),
                Err(PSDDecodeErrors::UnsupportedChannelCount(2))
            ));
        }
    }

    #[test]
    fn lab_pixels() {
        let header = header(3, 8, ColorModes::LabColor);
        // L = 255 / 2.56 -> 99, a = b = 128 -> 0
        let pixels = buffer(&[255, 128, 128, 0, 128, 128], 3, 1);
        let color_data = ColorModeData::default();
        let decoder = PixelDecoder::new(
            &header,
            &color_data,
            &ImageResources::default(),
            &pixels
        )
        .unwrap();
        let out = compose(&pixels, decoder, 2).unwrap();

        assert!(out[0].iter().all(|c| *c > 245));
        assert_eq!(out[1], [0, 0, 0]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        let pixels = buffer(&[1, 2, 3], 3, 1);
        assert!(compose(&pixels, PixelDecoder::Rgb, 2).is_err());
    }
}
