/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

/// `8BPS`, the file signature
pub const PSD_IDENTIFIER_BE: u32 = 0x3842_5053;

/// `8BIM`, the signature of Photoshop defined image resources
pub const RESOURCE_SIGNATURE_BE: u32 = 0x3842_494D;

/// Size of the fixed file header
pub const PSD_HEADER_SIZE: usize = 26;

/// Largest channel count the format allows
pub const MAX_CHANNELS: u16 = 24;

/// Largest width or height the format allows
pub const MAX_DIMENSIONS: usize = 30000;

/// Length of an indexed color palette, 256 reds, 256 greens then 256 blues
pub const PALETTE_SIZE: usize = 768;

/// Pixels per meter used when the file carries no resolution info (96 DPI)
pub const DEFAULT_PIXELS_PER_METER: u32 = 3780;

/// Global lighting angle used when the file doesn't override it
pub const DEFAULT_GLOBAL_ANGLE: i32 = 30;

/// Fixed part of a thumbnail resource preceding the pixel payload
pub const THUMBNAIL_HEADER_SIZE: usize = 28;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorModes {
    Bitmap = 0,
    Grayscale = 1,
    IndexedColor = 2,
    RGB = 3,
    CMYK = 4,
    MultiChannel = 7,
    DuoTone = 8,
    LabColor = 9
}

impl ColorModes {
    pub fn from_int(int: u16) -> Option<ColorModes> {
        use crate::constants::ColorModes::{
            Bitmap, DuoTone, Grayscale, IndexedColor, LabColor, MultiChannel, CMYK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(IndexedColor),
            3 => Some(RGB),
            4 => Some(CMYK),
            7 => Some(MultiChannel),
            8 => Some(DuoTone),
            9 => Some(LabColor),
            _ => None
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CompressionMethod {
    NoCompression = 0,
    RLE = 1,
    Zip = 2,
    ZipPrediction = 3
}

impl CompressionMethod {
    pub fn from_int(int: u16) -> Option<CompressionMethod> {
        match int {
            0 => Some(Self::NoCompression),
            1 => Some(Self::RLE),
            2 => Some(Self::Zip),
            3 => Some(Self::ZipPrediction),
            _ => None
        }
    }
}

/// Image resource IDs the decoder understands
pub mod resource_ids {
    pub const RESOLUTION_INFO: u16 = 1005;
    pub const DISPLAY_INFO: u16 = 1007;
    pub const THUMBNAIL_BGR: u16 = 1033;
    pub const COPYRIGHT_FLAG: u16 = 1034;
    pub const THUMBNAIL_RGB: u16 = 1036;
    pub const GLOBAL_ANGLE: u16 = 1037;
    pub const INDEXED_COLOR_COUNT: u16 = 1046;
    pub const TRANSPARENT_INDEX: u16 = 1047;
}
