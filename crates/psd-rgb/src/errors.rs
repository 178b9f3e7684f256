/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::boxed::Box;
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::constants::{ColorModes, CompressionMethod, PSD_IDENTIFIER_BE, RESOURCE_SIGNATURE_BE};

/// The part of the file the decoder was working on when an error occurred
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DecodeStage {
    Header,
    ColorModeData,
    ImageResources,
    LayerAndMask,
    ImageData
}

impl DecodeStage {
    pub const fn name(self) -> &'static str {
        match self {
            DecodeStage::Header => "header",
            DecodeStage::ColorModeData => "color-mode-data",
            DecodeStage::ImageResources => "image-resource",
            DecodeStage::LayerAndMask => "layer-mask",
            DecodeStage::ImageData => "image-data"
        }
    }
}

/// PSDDecodeErrors that can occur during PSD decoding
#[non_exhaustive]
pub enum PSDDecodeErrors {
    /// File does not start with `8BPS`
    WrongMagicBytes(u32),
    /// Version field is not 1
    UnsupportedFileType(u16),
    /// Color mode field holds a value Photoshop doesn't define
    UnknownColorMode(u16),
    UnsupportedChannelCount(u16),
    UnsupportedBitDepth(u16),
    UnsupportedColorFormat(ColorModes),
    /// Maximum allowed, found
    LargeDimensions(usize, usize),
    ZeroDimensions,
    /// Stream ended before a record could be read, bytes needed and bytes left
    TruncatedFile { needed: usize, available: usize },
    /// ZIP compressed image data
    UnsupportedCompression(CompressionMethod),
    UnknownCompression(u16),
    /// A resource record didn't start with `8BIM` and the decoder is strict
    BadResourceSignature(u32),
    CorruptResourceBlock(&'static str),
    BadRLE(&'static str),
    /// Indexed image without a usable color table
    MissingPalette,
    Generic(&'static str),
    IoErrors(ZByteIoError),
    /// An error tagged with the section being decoded when it occurred
    Stage(DecodeStage, Box<PSDDecodeErrors>)
}

impl PSDDecodeErrors {
    /// Tag this error with the stage it occurred in.
    ///
    /// Errors that already carry a stage are returned unchanged
    pub fn at_stage(self, stage: DecodeStage) -> PSDDecodeErrors {
        match self {
            PSDDecodeErrors::Stage(..) => self,
            err => PSDDecodeErrors::Stage(stage, Box::new(err))
        }
    }

    /// The stage this error was raised in, if known
    pub fn stage(&self) -> Option<DecodeStage> {
        match self {
            PSDDecodeErrors::Stage(stage, _) => Some(*stage),
            _ => None
        }
    }

    /// The error without its stage tag
    pub fn root_cause(&self) -> &PSDDecodeErrors {
        match self {
            PSDDecodeErrors::Stage(_, inner) => inner.root_cause(),
            err => err
        }
    }

    /// Whether this is one of the errors raised for an invalid file header
    pub fn is_header_error(&self) -> bool {
        matches!(
            self.root_cause(),
            PSDDecodeErrors::WrongMagicBytes(_)
                | PSDDecodeErrors::UnsupportedFileType(_)
                | PSDDecodeErrors::UnknownColorMode(_)
                | PSDDecodeErrors::UnsupportedChannelCount(_)
                | PSDDecodeErrors::LargeDimensions(..)
                | PSDDecodeErrors::ZeroDimensions
        )
    }
}

impl Debug for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PSDDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            PSDDecodeErrors::WrongMagicBytes(bytes) => {
                writeln!(
                    f,
                    "Expected {:?} but found  {:?}, not a PSD image",
                    PSD_IDENTIFIER_BE.to_be_bytes(),
                    bytes.to_be_bytes()
                )
            }
            PSDDecodeErrors::UnsupportedFileType(version) => {
                writeln!(
                    f,
                    "Unsupported file version {version:?}, known versions are 1",
                )
            }
            PSDDecodeErrors::UnknownColorMode(mode) => {
                writeln!(f, "Unknown color mode {mode}")
            }
            PSDDecodeErrors::UnsupportedChannelCount(channels) => {
                writeln!(f, "Unsupported channel count {channels:?}")
            }
            PSDDecodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(
                    f,
                    "Unsupported bit depth {depth:?}, supported depths are 8 and 16",
                )
            }
            PSDDecodeErrors::UnsupportedColorFormat(color) => {
                writeln!(f, "Unsupported color format {color:?}")
            }
            PSDDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}",
                )
            }
            PSDDecodeErrors::ZeroDimensions => {
                writeln!(f, "Zero found where not expected")
            }
            PSDDecodeErrors::TruncatedFile { needed, available } => {
                writeln!(
                    f,
                    "Unexpected end of file, needed {needed} bytes but only {available} remain"
                )
            }
            PSDDecodeErrors::UnsupportedCompression(method) => {
                writeln!(f, "{method:?} compressed image data is not supported")
            }
            PSDDecodeErrors::UnknownCompression(code) => {
                writeln!(f, "Unknown compression format {code}")
            }
            PSDDecodeErrors::BadResourceSignature(tag) => {
                writeln!(
                    f,
                    "Expected image resource signature {:?} but found {:?}",
                    RESOURCE_SIGNATURE_BE.to_be_bytes(),
                    tag.to_be_bytes()
                )
            }
            PSDDecodeErrors::CorruptResourceBlock(reason) => {
                writeln!(f, "Corrupt image resource block: {reason}")
            }
            PSDDecodeErrors::BadRLE(reason) => {
                writeln!(f, "Bad RLE: {reason}")
            }
            PSDDecodeErrors::MissingPalette => {
                writeln!(
                    f,
                    "Indexed image without a 768 byte color table or color count"
                )
            }
            PSDDecodeErrors::IoErrors(e) => {
                writeln!(f, "I/O error :{:?}", e)
            }
            PSDDecodeErrors::Stage(stage, e) => {
                write!(f, "Error reading {} section: {:?}", stage.name(), e)
            }
        }
    }
}

impl Display for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for PSDDecodeErrors {}

impl From<&'static str> for PSDDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for PSDDecodeErrors {
    fn from(r: ZByteIoError) -> Self {
        match r {
            ZByteIoError::NotEnoughBytes(needed, available) => {
                Self::TruncatedFile { needed, available }
            }
            r => Self::IoErrors(r)
        }
    }
}
