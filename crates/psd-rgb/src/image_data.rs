/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image data section
//!
//! The composite image is stored planar, every channel in order
//! (Red, Green, Blue, Alpha, ...), either raw or PackBits compressed.
//! We decompress the planes and interleave them so that later stages
//! see one pixel after another.
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::log::trace;

use crate::constants::{ColorModes, CompressionMethod};
use crate::errors::PSDDecodeErrors;
use crate::header::HeaderInfo;

/// Channel interleaved samples ready for color conversion
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PixelBuffer {
    /// Big endian samples, `channels` per pixel
    pub data:             Vec<u8>,
    pub channels:         usize,
    /// 1 or 2
    pub bytes_per_sample: usize
}

impl PixelBuffer {
    /// Bytes between two consecutive pixels
    pub const fn stride(&self) -> usize {
        self.channels * self.bytes_per_sample
    }

    /// Number of complete pixels held
    pub fn pixel_count(&self) -> usize {
        self.data.len() / self.stride()
    }
}

/// Decode PackBits runs from `stream` until `out` is full.
///
/// Control bytes below 128 copy the next `n + 1` bytes literally, control
/// bytes above 128 repeat the next byte `(n ^ 0xFF) + 2` times and 128 is a no-op.
/// A run that doesn't fit in `out` is an error.
pub fn decode_packbits<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, out: &mut [u8]
) -> Result<(), PSDDecodeErrors> {
    let mut position = 0;

    while position < out.len() {
        let control = stream.read_u8_err()?;

        match control.cmp(&128) {
            Ordering::Less => {
                let length = usize::from(control) + 1;
                let run = out
                    .get_mut(position..position + length)
                    .ok_or(PSDDecodeErrors::BadRLE("literal run overflows channel"))?;

                stream.read_exact_bytes(run)?;
                position += length;
            }
            Ordering::Equal => (),
            Ordering::Greater => {
                let length = usize::from(control ^ 0xFF) + 2;
                let value = stream.read_u8_err()?;
                let run = out
                    .get_mut(position..position + length)
                    .ok_or(PSDDecodeErrors::BadRLE("replicate run overflows channel"))?;

                run.fill(value);
                position += length;
            }
        }
    }
    Ok(())
}

/// Interleave `channels` equally sized planes.
///
/// Sample `p` of channel `k` lands at `(p * channels + k) * bytes_per_sample`
pub fn deplanarize(planar: &[u8], channels: usize, bytes_per_sample: usize) -> Vec<u8> {
    let mut out = vec![0; planar.len()];

    if planar.is_empty() || channels == 0 || bytes_per_sample == 0 {
        return out;
    }
    let plane_length = planar.len() / channels;
    let stride = channels * bytes_per_sample;

    for (channel, plane) in planar.chunks_exact(plane_length).enumerate() {
        let offset = channel * bytes_per_sample;

        for (sample, pixel) in plane
            .chunks_exact(bytes_per_sample)
            .zip(out.chunks_exact_mut(stride))
        {
            pixel[offset..offset + bytes_per_sample].copy_from_slice(sample);
        }
    }
    out
}

/// Keep the high byte of every 16 bit big endian sample
fn keep_high_bytes(samples: &[u8]) -> Vec<u8> {
    samples.chunks_exact(2).map(|sample| sample[0]).collect()
}

fn ensure_available<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, stream_len: u64, needed: usize
) -> Result<(), PSDDecodeErrors> {
    let available = stream_len.saturating_sub(stream.position()?) as usize;

    if needed > available {
        return Err(PSDDecodeErrors::TruncatedFile { needed, available });
    }
    Ok(())
}

/// Read the compression method of the image data section
pub fn read_compression<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>
) -> Result<CompressionMethod, PSDDecodeErrors> {
    let code = stream.get_u16_be_err()?;
    let method =
        CompressionMethod::from_int(code).ok_or(PSDDecodeErrors::UnknownCompression(code))?;

    trace!("Compression: {:?}", method);

    match method {
        CompressionMethod::Zip | CompressionMethod::ZipPrediction => {
            Err(PSDDecodeErrors::UnsupportedCompression(method))
        }
        method => Ok(method)
    }
}

/// Decompress the image data that follows the compression method.
///
/// Returns the samples interleaved per pixel, raw 16 bit RGB
/// images are narrowed to their high bytes.
pub fn read_pixels<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, header: &HeaderInfo, method: CompressionMethod, stream_len: u64
) -> Result<PixelBuffer, PSDDecodeErrors> {
    if header.depth != 8 && header.depth != 16 {
        return Err(PSDDecodeErrors::UnsupportedBitDepth(header.depth));
    }
    let bytes_per_sample = header.bytes_per_channel();
    let channels = usize::from(header.channels);

    let plane_length = header
        .pixel_count()
        .checked_mul(bytes_per_sample)
        .ok_or(PSDDecodeErrors::Generic("Image dimensions overflow"))?;
    let total = plane_length
        .checked_mul(channels)
        .ok_or(PSDDecodeErrors::Generic("Image dimensions overflow"))?;

    let planar = match method {
        CompressionMethod::NoCompression => {
            ensure_available(stream, stream_len, total)?;

            let mut planar = vec![0; total];
            stream.read_exact_bytes(&mut planar)?;
            planar
        }
        CompressionMethod::RLE => {
            // The RLE-compressed data is preceded by a 2-byte data count for each row
            // in the data, which we're going to just skip.
            let counts = header.height * channels * 2;
            ensure_available(stream, stream_len, counts)?;
            stream.skip(counts)?;

            // A run encodes at most 128 bytes in 2, refuse streams that can't
            // fill the planes before allocating them
            let min_encoded = plane_length
                .div_ceil(128)
                .checked_mul(2 * channels)
                .ok_or(PSDDecodeErrors::Generic("Image dimensions overflow"))?;
            ensure_available(stream, stream_len, min_encoded)?;

            let mut planar = vec![0; total];

            for plane in planar.chunks_exact_mut(plane_length) {
                decode_packbits(stream, plane)?;
            }
            planar
        }
        CompressionMethod::Zip | CompressionMethod::ZipPrediction => {
            return Err(PSDDecodeErrors::UnsupportedCompression(method));
        }
    };

    let data = deplanarize(&planar, channels, bytes_per_sample);

    if method == CompressionMethod::NoCompression
        && header.color_mode == ColorModes::RGB
        && bytes_per_sample == 2
    {
        return Ok(PixelBuffer {
            data: keep_high_bytes(&data),
            channels,
            bytes_per_sample: 1
        });
    }
    Ok(PixelBuffer {
        data,
        channels,
        bytes_per_sample
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use zune_core::bytestream::ZCursor;

    use super::*;

    fn unpack(encoded: &[u8], length: usize) -> Result<(Vec<u8>, u64), PSDDecodeErrors> {
        let mut stream = ZReader::new(ZCursor::new(encoded));
        let mut out = vec![0; length];
        decode_packbits(&mut stream, &mut out)?;
        Ok((out, stream.position()?))
    }

    fn header(channels: u16, depth: u16, color_mode: ColorModes) -> HeaderInfo {
        HeaderInfo {
            channels,
            width: 2,
            height: 1,
            depth,
            color_mode
        }
    }

    #[test]
    fn literal_run() {
        let (out, consumed) = unpack(&[0x03, 10, 20, 30, 40], 4).unwrap();
        assert_eq!(out, [10, 20, 30, 40]);
        assert_eq!(consumed, 5);
    }

    #[test]
    fn replicate_run() {
        let (out, consumed) = unpack(&[0xFE, 7], 3).unwrap();
        assert_eq!(out, [7, 7, 7]);
        assert_eq!(consumed, 2);

        let (out, _) = unpack(&[0x81, 1], 128).unwrap();
        assert!(out.iter().all(|x| *x == 1));
    }

    #[test]
    fn no_op_control_byte() {
        let (out, consumed) = unpack(&[0x80, 0x00, 5], 1).unwrap();
        assert_eq!(out, [5]);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn mixed_runs() {
        let (out, _) = unpack(&[0x01, 1, 2, 0xFF, 9, 0x80, 0x00, 3], 5).unwrap();
        assert_eq!(out, [1, 2, 9, 9, 3]);
    }

    #[test]
    fn overrunning_runs_fail() {
        assert!(matches!(
            unpack(&[0x03, 1, 2, 3, 4], 3),
            Err(PSDDecodeErrors::BadRLE(_))
        ));
        assert!(matches!(
            unpack(&[0xFE, 7], 2),
            Err(PSDDecodeErrors::BadRLE(_))
        ));
    }

    #[test]
    fn exhausted_stream_fails() {
        assert!(unpack(&[0x80, 0x80], 1).is_err());
        assert!(unpack(&[0x05, 1, 2], 6).is_err());
    }

    #[test]
    fn deplanarize_interleaves_channels() {
        let planar = [1, 2, 3, 10, 20, 30];
        assert_eq!(deplanarize(&planar, 2, 1), [1, 10, 2, 20, 3, 30]);

        // 16 bit samples move as a whole
        let planar = [0xA1, 0xA2, 0xB1, 0xB2, 0xC1, 0xC2, 0xD1, 0xD2];
        assert_eq!(
            deplanarize(&planar, 2, 2),
            [0xA1, 0xA2, 0xC1, 0xC2, 0xB1, 0xB2, 0xD1, 0xD2]
        );
    }

    #[test]
    fn raw_rgb16_keeps_high_bytes() {
        let mut data = 0_u16.to_be_bytes().to_vec();
        for sample in [0xFF01_u16, 0x0102, 0x2000, 0x3000, 0x4000, 0x5000] {
            data.extend_from_slice(&sample.to_be_bytes());
        }
        let mut stream = ZReader::new(ZCursor::new(&data));
        let method = read_compression(&mut stream).unwrap();
        let buffer = read_pixels(
            &mut stream,
            &header(3, 16, ColorModes::RGB),
            method,
            data.len() as u64
        )
        .unwrap();

        assert_eq!(buffer.bytes_per_sample, 1);
        assert_eq!(buffer.data, [0xFF, 0x20, 0x40, 0x01, 0x30, 0x50]);
        assert_eq!(buffer.pixel_count(), 2);
    }

    #[test]
    fn rle_planes_are_decoded_per_channel() {
        let mut data = 1_u16.to_be_bytes().to_vec();
        // one row count per channel, ignored
        data.extend_from_slice(&[0, 2, 0, 3]);
        data.extend_from_slice(&[0xFF, 5]);
        data.extend_from_slice(&[0x01, 6, 7]);

        let mut stream = ZReader::new(ZCursor::new(&data));
        let method = read_compression(&mut stream).unwrap();
        assert_eq!(method, CompressionMethod::RLE);

        let buffer = read_pixels(
            &mut stream,
            &header(2, 8, ColorModes::Grayscale),
            method,
            data.len() as u64
        )
        .unwrap();
        assert_eq!(buffer.data, [5, 6, 5, 7]);
        assert_eq!(buffer.stride(), 2);
    }

    #[test]
    fn compression_codes() {
        let read = |code: u16| {
            let data = code.to_be_bytes();
            read_compression(&mut ZReader::new(ZCursor::new(&data)))
        };
        assert_eq!(read(0).unwrap(), CompressionMethod::NoCompression);
        assert!(matches!(
            read(2),
            Err(PSDDecodeErrors::UnsupportedCompression(CompressionMethod::Zip))
        ));
        assert!(matches!(
            read(3),
            Err(PSDDecodeErrors::UnsupportedCompression(
                CompressionMethod::ZipPrediction
            ))
        ));
        assert!(matches!(read(7), Err(PSDDecodeErrors::UnknownCompression(7))));
    }

    #[test]
    fn unsupported_depths() {
        let data = [0_u8; 16];
        for depth in [1, 32] {
            let mut stream = ZReader::new(ZCursor::new(&data));
            assert!(matches!(
                read_pixels(
                    &mut stream,
                    &header(1, depth, ColorModes::Grayscale),
                    CompressionMethod::NoCompression,
                    16
                ),
                Err(PSDDecodeErrors::UnsupportedBitDepth(d)) if d == depth
            ));
        }
    }

    #[test]
    fn rle_stream_too_short_for_dimensions() {
        let header = HeaderInfo {
            channels:   24,
            width:      16384,
            height:     16384,
            depth:      16,
            color_mode: ColorModes::MultiChannel
        };
        // row counts and nothing else
        let mut data = vec![0_u8; 16384 * 24 * 2];
        data.extend_from_slice(&[0xFF, 1]);

        let mut stream = ZReader::new(ZCursor::new(&data));
        let result = read_pixels(
            &mut stream,
            &header,
            CompressionMethod::RLE,
            data.len() as u64
        );

        assert!(matches!(
            result,
            Err(PSDDecodeErrors::TruncatedFile {
                needed:    201_326_592,
                available: 2
            })
        ));
    }

    #[test]
    fn truncated_raw_data() {
        let data = [0_u8; 3];
        let mut stream = ZReader::new(ZCursor::new(&data));
        assert!(matches!(
            read_pixels(
                &mut stream,
                &header(3, 8, ColorModes::RGB),
                CompressionMethod::NoCompression,
                3
            ),
            Err(PSDDecodeErrors::TruncatedFile {
                needed:    6,
                available: 3
            })
        ));
    }
}
