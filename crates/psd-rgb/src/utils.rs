/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Byte order helpers
//!
//! Everything in a PSD file is big endian, fields read through
//! `ZReader::get_*_be_err` are already in native order, these helpers cover
//! the sample bytes that stay in buffers until color conversion.

/// Reverse a big endian field in place, turning it into little endian and back.
///
/// Applying this twice gives back the original bytes
#[inline]
pub fn swap_bytes(field: &mut [u8]) {
    field.reverse();
}

/// Read a big endian sample of one or two bytes
#[inline(always)]
pub fn read_be_sample(sample: &[u8]) -> u32 {
    match sample {
        [a] => u32::from(*a),
        [a, b] => u32::from(u16::from_be_bytes([*a, *b])),
        _ => sample
            .iter()
            .fold(0_u32, |acc, byte| (acc << 8) | u32::from(*byte))
    }
}

/// Round `value` up to the next even number, PSD pads resource names and data
/// to even lengths
#[inline(always)]
pub const fn pad_to_even(value: usize) -> usize {
    value + (value & 1)
}
