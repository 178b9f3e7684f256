/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Formatter};

use psd_rgb::errors::PSDDecodeErrors;

pub enum CliErrors {
    Io(std::io::Error),
    Decode(PSDDecodeErrors),
    GenericString(String)
}

impl Debug for CliErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CliErrors::Io(err) => writeln!(f, "I/O error: {err}"),
            CliErrors::Decode(err) => writeln!(f, "Decoding error: {err:?}"),
            CliErrors::GenericString(reason) => writeln!(f, "{reason}")
        }
    }
}

impl From<std::io::Error> for CliErrors {
    fn from(value: std::io::Error) -> Self {
        CliErrors::Io(value)
    }
}

impl From<PSDDecodeErrors> for CliErrors {
    fn from(value: PSDDecodeErrors) -> Self {
        CliErrors::Decode(value)
    }
}

impl From<serde_json::Error> for CliErrors {
    fn from(value: serde_json::Error) -> Self {
        CliErrors::GenericString(format!("Could not serialize metadata: {value}"))
    }
}

impl From<zune_ppm::PPMEncodeErrors> for CliErrors {
    fn from(value: zune_ppm::PPMEncodeErrors) -> Self {
        CliErrors::GenericString(format!("ppm: {value:?}"))
    }
}
