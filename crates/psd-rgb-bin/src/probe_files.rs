/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::metadata;
use std::path::PathBuf;

use clap::ArgMatches;
use log::warn;

use crate::cmd_parsers::get_decoder_options;
use crate::cmd_parsers::global_options::CmdOptions;
use crate::errors::CliErrors;
use crate::file_io::PsdFile;
use crate::serde::Metadata;

/// Probe input files, extract metadata, and print to standard output.
pub fn probe_input_files(args: &ArgMatches, cmd_opts: &CmdOptions) -> Result<(), CliErrors> {
    let Some(inputs) = args.get_raw("in") else {
        return Ok(());
    };
    // We'll just be reading headers so size limits don't matter
    let options = get_decoder_options(cmd_opts)
        .set_max_width(usize::MAX)
        .set_max_height(usize::MAX);

    for in_file in inputs {
        if !PathBuf::from(in_file).exists() {
            warn!("Skipping {:?}, file does not exist", in_file);
            continue;
        }
        let size = metadata(in_file)?.len();
        let mut decoder = PsdFile::new(in_file.to_os_string(), options).decoder()?;

        if let Err(e) = decoder.decode_headers() {
            warn!("Could not read headers of {:?}: {:?}", in_file, e);
            continue;
        }
        if let Some(header) = decoder.header() {
            let real_metadata = Metadata::new(
                in_file.to_os_string(),
                size,
                header,
                decoder.color_mode_data().len(),
                decoder.resources()
            );
            println!("{}", serde_json::to_string_pretty(&real_metadata)?);
        }
    }
    Ok(())
}
