/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io::{stdin, BufRead, BufWriter, Write};
use std::path::Path;

use clap::ArgMatches;
use log::{debug, info, warn};

use crate::cmd_parsers::get_decoder_options;
use crate::cmd_parsers::global_options::CmdOptions;
use crate::errors::CliErrors;
use crate::file_io::{write_ppm, PsdFile};
use crate::probe_files::probe_input_files;

pub(crate) fn decode_files_from_cmd(
    args: &ArgMatches, cmd_opts: &CmdOptions
) -> Result<(), CliErrors> {
    if args.get_flag("probe") {
        return probe_input_files(args, cmd_opts);
    }
    info!("Decoding files from input");

    let inputs: Vec<&OsStr> = args.get_raw("in").map(Iterator::collect).unwrap_or_default();
    let mut outputs = args.get_raw("out").into_iter().flatten();
    let mut thumbnails = args.get_raw("thumbnail").into_iter().flatten();

    let options = get_decoder_options(cmd_opts);

    for in_file in inputs {
        let out_file = outputs.next();
        let thumbnail_file = thumbnails.next();

        verify_input(in_file)?;
        for target in out_file.iter().chain(thumbnail_file.iter()) {
            verify_output(in_file, target, cmd_opts)?;
        }

        let mut decoder = PsdFile::new(in_file.to_os_string(), options).decoder()?;
        let image = decoder.decode()?;

        info!(
            "Decoded {:?}: {}x{}, compression {:?}",
            in_file,
            image.width,
            image.height,
            decoder.compression()
        );

        if let Some(out_file) = out_file {
            debug!("Writing {:?} as a ppm file", out_file);
            let mut writer = BufWriter::new(create_file(out_file)?);
            write_ppm(&image, &mut writer)?;
            writer.flush()?;
        }

        if let Some(thumbnail_file) = thumbnail_file {
            match decoder.thumbnail() {
                Some(thumbnail) => {
                    debug!(
                        "Writing {}x{} thumbnail to {:?}",
                        thumbnail.width, thumbnail.height, thumbnail_file
                    );
                    let mut writer = BufWriter::new(create_file(thumbnail_file)?);
                    writer.write_all(&thumbnail.data)?;
                    writer.flush()?;
                }
                None => warn!("{:?} has no thumbnail", in_file)
            }
        }
    }

    Ok(())
}

fn create_file(path: &OsStr) -> Result<File, CliErrors> {
    Ok(OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)?)
}

fn verify_input(p0: &OsStr) -> Result<(), CliErrors> {
    let in_path = Path::new(p0);

    if !in_path.exists() {
        return Err(CliErrors::GenericString(format!(
            "Path {:?}, does not exist",
            in_path
        )));
    }

    if !in_path.is_file() {
        return Err(CliErrors::GenericString(format!(
            "Path {:?} is not a file",
            in_path
        )));
    }
    Ok(())
}

fn verify_output(p0: &OsStr, p1: &OsStr, cmd_opts: &CmdOptions) -> Result<(), CliErrors> {
    if p0 == p1 {
        return Err(CliErrors::GenericString(format!(
            "Cannot use {:?} as both input and output",
            p0
        )));
    }
    let out_path = Path::new(p1);

    if out_path.exists() {
        if cmd_opts.override_files {
            info!("Overwriting path {:?} ", p1);
        } else {
            println!("File {:?} exists, overwrite [y/N]", out_path);
            let mut result = String::new();

            stdin().lock().read_line(&mut result)?;

            if result.trim() != "y" {
                return Err(CliErrors::GenericString(format!(
                    "Not overwriting file {:?}",
                    out_path
                )));
            }
        }
    }
    Ok(())
}
