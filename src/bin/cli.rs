//! This is the command line tool that loads a GIF file, prints what the
//! container holds, and optionally re-encodes it to a new file.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, ArgAction, Command};
use gifcodec::encoder;
use gifcodec::parser;

use std::time::Instant;
use std::{fs, fs::File, io::Write};

fn save_file(data: &[u8], path: &str) {
    let mut f = File::create(path).expect("Can't create file");
    f.write_all(data).expect("Unable to write data");
    log::info!("Wrote {}.", &path);
}

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

fn main() {
    let matches = Command::new("CLI")
        .version("1.x")
        .arg(
            Arg::new("checked")
                .long("check")
                .help("Re-parse the re-encoded output and compare")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Re-encode the GIF into this file")
                .num_args(1),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .index(1),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let cli_checked_mode = matches.get_flag("checked");
    let cli_output_path = matches.get_one::<String>("output").cloned();

    let input_path = matches.get_one::<String>("INPUT").unwrap();
    let input = fs::read(input_path).expect("Can't open the input file");

    let timer = Timer::new();

    let gif = match parser::parse(&input) {
        Ok(gif) => gif,
        Err(err) => {
            log::error!("Parse failed: {}", err);
            return;
        }
    };

    log::info!(
        "{}x{} pixels, {} frame(s), global color table: {}",
        gif.width,
        gif.height,
        gif.frames.len(),
        match &gif.global_table {
            Some(table) => format!("{} entries", table.len()),
            None => String::from("none"),
        }
    );
    match gif.loop_count {
        Some(count) => log::info!("Loops {} time(s).", count),
        None => log::info!("Plays once."),
    }
    for (i, frame) in gif.frames.iter().enumerate() {
        log::info!(
            "Frame {}: {}x{} at ({},{}), delay {}cs, disposal {:?}",
            i,
            frame.width,
            frame.height,
            frame.left,
            frame.top,
            frame.delay_cs,
            frame.disposal
        );
    }

    if let Some(out) = cli_output_path {
        let encoded = match encoder::encode(&gif) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Encode failed: {}", err);
                return;
            }
        };
        log::info!(
            "Re-encoded from {} to {} bytes.",
            input.len(),
            encoded.len()
        );
        save_file(&encoded, &out);

        if cli_checked_mode {
            match parser::parse(&encoded) {
                Ok(again)
                    if again.frames.len() == gif.frames.len()
                        && again.width == gif.width
                        && again.height == gif.height =>
                {
                    log::info!("Correct!")
                }
                Ok(_) => log::info!("Incorrect!"),
                Err(err) => log::error!("Could not re-parse the output: {}", err),
            }
        }
    }

    drop(timer);
}
