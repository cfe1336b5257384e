mod decode;
mod halfkay;
mod hex;
mod layout;
mod legend;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hex::FirmwareImage;

#[derive(Parser)]
#[command(name = "inkboard-cli")]
#[command(about = "Inkboard keyboard tools: flash firmware, watch the key stream, draw the matrix")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flash a .hex firmware file to the Teensy via the HalfKay bootloader
    Flash {
        /// Path to the Intel HEX firmware file
        firmware: PathBuf,
        /// Seconds to wait for the bootloader to appear
        #[arg(long, default_value_t = 30)]
        wait: u64,
    },
    /// Detect if a Teensy is connected in bootloader mode
    Detect,
    /// Decode the keyboard's byte stream from a capture file or serial device
    Decode {
        /// File or tty to read, `-` for stdin. Configure the tty for 9600 8N1 first.
        #[arg(default_value = "-")]
        input: String,
        /// Print each byte in hex next to its meaning
        #[arg(long)]
        raw: bool,
    },
    /// Write an HTML/SVG drawing of the key matrix
    Layout {
        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Flash { firmware, wait } => {
            if let Err(err) = flash(&firmware, Duration::from_secs(wait)) {
                eprintln!("Update failed: {:#}", err);
                eprintln!();
                eprintln!("Common fixes:");
                eprintln!("- Unplug and replug USB, or try a different cable");
                eprintln!("- Close any serial monitor using the port");
                eprintln!("- Press the reset button on the Teensy, then run flash again");
                std::process::exit(1);
            }
        }
        Command::Detect => {
            if halfkay::detect()? {
                println!("Teensy bootloader detected (HalfKay mode).");
            } else {
                println!("Teensy bootloader not detected.");
                println!("Press the reset button on the Teensy to enter bootloader mode.");
            }
        }
        Command::Decode { input, raw } => {
            let stdout = io::stdout().lock();
            if input == "-" {
                decode::run(io::stdin().lock(), stdout, raw)?;
            } else {
                let file =
                    File::open(&input).with_context(|| format!("opening {}", input))?;
                decode::run(file, stdout, raw)?;
            }
        }
        Command::Layout { output } => {
            let html = layout::generate_html();
            match output {
                Some(path) => {
                    fs::write(&path, html)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", html),
            }
        }
    }

    Ok(())
}

fn flash(path: &Path, wait: Duration) -> Result<()> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let image = FirmwareImage::from_hex(&contents)
        .with_context(|| format!("{} is not a usable firmware file", path.display()))?;

    println!(
        "Firmware: {} bytes at base address 0x{:04X}",
        image.data.len(),
        image.base
    );

    if !halfkay::detect()? {
        println!("Press the reset button on the Teensy to enter the bootloader...");
        if !halfkay::wait_for(wait)? {
            anyhow::bail!("Teensy bootloader not detected after {}s", wait.as_secs());
        }
    }

    halfkay::HalfKay::open()?.program(&image)?;
    println!("Teensy rebooted. Firmware should be running.");
    Ok(())
}
