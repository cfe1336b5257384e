//! Teensy 2.0 HalfKay bootloader over USB.
//!
//! HalfKay takes one HID SET_REPORT per 128-byte flash page: two bytes of
//! little-endian address followed by the page. Writing to 0xFFFF reboots
//! into the application.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusb::{DeviceHandle, GlobalContext};
use std::thread;
use std::time::{Duration, Instant};

use crate::hex::FirmwareImage;

const HALFKAY_VID: u16 = 0x16C0;
const HALFKAY_PID: u16 = 0x0478;

/// ATmega32U4 flash page size in bytes.
const PAGE_SIZE: usize = 128;

const USB_TIMEOUT: Duration = Duration::from_secs(2);

/// Time the chip needs to erase and program one page.
const PAGE_WRITE_DELAY: Duration = Duration::from_millis(5);

/// HID SET_REPORT, host-to-device class request to interface 0.
const REQUEST_TYPE: u8 = 0x21;
const SET_REPORT: u8 = 0x09;
const OUTPUT_REPORT: u16 = 0x0200;

pub struct HalfKay {
    handle: DeviceHandle<GlobalContext>,
}

/// Is a Teensy in bootloader mode on the bus?
pub fn detect() -> Result<bool> {
    Ok(find()?.is_some())
}

fn find() -> Result<Option<rusb::Device<GlobalContext>>> {
    let devices = rusb::devices().context("failed to enumerate USB devices")?;
    for device in devices.iter() {
        let desc = device
            .device_descriptor()
            .context("failed to read device descriptor")?;
        if desc.vendor_id() == HALFKAY_VID && desc.product_id() == HALFKAY_PID {
            return Ok(Some(device));
        }
    }
    Ok(None)
}

/// Poll for the bootloader until `timeout` runs out.
pub fn wait_for(timeout: Duration) -> Result<bool> {
    let start = Instant::now();
    loop {
        if detect()? {
            return Ok(true);
        }
        if start.elapsed() >= timeout {
            return Ok(false);
        }
        thread::sleep(Duration::from_millis(100));
    }
}

impl HalfKay {
    pub fn open() -> Result<Self> {
        let Some(device) = find()? else {
            bail!("Teensy bootloader not found. Press the reset button and try again.");
        };
        let handle = device
            .open()
            .context("failed to open Teensy bootloader (may need root/sudo or udev rules)")?;
        Ok(Self { handle })
    }

    /// Write every non-erased page of the image, then reboot the board.
    pub fn program(&self, image: &FirmwareImage) -> Result<()> {
        let pages = page_buffers(image);

        let pb = ProgressBar::new(pages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} pages")
                .context("bad progress template")?
                .progress_chars("=> "),
        );
        pb.set_message("Flashing");

        for (address, buf) in &pages {
            if let Some(buf) = buf {
                self.write_report(buf)
                    .with_context(|| format!("failed to write page at 0x{:04X}", address))?;
                thread::sleep(PAGE_WRITE_DELAY);
            }
            pb.inc(1);
        }
        pb.finish_with_message("Flashed");

        self.boot();
        Ok(())
    }

    /// Leave the bootloader. The device drops off the bus right away, so the
    /// transfer result is meaningless.
    pub fn boot(&self) {
        let mut buf = vec![0u8; 2 + PAGE_SIZE];
        buf[0] = 0xFF;
        buf[1] = 0xFF;
        let _ = self.write_report(&buf);
    }

    fn write_report(&self, buf: &[u8]) -> Result<()> {
        self.handle
            .write_control(REQUEST_TYPE, SET_REPORT, OUTPUT_REPORT, 0, buf, USB_TIMEOUT)
            .context("USB control transfer failed")?;
        Ok(())
    }
}

/// Split an image into HalfKay reports, one per page. Pages that are all
/// 0xFF are already erased and come back as `None`.
fn page_buffers(image: &FirmwareImage) -> Vec<(usize, Option<Vec<u8>>)> {
    let first = image.base as usize / PAGE_SIZE * PAGE_SIZE;
    let lead = image.base as usize - first;

    let mut padded = vec![0xFF; lead];
    padded.extend_from_slice(&image.data);

    padded
        .chunks(PAGE_SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            let address = first + i * PAGE_SIZE;
            if chunk.iter().all(|&b| b == 0xFF) {
                return (address, None);
            }
            let mut buf = vec![0xFF; 2 + PAGE_SIZE];
            buf[0] = address as u8;
            buf[1] = (address >> 8) as u8;
            buf[2..2 + chunk.len()].copy_from_slice(chunk);
            (address, Some(buf))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_carry_little_endian_address() {
        let image = FirmwareImage {
            base: 0,
            data: vec![0x11; PAGE_SIZE * 2 + 3],
        };
        let pages = page_buffers(&image);
        assert_eq!(pages.len(), 3);
        let (address, buf) = &pages[2];
        let buf = buf.as_ref().unwrap();
        assert_eq!(*address, 0x100);
        assert_eq!(&buf[..2], &[0x00, 0x01]);
        assert_eq!(buf.len(), 2 + PAGE_SIZE);
        assert_eq!(&buf[2..5], &[0x11; 3]);
        // Short last page is padded with erased bytes.
        assert!(buf[5..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn erased_pages_are_skipped() {
        let mut data = vec![0xFF; PAGE_SIZE * 3];
        data[PAGE_SIZE + 7] = 0x00;
        let pages = page_buffers(&FirmwareImage { base: 0, data });
        assert!(pages[0].1.is_none());
        assert!(pages[1].1.is_some());
        assert!(pages[2].1.is_none());
    }

    #[test]
    fn unaligned_base_starts_on_page_boundary() {
        let image = FirmwareImage {
            base: 0x90,
            data: vec![0x22; 0x20],
        };
        let pages = page_buffers(&image);
        assert_eq!(pages[0].0, 0x80);
        let buf = pages[0].1.as_ref().unwrap();
        assert_eq!(buf[2 + 0x0F], 0xFF);
        assert_eq!(buf[2 + 0x10], 0x22);
    }
}
