use anyhow::{bail, ensure, Context, Result};

/// Application flash on the ATmega32U4. HalfKay lives at 0x7E00 and up.
pub const APP_FLASH_SIZE: usize = 0x7E00;

/// Anything smaller is not a real firmware build.
pub const MIN_IMAGE_SIZE: usize = 1024;

/// A firmware image ready to be written, erased bytes filled with 0xFF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    pub base: u32,
    pub data: Vec<u8>,
}

/// One Intel HEX record.
#[derive(Debug)]
struct Record {
    kind: u8,
    offset: u16,
    data: Vec<u8>,
}

impl FirmwareImage {
    /// Parse and sanity-check the contents of a `.hex` file.
    pub fn from_hex(text: &str) -> Result<Self> {
        if looks_like_html(text) {
            bail!("file is an HTML page, not firmware (was it saved from a browser?)");
        }

        let (image, decoded) = Self::parse(text)?;
        ensure!(
            decoded >= MIN_IMAGE_SIZE,
            "image holds only {} bytes of data, expected at least {}",
            decoded,
            MIN_IMAGE_SIZE
        );
        ensure!(
            image.end() <= APP_FLASH_SIZE,
            "image ends at 0x{:04X}, past the bootloader at 0x{:04X}",
            image.end(),
            APP_FLASH_SIZE
        );
        Ok(image)
    }

    /// Supports data (00), end-of-file (01) and extended segment address (02)
    /// records. Gaps between data records are filled with 0xFF. Also returns
    /// the number of bytes the data records actually carried.
    fn parse(text: &str) -> Result<(Self, usize)> {
        let mut chunks: Vec<(u32, Vec<u8>)> = Vec::new();
        let mut segment: u32 = 0;

        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = parse_record(line).with_context(|| format!("line {}", n + 1))?;

            match record.kind {
                0x00 => chunks.push((segment + record.offset as u32, record.data)),
                0x01 => break,
                0x02 => {
                    ensure!(record.data.len() == 2, "line {}: bad segment record", n + 1);
                    segment = (u16::from_be_bytes([record.data[0], record.data[1]]) as u32) << 4;
                }
                other => bail!("line {}: unsupported record type 0x{:02X}", n + 1, other),
            }
        }

        let Some(base) = chunks.iter().map(|(addr, _)| *addr).min() else {
            bail!("no data records");
        };
        let end = chunks
            .iter()
            .map(|(addr, data)| *addr + data.len() as u32)
            .max()
            .unwrap_or(base);

        let decoded = chunks.iter().map(|(_, bytes)| bytes.len()).sum();
        let mut data = vec![0xFF; (end - base) as usize];
        for (addr, bytes) in &chunks {
            let at = (addr - base) as usize;
            data[at..at + bytes.len()].copy_from_slice(bytes);
        }

        Ok((Self { base, data }, decoded))
    }

    pub fn end(&self) -> usize {
        self.base as usize + self.data.len()
    }
}

fn parse_record(line: &str) -> Result<Record> {
    let Some(hex) = line.strip_prefix(':') else {
        bail!("missing ':' start code");
    };
    ensure!(hex.len() % 2 == 0, "odd number of hex digits");

    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("bad hex digit near column {}", i + 2))
        })
        .collect::<Result<Vec<u8>>>()?;

    ensure!(bytes.len() >= 5, "record too short");
    let len = bytes[0] as usize;
    ensure!(
        bytes.len() == len + 5,
        "length byte says {} data bytes, record has {}",
        len,
        bytes.len() - 5
    );

    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    ensure!(sum == 0, "checksum mismatch");

    Ok(Record {
        kind: bytes[3],
        offset: u16::from_be_bytes([bytes[1], bytes[2]]),
        data: bytes[4..4 + len].to_vec(),
    })
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.chars().take(256).collect::<String>().to_ascii_lowercase();
    head.contains("<html") || head.contains("<!doctype html")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a data record with a correct checksum.
    fn data_record(offset: u16, data: &[u8]) -> String {
        let mut bytes = vec![data.len() as u8, (offset >> 8) as u8, offset as u8, 0x00];
        bytes.extend_from_slice(data);
        let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        bytes.push(sum.wrapping_neg());
        let mut line = String::from(":");
        for b in bytes {
            line.push_str(&format!("{:02X}", b));
        }
        line
    }

    fn hex_of_size(size: usize) -> String {
        let mut out = String::new();
        for offset in (0..size).step_by(16) {
            let n = (size - offset).min(16);
            out.push_str(&data_record(offset as u16, &vec![0x5A; n]));
            out.push('\n');
        }
        out.push_str(":00000001FF\n");
        out
    }

    #[test]
    fn parses_single_record() {
        let text = ":10000000000102030405060708090A0B0C0D0E0F78\n:00000001FF\n";
        let (image, _) = FirmwareImage::parse(text).unwrap();
        assert_eq!(image.base, 0);
        assert_eq!(image.data, (0u8..16).collect::<Vec<_>>());
    }

    #[test]
    fn segment_record_moves_base() {
        let text = ":020000020100FB\n\
                    :10000000112233445566778899AABBCCDDEEFF00F8\n\
                    :00000001FF\n";
        let (image, _) = FirmwareImage::parse(text).unwrap();
        assert_eq!(image.base, 0x1000);
        assert_eq!(image.data.len(), 16);
    }

    #[test]
    fn gaps_are_erased_bytes() {
        let text = format!(
            "{}\n{}\n:00000001FF\n",
            data_record(0x100, &[0xAA, 0xBB]),
            data_record(0x110, &[0xCC])
        );
        let (image, decoded) = FirmwareImage::parse(&text).unwrap();
        assert_eq!(decoded, 3);
        assert_eq!(image.base, 0x100);
        assert_eq!(image.data.len(), 0x11);
        assert_eq!(image.data[1], 0xBB);
        assert_eq!(image.data[2], 0xFF);
        assert_eq!(image.data[0x10], 0xCC);
    }

    #[test]
    fn rejects_bad_checksum() {
        let text = ":10000000000102030405060708090A0B0C0D0E0F00\n:00000001FF\n";
        assert!(FirmwareImage::parse(text).is_err());
    }

    #[test]
    fn rejects_missing_start_code() {
        assert!(FirmwareImage::parse("00000001FF\n").is_err());
    }

    #[test]
    fn rejects_empty_file() {
        assert!(FirmwareImage::parse(":00000001FF\n").is_err());
    }

    #[test]
    fn rejects_html_download() {
        let page = "<!DOCTYPE html>\n<html><body>Not Found</body></html>\n";
        let err = FirmwareImage::from_hex(page).unwrap_err();
        assert!(err.to_string().contains("HTML"));
    }

    #[test]
    fn rejects_tiny_image() {
        assert!(FirmwareImage::from_hex(&hex_of_size(512)).is_err());
        assert!(FirmwareImage::from_hex(&hex_of_size(MIN_IMAGE_SIZE)).is_ok());
    }

    #[test]
    fn sparse_records_do_not_count_as_a_full_image() {
        let text = format!(
            "{}\n{}\n:00000001FF\n",
            data_record(0x0000, &[0x0C]),
            data_record(0x0400, &[0x94])
        );
        let err = FirmwareImage::from_hex(&text).unwrap_err();
        assert!(err.to_string().contains("only 2 bytes"));
    }

    #[test]
    fn rejects_image_over_bootloader() {
        let mut text = hex_of_size(MIN_IMAGE_SIZE);
        text.insert_str(0, &format!("{}\n", data_record(0x7E00, &[0x00])));
        assert!(FirmwareImage::from_hex(&text).is_err());
    }
}
