// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use std::io::{self, Write};

use flate2::{write::GzEncoder, Compression};
use log::debug;

/// gzip 压缩。框架本身从不自动压缩，由需要的处理函数显式调用。
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    let ratio = if data.is_empty() {
        0.0
    } else {
        (data.len() as f64 - compressed.len() as f64) / data.len() as f64 * 100.0
    };
    debug!(
        "gzip压缩完成，原始大小: {} bytes, 压缩后: {} bytes, 压缩率: {:.1}%",
        data.len(),
        compressed.len(),
        ratio
    );
    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_gzip_magic_bytes() {
        let result = gzip(b"Hello, World! This is a test string for compression.").unwrap();
        assert_eq!(&result[0..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_gzip_decompresses_to_input() {
        let data = b"abc".repeat(100);
        let compressed = gzip(&data).unwrap();
        assert!(compressed.len() < data.len());

        let mut decoded = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_gzip_empty_data() {
        let result = gzip(b"").unwrap();
        assert!(!result.is_empty());
    }
}
