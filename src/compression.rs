use crate::error::{MapError, Result};
use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// gzip流的前两个字节
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// 打开整个文件都是gzip流的地图文件
pub fn open_gzip<P: AsRef<Path>>(path: P) -> Result<GzDecoder<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(GzDecoder::new(BufReader::new(file)))
}

/// 创建整体gzip压缩的地图文件，调用方写完后需要 `finish`
pub fn create_gzip<P: AsRef<Path>>(path: P) -> Result<GzEncoder<BufWriter<File>>> {
    let file = File::create(path)?;
    Ok(GzEncoder::new(BufWriter::new(file), Compression::default()))
}

/// 结束gzip流并把缓冲写入磁盘
pub fn finish_gzip(encoder: GzEncoder<BufWriter<File>>) -> Result<()> {
    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(())
}

/// 解压gzip数据
pub fn gunzip(compressed_data: &[u8]) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    GzDecoder::new(compressed_data)
        .read_to_end(&mut decompressed)
        .map_err(|e| MapError::Io(e).eof_as_format())?;
    Ok(decompressed)
}

/// gzip压缩数据
pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// 压缩为原始deflate流（不带zlib/gzip头）
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// 解压原始deflate流
pub fn inflate(compressed_data: &[u8]) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    DeflateDecoder::new(compressed_data)
        .read_to_end(&mut decompressed)
        .map_err(|e| MapError::Io(e).eof_as_format())?;
    Ok(decompressed)
}

/// 读取并解压gzip文件的前 `len` 个字节，用于格式探测
pub fn read_gzip_prefix<P: AsRef<Path>>(path: P, len: usize) -> Result<Vec<u8>> {
    let mut prefix = vec![0u8; len];
    open_gzip(path)?.read_exact(&mut prefix)?;
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_and_deflate_restore_input() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i % 7) as u8).collect();
        let gz = gzip(&data).unwrap();
        assert_eq!(&gz[..2], &GZIP_MAGIC);
        assert_eq!(gunzip(&gz).unwrap(), data);
        assert_eq!(inflate(&deflate(&data).unwrap()).unwrap(), data);
    }

    #[test]
    fn truncated_gzip_is_a_format_error() {
        let gz = gzip(&[1u8; 1000]).unwrap();
        let err = gunzip(&gz[..gz.len() / 2]).unwrap_err();
        assert!(err.is_format_error());
    }
}
