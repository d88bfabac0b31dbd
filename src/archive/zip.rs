//! Minimal ZIP container reader: central directory walk plus per-entry
//! decompression. Only what spreadsheet exports need (no ZIP64, no
//! encryption, no data descriptors beyond what the central directory
//! already records).

use tracing::{debug, warn};

use super::inflate::Inflater;
use super::ArchiveError;

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

const EOCD_LEN: usize = 22;
const CENTRAL_HEADER_LEN: usize = 46;
const LOCAL_HEADER_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectory {
    pub offset: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    DeflateRaw,
    Other(u16),
}

impl From<u16> for CompressionMethod {
    fn from(raw: u16) -> Self {
        match raw {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::DeflateRaw,
            other => CompressionMethod::Other(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub name: String,
    pub compressed: Vec<u8>,
    pub method: CompressionMethod,
    pub uncompressed_size: usize,
}

impl ZipEntry {
    /// Decompressed contents. Deflate streams are decoded block by block,
    /// yielding to the runtime between blocks.
    pub async fn decompress(&self) -> Result<Vec<u8>, ArchiveError> {
        let out = match self.method {
            CompressionMethod::Stored => self.compressed.clone(),
            CompressionMethod::DeflateRaw => {
                let mut inflater = Inflater::new(&self.compressed, self.uncompressed_size);
                while !inflater.is_finished() {
                    inflater.step().map_err(|source| ArchiveError::Inflate {
                        name: self.name.clone(),
                        source,
                    })?;
                    tokio::task::yield_now().await;
                }
                debug!(
                    "Inflated {} ({} blocks, {} -> {} bytes)",
                    self.name,
                    inflater.blocks_decoded(),
                    self.compressed.len(),
                    inflater.output_len()
                );
                inflater.into_output()
            }
            CompressionMethod::Other(method) => {
                return Err(ArchiveError::UnsupportedCompression {
                    name: self.name.clone(),
                    method,
                })
            }
        };

        if out.len() != self.uncompressed_size {
            warn!(
                "{}: expected {} bytes after decompression, got {}",
                self.name,
                self.uncompressed_size,
                out.len()
            );
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<ZipEntry>,
}

impl Archive {
    pub fn read(buf: &[u8]) -> Result<Self, ArchiveError> {
        let cd = locate_central_directory(buf).ok_or(ArchiveError::MissingEndOfCentralDirectory)?;
        debug!(
            "Central directory at {} ({} bytes) in {} byte archive",
            cd.offset,
            cd.size,
            buf.len()
        );

        let mut archive = Archive::default();
        let end = cd.offset.saturating_add(cd.size);
        let mut off = cd.offset;

        while off < end {
            if read_u32(buf, off, "central header")? != CENTRAL_HEADER_SIGNATURE {
                break;
            }
            let method = read_u16(buf, off + 10, "central header")?;
            let compressed_size = read_u32(buf, off + 20, "central header")? as usize;
            let uncompressed_size = read_u32(buf, off + 24, "central header")? as usize;
            let name_len = read_u16(buf, off + 28, "central header")? as usize;
            let extra_len = read_u16(buf, off + 30, "central header")? as usize;
            let comment_len = read_u16(buf, off + 32, "central header")? as usize;
            let local_offset = read_u32(buf, off + 42, "central header")? as usize;

            let name_start = off + CENTRAL_HEADER_LEN;
            let name = String::from_utf8_lossy(slice(buf, name_start, name_len, "entry name")?)
                .into_owned();

            let compressed = entry_data(buf, &name, local_offset, compressed_size)?.to_vec();
            archive.insert(ZipEntry {
                name,
                compressed,
                method: CompressionMethod::from(method),
                uncompressed_size,
            });

            off = name_start + name_len + extra_len + comment_len;
        }

        Ok(archive)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// First entry, in directory order, whose name satisfies `pred`.
    pub fn find(&self, pred: impl Fn(&str) -> bool) -> Option<&ZipEntry> {
        self.entries.iter().find(|e| pred(&e.name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    // A repeated name replaces the earlier entry but keeps its position.
    fn insert(&mut self, entry: ZipEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }
}

/// Scan backwards from the last possible record start for the
/// end-of-central-directory signature.
pub fn locate_central_directory(buf: &[u8]) -> Option<CentralDirectory> {
    let last = buf.len().checked_sub(EOCD_LEN)?;
    (0..=last).rev().find_map(|i| {
        if u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]) != EOCD_SIGNATURE {
            return None;
        }
        let size = u32::from_le_bytes([buf[i + 12], buf[i + 13], buf[i + 14], buf[i + 15]]);
        let offset = u32::from_le_bytes([buf[i + 16], buf[i + 17], buf[i + 18], buf[i + 19]]);
        Some(CentralDirectory {
            offset: offset as usize,
            size: size as usize,
        })
    })
}

/// Resolve an entry's compressed bytes through its local header. The local
/// name and extra lengths can differ from the central copy.
fn entry_data<'a>(
    buf: &'a [u8],
    name: &str,
    local_offset: usize,
    compressed_size: usize,
) -> Result<&'a [u8], ArchiveError> {
    if read_u32(buf, local_offset, "local header")? != LOCAL_HEADER_SIGNATURE {
        return Err(ArchiveError::BadLocalHeader {
            name: name.to_string(),
            offset: local_offset,
        });
    }
    let name_len = read_u16(buf, local_offset + 26, "local header")? as usize;
    let extra_len = read_u16(buf, local_offset + 28, "local header")? as usize;
    let data_start = local_offset + LOCAL_HEADER_LEN + name_len + extra_len;
    slice(buf, data_start, compressed_size, "entry data")
}

fn slice<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], ArchiveError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(ArchiveError::Truncated {
            what,
            offset,
            len: buf.len(),
        })
}

fn read_u16(buf: &[u8], offset: usize, what: &'static str) -> Result<u16, ArchiveError> {
    let b = slice(buf, offset, 2, what)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(buf: &[u8], offset: usize, what: &'static str) -> Result<u32, ArchiveError> {
    let b = slice(buf, offset, 4, what)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
