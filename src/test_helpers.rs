use crate::models::Trade;

/// Build an in-memory ZIP archive. CRCs are left zero; the reader does not
/// check them.
#[derive(Default)]
pub struct ZipBuilder {
    local_extra: Vec<u8>,
    entries: Vec<(String, u16, Vec<u8>, usize)>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra field written into each local header (not the central one).
    pub fn with_local_extra(mut self, extra: &[u8]) -> Self {
        self.local_extra = extra.to_vec();
        self
    }

    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.raw(name, 0, data, data.len())
    }

    pub fn deflated(self, name: &str, compressed: &[u8], uncompressed_size: usize) -> Self {
        self.raw(name, 8, compressed, uncompressed_size)
    }

    pub fn raw(mut self, name: &str, method: u16, data: &[u8], uncompressed_size: usize) -> Self {
        self.entries
            .push((name.to_string(), method, data.to_vec(), uncompressed_size));
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for (name, method, data, size) in &self.entries {
            let local_offset = out.len() as u32;

            out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&method.to_le_bytes());
            out.extend_from_slice(&[0u8; 4]); // mod time + date
            out.extend_from_slice(&0u32.to_le_bytes()); // crc
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(*size as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&(self.local_extra.len() as u16).to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&self.local_extra);
            out.extend_from_slice(data);

            central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes()); // version made by
            central.extend_from_slice(&20u16.to_le_bytes()); // version needed
            central.extend_from_slice(&0u16.to_le_bytes()); // flags
            central.extend_from_slice(&method.to_le_bytes());
            central.extend_from_slice(&[0u8; 4]); // mod time + date
            central.extend_from_slice(&0u32.to_le_bytes()); // crc
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(*size as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // extra len
            central.extend_from_slice(&0u16.to_le_bytes()); // comment len
            central.extend_from_slice(&0u16.to_le_bytes()); // disk start
            central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            central.extend_from_slice(&local_offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }

        let cd_offset = out.len() as u32;
        let count = self.entries.len() as u16;
        out.extend_from_slice(&central);

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // disk
        out.extend_from_slice(&0u16.to_le_bytes()); // cd disk
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(central.len() as u32).to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // comment len
        out
    }
}

/// Trades with the given PnLs, all on one day.
pub fn make_trades(pnls: &[f64]) -> Vec<Trade> {
    pnls.iter()
        .map(|&p| Trade::new("MESH6", p, "01/26/2026"))
        .collect()
}

pub fn make_dated_trades(data: &[(f64, &str)]) -> Vec<Trade> {
    data.iter()
        .map(|&(p, d)| Trade::new("MESH6", p, d))
        .collect()
}
