//! Cyclic redundancy checks over document bytes.

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Running CRC-16 over the bytes of a document.
///
/// Both the header check (over the first twelve bytes) and the file check
/// (over everything before the trailing two bytes) use this algorithm.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Crc(u16);

impl Crc {
    /// Start a new accumulator.
    pub fn new() -> Self {
        Self(0)
    }

    /// Accumulate a slice of bytes.
    pub fn update(&mut self, r: &[u8]) {
        self.0 = r.iter().fold(self.0, |acc, b| nibbles(acc, *b));
    }

    /// The value accumulated so far.
    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Compute the check value of a complete slice.
pub fn compute_crc(r: &[u8]) -> u16 {
    let mut crc = Crc::new();
    crc.update(r);
    crc.value()
}

fn nibbles(crc: u16, b: u8) -> u16 {
    let low = step(crc, b & 0xF);
    step(low, (b >> 4) & 0xF)
}

fn step(crc: u16, nibble: u8) -> u16 {
    let tmp = CRC_TABLE[(crc & 0xF) as usize];
    let crc = (crc >> 4) & 0x0FFF;
    crc ^ tmp ^ CRC_TABLE[nibble as usize]
}
