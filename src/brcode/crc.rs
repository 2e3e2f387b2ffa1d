use crc::{Crc, CRC_16_IBM_3740};

// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no final
// XOR. CRC_16_IBM_3740 is the catalog name for the same parameters.
const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Checksum over the payload prefix. Callers render it as 4 uppercase
/// hex digits.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    CRC.checksum(data)
}
