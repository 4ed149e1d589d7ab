//! Bit-level packing and reading on top of `bit_vec`.
//! The packer accumulates codeword bits and releases whole bytes, so a
//! codeword that straddles a byte boundary simply leaves its tail pending
//! for the next symbol.  The reader hands out one bit at a time, crossing
//! input byte boundaries transparently.

use bit_vec::BitVec;
use std::io::{Read,Write,BufReader};

/// Accumulates variable length codewords and flushes byte-aligned output.
pub struct BitPacker {
    bits: BitVec
}

impl BitPacker {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new()
        }
    }
    pub fn push_codeword(&mut self,code: &BitVec) {
        for bit in code.iter() {
            self.bits.push(bit);
        }
    }
    /// Write out every complete byte, keeping 0-7 pending bits.
    pub fn flush_bytes<W: Write>(&mut self,writer: &mut W) -> Result<(),std::io::Error> {
        let whole = self.bits.len() / 8 * 8;
        if whole == 0 {
            return Ok(());
        }
        let mut head = BitVec::with_capacity(whole);
        for i in 0..whole {
            head.push(self.bits.get(i).unwrap());
        }
        writer.write_all(&head.to_bytes())?;
        let mut pending = BitVec::new();
        for i in whole..self.bits.len() {
            pending.push(self.bits.get(i).unwrap());
        }
        self.bits = pending;
        Ok(())
    }
    /// Flush any partial byte, zero-padded on the right.  The padding bits
    /// carry no meaning; the decoder stops on symbol count, never on them.
    pub fn finish<W: Write>(&mut self,writer: &mut W) -> Result<(),std::io::Error> {
        self.flush_bytes(writer)?;
        if self.bits.len() > 0 {
            writer.write_all(&self.bits.to_bytes())?;
            self.bits = BitVec::new();
        }
        Ok(())
    }
}

/// Reads the compressed stream one bit at a time, MSB first within each byte.
pub struct BitReader {
    current: u8,
    mask: u8
}

impl BitReader {
    pub fn new() -> Self {
        Self {
            current: 0,
            mask: 0
        }
    }
    /// Get the next bit, pulling another byte from the stream as needed.
    /// `reader` should not be advanced outside this function until decoding
    /// is done.  EOF surfaces as `ErrorKind::UnexpectedEof`.
    pub fn get_bit<R: Read>(&mut self,reader: &mut BufReader<R>) -> Result<u8,std::io::Error> {
        if self.mask == 0 {
            let mut by: [u8;1] = [0];
            reader.read_exact(&mut by)?;
            self.current = by[0];
            self.mask = 0x80;
        }
        let bit = match self.current & self.mask {
            0 => 0,
            _ => 1
        };
        self.mask >>= 1;
        Ok(bit)
    }
}

// *************** TESTS *****************

#[test]
fn straddled_codewords_pack_msb_first() {
    let mut packer = BitPacker::new();
    let mut code = BitVec::new();
    for bit in [true,false,true] {
        code.push(bit);
    }
    let mut out: Vec<u8> = Vec::new();
    // 15 bits split as 10110110 1101101, final byte padded to 11011010
    for _i in 0..5 {
        packer.push_codeword(&code);
        packer.flush_bytes(&mut out).expect("flush failed");
    }
    packer.finish(&mut out).expect("finish failed");
    assert_eq!(out,vec![0xb6,0xda]);
}

#[test]
fn reader_crosses_byte_boundaries() {
    let mut reader = BufReader::new(std::io::Cursor::new(vec![0xb6,0xda]));
    let mut bits = BitReader::new();
    let mut ans = Vec::new();
    for _i in 0..16 {
        ans.push(bits.get_bit(&mut reader).expect("read failed"));
    }
    assert_eq!(ans,vec![1,0,1,1,0,1,1,0,1,1,0,1,1,0,1,0]);
    assert_eq!(bits.get_bit(&mut reader).unwrap_err().kind(),std::io::ErrorKind::UnexpectedEof);
}
