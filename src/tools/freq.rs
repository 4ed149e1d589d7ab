//! Byte frequency accumulation.
//! This is the first pass of compression; the table it produces
//! seeds the Huffman tree in `huffman_tree`.

use std::io::Read;

pub const ALPHABET_SIZE: usize = 256;

/// Occurrence counts for every possible byte value.
/// Counts are 64 bit so any addressable input is safe from overflow.
pub struct FrequencyTable {
    counts: [u64;ALPHABET_SIZE]
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0;ALPHABET_SIZE]
        }
    }
    /// Count every byte remaining in `reader`, reading in chunks of `chunk_size`.
    /// An empty source is allowed here and yields a table with no distinct symbols;
    /// downstream tree construction is responsible for rejecting that case.
    pub fn count<R: Read>(reader: &mut R, chunk_size: usize) -> Result<Self,std::io::Error> {
        let mut ans = Self::new();
        let mut buf = vec![0;chunk_size];
        loop {
            let bytes_read = reader.read(&mut buf)?;
            if bytes_read == 0 {
                break;
            }
            ans.tally(&buf[0..bytes_read]);
        }
        Ok(ans)
    }
    pub fn tally(&mut self,bytes: &[u8]) {
        for b in bytes {
            self.counts[*b as usize] += 1;
        }
    }
    pub fn get(&self,symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }
    /// number of byte values with a non-zero count
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
    /// total number of bytes that were counted
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

// *************** TESTS *****************

#[test]
fn counts_accumulate() {
    let mut curs = std::io::Cursor::new("abracadabra".as_bytes());
    let table = FrequencyTable::count(&mut curs,4).expect("count failed");
    assert_eq!(table.get(b'a'),5);
    assert_eq!(table.get(b'b'),2);
    assert_eq!(table.get(b'r'),2);
    assert_eq!(table.get(b'c'),1);
    assert_eq!(table.get(b'd'),1);
    assert_eq!(table.get(b'z'),0);
    assert_eq!(table.distinct(),5);
    assert_eq!(table.total(),11);
}

#[test]
fn empty_source_is_empty_table() {
    let mut curs = std::io::Cursor::new(&[] as &[u8]);
    let table = FrequencyTable::count(&mut curs,4096).expect("count failed");
    assert_eq!(table.distinct(),0);
    assert_eq!(table.total(),0);
}
