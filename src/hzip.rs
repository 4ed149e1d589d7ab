//! Huffman Coding Compression
//!
//! This compresses a byte stream with a classic two-pass Huffman code: the
//! first pass counts byte frequencies, the second packs the derived
//! variable length codewords into a byte-aligned stream.  A metadata header
//! holding the (byte,frequency) leaf records lets the decoder rebuild the
//! identical tree without ever seeing the original data.
//!
//! * This transforms anything with `Read`/`Write` + `Seek`, usually files
//! * The source file extension travels in the header as a length-prefixed
//!   field, outside the coded symbol stream
//! * Decode termination is count-driven, the packed stream has no sentinel
//!
//! Layout of a compressed artifact:
//!
//! ```text
//! [0]       u8 unique symbol count N (0 with F > 0 means 256)
//! [1]       u8 frequency field width F in bytes (0 only for empty content)
//! [2..]     N records of 1 symbol byte + F bytes big-endian frequency
//! [..]      u8 extension length L, then L extension bytes
//! [..]      packed codewords, MSB first within each byte
//! ```

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter,ErrorKind};
use crate::tools::freq::FrequencyTable;
use crate::tools::huffman_tree::{HuffmanTree,HuffmanNode};
use crate::tools::bitio::{BitPacker,BitReader};
use crate::{DYNERR,Error,Options};

/// widest allowed frequency field, counts are u64
const MAX_FREQ_WIDTH: u8 = 8;

/// minimum bytes needed to hold `max_frequency` big-endian
fn freq_field_width(max_frequency: u64) -> u8 {
    let bits = 64 - max_frequency.leading_zeros();
    std::cmp::max((bits + 7) / 8,1) as u8
}

fn read_exact_or_corrupt<R: Read>(reader: &mut R,buf: &mut [u8]) -> Result<(),DYNERR> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind()==ErrorKind::UnexpectedEof => Err(Box::new(Error::CorruptHeader)),
        Err(e) => Err(Box::new(e))
    }
}

/// Write count and width bytes followed by the leaf records in tree order.
fn write_header<W: Write>(writer: &mut W,tree: &HuffmanTree) -> Result<(),DYNERR> {
    let leaves = tree.leaves();
    let width = freq_field_width(tree.max_frequency());
    // 256 distinct symbols wraps to 0, readable because width is never 0 here
    writer.write_all(&[leaves.len() as u8,width])?;
    for (symbol,frequency) in leaves {
        writer.write_all(&[*symbol])?;
        for i in (0..width).rev() {
            writer.write_all(&[(*frequency >> (8*i)) as u8])?;
        }
    }
    Ok(())
}

fn write_extension<W: Write>(writer: &mut W,ext: &str) -> Result<(),DYNERR> {
    if ext.len() > u8::MAX as usize {
        return Err(Box::new(Error::ExtensionTooLong));
    }
    writer.write_all(&[ext.len() as u8])?;
    writer.write_all(ext.as_bytes())?;
    Ok(())
}

/// Read the leaf records and extension back.  An empty leaf list means the
/// original content was empty.
fn read_header<R: Read>(reader: &mut R) -> Result<(Vec<(u8,u64)>,String),DYNERR> {
    let mut prologue: [u8;2] = [0;2];
    read_exact_or_corrupt(reader,&mut prologue)?;
    let width = prologue[1];
    let count = match (prologue[0],width) {
        (0,0) => 0,
        (0,_) => 256,
        (n,_) => n as usize
    };
    if count > 0 && (width < 1 || width > MAX_FREQ_WIDTH) {
        return Err(Box::new(Error::CorruptHeader));
    }
    let mut leaves: Vec<(u8,u64)> = Vec::with_capacity(count);
    let mut record = vec![0;1 + width as usize];
    for _i in 0..count {
        read_exact_or_corrupt(reader,&mut record)?;
        let mut frequency: u64 = 0;
        for by in &record[1..] {
            frequency = (frequency << 8) | *by as u64;
        }
        leaves.push((record[0],frequency));
    }
    let mut ext_len: [u8;1] = [0];
    read_exact_or_corrupt(reader,&mut ext_len)?;
    let mut ext_bytes = vec![0;ext_len[0] as usize];
    read_exact_or_corrupt(reader,&mut ext_bytes)?;
    let ext = match String::from_utf8(ext_bytes) {
        Ok(s) => s,
        Err(_) => return Err(Box::new(Error::CorruptHeader))
    };
    Ok((leaves,ext))
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// `ext` is the source file extension carried in the header, empty is allowed.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, ext: &str, opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    if ext.len() > u8::MAX as usize {
        return Err(Box::new(Error::ExtensionTooLong));
    }
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let mut expanded_length = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > expanded_length {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    expanded_length -= opt.in_offset;
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;

    log::debug!("counting pass");
    let table = FrequencyTable::count(&mut reader,opt.chunk_size)?;
    log::debug!("counted {} bytes, {} distinct",table.total(),table.distinct());
    if table.distinct() == 0 {
        // empty content, the header still carries the extension
        writer.write_all(&[0,0])?;
        write_extension(&mut writer,ext)?;
        writer.flush()?;
        return Ok((0,writer.stream_position()? - opt.out_offset));
    }
    let tree = HuffmanTree::from_table(&table)?;
    let code = tree.derive_code();
    write_header(&mut writer,&tree)?;
    write_extension(&mut writer,ext)?;

    log::debug!("encoding {} symbols",tree.total_symbols());
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    let mut packer = BitPacker::new();
    let mut buf = vec![0;opt.chunk_size];
    loop {
        let bytes_read = reader.read(&mut buf)?;
        if bytes_read == 0 {
            break;
        }
        for b in &buf[0..bytes_read] {
            match code.get(*b) {
                Some(codeword) => packer.push_codeword(codeword),
                // every counted byte has a codeword by construction
                None => panic!("byte {} has no codeword",b)
            }
        }
        packer.flush_bytes(&mut writer)?;
    }
    packer.finish(&mut writer)?;
    writer.flush()?;
    Ok((expanded_length,writer.stream_position()? - opt.out_offset))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (extension,in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W, opt: &Options) -> Result<(String,u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let mut compressed_size = reader.seek(SeekFrom::End(0))?;
    if opt.in_offset > compressed_size {
        return Err(Box::new(Error::FileFormatMismatch));
    }
    compressed_size -= opt.in_offset;
    reader.seek(SeekFrom::Start(opt.in_offset))?;
    writer.seek(SeekFrom::Start(opt.out_offset))?;

    let (leaves,ext) = read_header(&mut reader)?;
    if leaves.is_empty() {
        writer.flush()?;
        return Ok((ext,compressed_size,0));
    }
    let tree = HuffmanTree::from_leaves(leaves)?;
    let mut remaining = tree.total_symbols();
    log::debug!("decoding {} symbols",remaining);
    let mut bits = BitReader::new();
    let mut node = tree.root();
    let mut out_buf: Vec<u8> = Vec::with_capacity(opt.chunk_size);
    while remaining > 0 {
        let bit = match bits.get_bit(&mut reader) {
            Ok(b) => b,
            Err(e) if e.kind()==ErrorKind::UnexpectedEof => return Err(Box::new(Error::TruncatedBitstream)),
            Err(e) => return Err(Box::new(e))
        };
        node = match node {
            HuffmanNode::Internal { left, right, .. } => match bit {
                0 => left.as_ref(),
                _ => right.as_ref()
            },
            // the walk always restarts from the root, which is internal
            HuffmanNode::Leaf {..} => panic!("tree walk started on a leaf")
        };
        if let HuffmanNode::Leaf { symbol, .. } = node {
            out_buf.push(*symbol);
            remaining -= 1;
            node = tree.root();
            if out_buf.len() >= opt.chunk_size {
                writer.write_all(&out_buf)?;
                out_buf.clear();
            }
        }
    }
    writer.write_all(&out_buf)?;
    writer.flush()?;
    Ok((ext,compressed_size,writer.stream_position()? - opt.out_offset))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],ext: &str) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,ext,&crate::STD_OPTIONS)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning the extension and a Vec
pub fn expand_slice(slice: &[u8]) -> Result<(String,Vec<u8>),DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    let (ext,_,_) = expand(&mut src,&mut ans,&crate::STD_OPTIONS)?;
    Ok((ext,ans.into_inner()))
}

// *************** TESTS *****************

#[test]
fn compression_works() {
    // freqs A=3 B=2 C=1 give codes A=0 B=11 C=10, packed 00011111 0-------
    let test_data = "AAABBC".as_bytes();
    let hzip_str = "03 01 41 03 42 02 43 01 03 74 78 74 1F 00";
    let compressed = compress_slice(test_data,"txt").expect("compression failed");
    assert_eq!(compressed,hex::decode(hzip_str.replace(" ","")).unwrap());
}

#[test]
fn single_symbol_works() {
    // one distinct byte forces the placeholder leaf, A maps to the 1 bit
    let test_data = "AAAA".as_bytes();
    let hzip_str = "01 01 41 04 03 62 69 6E F0";
    let compressed = compress_slice(test_data,"bin").expect("compression failed");
    assert_eq!(compressed,hex::decode(hzip_str.replace(" ","")).unwrap());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,"txt").expect("compression failed");
    let (ext,expanded) = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(ext,"txt");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility_all_bytes() {
    let test_data: Vec<u8> = (0..=255).collect();
    let compressed = compress_slice(&test_data,"bin").expect("compression failed");
    let (ext,expanded) = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(ext,"bin");
    assert_eq!(test_data,expanded);
}

#[test]
fn invertibility_empty() {
    let compressed = compress_slice(&[],"txt").expect("compression failed");
    let (ext,expanded) = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(ext,"txt");
    assert_eq!(expanded.len(),0);
}

#[test]
fn invertibility_no_extension() {
    let test_data = "0123456789".as_bytes();
    let compressed = compress_slice(test_data,"").expect("compression failed");
    let (ext,expanded) = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(ext,"");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility_repeated_symbol() {
    let test_data = vec![0x41;1000];
    let compressed = compress_slice(&test_data,"txt").expect("compression failed");
    let (_ext,expanded) = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn invertibility_large_skew() {
    // one rare byte among many forces a long codeword without breaking decode
    let mut test_data = vec![0x00;4096];
    test_data.push(0xff);
    let compressed = compress_slice(&test_data,"dat").expect("compression failed");
    let (_ext,expanded) = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn truncated_stream_fails() {
    let test_data = "AAABBC".as_bytes();
    let compressed = compress_slice(test_data,"txt").expect("compression failed");
    let cut = &compressed[0..compressed.len()-1];
    assert!(expand_slice(cut).is_err());
}

#[test]
fn corrupt_header_fails() {
    // claims 9 leaf records but holds none
    assert!(expand_slice(&[9,1]).is_err());
    // frequency field wider than a u64
    assert!(expand_slice(&[1,9,0x41,0,0,0,0,0,0,0,0,4,0]).is_err());
}
