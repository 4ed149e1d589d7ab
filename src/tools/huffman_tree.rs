//! Huffman tree construction and prefix code derivation.
//!
//! The working list of merge candidates is kept in *descending* frequency
//! order.  Each merge step takes the two candidates at the tail (the two
//! lowest frequencies), the first popped becoming the left child and the
//! second the right child.  The merged node is re-inserted by scanning from
//! the front while existing frequencies are strictly greater, which places it
//! *ahead* of any candidate with an equal frequency.  This tie-break is what
//! makes codeword assignment reproducible; both the encoder and the decoder
//! rebuild the tree with the same rule, so it must not be changed in
//! isolation.

use bit_vec::BitVec;
use crate::tools::freq::{FrequencyTable,ALPHABET_SIZE};
use crate::Error;

/// A node of the Huffman tree.  An internal node always owns exactly two
/// children, so the malformed shapes (a childless internal node, a leaf with
/// children) cannot be represented.
pub enum HuffmanNode {
    Leaf {
        symbol: u8,
        frequency: u64
    },
    Internal {
        frequency: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>
    }
}

impl HuffmanNode {
    fn merge(left: HuffmanNode, right: HuffmanNode) -> Self {
        Self::Internal {
            frequency: left.frequency() + right.frequency(),
            left: Box::new(left),
            right: Box::new(right)
        }
    }
    pub fn frequency(&self) -> u64 {
        match self {
            Self::Leaf { frequency, .. } => *frequency,
            Self::Internal { frequency, .. } => *frequency
        }
    }
}

/// Mapping from byte values to their variable length codewords.
/// A codeword is a `BitVec` so its length is explicit and unbounded;
/// in a badly skewed tree it can exceed any native integer width.
pub struct PrefixCode {
    codes: Vec<Option<BitVec>>
}

impl PrefixCode {
    /// Codeword for a byte, or None if the byte never occurred during counting.
    pub fn get(&self,symbol: u8) -> Option<&BitVec> {
        self.codes[symbol as usize].as_ref()
    }
}

/// The Huffman tree together with the ordered leaf list it was built from.
/// The leaf list is what gets persisted in the container header; its order
/// must be preserved exactly for the decoder to rebuild an identical tree.
pub struct HuffmanTree {
    root: HuffmanNode,
    leaves: Vec<(u8,u64)>
}

/// Insert preserving descending frequency order.  Scanning stops at the first
/// candidate whose frequency is not strictly greater, so a node ties ahead of
/// equal-frequency candidates.
fn insert_by_frequency(nodes: &mut Vec<HuffmanNode>,node: HuffmanNode) {
    let mut i = 0;
    while i < nodes.len() && nodes[i].frequency() > node.frequency() {
        i += 1;
    }
    nodes.insert(i,node);
}

impl HuffmanTree {
    /// Build the tree from a frequency table.  The leaf list is formed by
    /// scanning byte values in ascending order and inserting each with the
    /// same descending-order rule used during merging.
    pub fn from_table(table: &FrequencyTable) -> Result<Self,Error> {
        let mut leaves: Vec<(u8,u64)> = Vec::new();
        for i in 0..ALPHABET_SIZE {
            let frequency = table.get(i as u8);
            if frequency == 0 {
                continue;
            }
            let mut pos = 0;
            while pos < leaves.len() && leaves[pos].1 > frequency {
                pos += 1;
            }
            leaves.insert(pos,(i as u8,frequency));
        }
        Self::from_leaves(leaves)
    }
    /// Build the tree from an ordered leaf list, e.g. one deserialized from a
    /// container header.  The list is used exactly as given, no re-sorting.
    pub fn from_leaves(leaves: Vec<(u8,u64)>) -> Result<Self,Error> {
        if leaves.is_empty() {
            return Err(Error::EmptyInput);
        }
        let mut working: Vec<HuffmanNode> = leaves.iter()
            .map(|(symbol,frequency)| HuffmanNode::Leaf { symbol: *symbol, frequency: *frequency })
            .collect();
        if working.len() == 1 {
            // A lone leaf cannot anchor a codeword, so synthesize a frequency 0
            // placeholder to force a two-leaf tree.  The placeholder never
            // reaches the header and its codeword is never emitted; the decoder
            // applies the same rule and arrives at the same tree.
            let symbol = leaves[0].0.wrapping_add(1);
            working.push(HuffmanNode::Leaf { symbol, frequency: 0 });
        }
        while working.len() > 1 {
            let left = working.pop().unwrap();
            let right = working.pop().unwrap();
            insert_by_frequency(&mut working,HuffmanNode::merge(left,right));
        }
        Ok(Self {
            root: working.pop().unwrap(),
            leaves
        })
    }
    pub fn root(&self) -> &HuffmanNode {
        &self.root
    }
    /// leaf list in the order used for construction (descending frequency)
    pub fn leaves(&self) -> &[(u8,u64)] {
        &self.leaves
    }
    /// total number of symbols that were counted, this is what drives
    /// decode termination
    pub fn total_symbols(&self) -> u64 {
        self.root.frequency()
    }
    pub fn max_frequency(&self) -> u64 {
        self.leaves.iter().map(|(_,f)| *f).max().unwrap_or(0)
    }
    /// Derive the codeword for every leaf by walking root-to-leaf paths,
    /// left appending 0 and right appending 1.  The root itself contributes
    /// no bit.  Prefix-freedom follows from no leaf lying on another's path.
    pub fn derive_code(&self) -> PrefixCode {
        let mut codes: Vec<Option<BitVec>> = vec![None;ALPHABET_SIZE];
        assign_codes(&self.root,BitVec::new(),&mut codes);
        PrefixCode { codes }
    }
}

fn assign_codes(node: &HuffmanNode,path: BitVec,codes: &mut Vec<Option<BitVec>>) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            codes[*symbol as usize] = Some(path);
        },
        HuffmanNode::Internal { left, right, .. } => {
            let mut left_path = path.clone();
            left_path.push(false);
            assign_codes(left,left_path,codes);
            let mut right_path = path;
            right_path.push(true);
            assign_codes(right,right_path,codes);
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn bits(code: &BitVec) -> Vec<bool> {
    code.iter().collect()
}

#[cfg(test)]
fn table_from(bytes: &[u8]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    table.tally(bytes);
    table
}

#[test]
fn concrete_codewords() {
    // freqs A=3, B=2, C=1: first merge pairs C (left) with B (right), the
    // sum ties with A and is inserted ahead of it
    let table = table_from("AAABBC".as_bytes());
    let tree = HuffmanTree::from_table(&table).expect("build failed");
    let code = tree.derive_code();
    assert_eq!(bits(code.get(b'A').unwrap()),vec![false]);
    assert_eq!(bits(code.get(b'B').unwrap()),vec![true,true]);
    assert_eq!(bits(code.get(b'C').unwrap()),vec![true,false]);
    assert_eq!(code.get(b'D'),None);
    assert_eq!(tree.total_symbols(),6);
    assert_eq!(tree.leaves(),&[(b'A',3),(b'B',2),(b'C',1)]);
}

#[test]
fn prefix_free() {
    let mut table = FrequencyTable::new();
    for i in 0..32 {
        for _rep in 0..(i as usize + 1) * (i as usize + 1) {
            table.tally(&[i]);
        }
    }
    let code = HuffmanTree::from_table(&table).expect("build failed").derive_code();
    let all: Vec<Vec<bool>> = (0..32).map(|i| bits(code.get(i).unwrap())).collect();
    for i in 0..all.len() {
        for j in 0..all.len() {
            if i != j {
                let shorter = std::cmp::min(all[i].len(),all[j].len());
                assert_ne!(all[i][0..shorter],all[j][0..shorter]);
            }
        }
    }
}

#[test]
fn code_length_monotonicity() {
    let table = table_from("aaaaaaaabbbbccddddddeeeeeeeeeeeef".as_bytes());
    let tree = HuffmanTree::from_table(&table).expect("build failed");
    let code = tree.derive_code();
    for (sym1,freq1) in tree.leaves() {
        for (sym2,freq2) in tree.leaves() {
            if freq1 > freq2 {
                assert!(code.get(*sym1).unwrap().len() <= code.get(*sym2).unwrap().len());
            }
        }
    }
}

#[test]
fn single_symbol_placeholder() {
    let table = table_from(&[0x41;1000]);
    let tree = HuffmanTree::from_table(&table).expect("build failed");
    // placeholder participates in the tree but not in the leaf list
    assert_eq!(tree.leaves(),&[(0x41,1000)]);
    assert!(matches!(tree.root(),HuffmanNode::Internal {..}));
    assert_eq!(tree.total_symbols(),1000);
    let code = tree.derive_code();
    assert_eq!(code.get(0x41).unwrap().len(),1);
}

#[test]
fn empty_table_rejected() {
    match HuffmanTree::from_leaves(Vec::new()) {
        Err(Error::EmptyInput) => {},
        _ => panic!("expected empty input to be rejected")
    }
}
