pub mod freq;
pub mod huffman_tree;
pub mod bitio;
