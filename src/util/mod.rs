//! File/stdin reading (spec §6 Driver), grounded in `clausy/util/io.rs`'s
//! `read_file` (same "starts with `-` means stdin" convention), trimmed down
//! since the core has no extension-sniffing front end to feed.

use std::fs;
use std::io::Read;

/// Reads a whole file's contents.
pub(crate) fn read_file_to_string(file_name: &str) -> String {
    fs::read_to_string(file_name).unwrap_or_else(|e| panic!("failed to read {file_name}: {e}"))
}

/// Reads all of standard input.
pub(crate) fn read_stdin() -> String {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .unwrap_or_else(|e| panic!("failed to read stdin: {e}"));
    content
}
