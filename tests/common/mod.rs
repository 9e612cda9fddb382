//! Helpers shared by the integration tests: read a rewritten constructor
//! line back into a decoder.

#![allow(dead_code)]

use std::path::PathBuf;

use ragel_bitmap::{Bitmap, Variant};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

/// Decodes the double-quoted literals in `args` (`"\x01", "ab"`).
pub fn parse_literals(args: &str) -> Vec<Vec<u8>> {
    let bytes = args.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'"' {
            i += 1;
            continue;
        }
        i += 1;
        let mut lit = Vec::new();
        while bytes[i] != b'"' {
            if bytes[i] != b'\\' {
                lit.push(bytes[i]);
                i += 1;
                continue;
            }
            let (b, used) = match bytes[i + 1] {
                b'x' => {
                    let hex = std::str::from_utf8(&bytes[i + 2..i + 4]).unwrap();
                    (u8::from_str_radix(hex, 16).unwrap(), 4)
                }
                b'n' => (b'\n', 2),
                b't' => (b'\t', 2),
                b'r' => (b'\r', 2),
                b'f' => (0x0c, 2),
                b'v' => (0x0b, 2),
                b'b' => (0x08, 2),
                b'a' => (0x07, 2),
                b'e' => (0x1b, 2),
                c @ (b'"' | b'\\' | b'#') => (c, 2),
                c => panic!("unexpected escape \\{}", c as char),
            };
            lit.push(b);
            i += used;
        }
        i += 1;
        out.push(lit);
    }
    out
}

/// Parses `recv.name = NS::Variant.new(...)` into the table name and decoder.
pub fn decode_statement(line: &str) -> (String, Bitmap) {
    let (lhs, rhs) = line.split_once(" = ").unwrap();
    let name = lhs.rsplit('.').next().unwrap().to_string();
    let (ctor, args) = rhs.split_once(".new(").unwrap();
    let variant: Variant = ctor.rsplit("::").next().unwrap().parse().unwrap();
    let args = &args[..args.rfind(')').unwrap()];
    (name, Bitmap::new(variant, parse_literals(args)).unwrap())
}
