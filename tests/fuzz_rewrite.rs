//! Seeded fuzzing of whole-file rewrites:
//!  - random Ragel-like modules with tables of every width, wrapped at random
//!  - filler code between tables that must come through untouched
//!
//! Override with RAGEL_FUZZ_SEED / RAGEL_FUZZ_CASES to reproduce a failure.

mod common;

use common::{decode_statement, env_u64, env_usize};
use rand::{Rng, SeedableRng, rngs::StdRng};
use ragel_bitmap::{Options, locate, rewrite};

const FILLER: &[&str] = &[
    "x = foo(1, 2) if ready?",
    "list.each do |item|\n  puts item\nend",
    "msg = \"table #{name} [\" + 'end'",
    "case cs\nwhen 1 then p += 1\nelse p -= 1\nend",
    "# self._commented = [1, 2, 3]",
    "begin\n  run\nrescue => e\n  warn e.message\nend",
    "self.start = 1",
    "def self.lookup(i) = _tbl[i]",
    "data = <<~EOS\n  self._in_heredoc = [1]\nEOS",
    "while p < pe do\n  p += 1\nend",
];

fn gen_numbers(rng: &mut StdRng) -> Vec<u64> {
    let len = rng.random_range(1..60);
    let bits = rng.random_range(1..=64u32);
    (0..len)
        .map(|_| {
            let n: u64 = rng.random();
            if bits == 64 { n } else { n & ((1u64 << bits) - 1) }
        })
        .collect()
}

fn render_table(rng: &mut StdRng, name: &str, numbers: &[u64], indent: &str) -> String {
    let per_line = rng.random_range(1..=numbers.len() + 1);
    let mut out = format!("{indent}self.{name} = [");
    if per_line > numbers.len() {
        let items: Vec<String> = numbers.iter().map(|n| format_int(rng, *n)).collect();
        out.push_str(&items.join(", "));
        out.push(']');
    } else {
        out.push('\n');
        for chunk in numbers.chunks(per_line) {
            let items: Vec<String> = chunk.iter().map(|n| format_int(rng, *n)).collect();
            out.push_str(&format!("{indent}  {},\n", items.join(", ")));
        }
        out.push_str(&format!("{indent}]"));
    }
    out
}

fn format_int(rng: &mut StdRng, n: u64) -> String {
    match rng.random_range(0..4) {
        0 => format!("{n:#x}"),
        1 if n > 0 => format!("0{n:o}"),
        _ => n.to_string(),
    }
}

const TABLE: &str = "  <table>";

// Source, the same source with each table collapsed to TABLE, and the tables.
fn gen_source(rng: &mut StdRng) -> (String, String, Vec<(String, Vec<u64>)>) {
    let mut src = String::from("module Parser\n");
    let mut skeleton = src.clone();
    let mut tables = Vec::new();
    for t in 0..rng.random_range(1..8) {
        for _ in 0..rng.random_range(0..3) {
            let filler = FILLER[rng.random_range(0..FILLER.len())];
            src.push_str(filler);
            src.push('\n');
            skeleton.push_str(filler);
            skeleton.push('\n');
        }
        let name = format!("_table_{t}");
        let numbers = gen_numbers(rng);
        src.push_str(&render_table(rng, &name, &numbers, "  "));
        src.push('\n');
        skeleton.push_str(TABLE);
        skeleton.push('\n');
        tables.push((name, numbers));
    }
    src.push_str("end\n");
    skeleton.push_str("end\n");
    (src, skeleton, tables)
}

#[test]
fn fuzz_rewrite_roundtrip() {
    let seed = env_u64("RAGEL_FUZZ_SEED", 0x5eed_b17a);
    let cases = env_usize("RAGEL_FUZZ_CASES", 200);
    let mut rng = StdRng::seed_from_u64(seed);

    for case in 0..cases {
        let (src, skeleton, expected) = gen_source(&mut rng);
        let flat = rng.random_bool(0.5);
        let opts = Options::default().with_flat_offsets(flat);

        let out = rewrite(&src, &opts)
            .unwrap_or_else(|e| panic!("seed {seed:#x} case {case}: {e}\n{src}"));
        assert_eq!(out.replaced.len(), expected.len(), "seed {seed:#x} case {case}");

        let decoded: Vec<_> = out
            .source
            .lines()
            .filter(|l| l.contains("::Ragel::Bitmap::"))
            .map(decode_statement)
            .collect();
        assert_eq!(decoded.len(), expected.len());
        for ((name, bitmap), (want_name, want)) in decoded.iter().zip(&expected) {
            assert_eq!(name, want_name, "seed {seed:#x} case {case}");
            assert_eq!(&bitmap.iter().collect::<Vec<_>>(), want, "seed {seed:#x} case {case} {name}");
        }

        // Nothing left to find, and everything around the tables reads the same.
        assert!(locate(&out.source, &opts).unwrap().is_empty());
        let masked: Vec<&str> = out
            .source
            .lines()
            .map(|l| if l.contains("::Ragel::Bitmap::") { TABLE } else { l })
            .collect();
        assert_eq!(masked, skeleton.lines().collect::<Vec<_>>(), "seed {seed:#x} case {case}");
    }
}
