use std::{env, fs, path::PathBuf};
use reseal_prover::bench_vectors::some_valid_proofs;

fn main() {
    // Default: reseal/prover/vectors.json
    let dst = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("vectors.json"));
    let json = some_valid_proofs().expect("generate vectors");
    fs::write(&dst, json).expect("write vectors");
    eprintln!("Wrote {}", dst.display());
}
