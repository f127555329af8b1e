// Build script that exposes the checked-in C header to downstream builds.
//
// Consumers can include the header from:
//   - <repo>/lattice-ffi/include/lattice.h   (checked-in)
//   - $OUT_DIR/lattice.h (Cargo exposes via env at build time)

use std::{env, fs, path::PathBuf};

fn main() {
    // Re-run build.rs if these change
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/lattice.h");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let header_repo = crate_dir.join("include").join("lattice.h");
    let header_out = out_dir.join("lattice.h");

    if header_repo.exists() {
        fs::copy(&header_repo, &header_out).expect("failed to copy include/lattice.h to OUT_DIR");
    } else {
        println!("cargo:warning=lattice-ffi: include/lattice.h missing; header not exported");
    }
}
