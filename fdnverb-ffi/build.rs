// Build script that tries to generate the C header with `cbindgen`.
// If `cbindgen` is not on PATH it copies the checked-in
// `include/fdnverb.h` to $OUT_DIR instead.
//
// Consumers can include the header from:
//   - <repo>/fdnverb-ffi/include/fdnverb.h      (checked-in)
//   - $OUT_DIR/fdnverb.h

use std::{env, fs, io, path::PathBuf, process::Command};

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/fdnverb.h");

    let crate_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").unwrap_or_default());
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap_or_default());
    let header_repo = crate_dir.join("include").join("fdnverb.h");
    let header_out = out_dir.join("fdnverb.h");

    let cbindgen_ok = Command::new("cbindgen")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    if cbindgen_ok {
        let status = Command::new("cbindgen")
            .args(["--crate", "fdnverb-ffi", "--lang", "C", "--output"])
            .arg(&header_out)
            .current_dir(&crate_dir)
            .status()?;
        if status.success() {
            println!("cargo:warning=fdnverb-ffi: generated header with cbindgen -> {}", header_out.display());
            return Ok(());
        }
        println!("cargo:warning=fdnverb-ffi: cbindgen failed; falling back to checked-in header");
    }

    fs::copy(&header_repo, &header_out)?;
    Ok(())
}
