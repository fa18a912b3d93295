//! Fingerprints the stylesheet at build time.
//!
//! `static/css/main.css` is copied to `static/css/derived/main.<hash>.css`
//! and the hash is exported as the `CSS_HASH` compile-time env var, so the
//! templates link a URL that changes exactly when the content does and the
//! file can be cached forever.

use std::env;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

const STYLESHEET: &str = "static/css/main.css";
const FINGERPRINT_LEN: usize = 8;

fn main() {
    let manifest_dir: PathBuf = env::var_os("CARGO_MANIFEST_DIR")
        .expect("CARGO_MANIFEST_DIR must be set by Cargo")
        .into();
    let source = manifest_dir.join(STYLESHEET);

    println!("cargo:rerun-if-changed={}", source.display());

    // A checkout without the stylesheet still builds; the link just 404s
    let Ok(content) = fs::read(&source) else {
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let fingerprint = &digest[..FINGERPRINT_LEN];
    println!("cargo:rustc-env=CSS_HASH={fingerprint}");

    let derived_dir = manifest_dir.join("static/css/derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create the derived css directory");
    fs::copy(&source, derived_dir.join(format!("main.{fingerprint}.css")))
        .expect("Failed to copy the fingerprinted stylesheet");
}
