//! Creates a 100k-code pack and redeems a sample of it, for timing key
//! generation and batch writes.
//!
//! Run with: `cargo run -q --example bulk_pack -p cdkey_core`

use cdkey_core::Registry;
use cdkey_core::types::{Config, NewPack};
use std::time::Instant;

const PACK_NAME: &str = "bulk";
const PACK_SIZE: usize = 100_000;

fn main() {
    let base_path = std::env::temp_dir().join("cdkey-bulk");
    println!("Using data path: {}", base_path.display());

    let registry = Registry::open(Config::new(&base_path)).expect("Failed to open registry");

    if registry.contains(PACK_NAME) {
        registry
            .remove_pack(PACK_NAME)
            .expect("Failed to remove old pack");
    }

    let started = Instant::now();
    registry
        .add_pack(&NewPack {
            name: PACK_NAME.to_string(),
            prefix: "BLK".to_string(),
            key_len: 12,
            pack_size: PACK_SIZE,
            note: "bulk example".to_string(),
        })
        .expect("Failed to create pack");
    println!("Created {} codes in {:?}", PACK_SIZE, started.elapsed());

    registry.enable_pack(PACK_NAME).expect("Failed to enable pack");

    let keys = registry.list_keys(PACK_NAME).expect("Failed to list keys");
    let started = Instant::now();
    let redeemed = keys
        .iter()
        .step_by(100)
        .filter(|r| registry.use_key(PACK_NAME, &r.key).is_ok())
        .count();
    println!("Redeemed {} codes in {:?}", redeemed, started.elapsed());

    registry.stop_all();
}
