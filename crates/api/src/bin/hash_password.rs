//! Print an Argon2id hash for seeding a user row by hand.
//!
//! ```text
//! hash-password 'correct horse battery staple'
//! echo -n 'correct horse battery staple' | hash-password
//! ```

use std::io::Read;

use anyhow::Context;
use entyre_api::auth::password::{hash_password, validate_password_strength};

fn main() -> anyhow::Result<()> {
    let password = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading password from stdin")?;
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    validate_password_strength(&password).map_err(anyhow::Error::msg)?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
    println!("{hash}");
    Ok(())
}
