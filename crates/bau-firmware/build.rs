//! Bakes the advertised broadcast identity into the firmware.
//!
//! Values come from the process environment or a `.env` file:
//!
//! | Variable             | Example             | Default             |
//! |----------------------|---------------------|---------------------|
//! | `BAU_ADDRESS`        | `C0:00:00:00:00:01` | `C0:00:00:00:00:01` |
//! | `BAU_BROADCAST_ID`   | `0x000001`          | `0x000001`          |
//! | `BAU_BROADCAST_NAME` | `Kitchen`           | `Bau Source`        |

use std::env;

const VARS: [(&str, &str); 3] = [
    ("BAU_ADDRESS", "C0:00:00:00:00:01"),
    ("BAU_BROADCAST_ID", "0x000001"),
    ("BAU_BROADCAST_NAME", "Bau Source"),
];

fn parse_broadcast_id(raw: &str) -> u32 {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    match u32::from_str_radix(digits, 16) {
        Ok(id) if id <= 0xFF_FFFF => id,
        _ => panic!("BAU_BROADCAST_ID must be a 24-bit hex value, got {raw:?}"),
    }
}

fn main() {
    // A missing .env is fine; the defaults apply
    let _ = dotenvy::dotenv();

    println!("cargo:rerun-if-changed=.env");
    println!("cargo:rustc-link-arg-bins=-Tlinkall.x");

    for (name, default) in VARS {
        println!("cargo:rerun-if-env-changed={name}");
        let value = env::var(name).unwrap_or_else(|_| default.to_string());

        let value = if name == "BAU_BROADCAST_ID" {
            parse_broadcast_id(&value).to_string()
        } else {
            value
        };

        println!("cargo:rustc-env={name}={value}");
    }
}
