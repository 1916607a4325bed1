/*++

Licensed under the Apache-2.0 license.

File Name:

    build.rs

Abstract:

    Build script for the AP runtime. Bakes the provisioning secrets and the
    initial component list into the firmware.

--*/

use std::env;
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

const PIN_LEN: usize = 6;
const TOKEN_LEN: usize = 16;
const MAX_COMPONENTS: usize = 32;
const MAX_BOOT_MSG: usize = 64;

const DEV_PIN: &str = "123456";
const DEV_TOKEN: &str = "0123456789abcdef";
const DEV_BOOT_MSG: &str = "Application Processor booted";
const DEV_COMPONENT_IDS: &str = "0x11111124,0x11111125";
const DEV_FLASH_MAGIC: &str = "0x7b1dc3a5";
const DEV_FLASH_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

fn env_or(name: &str, default: &str, secret: bool) -> String {
    println!("cargo:rerun-if-env-changed={name}");
    match env::var(name) {
        Ok(val) => val,
        Err(_) => {
            if secret {
                println!("cargo:warning={name} not set, using development value");
            }
            default.to_string()
        }
    }
}

fn parse_u32(s: &str) -> u32 {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).unwrap_or_else(|_| panic!("invalid hex word {s:?}"))
}

fn parse_key(s: &str) -> [u8; 32] {
    let s = s.trim();
    assert_eq!(s.len(), 64, "AP_FLASH_KEY must be 64 hex characters");
    let mut key = [0u8; 32];
    for (i, byte) in key.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
            .unwrap_or_else(|_| panic!("AP_FLASH_KEY is not hex"));
    }
    key
}

fn main() {
    let pin = env_or("AP_PIN", DEV_PIN, true);
    let token = env_or("AP_TOKEN", DEV_TOKEN, true);
    let boot_msg = env_or("AP_BOOT_MSG", DEV_BOOT_MSG, false);
    let ids = env_or("COMPONENT_IDS", DEV_COMPONENT_IDS, false);
    let magic = parse_u32(&env_or("AP_FLASH_MAGIC", DEV_FLASH_MAGIC, true));
    let key = parse_key(&env_or("AP_FLASH_KEY", DEV_FLASH_KEY, true));

    assert_eq!(pin.len(), PIN_LEN, "AP_PIN must be {PIN_LEN} bytes");
    assert_eq!(token.len(), TOKEN_LEN, "AP_TOKEN must be {TOKEN_LEN} bytes");
    assert!(
        boot_msg.len() <= MAX_BOOT_MSG,
        "AP_BOOT_MSG longer than {MAX_BOOT_MSG} bytes"
    );

    let ids: Vec<u32> = ids
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_u32)
        .collect();
    assert!(
        ids.len() <= MAX_COMPONENTS,
        "COMPONENT_IDS lists more than {MAX_COMPONENTS} ids"
    );

    let mut out = String::new();
    writeln!(out, "pub const AP_PIN: &str = {pin:?};").unwrap();
    writeln!(out, "pub const AP_TOKEN: &str = {token:?};").unwrap();
    writeln!(out, "pub const AP_BOOT_MSG: &str = {boot_msg:?};").unwrap();
    write!(out, "pub const COMPONENT_IDS: &[u32] = &[").unwrap();
    for id in &ids {
        write!(out, "{id:#010x}, ").unwrap();
    }
    writeln!(out, "];").unwrap();
    writeln!(out, "pub const FLASH_MAGIC: u32 = {magic:#010x};").unwrap();
    writeln!(out, "pub const FLASH_KEY: [u8; 32] = {key:?};").unwrap();

    let out_file = PathBuf::from(env::var("OUT_DIR").unwrap()).join("ap_params.rs");
    fs::write(out_file, out).unwrap();
}
