// Licensed under the Apache-2.0 license

mod test_attest;
mod test_boot;
mod test_credential;
mod test_post_boot;
mod test_replace;
mod test_scan;
