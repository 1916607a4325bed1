/*++
Licensed under the Apache-2.0 license.

File Name:

    memory_layout.rs

Abstract:

    The file contains the layout of the AP's flash and the placement of the
    persisted component record.

--*/

//
// Flash Addresses
//
pub const FLASH_ORG: u32 = 0x1000_0000;

//
// Flash Sizes In Bytes
//
pub const FLASH_SIZE: u32 = 512 * 1024;
pub const FLASH_PAGE_SIZE: u32 = 8 * 1024;

/// The component record occupies the second page from the top of flash.
pub const FLASH_RECORD_ORG: u32 = FLASH_ORG + FLASH_SIZE - 2 * FLASH_PAGE_SIZE;

const _: () = assert!(FLASH_RECORD_ORG % FLASH_PAGE_SIZE == 0);

#[test]
fn test_record_page() {
    assert_eq!(FLASH_RECORD_ORG, 0x1007_C000);
    assert!(FLASH_RECORD_ORG + FLASH_PAGE_SIZE <= FLASH_ORG + FLASH_SIZE);
}
