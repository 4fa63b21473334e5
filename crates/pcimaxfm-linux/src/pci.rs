//! PCI MAX FM card discovery
//!
//! Cards are found through the Linux sysfs interface
//! (`/sys/bus/pci/devices`). The I/O base address is the start of the first
//! I/O port BAR listed in the device's `resource` file.

use std::fs;
use std::path::Path;

use pcimaxfm_core::regs::{PCI_DEVICE_ID, PCI_SUBDEVICE_ID, PCI_SUBVENDOR_ID, PCI_VENDOR_ID};

use crate::error::{LinuxPortError, Result};

/// Default sysfs location of PCI devices
pub const SYSFS_PCI_DEVICES: &str = "/sys/bus/pci/devices";

/// `IORESOURCE_IO` flag in the sysfs `resource` file
const IORESOURCE_IO: u64 = 0x100;

/// A PCI MAX FM card found on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciCard {
    /// Bus:Device.Function including the domain, e.g. `0000:03:00.0`
    pub slot: String,
    /// Start of the I/O port window
    pub base_address: u16,
}

/// Scan `/sys/bus/pci/devices` for cards
pub fn scan_cards() -> Result<Vec<PciCard>> {
    scan_cards_in(Path::new(SYSFS_PCI_DEVICES))
}

/// Scan a sysfs-style PCI device directory for cards
///
/// Devices are returned sorted by slot. A matching device without an I/O
/// port BAR is skipped with a warning.
pub fn scan_cards_in(root: &Path) -> Result<Vec<PciCard>> {
    let scan_error = |source| LinuxPortError::PciScan {
        path: root.display().to_string(),
        source,
    };

    let mut cards = Vec::new();
    for entry in fs::read_dir(root).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let path = entry.path();
        let slot = entry.file_name().to_string_lossy().into_owned();

        if !is_pcimaxfm(&path) {
            continue;
        }

        match read_io_base(&path.join("resource")) {
            Some(base_address) => {
                log::debug!("Found PCI MAX FM card at {} (I/O {:#x})", slot, base_address);
                cards.push(PciCard { slot, base_address });
            }
            None => log::warn!("PCI MAX FM card at {} has no I/O port window", slot),
        }
    }

    cards.sort_by(|a, b| a.slot.cmp(&b.slot));
    Ok(cards)
}

fn is_pcimaxfm(path: &Path) -> bool {
    read_sysfs_hex_u16(&path.join("vendor")) == Some(PCI_VENDOR_ID)
        && read_sysfs_hex_u16(&path.join("device")) == Some(PCI_DEVICE_ID)
        && read_sysfs_hex_u16(&path.join("subsystem_vendor")) == Some(PCI_SUBVENDOR_ID)
        && read_sysfs_hex_u16(&path.join("subsystem_device")) == Some(PCI_SUBDEVICE_ID)
}

/// Read a hex u16 value from a sysfs file
fn read_sysfs_hex_u16(path: &Path) -> Option<u16> {
    let content = fs::read_to_string(path).ok()?;
    let content = content.trim();
    let hex_str = content.strip_prefix("0x").unwrap_or(content);
    u16::from_str_radix(hex_str, 16).ok()
}

/// First I/O BAR start from a `resource` file
///
/// Each line is `start end flags` in hex.
fn read_io_base(path: &Path) -> Option<u16> {
    let content = fs::read_to_string(path).ok()?;
    content.lines().find_map(|line| {
        let mut fields = line.split_whitespace().map(parse_hex_u64);
        let (start, _end, flags) = (fields.next()??, fields.next()??, fields.next()??);
        if flags & IORESOURCE_IO == 0 || start == 0 {
            return None;
        }
        u16::try_from(start).ok()
    })
}

fn parse_hex_u64(s: &str) -> Option<u64> {
    u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct SysfsTree(PathBuf);

    impl SysfsTree {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!(
                "pcimaxfm-sysfs-{}-{}",
                name,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).unwrap();
            Self(root)
        }

        fn device(&self, slot: &str, ids: [u16; 4], resource: &str) {
            let dir = self.0.join(slot);
            fs::create_dir_all(&dir).unwrap();
            let names = ["vendor", "device", "subsystem_vendor", "subsystem_device"];
            for (name, id) in names.iter().zip(ids) {
                fs::write(dir.join(name), format!("{:#06x}\n", id)).unwrap();
            }
            fs::write(dir.join("resource"), resource).unwrap();
        }
    }

    impl Drop for SysfsTree {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    const IDS: [u16; 4] = [PCI_VENDOR_ID, PCI_DEVICE_ID, PCI_SUBVENDOR_ID, PCI_SUBDEVICE_ID];
    const IO_RESOURCE: &str = "0x000000000000e000 0x000000000000e003 0x0000000000040101\n\
                               0x0000000000000000 0x0000000000000000 0x0000000000000000\n";

    #[test]
    fn test_finds_cards_sorted() {
        let tree = SysfsTree::new("sorted");
        tree.device("0000:05:00.0", IDS, IO_RESOURCE);
        tree.device(
            "0000:03:00.0",
            IDS,
            "0x000000000000d000 0x000000000000d003 0x0000000000040101\n",
        );
        tree.device("0000:00:1f.0", [0x8086, 0x1234, 0, 0], IO_RESOURCE);

        let cards = scan_cards_in(&tree.0).unwrap();
        assert_eq!(
            cards,
            vec![
                PciCard {
                    slot: "0000:03:00.0".into(),
                    base_address: 0xd000
                },
                PciCard {
                    slot: "0000:05:00.0".into(),
                    base_address: 0xe000
                },
            ]
        );
    }

    #[test]
    fn test_skips_card_without_io_bar() {
        let tree = SysfsTree::new("nobar");
        tree.device(
            "0000:03:00.0",
            IDS,
            "0x00000000fe000000 0x00000000fe0000ff 0x0000000000040200\n",
        );
        assert!(scan_cards_in(&tree.0).unwrap().is_empty());
    }

    #[test]
    fn test_subsystem_must_match() {
        let tree = SysfsTree::new("subsys");
        tree.device(
            "0000:03:00.0",
            [PCI_VENDOR_ID, PCI_DEVICE_ID, 0x1234, PCI_SUBDEVICE_ID],
            IO_RESOURCE,
        );
        assert!(scan_cards_in(&tree.0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root() {
        let missing = std::env::temp_dir().join("pcimaxfm-sysfs-does-not-exist");
        assert!(matches!(
            scan_cards_in(&missing),
            Err(LinuxPortError::PciScan { .. })
        ));
    }
}
