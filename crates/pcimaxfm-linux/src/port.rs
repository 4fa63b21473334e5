//! Port access through `/dev/port`
//!
//! `/dev/port` maps file offsets to I/O port numbers, so a one-byte
//! positioned read or write is an `inb`/`outb`. Access needs `CAP_SYS_RAWIO`.
//!
//! There is no kernel-side claim on the card's ports from userspace, so the
//! I/O window is reserved with an exclusive `flock` on a per-window lock
//! file. The lock goes away with the process. One [`DevPort`] may hold
//! several windows; each is released on its own.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pcimaxfm_core::io::PortIo;
use pcimaxfm_core::Result as CoreResult;

use crate::error::{LinuxPortError, Result};

/// Port device
pub const DEV_PORT: &str = "/dev/port";

/// Directory for window reservation lock files
pub const LOCK_DIR: &str = "/run/lock";

/// Port I/O via `/dev/port`
#[derive(Debug)]
pub struct DevPort {
    file: File,
    lock_dir: PathBuf,
    locks: HashMap<u16, File>,
}

impl DevPort {
    /// Open `/dev/port`
    pub fn open() -> Result<Self> {
        Self::open_path(Path::new(DEV_PORT))
    }

    /// Open a port device at a custom path
    pub fn open_path(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| LinuxPortError::OpenFailed {
                path: path.display().to_string(),
                source,
            })?;

        log::debug!("Opened {}", path.display());

        Ok(Self {
            file,
            lock_dir: PathBuf::from(LOCK_DIR),
            locks: HashMap::new(),
        })
    }

    /// Put reservation lock files in `dir` instead of [`LOCK_DIR`]
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    fn lock_path(&self, base: u16) -> PathBuf {
        self.lock_dir.join(format!("pcimaxfm-{:04x}.lock", base))
    }

    /// Take the exclusive lock for the window at `base`
    fn lock_window(&self, base: u16) -> Result<File> {
        let path = self.lock_path(base);
        let lock_error = |source| LinuxPortError::LockFailed {
            path: path.display().to_string(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(lock_error)?;

        // SAFETY: the descriptor is owned by `file` and stays open for the call
        let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if ret != 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
                return Err(LinuxPortError::Busy { base });
            }
            return Err(lock_error(err));
        }

        Ok(file)
    }

    fn read_port(&self, port: u16) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.file
            .read_exact_at(&mut buf, u64::from(port))
            .map_err(|source| LinuxPortError::Access { port, source })?;
        Ok(buf[0])
    }

    fn write_port(&self, port: u16, value: u8) -> Result<()> {
        self.file
            .write_all_at(&[value], u64::from(port))
            .map_err(|source| LinuxPortError::Access { port, source })
    }
}

fn log_failure(e: LinuxPortError) -> pcimaxfm_core::Error {
    log::error!("{}", e);
    e.into()
}

impl PortIo for DevPort {
    fn inb(&mut self, port: u16) -> CoreResult<u8> {
        self.read_port(port).map_err(log_failure)
    }

    fn outb(&mut self, port: u16, value: u8) -> CoreResult<()> {
        self.write_port(port, value).map_err(log_failure)
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn reserve(&mut self, base: u16, len: u16) -> CoreResult<()> {
        if self.locks.contains_key(&base) {
            return Err(log_failure(LinuxPortError::Busy { base }));
        }
        let lock = self.lock_window(base).map_err(log_failure)?;
        log::debug!(
            "Reserved I/O ports {:#x}-{:#x}",
            base,
            base.saturating_add(len.saturating_sub(1))
        );
        self.locks.insert(base, lock);
        Ok(())
    }

    fn release(&mut self, base: u16, _len: u16) {
        // Closing the file drops the flock
        if self.locks.remove(&base).is_some() {
            log::debug!("Released I/O ports at {:#x}", base);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pcimaxfm-port-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// A plain file stands in for `/dev/port`
    fn fake_port(dir: &Path) -> DevPort {
        let path = dir.join("port");
        std::fs::write(&path, vec![0u8; 0x10000]).unwrap();
        DevPort::open_path(&path).unwrap().with_lock_dir(dir)
    }

    #[test]
    fn test_offsets_are_ports() {
        let dir = scratch("offsets");
        let mut port = fake_port(&dir);
        port.outb(0xe003, 0x5a).unwrap();
        assert_eq!(port.inb(0xe003).unwrap(), 0x5a);
        assert_eq!(port.inb(0xe002).unwrap(), 0);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reservation_is_exclusive() {
        let dir = scratch("reserve");
        let mut first = fake_port(&dir);
        let mut second = fake_port(&dir);

        first.reserve(0xe000, 4).unwrap();
        assert_eq!(
            second.reserve(0xe000, 4),
            Err(pcimaxfm_core::Error::ResourceBusy { base: 0xe000 })
        );
        assert!(second.reserve(0xd000, 4).is_ok());

        first.release(0xe000, 4);
        assert!(second.reserve(0xe000, 4).is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_windows_are_released_separately() {
        let dir = scratch("windows");
        let mut port = fake_port(&dir);
        let mut other = fake_port(&dir);

        port.reserve(0xd000, 4).unwrap();
        port.reserve(0xe000, 4).unwrap();
        assert_eq!(
            port.reserve(0xd000, 4),
            Err(pcimaxfm_core::Error::ResourceBusy { base: 0xd000 })
        );

        port.release(0xe000, 4);
        assert!(other.reserve(0xe000, 4).is_ok());
        assert_eq!(
            other.reserve(0xd000, 4),
            Err(pcimaxfm_core::Error::ResourceBusy { base: 0xd000 })
        );

        port.release(0xd000, 4);
        assert!(other.reserve(0xd000, 4).is_ok());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_missing_device() {
        let err = DevPort::open_path(Path::new("/nonexistent/port")).unwrap_err();
        assert!(matches!(err, LinuxPortError::OpenFailed { .. }));
    }
}
