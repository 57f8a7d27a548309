//! Device communication — channel trait + device-file backend.
//!
//! Every operation is a complete transaction: open the device file, move at
//! most one frame, close. Nothing is cached between calls; the display
//! mirror lives in [`crate::state::DisplayState`].

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::codec::{self, BitMask, CodecError, WireFrame};
use crate::protocol::*;

// ── Error type ──

/// Device communication errors.
///
/// String payloads follow the convention **"context: details"** where
/// *context* names the step (e.g. `"open /dev/sevenseg"`) and *details* is the
/// underlying I/O error.
#[derive(Debug)]
pub enum DeviceError {
    /// Reading the device failed. Fatal when it happens at startup.
    ReadFailed(String),
    /// Writing a frame failed. The caller keeps its in-memory state.
    WriteFailed(String),
    /// The device answered with something that doesn't decode.
    MalformedFrame(CodecError),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::ReadFailed(e) => write!(f, "Failed to read device: {e}"),
            DeviceError::WriteFailed(e) => write!(f, "Failed to write device: {e}"),
            DeviceError::MalformedFrame(e) => write!(f, "Device returned bad data: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::MalformedFrame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for DeviceError {
    fn from(e: CodecError) -> Self {
        DeviceError::MalformedFrame(e)
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Trait ──

pub trait DeviceChannel {
    /// Read the current segment state from the device.
    fn read(&self) -> Result<BitMask>;
    /// Write one frame to the device.
    fn write(&self, frame: &WireFrame) -> Result<()>;
    /// Human-readable location of the device (for logs and status output).
    fn describe(&self) -> String;
}

// ── Device file backend ──

/// One device transaction queued for the I/O worker.
type Job = Box<dyn FnOnce(&Path) + Send>;

/// Talks to the driver through its device file.
///
/// With a timeout set, transactions run on a dedicated worker thread in
/// submission order. A transaction that times out stays queued, so a later
/// frame can never reach the device ahead of an earlier one.
#[derive(Debug, Clone)]
pub struct FileChannel {
    path: PathBuf,
    timeout: Option<Duration>,
    /// Queue of the I/O worker; `None` while no timeout is set.
    io_tx: Option<mpsc::Sender<Job>>,
}

impl FileChannel {
    /// Channel without a transaction timeout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: None,
            io_tx: None,
        }
    }

    /// Bound each transaction to `timeout`. A zero duration disables the bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            self.timeout = None;
            self.io_tx = None;
        } else {
            self.timeout = Some(timeout);
            if self.io_tx.is_none() {
                self.io_tx = Some(Self::spawn_io_worker(self.path.clone()));
            }
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn read_raw(path: &Path) -> std::result::Result<Vec<u8>, String> {
        let file = File::open(path).map_err(|e| format!("open {}: {e}", path.display()))?;
        let mut raw = Vec::with_capacity(FRAME_LEN);
        file.take(FRAME_LEN as u64)
            .read_to_end(&mut raw)
            .map_err(|e| format!("read {}: {e}", path.display()))?;
        Ok(raw)
    }

    fn write_raw(path: &Path, bytes: &[u8]) -> std::result::Result<(), String> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| format!("open {}: {e}", path.display()))?;
        file.write_all(bytes)
            .map_err(|e| format!("write {}: {e}", path.display()))
    }

    /// Start the I/O worker. It runs queued jobs one at a time until every
    /// clone of the channel is dropped.
    fn spawn_io_worker(path: PathBuf) -> mpsc::Sender<Job> {
        let (tx, rx) = mpsc::channel::<Job>();
        std::thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                job(path.as_path());
            }
        });
        tx
    }

    /// Run `op` against the device path, through the I/O worker when a
    /// timeout is set.
    ///
    /// On timeout the caller gets an error but the job stays queued; a
    /// driver stuck in a blocking call can't be interrupted from here.
    fn run<T, F>(&self, op: F) -> std::result::Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> std::result::Result<T, String> + Send + 'static,
    {
        let (Some(timeout), Some(io_tx)) = (self.timeout, &self.io_tx) else {
            return op(self.path.as_path());
        };
        let (reply_tx, reply_rx) = mpsc::channel();
        io_tx
            .send(Box::new(move |path: &Path| {
                let _ = reply_tx.send(op(path));
            }))
            .map_err(|_| format!("{}: I/O worker exited", self.path.display()))?;
        match reply_rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(format!(
                "{}: timed out after {}ms",
                self.path.display(),
                timeout.as_millis()
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(format!("{}: I/O worker exited", self.path.display()))
            }
        }
    }
}

impl DeviceChannel for FileChannel {
    fn read(&self) -> Result<BitMask> {
        let raw = self.run(Self::read_raw).map_err(DeviceError::ReadFailed)?;
        log::debug!("read {} bytes from {}: {raw:?}", raw.len(), self.path.display());
        Ok(codec::decode(&raw)?)
    }

    fn write(&self, frame: &WireFrame) -> Result<()> {
        let bytes = frame.as_bytes().to_vec();
        self.run(move |p| Self::write_raw(p, &bytes))
            .map_err(DeviceError::WriteFailed)?;
        log::debug!("wrote {frame} to {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── Mock channel for testing ──

/// In-memory mock device for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory device that answers reads the way the driver does: seven
    /// characters followed by a NUL.
    ///
    /// Thread-safe so tests can hammer a shared `DisplayState`.
    pub struct MockChannel {
        /// Bytes handed back by the next `read`.
        pub raw: Mutex<Vec<u8>>,
        /// Recorded frames, in write order.
        pub writes: Mutex<Vec<WireFrame>>,
        /// If true, `read` returns `ReadFailed`.
        pub fail_read: AtomicBool,
        /// If true, `write` returns `WriteFailed` and records nothing.
        pub fail_write: AtomicBool,
    }

    impl Default for MockChannel {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockChannel {
        /// Mock device with every segment off.
        pub fn new() -> Self {
            Self::with_raw(b"0000000\0")
        }

        /// Mock device whose reads return `raw` until the next write.
        pub fn with_raw(raw: &[u8]) -> Self {
            MockChannel {
                raw: Mutex::new(raw.to_vec()),
                writes: Mutex::new(Vec::new()),
                fail_read: AtomicBool::new(false),
                fail_write: AtomicBool::new(false),
            }
        }

        /// Frames written so far, as strings.
        pub fn written(&self) -> Vec<String> {
            self.writes
                .lock()
                .unwrap()
                .iter()
                .map(|f| f.as_str().to_string())
                .collect()
        }

        pub fn set_fail_read(&self, fail: bool) {
            self.fail_read.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_write(&self, fail: bool) {
            self.fail_write.store(fail, Ordering::SeqCst);
        }
    }

    impl DeviceChannel for MockChannel {
        fn read(&self) -> Result<BitMask> {
            if self.fail_read.load(Ordering::SeqCst) {
                return Err(DeviceError::ReadFailed(
                    "mock: read failure injected".into(),
                ));
            }
            let raw = self.raw.lock().unwrap();
            let len = raw.len().min(FRAME_LEN);
            Ok(codec::decode(&raw[..len])?)
        }

        fn write(&self, frame: &WireFrame) -> Result<()> {
            if self.fail_write.load(Ordering::SeqCst) {
                return Err(DeviceError::WriteFailed(
                    "mock: write failure injected".into(),
                ));
            }
            // The driver latches the first seven characters.
            let mut latched = frame.as_bytes()[..usize::from(SEGMENT_COUNT)].to_vec();
            latched.push(0);
            *self.raw.lock().unwrap() = latched;
            self.writes.lock().unwrap().push(*frame);
            Ok(())
        }

        fn describe(&self) -> String {
            "mock://sevenseg".into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use mock::MockChannel;

    // ── Display ──

    #[test]
    fn display_read_failed() {
        let e = DeviceError::ReadFailed("open /dev/sevenseg: denied".into());
        assert_eq!(
            e.to_string(),
            "Failed to read device: open /dev/sevenseg: denied"
        );
    }

    #[test]
    fn display_write_failed() {
        let e = DeviceError::WriteFailed("write: EIO".into());
        assert_eq!(e.to_string(), "Failed to write device: write: EIO");
    }

    #[test]
    fn codec_error_converts_to_malformed() {
        let e: DeviceError = CodecError::MalformedFrame("x".into()).into();
        assert!(matches!(e, DeviceError::MalformedFrame(_)));
        assert!(std::error::Error::source(&e).is_some());
    }

    // ── FileChannel ──

    #[test]
    fn file_read_decodes_driver_answer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sevenseg");
        std::fs::write(&path, b"1100110\0").unwrap();

        let ch = FileChannel::new(&path);
        assert_eq!(ch.read().unwrap().bits(), 0b1100_1100);
    }

    #[test]
    fn file_read_takes_at_most_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sevenseg");
        std::fs::write(&path, b"10000000trailing junk").unwrap();

        let ch = FileChannel::new(&path);
        assert_eq!(ch.read().unwrap().bits(), 0b1000_0000);
    }

    #[test]
    fn file_read_missing_device_is_read_failed() {
        let dir = tempfile::tempdir().unwrap();
        let ch = FileChannel::new(dir.path().join("nope"));
        let err = ch.read().unwrap_err();
        assert!(matches!(err, DeviceError::ReadFailed(_)), "got: {err}");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn file_read_garbage_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sevenseg");
        std::fs::write(&path, b"hello").unwrap();

        let err = FileChannel::new(&path).read().unwrap_err();
        assert!(matches!(err, DeviceError::MalformedFrame(_)), "got: {err}");
    }

    #[test]
    fn file_write_sends_exact_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sevenseg");
        std::fs::write(&path, b"0000000\0").unwrap();

        let ch = FileChannel::new(&path);
        ch.write(&encode(BitMask::from_bits(0b1000_0000))).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"10000000");
    }

    #[test]
    fn file_write_does_not_create_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        let err = FileChannel::new(&path)
            .write(&encode(BitMask::EMPTY))
            .unwrap_err();
        assert!(matches!(err, DeviceError::WriteFailed(_)), "got: {err}");
        assert!(!path.exists());
    }

    #[test]
    fn file_channel_with_timeout_still_works() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sevenseg");
        std::fs::write(&path, b"0000000\0").unwrap();

        let ch = FileChannel::new(&path).with_timeout(Duration::from_secs(5));
        assert_eq!(ch.timeout(), Some(Duration::from_secs(5)));
        ch.write(&encode(BitMask::from_bits(0b0000_0010))).unwrap();
        assert_eq!(ch.read().unwrap().bits(), 0b0000_0010);
    }

    #[test]
    fn zero_timeout_disables_bound() {
        let ch = FileChannel::new("/dev/sevenseg").with_timeout(Duration::ZERO);
        assert_eq!(ch.timeout(), None);
    }

    #[test]
    fn timeout_reports_slow_transaction() {
        let ch = FileChannel::new("/dev/sevenseg").with_timeout(Duration::from_millis(10));
        let result: std::result::Result<(), String> = ch.run(|_| {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        });
        let err = result.unwrap_err();
        assert!(err.contains("timed out"), "got: {err}");
    }

    #[test]
    fn timed_out_transaction_still_runs_before_later_ones() {
        use std::sync::{Arc, Mutex};

        let order = Arc::new(Mutex::new(Vec::new()));
        let ch = FileChannel::new("/dev/sevenseg").with_timeout(Duration::from_millis(20));

        let first = Arc::clone(&order);
        let result: std::result::Result<(), String> = ch.run(move |_| {
            std::thread::sleep(Duration::from_millis(200));
            first.lock().unwrap().push("first");
            Ok(())
        });
        assert!(result.is_err());

        let ch = ch.with_timeout(Duration::from_secs(5));
        let second = Arc::clone(&order);
        ch.run(move |_| {
            second.lock().unwrap().push("second");
            Ok(())
        })
        .unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn clones_share_one_worker() {
        use std::sync::{Arc, Mutex};

        let order = Arc::new(Mutex::new(Vec::new()));
        let a = FileChannel::new("/dev/sevenseg").with_timeout(Duration::from_millis(20));
        let b = a.clone().with_timeout(Duration::from_secs(5));

        let slow = Arc::clone(&order);
        let _ = a.run(move |_| {
            std::thread::sleep(Duration::from_millis(200));
            slow.lock().unwrap().push("a");
            Ok(())
        });
        let fast = Arc::clone(&order);
        b.run(move |_| {
            fast.lock().unwrap().push("b");
            Ok(())
        })
        .unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn describe_is_path() {
        assert_eq!(FileChannel::new("/dev/sevenseg").describe(), "/dev/sevenseg");
    }

    // ── MockChannel ──

    #[test]
    fn mock_echoes_written_state_like_driver() {
        let ch = MockChannel::new();
        ch.write(&encode(BitMask::from_bits(0b1010_1010))).unwrap();
        assert_eq!(*ch.raw.lock().unwrap(), b"1010101\0");
        assert_eq!(ch.read().unwrap().bits(), 0b1010_1010);
        assert_eq!(ch.written(), vec!["10101010"]);
    }

    #[test]
    fn mock_failure_injection() {
        let ch = MockChannel::new();
        ch.set_fail_read(true);
        assert!(matches!(ch.read(), Err(DeviceError::ReadFailed(_))));
        ch.set_fail_write(true);
        assert!(matches!(
            ch.write(&encode(BitMask::EMPTY)),
            Err(DeviceError::WriteFailed(_))
        ));
        assert!(ch.written().is_empty());
    }
}
