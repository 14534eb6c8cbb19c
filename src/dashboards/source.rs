//! Read access to dashboard files bundled with plugins.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// An open dashboard file. `close` releases the handle and reports any
/// failure doing so.
pub trait DashboardReader: Read + Send {
    fn close(self: Box<Self>) -> io::Result<()>;
}

pub trait DashboardSource: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<Box<dyn DashboardReader>>;
}

/// Reads dashboards from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDashboardSource;

impl DashboardSource for LocalDashboardSource {
    fn open(&self, path: &Path) -> io::Result<Box<dyn DashboardReader>> {
        let file = File::open(path)?;
        Ok(Box::new(LocalFile {
            reader: BufReader::new(file),
        }))
    }
}

struct LocalFile {
    reader: BufReader<File>,
}

impl Read for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl DashboardReader for LocalFile {
    fn close(self: Box<Self>) -> io::Result<()> {
        // std::fs::File does not surface close(2) errors
        drop(self.reader);
        Ok(())
    }
}
