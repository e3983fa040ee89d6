//! Golden reference acquisition.

use std::io::{self, BufReader, Read};
use std::path::Path;

use fs_err as fs;

/// Bytes of a golden reference, read forward once.
///
/// A golden file that does not exist yet is an empty reference: the first
/// silver byte written against it diverges.
#[derive(Debug)]
pub enum GoldenSource {
    File(BufReader<fs::File>),
    Empty,
}

impl GoldenSource {
    /// Open the golden file at `path`, or an empty source if it is absent.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        match fs::File::open(path) {
            Ok(file) => {
                log::debug!("Reading golden reference from {}", path.display());
                Ok(GoldenSource::File(BufReader::new(file)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No golden file at {}, comparing against empty", path.display());
                Ok(GoldenSource::Empty)
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_empty_source(&self) -> bool {
        matches!(self, GoldenSource::Empty)
    }
}

impl Read for GoldenSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            GoldenSource::File(reader) => reader.read(buf),
            GoldenSource::Empty => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = GoldenSource::open(tmp.path().join("absent.golden")).unwrap();
        assert!(source.is_empty_source());

        let mut buf = Vec::new();
        source.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn existing_file_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.golden");
        fs::write(&path, b"recorded\n").unwrap();

        let mut source = GoldenSource::open(&path).unwrap();
        assert!(!source.is_empty_source());

        let mut buf = String::new();
        source.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "recorded\n");
    }

    #[test]
    fn directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        // Opening a directory succeeds on some platforms but reading fails.
        let result = GoldenSource::open(tmp.path()).and_then(|mut s| {
            let mut buf = Vec::new();
            s.read_to_end(&mut buf)
        });
        assert!(result.is_err());
    }
}
