//! Archive handles: zip, gzip or plain delimited tables

use super::error::{ScanError, ScanResult};
use super::scanner::BatchScanner;
use super::schema::SchemaAliases;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// How the table bytes are stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A zip container holding the table as one member
    Zip,
    /// A gzip stream of the table
    Gzip,
    /// An uncompressed table
    Plain,
}

impl ArchiveFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match extension(path).as_deref() {
            Some("zip") => Self::Zip,
            Some("gz") => Self::Gzip,
            _ => Self::Plain,
        }
    }
}

enum Container {
    Zip {
        archive: ZipArchive<BufReader<File>>,
        index: usize,
    },
    Gzip,
    Plain,
}

/// An opened table archive.
///
/// Opening validates the file and selects the table member; every call to
/// [`Archive::scan`] then decodes the member from the start. A scanner
/// borrows the archive, so passes over one archive are sequential.
pub struct Archive {
    path: PathBuf,
    member: String,
    delimiter: u8,
    container: Container,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("member", &self.member)
            .field("delimiter", &(self.delimiter as char))
            .finish()
    }
}

impl Archive {
    /// Open an archive, selecting the table member.
    ///
    /// For zip archives `member` names the entry to read (full name or file
    /// name). Without it, the first `.tsv` entry outside `__MACOSX/` is
    /// used, then the first file entry. `member` is ignored for gzip and
    /// plain files.
    pub fn open(path: impl AsRef<Path>, member: Option<&str>) -> ScanResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ScanError::MissingInput(path));
        }

        let (container, member) = match ArchiveFormat::from_path(&path) {
            ArchiveFormat::Zip => {
                let file = File::open(&path).map_err(|e| ScanError::io(&path, e))?;
                let archive = ZipArchive::new(BufReader::new(file))?;
                let (index, name) = select_member(&path, &archive, member)?;
                (Container::Zip { archive, index }, name)
            }
            ArchiveFormat::Gzip => {
                let name = file_name(&path);
                let inner = name.strip_suffix(".gz").unwrap_or(&name).to_string();
                (Container::Gzip, inner)
            }
            ArchiveFormat::Plain => (Container::Plain, file_name(&path)),
        };

        let delimiter = if member.to_ascii_lowercase().ends_with(".csv") {
            b','
        } else {
            b'\t'
        };

        debug!(path = %path.display(), member = %member, "opened archive");
        Ok(Self {
            path,
            member,
            delimiter,
            container,
        })
    }

    /// Override the field delimiter inferred from the member name
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the table member being read
    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Open a fresh decompressed byte stream of the table member
    pub fn open_stream(&mut self) -> ScanResult<Box<dyn Read + '_>> {
        match &mut self.container {
            Container::Zip { archive, index } => {
                let entry = archive.by_index(*index)?;
                Ok(Box::new(entry))
            }
            Container::Gzip => {
                let file = File::open(&self.path).map_err(|e| ScanError::io(&self.path, e))?;
                Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
            }
            Container::Plain => {
                let file = File::open(&self.path).map_err(|e| ScanError::io(&self.path, e))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    /// Start a batched scan exposing only `fields`.
    ///
    /// The header is read and every field resolved before this returns, so a
    /// missing column fails here rather than mid-pass.
    pub fn scan(
        &mut self,
        fields: &[&str],
        aliases: &SchemaAliases,
        batch_size: usize,
    ) -> ScanResult<BatchScanner<'_>> {
        if batch_size == 0 {
            return Err(ScanError::InvalidBatchSize);
        }
        let delimiter = self.delimiter;
        let stream = self.open_stream()?;
        BatchScanner::new(stream, delimiter, fields, aliases, batch_size)
    }

    /// Normalized header names of the table
    pub fn headers(&mut self) -> ScanResult<Vec<String>> {
        let delimiter = self.delimiter;
        let stream = self.open_stream()?;
        BatchScanner::read_header(stream, delimiter)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn select_member(
    path: &Path,
    archive: &ZipArchive<BufReader<File>>,
    requested: Option<&str>,
) -> ScanResult<(usize, String)> {
    // Names come from the central directory; only the chosen entry is opened
    let entries: Vec<(usize, String)> = (0..archive.len())
        .filter_map(|i| archive.name_for_index(i).map(|name| (i, name.to_string())))
        .filter(|(_, name)| !name.ends_with('/'))
        .collect();

    let found = match requested {
        Some(wanted) => entries
            .iter()
            .find(|(_, name)| name == wanted || name.rsplit('/').next() == Some(wanted))
            .cloned(),
        None => {
            let usable: Vec<&(usize, String)> = entries
                .iter()
                .filter(|(_, name)| !name.starts_with("__MACOSX"))
                .collect();
            usable
                .iter()
                .find(|(_, name)| name.to_ascii_lowercase().ends_with(".tsv"))
                .or_else(|| usable.first())
                .map(|e| (*e).clone())
        }
    };

    found.ok_or_else(|| ScanError::NoTableMember {
        archive: path.to_path_buf(),
        detail: match requested {
            Some(wanted) => format!(
                "member '{}' not found among {:?}",
                wanted,
                entries.iter().map(|(_, n)| n.as_str()).collect::<Vec<_>>()
            ),
            None => "archive holds no file entries".to_string(),
        },
    })
}
