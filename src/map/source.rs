use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use crate::map::address::BlockAddress;

/// Read buffer for block files on slow removable storage
const READ_BUFFER: usize = 2000;

/// Opens a byte stream for a block. A missing block must surface as
/// `io::ErrorKind::NotFound`.
pub trait BlockSource {
    fn open(&self, address: &BlockAddress) -> io::Result<Box<dyn BufRead + '_>>;
}

impl<S: BlockSource + ?Sized> BlockSource for Box<S> {
    fn open(&self, address: &BlockAddress) -> io::Result<Box<dyn BufRead + '_>> {
        (**self).open(address)
    }
}

/// Block files under `<root>/<folder>/<x>_<y>.<ext>`
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    extension: String,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, address: &BlockAddress) -> PathBuf {
        let mut path = self.root.join(address.folder_name()).join(address.file_stem());
        if !self.extension.is_empty() {
            path.set_extension(&self.extension);
        }
        path
    }
}

impl BlockSource for DirSource {
    fn open(&self, address: &BlockAddress) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(self.path_for(address))?;
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, file)))
    }
}

/// Blocks held in memory, keyed by [`BlockAddress::key`]
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    blocks: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.blocks.insert(key.into(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockSource for MemorySource {
    fn open(&self, address: &BlockAddress) -> io::Result<Box<dyn BufRead + '_>> {
        match self.blocks.get(&address.key()) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, address.key())),
        }
    }
}
