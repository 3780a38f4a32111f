use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{info, trace};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("block does not match the disk block size")]
    IncorrectBlockSize,
    #[error("block number past the end of the disk")]
    OverCapacity,
    #[error("disk I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for DiskError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DiskError::IncorrectBlockSize, DiskError::IncorrectBlockSize) => true,
            (DiskError::OverCapacity, DiskError::OverCapacity) => true,
            (DiskError::Io(a), DiskError::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

/// A file of fixed-size blocks, owned by a single `Disk` for its lifetime.
#[derive(Debug)]
pub struct Disk<const BLOCKSIZE: usize> {
    path: PathBuf,
    blocks: usize,
    file: File,
}

pub fn make_name(name: &str) -> PathBuf {
    let name = name.replace("-", "_");
    let mut disk_name = String::from("SWAP_IMAGE_");
    disk_name.push_str(&name);
    std::env::temp_dir().join(disk_name)
}

impl<const BLOCKSIZE: usize> Disk<BLOCKSIZE> {
    /// Creates the image for `name` with room for `blocks` blocks. Fails
    /// with `AlreadyExists` if an image of that name is already on disk, so
    /// two disks never share a file.
    pub fn create(name: &str, blocks: usize) -> Result<Self, std::io::Error> {
        assert!(BLOCKSIZE > 0, "Block size must be non-zero");
        let path = make_name(name);
        let file = File::options()
            .write(true)
            .read(true)
            .create_new(true)
            .open(&path)?;
        file.set_len((blocks * BLOCKSIZE) as u64)?;
        info!("Created disk {} with {} blocks", path.display(), blocks);
        Ok(Self { path, blocks, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seek_block(&mut self, block_number: usize) -> Result<(), DiskError> {
        if block_number >= self.blocks {
            return Err(DiskError::OverCapacity);
        }
        self.file
            .seek(SeekFrom::Start((block_number * BLOCKSIZE) as u64))?;
        Ok(())
    }

    pub fn read_block(&mut self, block_number: usize, buf: &mut [u8]) -> Result<(), DiskError> {
        if buf.len() != BLOCKSIZE {
            return Err(DiskError::IncorrectBlockSize);
        }
        self.seek_block(block_number)?;
        trace!("Reading block[{}]", block_number);
        self.file.read_exact(buf)?;
        Ok(())
    }

    pub fn write_block(&mut self, block_number: usize, block: &[u8]) -> Result<(), DiskError> {
        if block.len() != BLOCKSIZE {
            return Err(DiskError::IncorrectBlockSize);
        }
        self.seek_block(block_number)?;
        trace!("Writing block[{}]", block_number);
        self.file.write_all(block)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs::remove_file;

    #[test]
    fn test_create() {
        let disk = Disk::<16>::create("disk_test_create", 4).unwrap();
        assert_eq!(std::fs::metadata(disk.path()).unwrap().len(), 4 * 16);
        remove_file(make_name("disk_test_create")).unwrap();
    }

    #[test]
    fn test_create_existing_image() {
        let mut first = Disk::<16>::create("disk_test_create_existing", 2).unwrap();
        first.write_block(1, &[7; 16]).unwrap();

        let err = Disk::<16>::create("disk_test_create_existing", 2).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);

        let mut block = [0; 16];
        first.read_block(1, &mut block).unwrap();
        assert_eq!(block, [7; 16]);
        remove_file(make_name("disk_test_create_existing")).unwrap();
    }

    #[test]
    fn test_read_write() {
        let mut disk = Disk::<16>::create("disk_test_read_write", 4).unwrap();
        let mut block = [0; 16];
        block[0] = 1;
        block[15] = 0xff;
        disk.write_block(2, &block).unwrap();
        let mut read = [0; 16];
        disk.read_block(2, &mut read).unwrap();
        assert_eq!(read, block);
        disk.read_block(1, &mut read).unwrap();
        assert_eq!(read, [0; 16]);
        remove_file(make_name("disk_test_read_write")).unwrap();
    }

    #[test]
    fn test_read_write_over_capacity() {
        let mut disk = Disk::<16>::create("disk_test_over_capacity", 2).unwrap();
        let mut block = [0; 16];
        assert_eq!(disk.write_block(2, &block), Err(DiskError::OverCapacity));
        assert_eq!(disk.read_block(2, &mut block), Err(DiskError::OverCapacity));
        remove_file(make_name("disk_test_over_capacity")).unwrap();
    }

    #[test]
    fn test_read_write_incorrect_block_size() {
        let mut disk = Disk::<16>::create("disk_test_incorrect_block_size", 2).unwrap();
        let block = [1; 8];
        assert_eq!(
            disk.write_block(0, &block),
            Err(DiskError::IncorrectBlockSize)
        );
        let mut big = [0; 32];
        assert_eq!(
            disk.read_block(0, &mut big),
            Err(DiskError::IncorrectBlockSize)
        );
        remove_file(make_name("disk_test_incorrect_block_size")).unwrap();
    }
}
