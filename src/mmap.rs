use std::fs::{File, OpenOptions as FileOptions};
use std::os::unix::fs::FileExt;
use std::path::Path;

use memmap::{Mmap, MmapMut, MmapOptions};

use crate::errors::ResultExt;
use crate::Error;

pub fn read<P>(path: P) -> Result<(File, usize, Mmap), Error>
where
    P: AsRef<Path>,
{
    let file = File::open(&path).io_err(&path)?;
    let len = file.metadata().io_err(&path)?.len() as usize;
    let mut opts = MmapOptions::new();
    opts.len(len);

    let mmap = unsafe { opts.map(&file) };
    let mmap = mmap.io_err(&path)?;

    Ok((file, len, mmap))
}

pub fn write<P>(path: P, len: usize) -> Result<(File, MmapMut), Error>
where
    P: AsRef<Path>,
{
    let mut opts = FileOptions::new();
    let file = opts
        .create(true)
        .truncate(true)
        .read(true)
        .write(true)
        .open(&path)
        .io_err(&path)?;

    // Allocate space in the file first
    file.write_at(&[0], (len - 1) as u64).io_err(&path)?;

    let mut opts = MmapOptions::new();
    opts.len(len);

    let mmap = unsafe { opts.map_mut(&file) };
    let mmap = mmap.io_err(&path)?;

    Ok((file, mmap))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::io::Write;

    use crate::testing;

    #[test]
    fn read_round_trip() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join("data.bin");
        fs::write(&path, b"backup bytes").unwrap();

        let (_file, len, map) = read(&path).unwrap();

        assert_eq!(len, 12);
        assert_eq!(&map[..], b"backup bytes");
    }

    #[test]
    fn write_allocates_len() {
        let dir = testing::temp_dir();
        let path = dir.as_ref().join("out.bin");

        {
            let (_file, mut map) = write(&path, 4).unwrap();
            (&mut map[..]).write_all(b"abcd").unwrap();
            map.flush().unwrap();
        }

        assert_eq!(fs::read(&path).unwrap(), b"abcd");
    }
}
