use crate::error::{Error, Result};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

pub fn expect_ext(path: &Path, ext: &'static str) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(e) if e == ext => Ok(()),
        _ => Err(Error::WrongExtension(path.display().to_string(), ext)),
    }
}

pub fn with_ext(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let name = path.display().to_string();
    let mut file = File::open(path).map_err(|e| Error::FileOpen(name.clone(), e))?;
    let mut buf = vec![];
    file.read_to_end(&mut buf).map_err(|e| Error::FileRead(name, e))?;
    Ok(buf)
}

/// Create `path` and write `bytes` to it. Only called once the whole output
/// is known to be valid.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let name = path.display().to_string();
    let mut file = File::create(path).map_err(|e| Error::FileCreate(name.clone(), e))?;
    file.write_all(bytes).and_then(|_| file.flush()).map_err(|e| Error::FileWrite(name, e))
}
