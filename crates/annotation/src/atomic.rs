use crate::error::{AnnotationError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Write `contents` into a sibling `<name>.tmp` file, then rename it over `path`.
///
/// An existing file keeps its permissions. On failure the temp file is removed
/// and `path` is left as it was.
pub fn write_atomically(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        AnnotationError::file_access(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let write = || -> io::Result<()> {
        let mut file = io::BufWriter::new(fs::File::create(&tmp)?);
        file.write_all(contents.as_ref())?;
        file.flush()?;
        drop(file);

        match fs::metadata(path) {
            Ok(meta) => fs::set_permissions(&tmp, meta.permissions())?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
        fs::rename(&tmp, path)
    };

    write().map_err(|err| {
        let _ = fs::remove_file(&tmp);
        AnnotationError::file_access(path, err)
    })
}
