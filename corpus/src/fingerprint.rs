use crate::loader::CorpusError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// SHA-256 digest over the three source files, in a fixed order, used to
/// key cached blobs against the data they were built from. The digest is
/// only *checked* when fingerprint verification is enabled; the default
/// cache policy trusts whatever is on disk.
pub fn source_fingerprint(
    article_map: &Path,
    category_map: &Path,
    edge_list: &Path,
) -> Result<String, CorpusError> {
    let mut hasher = Sha256::new();
    for path in [article_map, category_map, edge_list] {
        hash_file(&mut hasher, path)?;
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<(), CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let len = file.metadata().map_err(io_err)?.len();
    // Length prefix keeps file boundaries unambiguous in the rolling hash.
    hasher.update(len.to_le_bytes());

    let mut buf = [0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf).map_err(io_err)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn fingerprint_changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let c = dir.path().join("c.txt");
        fs::write(&a, "1 A\n").unwrap();
        fs::write(&b, "Category:X;1\n").unwrap();
        fs::write(&c, "1 2\n").unwrap();

        let before = source_fingerprint(&a, &b, &c).unwrap();
        let again = source_fingerprint(&a, &b, &c).unwrap();
        assert_eq!(before, again);

        fs::write(&c, "1 2\n2 3\n").unwrap();
        let after = source_fingerprint(&a, &b, &c).unwrap();
        assert_ne!(before, after);
    }
}
