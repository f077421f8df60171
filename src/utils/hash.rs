use hex;
use sha2::{Digest, Sha256};
use std::path::Path;

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub async fn sha256_hex_from_reader<R: tokio::io::AsyncRead + Unpin>(
    mut reader: R,
) -> anyhow::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = tokio::io::AsyncReadExt::read(&mut reader, &mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Streaming hex SHA-256 of a file's bytes. This is the canonical bundle
/// fingerprint; the same encoding is stamped into object metadata on upload.
pub async fn sha256_hex_of_file(path: &Path) -> anyhow::Result<String> {
    let file = tokio::fs::File::open(path).await?;
    sha256_hex_from_reader(file).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex(b"hello world");
        // SHA-256 for "hello world"
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_hex_empty() {
        let hash = sha256_hex(b"");
        // SHA-256 for empty input
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_sha256_hex_from_reader() {
        let data = b"hello world";
        let hash = sha256_hex_from_reader(&data[..]).await.unwrap();
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_file_digest_matches_buffer_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let hash = sha256_hex_of_file(file.path()).await.unwrap();
        assert_eq!(hash, sha256_hex(b"hello world"));
    }
}
