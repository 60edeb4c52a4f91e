use md5::{Digest, Md5};

/// Uppercase hex MD5 digest of a UTF-8 string. Always 32 characters,
/// the shape of every rewritten object id.
pub fn md5_hex(input: &str) -> String {
    let digest = Md5::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(md5_hex(""), "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(md5_hex("abc"), "900150983CD24FB0D6963F7D28E17F72");
    }

    #[test]
    fn test_shape() {
        let digest = md5_hex("Demo.xcodeproj");
        assert_eq!(digest.len(), 32);
        assert!(digest.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(md5_hex("same input"), md5_hex("same input"));
        assert_ne!(md5_hex("a"), md5_hex("b"));
    }
}
