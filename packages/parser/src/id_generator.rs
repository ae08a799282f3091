use crc32fast::Hasher;

/// Stable module identifier derived from its path using CRC32
pub fn get_module_id(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_generation() {
        let id1 = get_module_id("/vite.config.ts");
        let id2 = get_module_id("/vite.config.ts");

        // Same path always generates same ID
        assert_eq!(id1, id2);

        // Different paths generate different IDs
        let id3 = get_module_id("/nuxt.config.ts");
        assert_ne!(id1, id3);

        // A file:// prefix does not change the identity
        assert_eq!(id1, get_module_id("file:///vite.config.ts"));
    }
}
