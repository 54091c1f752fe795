/// Encode `data` as a 0x-prefixed hex string.
pub fn hex_encode<T: AsRef<[u8]>>(data: T) -> String {
    let mut s = "0x".to_string();
    s.push_str(&hex::encode(data));
    s
}

/// Decode an optionally 0x-prefixed hex string. An empty string (or a bare `0x`) decodes to no
/// bytes.
pub fn hex_decode(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits)
}
