//! UTS-46 name processing.

use idna::AsciiDenyList;

use crate::EnsError;

/// Maps a user supplied name to its IDNA ASCII form with STD3 rules, folding case.
pub fn normalize(name: &str) -> Result<String, EnsError> {
    if name.is_empty() {
        return Ok(String::new());
    }

    idna::domain_to_ascii_cow(name.as_bytes(), AsciiDenyList::STD3)
        .map(|ascii| ascii.into_owned())
        .map_err(|_| EnsError::InvalidCharacters(name.to_string()))
}

/// Maps an IDNA ASCII name, as stored by reverse resolvers, back to Unicode.
pub fn decode(name: &str) -> Result<String, EnsError> {
    let (unicode, result) = idna::domain_to_unicode(name);
    result.map_err(|_| EnsError::InvalidCharacters(name.to_string()))?;
    Ok(unicode)
}
