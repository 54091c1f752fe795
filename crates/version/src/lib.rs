use git_version::git_version;
use target_info::Target;

lazy_static::lazy_static! {
    /// [VERSION] without the client name, e.g. `v0.0.1-67da032+`.
    pub static ref SHORT_VERSION: String = VERSION.replace("SafeSigner/", "");
}

/// The client name and version of this build.
///
/// A plus-sign (`+`) is appended to the git commit if the tree is dirty.
/// Commit hash is omitted if the sources don't include git information.
///
/// ## Example
///
/// `SafeSigner/v0.0.1-67da032+`
pub const VERSION: &str = git_version!(
    args = [
        "--always",
        "--dirty=+",
        "--abbrev=7",
        // NOTE: using --match instead of --exclude for compatibility with old Git
        "--match=thiswillnevermatchlol"
    ],
    prefix = concat!("SafeSigner/v", env!("CARGO_PKG_VERSION"), "-"),
    fallback = concat!("SafeSigner/v", env!("CARGO_PKG_VERSION"))
);

/// The first eight characters of the latest commit hash, sent as part of the user agent to the
/// client gateway.
pub const COMMIT_PREFIX: &str = git_version!(
    args = ["--always", "--abbrev=8", "--match=thiswillnevermatchlol"],
    prefix = "",
    suffix = "",
    cargo_prefix = "",
    cargo_suffix = "",
    fallback = "00000000"
);

/// [VERSION] with platform information appended.
///
/// ## Example
///
/// `SafeSigner/v0.0.1-67da032+/x86_64-linux`
pub fn version_with_platform() -> String {
    format!("{}/{}-{}", VERSION, Target::arch(), Target::os())
}
