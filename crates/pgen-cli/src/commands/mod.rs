pub mod compile;
pub mod optimize;
pub mod parse;

/// Reads a file to a string, exiting the process with an `error:`-prefixed
/// message on failure — the style `plotnik-cli`'s commands use for every
/// fallible step rather than propagating a `Result` out of `main`.
pub(crate) fn read_to_string_or_exit(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: could not read {}: {}", path.display(), e);
        std::process::exit(1);
    })
}
