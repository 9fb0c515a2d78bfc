//! Path helpers for locating files referenced relative to another asset.

/// Directory prefix of `path`, up to and including its last separator.
/// Empty when `path` has no directory component.
pub fn directory_of(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Locate `name` next to the file at `base`.
pub fn resolve_sibling(base: &str, name: &str) -> String {
    format!("{}{}", directory_of(base), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_keeps_trailing_separator() {
        assert_eq!(directory_of("assets/models/x.obj"), "assets/models/");
        assert_eq!(directory_of("/x.obj"), "/");
        assert_eq!(directory_of("x.obj"), "");
        assert_eq!(directory_of(r"assets\x.obj"), r"assets\");
    }

    #[test]
    fn sibling_is_relative_to_base_directory() {
        assert_eq!(resolve_sibling("assets/x.obj", "x.mtl"), "assets/x.mtl");
        assert_eq!(resolve_sibling("x.obj", "x.mtl"), "x.mtl");
    }
}
