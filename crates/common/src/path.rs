pub use relative_path::*;

// Named types for better readability
pub type ProjectRelativePath = RelativePath;
pub type ProjectRelativePathBuf = RelativePathBuf;
pub type WorkspaceRelativePath = RelativePath;
pub type WorkspaceRelativePathBuf = RelativePathBuf;

#[inline]
pub fn is_root_level_source<T: AsRef<str>>(source: T) -> bool {
    let source = source.as_ref();
    source.is_empty() || source == "."
}

#[inline]
pub fn standardize_separators<T: AsRef<str>>(path: T) -> String {
    path.as_ref().replace('\\', "/")
}

/// Strip the final extension from a file path, leaving directories untouched.
/// `libs/a/index.ts` becomes `libs/a/index`, while `libs/a.b/file` is unchanged.
pub fn remove_ext<T: AsRef<str>>(file: T) -> String {
    let file = file.as_ref();
    let name_start = file.rfind('/').map(|i| i + 1).unwrap_or(0);

    match file[name_start..].rfind('.') {
        // Dotfiles like `.eslintrc` have no extension
        Some(0) | None => file.to_owned(),
        Some(dot) => file[..name_start + dot].to_owned(),
    }
}

/// Return the extension of a file path, including the leading dot,
/// or an empty string when there is none.
pub fn extension_of<T: AsRef<str>>(file: T) -> String {
    let file = file.as_ref();

    if file.len() == remove_ext(file).len() {
        String::new()
    } else {
        file[remove_ext(file).len()..].to_owned()
    }
}

/// Return true if the file is located at or below the provided directory.
/// Both paths must be workspace relative and use forward slashes.
pub fn is_within_dir<F: AsRef<str>, D: AsRef<str>>(file: F, dir: D) -> bool {
    let file = file.as_ref();
    let dir = dir.as_ref().trim_end_matches('/');

    if is_root_level_source(dir) {
        return true;
    }

    file == dir
        || file
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}
