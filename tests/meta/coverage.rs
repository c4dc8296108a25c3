//! Keeps `tests/unit` in lockstep with `src`

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    // Entry points and module declaration files carry no logic of their own
    fn is_structural(relative: &str) -> bool {
        relative == "main.rs" || relative == "lib.rs" || relative.ends_with("mod.rs")
    }

    fn rust_files(dir: &Path, base: &Path, found: &mut BTreeSet<String>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                rust_files(&path, base, found)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                let relative = path
                    .strip_prefix(base)
                    .map_err(|error| io::Error::other(error.to_string()))?;
                found.insert(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }

    fn relative_sources(root: &str) -> BTreeSet<String> {
        let base = Path::new(root);
        let mut found = BTreeSet::new();
        if let Err(error) = rust_files(base, base, &mut found) {
            assert!(!base.exists(), "Failed to scan {root}: {error}");
        }
        found
    }

    #[test]
    fn test_every_source_file_has_unit_tests() {
        let sources = relative_sources("src");
        let tests = relative_sources("tests/unit");

        let missing: Vec<_> = sources
            .iter()
            .filter(|path| !is_structural(path) && !tests.contains(*path))
            .map(|path| format!("  - src/{path} -> tests/unit/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without unit test counterparts:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_every_unit_test_has_a_source_file() {
        let sources = relative_sources("src");
        let tests = relative_sources("tests/unit");

        let orphaned: Vec<_> = tests
            .iter()
            .filter(|path| !is_structural(path) && !sources.contains(*path))
            .map(|path| format!("  - tests/unit/{path} (no src/{path})"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files without a source counterpart:\n{}",
            orphaned.join("\n")
        );
    }

    #[test]
    fn test_every_test_file_contains_tests() {
        let empty: Vec<_> = relative_sources("tests")
            .into_iter()
            .filter(|path| {
                let name = path.rsplit('/').next().unwrap_or(path.as_str());
                name != "main.rs" && name != "mod.rs"
            })
            .filter(|path| {
                fs::read_to_string(Path::new("tests").join(path))
                    .map(|content| !content.contains("#[test]"))
                    .unwrap_or(true)
            })
            .map(|path| format!("  - tests/{path}"))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without any #[test] function:\n{}",
            empty.join("\n")
        );
    }
}
