use glob::Pattern;
use std::path::Path;

/// Checks if a file carries one of the allowed source extensions.
///
/// The match is a case-sensitive suffix check on the file name:
/// `shell.php` passes for `php`, `shell.PHP` does not, and a bare
/// `.php` dotfile passes.
pub fn has_source_extension(path: &Path, extensions: &[String]) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => extensions.iter().any(|ext| name.ends_with(&format!(".{ext}"))),
        None => false,
    }
}

/// Checks if a file should be skipped based on ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();

    ignore_patterns.iter().any(|pattern| {
        if let Ok(p) = Pattern::new(pattern) {
            let normalized_path = path_str.replace('\\', "/");
            p.matches(&normalized_path)
        } else {
            false
        }
    })
}

/// Determines if a file is eligible for scanning
pub fn should_include_file(path: &Path, extensions: &[String], ignore_patterns: &[String]) -> bool {
    has_source_extension(path, extensions) && !should_ignore(path, ignore_patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_exts() -> Vec<String> {
        vec!["php".to_string(), "jsp".to_string(), "java".to_string()]
    }

    #[test]
    fn test_has_source_extension() {
        let exts = default_exts();
        assert!(has_source_extension(Path::new("shell.php"), &exts));
        assert!(has_source_extension(Path::new("cmd.jsp"), &exts));
        assert!(has_source_extension(Path::new("Backdoor.java"), &exts));

        // Suffix match is case-sensitive
        assert!(!has_source_extension(Path::new("shell.PHP"), &exts));
        assert!(!has_source_extension(Path::new("shell.Php"), &exts));

        assert!(!has_source_extension(Path::new("notes.txt"), &exts));
        assert!(!has_source_extension(Path::new("php"), &exts)); // No extension
        assert!(!has_source_extension(Path::new("archive.php.bak"), &exts));

        // A dotfile literally named ".php" is still a .php suffix
        assert!(has_source_extension(Path::new(".php"), &exts));
        assert!(has_source_extension(Path::new("uploads/.php"), &exts));
    }

    #[test]
    fn test_should_ignore() {
        let ignore_patterns = vec![
            "**/vendor/**".to_string(),
            "**/*.min.php".to_string(),
            "uploads/tmp_*".to_string(),
        ];

        assert!(should_ignore(
            Path::new("site/vendor/lib/helper.php"),
            &ignore_patterns
        ));
        assert!(should_ignore(
            Path::new("assets/app.min.php"),
            &ignore_patterns
        ));
        assert!(should_ignore(
            Path::new("uploads/tmp_a.php"),
            &ignore_patterns
        ));

        assert!(!should_ignore(Path::new("site/index.php"), &ignore_patterns));
        assert!(!should_ignore(
            Path::new("uploads/avatar.php"),
            &ignore_patterns
        ));
    }

    #[test]
    fn test_should_include_file() {
        let exts = default_exts();
        let ignore_patterns = vec!["**/vendor/**".to_string()];

        assert!(should_include_file(
            Path::new("www/upload.php"),
            &exts,
            &ignore_patterns
        ));

        // Wrong extension
        assert!(!should_include_file(
            Path::new("www/upload.py"),
            &exts,
            &ignore_patterns
        ));

        // Matches ignore pattern
        assert!(!should_include_file(
            Path::new("www/vendor/a.php"),
            &exts,
            &ignore_patterns
        ));
    }
}
