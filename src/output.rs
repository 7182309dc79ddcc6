//! Plain-text listing of the festival hierarchy
//!
//! One line per record label, bands indented by five spaces and festivals by
//! ten, in hierarchy order.

use std::fs;
use std::io;
use std::path::Path;

use crate::data::Hierarchy;

/// Indentation added per nesting level
const LEADING_SPACES: &str = "     ";

/// Default file the listing is written to
pub const DEFAULT_OUTPUT_FILE: &str = "RestructuredFestivalData.txt";

/// Renders the hierarchy as indented lines
pub fn render_lines(hierarchy: &Hierarchy) -> Vec<String> {
    let mut lines = Vec::new();

    for label in hierarchy {
        lines.push(label.name.clone());
        for band in label.bands.values() {
            lines.push(format!("{LEADING_SPACES}{}", band.name));
            for festival in band.festivals.values() {
                lines.push(format!("{LEADING_SPACES}{LEADING_SPACES}{}", festival.name));
            }
        }
    }

    lines
}

/// Writes the rendered hierarchy to `path`, one newline-terminated line each
pub fn write_hierarchy(path: &Path, hierarchy: &Hierarchy) -> io::Result<()> {
    let mut content = String::new();
    for line in render_lines(hierarchy) {
        content.push_str(&line);
        content.push('\n');
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_festivals;
    use crate::restructure::restructure;
    use tempfile::TempDir;

    const FIXTURE: &str = include_str!("../tests/fixtures/festivals.json");
    const EXPECTED: &str = include_str!("../tests/fixtures/expected_output.txt");

    fn fixture_hierarchy() -> Hierarchy {
        restructure(&parse_festivals(FIXTURE).unwrap())
    }

    #[test]
    fn test_render_lines_indentation() {
        let lines = render_lines(&fixture_hierarchy());

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "     Squint-281");
        assert_eq!(lines[2], "          Twisted Tour");
        assert!(lines.contains(&"Fourth Woman Records".to_string()));
    }

    #[test]
    fn test_render_lines_matches_expected_listing() {
        let lines = render_lines(&fixture_hierarchy());
        let expected: Vec<&str> = EXPECTED.lines().collect();

        assert_eq!(lines, expected);
    }

    #[test]
    fn test_render_empty_hierarchy() {
        assert!(render_lines(&Hierarchy::default()).is_empty());
    }

    #[test]
    fn test_write_hierarchy_creates_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DEFAULT_OUTPUT_FILE);

        write_hierarchy(&path, &fixture_hierarchy()).expect("Write should succeed");

        let content = fs::read_to_string(&path).expect("Should read file");
        assert_eq!(content, EXPECTED);
    }

    #[test]
    fn test_write_hierarchy_overwrites_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("listing.txt");
        fs::write(&path, "stale listing\n").unwrap();

        write_hierarchy(&path, &Hierarchy::default()).expect("Write should succeed");

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
