use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub fn format_radius_line(design_radius: u32, repack_radius: f64) -> String {
    format!("Design shell: {design_radius}A      Repack shell: {repack_radius}A")
}

/// Appends the shell radii of one design attempt.
pub fn append_radii(path: &Path, design_radius: u32, repack_radius: f64) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", format_radius_line(design_radius, repack_radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_radii_print_without_decimals() {
        assert_eq!(
            format_radius_line(9, 13.0),
            "Design shell: 9A      Repack shell: 13A"
        );
        assert_eq!(
            format_radius_line(8, 10.5),
            "Design shell: 8A      Repack shell: 10.5A"
        );
    }

    #[test]
    fn append_adds_one_line_per_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radius.txt");
        append_radii(&path, 8, 12.0).unwrap();
        append_radii(&path, 12, 16.0).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("Repack shell: 16A\n"));
    }
}
