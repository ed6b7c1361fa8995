//! Plain output helpers.

/// Minimal status printer. Kept dumb on purpose: spruce output is
/// short-lived and pipe-friendly, no live redraw.
#[derive(Debug, Default)]
pub struct Output;

impl Output {
    /// Create a printer.
    pub fn new() -> Self {
        Self
    }

    /// Informational line.
    pub fn info(&self, msg: &str) {
        println!("  {msg}");
    }

    /// Successful-outcome line.
    pub fn success(&self, msg: &str) {
        println!("✓ {msg}");
    }

    /// Warning line, to stderr.
    pub fn warn(&self, msg: &str) {
        eprintln!("! {msg}");
    }
}

/// Format a byte count using binary units, GNOME-style: whole bytes
/// unadorned, one decimal elsewhere.
pub fn human_size(n: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut f = n as f64;
    for (i, unit) in UNITS.iter().enumerate() {
        if f < 1024.0 || i == UNITS.len() - 1 {
            return if i == 0 {
                format!("{n}{unit}")
            } else {
                format!("{f:.1}{unit}")
            };
        }
        f /= 1024.0;
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(0), "0B");
        assert_eq!(human_size(512), "512B");
        assert_eq!(human_size(1024), "1.0KiB");
        assert_eq!(human_size(1536), "1.5KiB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0MiB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5.0GiB");
    }
}
