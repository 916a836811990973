//! Interactive BOM page
//!
//! The viewer serves an exported interactive BOM with two changes:
//! - the BOM's own click logging is patched to print the package too, so the
//!   footprint can be scraped from the console
//! - the serial bridge overlay is injected before `</body>`

mod patch;

pub use patch::{inject_bridge, patch_console_log, render_bridge, PatchOutcome};

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Reasons the BOM page cannot be produced
#[derive(Debug)]
pub enum BomLoadError {
    NotFound,
    Io(std::io::Error),
}

/// Read the BOM file; invalid UTF-8 is replaced rather than rejected
pub async fn read_bom(path: &Path) -> Result<String, BomLoadError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(BomLoadError::NotFound),
        Err(e) => Err(BomLoadError::Io(e)),
    }
}

/// Build the page served to the browser
///
/// Returns the page and the patch outcome so the caller can report it.
pub fn render_page(html: &str, patch_enabled: bool, bridge: &str) -> (String, PatchOutcome) {
    let (patched, outcome) = if patch_enabled {
        patch_console_log(html)
    } else {
        (html.to_string(), PatchOutcome::Disabled)
    };
    (inject_bridge(&patched, bridge), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_missing_bom() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_bom(&dir.path().join("InteractiveBOM.html")).await;
        assert!(matches!(result, Err(BomLoadError::NotFound)));
    }

    #[tokio::test]
    async fn test_read_bom_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.html");
        std::fs::write(&path, b"<html>\xff</html>").unwrap();
        let html = read_bom(&path).await.unwrap();
        assert!(html.starts_with("<html>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_render_page_without_patch() {
        let (page, outcome) = render_page("<body></body>", false, "<p>bridge</p>");
        assert_eq!(outcome, PatchOutcome::Disabled);
        assert_eq!(page, "<body><p>bridge</p></body>");
    }
}
