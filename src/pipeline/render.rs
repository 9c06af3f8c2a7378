//! External renderer integration
//!
//! PDF pages are rasterized with Poppler's `pdftoppm`; EPS inputs are first
//! converted to PDF with Ghostscript. Tools are located via PATH and run
//! synchronously with captured output.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::types::{PipelineError, Result};

/// Locate an external tool on PATH
fn locate(tool: &str) -> Result<PathBuf> {
    which::which(tool).map_err(|_| PipelineError::ToolNotFound(tool.to_string()))
}

/// Run a prepared command, mapping non-zero exit to `ToolFailed`
fn run(tool: &str, command: &mut Command) -> Result<()> {
    debug!(tool, "running external tool");
    let output = command.output()?;
    if !output.status.success() {
        return Err(PipelineError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Number of pages in a PDF document
pub fn pdf_page_count(pdf: &Path) -> Result<usize> {
    let document = lopdf::Document::load(pdf)?;
    Ok(document.get_pages().len())
}

/// Render the first page of a PDF to a PNG at the given DPI.
///
/// Returns the path of the rendered file inside `work_dir`.
pub fn render_pdf_page(pdf: &Path, dpi: u32, work_dir: &Path) -> Result<PathBuf> {
    let pdftoppm = locate("pdftoppm")?;
    let prefix = work_dir.join("page");

    run(
        "pdftoppm",
        Command::new(pdftoppm)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg(pdf)
            .arg(&prefix),
    )?;

    Ok(work_dir.join("page.png"))
}

/// Convert an EPS file to a print-optimized PDF with Ghostscript
pub fn eps_to_pdf(eps: &Path, output_pdf: &Path) -> Result<()> {
    let gs = locate("gs")?;

    run(
        "gs",
        Command::new(gs)
            .args([
                "-sDEVICE=pdfwrite",
                "-dNOPAUSE",
                "-dBATCH",
                "-dSAFER",
                "-dPDFSETTINGS=/printer",
                "-dCompatibilityLevel=1.4",
            ])
            .arg(format!("-sOutputFile={}", output_pdf.display()))
            .arg(eps),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_error() {
        let result = locate("definitely-not-a-real-tool-name");
        assert!(matches!(result, Err(PipelineError::ToolNotFound(_))));
    }

    #[test]
    fn test_page_count_on_missing_file() {
        let result = pdf_page_count(Path::new("/nonexistent/file.pdf"));
        assert!(result.is_err());
    }
}
