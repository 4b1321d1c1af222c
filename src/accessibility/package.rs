//! Read access to the entries of an EPUB archive.

use std::io::{Read, Seek};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::util::{decode_text, declared_encoding, strip_bom};

/// An opened EPUB archive.
pub struct Package<R> {
    archive: ZipArchive<R>,
    names: Vec<String>,
}

impl<R: Read + Seek> Package<R> {
    /// Open the archive. Any zip failure is reported as a malformed package.
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let names = archive.file_names().map(str::to_string).collect();
        Ok(Self { archive, names })
    }

    /// Entry names in archive order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Entry names ending with any of `suffixes` (case-insensitive).
    pub fn names_with_suffix(&self, suffixes: &[&str]) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| {
                let lower = name.to_ascii_lowercase();
                suffixes.iter().any(|suffix| lower.ends_with(suffix))
            })
            .cloned()
            .collect()
    }

    pub fn read_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read an entry as text, honoring the XML declaration's encoding.
    pub fn read_text(&mut self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        let bytes = strip_bom(&bytes);
        let hint = declared_encoding(bytes);
        Ok(decode_text(bytes, hint.as_deref()).into_owned())
    }

    /// Locate the package document.
    ///
    /// Follows `META-INF/container.xml` when it names an existing entry,
    /// otherwise takes the first entry ending in `.opf`.
    pub fn find_opf_path(&mut self) -> Result<String> {
        if let Ok(container) = self.read_text("META-INF/container.xml") {
            match parse_container_xml(&container) {
                Some(path) if self.names.iter().any(|n| *n == path) => return Ok(path),
                Some(path) => debug!(path, "container.xml rootfile not in archive"),
                None => debug!("container.xml has no rootfile"),
            }
        }

        self.names
            .iter()
            .find(|name| name.to_ascii_lowercase().ends_with(".opf"))
            .cloned()
            .ok_or_else(|| Error::MalformedPackage("no package document (.opf) found".into()))
    }
}

/// Pull `rootfile/@full-path` out of container.xml.
fn parse_container_xml(content: &str) -> Option<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if crate::util::local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Some(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Resolve a manifest href against the package document's directory.
///
/// The result is an archive entry name: percent-escapes are decoded and
/// `.`/`..` segments are collapsed. A `..` above the archive root is dropped.
pub fn resolve_href(opf_path: &str, href: &str) -> String {
    let href = href.split(['#', '?']).next().unwrap_or_default();
    let href = percent_encoding::percent_decode_str(href).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    if !href.starts_with('/') {
        segments.extend(opf_path.split('/'));
        // last segment is the package document itself
        segments.pop();
    }
    for segment in href.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.retain(|s| !s.is_empty());
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn archive(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_container_rootfile() {
        let container = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/package.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
        let mut package = Package::open(archive(&[
            ("META-INF/container.xml", container),
            ("other.opf", "<package/>"),
            ("OEBPS/package.opf", "<package/>"),
        ]))
        .unwrap();
        assert_eq!(package.find_opf_path().unwrap(), "OEBPS/package.opf");
    }

    #[test]
    fn test_opf_suffix_fallback() {
        let mut package = Package::open(archive(&[
            ("content.html", "<html lang=\"en\"/>"),
            ("content.opf", "<package/>"),
        ]))
        .unwrap();
        assert_eq!(package.find_opf_path().unwrap(), "content.opf");
    }

    #[test]
    fn test_missing_opf() {
        let mut package = Package::open(archive(&[("chapter.xhtml", "<html/>")])).unwrap();
        assert!(matches!(
            package.find_opf_path(),
            Err(Error::MalformedPackage(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        let result = Package::open(Cursor::new(b"plain text".to_vec()));
        assert!(matches!(result, Err(Error::MalformedPackage(_))));
    }

    #[test]
    fn test_names_with_suffix() {
        let package = Package::open(archive(&[
            ("a.XHTML", ""),
            ("b.css", ""),
            ("c.html", ""),
        ]))
        .unwrap();
        assert_eq!(package.names_with_suffix(&[".xhtml", ".html"]), vec!["a.XHTML", "c.html"]);
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("OEBPS/content.opf", "nav.xhtml"), "OEBPS/nav.xhtml");
        assert_eq!(resolve_href("content.opf", "nav.xhtml"), "nav.xhtml");
    }

    #[test]
    fn test_resolve_href_normalizes() {
        assert_eq!(resolve_href("OEBPS/content.opf", "../nav.xhtml"), "nav.xhtml");
        assert_eq!(resolve_href("OEBPS/content.opf", "./text/../nav.xhtml"), "OEBPS/nav.xhtml");
        assert_eq!(resolve_href("OEBPS/content.opf", "nav%20doc.xhtml"), "OEBPS/nav doc.xhtml");
        assert_eq!(resolve_href("OEBPS/content.opf", "nav.xhtml#toc"), "OEBPS/nav.xhtml");
        assert_eq!(resolve_href("content.opf", "../../nav.xhtml"), "nav.xhtml");
    }

    #[test]
    fn test_read_text_latin1() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("t.xhtml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><p>caf\xe9</p>")
            .unwrap();
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);

        let mut package = Package::open(cursor).unwrap();
        assert!(package.read_text("t.xhtml").unwrap().contains("caf\u{e9}"));
    }
}
