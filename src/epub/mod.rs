//! Processing chapter pages inside a packaged EPUB.
//!
//! Entries are classified by file name like [`crate::batch`] does for a
//! directory. Chapters and part dividers are rewritten; every other entry is
//! copied byte for byte.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::batch::{BatchSummary, FileClassifier, FileKind, FileOutcome, FileStatus};
use crate::config::Config;
use crate::error::Result;
use crate::part::clean_part_divider;
use crate::preserve::verify_preservation;
use crate::transform::{transform_chapter, verify_transform};
use crate::util::{decode_text, extract_xml_encoding};

const MIMETYPE: &str = "mimetype";
const EPUB_MIMETYPE: &[u8] = b"application/epub+zip";

/// Process the EPUB at `input` and write the result to `output`.
pub fn process_epub(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &Config,
) -> Result<BatchSummary> {
    let input = input.as_ref();
    let output = output.as_ref();
    info!(input = %input.display(), output = %output.display(), "Processing EPUB");

    let reader = std::fs::File::open(input)?;
    let writer = std::fs::File::create(output)?;
    process_epub_to_writer(reader, writer, config)
}

/// Process an EPUB held in memory, returning the new archive bytes.
pub fn process_epub_bytes(data: &[u8], config: &Config) -> Result<(Vec<u8>, BatchSummary)> {
    let mut out = Cursor::new(Vec::new());
    let summary = process_epub_to_writer(Cursor::new(data), &mut out, config)?;
    Ok((out.into_inner(), summary))
}

/// Process an EPUB from any seekable reader into any seekable writer.
///
/// The `mimetype` entry is written first and uncompressed, as the OCF
/// container format requires.
pub fn process_epub_to_writer<R, W>(reader: R, writer: W, config: &Config) -> Result<BatchSummary>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let classifier = FileClassifier::new(config)?;
    let mut archive = ZipArchive::new(reader)?;
    let mut zip = ZipWriter::new(writer);

    let options_stored =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let options_deflate =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mimetype = match archive.by_name(MIMETYPE) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            contents
        }
        Err(zip::result::ZipError::FileNotFound) => {
            warn!("EPUB has no mimetype entry, writing the standard one");
            EPUB_MIMETYPE.to_vec()
        }
        Err(e) => return Err(e.into()),
    };
    zip.start_file(MIMETYPE, options_stored)?;
    zip.write_all(&mimetype)?;

    let mut summary = BatchSummary::default();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let path = file.name().to_string();
        if path == MIMETYPE {
            continue;
        }
        if file.is_dir() {
            zip.add_directory(path.as_str(), options_deflate)?;
            continue;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        drop(file);

        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let data = match classifier.classify(&name) {
            Some(kind) => {
                let (data, status) = process_entry(&data, kind, config);
                debug!(entry = %path, ?status, "Processed entry");
                summary.files.push(FileOutcome { name, kind, status });
                data
            }
            None => data,
        };

        zip.start_file(path.as_str(), options_deflate)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    info!(
        total = summary.total(),
        preserved = summary.preserved(),
        failed = summary.failed(),
        "EPUB processed"
    );
    Ok(summary)
}

/// Rewrite one chapter or part entry. On failure the original bytes are kept.
fn process_entry(data: &[u8], kind: FileKind, config: &Config) -> (Vec<u8>, FileStatus) {
    let original = decode_text(data, extract_xml_encoding(data));

    let result = match kind {
        FileKind::Chapter => {
            transform_chapter(&original, config.batch.strategy, &config.render).and_then(|processed| {
                let report = verify_transform(&original, &processed, config.batch.strategy)?;
                Ok((processed, report))
            })
        }
        FileKind::Part => {
            let processed = clean_part_divider(&original);
            let report = verify_preservation(&original, &processed);
            Ok((processed, report))
        }
    };

    match result {
        Ok((processed, report)) => {
            let status = if report.is_preserved() {
                FileStatus::Preserved
            } else {
                FileStatus::Changed {
                    summary: report.summary(),
                }
            };
            (processed.into_bytes(), status)
        }
        Err(e) => (
            data.to_vec(),
            FileStatus::Failed {
                error: e.to_string(),
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Chapter I</title></head>
<body class="chap-title">
<section class="chap-title"><div class="chapter-number-text">I</div></section>
<section class="chap-body"><p>Start here.</p></section>
</body></html>"#;

    fn build_epub(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_process_epub_bytes() {
        let epub = build_epub(&[
            ("OEBPS/text/9-chapter-i-roots.xhtml", CHAPTER.as_bytes()),
            ("mimetype", EPUB_MIMETYPE),
            ("OEBPS/images/brushstroke.JPEG", &[0xff, 0xd8, 0xff]),
            ("OEBPS/text/broken-chapter-x.xhtml", b"<html><div></span></html>"),
        ]);

        let mut config = Config::default();
        config.batch.strategy = crate::transform::Strategy::Rebuild;
        let (out, summary) = process_epub_bytes(&epub, &config).unwrap();

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.preserved(), 1);
        assert_eq!(summary.failed(), 1);

        let mut archive = ZipArchive::new(Cursor::new(out)).unwrap();
        {
            let first = archive.by_index(0).unwrap();
            assert_eq!(first.name(), "mimetype");
            assert_eq!(first.compression(), zip::CompressionMethod::Stored);
        }

        let mut chapter = String::new();
        archive
            .by_name("OEBPS/text/9-chapter-i-roots.xhtml")
            .unwrap()
            .read_to_string(&mut chapter)
            .unwrap();
        assert!(chapter.contains("<!-- PAGES 2-4: BODY CONTENT -->"));
        assert!(chapter.contains("Start here."));

        let mut image = Vec::new();
        archive
            .by_name("OEBPS/images/brushstroke.JPEG")
            .unwrap()
            .read_to_end(&mut image)
            .unwrap();
        assert_eq!(image, vec![0xff, 0xd8, 0xff]);

        let mut broken = String::new();
        archive
            .by_name("OEBPS/text/broken-chapter-x.xhtml")
            .unwrap()
            .read_to_string(&mut broken)
            .unwrap();
        assert_eq!(broken, "<html><div></span></html>");
    }

    #[test]
    fn test_declared_encoding_is_honoured() {
        let chapter = CHAPTER
            .replace("encoding=\"utf-8\"", "encoding=\"iso-8859-2\"")
            .replace("Start here.", "Start in Wroc@aw.");
        // 0xB3 is "\u{142}" in ISO-8859-2 but "\u{b3}" in Windows-1252
        let bytes: Vec<u8> = chapter
            .bytes()
            .map(|b| if b == b'@' { 0xB3 } else { b })
            .collect();
        let epub = build_epub(&[
            ("mimetype", EPUB_MIMETYPE),
            ("OEBPS/text/9-chapter-i-roots.xhtml", &bytes),
        ]);

        let (out, summary) = process_epub_bytes(&epub, &Config::default()).unwrap();
        assert_eq!(summary.preserved(), 1);

        let mut archive = ZipArchive::new(Cursor::new(out)).unwrap();
        let mut processed = String::new();
        archive
            .by_name("OEBPS/text/9-chapter-i-roots.xhtml")
            .unwrap()
            .read_to_string(&mut processed)
            .unwrap();
        assert!(processed.contains("Start in Wroc\u{142}aw."));
        assert!(processed.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    }

    #[test]
    fn test_missing_mimetype_is_added() {
        let epub = build_epub(&[("OEBPS/content.opf", b"<package/>")]);
        let (out, summary) = process_epub_bytes(&epub, &Config::default()).unwrap();
        assert_eq!(summary.total(), 0);

        let mut archive = ZipArchive::new(Cursor::new(out)).unwrap();
        let mut mimetype = String::new();
        archive.by_index(0).unwrap().read_to_string(&mut mimetype).unwrap();
        assert_eq!(mimetype, "application/epub+zip");
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            process_epub_bytes(b"not a zip", &Config::default()),
            Err(crate::error::Error::Zip(_))
        ));
    }
}
