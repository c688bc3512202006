// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialises drawing primitives into a PDF file using `lopdf`.
//
// Each page is encoded into a content stream (Flate-compressed when enabled)
// as soon as it is committed, so only encoded bytes stay resident. Raster
// textures are embedded once per content fingerprint at full resolution and
// referenced from every page through a shared resource dictionary. The file
// carries no timestamps and an identifier supplied by the caller, so equal
// draw streams produce identical bytes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use pagestorm_core::error::{Result, StormError};
use pagestorm_core::{Color, FontFamily, PageSize, Point, Rect};
use tracing::{debug, info, instrument, trace, warn};

use super::winansi;
use crate::canvas::DocumentWriter;
use crate::image::EncodedImage;

const PDF_VERSION: &str = "1.7";
const DOCUMENT_TITLE: &str = "Pagestorm Stress Test";

/// Control-point distance for a quarter circle drawn as one cubic Bézier.
const KAPPA: f32 = 0.552_284_8;

/// Writes a PDF file page by page.
///
/// The output file is created by [`PdfWriter::create`]; the document is
/// serialised to it by [`DocumentWriter::finalize`].
pub struct PdfWriter {
    doc: Document,
    /// `None` once finalized.
    output: Option<BufWriter<File>>,
    path: PathBuf,
    compress: bool,
    identifier: Option<[u8; 16]>,
    page_size: PageSize,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    /// Operations of the page being drawn.
    ops: Vec<Operation>,
    /// Fonts in registration order; font `i` is resource `F{i+1}`.
    fonts: Vec<(FontFamily, ObjectId)>,
    /// Image XObjects keyed by texture fingerprint: (resource name, object).
    images: BTreeMap<String, (String, ObjectId)>,
    content_bytes: usize,
}

impl PdfWriter {
    /// Open `path` for writing. `initial_size` applies until the first call
    /// to `set_page_size`; `compress` Flate-encodes page content streams.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>, initial_size: PageSize, compress: bool) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        info!(
            width = initial_size.width,
            height = initial_size.height,
            compress,
            "Opened PDF output"
        );

        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        let resources_id = doc.new_object_id();
        Ok(Self {
            doc,
            output: Some(BufWriter::new(file)),
            path: path.as_ref().to_path_buf(),
            compress,
            identifier: None,
            page_size: initial_size,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            ops: Vec::new(),
            fonts: Vec::new(),
            images: BTreeMap::new(),
            content_bytes: 0,
        })
    }

    /// Write `id` as the trailer `/ID` of the document.
    pub fn with_identifier(mut self, id: [u8; 16]) -> Self {
        self.identifier = Some(id);
        self
    }

    /// Pages committed so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Distinct raster images embedded so far.
    pub fn embedded_images(&self) -> usize {
        self.images.len()
    }

    /// Operations drawn on the current page and not yet encoded.
    pub fn pending_ops(&self) -> usize {
        self.ops.len()
    }

    /// Encoded (possibly compressed) content bytes of all committed pages.
    pub fn content_bytes(&self) -> usize {
        self.content_bytes
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn move_to(&mut self, point: Point) {
        self.push("m", vec![point.x.into(), point.y.into()]);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, end: Point) {
        self.push(
            "c",
            vec![
                c1.x.into(),
                c1.y.into(),
                c2.x.into(),
                c2.y.into(),
                end.x.into(),
                end.y.into(),
            ],
        );
    }

    /// Resource name of `font`, registering a Type1 font object on first use.
    fn font_resource(&mut self, font: FontFamily) -> Vec<u8> {
        let index = match self.fonts.iter().position(|(known, _)| *known == font) {
            Some(index) => index,
            None => {
                let id = self.doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.postscript_name(),
                    "Encoding" => "WinAnsiEncoding",
                });
                self.fonts.push((font, id));
                self.fonts.len() - 1
            }
        };
        font_name(index).into_bytes()
    }

    /// Resource name of `image`, embedding it on first use.
    fn image_resource(&mut self, image: &EncodedImage) -> Result<Vec<u8>> {
        if let Some((name, _)) = self.images.get(image.fingerprint()) {
            return Ok(name.clone().into_bytes());
        }
        let stream = image_stream(image)?;
        let stored = stream.content.len();
        let id = self.doc.add_object(stream);
        let name = format!("Im{}", self.images.len() + 1);
        debug!(
            fingerprint = %image.fingerprint(),
            width = image.width(),
            height = image.height(),
            stored,
            "Embedded raster image"
        );
        self.images
            .insert(image.fingerprint().to_owned(), (name.clone(), id));
        Ok(name.into_bytes())
    }

    /// Encode the pending operations into a page object.
    fn encode_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        }
        .encode()
        .map_err(pdf_error)?;

        let mut stream = Stream::new(Dictionary::new(), content);
        if self.compress {
            stream.compress().map_err(pdf_error)?;
        }
        self.content_bytes += stream.content.len();
        let content_id = self.doc.add_object(stream);

        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            self.page_size.width.into(),
            self.page_size.height.into(),
        ];
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box,
            "Contents" => content_id,
            "Resources" => self.resources_id,
        });
        self.page_ids.push(page_id);
        trace!(page = self.page_ids.len(), "Page encoded");
        Ok(())
    }

    /// Shared resources, page tree, catalog, info and trailer.
    fn finish_structure(&mut self) {
        let mut fonts = Dictionary::new();
        for (index, (_, id)) in self.fonts.iter().enumerate() {
            fonts.set(font_name(index), *id);
        }
        let mut xobjects = Dictionary::new();
        for (name, id) in self.images.values() {
            xobjects.set(name.as_str(), *id);
        }
        self.doc.objects.insert(
            self.resources_id,
            Object::Dictionary(dictionary! {
                "Font" => fonts,
                "XObject" => xobjects,
            }),
        );

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(DOCUMENT_TITLE),
            "Producer" => Object::string_literal(concat!("pagestorm ", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);
        if let Some(id) = self.identifier {
            let id = Object::String(id.to_vec(), StringFormat::Hexadecimal);
            self.doc.trailer.set("ID", vec![id.clone(), id]);
        }
    }
}

impl DocumentWriter for PdfWriter {
    fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
    }

    fn save_state(&mut self) {
        self.push("q", Vec::new());
    }

    fn restore_state(&mut self) {
        self.push("Q", Vec::new());
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.push("RG", vec![color.r.into(), color.g.into(), color.b.into()]);
    }

    fn set_line_width(&mut self, width: f32) {
        self.push("w", vec![width.into()]);
    }

    fn line(&mut self, from: Point, to: Point) {
        self.move_to(from);
        self.push("l", vec![to.x.into(), to.y.into()]);
        self.push("S", Vec::new());
    }

    fn rect(&mut self, rect: Rect) {
        self.push(
            "re",
            vec![
                rect.x.into(),
                rect.y.into(),
                rect.width.into(),
                rect.height.into(),
            ],
        );
        self.push("S", Vec::new());
    }

    /// Four cubic arcs, one per quadrant, counter-clockwise from 0°.
    fn circle(&mut self, center: Point, radius: f32) {
        let (x, y, r, k) = (center.x, center.y, radius, radius * KAPPA);
        self.move_to(Point::new(x + r, y));
        self.curve_to(Point::new(x + r, y + k), Point::new(x + k, y + r), Point::new(x, y + r));
        self.curve_to(Point::new(x - k, y + r), Point::new(x - r, y + k), Point::new(x - r, y));
        self.curve_to(Point::new(x - r, y - k), Point::new(x - k, y - r), Point::new(x, y - r));
        self.curve_to(Point::new(x + k, y - r), Point::new(x + r, y - k), Point::new(x + r, y));
        self.push("h", Vec::new());
        self.push("S", Vec::new());
    }

    fn text(&mut self, origin: Point, font: FontFamily, size: f32, text: &str) {
        let resource = self.font_resource(font);
        self.push("BT", Vec::new());
        self.push("Tf", vec![Object::Name(resource), size.into()]);
        self.push("Td", vec![origin.x.into(), origin.y.into()]);
        self.push(
            "Tj",
            vec![Object::String(winansi::encode(text), StringFormat::Literal)],
        );
        self.push("ET", Vec::new());
    }

    fn image(&mut self, image: &EncodedImage, rect: Rect) -> Result<()> {
        if self.output.is_none() {
            return Err(StormError::WriterClosed);
        }
        let resource = self.image_resource(image)?;

        // Image space is the unit square; `cm` stretches it over the rect.
        self.push("q", Vec::new());
        self.push(
            "cm",
            vec![
                rect.width.into(),
                Object::Integer(0),
                Object::Integer(0),
                rect.height.into(),
                rect.x.into(),
                rect.y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(resource)]);
        self.push("Q", Vec::new());
        Ok(())
    }

    fn commit_page(&mut self) -> Result<()> {
        if self.output.is_none() {
            return Err(StormError::WriterClosed);
        }
        self.encode_page()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn finalize(&mut self) -> Result<()> {
        let mut output = self.output.take().ok_or(StormError::WriterClosed)?;

        if !self.ops.is_empty() {
            warn!(ops = self.ops.len(), "Committing unfinished page before finalize");
            self.encode_page()?;
        }
        if self.page_ids.is_empty() {
            return Err(StormError::PdfError(
                "cannot finalize a document without pages".into(),
            ));
        }

        self.finish_structure();
        self.doc.save_to(&mut output).map_err(pdf_error)?;
        output.flush()?;

        info!(
            pages = self.page_ids.len(),
            images = self.images.len(),
            content_bytes = self.content_bytes,
            "PDF written"
        );
        Ok(())
    }
}

fn pdf_error(err: impl std::fmt::Display) -> StormError {
    StormError::PdfError(err.to_string())
}

fn font_name(index: usize) -> String {
    format!("F{}", index + 1)
}

/// Decode the PNG and store its pixels as a lossless Flate image XObject at
/// the texture's intrinsic resolution.
#[cfg(feature = "raster")]
fn image_stream(image: &EncodedImage) -> Result<Stream> {
    let decoded = ::image::load_from_memory(image.bytes()).map_err(|err| {
        StormError::ImageError(format!("failed to decode texture for PDF: {}", err))
    })?;
    let rgb = decoded.to_rgb8();
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(rgb.width()),
            "Height" => i64::from(rgb.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        rgb.into_raw(),
    );
    stream.compress().map_err(pdf_error)?;
    Ok(stream)
}

#[cfg(not(feature = "raster"))]
fn image_stream(_image: &EncodedImage) -> Result<Stream> {
    Err(StormError::MissingDependency(
        "embedding raster images requires the `raster` feature".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(path: &Path) -> Document {
        Document::load(path).expect("parse written pdf")
    }

    /// Content stream of every page, in page order.
    fn page_streams(doc: &Document) -> Vec<&Stream> {
        doc.get_pages()
            .values()
            .map(|page_id| {
                let contents = doc
                    .get_dictionary(*page_id)
                    .and_then(|page| page.get(b"Contents"))
                    .and_then(Object::as_reference)
                    .expect("page contents");
                doc.get_object(contents)
                    .and_then(Object::as_stream)
                    .expect("content stream")
            })
            .collect()
    }

    fn is_flate(stream: &Stream) -> bool {
        matches!(stream.dict.get(b"Filter"), Ok(Object::Name(name)) if name.as_slice() == b"FlateDecode")
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    fn one_page(compress: bool, draw: impl FnOnce(&mut PdfWriter)) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("page.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, compress).expect("create");
        draw(&mut writer);
        writer.commit_page().expect("commit");
        writer.finalize().expect("finalize");
        (dir, path)
    }

    #[test]
    fn writes_a_pdf_with_mixed_page_sizes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, true).expect("create");

        writer.text(Point::new(40.0, 800.0), FontFamily::Helvetica, 12.0, "hello");
        writer.rect(Rect::new(50.0, 50.0, 100.0, 40.0));
        writer.commit_page().unwrap();

        writer.set_page_size(PageSize::LETTER.landscape());
        writer.save_state();
        writer.set_line_width(0.4);
        writer.set_stroke_color(Color::rgb(0.5, 0.1, 0.9));
        writer.line(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        writer.circle(Point::new(200.0, 200.0), 3.0);
        writer.restore_state();
        writer.commit_page().unwrap();
        assert_eq!(writer.page_count(), 2);
        writer.finalize().expect("finalize");

        let bytes = std::fs::read(&path).expect("read output");
        assert!(bytes.starts_with(b"%PDF-1.7"));

        let doc = load(&path);
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);
        let media_box = doc
            .get_dictionary(pages[&2])
            .and_then(|page| page.get(b"MediaBox"))
            .and_then(Object::as_array)
            .expect("media box");
        let width = media_box[2].as_float().expect("width");
        assert!((width - 792.0).abs() < 1e-3);
    }

    /// Pages are turned into content bytes at commit, not kept as operations.
    #[test]
    fn committed_pages_are_encoded_immediately() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("encoded.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, true).expect("create");
        for index in 0..50 {
            writer.line(Point::new(0.0, index as f32), Point::new(100.0, index as f32));
        }
        assert_eq!(writer.pending_ops(), 150);

        writer.commit_page().unwrap();
        assert_eq!(writer.pending_ops(), 0);
        assert!(writer.content_bytes() > 0);
        writer.finalize().expect("finalize");
    }

    #[test]
    fn content_streams_follow_the_compression_flag() {
        let draw = |writer: &mut PdfWriter| {
            for step in 0..40 {
                let y = 100.0 + step as f32;
                writer.line(Point::new(10.0, y), Point::new(300.0, y));
            }
        };

        let (_dir, compressed) = one_page(true, draw);
        let doc = load(&compressed);
        assert!(page_streams(&doc).into_iter().all(is_flate));

        let (_dir, plain) = one_page(false, draw);
        let doc = load(&plain);
        let streams = page_streams(&doc);
        assert!(streams.iter().all(|stream| !is_flate(stream)));
        assert!(contains(&streams[0].content, b" l\nS"));
    }

    #[test]
    fn title_is_written_in_win_ansi() {
        let (_dir, path) = one_page(false, |writer| {
            writer.text(
                Point::new(40.0, 800.0),
                FontFamily::TimesRoman,
                15.0,
                "Stress Test — Page 1",
            );
        });
        let doc = load(&path);
        let content = &page_streams(&doc)[0].content;
        assert!(contains(content, b"(Stress Test \x97 Page 1) Tj"));
        assert!(!contains(content, "—".as_bytes()));

        let bytes = std::fs::read(&path).expect("read output");
        assert!(contains(&bytes, b"/BaseFont /Times-Roman"));
        assert!(contains(&bytes, b"/Encoding /WinAnsiEncoding"));
    }

    #[test]
    fn circles_are_four_bezier_arcs() {
        let (_dir, path) = one_page(false, |writer| {
            writer.circle(Point::new(100.0, 100.0), 10.0);
        });
        let doc = load(&path);
        let content = String::from_utf8_lossy(&page_streams(&doc)[0].content).into_owned();
        let operators: Vec<&str> = content
            .lines()
            .filter_map(|line| line.split_whitespace().last())
            .collect();
        assert_eq!(operators, ["m", "c", "c", "c", "c", "h", "S"]);
    }

    #[test]
    fn identifier_lands_in_the_trailer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("id.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, true)
            .expect("create")
            .with_identifier([7; 16]);
        writer.rect(Rect::new(1.0, 1.0, 2.0, 2.0));
        writer.commit_page().unwrap();
        writer.finalize().expect("finalize");

        let doc = load(&path);
        let ids = doc
            .trailer
            .get(b"ID")
            .and_then(Object::as_array)
            .expect("trailer id");
        assert_eq!(ids.len(), 2);
        for id in ids {
            assert!(matches!(id, Object::String(bytes, _) if bytes.as_slice() == &[7u8; 16]));
        }
    }

    #[test]
    fn same_draw_stream_gives_identical_bytes() {
        let draw = |writer: &mut PdfWriter| {
            writer.text(Point::new(40.0, 800.0), FontFamily::Courier, 11.0, "same");
            writer.circle(Point::new(50.0, 50.0), 4.0);
        };
        let (_a_dir, a) = one_page(true, draw);
        let (_b_dir, b) = one_page(true, draw);
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn finalize_only_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("once.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, false).expect("create");
        writer.commit_page().unwrap();
        writer.finalize().expect("first finalize");
        assert!(matches!(writer.finalize(), Err(StormError::WriterClosed)));
        assert!(matches!(writer.commit_page(), Err(StormError::WriterClosed)));
    }

    #[test]
    fn empty_document_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("empty.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, true).expect("create");
        assert!(matches!(writer.finalize(), Err(StormError::PdfError(_))));
    }

    #[cfg(feature = "raster")]
    #[test]
    fn identical_textures_are_embedded_once() {
        let texture = crate::image::texture::generate_texture(64, 0, 0).expect("texture");
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("images.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, true).expect("create");
        for _ in 0..3 {
            writer
                .image(&texture, Rect::new(60.0, 60.0, 128.0, 128.0))
                .expect("draw image");
            writer.commit_page().unwrap();
        }
        assert_eq!(writer.embedded_images(), 1);
        writer.finalize().expect("finalize");

        let doc = load(&path);
        assert_eq!(doc.get_pages().len(), 3);
        for stream in page_streams(&doc) {
            let plain = stream.decompressed_content().expect("inflate");
            assert!(contains(&plain, b"/Im1 Do"));
        }
    }

    /// The embedded XObject keeps the texture's full pixel grid.
    #[cfg(feature = "raster")]
    #[test]
    fn textures_are_embedded_at_full_resolution() {
        let pixels = 320;
        let texture = crate::image::texture::generate_texture(pixels, 1, 5).expect("texture");
        let (_dir, path) = one_page(true, |writer| {
            writer
                .image(&texture, Rect::new(40.0, 40.0, 200.0, 200.0))
                .expect("draw image");
        });

        let doc = load(&path);
        let images: Vec<&Stream> = doc
            .objects
            .values()
            .filter_map(|object| object.as_stream().ok())
            .filter(|stream| {
                matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Image")
            })
            .collect();
        assert_eq!(images.len(), 1);

        let dict = &images[0].dict;
        assert!(matches!(dict.get(b"Width"), Ok(Object::Integer(w)) if *w == i64::from(pixels)));
        assert!(matches!(dict.get(b"Height"), Ok(Object::Integer(h)) if *h == i64::from(pixels)));

        let samples = if is_flate(images[0]) {
            images[0].decompressed_content().expect("inflate")
        } else {
            images[0].content.clone()
        };
        let decoded = ::image::load_from_memory(texture.bytes())
            .expect("decode png")
            .to_rgb8();
        assert_eq!(samples, decoded.into_raw());
    }

    #[test]
    fn unreadable_image_bytes_are_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.pdf");
        let mut writer = PdfWriter::create(&path, PageSize::A4, true).expect("create");
        let bogus = EncodedImage::new(vec![0, 1, 2, 3], 2, 2);
        assert!(writer.image(&bogus, Rect::new(0.0, 0.0, 10.0, 10.0)).is_err());
        assert_eq!(writer.embedded_images(), 0);
    }
}
