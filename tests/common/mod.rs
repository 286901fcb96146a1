//! Minimal zip writer for building test archives, including hostile ones.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use std::io::Write;
use std::path::Path;

const MADE_BY_UNIX: u16 = (3 << 8) | 30;
const MADE_BY_DOS: u16 = 20;

pub struct Entry {
    pub name: String,
    pub contents: Vec<u8>,
    pub method: u16,
    pub made_by: u16,
    pub external_attrs: u32,
    pub crc_override: Option<u32>,
    pub declared_size: Option<u32>,
    pub data_limit: Option<usize>,
}

impl Entry {
    pub fn deflated(name: &str, contents: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            contents: contents.to_vec(),
            method: 8,
            made_by: MADE_BY_DOS,
            external_attrs: 0,
            crc_override: None,
            declared_size: None,
            data_limit: None,
        }
    }

    pub fn stored(name: &str, contents: &[u8]) -> Self {
        Self {
            method: 0,
            ..Self::deflated(name, contents)
        }
    }

    pub fn dir(name: &str) -> Self {
        Self {
            external_attrs: 0x10,
            ..Self::stored(name, b"")
        }
    }

    pub fn unix_mode(mut self, mode: u32) -> Self {
        self.made_by = MADE_BY_UNIX;
        self.external_attrs = (0o100000 | mode) << 16;
        self
    }

    pub fn method(mut self, method: u16) -> Self {
        self.method = method;
        self
    }

    pub fn bad_crc(mut self) -> Self {
        self.crc_override = Some(0xDEADBEEF);
        self
    }

    /// Record `size` as the uncompressed size instead of the real length.
    pub fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Keep only the first `len` bytes of the (compressed) data.
    pub fn cut_data(mut self, len: usize) -> Self {
        self.data_limit = Some(len);
        self
    }
}

#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<Entry>,
    comment: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn file(self, name: &str, contents: &[u8]) -> Self {
        self.entry(Entry::deflated(name, contents))
    }

    pub fn dir(self, name: &str) -> Self {
        self.entry(Entry::dir(name))
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.as_bytes().to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let mut crc = Crc::new();
            crc.update(&entry.contents);
            let crc = entry.crc_override.unwrap_or(crc.sum());

            let mut data = if entry.method == 8 {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&entry.contents).unwrap();
                encoder.finish().unwrap()
            } else {
                entry.contents.clone()
            };
            if let Some(len) = entry.data_limit {
                data.truncate(len);
            }
            let size = entry
                .declared_size
                .unwrap_or(entry.contents.len() as u32);

            let offset = out.len() as u32;
            let name = entry.name.as_bytes();

            out.write_all(b"PK\x03\x04").unwrap();
            out.write_u16::<LittleEndian>(20).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0x21).unwrap();
            out.write_u32::<LittleEndian>(crc).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(size).unwrap();
            out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_all(name).unwrap();
            out.write_all(&data).unwrap();

            central.write_all(b"PK\x01\x02").unwrap();
            central.write_u16::<LittleEndian>(entry.made_by).unwrap();
            central.write_u16::<LittleEndian>(20).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(entry.method).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0x21).unwrap();
            central.write_u32::<LittleEndian>(crc).unwrap();
            central.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            central.write_u32::<LittleEndian>(size).unwrap();
            central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u32::<LittleEndian>(entry.external_attrs).unwrap();
            central.write_u32::<LittleEndian>(offset).unwrap();
            central.write_all(name).unwrap();
        }

        let cd_offset = out.len() as u32;
        out.write_all(&central).unwrap();

        out.write_all(b"PK\x05\x06").unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(self.entries.len() as u16).unwrap();
        out.write_u32::<LittleEndian>(central.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.write_all(&self.comment).unwrap();

        out
    }

    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

pub const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="course" xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2">
  <organizations default="org1">
    <organization identifier="org1">
      <title>Course</title>
      <item identifier="item1" identifierref="res1"><title>Start</title></item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="res1" type="webcontent" href="index.html">
      <file href="index.html"/>
    </resource>
  </resources>
</manifest>
"#;

/// A well-formed package whose entry point is `index.html`.
pub fn course_package() -> ZipBuilder {
    ZipBuilder::new()
        .file("imsmanifest.xml", MANIFEST.as_bytes())
        .file("index.html", b"<html><body>Lesson</body></html>")
        .dir("assets/")
        .file("assets/app.js", b"console.log('start');")
}
