use crate::boxes::FourCC;
use crate::parser::ParseError;
use crate::view::View;
use std::collections::HashMap;

/// Decoded fields of a box, tagged by the box types this crate understands.
///
/// Anything not listed here parses to `Opaque`: size and type stay visible in
/// the tree, the payload bytes are left uninterpreted. Unknown types are a
/// forward-compatibility case, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxFields {
    Mvhd(MvhdFields),
    Tkhd(TkhdFields),
    Stts(SttsFields),
    Stsc(StscFields),
    Mdhd(MdhdFields),
    Hdlr(HdlrFields),
    Ftyp(FtypFields),
    /// Container boxes carry no fields of their own; their payload is child boxes.
    Container,
    /// Unrecognized leaf box; payload not interpreted.
    Opaque,
}

/// Movie header (`mvhd`).
#[derive(Debug, Clone, PartialEq)]
pub struct MvhdFields {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub time_scale: u32,
    pub duration: u64,
    /// Playback rate, 16.16 fixed point in the stream.
    pub rate: f64,
    /// Playback volume, 8.8 fixed point in the stream.
    pub volume: f64,
    pub matrix: [u32; 9],
    pub next_track_id: u32,
}

/// Track header (`tkhd`).
#[derive(Debug, Clone, PartialEq)]
pub struct TkhdFields {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub layer: i16,
    pub alternate_group: i16,
    /// 8.8 fixed point in the stream; 1.0 for audible tracks, 0 otherwise.
    pub volume: f64,
    pub matrix: [u32; 9],
    /// 16.16 fixed point in the stream.
    pub width: f64,
    pub height: f64,
}

/// Decoding time-to-sample table (`stts`).
#[derive(Debug, Clone, PartialEq)]
pub struct SttsFields {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<SttsEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SttsEntry {
    pub count: u32,
    pub delta: u32,
}

/// Sample-to-chunk table (`stsc`).
#[derive(Debug, Clone, PartialEq)]
pub struct StscFields {
    pub version: u8,
    pub flags: u32,
    pub entries: Vec<StscEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StscEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
}

/// Media header (`mdhd`).
#[derive(Debug, Clone, PartialEq)]
pub struct MdhdFields {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64,
    pub modification_time: u64,
    pub time_scale: u32,
    pub duration: u64,
    /// ISO-639-2/T code unpacked from the 15-bit packed form.
    pub language: String,
}

/// Handler reference (`hdlr`).
#[derive(Debug, Clone, PartialEq)]
pub struct HdlrFields {
    pub version: u8,
    pub flags: u32,
    pub handler_type: FourCC,
    pub name: String,
}

/// File type (`ftyp`).
#[derive(Debug, Clone, PartialEq)]
pub struct FtypFields {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

/// A field's display value, as enumerated for the inspection exporter.
///
/// Table entries carry preformatted per-row summaries. Only the two sample
/// table row shapes get summaries; other array fields (e.g. the transform
/// matrix) report their length with no rows.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(String),
    Table { len: usize, entries: Vec<String> },
}

impl BoxFields {
    /// Ordered `(name, value)` pairs for display, one per decoded field.
    ///
    /// Explicit per-variant enumeration; there is deliberately no reflection
    /// over struct fields.
    pub fn entries(&self) -> Vec<(&'static str, FieldValue)> {
        use FieldValue::{Scalar, Table};
        match self {
            BoxFields::Mvhd(f) => vec![
                ("version", Scalar(f.version.to_string())),
                ("flags", Scalar(f.flags.to_string())),
                ("creation_time", Scalar(f.creation_time.to_string())),
                ("modification_time", Scalar(f.modification_time.to_string())),
                ("time_scale", Scalar(f.time_scale.to_string())),
                ("duration", Scalar(f.duration.to_string())),
                ("rate", Scalar(f.rate.to_string())),
                ("volume", Scalar(f.volume.to_string())),
                ("matrix", Table { len: f.matrix.len(), entries: Vec::new() }),
                ("next_track_id", Scalar(f.next_track_id.to_string())),
            ],
            BoxFields::Tkhd(f) => vec![
                ("version", Scalar(f.version.to_string())),
                ("flags", Scalar(f.flags.to_string())),
                ("creation_time", Scalar(f.creation_time.to_string())),
                ("modification_time", Scalar(f.modification_time.to_string())),
                ("track_id", Scalar(f.track_id.to_string())),
                ("duration", Scalar(f.duration.to_string())),
                ("layer", Scalar(f.layer.to_string())),
                ("alternate_group", Scalar(f.alternate_group.to_string())),
                ("volume", Scalar(f.volume.to_string())),
                ("matrix", Table { len: f.matrix.len(), entries: Vec::new() }),
                ("width", Scalar(f.width.to_string())),
                ("height", Scalar(f.height.to_string())),
            ],
            BoxFields::Stts(f) => vec![
                ("version", Scalar(f.version.to_string())),
                ("flags", Scalar(f.flags.to_string())),
                (
                    "entries",
                    Table {
                        len: f.entries.len(),
                        entries: f
                            .entries
                            .iter()
                            .map(|e| format!("count: {} delta: {}", e.count, e.delta))
                            .collect(),
                    },
                ),
            ],
            BoxFields::Stsc(f) => vec![
                ("version", Scalar(f.version.to_string())),
                ("flags", Scalar(f.flags.to_string())),
                (
                    "entries",
                    Table {
                        len: f.entries.len(),
                        entries: f
                            .entries
                            .iter()
                            .map(|e| {
                                format!(
                                    "first_chunk: {} samples_per_chunk: {} sample_description_index: {}",
                                    e.first_chunk, e.samples_per_chunk, e.sample_description_index
                                )
                            })
                            .collect(),
                    },
                ),
            ],
            BoxFields::Mdhd(f) => vec![
                ("version", Scalar(f.version.to_string())),
                ("flags", Scalar(f.flags.to_string())),
                ("creation_time", Scalar(f.creation_time.to_string())),
                ("modification_time", Scalar(f.modification_time.to_string())),
                ("time_scale", Scalar(f.time_scale.to_string())),
                ("duration", Scalar(f.duration.to_string())),
                ("language", Scalar(f.language.clone())),
            ],
            BoxFields::Hdlr(f) => vec![
                ("version", Scalar(f.version.to_string())),
                ("flags", Scalar(f.flags.to_string())),
                ("handler_type", Scalar(f.handler_type.to_string())),
                ("name", Scalar(f.name.clone())),
            ],
            BoxFields::Ftyp(f) => vec![
                ("major_brand", Scalar(f.major_brand.to_string())),
                ("minor_version", Scalar(f.minor_version.to_string())),
                (
                    "compatible_brands",
                    Scalar(
                        f.compatible_brands
                            .iter()
                            .map(|b| b.to_string())
                            .collect::<Vec<_>>()
                            .join(","),
                    ),
                ),
            ],
            BoxFields::Container | BoxFields::Opaque => Vec::new(),
        }
    }
}

/// Decoder for one box type's payload.
///
/// The view passed in covers exactly the box payload; over- or under-reading
/// never affects the enclosing parse, which advances by the declared size.
pub trait FieldDecoder: Send + Sync {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError>;
}

/// Registry of decoders keyed by box type.
///
/// Immutable once constructed; build it fluently with
/// [`Registry::with_decoder`]. New box types plug in here without touching the
/// recursion logic in the parser.
pub struct Registry {
    map: HashMap<FourCC, Box<dyn FieldDecoder>>,
}

impl Registry {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    pub fn with_decoder(mut self, typ: FourCC, dec: Box<dyn FieldDecoder>) -> Self {
        self.map.insert(typ, dec);
        self
    }

    /// Decode a box payload, or `None` if no decoder is registered for `typ`.
    pub fn decode(
        &self,
        typ: FourCC,
        view: &mut View<'_>,
    ) -> Option<Result<BoxFields, ParseError>> {
        self.map.get(&typ).map(|d| d.decode(view))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------- Helpers ----------

fn read_version_flags(view: &mut View<'_>) -> Result<(u8, u32), ParseError> {
    let version = view.read_u8()?;
    let f = view.read_exact(3)?;
    let flags = ((f[0] as u32) << 16) | ((f[1] as u32) << 8) | (f[2] as u32);
    Ok((version, flags))
}

fn read_matrix(view: &mut View<'_>) -> Result<[u32; 9], ParseError> {
    let mut m = [0u32; 9];
    for cell in &mut m {
        *cell = view.read_u32()?;
    }
    Ok(m)
}

fn lang_from_u16(code: u16) -> String {
    if code == 0 {
        return "und".to_string();
    }
    let c1 = ((code >> 10) & 0x1F) as u8 + 0x60;
    let c2 = ((code >> 5) & 0x1F) as u8 + 0x60;
    let c3 = (code & 0x1F) as u8 + 0x60;
    format!("{}{}{}", c1 as char, c2 as char, c3 as char)
}

// ---------- Decoders ----------

pub struct MvhdDecoder;

impl FieldDecoder for MvhdDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let (version, flags) = read_version_flags(view)?;

        let (creation_time, modification_time, time_scale, duration) = if version == 1 {
            (view.read_u64()?, view.read_u64()?, view.read_u32()?, view.read_u64()?)
        } else {
            (
                view.read_u32()? as u64,
                view.read_u32()? as u64,
                view.read_u32()?,
                view.read_u32()? as u64,
            )
        };

        let rate = view.read_u32()? as f64 / 65536.0;
        let volume = view.read_u16()? as f64 / 256.0;
        // reserved u16 + 2 * u32
        view.skip(10)?;
        let matrix = read_matrix(view)?;
        // pre_defined: 6 * u32
        view.skip(24)?;
        let next_track_id = view.read_u32()?;

        Ok(BoxFields::Mvhd(MvhdFields {
            version,
            flags,
            creation_time,
            modification_time,
            time_scale,
            duration,
            rate,
            volume,
            matrix,
            next_track_id,
        }))
    }
}

pub struct TkhdDecoder;

impl FieldDecoder for TkhdDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let (version, flags) = read_version_flags(view)?;

        let (creation_time, modification_time, track_id, duration) = if version == 1 {
            let c = view.read_u64()?;
            let m = view.read_u64()?;
            let id = view.read_u32()?;
            view.skip(4)?; // reserved
            (c, m, id, view.read_u64()?)
        } else {
            let c = view.read_u32()? as u64;
            let m = view.read_u32()? as u64;
            let id = view.read_u32()?;
            view.skip(4)?; // reserved
            (c, m, id, view.read_u32()? as u64)
        };

        // reserved: 2 * u32
        view.skip(8)?;
        let layer = view.read_u16()? as i16;
        let alternate_group = view.read_u16()? as i16;
        let volume = view.read_u16()? as f64 / 256.0;
        view.skip(2)?; // reserved
        let matrix = read_matrix(view)?;
        let width = view.read_u32()? as f64 / 65536.0;
        let height = view.read_u32()? as f64 / 65536.0;

        Ok(BoxFields::Tkhd(TkhdFields {
            version,
            flags,
            creation_time,
            modification_time,
            track_id,
            duration,
            layer,
            alternate_group,
            volume,
            matrix,
            width,
            height,
        }))
    }
}

pub struct SttsDecoder;

impl FieldDecoder for SttsDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let (version, flags) = read_version_flags(view)?;
        let entry_count = view.read_u32()?;

        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(SttsEntry {
                count: view.read_u32()?,
                delta: view.read_u32()?,
            });
        }

        Ok(BoxFields::Stts(SttsFields { version, flags, entries }))
    }
}

pub struct StscDecoder;

impl FieldDecoder for StscDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let (version, flags) = read_version_flags(view)?;
        let entry_count = view.read_u32()?;

        let mut entries = Vec::new();
        for _ in 0..entry_count {
            entries.push(StscEntry {
                first_chunk: view.read_u32()?,
                samples_per_chunk: view.read_u32()?,
                sample_description_index: view.read_u32()?,
            });
        }

        Ok(BoxFields::Stsc(StscFields { version, flags, entries }))
    }
}

pub struct MdhdDecoder;

impl FieldDecoder for MdhdDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let (version, flags) = read_version_flags(view)?;

        let (creation_time, modification_time, time_scale, duration) = if version == 1 {
            (view.read_u64()?, view.read_u64()?, view.read_u32()?, view.read_u64()?)
        } else {
            (
                view.read_u32()? as u64,
                view.read_u32()? as u64,
                view.read_u32()?,
                view.read_u32()? as u64,
            )
        };

        let language = lang_from_u16(view.read_u16()?);

        Ok(BoxFields::Mdhd(MdhdFields {
            version,
            flags,
            creation_time,
            modification_time,
            time_scale,
            duration,
            language,
        }))
    }
}

pub struct HdlrDecoder;

impl FieldDecoder for HdlrDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let (version, flags) = read_version_flags(view)?;

        view.skip(4)?; // pre_defined
        let handler_type = view.read_fourcc()?;
        view.skip(12)?; // reserved

        // name: rest of the payload, trailing NULs stripped
        let mut name_bytes = view.read_exact(view.remaining())?.to_vec();
        while name_bytes.last() == Some(&0) {
            name_bytes.pop();
        }
        let name = String::from_utf8_lossy(&name_bytes).to_string();

        Ok(BoxFields::Hdlr(HdlrFields { version, flags, handler_type, name }))
    }
}

pub struct FtypDecoder;

impl FieldDecoder for FtypDecoder {
    fn decode(&self, view: &mut View<'_>) -> Result<BoxFields, ParseError> {
        let major_brand = view.read_fourcc()?;
        let minor_version = view.read_u32()?;

        let mut compatible_brands = Vec::new();
        while view.remaining() >= 4 {
            compatible_brands.push(view.read_fourcc()?);
        }

        Ok(BoxFields::Ftyp(FtypFields { major_brand, minor_version, compatible_brands }))
    }
}

/// Registry with the box types this crate decodes out of the box.
pub fn default_registry() -> Registry {
    Registry::new()
        .with_decoder(FourCC(*b"ftyp"), Box::new(FtypDecoder))
        .with_decoder(FourCC(*b"mvhd"), Box::new(MvhdDecoder))
        .with_decoder(FourCC(*b"tkhd"), Box::new(TkhdDecoder))
        .with_decoder(FourCC(*b"mdhd"), Box::new(MdhdDecoder))
        .with_decoder(FourCC(*b"hdlr"), Box::new(HdlrDecoder))
        .with_decoder(FourCC(*b"stts"), Box::new(SttsDecoder))
        .with_decoder(FourCC(*b"stsc"), Box::new(StscDecoder))
}
