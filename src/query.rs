//! Semantic lookups over a completed [`BoxTree`].
//!
//! Track classification and video-track selection follow the long-standing
//! `tkhd.volume` heuristic (volume 1.0 = audio, 0 = video). Volume is an audio
//! gain field, not a media-type discriminator, so this can misclassify
//! unusual files; it is kept for compatibility. [`track_handler`] exposes the
//! `hdlr` handler type for callers that want the reliable answer.

use crate::boxes::FourCC;
use crate::fields::{BoxFields, TkhdFields};
use crate::tree::{BoxTree, NodeId};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("required box `{0}` not found")]
    MissingBox(FourCC),
    #[error("box `{typ}` does not carry the expected `{field}` field")]
    MissingField { typ: FourCC, field: &'static str },
}

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// First box of the given type anywhere in the tree, pre-order.
pub fn find_first(tree: &BoxTree, typ: FourCC) -> Option<NodeId> {
    find_first_within(tree, tree.root(), typ)
}

/// First box of the given type below `id` (exclusive), pre-order.
pub fn find_first_within(tree: &BoxTree, id: NodeId, typ: FourCC) -> Option<NodeId> {
    tree.pre_order(id).find(|&n| tree.node(n).typ == typ)
}

/// Movie duration in seconds: `mvhd.duration / mvhd.time_scale`.
pub fn movie_duration(tree: &BoxTree) -> Result<f64> {
    let mvhd = FourCC(*b"mvhd");
    let id = find_first(tree, mvhd).ok_or(QueryError::MissingBox(mvhd))?;
    match &tree.node(id).fields {
        BoxFields::Mvhd(f) => Ok(f.duration as f64 / f.time_scale as f64),
        _ => Err(QueryError::MissingField { typ: mvhd, field: "duration" }),
    }
}

/// Number of `trak` boxes that are immediate children of `moov`.
pub fn track_count(tree: &BoxTree) -> Result<usize> {
    Ok(traks(tree)?.len())
}

/// Classify the `index`-th track (0-based, document order) by the volume
/// heuristic described in the module docs.
pub fn track_type(tree: &BoxTree, index: usize) -> Result<TrackKind> {
    let all = traks(tree)?;
    let trak = all
        .get(index)
        .copied()
        .ok_or(QueryError::MissingBox(FourCC(*b"trak")))?;
    let tkhd = tkhd_of(tree, trak, "volume")?;
    if tkhd.volume == 1.0 {
        Ok(TrackKind::Audio)
    } else {
        Ok(TrackKind::Video)
    }
}

/// Width and height of the first track whose `tkhd.volume == 0`; when no
/// track matches, the last track's header wins (source-compatible fallback).
pub fn resolution(tree: &BoxTree) -> Result<(f64, f64)> {
    let tkhd = select_tkhd(tree, 0.0, "width")?;
    Ok((tkhd.width, tkhd.height))
}

/// Volume of the first track whose `tkhd.volume == 1`; same fallback as
/// [`resolution`].
pub fn volume(tree: &BoxTree) -> Result<f64> {
    Ok(select_tkhd(tree, 1.0, "volume")?.volume)
}

/// Handler type (`hdlr`) of the `index`-th track, e.g. `vide` or `soun`.
pub fn track_handler(tree: &BoxTree, index: usize) -> Result<FourCC> {
    let all = traks(tree)?;
    let trak = all
        .get(index)
        .copied()
        .ok_or(QueryError::MissingBox(FourCC(*b"trak")))?;
    let hdlr = FourCC(*b"hdlr");
    let id = find_first_within(tree, trak, hdlr).ok_or(QueryError::MissingBox(hdlr))?;
    match &tree.node(id).fields {
        BoxFields::Hdlr(f) => Ok(f.handler_type),
        _ => Err(QueryError::MissingField { typ: hdlr, field: "handler_type" }),
    }
}

fn traks(tree: &BoxTree) -> Result<Vec<NodeId>> {
    let moov = FourCC(*b"moov");
    let id = find_first(tree, moov).ok_or(QueryError::MissingBox(moov))?;
    let trak = FourCC(*b"trak");
    Ok(tree.children(id).filter(|&c| tree.node(c).typ == trak).collect())
}

fn tkhd_of<'t>(tree: &'t BoxTree, trak: NodeId, field: &'static str) -> Result<&'t TkhdFields> {
    let tkhd = FourCC(*b"tkhd");
    let id = find_first_within(tree, trak, tkhd).ok_or(QueryError::MissingBox(tkhd))?;
    match &tree.node(id).fields {
        BoxFields::Tkhd(f) => Ok(f),
        _ => Err(QueryError::MissingField { typ: tkhd, field }),
    }
}

/// First track header whose volume equals `wanted`, falling back to the last
/// track examined.
fn select_tkhd<'t>(
    tree: &'t BoxTree,
    wanted: f64,
    field: &'static str,
) -> Result<&'t TkhdFields> {
    let all = traks(tree)?;
    let mut chosen = None;
    for trak in all {
        let tkhd = tkhd_of(tree, trak, field)?;
        chosen = Some(tkhd);
        if tkhd.volume == wanted {
            break;
        }
    }
    chosen.ok_or(QueryError::MissingBox(FourCC(*b"tkhd")))
}
