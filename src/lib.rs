//! Minimal MP4/ISOBMFF box tree parser.
//!
//! Parses an in-memory byte buffer into an immutable tree of boxes, answers
//! semantic questions over it (duration, track count, track type, resolution,
//! volume), and exports a labeled node tree for inspection UIs.
//!
//! ```no_run
//! let data: Vec<u8> = std::fs::read("video.mp4").unwrap();
//! let tree = mp4tree::parse(&data).unwrap();
//! println!("duration: {}s", mp4tree::movie_duration(&tree).unwrap());
//! println!("{}", mp4tree::export_inspection_tree(&tree).to_json().unwrap());
//! ```

pub mod boxes;
pub mod fields;
pub mod inspect;
pub mod parser;
pub mod query;
pub mod tree;
pub mod view;

pub use boxes::{BoxHeader, FourCC};
pub use fields::{BoxFields, FieldValue, Registry, default_registry};
pub use inspect::{InspectNode, export_inspection_tree};
pub use parser::{ParseError, parse, parse_with_registry, read_box_header};
pub use query::{
    QueryError, TrackKind, find_first, find_first_within, movie_duration, resolution,
    track_count, track_handler, track_type, volume,
};
pub use tree::{BoxNode, BoxTree, NodeId};
pub use view::View;
