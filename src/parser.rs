use crate::boxes::{BoxHeader, FourCC};
use crate::fields::{BoxFields, Registry, default_registry};
use crate::tree::{BoxTree, NodeId};
use crate::view::View;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("read of {want} bytes at offset {offset} exceeds window ({remaining} bytes remaining)")]
    OutOfBounds { offset: u64, want: usize, remaining: usize },
    #[error("box `{typ}` at offset {offset}: declared size {size} smaller than its {header_size}-byte header")]
    MalformedBox { typ: FourCC, offset: u64, size: u64, header_size: u64 },
    #[error("box `{typ}` at offset {offset}: declared size {size} exceeds {available} available bytes")]
    TruncatedBox { typ: FourCC, offset: u64, size: u64, available: u64 },
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Box types whose payload is entirely child boxes.
fn is_container(typ: FourCC) -> bool {
    matches!(
        &typ.0,
        b"moov" | b"trak" | b"mdia" | b"minf" | b"stbl" | b"edts" | b"udta"
    )
}

/// Read one box header at the view's current position.
///
/// Handles the 64-bit large-size extension (`size == 1`), the
/// last-box-in-region convention (`size == 0`), and the 16-byte extended type
/// of `uuid` boxes.
pub fn read_box_header(view: &mut View<'_>) -> Result<BoxHeader> {
    let start = view.position();
    let size32 = view.read_u32()?;
    let typ = view.read_fourcc()?;

    let mut size = size32 as u64;
    if size32 == 1 {
        size = view.read_u64()?;
    }

    let mut extended_type = None;
    if &typ.0 == b"uuid" {
        let ext = view.read_exact(16)?;
        let mut u = [0u8; 16];
        u.copy_from_slice(ext);
        extended_type = Some(u);
    }

    let header_size = match (size32 == 1, extended_type.is_some()) {
        (true, true) => 8 + 8 + 16,
        (true, false) => 8 + 8,
        (false, true) => 8 + 16,
        (false, false) => 8,
    } as u64;

    if size != 0 && size < header_size {
        return Err(ParseError::MalformedBox { typ, offset: start, size, header_size });
    }

    Ok(BoxHeader { size, typ, extended_type, header_size, start })
}

/// Parse the ISOBMFF box structure of `buf` into an immutable [`BoxTree`]
/// rooted at a synthetic `isom` node.
///
/// Fails fast: on any error the whole call fails and no partial tree is
/// returned.
pub fn parse(buf: &[u8]) -> Result<BoxTree> {
    parse_with_registry(buf, &default_registry())
}

/// [`parse`] with a caller-supplied decoder registry.
pub fn parse_with_registry(buf: &[u8], registry: &Registry) -> Result<BoxTree> {
    let mut tree = BoxTree::new(buf.len() as u64);
    let root = tree.root();
    let mut view = View::new(buf);
    parse_children(&mut view, &mut tree, root, registry)?;
    Ok(tree)
}

/// Decode boxes from `view` until the region is exhausted, appending each to
/// `parent`'s children in document order.
fn parse_children(
    view: &mut View<'_>,
    tree: &mut BoxTree,
    parent: NodeId,
    registry: &Registry,
) -> Result<()> {
    while view.remaining() > 0 {
        let header = read_box_header(view)?;

        // size 0: box runs to the end of the enclosing region
        let body_len = if header.size == 0 {
            view.remaining()
        } else {
            let body = header.size - header.header_size;
            if body > view.remaining() as u64 {
                return Err(ParseError::TruncatedBox {
                    typ: header.typ,
                    offset: header.start,
                    size: header.size,
                    available: header.header_size + view.remaining() as u64,
                });
            }
            body as usize
        };

        let body_start = view.len() - view.remaining();
        let mut payload = view.subview(body_start, body_len)?;
        // advance past the whole box regardless of what the decoder consumes
        view.skip(body_len)?;

        let total_size = header.header_size + body_len as u64;

        if is_container(header.typ) {
            let id = tree.push(
                parent,
                header.typ,
                total_size,
                header.extended_type,
                BoxFields::Container,
            );
            parse_children(&mut payload, tree, id, registry)?;
        } else {
            let fields = match registry.decode(header.typ, &mut payload) {
                Some(result) => result?,
                None => BoxFields::Opaque,
            };
            tree.push(parent, header.typ, total_size, header.extended_type, fields);
        }
    }
    Ok(())
}
