use mp4tree::{InspectNode, export_inspection_tree, parse};

fn boxed(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

fn stsc_box(entries: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut p = vec![0u8; 4]; // version + flags
    p.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for &(first_chunk, samples_per_chunk, sample_description_index) in entries {
        p.extend_from_slice(&first_chunk.to_be_bytes());
        p.extend_from_slice(&samples_per_chunk.to_be_bytes());
        p.extend_from_slice(&sample_description_index.to_be_bytes());
    }
    boxed(b"stsc", &p)
}

fn stts_box(entries: &[(u32, u32)]) -> Vec<u8> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for &(count, delta) in entries {
        p.extend_from_slice(&count.to_be_bytes());
        p.extend_from_slice(&delta.to_be_bytes());
    }
    boxed(b"stts", &p)
}

fn child<'a>(node: &'a InspectNode, label: &str) -> &'a InspectNode {
    node.children
        .iter()
        .find(|c| c.label == label)
        .unwrap_or_else(|| panic!("no child labeled {label:?} under {:?}", node.label))
}

#[test]
fn stsc_rows_are_summarized_in_order() {
    let buf = stsc_box(&[(1, 10, 1), (5, 8, 1)]);
    let tree = parse(&buf).unwrap();

    let root = export_inspection_tree(&tree);
    assert_eq!(root.label, "Box - isom");

    let stsc = &root.children[1]; // after the root's own size child
    assert_eq!(stsc.label, "Box - stsc");

    let entries = child(stsc, "entries:2 entries");
    let labels: Vec<&str> = entries.children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "0 - first_chunk: 1 samples_per_chunk: 10 sample_description_index: 1",
            "1 - first_chunk: 5 samples_per_chunk: 8 sample_description_index: 1",
        ]
    );
}

#[test]
fn stts_rows_show_count_and_delta() {
    let buf = stts_box(&[(100, 1024), (1, 512)]);
    let tree = parse(&buf).unwrap();

    let root = export_inspection_tree(&tree);
    let stts = &root.children[1];
    assert_eq!(stts.label, "Box - stts");
    assert_eq!(child(stts, "version:0").children.len(), 0);

    let entries = child(stts, "entries:2 entries");
    assert_eq!(entries.children[0].label, "0 - count: 100 delta: 1024");
    assert_eq!(entries.children[1].label, "1 - count: 1 delta: 512");
}

#[test]
fn every_box_reports_its_size() {
    let buf = stsc_box(&[(1, 10, 1)]);
    let tree = parse(&buf).unwrap();

    let root = export_inspection_tree(&tree);
    assert_eq!(root.children[0].label, format!("size:{}", buf.len()));
    assert_eq!(root.children[1].children[0].label, format!("size:{}", buf.len()));
}

#[test]
fn unknown_box_exports_type_and_size_only() {
    let buf = boxed(b"wxyz", &[1, 2, 3]);
    let tree = parse(&buf).unwrap();

    let root = export_inspection_tree(&tree);
    let unknown = &root.children[1];
    assert_eq!(unknown.label, "Box - wxyz");
    let labels: Vec<&str> = unknown.children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["size:11"]);
}

#[test]
fn uuid_box_exports_extended_type_as_hex() {
    let ext = [0xAAu8; 16];
    let mut buf = Vec::new();
    buf.extend_from_slice(&(8u32 + 16).to_be_bytes());
    buf.extend_from_slice(b"uuid");
    buf.extend_from_slice(&ext);

    let tree = parse(&buf).unwrap();
    let root = export_inspection_tree(&tree);
    let uuid = &root.children[1];
    assert_eq!(
        uuid.children[1].label,
        format!("extended_type:{}", "aa".repeat(16))
    );
}

#[test]
fn matrix_reports_length_without_rows() {
    // unrecognized row shapes get no per-row summaries
    let mut p = vec![0u8; 4];
    p.extend_from_slice(&[0u8; 8]); // creation + modification
    p.extend_from_slice(&600u32.to_be_bytes());
    p.extend_from_slice(&5400u32.to_be_bytes());
    p.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    p.extend_from_slice(&0x0100u16.to_be_bytes());
    p.extend_from_slice(&[0u8; 10]);
    p.extend_from_slice(&[0u8; 36]); // matrix
    p.extend_from_slice(&[0u8; 24]);
    p.extend_from_slice(&2u32.to_be_bytes());
    let buf = boxed(b"mvhd", &p);

    let tree = parse(&buf).unwrap();
    let root = export_inspection_tree(&tree);
    let mvhd = &root.children[1];

    assert_eq!(child(mvhd, "time_scale:600").children.len(), 0);
    assert_eq!(child(mvhd, "duration:5400").children.len(), 0);
    let matrix = child(mvhd, "matrix:9 entries");
    assert!(matrix.children.is_empty());
}

#[test]
fn nested_boxes_export_nested_nodes() {
    let tkhd_sized = {
        // minimal valid tkhd v0 payload
        let mut p = vec![0u8; 4];
        p.extend_from_slice(&[0u8; 8]);
        p.extend_from_slice(&1u32.to_be_bytes());
        p.extend_from_slice(&[0u8; 4]);
        p.extend_from_slice(&5400u32.to_be_bytes());
        p.extend_from_slice(&[0u8; 16]);
        p.extend_from_slice(&[0u8; 36]);
        p.extend_from_slice(&(1920u32 << 16).to_be_bytes());
        p.extend_from_slice(&(1080u32 << 16).to_be_bytes());
        boxed(b"tkhd", &p)
    };
    let buf = boxed(b"moov", &boxed(b"trak", &tkhd_sized));

    let tree = parse(&buf).unwrap();
    let root = export_inspection_tree(&tree);

    let moov = &root.children[1];
    assert_eq!(moov.label, "Box - moov");
    let trak = &moov.children[1];
    assert_eq!(trak.label, "Box - trak");
    let tkhd = &trak.children[1];
    assert_eq!(tkhd.label, "Box - tkhd");
    assert_eq!(child(tkhd, "width:1920").children.len(), 0);
    assert_eq!(child(tkhd, "height:1080").children.len(), 0);
}

#[test]
fn inspection_tree_serializes_to_json() {
    let buf = stsc_box(&[(1, 10, 1)]);
    let tree = parse(&buf).unwrap();
    let root = export_inspection_tree(&tree);

    let json = root.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["label"], "Box - isom");
    assert_eq!(value["children"][1]["label"], "Box - stsc");
    // leaf nodes omit the children key entirely
    assert!(value["children"][0].get("children").is_none());
}
