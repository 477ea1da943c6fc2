//! Corrupted inputs must fail with the right error category, never panic.

use plyformat::{
    from_bytes, read, to_bytes, write, Document, Element, ElementMap, Error, Location,
    PropertyDecl, ScalarKind, Vertices, WriteOptions,
};

const TRIANGLE: &str = include_str!("data/triangle.ply");

fn tetrahedron(options: &WriteOptions) -> Vec<u8> {
    let vertices = Element::builder()
        .scalar("x", [0.0f32, 1.0, 0.0, 0.0])
        .scalar("y", [0.0f32, 0.0, 1.0, 0.0])
        .scalar("z", [0.0f32, 0.0, 0.0, 1.0])
        .scalar("red", [255u8, 0, 0, 255])
        .scalar("green", [0u8, 255, 0, 255])
        .scalar("blue", [0u8, 0, 255, 255])
        .build()
        .unwrap();
    let faces = vec![[0i32, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
    let mut buf = Vec::new();
    write(&mut buf, vertices, faces, ElementMap::new(), options).unwrap();
    buf
}

fn data_start(bytes: &[u8]) -> usize {
    let marker = b"end_header\n";
    bytes
        .windows(marker.len())
        .position(|w| w == marker)
        .unwrap()
        + marker.len()
}

#[test]
fn test_header_errors() {
    let cases = [
        ("ply", "pl"),
        ("format", "Format"),
        ("ascii", "asci"),
        ("comment", "comments"),
        ("element", "property"),
        ("property", "prop"),
        ("float", "decimal"),
        ("int", "number"),
        ("list", "lost"),
        ("list", ""),
        ("end_header", ""),
    ];
    for (correct, wrong) in cases {
        let ply = TRIANGLE.replace(correct, wrong);
        let err = read(ply.as_bytes()).unwrap_err();
        assert!(
            err.is_header_syntax(),
            "replacing {:?} with {:?} gave {:?}",
            correct,
            wrong,
            err
        );
    }
}

#[test]
fn test_header_error_location() {
    let ply = TRIANGLE.replace("property float y", "property float 9y");
    match read(ply.as_bytes()).unwrap_err() {
        Error::HeaderSyntax { line, context, .. } => {
            assert_eq!(line, 6);
            assert_eq!(context, "property float 9y");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_truncated_header() {
    let (head, _) = TRIANGLE.split_at(TRIANGLE.find("end_header").unwrap());
    assert!(read(head.as_bytes()).unwrap_err().is_unexpected_eof());
    assert!(read(&b""[..]).unwrap_err().is_unexpected_eof());
}

#[test]
fn test_ascii_data_errors() {
    let (header, body) = TRIANGLE.split_at(TRIANGLE.find("end_header").unwrap() + "end_header".len());
    let cases = [
        (" 0 ", " 0 0 "),
        (" 0 ", " "),
        (" 0 ", " z "),
        ("\n", "\n1 2 3\n"),
        ("0 0 0\n", ""),
    ];
    for (correct, wrong) in cases {
        let ply = format!("{}{}", header, body.replace(correct, wrong));
        let err = read(ply.as_bytes()).unwrap_err();
        assert!(
            err.is_data_format(),
            "replacing {:?} with {:?} gave {:?}",
            correct,
            wrong,
            err
        );
    }

    // a missing face row ends the stream inside an element with lists
    let ply = format!("{}{}", header, body.replace("3 0 1 2\n", ""));
    assert!(read(ply.as_bytes()).unwrap_err().is_unexpected_eof());
}

#[test]
fn test_missing_vertex_row_is_a_format_error() {
    let ply = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nend_header\n1\n2\n";
    match read(ply.as_bytes()).unwrap_err() {
        Error::DataFormat { location, .. } => assert_eq!(location, Location::Line(8)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_trailing_ascii_data() {
    let ply = format!("{}4 4 4\n", TRIANGLE);
    assert!(read(ply.as_bytes()).unwrap_err().is_data_format());
}

#[test]
fn test_binary_truncation() {
    let ply = tetrahedron(&WriteOptions::binary_little_endian());
    let index = data_start(&ply) + 9;
    let mut cut = ply[..index].to_vec();
    cut.extend_from_slice(&ply[index + 25..]);
    assert!(read(cut.as_slice()).unwrap_err().is_unexpected_eof());

    for options in [
        WriteOptions::binary_little_endian(),
        WriteOptions::binary_big_endian(),
    ] {
        let ply = tetrahedron(&options);
        let start = data_start(&ply);
        for len in [start + 1, ply.len() - 1] {
            let err = read(&ply[..len]).unwrap_err();
            match err {
                Error::UnexpectedEof { location: Location::Offset(_), .. } => {}
                other => panic!("truncated at {} gave {:?}", len, other),
            }
        }
    }
}

#[test]
fn test_binary_trailing_byte() {
    let mut ply = tetrahedron(&WriteOptions::binary_little_endian());
    let end = ply.len() as u64;
    ply.push(b'x');
    match read(ply.as_slice()).unwrap_err() {
        Error::DataFormat { location, .. } => assert_eq!(location, Location::Offset(end)),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_binary_element_without_properties_is_bounded() {
    for count in ["1000000000000000", "18446744073709551615"] {
        let header = format!(
            "ply\nformat binary_little_endian 1.0\nelement e {}\nend_header\n",
            count
        );
        match from_bytes(header.as_bytes()).unwrap_err() {
            Error::DataFormat { location, .. } => {
                assert_eq!(location, Location::Offset(header.len() as u64))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
    let empty_rows = from_bytes(b"ply\nformat binary_little_endian 1.0\nelement e 3\nend_header\n")
        .unwrap();
    assert_eq!(empty_rows.get("e").map(Element::len), Some(3));
}

#[test]
fn test_plus_signed_integers_are_rejected() {
    let err = from_bytes(b"ply\nformat ascii 1.0\nelement v +5\nproperty int a\nend_header\n")
        .unwrap_err();
    assert!(err.is_header_syntax(), "{:?}", err);

    let err = from_bytes(b"ply\nformat ascii 1.0\nelement v 1\nproperty int a\nend_header\n+5\n")
        .unwrap_err();
    assert!(err.is_data_format(), "{:?}", err);

    let document =
        from_bytes(b"ply\nformat ascii 1.0\nelement v 1\nproperty float a\nend_header\n+5\n")
            .unwrap();
    assert_eq!(document.get("v").and_then(|v| v.scalars::<f32>("a")), Some(vec![5.0]));
}

#[test]
fn test_write_errors() {
    let mut others = ElementMap::new();
    others.insert("vertex", Element::default());
    let err = write(Vec::new(), Vertices::default(), Vec::<Vec<i32>>::new(), others, &WriteOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidElementName(_)));

    let err = Element::new(
        vec![PropertyDecl::scalar("x", ScalarKind::Float32)],
        vec![vec![]],
    )
    .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { row: 0, .. }));

    let mut document = Document::new();
    document.elements.insert("not valid", Element::default());
    let err = to_bytes(&document, &WriteOptions::binary_little_endian()).unwrap_err();
    assert!(matches!(err, Error::InvalidElementName(_)));
}

#[test]
fn test_io_errors_are_reported() {
    struct Broken;

    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = write(Broken, Vertices::default(), Vec::<Vec<i32>>::new(), ElementMap::new(), &WriteOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::Io(msg) if msg.contains("disk full")));
}

#[test]
fn test_error_messages_name_the_location() {
    let err = from_bytes(b"ply\nformat ascii 1.0\nelement v 1\nproperty int a\nend_header\nx\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line 6"), "{}", message);
}
