mod common;

use std::fs;

use common::{
    ATTR_COMMENT, ATTR_SCALE_I, ATTR_SCALE_X, ATTR_SCALE_Y, ATTR_TIME, CurrentFile, legacy_image,
    legacy_imx,
};
use ndarray::arr2;
use pivfile_core::{
    BufferFormat, PivError, ReaderKind, ScaleAxis, disabled_vectors, inspect_file, pivmat_field,
    read,
};

fn vector_3d() -> CurrentFile {
    // nx = 2, ny = 2; blocks vx, vy, vz stored row by row
    CurrentFile::new(4, 0, 2, 2)
        .floats(&[1.0, 2.0, 3.0, 4.0])
        .floats(&[5.0, 6.0, 7.0, 8.0])
        .floats(&[0.5, 0.5, 0.5, 0.5])
        .scale(ATTR_SCALE_X, "0.5 10\nmm\nx\n")
        .scale(ATTR_SCALE_Y, "0.5 0\nmm\ny\n")
        .scale(ATTR_SCALE_I, "2 0\nm/s\nvelocity\n")
        .attribute("Camera", "1")
        .item(ATTR_TIME, b"12:00:00\0")
}

fn extended_2d() -> CurrentFile {
    // nx = 2, ny = 1, nine blocks: selector, then four (vx, vy) pairs
    let mut values = vec![0.0f32; 18];
    values[0] = 0.0;
    values[1] = 2.0;
    values[2..4].copy_from_slice(&[7.0, 7.0]);
    values[7] = 3.0;
    values[9] = 4.0;
    CurrentFile::new(1, 0, 2, 1)
        .floats(&values)
        .scale(ATTR_SCALE_X, "1 0\npixel\nx\n")
        .scale(ATTR_SCALE_Y, "1 0\npixel\ny\n")
        .scale(ATTR_SCALE_I, "1 0\npixel\nvelocity\n")
}

#[test]
fn vector_3d_file_decodes_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = vector_3d().write_to(dir.path(), "B00001.vc7");

    let (mut buffer, attributes) = read(&path).unwrap();
    assert_eq!(buffer.reader_kind().unwrap(), ReaderKind::Current);
    assert_eq!(buffer.buffer_format().unwrap(), BufferFormat::Vector3d);
    assert_eq!(attributes["Camera"], "1");
    assert_eq!(attributes["_TIME"], "12:00:00");
    assert!(buffer.missing_scales().unwrap().is_empty());

    let dims = buffer.dimensions().unwrap();
    assert_eq!((dims.nx, dims.ny), (2, 2));
    assert_eq!(dims.total_lines, 6);
    assert_eq!(buffer.block_count().unwrap(), 3);

    assert_eq!(buffer.x().unwrap().to_vec(), vec![10.25, 10.75]);
    assert_eq!(buffer.y().unwrap().to_vec(), vec![0.25, 0.75]);
    assert_eq!(buffer.z().unwrap(), 0.0);

    let vx = buffer.vx().unwrap();
    assert_eq!(vx.shape(), &[2, 2]);
    assert_eq!(vx[[0, 1]], 6.0);
    assert_eq!(vx[[1, 0]], 4.0);
    assert_eq!(buffer.vy().unwrap()[[1, 1]], 16.0);
    assert_eq!(buffer.vz().unwrap()[[0, 0]], 1.0);
    let expected = (2.0f64 * 2.0 + 10.0 * 10.0 + 1.0).sqrt();
    assert!((buffer.vmag().unwrap()[[0, 0]] - expected).abs() < 1e-12);
    assert!(buffer.peak().unwrap().is_none());

    buffer.release().unwrap();
}

#[test]
fn inverted_y_scale_flips_field_and_positions() {
    let dir = tempfile::tempdir().unwrap();
    let path = CurrentFile::new(2, 0, 1, 2)
        .floats(&[1.0, 2.0, 10.0, 20.0])
        .scale(ATTR_SCALE_Y, "-1 0\nmm\ny\n")
        .write_to(dir.path(), "flip.vc7");

    let (mut buffer, _) = read(&path).unwrap();
    assert_eq!(buffer.y().unwrap().to_vec(), vec![-1.5, -0.5]);
    assert_eq!(buffer.vx().unwrap().row(0).to_vec(), vec![2.0, 1.0]);
    assert_eq!(buffer.vy().unwrap().row(0).to_vec(), vec![-20.0, -10.0]);
    assert_eq!(
        buffer.missing_scales().unwrap(),
        &[ScaleAxis::X, ScaleAxis::I]
    );
}

#[test]
fn zlib_word_image_exposes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = CurrentFile::new(-4, 2, 3, 2)
        .words(&[1, 2, 3, 4, 5, 6])
        .deflate()
        .item(ATTR_COMMENT, b"calibration\0")
        .write_to(dir.path(), "frame.im7");

    let (mut buffer, attributes) = read(&path).unwrap();
    assert_eq!(buffer.buffer_format().unwrap(), BufferFormat::Word);
    assert_eq!(attributes["_COMMENT"], "calibration");
    assert_eq!(buffer.missing_scales().unwrap().len(), 3);
    assert_eq!(buffer.scales().unwrap().i.unit, "counts");

    let frame = buffer.frame(0).unwrap();
    assert_eq!(frame.row(1).to_vec(), vec![4.0, 5.0, 6.0]);
    let err = buffer.frame(1).unwrap_err();
    assert!(matches!(err, PivError::FrameOutOfRange { index: 1, frames: 1 }));
}

#[test]
fn legacy_image_takes_scales_from_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.imx");
    fs::write(&path, legacy_image(2, 3, &[0, 1, 2, 3, 4, 5])).unwrap();

    let (mut buffer, attributes) = read(&path).unwrap();
    assert!(attributes.is_empty());
    assert_eq!(buffer.reader_kind().unwrap(), ReaderKind::Legacy);
    assert_eq!(buffer.buffer_format().unwrap(), BufferFormat::Image);
    let scales = buffer.scales().unwrap();
    assert_eq!(scales.x.factor, 0.25);
    assert_eq!(scales.x.unit, "mm");
    assert_eq!(scales.x.description, "x");
    assert_eq!(buffer.frame(0).unwrap()[[1, 2]], 5.0);
    assert!(matches!(buffer.vx(), Err(PivError::Format(_))));
}

#[test]
fn released_buffer_rejects_every_access() {
    let dir = tempfile::tempdir().unwrap();
    let path = vector_3d().write_to(dir.path(), "B00002.vc7");

    let (mut buffer, _) = read(&path).unwrap();
    buffer.vx().unwrap();
    buffer.release().unwrap();
    assert!(buffer.is_released());
    assert!(matches!(buffer.vx(), Err(PivError::UseAfterRelease)));
    assert!(matches!(buffer.header(), Err(PivError::UseAfterRelease)));
    assert!(matches!(buffer.release(), Err(PivError::UseAfterRelease)));
}

#[test]
fn filter_masks_disabled_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let path = extended_2d().write_to(dir.path(), "B00003.vc7");

    let (mut buffer, _) = read(&path).unwrap();
    let masked = buffer.filter(disabled_vectors, &[]).unwrap();
    assert_eq!(masked.len(), 3);
    assert_eq!(masked[0].count_valid(), 1);
    assert_eq!(masked[0].get((0, 0)), None);
    assert_eq!(masked[0].get((1, 0)), Some(3.0));
    assert_eq!(masked[1].get((1, 0)), Some(4.0));
}

#[test]
fn filter_rejects_mismatched_extras() {
    let dir = tempfile::tempdir().unwrap();
    let path = extended_2d().write_to(dir.path(), "B00004.vc7");

    let (mut buffer, _) = read(&path).unwrap();
    let extra = ndarray::Array2::<f64>::zeros((3, 3));
    let err = buffer.filter(disabled_vectors, &[extra]).unwrap_err();
    assert!(matches!(err, PivError::Shape { .. }));
}

#[test]
fn inspect_summarizes_vector_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = extended_2d().write_to(dir.path(), "B00005.vc7");

    let summary = inspect_file(&path).unwrap();
    assert_eq!(summary.buffer_format, BufferFormat::Vector2dExtended);
    assert_eq!(summary.block_count, 9);
    assert_eq!(summary.attribute_count, 3);
    assert_eq!(summary.input.bytes, fs::metadata(&path).unwrap().len());
    let field = summary.field.unwrap();
    assert_eq!(field.vectors, 2);
    assert_eq!(field.enabled, 1);
    assert_eq!(field.vmag_max, Some(5.0));
}

#[test]
fn export_writes_null_for_disabled_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let run = dir.path().join("run7");
    fs::create_dir(&run).unwrap();
    let path = extended_2d().write_to(&run, "B00006.vc7");

    let (mut buffer, _) = read(&path).unwrap();
    let field = pivmat_field(&mut buffer, true).unwrap();
    let json = serde_json::to_value(&field).unwrap();
    assert_eq!(json["setname"], "run7");
    assert_eq!(json["unitvx"], "pixel");
    assert_eq!(json["ysign"], "Y axis downward");
    assert!(json["vx"][0][0].is_null());
    assert_eq!(json["vx"][1][0], 3.0);
    assert_eq!(json["choice"][0][1], 2.0);
}

#[test]
fn imx_packed_images_decode() {
    let dir = tempfile::tempdir().unwrap();
    // 2x2 preview, then 100, word 0x1000, -1, then nibbles +2 and -3
    let stream = [2, 2, 9, 9, 9, 9, 100, 0x80, 0x00, 0x10, 0xFF, 0x81, 0x2D];
    let path = CurrentFile::new(-4, 1, 5, 1)
        .raw(&stream)
        .item(ATTR_COMMENT, b"packed\0")
        .write_to(dir.path(), "packed.im7");

    let (mut buffer, attributes) = read(&path).unwrap();
    assert_eq!(attributes["_COMMENT"], "packed");
    assert_eq!(buffer.buffer_format().unwrap(), BufferFormat::Word);
    assert_eq!(
        buffer.frame(0).unwrap().row(0).to_vec(),
        vec![100.0, 4096.0, 4095.0, 4097.0, 4094.0]
    );

    let legacy = dir.path().join("old.imx");
    // word 0x1234, nibble +1, end marker then byte +5, byte -2
    let stream = [0, 0, 0x80, 0x34, 0x12, 0x81, 0x18, 0x05, 0xFE];
    fs::write(&legacy, legacy_imx(2, 2, &stream)).unwrap();
    let (mut buffer, _) = read(&legacy).unwrap();
    assert_eq!(buffer.reader_kind().unwrap(), ReaderKind::Legacy);
    assert_eq!(buffer.scales().unwrap().x.factor, 0.25);
    let frame = buffer.frame(0).unwrap();
    assert_eq!(frame.row(0).to_vec(), vec![4660.0, 4661.0]);
    assert_eq!(frame.row(1).to_vec(), vec![4666.0, 4664.0]);
}

#[test]
fn oversized_header_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = CurrentFile::new(-3, 0, 16384, 16384)
        .floats(&[1.0])
        .write_to(dir.path(), "huge.im7");
    assert_eq!(fs::metadata(&path).unwrap().len(), 260);
    assert!(matches!(read(&path), Err(PivError::Data(_))));
}

#[test]
fn inverted_y_scale_negates_only_vy() {
    let dir = tempfile::tempdir().unwrap();
    let file = |factor: &str| {
        CurrentFile::new(4, 0, 2, 2)
            .floats(&[1.0, 2.0, 3.0, 4.0])
            .floats(&[5.0, 6.0, 7.0, 8.0])
            .floats(&[9.0, 10.0, 11.0, 12.0])
            .scale(ATTR_SCALE_Y, &format!("{factor} 0\nmm\ny\n"))
    };
    let upright = file("1").write_to(dir.path(), "up.vc7");
    let inverted = file("-1").write_to(dir.path(), "down.vc7");

    let (mut buffer, _) = read(&upright).unwrap();
    let field = buffer.field().unwrap();
    assert_eq!(field.vy, arr2(&[[5.0, 7.0], [6.0, 8.0]]));
    assert_eq!(field.vz, arr2(&[[9.0, 11.0], [10.0, 12.0]]));

    let (mut buffer, _) = read(&inverted).unwrap();
    let field = buffer.field().unwrap();
    assert_eq!(field.vx, arr2(&[[3.0, 1.0], [4.0, 2.0]]));
    assert_eq!(field.vy, arr2(&[[-7.0, -5.0], [-8.0, -6.0]]));
    assert_eq!(field.vz, arr2(&[[11.0, 9.0], [12.0, 10.0]]));
}

#[test]
fn constant_3d_blocks_give_uniform_magnitude() {
    let dir = tempfile::tempdir().unwrap();
    let path = CurrentFile::new(4, 0, 4, 4)
        .floats(&[1.0; 16])
        .floats(&[2.0; 16])
        .floats(&[3.0; 16])
        .write_to(dir.path(), "B00010.vc7");

    let (mut buffer, _) = read(&path).unwrap();
    assert_eq!(buffer.dimensions().unwrap().total_lines, 12);
    let field = buffer.field().unwrap();
    assert_eq!(field.vmag.shape(), &[4, 4]);
    let expected = 14.0f64.sqrt();
    assert!(field.vmag.iter().all(|v| (v - expected).abs() < 1e-12));
    assert!(field.vz.iter().all(|&v| v == 3.0));
}

#[test]
fn truncated_data_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = CurrentFile::new(-4, 0, 4, 4)
        .words(&[0; 3])
        .write_to(dir.path(), "short.im7");
    assert!(matches!(read(&path), Err(PivError::Data(_))));
}

#[test]
fn short_header_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.im7");
    fs::write(&path, [0u8; 12]).unwrap();
    assert!(matches!(read(&path), Err(PivError::Header(_))));
    assert!(matches!(
        read(dir.path().join("absent.im7")),
        Err(PivError::FileOpen(_))
    ));
}

#[test]
fn bad_scale_attribute_fails_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = CurrentFile::new(-4, 0, 1, 1)
        .words(&[1])
        .scale(ATTR_SCALE_X, "wide 0\nmm\n")
        .write_to(dir.path(), "scale.im7");
    assert!(matches!(
        read(&path),
        Err(PivError::InvalidScale { .. })
    ));
}
