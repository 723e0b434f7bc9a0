use image::{DynamicImage, Luma, Rgb, RgbImage};
use pretty_assertions::assert_eq;
use ql_raster::{convert, Error, Options, Printer, ProfileRegistry, Rotate};

const PRINT_INFORMATION: [u8; 3] = [0x1B, 0x69, 0x7A];

fn white(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

/// Horizontal and vertical gray ramps mixed, so every row differs.
fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(image::ImageBuffer::from_fn(width, height, |x, y| {
        Luma([((x * 3 + y * 7) % 256) as u8])
    }))
}

/// Offset of the first `ESC i z`, i.e. the length of the job preamble.
fn prefix_len(data: &[u8]) -> usize {
    data.windows(3)
        .position(|w| w == PRINT_INFORMATION)
        .unwrap()
}

/// Raster lines as `(command, plane, payload)`, walking from `start` up to the
/// final print command.
fn raster_lines(data: &[u8], start: usize) -> Vec<(u8, u8, Vec<u8>)> {
    let mut lines = Vec::new();
    let mut i = start;
    while data[i] == b'g' || data[i] == b'w' {
        let len = data[i + 2] as usize;
        lines.push((data[i], data[i + 1], data[i + 3..i + 3 + len].to_vec()));
        i += 3 + len;
    }
    lines
}

fn unpack_bits(packed: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < packed.len() {
        let header = packed[i] as i8;
        if header >= 0 {
            let n = header as usize + 1;
            out.extend_from_slice(&packed[i + 1..i + 1 + n]);
            i += 1 + n;
        } else {
            out.extend(std::iter::repeat(packed[i + 1]).take((1 - header as i32) as usize));
            i += 2;
        }
    }
    out
}

fn is_set(line: &[u8], column: u32) -> bool {
    let bit = (line.len() as u32 * 8 - 1 - column) as usize;
    line[bit / 8] & (0x80 >> (bit % 8)) != 0
}

#[test]
fn white_square_on_ql810w() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-810W").unwrap();
    let data = printer
        .convert(&registry, &[white(202, 202)], "23x23", &Options::default())
        .unwrap();

    let mut expected = vec![0u8; 400];
    expected.extend_from_slice(&[0x1B, 0x40]);
    expected.extend_from_slice(&[0x1B, 0x69, 0x61, 0x01]);
    expected.extend_from_slice(&[0x1B, 0x69, 0x4D, 0x40]);
    expected.extend_from_slice(&[0x1B, 0x69, 0x41, 0x01]);
    expected.extend_from_slice(&[0x1B, 0x69, 0x4B, 0x08]);
    expected.extend_from_slice(&[0x1B, 0x69, 0x64, 0x00, 0x00]);
    expected.extend_from_slice(&[0x4D, 0x00]);
    expected.extend_from_slice(&[0x1B, 0x69, 0x7A, 0xCE, 0x0B, 23, 23]);
    expected.extend_from_slice(&202u32.to_le_bytes());
    expected.extend_from_slice(&[0x00, 0x00]);
    for _ in 0..202 {
        expected.extend_from_slice(&[b'g', 0x00, 90]);
        expected.extend(std::iter::repeat(0).take(90));
    }
    expected.push(0x1A);

    assert_eq!(data, expected);
    assert_eq!(printer.data(), expected.as_slice());
}

#[test]
fn red_on_single_color_model_fails_without_output() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    let err = printer
        .convert(&registry, &[white(696, 200)], "62red", &Options::default().red(true))
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnsupportedFeature {
            feature: "Two-color printing".to_string(),
            model: "QL-700".to_string()
        }
    );
    assert!(printer.data().is_empty());
}

#[test]
fn offset_must_keep_label_inside_buffer() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    let image = [white(696, 200)];

    // Endless 62mm sits at column 12 on a 720 dot head.
    assert!(printer
        .convert(&registry, &image, "62", &Options::default().offset_x(12))
        .is_ok());
    assert_eq!(
        printer.convert(&registry, &image, "62", &Options::default().offset_x(13)),
        Err(Error::OutOfBounds {
            start: 25,
            end: 721,
            buffer_width: 720
        })
    );
    assert!(printer.data().is_empty());
    assert!(matches!(
        printer.convert(&registry, &image, "62", &Options::default().offset_x(-13)),
        Err(Error::OutOfBounds { start: -1, .. })
    ));
}

#[test]
fn threshold_output_matches_pixels() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    let image = gradient(696, 180);
    let data = printer
        .convert(&registry, &[image.clone()], "62", &Options::default())
        .unwrap();

    let lines = raster_lines(&data, prefix_len(&data) + 13);
    assert_eq!(lines.len(), 180);
    let gray = image.to_luma8();
    for (y, (command, _, payload)) in lines.iter().enumerate() {
        assert_eq!(*command, b'g');
        for x in 0..696 {
            let luma = gray.get_pixel(x, y as u32)[0] as i32;
            let black = luma * 100 < 70 * 255;
            assert_eq!(is_set(payload, 12 + x), black, "pixel ({}, {})", x, y);
        }
        for column in (0..12).chain(708..720) {
            assert!(!is_set(payload, column));
        }
    }
}

#[test]
fn batch_is_pages_back_to_back() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-820NWB").unwrap();
    let first = gradient(696, 271);
    let second = white(696, 271);
    let options = Options::default().compress(true);

    let a = printer.convert(&registry, &[first.clone()], "62x29", &options).unwrap();
    let b = printer.convert(&registry, &[second.clone()], "62x29", &options).unwrap();
    let both = printer
        .convert(&registry, &[first, second], "62x29", &options)
        .unwrap();

    // One preamble, a form feed between pages, one final print command. The second
    // page announces itself as a continuation.
    let prefix = prefix_len(&a);
    let mut expected = a[..a.len() - 1].to_vec();
    expected.push(0x0C);
    let second_page = expected.len();
    expected.extend_from_slice(&b[prefix..]);
    expected[second_page + 11] = 0x01;
    assert_eq!(both, expected);
    assert_eq!(printer.data(), both.as_slice());

    assert_eq!(a[prefix + 11], 0x00);
    assert_eq!(both.last(), Some(&0x1A));
}

#[test]
fn repeated_conversion_is_identical() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-1060N").unwrap();
    let options = Options::default().dither(true);
    let image = [gradient(1164, 300)];

    let first = printer.convert(&registry, &image, "102", &options).unwrap();
    let second = printer.convert(&registry, &image, "102", &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(printer.data(), first.as_slice());
}

#[test]
fn compressed_lines_unpack_to_plain_lines() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-720NW").unwrap();
    let image = [gradient(696, 160)];

    let plain = printer.convert(&registry, &image, "62", &Options::default()).unwrap();
    let packed = printer
        .convert(&registry, &image, "62", &Options::default().compress(true))
        .unwrap();

    let prefix = prefix_len(&plain);
    assert_eq!(&plain[prefix - 2..prefix], &[0x4D, 0x00]);
    assert_eq!(&packed[prefix - 2..prefix], &[0x4D, 0x02]);

    let plain_lines = raster_lines(&plain, prefix + 13);
    let packed_lines = raster_lines(&packed, prefix + 13);
    assert_eq!(plain_lines.len(), packed_lines.len());
    for ((_, _, plain), (_, _, packed)) in plain_lines.iter().zip(&packed_lines) {
        assert_eq!(&unpack_bits(packed), plain);
    }
}

#[test]
fn two_color_job_separates_pure_red() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-820NWB").unwrap();
    let mut canvas = RgbImage::from_pixel(696, 200, Rgb([255, 255, 255]));
    canvas.put_pixel(0, 0, Rgb([255, 0, 0]));
    canvas.put_pixel(1, 0, Rgb([0, 0, 0]));
    canvas.put_pixel(2, 0, Rgb([200, 0, 0]));
    let data = printer
        .convert(
            &registry,
            &[DynamicImage::ImageRgb8(canvas)],
            "62red",
            &Options::default().red(true),
        )
        .unwrap();

    let prefix = prefix_len(&data);
    // ESC i K: two-color and cut at end.
    assert_eq!(
        data.windows(4).position(|w| w == [0x1B, 0x69, 0x4B, 0x09]),
        Some(prefix - 11)
    );

    let lines = raster_lines(&data, prefix + 13);
    assert_eq!(lines.len(), 400);
    let (command, plane, black) = &lines[0];
    assert_eq!((*command, *plane), (b'w', 0x01));
    let (command, plane, red) = &lines[1];
    assert_eq!((*command, *plane), (b'w', 0x02));

    assert!(is_set(red, 12));
    assert!(!is_set(black, 12));
    assert!(is_set(black, 13));
    assert!(!is_set(red, 13));
    // Dark red is not pure red: it prints black.
    assert!(is_set(black, 14));
    assert!(!is_set(red, 14));
    for (_, _, payload) in &lines[2..] {
        assert!(payload.iter().all(|&b| b == 0));
    }
}

#[test]
fn high_resolution_die_cut_needs_double_rows() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-820NWB").unwrap();
    let options = Options::default().dpi_600(true);

    let data = printer
        .convert(&registry, &[white(696, 542)], "62x29", &options)
        .unwrap();
    let prefix = prefix_len(&data);
    assert_eq!(&data[prefix + 7..prefix + 11], &542u32.to_le_bytes());
    assert!(data.windows(4).any(|w| w == [0x1B, 0x69, 0x4B, 0x48]));

    assert!(matches!(
        printer.convert(&registry, &[white(696, 600)], "62x29", &options),
        Err(Error::InvalidDimensions(_))
    ));
}

#[test]
fn model_without_cutter_or_mode_switch() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-500").unwrap();
    let data = printer
        .convert(&registry, &[white(696, 300)], "62", &Options::default())
        .unwrap();

    let mut expected = vec![0u8; 200];
    expected.extend_from_slice(&[0x1B, 0x40, 0x1B, 0x69, 0x64, 35, 0x00]);
    assert_eq!(&data[..prefix_len(&data)], expected.as_slice());
    assert_eq!(data.last(), Some(&0x1A));

    assert!(matches!(
        printer.convert(&registry, &[white(696, 300)], "62", &Options::default().compress(true)),
        Err(Error::UnsupportedFeature { .. })
    ));
}

#[test]
fn short_endless_page_is_rejected() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    assert!(matches!(
        printer.convert(&registry, &[white(696, 100)], "62", &Options::default()),
        Err(Error::InvalidDimensions(_))
    ));
}

#[test]
fn overlong_endless_page_is_rejected_by_length() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    let strip = DynamicImage::ImageLuma8(image::GrayImage::new(1, 20_000));
    match printer.convert(&registry, &[strip], "62", &Options::default()) {
        Err(Error::InvalidDimensions(message)) => {
            assert!(message.contains("page length 20000"), "{}", message)
        }
        other => panic!("unexpected result: {:?}", other.map(|data| data.len())),
    }
    assert!(printer.data().is_empty());
}

#[test]
fn explicit_rotation_turns_image_onto_label() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    // 271 wide, 696 tall: only fits 62x29 when turned.
    let image = [white(271, 696)];

    assert!(printer
        .convert(&registry, &image, "62x29", &Options::default())
        .is_ok());
    assert!(printer
        .convert(&registry, &image, "62x29", &Options::default().rotate(Rotate::Deg270))
        .is_ok());
    assert!(matches!(
        printer.convert(&registry, &image, "62x29", &Options::default().rotate(Rotate::Deg0)),
        Err(Error::InvalidDimensions(_))
    ));
}

#[test]
fn free_function_matches_handle_method() {
    let registry = ProfileRegistry::builtin();
    let mut a = Printer::new(&registry, "QL-810W").unwrap();
    let mut b = Printer::new(&registry, "QL-810W").unwrap();
    let image = [gradient(306, 200)];

    let via_fn = convert(&registry, &mut a, &image, "29", &Options::default()).unwrap();
    let via_method = b.convert(&registry, &image, "29", &Options::default()).unwrap();
    assert_eq!(via_fn, via_method);
}

#[test]
fn unknown_label_is_not_found() {
    let registry = ProfileRegistry::builtin();
    let mut printer = Printer::new(&registry, "QL-700").unwrap();
    assert_eq!(
        printer.convert(&registry, &[white(10, 10)], "nonexistent", &Options::default()),
        Err(Error::NotFound {
            kind: "label",
            id: "nonexistent".to_string()
        })
    );
}
