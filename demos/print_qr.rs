use image::{imageops, DynamicImage, Luma, Rgb, RgbImage};
use qrcode::QrCode;
use ql_raster::{Options, Printer, ProfileRegistry};
use std::env;

/// One 62x29 die-cut label per serial, QR code on the left.
fn render_label(serial: &str, width: u32, height: u32) -> DynamicImage {
    let code = QrCode::new(serial.as_bytes()).unwrap();
    let qr = code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .max_dimensions(height - 20, height - 20)
        .build();

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let qr = DynamicImage::ImageLuma8(qr).to_rgb8();
    let y = (height - qr.height()) / 2;
    imageops::replace(&mut canvas, &qr, 10, y as i64);

    // A red bar on the right, printed only on two-color media.
    for x in width - 40..width - 20 {
        for y in 10..height - 10 {
            canvas.put_pixel(x, y, Rgb([255, 0, 0]));
        }
    }
    DynamicImage::ImageRgb8(canvas)
}

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();
    dotenvy::dotenv().ok();

    let count: u32 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2);
    let model = env::var("DEFAULT_MODEL").unwrap_or_else(|_| "QL-820NWB".to_string());
    let output = env::var("DEFAULT_OUTPUT").unwrap_or_else(|_| "qr.bin".to_string());

    let registry = ProfileRegistry::builtin();
    let label = registry.get_label("62x29").unwrap();
    let mut printer = Printer::new(&registry, &model).unwrap();
    let (two_color, compress) = registry
        .get_model(&model)
        .map(|m| (m.two_color, m.compression))
        .unwrap_or((false, false));

    let images: Vec<DynamicImage> = (0..count)
        .map(|n| {
            render_label(
                &format!("12345-{}", n + 1),
                label.printable_width,
                label.printable_height,
            )
        })
        .collect();

    let options = Options::default().red(two_color).compress(compress);
    match printer.convert(&registry, &images, &label.id, &options) {
        Ok(bytes) => {
            std::fs::write(&output, &bytes).unwrap();
            println!("Wrote {} labels ({} bytes) to {}", count, bytes.len(), output);
        }
        Err(err) => println!("ERROR {:#?}", err),
    }
}
