use ql_raster::{Options, Printer, ProfileRegistry, Rotate};
use std::env;

fn print_usage() {
    println!("Usage: cargo run --example convert_image IMAGE [OPTIONS]");
    println!("Options:");
    println!("  --dither        Floyd-Steinberg dithering instead of a threshold");
    println!("  --threshold N   Luminance threshold in percent (default 70)");
    println!("  --rotate DEG    0, 90, 180 or 270 (default: automatic)");
    println!("  --compress      PackBits compression");
    println!("  --red           Print pure red on the red plane (62red media)");
    println!("  --600dpi        300x600 dpi mode");
    println!("  --no-cut        Do not cut after the last label");
    println!("\nModel, label and output file come from DEFAULT_MODEL, DEFAULT_LABEL and");
    println!("DEFAULT_OUTPUT, read from the environment or a .env file.");
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        options = match arg.as_str() {
            "--dither" => options.dither(true),
            "--compress" => options.compress(true),
            "--red" => options.red(true),
            "--600dpi" => options.dpi_600(true),
            "--no-cut" => options.cut(false),
            "--threshold" => {
                let value = iter.next().ok_or("--threshold needs a value")?;
                options.threshold(value.parse().map_err(|_| format!("bad threshold {}", value))?)
            }
            "--rotate" => {
                let value = iter.next().ok_or("--rotate needs a value")?;
                let degrees = value.parse().map_err(|_| format!("bad rotation {}", value))?;
                options.rotate(Rotate::from_degrees(degrees).map_err(|e| e.to_string())?)
            }
            other => return Err(format!("Unknown option '{}'", other)),
        };
    }
    Ok(options)
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

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let options = match parse_options(&args[2..]) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            return;
        }
    };

    let model = env::var("DEFAULT_MODEL").unwrap_or_else(|_| "QL-820NWB".to_string());
    let label = env::var("DEFAULT_LABEL").unwrap_or_else(|_| "62".to_string());
    let output = env::var("DEFAULT_OUTPUT").unwrap_or_else(|_| "label.bin".to_string());

    let image = image::open(&args[1]).unwrap();
    let registry = ProfileRegistry::builtin();

    match Printer::new(&registry, &model)
        .and_then(|mut printer| printer.convert(&registry, &[image], &label, &options))
    {
        Ok(bytes) => {
            std::fs::write(&output, &bytes).unwrap();
            println!("Wrote {} bytes for {} on {} to {}", bytes.len(), label, model, output);
        }
        Err(err) => println!("ERROR {:#?}", err),
    }
}
