use std::path::PathBuf;
use std::process::ExitCode;

use log::error;
use screen_scan::api::{scan_image_sequence, ScanRequest};

const USAGE: &str = "usage: screen-scan <frames_dir> [--catalog FILE] [--output DIR] [--fps N] [--tessdata DIR] [--json]";

struct Args {
    request: ScanRequest,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut frames_dir = None;
    let mut catalog_path = None;
    let mut output_dir = None;
    let mut tessdata_dir = None;
    let mut fps = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog" => catalog_path = Some(PathBuf::from(value_of(&mut args, &arg)?)),
            "--output" => output_dir = Some(PathBuf::from(value_of(&mut args, &arg)?)),
            "--tessdata" => tessdata_dir = Some(PathBuf::from(value_of(&mut args, &arg)?)),
            "--fps" => {
                let raw = value_of(&mut args, &arg)?;
                fps = Some(raw.parse::<f64>().map_err(|_| format!("invalid --fps value '{}'", raw))?);
            }
            "--json" => json = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ if frames_dir.is_none() => frames_dir = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument {}", arg)),
        }
    }

    let mut request = ScanRequest::new(frames_dir.ok_or("missing <frames_dir>")?);
    request.catalog_path = catalog_path;
    request.output_dir = output_dir;
    request.tessdata_dir = tessdata_dir;
    if let Some(fps) = fps {
        request.fps = fps;
    }

    Ok(Args { request, json })
}

fn value_of(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next().ok_or_else(|| format!("{} needs a value", flag))
}

fn main() -> ExitCode {
    screen_scan::init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            return ExitCode::from(2);
        }
    };

    let report = match scan_image_sequence(&args.request) {
        Ok(report) => report,
        Err(e) => {
            error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match report.timeline.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("❌ {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for event in &report.timeline {
            println!("{}", event);
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_full() {
        let args = parse(&["frames", "--catalog", "c.json5", "--output", "out", "--fps", "60", "--json"]).unwrap();
        assert_eq!(args.request.frames_dir, PathBuf::from("frames"));
        assert_eq!(args.request.catalog_path, Some(PathBuf::from("c.json5")));
        assert_eq!(args.request.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.request.fps, 60.0);
        assert!(args.json);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frames", "--fps"]).is_err());
        assert!(parse(&["frames", "--fps", "fast"]).is_err());
        assert!(parse(&["frames", "--bogus"]).is_err());
        assert!(parse(&["a", "b"]).is_err());
    }
}
