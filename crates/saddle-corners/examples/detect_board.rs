use std::{env, fs, path::PathBuf};

use image::ImageReader;
use saddle_corners::{
    detect_checkerboard_image, CheckerboardDetection, DetectorParams, GridShape,
};
use serde::Serialize;

#[cfg(not(feature = "tracing"))]
use log::{info, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::info;

#[cfg(feature = "tracing")]
use saddle_corners_core::init_tracing;
#[cfg(not(feature = "tracing"))]
use saddle_corners_core::init_with_level;

#[derive(Debug, Serialize)]
struct ExampleReport {
    image_path: String,
    rows: usize,
    cols: usize,
    accepted: bool,
    detection: CheckerboardDetection,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    init_with_level(LevelFilter::Info)?;

    #[cfg(feature = "tracing")]
    init_tracing(false);

    run()
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let (Some(image_path), Some(rows), Some(cols)) = (args.next(), args.next(), args.next())
    else {
        eprintln!("Usage: detect_board <image_path> <rows> <cols> [report_path]");
        return Ok(());
    };
    let shape = GridShape {
        rows: rows.parse()?,
        cols: cols.parse()?,
    };
    let report_path = args.next().map(PathBuf::from);

    let img = ImageReader::open(&image_path)?.decode()?.to_luma8();
    info!("loaded {}x{} image from {image_path}", img.width(), img.height());

    let params = DetectorParams::default();
    let detection = detect_checkerboard_image(&img, shape, &params)?;
    if detection.is_accepted() {
        info!(
            "detected {} corners, score {:.4}",
            detection.corners.len(),
            detection.score
        );
    } else {
        info!("no board detected (score {:.4})", detection.score);
    }

    let report = ExampleReport {
        image_path,
        rows: shape.rows,
        cols: shape.cols,
        accepted: detection.is_accepted(),
        detection,
    };
    write_report(report_path, &report)
}

fn write_report(
    path: Option<PathBuf>,
    report: &ExampleReport,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    match path {
        Some(out_path) => {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&out_path, json)?;
            println!("wrote report JSON to {}", out_path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
