use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quickpassport_core::catalog::PhotoSize;
use quickpassport_core::sheet::{ExportSettings, SheetSpec};
use quickpassport_core::transform::CropTransform;
use quickpassport_core::units::{is_supported_dpi, MAX_DPI, PRINT_DPI};
use quickpassport_core::Adjustments;

#[derive(Debug, Parser)]
#[command(name = "quickpassport", version)]
#[command(about = "Turn portrait photos into a printable A4 passport photo sheet")]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Crop photos and lay them out on an A4 sheet
    Compose(ComposeArgs),
    /// List the supported photo sizes
    Sizes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ComposeArgs {
    /// Portrait photos (JPEG or PNG), one per person
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Photo size id (see `quickpassport sizes`)
    #[arg(short, long, default_value = "passport_in_official")]
    pub size: String,

    /// Copies of each photo
    #[arg(short = 'n', long, default_value = "1")]
    pub copies: usize,

    /// Zoom relative to the photo's natural size; defaults to the cropper's initial fit
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Horizontal pan in preview pixels
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub offset_x: f64,

    /// Vertical pan in preview pixels
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub offset_y: f64,

    /// Width of the crop viewport the offsets refer to
    #[arg(long, default_value = "350")]
    pub preview_width: u32,

    /// Brightness in percent (50-150)
    #[arg(long, default_value = "100")]
    pub brightness: f32,

    /// Contrast in percent (50-150)
    #[arg(long, default_value = "100")]
    pub contrast: f32,

    /// Saturation in percent (50-150)
    #[arg(long, default_value = "100")]
    pub saturation: f32,

    /// Directory the sheet is written to
    #[arg(short, long, default_value = "./output")]
    pub output_dir: PathBuf,

    /// Sheet resolution (above 0, at most 1200)
    #[arg(long, default_value_t = PRINT_DPI, value_parser = parse_dpi)]
    pub dpi: f64,

    /// Sheet JPEG quality (1-100)
    #[arg(long, default_value = "90", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Also write each cropped photo next to the sheet
    #[arg(long)]
    pub save_crops: bool,

    /// Background removal service; photos are used as-is when unset
    #[arg(long, env = "QUICKPASSPORT_BG_ENDPOINT")]
    pub bg_endpoint: Option<String>,

    /// Background removal request timeout in seconds
    #[arg(long, default_value = "60")]
    pub bg_timeout: u64,
}

fn parse_dpi(value: &str) -> Result<f64, String> {
    let dpi: f64 = value.parse().map_err(|_| format!("'{value}' is not a number"))?;
    if is_supported_dpi(dpi) {
        Ok(dpi)
    } else {
        Err(format!("must be above 0 and at most {MAX_DPI}"))
    }
}

impl ComposeArgs {
    pub fn photo_size(&self) -> Option<PhotoSize> {
        PhotoSize::by_id(&self.size).copied()
    }

    pub fn adjustments(&self) -> Adjustments {
        Adjustments {
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
        }
        .clamped()
    }

    pub fn sheet_spec(&self) -> SheetSpec {
        SheetSpec::a4(self.dpi)
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            sheet_quality: self.quality,
            ..ExportSettings::default()
        }
    }

    /// Pan from the flags. Zoom from `--zoom`, else the cropper's initial fit.
    pub fn crop_transform(&self, initial: CropTransform) -> CropTransform {
        CropTransform {
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            scale: self.zoom.unwrap_or(initial.scale),
        }
    }
}
