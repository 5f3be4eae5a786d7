//! The headless pipeline: photos in, one A4 sheet out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use quickpassport_core::catalog::PHOTO_SIZES;
use quickpassport_core::encode::encode_jpeg;
use quickpassport_core::sheet::{content_height, export_sheet, SheetExport};
use quickpassport_core::transform::Cropper;
use quickpassport_core::units::PRINT_DPI;
use quickpassport_core::Session;

use crate::config::ComposeArgs;
use crate::loader::BlockingPoolLoader;
use crate::remote::HttpBackgroundRemover;

/// Result of a compose run.
#[derive(Debug)]
pub struct ComposeOutcome {
    pub sheet_path: PathBuf,
    pub crop_paths: Vec<PathBuf>,
    pub placed: usize,
    /// Pixel height the tiles need; above the page height when they overflow.
    pub content_height: u32,
    pub export: SheetExport,
}

/// Run every input through the session and export the sheet.
pub async fn compose(args: &ComposeArgs) -> anyhow::Result<ComposeOutcome> {
    let size = args
        .photo_size()
        .ok_or_else(|| anyhow!("Unknown photo size '{}' (see `quickpassport sizes`)", args.size))?;
    if args.preview_width == 0 {
        bail!("--preview-width must be positive");
    }

    let remover = args
        .bg_endpoint
        .as_deref()
        .map(|endpoint| HttpBackgroundRemover::new(endpoint, Duration::from_secs(args.bg_timeout)))
        .transpose()?;

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", args.output_dir.display()))?;

    let (viewport_width, viewport_height) = Cropper::new(size).preview_size(args.preview_width);
    let settings = args.export_settings();
    let mut session = Session::new();
    let mut crop_paths = Vec::new();
    let mut placed = 0;

    for (index, input) in args.inputs.iter().enumerate() {
        let bytes = tokio::fs::read(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;
        session
            .upload_bytes(&bytes)
            .with_context(|| format!("Failed to decode {}", input.display()))?;
        session.select_size(size);

        match &remover {
            Some(remover) => {
                if let Err(e) = session.remove_background(remover).await {
                    tracing::warn!(input = %input.display(), error = %e, "keeping original background");
                    session.skip_background_removal()?;
                }
            }
            None => session.skip_background_removal()?,
        }

        let mut cropper = session.cropper(f64::from(viewport_width), f64::from(viewport_height))?;
        cropper.set_transform(args.crop_transform(cropper.transform()));
        let cropped = cropper
            .export(args.preview_width)
            .ok_or_else(|| anyhow!("No photo loaded for {}", input.display()))?;

        session.complete_crop(cropped);
        session.set_adjustments(args.adjustments());

        if args.save_crops {
            let path = save_crop(&session, &args.output_dir, input, index, settings.crop_quality).await?;
            crop_paths.push(path);
        }

        session.set_quantity(args.copies);
        let added = session.add_to_sheet()?;
        if added < args.copies {
            tracing::warn!(input = %input.display(), requested = args.copies, added, "sheet is full");
        }
        tracing::info!(input = %input.display(), copies = added, size = size.id, "photo added to sheet");
        placed += added;
        session.start_new_person();
    }

    let spec = args.sheet_spec();
    let export = export_sheet(
        session.grid(),
        &spec,
        &settings,
        &BlockingPoolLoader,
        chrono::Utc::now().timestamp_millis(),
    )
    .await
    .context("Failed to export sheet")?;

    let content_height = content_height(&export.placements, &spec.layout());
    if content_height > export.height {
        tracing::warn!(
            content_height,
            page_height = export.height,
            "photos run past the bottom of the page and will be cut off"
        );
    }

    let sheet_path = args.output_dir.join(&export.file_name);
    tokio::fs::write(&sheet_path, &export.bytes)
        .await
        .with_context(|| format!("Failed to write {}", sheet_path.display()))?;

    Ok(ComposeOutcome {
        sheet_path,
        crop_paths,
        placed,
        content_height,
        export,
    })
}

async fn save_crop(
    session: &Session,
    output_dir: &Path,
    input: &Path,
    index: usize,
    quality: u8,
) -> anyhow::Result<PathBuf> {
    let image = session
        .final_image()
        .ok_or_else(|| anyhow!("No cropped photo for {}", input.display()))?;
    let bytes = encode_jpeg(&image, quality).context("Failed to encode cropped photo")?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("photo{index}"));
    let path = output_dir.join(format!("{stem}_{}_crop.jpg", session.size().id));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// The size table printed by `quickpassport sizes`.
pub fn size_table() -> String {
    let mut out = format!(
        "{:<22} {:<28} {:>13} {:>13} {:>11}\n",
        "ID", "NAME", "CM", "INCHES", "PX@300"
    );
    for size in PHOTO_SIZES.iter() {
        let (w, h) = size.pixel_size(PRINT_DPI);
        out.push_str(&format!(
            "{:<22} {:<28} {:>13} {:>13} {:>11}\n",
            size.id,
            size.name,
            size.cm_label(),
            size.inch_label(),
            format!("{w}x{h}")
        ));
    }
    out
}

pub fn size_json() -> anyhow::Result<String> {
    serde_json::to_string_pretty(&PHOTO_SIZES[..]).context("Failed to serialize size catalog")
}
