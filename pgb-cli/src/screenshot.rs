use anyhow::Context;
use pgb_core::ppu::FrameBuffer;
use pgb_core::{SCREEN_HEIGHT, SCREEN_WIDTH};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Map a 2-bit color index to an 8-bit gray level. 0 is white and 3 is black.
fn gray_level(color_index: u8) -> u8 {
    match color_index {
        0 => 255,
        1 => 170,
        2 => 85,
        _ => 0,
    }
}

fn to_grayscale(frame_buffer: &FrameBuffer) -> Vec<u8> {
    frame_buffer.iter().flatten().copied().map(gray_level).collect()
}

/// Write the frame as an 8-bit grayscale PNG.
pub fn write_png<P>(path: P, frame_buffer: &FrameBuffer) -> Result<(), anyhow::Error>
where
    P: AsRef<Path> + std::fmt::Debug,
{
    let file = File::create(path.as_ref())
        .with_context(|| format!("error creating screenshot file at '{path:?}'"))?;

    let mut encoder =
        png::Encoder::new(BufWriter::new(file), SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().context("error writing PNG header")?;
    writer
        .write_image_data(&to_grayscale(frame_buffer))
        .context("error writing PNG image data")?;
    writer.finish().context("error finishing PNG file")?;

    Ok(())
}
