use crate::board::Board;
use crate::error::{Error, Result};
use crate::generator::{Generator, Placement};
use crate::reference::ReferenceMatrix;
use crate::{index, lsb, SequenceMap};
use log::debug;
use std::io::{BufRead, Seek, Write};

const DEFAULT_SEARCH_BUDGET: u64 = 1_000_000;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EncoderOptions {
    /// Candidate attempts the backtracking search may make before giving up
    /// and placing greedily. `None` lets it run to completion.
    pub search_budget: Option<u64>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            search_budget: Some(DEFAULT_SEARCH_BUDGET),
        }
    }
}

/// Output of an encode. The board is not hidden anywhere and has to reach
/// the receiver by other means.
#[derive(Debug, Clone)]
pub struct EncodedArtifact {
    pub board: Board,
    pub sequence_map: SequenceMap,
    /// RGBA pixels carrying the sequence map.
    pub modified_image: Vec<u8>,
    pub placement: Placement,
}

pub struct Encoder {
    options: EncoderOptions,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(EncoderOptions::default())
    }
}

impl Encoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Loads a PNG or JPEG cover image, hides `secret_text`, and writes the
    /// carrier to `output` as PNG.
    pub fn encode<R: BufRead + Seek, W: Write>(
        &self,
        cover_text: &str,
        secret_text: &str,
        cover_image: R,
        output: &mut W,
    ) -> Result<EncodedArtifact> {
        let img = image::io::Reader::new(cover_image)
            .with_guessed_format()?
            .decode()?;

        let rgba8 = img.to_rgba8();
        let (width, height) = rgba8.dimensions();

        let artifact = self.encode_pixels(cover_text, secret_text, &rgba8.into_raw())?;

        let EncodedArtifact {
            board,
            sequence_map,
            modified_image,
            placement,
        } = artifact;

        let out_buffer = image::RgbaImage::from_raw(width, height, modified_image.clone())
            .ok_or(Error::InvalidPixelBuffer {
                len: modified_image.len(),
            })?;

        image::DynamicImage::ImageRgba8(out_buffer).write_to(output, image::ImageFormat::Png)?;

        Ok(EncodedArtifact {
            board,
            sequence_map,
            modified_image,
            placement,
        })
    }

    /// Core pipeline on a raw RGBA buffer. `pixels` is never modified.
    pub fn encode_pixels(
        &self,
        cover_text: &str,
        secret_text: &str,
        pixels: &[u8],
    ) -> Result<EncodedArtifact> {
        let reference = ReferenceMatrix::build(cover_text);
        index::can_encode(secret_text, &reference)?;

        let matches = index::find_character_matches(secret_text, &reference);
        let generated = Generator::new(self.options.search_budget).generate(secret_text, &matches);

        debug!("stego board:\n{}", generated.board);

        let modified_image = lsb::embed(pixels, &generated.sequence)?;

        Ok(EncodedArtifact {
            board: generated.board,
            sequence_map: generated.sequence,
            modified_image,
            placement: generated.placement,
        })
    }
}
