//! Decode session.
//!
//! [`read`] hands a path to a [`RawSource`], decides the header layout,
//! resolves the three linear scales and segments the flat data into blocks.
//! Those steps run eagerly so a malformed file fails the call. Coordinates and
//! velocity components are computed on first access and memoized on the
//! returned [`Buffer`]; the vector reshape drops any cached coordinates since
//! it recomputes `ny`.
//!
//! A buffer is released exactly once. After [`Buffer::release`] every
//! accessor, including a second release, fails with
//! [`PivError::UseAfterRelease`].

pub mod blocks;
pub mod components;
pub mod grid;
pub mod mask;
pub mod scale;

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::PivError;
use crate::header::{BufferFormat, Header, ReaderKind, decode_header};
use crate::source::{AttributeChain, AttributeMap, DavisFileSource, RawBuffer, RawSource};

use self::components::VectorField;
use self::grid::Positions;
use self::mask::MaskedArray;
use self::scale::{ScaleAxis, Scales};

/// Buffer extents after segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub nf: usize,
    pub total_lines: usize,
    pub vector_grid: i32,
    pub is_float: bool,
}

/// Decode `path` with the built-in DaVis reader.
///
/// # Examples
/// ```no_run
/// use pivfile_core::read;
///
/// let (mut buffer, attributes) = read("B00001.vc7")?;
/// println!("{} attributes, vx shape {:?}", attributes.len(), buffer.vx()?.shape());
/// buffer.release()?;
/// # Ok::<(), pivfile_core::PivError>(())
/// ```
pub fn read(path: impl AsRef<Path>) -> Result<(Buffer, AttributeMap), PivError> {
    read_with(&DavisFileSource::new(), path)
}

/// Decode `path` with any raw reader.
pub fn read_with<S: RawSource + ?Sized>(
    source: &S,
    path: impl AsRef<Path>,
) -> Result<(Buffer, AttributeMap), PivError> {
    let path = path.as_ref();
    let record = source.read_raw(path)?;
    let attributes = record.attributes.to_map();

    let header = decode_header(&record.header, record.buffer.nx)?;
    log::info!(
        "{}: {:?} header, {:?} buffer",
        path.display(),
        header.kind(),
        header.buffer_format()
    );
    let resolved = scale::resolve_scales(&header, &record.buffer, &attributes)?;

    let mut session = Session {
        raw: record.buffer,
        attributes: record.attributes,
        header,
        scales: resolved.scales,
        missing: resolved.missing,
        blocks: None,
        positions: None,
        field: None,
    };
    let blocks = session.take_blocks()?;
    session.blocks = Some(blocks);

    let buffer = Buffer {
        path: path.to_path_buf(),
        state: Some(session),
    };
    Ok((buffer, attributes))
}

#[derive(Debug)]
struct Session {
    raw: RawBuffer,
    attributes: AttributeChain,
    header: Header,
    scales: Scales,
    missing: Vec<ScaleAxis>,
    blocks: Option<Array3<f32>>,
    positions: Option<Positions>,
    field: Option<VectorField>,
}

impl Session {
    fn segment(&mut self) -> Result<Array3<f32>, PivError> {
        let segmented = blocks::segment(
            &self.raw,
            self.header.buffer_format(),
            self.header.kind(),
        )?;
        if let Some(ny) = segmented.ny {
            self.raw.ny = ny;
            self.positions = None;
        }
        Ok(segmented.blocks)
    }

    fn take_blocks(&mut self) -> Result<Array3<f32>, PivError> {
        match self.blocks.take() {
            Some(blocks) => Ok(blocks),
            None => self.segment(),
        }
    }

    fn blocks(&mut self) -> Result<&Array3<f32>, PivError> {
        let blocks = self.take_blocks()?;
        Ok(self.blocks.insert(blocks))
    }

    fn positions(&mut self) -> Result<&Positions, PivError> {
        let positions = match self.positions.take() {
            Some(positions) => positions,
            None => {
                let blocks = self.take_blocks()?;
                self.blocks = Some(blocks);
                grid::positions(
                    self.raw.nx,
                    self.raw.ny,
                    self.raw.vector_grid,
                    &self.scales.x,
                    &self.scales.y,
                )
            }
        };
        Ok(self.positions.insert(positions))
    }

    fn field(&mut self) -> Result<&VectorField, PivError> {
        let field = match self.field.take() {
            Some(field) => field,
            None => {
                let blocks = self.take_blocks()?;
                let extracted = components::extract(
                    &blocks,
                    self.header.buffer_format(),
                    &self.scales.y,
                    &self.scales.i,
                );
                self.blocks = Some(blocks);
                extracted?
            }
        };
        Ok(self.field.insert(field))
    }
}

/// A decoded buffer with memoized derived fields.
#[derive(Debug)]
pub struct Buffer {
    path: PathBuf,
    state: Option<Session>,
}

impl Buffer {
    fn session(&self) -> Result<&Session, PivError> {
        self.state.as_ref().ok_or(PivError::UseAfterRelease)
    }

    fn session_mut(&mut self) -> Result<&mut Session, PivError> {
        self.state.as_mut().ok_or(PivError::UseAfterRelease)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    pub fn header(&self) -> Result<&Header, PivError> {
        Ok(&self.session()?.header)
    }

    pub fn reader_kind(&self) -> Result<ReaderKind, PivError> {
        Ok(self.session()?.header.kind())
    }

    pub fn buffer_format(&self) -> Result<BufferFormat, PivError> {
        Ok(self.session()?.header.buffer_format())
    }

    pub fn raw(&self) -> Result<&RawBuffer, PivError> {
        Ok(&self.session()?.raw)
    }

    pub fn dimensions(&self) -> Result<Dimensions, PivError> {
        let raw = &self.session()?.raw;
        Ok(Dimensions {
            nx: raw.nx,
            ny: raw.ny,
            nz: raw.nz,
            nf: raw.nf,
            total_lines: raw.total_lines,
            vector_grid: raw.vector_grid,
            is_float: raw.is_float,
        })
    }

    pub fn scales(&self) -> Result<&Scales, PivError> {
        Ok(&self.session()?.scales)
    }

    /// Axes whose scale attribute was absent.
    pub fn missing_scales(&self) -> Result<&[ScaleAxis], PivError> {
        Ok(&self.session()?.missing)
    }

    pub fn attribute_chain(&self) -> Result<&AttributeChain, PivError> {
        Ok(&self.session()?.attributes)
    }

    /// All blocks as `(count, ny, nx)`.
    pub fn blocks(&mut self) -> Result<&Array3<f32>, PivError> {
        self.session_mut()?.blocks()
    }

    pub fn block_count(&mut self) -> Result<usize, PivError> {
        Ok(self.blocks()?.len_of(Axis(0)))
    }

    /// Frame `index` of an image buffer, `(ny, nx)`.
    pub fn frame(&mut self, index: usize) -> Result<ArrayView2<'_, f32>, PivError> {
        let frames = self.session()?.raw.nf;
        let blocks = self.blocks()?;
        let available = frames.min(blocks.len_of(Axis(0)));
        if index >= available {
            return Err(PivError::FrameOutOfRange {
                index,
                frames: available,
            });
        }
        Ok(blocks.index_axis(Axis(0), index))
    }

    pub fn positions(&mut self) -> Result<&Positions, PivError> {
        self.session_mut()?.positions()
    }

    pub fn x(&mut self) -> Result<&Array1<f64>, PivError> {
        Ok(&self.positions()?.x)
    }

    pub fn y(&mut self) -> Result<&Array1<f64>, PivError> {
        Ok(&self.positions()?.y)
    }

    pub fn z(&mut self) -> Result<f64, PivError> {
        Ok(self.positions()?.z)
    }

    /// All derived components, computed on first access.
    pub fn field(&mut self) -> Result<&VectorField, PivError> {
        self.session_mut()?.field()
    }

    /// Borrows the buffer mutably, so only one result can be held at a time.
    /// Use [`Buffer::field`] to hold several components together.
    pub fn vx(&mut self) -> Result<&Array2<f64>, PivError> {
        Ok(&self.field()?.vx)
    }

    /// See [`Buffer::vx`]; [`Buffer::field`] holds every component.
    pub fn vy(&mut self) -> Result<&Array2<f64>, PivError> {
        Ok(&self.field()?.vy)
    }

    /// See [`Buffer::vx`]; [`Buffer::field`] holds every component.
    pub fn vz(&mut self) -> Result<&Array2<f64>, PivError> {
        Ok(&self.field()?.vz)
    }

    /// See [`Buffer::vx`]; [`Buffer::field`] holds every component.
    pub fn vmag(&mut self) -> Result<&Array2<f64>, PivError> {
        Ok(&self.field()?.vmag)
    }

    /// Correlation peak for the `*_PEAK` formats.
    pub fn peak(&mut self) -> Result<Option<&Array2<f64>>, PivError> {
        Ok(self.field()?.peak.as_ref())
    }

    /// Mask vx, vy, vz and `extras` where `predicate` is true.
    ///
    /// The predicate result and every extra array must match the shape of vx.
    pub fn filter<F>(
        &mut self,
        predicate: F,
        extras: &[Array2<f64>],
    ) -> Result<Vec<MaskedArray>, PivError>
    where
        F: FnOnce(&mut Buffer) -> Result<Array2<bool>, PivError>,
    {
        let mask = predicate(self)?;
        let field = self.field()?;
        mask::apply_mask(&mask, &[&field.vx, &field.vy, &field.vz], extras)
    }

    /// Free the data, derived fields and attribute chain.
    pub fn release(&mut self) -> Result<(), PivError> {
        let mut session = self.state.take().ok_or(PivError::UseAfterRelease)?;
        session.attributes.clear();
        log::debug!("released {}", self.path.display());
        Ok(())
    }
}
