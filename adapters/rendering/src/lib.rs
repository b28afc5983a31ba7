#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Consumer-side rendering contracts for pathviz adapters.
//!
//! A [`RenderState`] mirrors the producer's world purely from the
//! [`Update`] stream. Adapters turn it into a [`Frame`] and hand that to a
//! [`RenderingBackend`].

use std::{collections::HashMap, fmt, io::Write};

use anyhow::Result as AnyResult;
use pathviz_core::{CellChange, CellState, Position, Update};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Channels quantized to bytes, alpha last.
    #[must_use]
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha].map(|channel| {
            (channel.clamp(0.0, 1.0) * 255.0).round() as u8
        })
    }
}

/// Fill colors assigned to each cell state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    colors: [Color; 7],
}

impl Palette {
    /// Color used to fill a cell holding `state`.
    #[must_use]
    pub fn color(&self, state: CellState) -> Color {
        self.colors[state as usize]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [
                Color::TRANSPARENT,
                Color::from_rgb_u8(0x88, 0x9f, 0x9f),
                Color::from_rgb_u8(0xff, 0x00, 0x00),
                Color::from_rgb_u8(0x00, 0xff, 0x00),
                Color::from_rgb_u8(0x00, 0x00, 0xff),
                Color::from_rgb_u8(0x77, 0x77, 0x77),
                Color::from_rgb_u8(0xdd, 0xdd, 0x00),
            ],
        }
    }
}

/// Local mirror of the producer's world built from its update stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderState {
    width: u32,
    height: u32,
    cells: HashMap<Position, CellState>,
    busy: bool,
    applied: usize,
}

impl RenderState {
    /// Creates an empty mirror of a `width` by `height` world.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Applies one update in stream order.
    pub fn apply(&mut self, update: &Update) {
        match update {
            Update::RunStarted => self.busy = true,
            Update::RunEnded => self.busy = false,
            Update::MapReset => self.cells.clear(),
            Update::Cell(change) => self.apply_change(*change),
            Update::Batch(changes) => {
                for change in changes {
                    self.apply_change(*change);
                }
            }
        }
    }

    fn apply_change(&mut self, change: CellChange) {
        self.applied += 1;
        if change.state() == CellState::Empty {
            let _ = self.cells.remove(&change.position());
        } else {
            let _ = self.cells.insert(change.position(), change.state());
        }
    }

    /// Reports whether a run is in flight according to the stream.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Number of cell changes applied since creation.
    #[must_use]
    pub const fn applied_changes(&self) -> usize {
        self.applied
    }

    /// Width and height of the mirrored world.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Last announced state of the cell.
    #[must_use]
    pub fn cell(&self, position: Position) -> CellState {
        self.cells.get(&position).copied().unwrap_or_default()
    }

    /// Non-empty cells sorted by position.
    #[must_use]
    pub fn cells(&self) -> Vec<CellChange> {
        let mut cells: Vec<CellChange> = self
            .cells
            .iter()
            .map(|(position, state)| CellChange::new(*state, *position))
            .collect();
        cells.sort_by_key(|change| change.position());
        cells
    }

    /// Number of non-empty cells holding `state`.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.values().filter(|stored| **stored == state).count()
    }

    /// Glyph grid of the mirrored extent.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let rows = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        let position = Position::new(
                            i32::try_from(x).unwrap_or(i32::MAX),
                            i32::try_from(y).unwrap_or(i32::MAX),
                        );
                        self.cell(position).glyph()
                    })
                    .collect()
            })
            .collect();

        Frame { rows }
    }
}

/// Text snapshot of a render state, one string per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    rows: Vec<String>,
}

impl Frame {
    /// Rows from top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Rendering backend capable of presenting pathviz frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend that writes frames as plain text.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    separator: Option<String>,
}

impl<W> TextBackend<W>
where
    W: Write,
{
    /// Creates a backend writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            separator: None,
        }
    }

    /// Writes `separator` on its own line after every frame.
    #[must_use]
    pub fn with_separator<T>(mut self, separator: T) -> Self
    where
        T: Into<String>,
    {
        self.separator = Some(separator.into());
        self
    }

    /// Releases the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W> RenderingBackend for TextBackend<W>
where
    W: Write,
{
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        write!(self.out, "{frame}")?;
        if let Some(separator) = &self.separator {
            writeln!(self.out, "{separator}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}
