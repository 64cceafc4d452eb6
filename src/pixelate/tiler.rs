//! Parallel pixelation pass.
//!
//! The working buffer is split into one [`StripMut`] per worker by cutting
//! every row at the strip boundaries. Each worker therefore owns `&mut`
//! access to exactly the pixels of its strip: the borrow checker, not a lock,
//! guarantees that no pixel is written by two workers. Workers run as rayon
//! tasks and are joined by the `collect` at the end of the parallel iterator.
//!
//! ## Cost of the views
//!
//! A view holds one row slice (a 16-byte fat pointer) per image row, so all
//! views together take `strips * height * 16` bytes. In multi mode there is
//! one strip per square column: with 1px squares that is four times the RGBA
//! buffer itself. The views live only for the duration of the pass.

use super::average::{PixelSource, average_color, widen};
use super::layout::Layout;
use super::region::Region;
use crate::config::Mode;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

const CHANNELS: usize = 4;

/// Progress events of a run.
///
/// [`pixelate`] emits `Started` and one `WorkerFinished` per worker; `Saved`
/// is sent by the caller once the result is on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelateEvent {
    Started {
        width: u32,
        height: u32,
        square_size: u32,
        mode: Mode,
        worker_count: usize,
    },
    WorkerFinished(WorkerReport),
    Saved {
        path: PathBuf,
    },
}

/// What one worker did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerReport {
    pub index: usize,
    pub strip: Region,
    pub squares: usize,
    #[serde(serialize_with = "serialize_micros", rename = "elapsed_us")]
    pub elapsed: Duration,
}

pub(crate) fn serialize_micros<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u64(d.as_micros() as u64)
}

/// Mutable view of one vertical strip of an RGBA buffer.
///
/// `rows[y]` holds the strip's pixels of image row `y`; coordinates passed
/// to the accessors are image coordinates.
pub struct StripMut<'a> {
    bounds: Region,
    rows: Vec<&'a mut [u8]>,
}

impl StripMut<'_> {
    pub fn bounds(&self) -> Region {
        self.bounds
    }

    #[inline]
    fn offset(&self, x: u32) -> usize {
        (x - self.bounds.x0) as usize * CHANNELS
    }

    /// Paint every pixel of `region` with `color`. `region` must lie inside
    /// the strip.
    pub fn fill(&mut self, region: Region, color: Rgba<u8>) {
        debug_assert!(region.x0 >= self.bounds.x0 && region.x1 <= self.bounds.x1);
        let start = self.offset(region.x0);
        let end = self.offset(region.x1);
        for row in &mut self.rows[region.y0 as usize..region.y1 as usize] {
            for px in row[start..end].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(&color.0);
            }
        }
    }
}

impl PixelSource for StripMut<'_> {
    fn rgba16(&self, x: u32, y: u32) -> [u16; 4] {
        let i = self.offset(x);
        let row = &self.rows[y as usize];
        widen([row[i], row[i + 1], row[i + 2], row[i + 3]])
    }
}

/// Cut `image` into one mutable view per strip.
///
/// `strips` must be full-height, ordered left to right, and tile `[0, width)`
/// without gaps, which is what [`Layout::strips`] produces.
pub fn split_strips<'a>(image: &'a mut RgbaImage, strips: &[Region]) -> Vec<StripMut<'a>> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    debug_assert_eq!(strips.first().map(|s| s.x0), Some(0));
    debug_assert_eq!(strips.last().map(|s| s.x1 as usize), Some(width));

    let mut views: Vec<StripMut<'a>> = strips
        .iter()
        .map(|&bounds| StripMut {
            bounds,
            rows: Vec::with_capacity(height),
        })
        .collect();

    let raw: &'a mut [u8] = image;
    for row in raw.chunks_exact_mut(width * CHANNELS) {
        let mut rest = row;
        for view in &mut views {
            let len = view.bounds.width() as usize * CHANNELS;
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
            view.rows.push(head);
            rest = tail;
        }
        debug_assert!(rest.is_empty());
    }
    views
}

/// Average and repaint every square of one strip.
fn run_worker(layout: &Layout, index: usize, mut strip: StripMut<'_>) -> WorkerReport {
    let start = Instant::now();
    let bounds = strip.bounds();
    let mut squares = 0;
    for square in layout.squares(bounds) {
        let color = average_color(square, &strip);
        strip.fill(square, color);
        squares += 1;
    }
    WorkerReport {
        index,
        strip: bounds,
        squares,
        elapsed: start.elapsed(),
    }
}

/// Pixelate `image` in place according to `layout`.
///
/// Returns one report per worker, ordered by worker index. Optionally streams
/// [`PixelateEvent`]s as workers start and finish.
pub fn pixelate(
    image: &mut RgbaImage,
    layout: &Layout,
    events: Option<&Sender<PixelateEvent>>,
) -> Vec<WorkerReport> {
    debug_assert_eq!((image.width(), image.height()), (layout.width(), layout.height()));
    let strips = layout.strips();

    if let Some(tx) = events {
        tx.send(PixelateEvent::Started {
            width: layout.width(),
            height: layout.height(),
            square_size: layout.square().get(),
            mode: layout.mode(),
            worker_count: strips.len(),
        })
        .ok();
    }

    split_strips(image, &strips)
        .into_par_iter()
        .enumerate()
        .map(|(index, strip)| {
            let report = run_worker(layout, index, strip);
            if let Some(tx) = events {
                tx.send(PixelateEvent::WorkerFinished(report.clone())).ok();
            }
            report
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixelate::layout::SquareSize;
    use crate::test_helpers::{assert_solid, brute_force_mean, gradient_image};

    fn layout_for(img: &RgbaImage, size: u32, mode: Mode) -> Layout {
        let square = SquareSize::new(i64::from(size), img.width(), img.height()).unwrap();
        Layout::new(img.width(), img.height(), square, mode)
    }

    fn run(img: &RgbaImage, size: u32, mode: Mode) -> RgbaImage {
        let mut out = img.clone();
        let layout = layout_for(&out, size, mode);
        pixelate(&mut out, &layout, None);
        out
    }

    // =========================================================================
    // Strip views
    // =========================================================================

    #[test]
    fn split_strips_reads_image_coordinates() {
        let mut img = gradient_image(7, 3);
        let expected = img.clone();
        let strips = vec![Region::new(0, 0, 3, 3), Region::new(3, 0, 7, 3)];
        let views = split_strips(&mut img, &strips);
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].rgba16(5, 2), widen(expected.get_pixel(5, 2).0));
        assert_eq!(views[0].rgba16(0, 0), widen(expected.get_pixel(0, 0).0));
    }

    #[test]
    fn fill_only_touches_its_region() {
        let mut img = RgbaImage::from_pixel(6, 4, Rgba([1, 2, 3, 255]));
        let strips = vec![Region::new(0, 0, 2, 4), Region::new(2, 0, 6, 4)];
        {
            let mut views = split_strips(&mut img, &strips);
            views[1].fill(Region::new(3, 1, 5, 3), Rgba([9, 9, 9, 255]));
        }
        for (x, y, px) in img.enumerate_pixels() {
            let inside = Region::new(3, 1, 5, 3).contains(x, y);
            let want = if inside { [9, 9, 9, 255] } else { [1, 2, 3, 255] };
            assert_eq!(px.0, want, "pixel ({x}, {y})");
        }
    }

    // =========================================================================
    // Full pass
    // =========================================================================

    #[test]
    fn four_by_four_with_two_pixel_squares() {
        let src = RgbaImage::from_fn(4, 4, |x, y| {
            let v = (x * 40 + y * 10) as u8;
            Rgba([v, 255 - v, (x * y) as u8, 255])
        });
        let single = run(&src, 2, Mode::Single);
        for (x0, y0) in [(0, 0), (2, 0), (0, 2), (2, 2)] {
            let block = Region::new(x0, y0, x0 + 2, y0 + 2);
            assert_solid(&single, block, brute_force_mean(&src, block));
        }

        let multi = run(&src, 2, Mode::Multi);
        assert_eq!(single.as_raw(), multi.as_raw());
    }

    #[test]
    fn single_and_multi_are_pixel_identical() {
        for (w, h, s) in [(13, 9, 4), (10, 10, 3), (31, 17, 5), (8, 8, 8), (50, 20, 7)] {
            let src = gradient_image(w, h);
            assert_eq!(
                run(&src, s, Mode::Single).as_raw(),
                run(&src, s, Mode::Multi).as_raw(),
                "w={w} h={h} s={s}"
            );
        }
    }

    #[test]
    fn unit_squares_leave_opaque_image_unchanged() {
        let src = gradient_image(9, 5);
        assert_eq!(run(&src, 1, Mode::Multi).as_raw(), src.as_raw());
        assert_eq!(run(&src, 1, Mode::Single).as_raw(), src.as_raw());
    }

    #[test]
    fn full_size_square_paints_one_block() {
        let src = gradient_image(6, 6);
        let out = run(&src, 6, Mode::Multi);
        let all = Region::new(0, 0, 6, 6);
        assert_solid(&out, all, brute_force_mean(&src, all));
    }

    #[test]
    fn edge_blocks_average_only_pixels_inside_image() {
        let src = gradient_image(5, 3);
        let out = run(&src, 2, Mode::Multi);
        let corner = Region::new(4, 2, 5, 3);
        assert_solid(&out, corner, brute_force_mean(&src, corner));
        let right = Region::new(4, 0, 5, 2);
        assert_solid(&out, right, brute_force_mean(&src, right));
    }

    #[test]
    fn output_is_fully_opaque() {
        let src = RgbaImage::from_fn(4, 4, |x, _| Rgba([x as u8 * 50, 0, 0, 10]));
        let out = run(&src, 2, Mode::Single);
        assert!(out.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn reports_one_entry_per_strip() {
        let mut img = gradient_image(10, 4);
        let layout = layout_for(&img, 3, Mode::Multi);
        let reports = pixelate(&mut img, &layout, None);
        assert_eq!(reports.len(), 4);
        assert_eq!(
            reports.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        // 2 rows of squares per strip
        assert!(reports.iter().all(|r| r.squares == 2));
        assert_eq!(reports[3].strip, Region::new(9, 0, 10, 4));
    }

    #[test]
    fn streams_started_then_one_event_per_worker() {
        let mut img = gradient_image(8, 4);
        let layout = layout_for(&img, 2, Mode::Multi);
        let (tx, rx) = std::sync::mpsc::channel();
        pixelate(&mut img, &layout, Some(&tx));
        drop(tx);

        let events: Vec<PixelateEvent> = rx.into_iter().collect();
        assert_eq!(
            events[0],
            PixelateEvent::Started {
                width: 8,
                height: 4,
                square_size: 2,
                mode: Mode::Multi,
                worker_count: 4,
            }
        );
        let finished = events
            .iter()
            .filter(|e| matches!(e, PixelateEvent::WorkerFinished(_)))
            .count();
        assert_eq!(finished, 4);
        assert!(!events.iter().any(|e| matches!(e, PixelateEvent::Saved { .. })));
    }

    #[test]
    fn views_hold_one_row_slice_per_image_row() {
        let mut img = gradient_image(12, 5);
        let layout = layout_for(&img, 1, Mode::Multi);
        let strips = layout.strips();
        let views = split_strips(&mut img, &strips);
        assert_eq!(views.len(), 12);
        for view in &views {
            assert_eq!(view.rows.len(), 5);
            assert!(view.rows.iter().all(|row| row.len() == CHANNELS));
        }
    }
}
