use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mediastage_core::trim::{floor_secs, TrimRange};
use tracing::{debug, info, warn};

use crate::surface::{Handle, SliderHost, SliderOptions, TextField, TrimSurfaces, VideoElement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimPhase {
    /// Waiting for the player's metadata.
    Pending,
    /// Slider built; `max` is the clip length rounded up.
    Active { max: u32 },
    Disposed,
}

struct TrimInner {
    phase: TrimPhase,
    start: Option<u32>,
    finish: Option<u32>,
    surfaces: TrimSurfaces,
}

/// Trim controller for one activated item.
///
/// Owns the slider, the start/end/max fields and the playhead until it is
/// replaced. The slider is built on the player's first metadata; a listener
/// left behind by a replaced controller finds nothing to act on.
pub struct TrimRangeController {
    inner: Rc<RefCell<TrimInner>>,
}

impl TrimRangeController {
    /// Start a controller for the item about to load into the player.
    ///
    /// `start` and `finish` default independently to the clip bounds.
    pub fn start(surfaces: TrimSurfaces, start: Option<u32>, finish: Option<u32>) -> Self {
        let inner = Rc::new(RefCell::new(TrimInner {
            phase: TrimPhase::Pending,
            start,
            finish,
            surfaces,
        }));
        wait_for_metadata(&inner);
        Self { inner }
    }

    pub fn phase(&self) -> TrimPhase {
        self.inner.borrow().phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase(), TrimPhase::Active { .. })
    }

    /// Clip length in whole seconds, once known.
    pub fn max(&self) -> Option<u32> {
        match self.phase() {
            TrimPhase::Active { max } => Some(max),
            _ => None,
        }
    }

    /// The range currently selected on the slider, read from the live
    /// handles.
    pub fn current_range(&self) -> Option<TrimRange> {
        let inner = self.inner.borrow();
        if !matches!(inner.phase, TrimPhase::Active { .. }) {
            return None;
        }
        let [left, right] = inner.surfaces.slider.values()?;
        TrimRange::from_positions(left, right).ok()
    }

    /// Tear down the slider and stop reacting to the player.
    pub fn dispose(self) {
        drop(self);
    }

    fn release(&self) {
        let (was_active, slider) = {
            let mut inner = self.inner.borrow_mut();
            let was_active = matches!(inner.phase, TrimPhase::Active { .. });
            inner.phase = TrimPhase::Disposed;
            (was_active, inner.surfaces.slider.clone())
        };
        if was_active {
            slider.destroy();
            debug!("trim slider destroyed");
        }
    }
}

impl Drop for TrimRangeController {
    fn drop(&mut self) {
        self.release();
    }
}

fn wait_for_metadata(inner: &Rc<RefCell<TrimInner>>) {
    let weak: Weak<RefCell<TrimInner>> = Rc::downgrade(inner);
    let video = inner.borrow().surfaces.video.clone();
    video.on_metadata_loaded_once(Box::new(move || match weak.upgrade() {
        Some(inner) => on_metadata(&inner),
        None => debug!("metadata for a released trim controller ignored"),
    }));
}

fn on_metadata(inner: &Rc<RefCell<TrimInner>>) {
    let (surfaces, start, finish) = {
        let inner = inner.borrow();
        if inner.phase != TrimPhase::Pending {
            return;
        }
        (inner.surfaces.clone(), inner.start, inner.finish)
    };

    let duration = surfaces.video.duration();
    if !duration.is_finite() || duration <= 0.0 {
        warn!(duration, "unusable duration, waiting for the next metadata");
        wait_for_metadata(inner);
        return;
    }

    let max = duration.ceil() as u32;
    let begin = start.unwrap_or(0);
    let end = finish.unwrap_or(max);

    if surfaces.slider.is_built() {
        warn!("stale trim slider found, destroying it");
        surfaces.slider.destroy();
    }

    let options = SliderOptions {
        min: 0.0,
        max: max as f64,
        start: [begin as f64, end as f64],
    };
    if let Err(e) = surfaces.slider.build(options, update_handler(&surfaces)) {
        warn!("failed to build trim slider: {}", e);
        return;
    }

    surfaces.max_field.set_value(&max.to_string());
    if let Some([left, right]) = surfaces.slider.values() {
        surfaces.start_field.set_value(&floor_secs(left).to_string());
        surfaces.end_field.set_value(&floor_secs(right).to_string());
    }

    inner.borrow_mut().phase = TrimPhase::Active { max };
    info!(max, begin, end, "trim slider ready");
}

/// Slider → field and slider → playhead. The playhead never moves the
/// handles.
fn update_handler(surfaces: &TrimSurfaces) -> Box<dyn FnMut(Handle, f64)> {
    let surfaces = surfaces.clone();
    Box::new(move |handle, value| {
        let secs = floor_secs(value);
        surfaces.field(handle).set_value(&secs.to_string());
        surfaces.video.set_current_time(secs as f64);
        debug!(?handle, secs, "trim handle moved");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPage;

    fn range(start: u32, end: u32) -> Option<TrimRange> {
        Some(TrimRange::new(start, end).unwrap())
    }

    #[test]
    fn waits_for_metadata_before_building() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        assert_eq!(trim.phase(), TrimPhase::Pending);
        assert!(!page.trim_slider.is_built());
        assert_eq!(trim.current_range(), None);

        page.player.load_metadata(120.0);
        assert_eq!(trim.phase(), TrimPhase::Active { max: 120 });
        assert_eq!(trim.current_range(), range(0, 120));
        assert_eq!(page.max_trim.value(), "120");
    }

    #[test]
    fn explicit_bounds_are_used() {
        for (start, finish) in [(0, 0), (5, 60), (30, 30), (0, 120), (119, 120)] {
            let page = MemoryPage::new();
            let trim = TrimRangeController::start(page.trim_surfaces(), Some(start), Some(finish));
            page.player.load_metadata(120.0);
            assert_eq!(trim.current_range(), range(start, finish));
            assert_eq!(page.trim_start.value(), start.to_string());
            assert_eq!(page.trim_end.value(), finish.to_string());
        }
    }

    #[test]
    fn missing_bound_defaults_independently() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), Some(40), None);
        page.player.load_metadata(100.0);
        assert_eq!(trim.current_range(), range(40, 100));

        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, Some(10));
        page.player.load_metadata(100.0);
        assert_eq!(trim.current_range(), range(0, 10));
    }

    #[test]
    fn fractional_duration_rounds_up() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(61.2);
        assert_eq!(trim.max(), Some(62));
        assert_eq!(page.trim_slider.options().map(|o| o.max), Some(62.0));
    }

    #[test]
    fn dragging_end_handle_moves_playhead() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(120.0);

        page.trim_slider.drag(Handle::End, 90.0);
        assert_eq!(page.trim_end.value(), "90");
        assert_eq!(page.player.current_time(), 90.0);
        assert_eq!(page.trim_start.value(), "0");
        assert_eq!(trim.current_range(), range(0, 90));
    }

    #[test]
    fn dragging_start_handle_rounds_down() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(120.0);

        page.trim_slider.drag(Handle::Start, 12.8);
        assert_eq!(page.trim_start.value(), "12");
        assert_eq!(page.player.current_time(), 12.0);
        assert_eq!(page.trim_end.value(), "120");
        assert_eq!(trim.current_range(), range(12, 120));
    }

    #[test]
    fn scrubbing_the_player_leaves_handles_alone() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), Some(10), Some(20));
        page.player.load_metadata(60.0);
        page.player.set_current_time(45.0);
        assert_eq!(trim.current_range(), range(10, 20));
    }

    #[test]
    fn range_reads_live_handles() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(30.0);
        page.trim_slider.drag(Handle::Start, 3.0);
        page.trim_slider.drag(Handle::End, 7.5);
        assert_eq!(trim.current_range(), range(3, 7));
    }

    #[test]
    fn dispose_destroys_slider() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(30.0);
        assert!(page.trim_slider.is_built());
        trim.dispose();
        assert!(!page.trim_slider.is_built());
    }

    #[test]
    fn orphaned_listener_does_not_build() {
        let page = MemoryPage::new();
        let first = TrimRangeController::start(page.trim_surfaces(), Some(1), Some(2));
        first.dispose();
        let second = TrimRangeController::start(page.trim_surfaces(), None, None);

        page.player.load_metadata(50.0);
        assert_eq!(page.trim_slider.build_count(), 1);
        assert_eq!(second.current_range(), range(0, 50));
    }

    #[test]
    fn unusable_duration_rearms_listener() {
        let page = MemoryPage::new();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(0.0);
        assert_eq!(trim.phase(), TrimPhase::Pending);
        assert_eq!(page.player.pending_metadata_listeners(), 1);

        page.player.load_metadata(8.0);
        assert_eq!(trim.max(), Some(8));
    }

    #[test]
    fn stale_slider_is_replaced() {
        let page = MemoryPage::new();
        page.trim_slider
            .build(
                SliderOptions { min: 0.0, max: 5.0, start: [0.0, 5.0] },
                Box::new(|_, _| {}),
            )
            .unwrap();
        let trim = TrimRangeController::start(page.trim_surfaces(), None, None);
        page.player.load_metadata(20.0);
        assert_eq!(trim.max(), Some(20));
        assert_eq!(page.trim_slider.values(), Some([0.0, 20.0]));
    }
}
