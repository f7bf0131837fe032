//! Pointer tracking
//!
//! Turns a stream of pointer events into key events. Two trackers exist:
//! [`MultiPointerTracker`] follows every pointer and reference-counts keys so
//! several fingers resting on one key produce a single down/up pair, and
//! [`SinglePointerTracker`] follows only the first pointer of a gesture.
//!
//! Trackers only report what happened. Highlighting and listener dispatch
//! are done by the view, in the order the events come out of here.

use std::collections::BTreeMap;

use crate::layout::{to_pixel, KeyboardLayout};

/// Identifier the host assigns to a pointer for the duration of a gesture
pub type PointerId = u32;

/// Position of one pointer, in view pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(id: PointerId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// Input delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// A pointer touched down
    Down(PointerSample),
    /// Current positions of the active pointers
    Move(Vec<PointerSample>),
    /// A pointer lifted, completing its gesture
    Up(PointerSample),
    /// A pointer was taken away without completing its gesture
    Cancel(PointerId),
    /// The whole gesture was taken away
    CancelAll,
}

/// Output of the trackers, also what listeners are told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PianoEvent {
    /// First pointer arrived on a key
    KeyDown(usize),
    /// Last pointer left a key
    KeyUp(usize),
    /// A pointer went down and up on this key without leaving it
    KeyClick(usize),
    /// Raw position report for a pointer; `None` is empty space
    Touch(Option<usize>),
    /// Raw click report; `None` is a click on empty space
    Click(Option<usize>),
}

/// Which tracker a view uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    Multi,
    Single,
}

impl PointerMode {
    /// Pointer mode matching a highlighting setting
    pub fn for_multi_key_highlighting(enabled: bool) -> Self {
        if enabled {
            Self::Multi
        } else {
            Self::Single
        }
    }

    /// Fresh tracker for `number_of_keys` keys
    pub fn tracker(self, number_of_keys: usize) -> Box<dyn TouchTracker> {
        match self {
            Self::Multi => Box::new(MultiPointerTracker::new(number_of_keys)),
            Self::Single => Box::new(SinglePointerTracker::new()),
        }
    }
}

/// Key under a pointer sample, if there is a layout and a key there
pub fn resolve_key(layout: Option<&KeyboardLayout>, sample: &PointerSample) -> Option<usize> {
    layout.and_then(|layout| layout.touched_key(to_pixel(sample.x), to_pixel(sample.y)))
}

/// State machine from pointer events to key events
pub trait TouchTracker {
    fn mode(&self) -> PointerMode;

    /// A pointer touched down on `key`
    fn pointer_down(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>);

    /// A tracked pointer is now over `key`
    fn pointer_move(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>);

    /// A tracked pointer lifted over `key`
    fn pointer_up(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>);

    /// Forget a pointer without a click
    fn pointer_cancel(&mut self, id: PointerId, out: &mut Vec<PianoEvent>);

    /// Forget every pointer without clicks
    fn cancel_all(&mut self, out: &mut Vec<PianoEvent>);

    /// Adapt to a new key count. Only called with no active pointers.
    fn resize(&mut self, _number_of_keys: usize) {}

    /// Number of pointers currently tracked
    fn active_pointers(&self) -> usize;

    /// Resolve an event against the layout and feed it through
    fn handle(
        &mut self,
        event: &PointerEvent,
        layout: Option<&KeyboardLayout>,
        out: &mut Vec<PianoEvent>,
    ) {
        match event {
            PointerEvent::Down(sample) => {
                self.pointer_down(sample.id, resolve_key(layout, sample), out)
            }
            PointerEvent::Move(samples) => {
                for sample in samples {
                    self.pointer_move(sample.id, resolve_key(layout, sample), out);
                }
            }
            PointerEvent::Up(sample) => {
                self.pointer_up(sample.id, resolve_key(layout, sample), out)
            }
            PointerEvent::Cancel(id) => self.pointer_cancel(*id, out),
            PointerEvent::CancelAll => self.cancel_all(out),
        }
    }
}

/// Per-pointer tracking entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePointer {
    key: Option<usize>,
    moved_off_initial_key: bool,
}

/// Tracks any number of pointers, reference-counting keys
#[derive(Debug, Clone, Default)]
pub struct MultiPointerTracker {
    pointers: BTreeMap<PointerId, ActivePointer>,
    touch_counts: Vec<u32>,
}

impl MultiPointerTracker {
    pub fn new(number_of_keys: usize) -> Self {
        Self {
            pointers: BTreeMap::new(),
            touch_counts: vec![0; number_of_keys],
        }
    }

    /// Number of active pointers resting on `key`
    pub fn touch_count(&self, key: usize) -> u32 {
        self.touch_counts.get(key).copied().unwrap_or(0)
    }

    fn enter(&mut self, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        let Some(key) = key else { return };
        if let Some(count) = self.touch_counts.get_mut(key) {
            *count += 1;
            if *count == 1 {
                out.push(PianoEvent::KeyDown(key));
            }
        }
    }

    fn leave(&mut self, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        let Some(key) = key else { return };
        if let Some(count) = self.touch_counts.get_mut(key) {
            if *count > 0 {
                *count -= 1;
                if *count == 0 {
                    out.push(PianoEvent::KeyUp(key));
                }
            }
        }
    }

    /// Move a pointer to `key`, without the raw touch report
    fn relocate(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        let Some(previous) = self.pointers.get(&id).map(|p| p.key) else {
            return;
        };
        if previous == key {
            return;
        }
        self.leave(previous, out);
        if let Some(pointer) = self.pointers.get_mut(&id) {
            pointer.key = key;
            pointer.moved_off_initial_key = true;
        }
        self.enter(key, out);
    }
}

impl TouchTracker for MultiPointerTracker {
    fn mode(&self) -> PointerMode {
        PointerMode::Multi
    }

    fn pointer_down(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        if self.pointers.contains_key(&id) {
            log::trace!("Pointer {} went down twice, dropping the stale entry", id);
            self.pointer_cancel(id, out);
        }
        log::trace!("Pointer {} down on {:?}", id, key);
        self.pointers.insert(
            id,
            ActivePointer {
                key,
                moved_off_initial_key: false,
            },
        );
        out.push(PianoEvent::Touch(key));
        self.enter(key, out);
    }

    fn pointer_move(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        if !self.pointers.contains_key(&id) {
            return;
        }
        out.push(PianoEvent::Touch(key));
        self.relocate(id, key, out);
    }

    fn pointer_up(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        self.relocate(id, key, out);
        let Some(pointer) = self.pointers.remove(&id) else {
            return;
        };
        log::trace!("Pointer {} up on {:?}", id, pointer.key);
        self.leave(pointer.key, out);
        if !pointer.moved_off_initial_key {
            if let Some(key) = pointer.key {
                out.push(PianoEvent::KeyClick(key));
            }
            out.push(PianoEvent::Click(pointer.key));
        }
    }

    fn pointer_cancel(&mut self, id: PointerId, out: &mut Vec<PianoEvent>) {
        if let Some(pointer) = self.pointers.remove(&id) {
            log::trace!("Pointer {} cancelled on {:?}", id, pointer.key);
            self.leave(pointer.key, out);
        }
    }

    fn cancel_all(&mut self, out: &mut Vec<PianoEvent>) {
        let ids: Vec<PointerId> = self.pointers.keys().copied().collect();
        for id in ids {
            self.pointer_cancel(id, out);
        }
    }

    fn resize(&mut self, number_of_keys: usize) {
        self.touch_counts = vec![0; number_of_keys];
    }

    fn active_pointers(&self) -> usize {
        self.pointers.len()
    }
}

/// Tracks only the first pointer of a gesture
#[derive(Debug, Clone, Default)]
pub struct SinglePointerTracker {
    pointer: Option<PointerId>,
    last_touched_key: Option<usize>,
    moved_off_initial_key: bool,
}

impl SinglePointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn relocate(&mut self, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        if self.last_touched_key == key {
            return;
        }
        if let Some(previous) = self.last_touched_key {
            out.push(PianoEvent::KeyUp(previous));
        }
        if let Some(key) = key {
            out.push(PianoEvent::KeyDown(key));
        }
        self.last_touched_key = key;
        self.moved_off_initial_key = true;
    }

    fn is_tracking(&self, id: PointerId) -> bool {
        self.pointer == Some(id)
    }
}

impl TouchTracker for SinglePointerTracker {
    fn mode(&self) -> PointerMode {
        PointerMode::Single
    }

    fn pointer_down(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        match self.pointer {
            Some(tracked) if tracked != id => return,
            Some(_) => self.pointer_cancel(id, out),
            None => {}
        }
        log::trace!("Pointer {} down on {:?}", id, key);
        self.pointer = Some(id);
        self.last_touched_key = key;
        self.moved_off_initial_key = false;
        out.push(PianoEvent::Touch(key));
        if let Some(key) = key {
            out.push(PianoEvent::KeyDown(key));
        }
    }

    fn pointer_move(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        if !self.is_tracking(id) {
            return;
        }
        out.push(PianoEvent::Touch(key));
        self.relocate(key, out);
    }

    fn pointer_up(&mut self, id: PointerId, key: Option<usize>, out: &mut Vec<PianoEvent>) {
        if !self.is_tracking(id) {
            return;
        }
        self.relocate(key, out);
        log::trace!("Pointer {} up on {:?}", id, self.last_touched_key);
        if let Some(key) = self.last_touched_key {
            out.push(PianoEvent::KeyUp(key));
        }
        if !self.moved_off_initial_key {
            if let Some(key) = self.last_touched_key {
                out.push(PianoEvent::KeyClick(key));
            }
            out.push(PianoEvent::Click(self.last_touched_key));
        }
        *self = Self::default();
    }

    fn pointer_cancel(&mut self, id: PointerId, out: &mut Vec<PianoEvent>) {
        if !self.is_tracking(id) {
            return;
        }
        log::trace!("Pointer {} cancelled on {:?}", id, self.last_touched_key);
        if let Some(key) = self.last_touched_key {
            out.push(PianoEvent::KeyUp(key));
        }
        *self = Self::default();
    }

    fn cancel_all(&mut self, out: &mut Vec<PianoEvent>) {
        if let Some(id) = self.pointer {
            self.pointer_cancel(id, out);
        }
    }

    fn active_pointers(&self) -> usize {
        usize::from(self.pointer.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutParams;
    use PianoEvent::*;

    fn layout() -> KeyboardLayout {
        // 7 white keys of 100px, black keys 60px wide and 180px tall
        KeyboardLayout::compute(LayoutParams {
            width: 700,
            height: 300,
            number_of_keys: 12,
            black_key_width_scale: 0.6,
            black_key_height_scale: 0.6,
            stroke_width: 0,
        })
    }

    /// A point on the lower, white-only part of a white key
    fn white(key: usize) -> (f32, f32) {
        let x = match key {
            0 => 50.0,
            2 => 150.0,
            4 => 250.0,
            5 => 350.0,
            7 => 450.0,
            9 => 550.0,
            11 => 650.0,
            _ => panic!("not a white key: {}", key),
        };
        (x, 250.0)
    }

    fn down(id: PointerId, (x, y): (f32, f32)) -> PointerEvent {
        PointerEvent::Down(PointerSample::new(id, x, y))
    }

    fn up(id: PointerId, (x, y): (f32, f32)) -> PointerEvent {
        PointerEvent::Up(PointerSample::new(id, x, y))
    }

    fn moved(samples: &[(PointerId, (f32, f32))]) -> PointerEvent {
        PointerEvent::Move(
            samples
                .iter()
                .map(|&(id, (x, y))| PointerSample::new(id, x, y))
                .collect(),
        )
    }

    fn run(tracker: &mut dyn TouchTracker, events: &[PointerEvent]) -> Vec<PianoEvent> {
        let layout = layout();
        let mut out = Vec::new();
        for event in events {
            tracker.handle(event, Some(&layout), &mut out);
        }
        out
    }

    fn key_events(events: &[PianoEvent]) -> Vec<PianoEvent> {
        events
            .iter()
            .copied()
            .filter(|e| !matches!(e, Touch(_) | Click(_)))
            .collect()
    }

    #[test]
    fn test_tap_emits_down_up_click() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(&mut tracker, &[down(0, white(5)), up(0, white(5))]);
        assert_eq!(
            out,
            vec![Touch(Some(5)), KeyDown(5), KeyUp(5), KeyClick(5), Click(Some(5))]
        );
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_two_pointers_on_one_key() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(&mut tracker, &[down(0, white(5)), down(1, (340.0, 280.0))]);
        assert_eq!(key_events(&out), vec![KeyDown(5)]);
        assert_eq!(tracker.touch_count(5), 2);

        let out = run(&mut tracker, &[up(0, white(5))]);
        assert_eq!(key_events(&out), vec![KeyClick(5)]);

        let out = run(&mut tracker, &[up(1, (340.0, 280.0))]);
        assert_eq!(key_events(&out), vec![KeyUp(5), KeyClick(5)]);
        assert_eq!(tracker.touch_count(5), 0);
    }

    #[test]
    fn test_sliding_changes_keys_without_click() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(
            &mut tracker,
            &[
                down(3, white(0)),
                moved(&[(3, (60.0, 250.0))]),
                moved(&[(3, white(2))]),
                up(3, white(2)),
            ],
        );
        assert_eq!(
            out,
            vec![
                Touch(Some(0)),
                KeyDown(0),
                Touch(Some(0)),
                Touch(Some(2)),
                KeyUp(0),
                KeyDown(2),
                KeyUp(2),
            ]
        );
    }

    #[test]
    fn test_sliding_back_to_initial_key_is_not_a_click() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(
            &mut tracker,
            &[
                down(0, white(4)),
                moved(&[(0, white(5))]),
                moved(&[(0, white(4))]),
                up(0, white(4)),
            ],
        );
        assert!(!out.iter().any(|e| matches!(e, KeyClick(_) | Click(_))));
    }

    #[test]
    fn test_lifting_over_another_key_is_not_a_click() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(&mut tracker, &[down(0, white(7)), up(0, white(9))]);
        assert_eq!(key_events(&out), vec![KeyDown(7), KeyUp(7), KeyDown(9), KeyUp(9)]);
    }

    #[test]
    fn test_black_key_wins_overlap() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(&mut tracker, &[down(0, (95.0, 20.0))]);
        assert_eq!(key_events(&out), vec![KeyDown(1)]);
    }

    #[test]
    fn test_empty_space_only_reports_raw_events() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(&mut tracker, &[down(0, (800.0, 10.0)), up(0, (800.0, 10.0))]);
        assert_eq!(out, vec![Touch(None), Click(None)]);
    }

    #[test]
    fn test_cancel_releases_without_click() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(
            &mut tracker,
            &[down(0, white(9)), PointerEvent::Cancel(0), up(0, white(9))],
        );
        assert_eq!(out, vec![Touch(Some(9)), KeyDown(9), KeyUp(9)]);
    }

    #[test]
    fn test_cancel_all() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(
            &mut tracker,
            &[down(0, white(0)), down(1, white(2)), down(2, white(2)), PointerEvent::CancelAll],
        );
        assert_eq!(key_events(&out), vec![KeyDown(0), KeyDown(2), KeyUp(0), KeyUp(2)]);
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_unknown_pointers_are_ignored() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(
            &mut tracker,
            &[moved(&[(4, white(0))]), up(4, white(0)), PointerEvent::Cancel(4)],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_repeated_down_drops_stale_pointer() {
        let mut tracker = MultiPointerTracker::new(12);
        let out = run(&mut tracker, &[down(0, white(0)), down(0, white(2)), up(0, white(2))]);
        assert_eq!(
            key_events(&out),
            vec![KeyDown(0), KeyUp(0), KeyDown(2), KeyUp(2), KeyClick(2)]
        );
    }

    #[test]
    fn test_downs_and_ups_balance() {
        let mut tracker = MultiPointerTracker::new(12);
        let path = [white(0), (95.0, 20.0), white(2), white(4), (800.0, 10.0), white(5)];
        let mut events = Vec::new();
        for id in 0..3 {
            events.push(down(id, path[id as usize]));
        }
        for step in 0..path.len() {
            let samples: Vec<(PointerId, (f32, f32))> = (0..3)
                .map(|id| (id, path[(step + id as usize * 2) % path.len()]))
                .collect();
            events.push(moved(&samples));
        }
        for id in 0..3 {
            events.push(up(id, white(11)));
        }
        let out = run(&mut tracker, &events);

        for key in 0..12 {
            let downs = out.iter().filter(|&&e| e == KeyDown(key)).count();
            let ups = out.iter().filter(|&&e| e == KeyUp(key)).count();
            assert_eq!(downs, ups, "key {}", key);
        }
        assert_eq!(tracker.touch_count(11), 0);
    }

    #[test]
    fn test_single_tracker_follows_first_pointer() {
        let mut tracker = SinglePointerTracker::new();
        let out = run(
            &mut tracker,
            &[
                down(0, white(0)),
                down(1, white(4)),
                moved(&[(0, white(0)), (1, white(5))]),
                up(1, white(5)),
                up(0, white(0)),
            ],
        );
        assert_eq!(
            out,
            vec![
                Touch(Some(0)),
                KeyDown(0),
                Touch(Some(0)),
                KeyUp(0),
                KeyClick(0),
                Click(Some(0)),
            ]
        );
    }

    #[test]
    fn test_single_tracker_slide() {
        let mut tracker = SinglePointerTracker::new();
        let out = run(
            &mut tracker,
            &[down(0, white(9)), moved(&[(0, white(11))]), up(0, white(11))],
        );
        assert_eq!(key_events(&out), vec![KeyDown(9), KeyUp(9), KeyDown(11), KeyUp(11)]);
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_single_tracker_cancel() {
        let mut tracker = SinglePointerTracker::new();
        let out = run(&mut tracker, &[down(2, white(2)), PointerEvent::CancelAll]);
        assert_eq!(out, vec![Touch(Some(2)), KeyDown(2), KeyUp(2)]);
        assert_eq!(tracker.active_pointers(), 0);
    }

    #[test]
    fn test_no_layout_means_no_keys() {
        let mut tracker = MultiPointerTracker::new(12);
        let mut out = Vec::new();
        tracker.handle(&down(0, white(0)), None, &mut out);
        tracker.handle(&up(0, white(0)), None, &mut out);
        assert_eq!(out, vec![Touch(None), Click(None)]);
    }
}
