//! The piano view
//!
//! [`PianoView`] owns the style, the computed layout, the highlighted keys
//! and the pointer tracker, and wires them together:
//!
//! - geometry setters recompute the layout on the spot,
//! - colour setters only ask for a redraw,
//! - pointer events go through the tracker, then each resulting event is
//!   sent to the listeners and applied to the highlight state, in order.
//!
//! Nothing is drawn directly. Hosts poll [`PianoView::take_redraw_request`]
//! and paint [`PianoView::display_list`] (or call [`PianoView::draw`]).

use crate::error::Result;
use crate::highlight::Highlight;
use crate::key::count_keys;
use crate::layout::{to_pixel, KeyboardLayout, LayoutParams, Rect};
use crate::listener::{dispatch, ListenerId, PianoListener};
use crate::paint::{display_list, Canvas, Color, RoundedRect};
use crate::state::SavedState;
use crate::style::{validate_number_of_keys, validate_scale, PianoStyle, ShowPressMode};
use crate::touch::{PianoEvent, PointerEvent, PointerMode, TouchTracker};

/// Piano keyboard widget core
pub struct PianoView {
    style: PianoStyle,
    size: Option<(u32, u32)>,
    layout: Option<KeyboardLayout>,
    highlight: Highlight,
    tracker: Box<dyn TouchTracker>,
    listeners: Vec<(ListenerId, Box<dyn PianoListener>)>,
    next_listener_id: u64,
    redraw_requested: bool,
}

impl PianoView {
    /// Create a view with the given style
    ///
    /// No layout exists until the host reports a size with
    /// [`set_size`](Self::set_size).
    pub fn new(style: PianoStyle) -> Result<Self> {
        style.validate()?;
        let highlight = Highlight::new(style.multi_key_highlighting);
        let tracker = PointerMode::for_multi_key_highlighting(style.multi_key_highlighting)
            .tracker(style.number_of_keys);
        Ok(Self {
            style,
            size: None,
            layout: None,
            highlight,
            tracker,
            listeners: Vec::new(),
            next_listener_id: 0,
            redraw_requested: true,
        })
    }

    // -- Size and layout --------------------------------------------------

    /// Report the view size in pixels and lay the keys out for it
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
        self.relayout();
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Current layout, if a size has been reported since the last restore
    pub fn layout(&self) -> Option<&KeyboardLayout> {
        self.layout.as_ref()
    }

    fn relayout(&mut self) {
        let Some((width, height)) = self.size else {
            return;
        };
        let params = LayoutParams {
            width: clamp_to_i32(width),
            height: clamp_to_i32(height),
            number_of_keys: self.style.number_of_keys,
            black_key_width_scale: self.style.black_key_width_scale,
            black_key_height_scale: self.style.black_key_height_scale,
            stroke_width: clamp_to_i32(self.style.key_stroke_width),
        };
        self.layout = Some(KeyboardLayout::compute(params));
        self.request_redraw();
    }

    // -- Redraw requests --------------------------------------------------

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    /// Whether something visible changed since the last take
    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    /// Return and reset the redraw flag
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    // -- Painting ---------------------------------------------------------

    /// Everything to paint, back to front; empty without a layout
    pub fn display_list(&self) -> Vec<RoundedRect> {
        self.layout
            .as_ref()
            .map(|layout| display_list(layout, &self.highlight, &self.style))
            .unwrap_or_default()
    }

    /// Paint onto a canvas
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for rect in self.display_list() {
            canvas.draw_rounded_rect(&rect);
        }
    }

    // -- Style ------------------------------------------------------------

    pub fn style(&self) -> &PianoStyle {
        &self.style
    }

    pub fn number_of_keys(&self) -> usize {
        self.style.number_of_keys
    }

    pub fn number_of_white_keys(&self) -> usize {
        count_keys(self.style.number_of_keys).0
    }

    pub fn number_of_black_keys(&self) -> usize {
        count_keys(self.style.number_of_keys).1
    }

    /// Change the number of keys, keeping the view width
    ///
    /// Active pointers are cancelled and highlights of keys that no longer
    /// exist are dropped.
    pub fn set_number_of_keys(&mut self, number_of_keys: usize) -> Result<()> {
        validate_number_of_keys(number_of_keys)?;
        if number_of_keys == self.style.number_of_keys {
            return Ok(());
        }
        log::debug!(
            "Number of keys {} -> {}",
            self.style.number_of_keys,
            number_of_keys
        );
        self.cancel_pointers();
        self.style.number_of_keys = number_of_keys;
        if self.highlight.prune(number_of_keys) {
            self.request_redraw();
        }
        self.tracker.resize(number_of_keys);
        self.relayout();
        Ok(())
    }

    pub fn black_key_width_scale(&self) -> f32 {
        self.style.black_key_width_scale
    }

    /// Black key width relative to white key width (0.7 = 70%)
    pub fn set_black_key_width_scale(&mut self, scale: f32) -> Result<()> {
        validate_scale("blackKeyWidthScale", scale)?;
        if scale != self.style.black_key_width_scale {
            self.style.black_key_width_scale = scale;
            self.relayout();
        }
        Ok(())
    }

    pub fn black_key_height_scale(&self) -> f32 {
        self.style.black_key_height_scale
    }

    /// Black key height relative to the view height (0.7 = 70%)
    pub fn set_black_key_height_scale(&mut self, scale: f32) -> Result<()> {
        validate_scale("blackKeyHeightScale", scale)?;
        if scale != self.style.black_key_height_scale {
            self.style.black_key_height_scale = scale;
            self.relayout();
        }
        Ok(())
    }

    pub fn white_key_color(&self) -> Color {
        self.style.white_key_color
    }

    pub fn set_white_key_color(&mut self, color: Color) {
        if color != self.style.white_key_color {
            self.style.white_key_color = color;
            self.request_redraw();
        }
    }

    pub fn black_key_color(&self) -> Color {
        self.style.black_key_color
    }

    pub fn set_black_key_color(&mut self, color: Color) {
        if color != self.style.black_key_color {
            self.style.black_key_color = color;
            self.request_redraw();
        }
    }

    pub fn pressed_key_color(&self) -> Color {
        self.style.pressed_key_color
    }

    pub fn set_pressed_key_color(&mut self, color: Color) {
        if color != self.style.pressed_key_color {
            self.style.pressed_key_color = color;
            self.request_redraw();
        }
    }

    pub fn key_stroke_color(&self) -> Color {
        self.style.key_stroke_color
    }

    pub fn set_key_stroke_color(&mut self, color: Color) {
        if color != self.style.key_stroke_color {
            self.style.key_stroke_color = color;
            self.request_redraw();
        }
    }

    pub fn key_stroke_width(&self) -> u32 {
        self.style.key_stroke_width
    }

    /// Keys overlap by the stroke width, so this relayouts
    pub fn set_key_stroke_width(&mut self, width: u32) {
        if width != self.style.key_stroke_width {
            self.style.key_stroke_width = width;
            self.relayout();
        }
    }

    pub fn key_corner_radius(&self) -> u32 {
        self.style.key_corner_radius
    }

    pub fn set_key_corner_radius(&mut self, radius: u32) {
        if radius != self.style.key_corner_radius {
            self.style.key_corner_radius = radius;
            self.request_redraw();
        }
    }

    // -- Modes ------------------------------------------------------------

    pub fn show_press_mode(&self) -> ShowPressMode {
        self.style.show_press_mode
    }

    /// Switch press mode
    ///
    /// Leaving [`ShowPressMode::OnClick`] clears the click highlights, they
    /// mean nothing in the other modes. Leaving [`ShowPressMode::OnDown`]
    /// cancels the active pointers while still in that mode, so the keys
    /// they hold are released and unlit.
    pub fn set_show_press_mode(&mut self, mode: ShowPressMode) {
        if mode == self.style.show_press_mode {
            return;
        }
        log::debug!("Show press mode {} -> {}", self.style.show_press_mode, mode);
        match self.style.show_press_mode {
            ShowPressMode::OnClick => {
                if self.highlight.clear() {
                    self.request_redraw();
                }
            }
            ShowPressMode::OnDown => self.cancel_pointers(),
            ShowPressMode::Off => {}
        }
        self.style.show_press_mode = mode;
    }

    pub fn is_multi_key_highlighting_enabled(&self) -> bool {
        self.style.multi_key_highlighting
    }

    /// Allow or forbid more than one highlighted key
    ///
    /// This also picks the pointer tracker: multi-pointer when enabled,
    /// single-pointer otherwise. Active pointers are cancelled first. When
    /// disabling with several keys highlighted only the lowest stays lit.
    pub fn set_multi_key_highlighting(&mut self, enabled: bool) {
        if enabled == self.style.multi_key_highlighting {
            return;
        }
        log::debug!("Multi key highlighting: {}", enabled);
        self.cancel_pointers();
        if self.highlight.set_multi(enabled) {
            self.request_redraw();
        }
        self.style.multi_key_highlighting = enabled;
        self.tracker =
            PointerMode::for_multi_key_highlighting(enabled).tracker(self.style.number_of_keys);
    }

    /// Which tracker is handling pointer input
    pub fn pointer_mode(&self) -> PointerMode {
        self.tracker.mode()
    }

    // -- Highlighting -----------------------------------------------------

    /// Highlight a key; out-of-range keys are ignored
    pub fn show_key_pressed(&mut self, key: usize) {
        if key < self.style.number_of_keys && self.highlight.show_pressed(key) {
            self.request_redraw();
        }
    }

    /// Return a key to its normal colour
    pub fn show_key_not_pressed(&mut self, key: usize) {
        if self.highlight.show_not_pressed(key) {
            self.request_redraw();
        }
    }

    /// Return every key to its normal colour
    pub fn clear_pressed_keys(&mut self) {
        if self.highlight.clear() {
            self.request_redraw();
        }
    }

    pub fn is_key_pressed(&self, key: usize) -> bool {
        self.highlight.is_pressed(key)
    }

    /// Highlighted keys in ascending order
    pub fn pressed_keys(&self) -> Vec<usize> {
        self.highlight.pressed_keys().collect()
    }

    // -- Queries ----------------------------------------------------------

    /// Pixel bounds of a key, once laid out
    pub fn key_bounds(&self, key: usize) -> Option<Rect> {
        self.layout.as_ref().and_then(|layout| layout.key_bounds(key))
    }

    /// Key under a point in view pixels
    pub fn touched_key(&self, x: f32, y: f32) -> Option<usize> {
        self.layout
            .as_ref()
            .and_then(|layout| layout.touched_key(to_pixel(x), to_pixel(y)))
    }

    /// Number of pointers currently tracked
    pub fn active_pointers(&self) -> usize {
        self.tracker.active_pointers()
    }

    // -- Listeners --------------------------------------------------------

    /// Subscribe a listener; listeners are called in the order added
    pub fn add_listener<L: PianoListener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe a listener. Returns `false` for an unknown id.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // -- Input ------------------------------------------------------------

    /// Feed one pointer event
    pub fn on_pointer_event(&mut self, event: &PointerEvent) {
        log::trace!("Pointer event: {:?}", event);
        let mut events = Vec::new();
        self.tracker.handle(event, self.layout.as_ref(), &mut events);
        self.apply(events);
    }

    fn cancel_pointers(&mut self) {
        let mut events = Vec::new();
        self.tracker.cancel_all(&mut events);
        self.apply(events);
    }

    fn apply(&mut self, events: Vec<PianoEvent>) {
        for event in events {
            self.notify(event);
            self.update_highlight(event);
        }
    }

    fn notify(&mut self, event: PianoEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            dispatch(listener.as_mut(), self, event);
        }
        self.listeners = listeners;
    }

    fn update_highlight(&mut self, event: PianoEvent) {
        match (self.style.show_press_mode, event) {
            (ShowPressMode::OnDown, PianoEvent::KeyDown(key)) => self.show_key_pressed(key),
            (ShowPressMode::OnDown, PianoEvent::KeyUp(key)) => self.show_key_not_pressed(key),
            (ShowPressMode::OnClick, PianoEvent::KeyClick(key)) => {
                if key < self.style.number_of_keys {
                    self.highlight.toggle(key);
                    self.request_redraw();
                }
            }
            _ => {}
        }
    }

    // -- Save / restore ---------------------------------------------------

    /// Capture the state worth persisting
    pub fn save_state(&self) -> SavedState {
        SavedState::new(&self.style, self.highlight.pressed_keys())
    }

    /// Restore a saved state
    ///
    /// The state is validated before anything changes. The layout and the
    /// recorded size are dropped rather than recomputed: keys reappear at
    /// the next [`set_size`](Self::set_size). Until then geometry setters
    /// only record their values, [`key_bounds`](Self::key_bounds) and
    /// [`touched_key`](Self::touched_key) return `None` and pointer input
    /// reaches no key.
    pub fn restore_state(&mut self, state: &SavedState) -> Result<()> {
        let style = state.style();
        style.validate()?;
        self.cancel_pointers();

        let number_of_keys = style.number_of_keys;
        let mut highlight = Highlight::new(style.multi_key_highlighting);
        highlight.replace(
            state
                .pressed_keys
                .iter()
                .copied()
                .filter(|&key| key < number_of_keys),
        );

        self.tracker = PointerMode::for_multi_key_highlighting(style.multi_key_highlighting)
            .tracker(number_of_keys);
        self.highlight = highlight;
        self.style = style;
        self.size = None;
        self.layout = None;
        self.request_redraw();
        log::debug!(
            "Restored piano state: {} keys, pressed {:?}",
            number_of_keys,
            self.pressed_keys()
        );
        Ok(())
    }
}

fn clamp_to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
