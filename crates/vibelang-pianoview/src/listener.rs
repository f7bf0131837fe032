//! Listener interface for piano events

use crossbeam_channel::Sender;

use crate::touch::PianoEvent;
use crate::view::PianoView;

/// Handle returned by [`PianoView::add_listener`], used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Receives piano events
///
/// Every method has an empty default, so a listener only implements the
/// events it cares about. Listeners are called synchronously, in the order
/// they were added, and get read access to the view that fired the event.
#[allow(unused_variables)]
pub trait PianoListener {
    /// The first pointer arrived on `key`
    fn on_key_down(&mut self, piano: &PianoView, key: usize) {}

    /// The last pointer left `key`
    fn on_key_up(&mut self, piano: &PianoView, key: usize) {}

    /// A pointer went down and up on `key` without leaving it
    fn on_key_click(&mut self, piano: &PianoView, key: usize) {}

    /// Raw report of where a pointer is; `None` means empty space
    fn on_piano_touch(&mut self, piano: &PianoView, key: Option<usize>) {}

    /// Raw click report; `None` means a click on empty space
    fn on_piano_click(&mut self, piano: &PianoView, key: Option<usize>) {}
}

/// Route one event to the matching listener method
pub(crate) fn dispatch(listener: &mut dyn PianoListener, piano: &PianoView, event: PianoEvent) {
    match event {
        PianoEvent::KeyDown(key) => listener.on_key_down(piano, key),
        PianoEvent::KeyUp(key) => listener.on_key_up(piano, key),
        PianoEvent::KeyClick(key) => listener.on_key_click(piano, key),
        PianoEvent::Touch(key) => listener.on_piano_touch(piano, key),
        PianoEvent::Click(key) => listener.on_piano_click(piano, key),
    }
}

/// Forwards every event into a channel
///
/// Lets a host consume events away from the view, e.g. drain them once per
/// frame.
pub struct ChannelListener {
    sender: Sender<PianoEvent>,
}

impl ChannelListener {
    pub fn new(sender: Sender<PianoEvent>) -> Self {
        Self { sender }
    }

    fn forward(&self, event: PianoEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("Piano event receiver dropped, discarding {:?}", event);
        }
    }
}

impl PianoListener for ChannelListener {
    fn on_key_down(&mut self, _piano: &PianoView, key: usize) {
        self.forward(PianoEvent::KeyDown(key));
    }

    fn on_key_up(&mut self, _piano: &PianoView, key: usize) {
        self.forward(PianoEvent::KeyUp(key));
    }

    fn on_key_click(&mut self, _piano: &PianoView, key: usize) {
        self.forward(PianoEvent::KeyClick(key));
    }

    fn on_piano_touch(&mut self, _piano: &PianoView, key: Option<usize>) {
        self.forward(PianoEvent::Touch(key));
    }

    fn on_piano_click(&mut self, _piano: &PianoView, key: Option<usize>) {
        self.forward(PianoEvent::Click(key));
    }
}
