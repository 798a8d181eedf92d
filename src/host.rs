//! Host services injected into the animation
//!
//! The host answers viewport queries, tracks resize subscriptions and
//! schedules frames. Frames and resizes are delivered back to the
//! animation by whoever drives the host (`FlameAnimation::on_frame`,
//! `FlameAnimation::on_resize`).

use std::collections::{BTreeSet, VecDeque};

/// Cancellable token for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Token for a resize subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

pub trait Host {
    /// Current viewport size in pixels
    fn viewport_size(&self) -> (u32, u32);

    fn subscribe_resize(&mut self) -> ListenerId;

    fn unsubscribe_resize(&mut self, id: ListenerId);

    /// Ask for one frame at the next display refresh
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

impl<H: Host + ?Sized> Host for &mut H {
    fn viewport_size(&self) -> (u32, u32) {
        (**self).viewport_size()
    }

    fn subscribe_resize(&mut self) -> ListenerId {
        (**self).subscribe_resize()
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        (**self).unsubscribe_resize(id);
    }

    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle);
    }
}

/// Single-threaded host that queues frame requests until the driver
/// collects them with `take_due_frames`
///
/// The windowed binary drains it once per vsync; tests drain it by hand.
#[derive(Debug)]
pub struct QueuedHost {
    viewport: (u32, u32),
    pending: VecDeque<FrameHandle>,
    next_frame: u64,
    frames_requested: u64,
    listeners: BTreeSet<ListenerId>,
    next_listener: u64,
}

impl QueuedHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width, height),
            pending: VecDeque::new(),
            next_frame: 1,
            frames_requested: 0,
            listeners: BTreeSet::new(),
            next_listener: 1,
        }
    }

    /// Record a viewport change; returns true if anyone is listening
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.viewport = (width, height);
        !self.listeners.is_empty()
    }

    /// Drain every frame request made so far, oldest first
    pub fn take_due_frames(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Total frames ever requested, including cancelled ones
    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.contains(&id)
    }
}

impl Host for QueuedHost {
    fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn subscribe_resize(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        id
    }

    fn unsubscribe_resize(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_frame);
        self.next_frame += 1;
        self.frames_requested += 1;
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }
}
