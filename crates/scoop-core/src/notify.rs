//! Single-slot status notifications.
//!
//! At most one [`Notice`] is visible at a time. Publishing replaces whatever
//! is showing (last writer wins). Success and error notices expire lazily:
//! [`Notifier::current`] stops returning them once their TTL has elapsed.
//! Info and loading notices stay until replaced or dismissed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Severity of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Info,
    /// A remote operation is in progress.
    Loading,
    Success,
    Error,
}

impl NoticeKind {
    /// Whether the notice expires after the notifier's TTL.
    pub fn auto_dismisses(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Loading => "Working",
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }
}

/// One published notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub kind: NoticeKind,
    pub published_at: Instant,
}

impl Notice {
    fn expired(&self, ttl: Duration, now: Instant) -> bool {
        self.kind.auto_dismisses() && now.saturating_duration_since(self.published_at) >= ttl
    }
}

type Listener = Rc<dyn Fn(Option<&Notice>)>;

struct NotifierState {
    slot: Option<Notice>,
    next_id: u64,
    ttl: Duration,
    listeners: Vec<Listener>,
}

/// Shared handle to the notification slot.
#[derive(Clone)]
pub struct Notifier(Rc<RefCell<NotifierState>>);

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("Notifier")
            .field("slot", &state.slot)
            .field("ttl", &state.ttl)
            .finish()
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self(Rc::new(RefCell::new(NotifierState {
            slot: None,
            next_id: 0,
            ttl,
            listeners: Vec::new(),
        })))
    }

    pub fn ttl(&self) -> Duration {
        self.0.borrow().ttl
    }

    /// Replace the current notice. Returns the new notice id.
    pub fn publish(&self, message: impl Into<String>, kind: NoticeKind) -> u64 {
        self.publish_at(message, kind, Instant::now())
    }

    /// [`publish`](Self::publish) with an explicit timestamp.
    pub fn publish_at(&self, message: impl Into<String>, kind: NoticeKind, now: Instant) -> u64 {
        let notice = {
            let mut state = self.0.borrow_mut();
            state.next_id += 1;
            let notice = Notice {
                id: state.next_id,
                message: message.into(),
                kind,
                published_at: now,
            };
            state.slot = Some(notice.clone());
            notice
        };
        tracing::debug!(id = notice.id, kind = ?notice.kind, message = %notice.message, "notice");
        self.emit(Some(&notice));
        notice.id
    }

    /// The visible notice, if any and not yet expired.
    pub fn current(&self) -> Option<Notice> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<Notice> {
        let mut state = self.0.borrow_mut();
        let ttl = state.ttl;
        if state.slot.as_ref().is_some_and(|n| n.expired(ttl, now)) {
            state.slot = None;
        }
        state.slot.clone()
    }

    /// Clear the slot if it still shows notice `id`.
    ///
    /// A dismissal for a notice that has already been replaced is ignored.
    pub fn dismiss(&self, id: u64) -> bool {
        let cleared = {
            let mut state = self.0.borrow_mut();
            if state.slot.as_ref().is_some_and(|n| n.id == id) {
                state.slot = None;
                true
            } else {
                false
            }
        };
        if cleared {
            self.emit(None);
        }
        cleared
    }

    /// Call `listener` on every publish and dismissal.
    pub fn subscribe(&self, listener: impl Fn(Option<&Notice>) + 'static) {
        self.0.borrow_mut().listeners.push(Rc::new(listener));
    }

    fn emit(&self, notice: Option<&Notice>) {
        let listeners = self.0.borrow().listeners.clone();
        for listener in listeners {
            listener(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const TTL: Duration = Duration::from_secs(5);

    #[test]
    fn test_last_writer_wins() {
        let notifier = Notifier::new(TTL);
        notifier.publish("Uploading File...", NoticeKind::Loading);
        notifier.publish("File Uploaded!", NoticeKind::Success);

        let current = notifier.current().unwrap();
        assert_eq!(current.message, "File Uploaded!");
        assert_eq!(current.kind, NoticeKind::Success);
    }

    #[test]
    fn test_auto_dismiss_after_ttl() {
        let notifier = Notifier::new(TTL);
        let start = Instant::now();
        notifier.publish_at("done", NoticeKind::Success, start);

        assert!(notifier.current_at(start + Duration::from_secs(4)).is_some());
        assert!(notifier.current_at(start + TTL).is_none());
        // Expiry is sticky
        assert!(notifier.current_at(start).is_none());
    }

    #[test]
    fn test_loading_and_info_persist() {
        let notifier = Notifier::new(TTL);
        let start = Instant::now();
        notifier.publish_at("Deleting file...", NoticeKind::Loading, start);
        assert!(notifier.current_at(start + Duration::from_secs(600)).is_some());

        notifier.publish_at("Create a Storage Account to get started", NoticeKind::Info, start);
        assert!(notifier.current_at(start + Duration::from_secs(600)).is_some());
    }

    #[test]
    fn test_stale_dismiss_is_ignored() {
        let notifier = Notifier::new(TTL);
        let first = notifier.publish("one", NoticeKind::Info);
        let second = notifier.publish("two", NoticeKind::Error);

        assert!(!notifier.dismiss(first));
        assert_eq!(notifier.current().unwrap().id, second);
        assert!(notifier.dismiss(second));
        assert!(notifier.current().is_none());
    }

    #[test]
    fn test_listeners_see_every_change() {
        let notifier = Notifier::new(TTL);
        let seen = Rc::new(Cell::new(0));
        let cleared = Rc::new(Cell::new(false));
        {
            let seen = seen.clone();
            let cleared = cleared.clone();
            notifier.subscribe(move |notice| {
                seen.set(seen.get() + 1);
                cleared.set(notice.is_none());
            });
        }

        let id = notifier.publish("hello", NoticeKind::Info);
        assert!(!cleared.get());
        notifier.dismiss(id);
        assert_eq!(seen.get(), 2);
        assert!(cleared.get());
    }
}
