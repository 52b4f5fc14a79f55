//! Player-facing notices.
//!
//! Transient notices queue up for the UI shell to show as toasts. A
//! persistent notice (GPS lost, AR session lost) stays pinned until it is
//! cleared by recovery.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::shared::*;

/// Oldest transient notices are dropped past this many.
pub const MAX_QUEUED_NOTICES: usize = 16;

pub struct NoticePlugin;

impl Plugin for NoticePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NoticeBoard>()
            .add_event::<NoticeEvent>()
            .add_systems(PostUpdate, collect_notices);
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct NoticeBoard {
    pub transient: VecDeque<String>,
    pub persistent: Option<String>,
}

impl NoticeBoard {
    pub fn post(&mut self, notice: &NoticeEvent) {
        if notice.persistent {
            self.persistent = Some(notice.message.clone());
            return;
        }
        if self.transient.len() >= MAX_QUEUED_NOTICES {
            self.transient.pop_front();
        }
        self.transient.push_back(notice.message.clone());
    }

    /// Hands queued transient notices to the UI and empties the queue.
    pub fn drain_transient(&mut self) -> Vec<String> {
        self.transient.drain(..).collect()
    }

    /// Removes the pinned notice only if it is `message`, so recovering from
    /// one problem never hides another.
    pub fn dismiss_persistent(&mut self, message: &str) {
        if self.persistent.as_deref() == Some(message) {
            self.persistent = None;
        }
    }
}

fn collect_notices(mut events: EventReader<NoticeEvent>, mut board: ResMut<NoticeBoard>) {
    for notice in events.read() {
        board.post(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_notice_replaces_previous() {
        let mut board = NoticeBoard::default();
        board.post(&NoticeEvent::persistent("GPS unavailable"));
        board.post(&NoticeEvent::persistent("AR session lost"));
        assert_eq!(board.persistent.as_deref(), Some("AR session lost"));
        assert!(board.transient.is_empty());
    }

    #[test]
    fn test_dismiss_only_matching_persistent() {
        let mut board = NoticeBoard::default();
        board.post(&NoticeEvent::persistent("GPS unavailable"));
        board.dismiss_persistent("AR session lost");
        assert_eq!(board.persistent.as_deref(), Some("GPS unavailable"));
        board.dismiss_persistent("GPS unavailable");
        assert!(board.persistent.is_none());
    }

    #[test]
    fn test_transient_queue_is_bounded() {
        let mut board = NoticeBoard::default();
        for i in 0..(MAX_QUEUED_NOTICES + 4) {
            board.post(&NoticeEvent::transient(format!("notice {}", i)));
        }
        assert_eq!(board.transient.len(), MAX_QUEUED_NOTICES);
        assert_eq!(board.transient.front().map(String::as_str), Some("notice 4"));
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut board = NoticeBoard::default();
        board.post(&NoticeEvent::transient("Invalid code"));
        assert_eq!(board.drain_transient(), vec!["Invalid code".to_string()]);
        assert!(board.transient.is_empty());
    }
}
