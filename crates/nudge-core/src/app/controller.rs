//! ArmingController - background 通知の arming / disarming 状態機械
//!
//! # 遷移
//! ```text
//!   previous == active && next == background  → Arm（予約を 1 件要求）
//!   next == active && handle あり               → Disarm（取り消し、handle は即クリア）
//!   それ以外                                     → 何もしない
//!   最後に previous = next
//! ```
//!
//! 通知が配信されたら（予約から `delay` 経過）`expired` で handle をクリアします。
//! その後に active へ戻っても取り消すものはありません。
//!
//! controller 自身は I/O をしません。`on_lifecycle_change` は [`Command`] を返すだけで、
//! 実際の schedule / cancel は [`ArmingLoop`](super::arming_loop::ArmingLoop) が実行し、
//! 結果を `armed` / `arm_failed` で戻します。
//!
//! # in-flight 中の遷移
//! Arm の結果が戻る前に active へ戻った場合、その arming は ticket ごと無効になります。
//! 後から handle が届いたら `armed` がその handle を返すので、loop が取り消して
//! 孤立した通知は残りません。

use std::time::Duration;

use crate::domain::{LifecycleState, NotificationContent, NotificationHandle};

/// controller が loop に実行を依頼する副作用
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Arm {
        ticket: u64,
        content: NotificationContent,
        delay: Duration,
    },
    Disarm { handle: NotificationHandle },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    /// schedule を要求済みで、結果待ち
    Arming(u64),
    Armed { ticket: u64, handle: NotificationHandle },
}

/// ArmingController は未配信の background 通知を高々 1 件だけ保持する
#[derive(Debug, Clone)]
pub struct ArmingController {
    previous: LifecycleState,
    slot: Slot,
    next_ticket: u64,
    delay: Duration,
    content: NotificationContent,
}

impl ArmingController {
    /// `initial` はホストが起動時に報告した状態。handle は空で始まる
    pub fn new(initial: LifecycleState, delay: Duration, content: NotificationContent) -> Self {
        Self {
            previous: initial,
            slot: Slot::Empty,
            next_ticket: 1,
            delay,
            content,
        }
    }

    pub fn previous_state(&self) -> LifecycleState {
        self.previous
    }

    /// 記録済みの handle（予約が成功して、まだ取り消していないもの）
    pub fn handle(&self) -> Option<NotificationHandle> {
        match self.slot {
            Slot::Armed { handle, .. } => Some(handle),
            _ => None,
        }
    }

    /// schedule の結果待ちかどうか
    pub fn is_arming(&self) -> bool {
        matches!(self.slot, Slot::Arming(_))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// lifecycle の変化を 1 件処理する
    pub fn on_lifecycle_change(&mut self, next: LifecycleState) -> Option<Command> {
        let command = match (self.previous, next) {
            (LifecycleState::Active, LifecycleState::Background) => {
                debug_assert!(self.slot == Slot::Empty, "slot must be empty while active");
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                self.slot = Slot::Arming(ticket);
                Some(Command::Arm {
                    ticket,
                    content: self.content.clone(),
                    delay: self.delay,
                })
            }
            (_, LifecycleState::Active) => {
                match std::mem::replace(&mut self.slot, Slot::Empty) {
                    Slot::Armed { handle, .. } => Some(Command::Disarm { handle }),
                    // 結果待ちの ticket はここで無効になる
                    Slot::Arming(_) | Slot::Empty => None,
                }
            }
            _ => None,
        };
        self.previous = next;
        command
    }

    /// Arm が成功した。ticket が既に無効なら、取り消すべき handle をそのまま返す
    pub fn armed(
        &mut self,
        ticket: u64,
        handle: NotificationHandle,
    ) -> Option<NotificationHandle> {
        match self.slot {
            Slot::Arming(current) if current == ticket => {
                self.slot = Slot::Armed { ticket, handle };
                None
            }
            _ => Some(handle),
        }
    }

    /// Arm が失敗した。リトライはしない
    pub fn arm_failed(&mut self, ticket: u64) {
        if self.slot == Slot::Arming(ticket) {
            self.slot = Slot::Empty;
        }
    }

    /// `ticket` の通知が配信された。まだ記録中ならクリアしてその handle を返す
    pub fn expired(&mut self, ticket: u64) -> Option<NotificationHandle> {
        match self.slot {
            Slot::Armed { ticket: current, handle } if current == ticket => {
                self.slot = Slot::Empty;
                Some(handle)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ulid::Ulid;

    use LifecycleState::{Active, Background, Inactive};

    fn controller(initial: LifecycleState) -> ArmingController {
        ArmingController::new(
            initial,
            Duration::from_secs(30),
            NotificationContent::background(),
        )
    }

    fn handle() -> NotificationHandle {
        NotificationHandle::from_ulid(Ulid::new())
    }

    fn arm_ticket(command: Option<Command>) -> u64 {
        match command {
            Some(Command::Arm { ticket, delay, .. }) => {
                assert_eq!(delay, Duration::from_secs(30));
                ticket
            }
            other => panic!("expected Arm, got {other:?}"),
        }
    }

    #[test]
    fn starts_empty_in_host_state() {
        let c = controller(Inactive);
        assert_eq!(c.previous_state(), Inactive);
        assert_eq!(c.handle(), None);
        assert!(!c.is_arming());
    }

    #[test]
    fn active_to_background_arms_and_records_handle() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        assert!(c.is_arming());

        let h = handle();
        assert_eq!(c.armed(ticket, h), None);
        assert_eq!(c.handle(), Some(h));
        assert_eq!(c.previous_state(), Background);
    }

    #[test]
    fn returning_to_active_disarms_matching_handle() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        let h = handle();
        c.armed(ticket, h);

        assert_eq!(
            c.on_lifecycle_change(Active),
            Some(Command::Disarm { handle: h })
        );
        assert_eq!(c.handle(), None);
    }

    #[test]
    fn duplicate_background_event_arms_once() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        c.armed(ticket, handle());

        assert_eq!(c.on_lifecycle_change(Background), None);
        assert!(c.handle().is_some());
    }

    #[test]
    fn failed_arming_leaves_handle_empty() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        c.arm_failed(ticket);

        assert_eq!(c.handle(), None);
        assert!(!c.is_arming());
        // active に戻っても取り消すものはない
        assert_eq!(c.on_lifecycle_change(Active), None);
    }

    #[test]
    fn late_completion_after_return_is_discarded() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        assert_eq!(c.on_lifecycle_change(Active), None);

        let h = handle();
        assert_eq!(c.armed(ticket, h), Some(h));
        assert_eq!(c.handle(), None);
    }

    #[test]
    fn stale_ticket_does_not_clobber_new_arming() {
        let mut c = controller(Active);
        let first = arm_ticket(c.on_lifecycle_change(Background));
        c.on_lifecycle_change(Active);
        let second = arm_ticket(c.on_lifecycle_change(Background));
        assert_ne!(first, second);

        c.arm_failed(first);
        assert!(c.is_arming());

        let h = handle();
        assert_eq!(c.armed(second, h), None);
        assert_eq!(c.handle(), Some(h));
    }

    #[test]
    fn inactive_detour_keeps_handle_until_active() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        let h = handle();
        c.armed(ticket, h);

        assert_eq!(c.on_lifecycle_change(Inactive), None);
        assert_eq!(c.handle(), Some(h));
        assert_eq!(
            c.on_lifecycle_change(Active),
            Some(Command::Disarm { handle: h })
        );
    }

    #[test]
    fn delivered_notification_clears_handle() {
        let mut c = controller(Active);
        let ticket = arm_ticket(c.on_lifecycle_change(Background));
        let h = handle();
        c.armed(ticket, h);

        assert_eq!(c.expired(ticket), Some(h));
        assert_eq!(c.handle(), None);
        // 配信済みなので取り消さない
        assert_eq!(c.on_lifecycle_change(Active), None);
    }

    #[test]
    fn expiry_of_old_ticket_keeps_current_handle() {
        let mut c = controller(Active);
        let first = arm_ticket(c.on_lifecycle_change(Background));
        c.armed(first, handle());
        c.on_lifecycle_change(Active);
        let second = arm_ticket(c.on_lifecycle_change(Background));
        let h = handle();
        c.armed(second, h);

        assert_eq!(c.expired(first), None);
        assert_eq!(c.handle(), Some(h));
    }

    #[rstest]
    #[case::active_to_inactive(Active, Inactive)]
    #[case::inactive_to_background(Inactive, Background)]
    #[case::background_to_inactive(Background, Inactive)]
    #[case::inactive_to_active(Inactive, Active)]
    #[case::background_to_active(Background, Active)]
    fn transitions_without_handle_have_no_side_effect(
        #[case] from: LifecycleState,
        #[case] to: LifecycleState,
    ) {
        let mut c = controller(from);
        assert_eq!(c.on_lifecycle_change(to), None);
        assert_eq!(c.previous_state(), to);
        assert_eq!(c.handle(), None);
    }

    #[rstest]
    #[case::active(Active)]
    #[case::background(Background)]
    #[case::inactive(Inactive)]
    fn repeating_current_state_is_idempotent(#[case] state: LifecycleState) {
        let mut c = controller(state);
        assert_eq!(c.on_lifecycle_change(state), None);
        assert_eq!(c.on_lifecycle_change(state), None);
        assert_eq!(c.previous_state(), state);
    }

    #[test]
    fn handle_is_empty_after_every_active_entry() {
        let script = [
            Background, Active, Inactive, Background, Active, Background, Background, Inactive,
            Active,
        ];
        let mut c = controller(Active);
        for next in script {
            if let Some(Command::Arm { ticket, .. }) = c.on_lifecycle_change(next) {
                c.armed(ticket, handle());
            }
            if next == Active {
                assert_eq!(c.handle(), None);
            }
            if c.handle().is_some() {
                assert_ne!(c.previous_state(), Active);
            }
        }
    }
}
