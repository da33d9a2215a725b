//! Appointment status transitions.
//!
//! ```text
//! pending     -> confirmed | rescheduled | cancelled
//! confirmed   -> rescheduled | cancelled | completed
//! rescheduled -> confirmed | rescheduled | cancelled
//! cancelled, completed: terminal
//! ```

use reservo_database::AppointmentStatus;

use crate::types::{BookingError, BookingResult};

/// Statuses reachable from `from` in one step
pub fn allowed_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match from {
        Pending => &[Confirmed, Rescheduled, Cancelled],
        Confirmed => &[Rescheduled, Cancelled, Completed],
        Rescheduled => &[Confirmed, Rescheduled, Cancelled],
        Cancelled | Completed => &[],
    }
}

pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

pub fn is_terminal(status: AppointmentStatus) -> bool {
    allowed_transitions(status).is_empty()
}

pub fn ensure_transition(from: AppointmentStatus, to: AppointmentStatus) -> BookingResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(BookingError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    const ALL: [AppointmentStatus; 5] = [Pending, Confirmed, Rescheduled, Cancelled, Completed];

    #[test]
    fn documented_transitions_are_allowed() {
        for (from, to) in [
            (Pending, Confirmed),
            (Pending, Rescheduled),
            (Pending, Cancelled),
            (Confirmed, Rescheduled),
            (Confirmed, Cancelled),
            (Confirmed, Completed),
            (Rescheduled, Confirmed),
            (Rescheduled, Rescheduled),
            (Rescheduled, Cancelled),
        ] {
            assert!(can_transition(from, to), "{from} -> {to} should be allowed");
        }
    }

    #[test]
    fn pending_cannot_complete_directly() {
        assert!(matches!(
            ensure_transition(Pending, Completed),
            Err(BookingError::InvalidTransition { from: Pending, to: Completed })
        ));
        assert!(!can_transition(Pending, Pending));
        assert!(!can_transition(Confirmed, Confirmed));
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for from in [Cancelled, Completed] {
            assert!(is_terminal(from));
            for to in ALL {
                assert!(ensure_transition(from, to).is_err());
            }
        }
        assert!(!is_terminal(Pending));
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in ALL {
            assert!(!can_transition(from, Pending));
        }
    }
}
