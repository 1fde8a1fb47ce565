use crate::shared::frame::Frame;

use super::emotion_mapper::SignalCode;

/// Activation precondition checked before every report.
///
/// When the gate is not armed the face is still reported, with
/// [`SignalCode::NO_SIGNAL`].
pub trait ArmingGate: Send {
    fn is_armed(&mut self, frame: &Frame) -> bool;
}

/// Gate with a constant answer, chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedGate(pub bool);

impl Default for FixedGate {
    fn default() -> Self {
        Self(true)
    }
}

impl ArmingGate for FixedGate {
    fn is_armed(&mut self, _frame: &Frame) -> bool {
        self.0
    }
}

pub fn gate(armed: bool, code: SignalCode) -> SignalCode {
    if armed {
        code
    } else {
        SignalCode::NO_SIGNAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armed_passes_code_through() {
        assert_eq!(gate(true, SignalCode(4)), SignalCode(4));
    }

    #[test]
    fn test_disarmed_sends_no_signal() {
        assert_eq!(gate(false, SignalCode(6)), SignalCode::NO_SIGNAL);
        assert_eq!(gate(false, SignalCode::NO_SIGNAL), SignalCode::NO_SIGNAL);
    }

    #[test]
    fn test_fixed_gate() {
        let frame = Frame::new(vec![0; 3], 1, 1, 3, 0);
        assert!(FixedGate::default().is_armed(&frame));
        assert!(!FixedGate(false).is_armed(&frame));
    }
}
