/// Length a PIN must have
pub const PIN_LEN: usize = 4;

/// Error type for PIN lock operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinError {
    #[error("PIN must be exactly 4 characters")]
    InvalidPin,
    #[error("set a PIN before locking")]
    NoPin,
    #[error("incorrect PIN")]
    IncorrectPin,
}

/// The PIN gate in front of the page. Plain string equality, no hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinLock {
    pin: Option<String>,
    locked: bool,
}

impl PinLock {
    pub fn new(pin: Option<String>, locked: bool) -> Self {
        // A lock without a PIN could never be opened
        PinLock {
            locked: locked && pin.is_some(),
            pin,
        }
    }

    pub fn set_pin(&mut self, pin: &str) -> Result<(), PinError> {
        if pin.chars().count() != PIN_LEN {
            return Err(PinError::InvalidPin);
        }
        self.pin = Some(pin.to_string());
        Ok(())
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    pub fn has_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) -> Result<(), PinError> {
        if self.pin.is_none() {
            return Err(PinError::NoPin);
        }
        self.locked = true;
        Ok(())
    }

    /// Unlock if `entered` equals the PIN. Unlocking an unlocked gate
    /// still checks the PIN.
    pub fn unlock(&mut self, entered: &str) -> Result<(), PinError> {
        match &self.pin {
            Some(pin) if pin == entered => {
                self.locked = false;
                Ok(())
            }
            Some(_) => Err(PinError::IncorrectPin),
            None => Err(PinError::NoPin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_requires_pin() {
        let mut gate = PinLock::default();
        assert_eq!(gate.lock(), Err(PinError::NoPin));
        assert!(!gate.is_locked());
    }

    #[test]
    fn pin_length_is_enforced() {
        let mut gate = PinLock::default();
        assert_eq!(gate.set_pin("123"), Err(PinError::InvalidPin));
        assert_eq!(gate.set_pin("12345"), Err(PinError::InvalidPin));
        assert!(gate.set_pin("12ab").is_ok());
        assert_eq!(gate.pin(), Some("12ab"));
    }

    #[test]
    fn lock_unlock_cycle() {
        let mut gate = PinLock::default();
        gate.set_pin("4321").unwrap();
        gate.lock().unwrap();
        assert!(gate.is_locked());
        assert_eq!(gate.unlock("1234"), Err(PinError::IncorrectPin));
        assert!(gate.is_locked());
        gate.unlock("4321").unwrap();
        assert!(!gate.is_locked());
    }

    #[test]
    fn stored_lock_without_pin_is_ignored() {
        assert!(!PinLock::new(None, true).is_locked());
        assert!(PinLock::new(Some("0000".into()), true).is_locked());
    }
}
